//! `etoc from-project` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use etoc_config::{CliSettings, Config, FILE_FORMATS};
use etoc_fs::{ScanOptions, create_site_map_from_path};
use etoc_site::{FileFormat, SiteMap, dump_yaml};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the from-project command.
#[derive(Args)]
pub(crate) struct FromProjectArgs {
    /// Project folder to scan.
    site_dir: PathBuf,

    /// File extensions to consider as documents (use multiple times).
    #[arg(short, long = "extension")]
    extensions: Vec<String>,

    /// File name (without suffix) considered as the index file in a folder.
    #[arg(short, long)]
    index: Option<String>,

    /// File/folder names which match will be ignored (use multiple times).
    #[arg(short, long = "skip-match")]
    skip_matches: Vec<String>,

    /// Guess titles of documents from path names.
    #[arg(short = 't', long)]
    guess_titles: bool,

    /// The key-mappings to use.
    #[arg(short, long, value_parser = FILE_FORMATS)]
    file_format: Option<String>,
}

impl FromProjectArgs {
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let suffixes: Vec<String> = self
            .extensions
            .into_iter()
            .map(|ext| {
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        let cli_settings = CliSettings {
            suffixes: Some(suffixes).filter(|s| !s.is_empty()),
            index: self.index,
            skip_match: Some(self.skip_matches).filter(|s| !s.is_empty()),
            file_format: self.file_format,
            guess_titles: self.guess_titles.then_some(true),
            ..CliSettings::default()
        };
        let config = Config::load(config_path, Some(&cli_settings))?;
        let scan = &config.scan;

        let options = ScanOptions::new(scan.suffixes.clone(), scan.index.as_str(), &scan.skip_match)?;
        let file_format: FileFormat = scan.file_format.parse()?;
        let mut site_map = create_site_map_from_path(&self.site_dir, &options, file_format)?;
        if scan.guess_titles {
            guess_titles(&mut site_map, &scan.index);
        }

        Output::new().data(&dump_yaml(&site_map)?)?;
        Ok(())
    }
}

/// Give every document except the root a title derived from its docname.
fn guess_titles(site_map: &mut SiteMap, index: &str) {
    let root = site_map.root_docname().to_owned();
    let docnames: Vec<String> = site_map
        .docnames()
        .filter(|docname| *docname != root)
        .map(str::to_owned)
        .collect();
    for docname in docnames {
        let title = guess_title(&docname, index);
        if let Some(document) = site_map.get_mut(&docname) {
            document.title = Some(title);
        }
    }
}

/// Title from a docname: index documents use their folder name.
///
/// The name is split on `_`, a leading number is dropped, and the first
/// letter is capitalized.
fn guess_title(docname: &str, index: &str) -> String {
    let mut segments = docname.rsplit('/');
    let file_name = segments.next().unwrap_or(docname);
    let name = if file_name == index {
        segments.next().unwrap_or_default()
    } else {
        file_name
    };

    let mut words: Vec<&str> = name.split('_').collect();
    if words
        .first()
        .is_some_and(|word| word.chars().all(char::is_numeric))
    {
        words.remove(0);
    }
    capitalize(&words.join(" "))
}

/// Uppercase the first character, lowercase the rest.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
