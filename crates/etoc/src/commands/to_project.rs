//! `etoc to-project` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use etoc_config::{CliSettings, Config, EXTENSIONS};
use etoc_fs::{MaterializeOptions, create_site_from_toc};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the to-project command.
#[derive(Args)]
pub(crate) struct ToProjectArgs {
    /// ToC file describing the project.
    toc_file: PathBuf,

    /// The root directory [default: ToC file directory].
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// The default file extension to use (overrides config).
    #[arg(short, long, value_parser = EXTENSIONS)]
    extension: Option<String>,

    /// Overwrite existing files.
    #[arg(short, long)]
    overwrite: bool,
}

impl ToProjectArgs {
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            extension: self.extension,
            overwrite: self.overwrite.then_some(true),
            ..CliSettings::default()
        };
        let config = Config::load(config_path, Some(&cli_settings))?;

        let options = MaterializeOptions {
            default_ext: config.create.extension.parse()?,
            encoding: config.create.encoding.clone(),
            overwrite: config.create.overwrite,
            toc_copy_name: config.create.toc_copy_name().map(str::to_owned),
        };
        let site_map = create_site_from_toc(&self.toc_file, self.path.as_deref(), &options)?;

        Output::new().success(&format!(
            "SUCCESS! Created {} documents",
            site_map.len()
        ));
        Ok(())
    }
}
