//! `etoc migrate` command implementation.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use etoc_site::{dump_mapping, migrate_path};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the migrate command.
#[derive(Args)]
pub(crate) struct MigrateArgs {
    /// Legacy ToC file to migrate.
    toc_file: PathBuf,

    /// The format to migrate from.
    #[arg(short, long, value_parser = ["jb-v0.10"], default_value = "jb-v0.10")]
    format: String,

    /// Write to a file path instead of stdout (`-` for stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl MigrateArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        tracing::debug!(format = %self.format, "Migrating ToC");

        let migrated = migrate_path(&self.toc_file)?;
        let content = dump_mapping(&migrated.toc)?;

        match self.output.filter(|path| path.as_os_str() != "-") {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, content)?;
                output.success(&format!("Written to: {}", path.display()));
            }
            None => output.data(&content)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use etoc_site::{FileFormat, parse_toc_yaml};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_migrate_writes_to_nested_output() {
        let dir = TempDir::new().unwrap();
        let toc_file = dir.path().join("_toc.yml");
        fs::write(&toc_file, "file: intro\nsections:\n  - file: a\n").unwrap();
        let output = dir.path().join("out/nested/_toc.yml");

        MigrateArgs {
            toc_file,
            format: "jb-v0.10".to_owned(),
            output: Some(output.clone()),
        }
        .execute()
        .unwrap();

        let site_map = parse_toc_yaml(&output).unwrap();
        assert_eq!(site_map.root_docname(), "intro");
        assert_eq!(site_map.file_format, FileFormat::Article);
    }
}
