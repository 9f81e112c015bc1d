//! `etoc parse` command implementation.

use std::path::PathBuf;

use clap::Args;
use etoc_site::{dump_yaml, parse_toc_yaml};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the parse command.
#[derive(Args)]
pub(crate) struct ParseArgs {
    /// ToC file to parse (conventionally `_toc.yml`).
    toc_file: PathBuf,
}

impl ParseArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let site_map = parse_toc_yaml(&self.toc_file)?;
        Output::new().data(&dump_yaml(&site_map)?)?;
        Ok(())
    }
}
