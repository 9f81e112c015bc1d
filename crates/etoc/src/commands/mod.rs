//! CLI command implementations.

pub(crate) mod from_project;
pub(crate) mod migrate;
pub(crate) mod parse;
pub(crate) mod to_project;

pub(crate) use from_project::FromProjectArgs;
pub(crate) use migrate::MigrateArgs;
pub(crate) use parse::ParseArgs;
pub(crate) use to_project::ToProjectArgs;
