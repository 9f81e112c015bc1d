//! Configuration management for etoc.
//!
//! Parses `etoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `create.toc_name` supports `~`, `${VAR}` and `${VAR:-default}`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "etoc.toml";

/// Names accepted for `scan.file_format`.
pub const FILE_FORMATS: [&str; 3] = ["default", "jb-book", "jb-article"];

/// Values accepted for `create.extension`.
pub const EXTENSIONS: [&str; 2] = ["rst", "md"];

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override document suffixes.
    pub suffixes: Option<Vec<String>>,
    /// Override index file stem.
    pub index: Option<String>,
    /// Override ignore patterns.
    pub skip_match: Option<Vec<String>>,
    /// Override output file format.
    pub file_format: Option<String>,
    /// Override title guessing.
    pub guess_titles: Option<bool>,
    /// Override default extension of created files.
    pub extension: Option<String>,
    /// Override overwrite flag.
    pub overwrite: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder scanning (`from-project`).
    pub scan: ScanConfig,
    /// Project creation (`to-project`).
    pub create: CreateConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Folder scanning configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File suffixes considered as documents.
    pub suffixes: Vec<String>,
    /// File stem of a folder's index document.
    pub index: String,
    /// Glob patterns of file and folder names to ignore.
    pub skip_match: Vec<String>,
    /// Key names used in the generated ToC.
    pub file_format: String,
    /// Derive document titles from paths.
    pub guess_titles: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            suffixes: vec![".rst".to_owned(), ".md".to_owned()],
            index: "index".to_owned(),
            skip_match: vec![".*".to_owned()],
            file_format: "default".to_owned(),
            guess_titles: false,
        }
    }
}

/// Project creation configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CreateConfig {
    /// Extension of created documents (`rst` or `md`).
    pub extension: String,
    /// Replace existing files.
    pub overwrite: bool,
    /// Encoding of created files.
    pub encoding: String,
    /// Name of the ToC copy placed in the project root; empty disables the copy.
    pub toc_name: String,
}

impl Default for CreateConfig {
    fn default() -> Self {
        Self {
            extension: "rst".to_owned(),
            overwrite: false,
            encoding: "utf8".to_owned(),
            toc_name: "_toc.yml".to_owned(),
        }
    }
}

impl CreateConfig {
    /// ToC copy name, `None` when disabled.
    #[must_use]
    pub fn toc_copy_name(&self) -> Option<&str> {
        Some(self.toc_name.as_str()).filter(|name| !name.is_empty())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`create.toc_name`").
        field: String,
        /// Error message.
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a string field to be one of `allowed`.
fn require_one_of(value: &str, allowed: &[&str], field: &str) -> Result<(), ConfigError> {
    if !allowed.contains(&value) {
        return Err(ConfigError::Validation(format!(
            "{field} must be one of {allowed:?}, got '{value}'"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `etoc.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values. The result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(suffixes) = &settings.suffixes {
            self.scan.suffixes.clone_from(suffixes);
        }
        if let Some(index) = &settings.index {
            self.scan.index.clone_from(index);
        }
        if let Some(skip_match) = &settings.skip_match {
            self.scan.skip_match.clone_from(skip_match);
        }
        if let Some(file_format) = &settings.file_format {
            self.scan.file_format.clone_from(file_format);
        }
        if let Some(guess_titles) = settings.guess_titles {
            self.scan.guess_titles = guess_titles;
        }
        if let Some(extension) = &settings.extension {
            self.create.extension.clone_from(extension);
        }
        if let Some(overwrite) = settings.overwrite {
            self.create.overwrite = overwrite;
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_scan()?;
        self.validate_create()?;
        Ok(())
    }

    fn validate_scan(&self) -> Result<(), ConfigError> {
        if self.scan.suffixes.is_empty() {
            return Err(ConfigError::Validation(
                "scan.suffixes cannot be empty".to_owned(),
            ));
        }
        for suffix in &self.scan.suffixes {
            if !suffix.starts_with('.') || suffix.len() < 2 {
                return Err(ConfigError::Validation(format!(
                    "scan.suffixes entries must start with '.', got '{suffix}'"
                )));
            }
        }
        require_non_empty(&self.scan.index, "scan.index")?;
        require_one_of(&self.scan.file_format, &FILE_FORMATS, "scan.file_format")?;
        Ok(())
    }

    fn validate_create(&self) -> Result<(), ConfigError> {
        let extension = self.create.extension.trim_start_matches('.');
        require_one_of(extension, &EXTENSIONS, "create.extension")?;
        require_non_empty(&self.create.encoding, "create.encoding")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.create.toc_name = expand::expand_env(&self.create.toc_name, "create.toc_name")?;
        Ok(())
    }
}

/// Search for a config file in `start` and its parents.
fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scan.suffixes, strings(&[".rst", ".md"]));
        assert_eq!(config.scan.index, "index");
        assert_eq!(config.scan.skip_match, strings(&[".*"]));
        assert_eq!(config.scan.file_format, "default");
        assert!(!config.scan.guess_titles);
        assert_eq!(config.create.extension, "rst");
        assert!(!config.create.overwrite);
        assert_eq!(config.create.encoding, "utf8");
        assert_eq!(config.create.toc_copy_name(), Some("_toc.yml"));
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.scan.index, "index");
        assert_eq!(config.create.extension, "rst");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[scan]
suffixes = [".md"]
index = "README"
skip_match = [".*", "_build"]
file_format = "jb-book"
guess_titles = true

[create]
extension = "md"
overwrite = true
encoding = "UTF-8"
toc_name = ""
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.scan.suffixes, strings(&[".md"]));
        assert_eq!(config.scan.index, "README");
        assert_eq!(config.scan.skip_match, strings(&[".*", "_build"]));
        assert_eq!(config.scan.file_format, "jb-book");
        assert!(config.scan.guess_titles);
        assert_eq!(config.create.extension, "md");
        assert!(config.create.overwrite);
        assert_eq!(config.create.toc_copy_name(), None);
        config.validate().unwrap();
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            suffixes: Some(strings(&[".md"])),
            index: Some("main".to_owned()),
            file_format: Some("jb-article".to_owned()),
            guess_titles: Some(true),
            overwrite: Some(true),
            ..CliSettings::default()
        });

        assert_eq!(config.scan.suffixes, strings(&[".md"]));
        assert_eq!(config.scan.index, "main");
        assert_eq!(config.scan.skip_match, strings(&[".*"]));
        assert_eq!(config.scan.file_format, "jb-article");
        assert!(config.scan.guess_titles);
        assert_eq!(config.create.extension, "rst");
        assert!(config.create.overwrite);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.scan.index, "index");
        assert!(!config.create.overwrite);
    }

    #[test]
    fn test_validate_errors() {
        let cases: [(&str, fn(&mut Config)); 6] = [
            ("scan.suffixes", |c| c.scan.suffixes.clear()),
            ("scan.suffixes", |c| c.scan.suffixes = vec!["md".to_owned()]),
            ("scan.index", |c| c.scan.index.clear()),
            ("scan.file_format", |c| c.scan.file_format = "jb-v0.10".to_owned()),
            ("create.extension", |c| c.create.extension = "txt".to_owned()),
            ("create.encoding", |c| c.create.encoding.clear()),
        ];
        for (field, mutate) in cases {
            let mut config = Config::default();
            mutate(&mut config);
            let err = config.validate().unwrap_err();
            assert!(matches!(err, ConfigError::Validation(_)), "{field}: {err:?}");
            assert!(err.to_string().contains(field), "{field}: {err}");
        }
    }

    #[test]
    fn test_extension_with_dot_is_valid() {
        let mut config = Config::default();
        config.create.extension = ".md".to_owned();
        config.validate().unwrap();
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etoc.toml");
        std::fs::write(&path, "[scan]\nindex = \"home\"\n").unwrap();

        let config = Config::load(
            Some(&path),
            Some(&CliSettings {
                overwrite: Some(true),
                ..CliSettings::default()
            }),
        )
        .unwrap();

        assert_eq!(config.scan.index, "home");
        assert!(config.create.overwrite);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_path() {
        let err = Config::load(Some(Path::new("/nonexistent/etoc.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etoc.toml");
        std::fs::write(&path, "[scan\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_rejects_invalid_cli_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etoc.toml");
        std::fs::write(&path, "").unwrap();

        let err = Config::load(
            Some(&path),
            Some(&CliSettings {
                suffixes: Some(vec![]),
                ..CliSettings::default()
            }),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_toc_name_is_expanded() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("ETOC_TEST_TOC_NAME", "toc.yml");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etoc.toml");
        std::fs::write(&path, "[create]\ntoc_name = \"${ETOC_TEST_TOC_NAME}\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.create.toc_name, "toc.yml");

        unsafe {
            std::env::remove_var("ETOC_TEST_TOC_NAME");
        }
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("docs/source");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("etoc.toml"), "").unwrap();

        assert_eq!(
            discover_config(&nested),
            Some(dir.path().join("etoc.toml"))
        );
    }
}
