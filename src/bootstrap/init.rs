//! # Configuration resolution / 配置解析
//!
//! Decides which configuration file to read and fills the values the file
//! left empty. [`super::config::load_config`] stays a pure mapping; every
//! default lives here.

use std::path::{Path, PathBuf};

use anyhow::Context;
use cm_core::{AppConfig, Language};
use tracing::debug;

use super::config::load_config;

pub const DEFAULT_CONFIG_FILE: &str = "cookmate.toml";
pub const CONFIG_PATH_ENV: &str = "COOKMATE_CONFIG";
pub const API_URL_ENV: &str = "COOKMATE_API_URL";

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Where the configuration file path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` or `COOKMATE_CONFIG`; the file must exist.
    Explicit(PathBuf),
    /// `cookmate.toml` in the working directory; optional.
    Default(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::Default(path) => path,
        }
    }
}

/// Pick the config file: `--config` > `COOKMATE_CONFIG` > `cookmate.toml`.
pub fn config_source(cli_path: Option<&Path>, env_path: Option<String>) -> ConfigSource {
    if let Some(path) = cli_path {
        return ConfigSource::Explicit(path.to_path_buf());
    }
    match env_path.filter(|p| !p.trim().is_empty()) {
        Some(path) => ConfigSource::Explicit(PathBuf::from(path)),
        None => ConfigSource::Default(PathBuf::from(DEFAULT_CONFIG_FILE)),
    }
}

/// Directory for application data when the config file does not name one.
/// 配置未指定时的应用数据目录。
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("cookmate")
}

/// Fill every empty value of `config`.
///
/// `api_url_override` wins over the file; a trailing slash is dropped.
pub fn apply_defaults(
    mut config: AppConfig,
    data_dir: &Path,
    api_url_override: Option<String>,
) -> AppConfig {
    if let Some(url) = api_url_override.filter(|u| !u.trim().is_empty()) {
        config.api_url = url;
    }
    if config.api_url.trim().is_empty() {
        config.api_url = DEFAULT_API_URL.to_string();
    }
    config.api_url = config.api_url.trim().trim_end_matches('/').to_string();

    if config.timeout_secs == 0 {
        config.timeout_secs = DEFAULT_TIMEOUT_SECS;
    }
    if config.recipes_path.as_os_str().is_empty() {
        config.recipes_path = AppConfig::with_system_defaults(data_dir.to_path_buf()).recipes_path;
    }
    config
}

/// Load and complete the configuration for this run.
///
/// # Errors / 错误
///
/// An explicitly named file that cannot be read or parsed is an error. A
/// missing default file is not.
pub fn resolve_config(cli_path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let source = config_source(cli_path, std::env::var(CONFIG_PATH_ENV).ok());
    let loaded = match &source {
        ConfigSource::Explicit(path) => load_config(path)?,
        ConfigSource::Default(path) if path.exists() => load_config(path)
            .with_context(|| format!("Invalid default config: {}", path.display()))?,
        ConfigSource::Default(_) => AppConfig::empty(),
    };
    debug!(path = %source.path().display(), "configuration loaded");

    Ok(apply_defaults(
        loaded,
        &default_data_dir(),
        std::env::var(API_URL_ENV).ok(),
    ))
}

/// Session language from the configured locale. Empty means English.
pub fn configured_language(config: &AppConfig) -> Language {
    Language::from_locale(&config.language)
}

/// Log directory, if file logging is configured.
pub fn configured_log_dir(config: &AppConfig) -> Option<&Path> {
    let dir = config.log_dir.as_path();
    (!dir.as_os_str().is_empty()).then_some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_path_beats_environment() {
        let source = config_source(Some(Path::new("/etc/cm.toml")), Some("/env/cm.toml".into()));
        assert_eq!(source, ConfigSource::Explicit(PathBuf::from("/etc/cm.toml")));
    }

    #[test]
    fn test_environment_path_beats_default() {
        let source = config_source(None, Some("/env/cm.toml".into()));
        assert_eq!(source, ConfigSource::Explicit(PathBuf::from("/env/cm.toml")));

        let source = config_source(None, Some("  ".into()));
        assert_eq!(source, ConfigSource::Default(PathBuf::from(DEFAULT_CONFIG_FILE)));
    }

    #[test]
    fn test_apply_defaults_fills_empty_values() {
        let config = apply_defaults(AppConfig::empty(), Path::new("/data/cm"), None);

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.recipes_path, PathBuf::from("/data/cm/saved_recipes.json"));
        assert_eq!(configured_log_dir(&config), None);
        assert_eq!(configured_language(&config), Language::English);
    }

    #[test]
    fn test_apply_defaults_keeps_configured_values() {
        let config = AppConfig {
            api_url: "https://recipes.example.com/".into(),
            timeout_secs: 15,
            recipes_path: PathBuf::from("/srv/recipes.json"),
            language: "ja".into(),
            log_dir: PathBuf::from("/var/log/cookmate"),
        };

        let config = apply_defaults(config, Path::new("/unused"), None);

        assert_eq!(config.api_url, "https://recipes.example.com");
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.recipes_path, PathBuf::from("/srv/recipes.json"));
        assert_eq!(configured_language(&config), Language::Japanese);
        assert_eq!(configured_log_dir(&config), Some(Path::new("/var/log/cookmate")));
    }

    #[test]
    fn test_api_url_override_wins() {
        let config = AppConfig {
            api_url: "https://file.example.com".into(),
            ..AppConfig::empty()
        };

        let config = apply_defaults(config, Path::new("/d"), Some("http://10.0.0.2:5000".into()));

        assert_eq!(config.api_url, "http://10.0.0.2:5000");
    }

    #[test]
    fn test_resolve_config_reads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend]\ntimeout_secs = 5\n[general]\nlanguage = \"zh-CN\"").unwrap();

        let config = resolve_config(Some(file.path())).unwrap();

        assert_eq!(config.timeout_secs, 5);
        assert_eq!(configured_language(&config), Language::Chinese);
    }

    #[test]
    fn test_resolve_config_rejects_missing_explicit_file() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("nope.toml");

        assert!(resolve_config(Some(&missing)).is_err());
    }
}
