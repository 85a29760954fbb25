//! # Pure Data Module / 纯数据模块
//!
//! TOML → DTO mapping for the application configuration. No validation and
//! no default calculation happens here: a missing key maps to an empty value,
//! and the composition root decides what an empty value means.
//! 此模块只做 TOML 到 DTO 的映射，不做验证，也不计算默认值。

use std::path::PathBuf;

/// Application configuration DTO (pure data, no logic)
/// 应用配置 DTO（纯数据，无逻辑）
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the recipe backend (recognition + generation)
    pub api_url: String,

    /// Request timeout in seconds (0 = not configured)
    pub timeout_secs: u64,

    /// JSON file holding saved recipe documents (path only, no existence check)
    /// 保存菜谱的 JSON 文件路径（仅路径信息，不检查文件是否存在）
    pub recipes_path: PathBuf,

    /// UI locale code, e.g. `en`, `ja`, `zh`
    pub language: String,

    /// Directory for rolling log files (empty = stdout only)
    pub log_dir: PathBuf,
}

impl AppConfig {
    /// Create AppConfig from TOML value
    /// 从 TOML 值创建 AppConfig
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let str_at = |section: &str, key: &str| -> String {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };

        Ok(Self {
            api_url: str_at("backend", "api_url"),
            timeout_secs: toml_value
                .get("backend")
                .and_then(|b| b.get("timeout_secs"))
                .and_then(|v| v.as_integer())
                .unwrap_or(0)
                .max(0) as u64,
            recipes_path: PathBuf::from(str_at("storage", "recipes_path")),
            language: str_at("general", "language"),
            log_dir: PathBuf::from(str_at("logging", "dir")),
        })
    }

    /// Create empty AppConfig (all empty/default values)
    /// 创建空的 AppConfig（所有字段为空/默认值）
    pub fn empty() -> Self {
        Self {
            api_url: String::new(),
            timeout_secs: 0,
            recipes_path: PathBuf::new(),
            language: String::new(),
            log_dir: PathBuf::new(),
        }
    }

    /// Create AppConfig with paths rooted at `data_dir`.
    ///
    /// The base directory is computed by the caller.
    pub fn with_system_defaults(data_dir: PathBuf) -> Self {
        Self {
            recipes_path: data_dir.join("saved_recipes.json"),
            ..Self::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toml::Value;

    #[test]
    fn test_from_toml_reads_all_sections() {
        let toml_str = r#"
            [general]
            language = "ja"

            [backend]
            api_url = "https://api.example.com"
            timeout_secs = 45

            [storage]
            recipes_path = "/data/recipes.json"

            [logging]
            dir = "/var/log/cookmate"
        "#;
        let toml_value: Value = toml::from_str(toml_str).unwrap();

        let config = AppConfig::from_toml(&toml_value).unwrap();

        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.timeout_secs, 45);
        assert_eq!(config.recipes_path, PathBuf::from("/data/recipes.json"));
        assert_eq!(config.language, "ja");
        assert_eq!(config.log_dir, PathBuf::from("/var/log/cookmate"));
    }

    #[test]
    fn test_from_toml_returns_empty_values_when_missing() {
        let toml_value: Value = toml::from_str("[backend]\n").unwrap();

        let config = AppConfig::from_toml(&toml_value).unwrap();

        // Empty values are valid facts
        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn test_negative_timeout_maps_to_zero() {
        let toml_value: Value = toml::from_str("[backend]\ntimeout_secs = -3\n").unwrap();

        let config = AppConfig::from_toml(&toml_value).unwrap();

        assert_eq!(config.timeout_secs, 0);
    }

    #[test]
    fn test_with_system_defaults_places_store_in_data_dir() {
        let config = AppConfig::with_system_defaults(PathBuf::from("/tmp/cm"));
        assert_eq!(config.recipes_path, PathBuf::from("/tmp/cm/saved_recipes.json"));
        assert!(config.api_url.is_empty());
    }
}
