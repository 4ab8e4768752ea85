use crate::error::{MetamerError, Result};
use metamer_common::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// データURLを上書きする環境変数
pub const DATA_URL_ENV: &str = "METAMER_DATA_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// metadata.json と画像を置いたベースURL（またはディレクトリ）
    pub data_url: String,
    pub page_size: usize,
    pub http_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_url: ".".into(),
            page_size: DEFAULT_PAGE_SIZE,
            http_timeout_seconds: 30,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| MetamerError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("metamer-browser").join("config.json"))
    }

    /// 実際に使うデータURL（環境変数を優先）
    pub fn data_url(&self) -> String {
        match std::env::var(DATA_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url,
            _ => self.data_url.clone(),
        }
    }

    pub fn set_data_url(&mut self, url: String) -> Result<()> {
        if url.trim().is_empty() {
            return Err(MetamerError::Config("データURLが空です".into()));
        }
        self.data_url = url;
        Ok(())
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(MetamerError::Config("ページサイズは1以上を指定してください".into()));
        }
        self.page_size = page_size;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data_url, ".");
        assert_eq!(config.page_size, 24);
        assert_eq!(config.http_timeout_seconds, 30);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"page_size": 25}"#).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.data_url, ".");
    }

    #[test]
    fn test_invalid_page_size() {
        let mut config = Config::default();
        assert!(matches!(config.set_page_size(0), Err(MetamerError::Config(_))));
        config.set_page_size(25).unwrap();
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn test_empty_data_url_rejected() {
        let mut config = Config::default();
        assert!(config.set_data_url("  ".into()).is_err());
        assert_eq!(config.data_url, ".");
    }
}
