//! カタログ・画像の取得
//!
//! ベースが `http(s)://` ならHTTP、それ以外はローカルディレクトリとして読む。
//! 取得は1回のみで、リトライはしない。

use crate::error::{MetamerError, Result};
use metamer_common::catalog::{join_url, METADATA_FILE};
use metamer_common::{Catalog, CatalogEntry};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum DataSource {
    Http { base: String, client: reqwest::Client },
    Local(PathBuf),
}

impl DataSource {
    pub fn new(base: &str, timeout: Duration) -> Result<Self> {
        let base = base.trim();
        if base.starts_with("http://") || base.starts_with("https://") {
            let client = reqwest::Client::builder().timeout(timeout).build()?;
            Ok(DataSource::Http {
                base: base.to_string(),
                client,
            })
        } else {
            Ok(DataSource::Local(PathBuf::from(base)))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, DataSource::Http { .. })
    }

    /// ベース基準の相対パスの表示用URL
    pub fn location(&self, relative: &str) -> String {
        match self {
            DataSource::Http { base, .. } => join_url(base, relative),
            DataSource::Local(dir) => dir
                .join(relative.trim_start_matches('/'))
                .display()
                .to_string(),
        }
    }

    pub async fn fetch_bytes(&self, relative: &str) -> Result<Vec<u8>> {
        let location = self.location(relative);
        tracing::debug!(%location, "fetching");

        match self {
            DataSource::Http { client, .. } => {
                let response = client.get(&location).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(MetamerError::Fetch(format!("{} ({})", location, status)));
                }
                Ok(response.bytes().await?.to_vec())
            }
            DataSource::Local(_) => match tokio::fs::read(&location).await {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(MetamerError::FileNotFound(location))
                }
                Err(e) => Err(e.into()),
            },
        }
    }

    pub async fn fetch_catalog(&self) -> Result<Catalog> {
        let bytes = self.fetch_bytes(METADATA_FILE).await?;
        let catalog = Catalog::from_slice(&bytes)?;
        tracing::info!(
            metamers = catalog.len(),
            natural_images = catalog.natural_images.len(),
            "catalog fetched from {}",
            self.location(METADATA_FILE)
        );
        Ok(catalog)
    }

    pub async fn fetch_asset(&self, entry: &CatalogEntry) -> Result<Vec<u8>> {
        self.fetch_bytes(&entry.file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_selects_source() {
        let timeout = Duration::from_secs(5);
        assert!(DataSource::new("https://example.org/data", timeout).unwrap().is_remote());
        assert!(!DataSource::new("./data", timeout).unwrap().is_remote());
    }

    #[test]
    fn test_location_joins_paths() {
        let timeout = Duration::from_secs(5);
        let remote = DataSource::new("https://example.org/data/", timeout).unwrap();
        assert_eq!(remote.location("/metadata.json"), "https://example.org/data/metadata.json");

        let local = DataSource::new("data", timeout).unwrap();
        assert_eq!(
            PathBuf::from(local.location("m/a.png")),
            PathBuf::from("data").join("m/a.png")
        );
    }
}
