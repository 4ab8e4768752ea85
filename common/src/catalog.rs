//! カタログ（metadata.json）の読み込みと参照
//!
//! 読み込み後は読み取り専用。ガンマ補正済みのメタマーは読み込み時に除外する。

use crate::error::Result;
use crate::types::{CatalogEntry, Field};
use serde::{Deserialize, Serialize};

/// カタログファイル名
pub const METADATA_FILE: &str = "metadata.json";

/// metadata.json 全体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub metamers: Vec<CatalogEntry>,
    #[serde(default)]
    pub natural_images: Vec<CatalogEntry>,
}

impl Catalog {
    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        Ok(catalog.without_gamma_corrected())
    }

    /// バイト列から読み込み
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let catalog: Self = serde_json::from_slice(bytes)?;
        Ok(catalog.without_gamma_corrected())
    }

    fn without_gamma_corrected(mut self) -> Self {
        let before = self.metamers.len();
        self.metamers.retain(|entry| !entry.is_gamma_corrected());
        let dropped = before - self.metamers.len();
        if dropped > 0 {
            tracing::debug!(dropped, "gamma-corrected metamers excluded from catalog");
        }
        tracing::debug!(
            metamers = self.metamers.len(),
            natural_images = self.natural_images.len(),
            "catalog loaded"
        );
        self
    }

    pub fn len(&self) -> usize {
        self.metamers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metamers.is_empty()
    }

    /// 同じ target_image を持つ自然画像
    pub fn natural_for(&self, entry: &CatalogEntry) -> Option<&CatalogEntry> {
        let target = entry.target_image.as_deref()?;
        self.natural_images
            .iter()
            .find(|natural| natural.target_image.as_deref() == Some(target))
    }

    pub fn find_by_key(&self, key: &str) -> Option<&CatalogEntry> {
        self.metamers.iter().find(|entry| entry.identity_key() == key)
    }

    /// 短縮ID（前方一致）で検索。一意に決まらない場合は None
    pub fn find_by_short_id(&self, prefix: &str) -> Option<&CatalogEntry> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return None;
        }
        let mut matches = self
            .metamers
            .iter()
            .filter(|entry| entry.short_id().starts_with(&prefix));
        let first = matches.next()?;
        match matches.next() {
            Some(_) => None,
            None => Some(first),
        }
    }

    /// フィールドの値一覧（出現順、重複なし）
    pub fn observed_values(&self, field: Field) -> Vec<String> {
        observed_values(&self.metamers, field)
    }
}

/// エントリ列に出現するフィールド値（出現順、重複なし）
pub fn observed_values(entries: &[CatalogEntry], field: Field) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for value in entries.iter().filter_map(|entry| entry.value_string(field)) {
        if !values.contains(&value) {
            values.push(value);
        }
    }
    values
}

/// ベースURL（またはディレクトリ）と相対パスを連結
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

/// カタログのURL
pub fn metadata_url(base: &str) -> String {
    join_url(base, METADATA_FILE)
}

/// 画像アセットのURL
pub fn asset_url(base: &str, entry: &CatalogEntry) -> String {
    join_url(base, &entry.file)
}
