//! JavaScript側に渡す表示用データ

use metamer_common::{asset_url, CatalogEntry, Page};
use serde::Serialize;

/// 表の1行
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    /// 選択用の識別キー
    pub key: String,
    pub short_id: String,
    pub url: String,
    pub entry: CatalogEntry,
}

impl EntryView {
    pub fn new(entry: &CatalogEntry, base_url: &str) -> Self {
        Self {
            key: entry.identity_key(),
            short_id: entry.short_id(),
            url: asset_url(base_url, entry),
            entry: entry.clone(),
        }
    }
}

/// 現在ページとページ送りの状態
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub rows: Vec<EntryView>,
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
    pub summary: String,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageView {
    pub fn new(page: &Page<'_>, base_url: &str) -> Self {
        Self {
            rows: page.rows.iter().map(|e| EntryView::new(e, base_url)).collect(),
            page: page.page,
            page_count: page.page_count(),
            total: page.total,
            summary: page.summary(),
            has_previous: page.has_previous(),
            has_next: page.has_next(),
        }
    }
}

/// 選択中の画像（合成画像と自然画像）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    pub synthesized: EntryView,
    pub natural: Option<EntryView>,
}

impl SelectionView {
    pub fn new(entry: &CatalogEntry, natural: Option<&CatalogEntry>, base_url: &str) -> Self {
        Self {
            synthesized: EntryView::new(entry, base_url),
            natural: natural.map(|n| EntryView::new(n, base_url)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metamer_common::paginate;

    fn entry(i: usize) -> CatalogEntry {
        CatalogEntry {
            model_name: Some("RGC".to_string()),
            random_seed: Some(i as i64),
            file: format!("metamers/{}.png", i),
            ..Default::default()
        }
    }

    #[test]
    fn test_page_view() {
        let data: Vec<CatalogEntry> = (0..30).map(entry).collect();
        let rows: Vec<&CatalogEntry> = data.iter().collect();
        let view = PageView::new(&paginate(&rows, 2, 24), "https://example.org");

        assert_eq!(view.rows.len(), 6);
        assert_eq!(view.page_count, 2);
        assert!(view.has_previous);
        assert!(!view.has_next);
        assert_eq!(view.rows[0].url, "https://example.org/metamers/24.png");
        assert_eq!(view.summary, "Showing 25 to 30 of 30 results");
    }

    #[test]
    fn test_entry_view_serializes_camel_case() {
        let view = EntryView::new(&entry(1), "data");
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["shortId"].as_str().map(str::len), Some(12));
        assert_eq!(json["entry"]["model_name"], "RGC");
    }
}
