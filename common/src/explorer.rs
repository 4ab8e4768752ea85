//! 閲覧状態をまとめて保持するコントローラ
//!
//! カタログ・フィルタ・表・選択・ガンマ・拡大鏡の状態を1か所で所有し、
//! 絞り込み/ソート/ページ分割はこの状態を引数に渡して導出する。
//! フィルタを変更すると必ず1ページ目に戻る。

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::filter::{FieldFilter, FilterOption, FilterState, RangeBound, RangeSelection};
use crate::gamma::GammaState;
use crate::magnifier::MagnifierState;
use crate::table::{self, Page, TableState, DEFAULT_PAGE_SIZE};
use crate::types::{CatalogEntry, Field, SortDirection};

#[derive(Debug, Clone)]
pub struct Explorer {
    catalog: Option<Catalog>,
    filters: Option<FilterState>,
    table: TableState,
    page_size: usize,
    selected_key: Option<String>,
    pub gamma: GammaState,
    pub magnifier: MagnifierState,
}

impl Default for Explorer {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Explorer {
    pub fn new(page_size: usize) -> Self {
        Self {
            catalog: None,
            filters: None,
            table: TableState::default(),
            page_size: page_size.max(1),
            selected_key: None,
            gamma: GammaState::default(),
            magnifier: MagnifierState::default(),
        }
    }

    /// カタログを読み込み、出現値を全て採用状態にしてフィルタを初期化
    pub fn load(&mut self, catalog: Catalog) {
        self.filters = Some(FilterState::from_entries(&catalog.metamers));
        self.catalog = Some(catalog);
        self.table.reset_page();
        self.selected_key = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.catalog.is_some() && self.filters.is_some()
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn filters(&self) -> Option<&FilterState> {
        self.filters.as_ref()
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 絞り込み+ソート済みの行（未読み込みなら None、0件は `Some(vec![])`）
    pub fn filtered_rows(&self) -> Option<Vec<&CatalogEntry>> {
        let catalog = self.catalog.as_ref()?;
        let filters = self.filters.as_ref()?;
        let mut rows = filters.apply(&catalog.metamers);
        table::sort_entries(&mut rows, self.table.sort_by, self.table.sort_direction);
        Some(rows)
    }

    /// 現在ページ
    pub fn page(&self) -> Option<Page<'_>> {
        let rows = self.filtered_rows()?;
        Some(table::paginate(&rows, self.table.current_page, self.page_size))
    }

    fn filters_mut(&mut self) -> Result<&mut FilterState> {
        self.filters.as_mut().ok_or(Error::NotLoaded)
    }

    fn mutate_filters<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut FilterState) -> Result<()>,
    {
        f(self.filters_mut()?)?;
        self.table.reset_page();
        Ok(())
    }

    pub fn set_filter_value(&mut self, field: Field, key: &str, included: bool) -> Result<()> {
        self.mutate_filters(|filters| filters.set_value(field, key, included))
    }

    pub fn set_filter_values(&mut self, field: Field, values: FieldFilter) -> Result<()> {
        self.mutate_filters(|filters| filters.set_values(field, values))
    }

    pub fn set_all(&mut self, field: Field, included: bool) -> Result<()> {
        self.mutate_filters(|filters| filters.set_all(field, included))
    }

    pub fn set_range(&mut self, field: Field, bound: RangeBound, value: f64) -> Result<()> {
        self.mutate_filters(|filters| filters.set_range(field, bound, value))
    }

    pub fn range(&self, field: Field) -> Option<RangeSelection> {
        self.filters.as_ref()?.range(field)
    }

    pub fn options(&self, field: Field) -> Vec<FilterOption> {
        self.filters
            .as_ref()
            .map(|filters| filters.options(field))
            .unwrap_or_default()
    }

    /// 列ヘッダのクリック
    pub fn sort_by_column(&mut self, field: Field) {
        self.table.click_column(field);
    }

    pub fn set_sort(&mut self, field: Field, direction: SortDirection) {
        self.table.sort_by = field;
        self.table.sort_direction = direction;
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.table.current_page = page.max(1);
    }

    pub fn next_page(&mut self) {
        if self.page().is_some_and(|page| page.has_next()) {
            self.table.current_page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.table.current_page > 1 {
            self.table.current_page -= 1;
        }
    }

    pub fn select(&mut self, key: impl Into<String>) {
        self.selected_key = Some(key.into());
    }

    pub fn clear_selection(&mut self) {
        self.selected_key = None;
    }

    pub fn selected_key(&self) -> Option<&str> {
        self.selected_key.as_deref()
    }

    /// 選択中のメタマー
    pub fn selected(&self) -> Option<&CatalogEntry> {
        let key = self.selected_key.as_deref()?;
        self.catalog.as_ref()?.find_by_key(key)
    }

    /// 選択中メタマーの自然画像
    pub fn selected_natural(&self) -> Option<&CatalogEntry> {
        let selected = self.selected()?;
        self.catalog.as_ref()?.natural_for(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(n: usize) -> Catalog {
        let metamers = (0..n)
            .map(|i| CatalogEntry {
                model_name: Some(if i < 24 { "RGC" } else { "V1" }.to_string()),
                target_image: Some(format!("target_{}", i % 3)),
                scaling: Some((i % 5) as f64 * 0.1),
                downsampled: Some(false),
                random_seed: Some(i as i64),
                gamma_corrected: Some(false),
                file: format!("metamers/{}.png", i),
                ..Default::default()
            })
            .collect();
        let natural_images = (0..3)
            .map(|i| CatalogEntry {
                target_image: Some(format!("target_{}", i)),
                file: format!("natural/{}.png", i),
                ..Default::default()
            })
            .collect();
        Catalog {
            metamers,
            natural_images,
        }
    }

    #[test]
    fn test_not_loaded_is_distinct_from_empty() {
        let explorer = Explorer::default();
        assert!(explorer.filtered_rows().is_none());
        assert!(explorer.page().is_none());

        let mut explorer = Explorer::default();
        explorer.load(catalog(50));
        explorer.set_all(Field::ModelName, false).unwrap();
        let rows = explorer.filtered_rows().expect("読み込み済み");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_filter_mutation_before_load_fails() {
        let mut explorer = Explorer::default();
        let result = explorer.set_filter_value(Field::ModelName, "RGC", false);
        assert!(matches!(result, Err(Error::NotLoaded)));
    }

    #[test]
    fn test_scenario_24_matches_two_pages() {
        let mut explorer = Explorer::new(24);
        explorer.load(catalog(50));
        explorer.set_filter_value(Field::ModelName, "V1", false).unwrap();

        let page = explorer.page().unwrap();
        assert_eq!(page.total, 24);
        assert_eq!(page.rows.len(), 24);

        explorer.go_to_page(2);
        assert!(explorer.page().unwrap().is_empty());
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut explorer = Explorer::new(10);
        explorer.load(catalog(50));
        explorer.next_page();
        explorer.next_page();
        assert_eq!(explorer.table().current_page, 3);

        explorer.set_filter_value(Field::TargetImage, "target_0", false).unwrap();
        assert_eq!(explorer.table().current_page, 1);

        explorer.go_to_page(2);
        explorer.set_range(Field::Scaling, RangeBound::To, 0.2).unwrap();
        assert_eq!(explorer.table().current_page, 1);
    }

    #[test]
    fn test_next_page_stops_at_last() {
        let mut explorer = Explorer::new(24);
        explorer.load(catalog(30));
        explorer.next_page();
        explorer.next_page();
        explorer.next_page();
        assert_eq!(explorer.table().current_page, 2);
        explorer.previous_page();
        explorer.previous_page();
        assert_eq!(explorer.table().current_page, 1);
    }

    #[test]
    fn test_sort_descending_by_scaling() {
        let mut explorer = Explorer::default();
        explorer.load(catalog(50));
        explorer.set_sort(Field::Scaling, SortDirection::Descending);
        let page = explorer.page().unwrap();
        let max = explorer
            .filtered_rows()
            .unwrap()
            .iter()
            .filter_map(|e| e.scaling)
            .fold(f64::MIN, f64::max);
        assert_eq!(page.rows[0].scaling, Some(max));
    }

    #[test]
    fn test_selection_survives_filter_changes() {
        let mut explorer = Explorer::default();
        explorer.load(catalog(50));
        let key = explorer.page().unwrap().rows[3].identity_key();
        explorer.select(key.clone());

        explorer.set_filter_value(Field::ModelName, "V1", false).unwrap();
        assert_eq!(explorer.selected().unwrap().identity_key(), key);
    }

    #[test]
    fn test_selected_natural_matches_target() {
        let mut explorer = Explorer::default();
        explorer.load(catalog(10));
        let entry = explorer.catalog().unwrap().metamers[4].clone();
        explorer.select(entry.identity_key());

        let natural = explorer.selected_natural().expect("自然画像なし");
        assert_eq!(natural.target_image, entry.target_image);
    }

    #[test]
    fn test_options_available_after_load() {
        let mut explorer = Explorer::default();
        assert!(explorer.options(Field::ModelName).is_empty());
        explorer.load(catalog(50));
        let options = explorer.options(Field::ModelName);
        assert_eq!(options.len(), 2);
        assert!(options.iter().all(|o| o.included));
    }

    #[test]
    fn test_monotonic_filtering() {
        let mut explorer = Explorer::default();
        explorer.load(catalog(50));
        explorer.set_all(Field::TargetImage, false).unwrap();
        let none = explorer.filtered_rows().unwrap().len();
        explorer.set_filter_value(Field::TargetImage, "target_1", true).unwrap();
        let some = explorer.filtered_rows().unwrap().len();
        explorer.set_filter_value(Field::TargetImage, "target_2", true).unwrap();
        let more = explorer.filtered_rows().unwrap().len();
        assert!(none <= some && some <= more);
        assert!(more <= 50);
    }
}
