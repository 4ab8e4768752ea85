//! 表のソートとページ分割

use crate::types::{CatalogEntry, Field, SortDirection};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 1ページの行数（24 / 25 のリビジョンがある）
pub const DEFAULT_PAGE_SIZE: usize = 24;

/// 表の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState {
    /// 1始まり
    pub current_page: usize,
    pub sort_by: Field,
    pub sort_direction: SortDirection,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            current_page: 1,
            sort_by: Field::ModelName,
            sort_direction: SortDirection::Ascending,
        }
    }
}

impl TableState {
    /// 列ヘッダのクリック: 同じ列なら方向を反転、別の列なら列だけ切り替え
    pub fn click_column(&mut self, field: Field) {
        if self.sort_by == field {
            self.sort_direction = self.sort_direction.reversed();
        } else {
            self.sort_by = field;
        }
    }

    pub fn reset_page(&mut self) {
        self.current_page = 1;
    }
}

/// 1フィールドでの比較。値の無いエントリは方向に関わらず末尾
pub fn compare_entries(
    a: &CatalogEntry,
    b: &CatalogEntry,
    field: Field,
    direction: SortDirection,
) -> Ordering {
    match (a.value(field), b.value(field)) {
        (Some(x), Some(y)) => {
            let ordering = x.total_cmp(&y);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// 安定ソート（同値は元の順序を保つ）
pub fn sort_entries(rows: &mut [&CatalogEntry], field: Field, direction: SortDirection) {
    rows.sort_by(|a, b| compare_entries(a, b, field, direction));
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// 1ページ分の行
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub rows: Vec<&'a CatalogEntry>,
    /// 1始まり
    pub page: usize,
    pub page_size: usize,
    /// 絞り込み結果内の開始位置（0始まり）
    pub start: usize,
    /// 終了位置（排他的、件数で頭打ち）
    pub end: usize,
    pub total: usize,
}

impl Page<'_> {
    pub fn page_count(&self) -> usize {
        page_count(self.total, self.page_size)
    }

    pub fn has_previous(&self) -> bool {
        self.start > 0
    }

    pub fn has_next(&self) -> bool {
        self.start + self.page_size < self.total
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 「Showing a to b of n results」
    pub fn summary(&self) -> String {
        let first = if self.rows.is_empty() { self.start } else { self.start + 1 };
        format!("Showing {} to {} of {} results", first, self.end, self.total)
    }
}

/// ページ N は `[(N-1)*size, N*size)`。範囲外のページは空
pub fn paginate<'a>(rows: &[&'a CatalogEntry], page: usize, page_size: usize) -> Page<'a> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = rows.len();
    let start = (page - 1).saturating_mul(page_size);
    let end = start.saturating_add(page_size).min(total);
    let slice = if start < total { &rows[start..end] } else { &[][..] };

    Page {
        rows: slice.to_vec(),
        page,
        page_size,
        start: start.min(total),
        end: end.max(start.min(total)),
        total,
    }
}
