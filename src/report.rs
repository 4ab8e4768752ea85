//! 端末向けの表示整形

use metamer_common::{CatalogEntry, Explorer, Field, Page, TableState};

/// 表のセル（値が無いフィールドは空欄）
fn cell(entry: &CatalogEntry, field: Field) -> String {
    entry.value_string(field).unwrap_or_default()
}

/// 1ページ分の表（先頭列は短縮ID）
pub fn format_page(page: &Page<'_>, table: &TableState) -> String {
    let mut header: Vec<String> = vec!["id".to_string()];
    for field in Field::TABLE_COLUMNS {
        let mut label = field.label();
        if table.sort_by == field {
            label.push(' ');
            label.push_str(table.sort_direction.arrow());
        }
        header.push(label);
    }

    let rows: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|entry| {
            let mut row = vec![entry.short_id()];
            row.extend(Field::TABLE_COLUMNS.iter().map(|f| cell(entry, *f)));
            row
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |row: &[String]| -> String {
        row.iter()
            .zip(&widths)
            .map(|(value, width)| {
                let pad = width.saturating_sub(value.chars().count());
                format!("{}{}", value, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(&header)];
    lines.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    lines.extend(rows.iter().map(|row| format_row(row)));
    lines.push(String::new());
    lines.push(format!(
        "{}  (page {}/{})",
        page.summary(),
        page.page,
        page.page_count().max(1)
    ));
    lines.join("\n")
}

/// フィルタの選択肢一覧
pub fn format_options(explorer: &Explorer) -> String {
    let mut lines = Vec::new();
    for field in Field::FILTERABLE {
        lines.push(format!("{}: {}", field.label(), field.description()));
        if let Some(range) = explorer.range(field).filter(|_| field.is_range()) {
            lines.push(format!(
                "  range: {:.3} .. {:.3}  (selected {:.3} .. {:.3})",
                range.min, range.max, range.from, range.to
            ));
        }
        let options: Vec<String> = explorer
            .options(field)
            .into_iter()
            .map(|o| if o.included { o.key } else { format!("({})", o.key) })
            .collect();
        lines.push(format!("  {}", options.join(", ")));
    }
    lines.join("\n")
}

/// 1エントリの詳細
pub fn format_entry(entry: &CatalogEntry, natural: Option<&CatalogEntry>) -> String {
    let mut lines = vec![format!("id: {}", entry.short_id())];
    for field in Field::ALL {
        let value = entry.value_string(field).unwrap_or_else(|| "-".to_string());
        lines.push(format!("{}: {}", field.label(), value));
    }
    lines.push(format!("file: {}", entry.file));
    lines.push(format!(
        "natural image: {}",
        natural.map(|n| n.file.as_str()).unwrap_or("-")
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use metamer_common::{paginate, Catalog, SortDirection};

    fn entry(model: &str, scaling: f64) -> CatalogEntry {
        CatalogEntry {
            model_name: Some(model.to_string()),
            scaling: Some(scaling),
            target_image: Some("azulejos".to_string()),
            file: format!("{}.png", model),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_page_marks_sort_column() {
        let data = vec![entry("RGC", 0.01), entry("V1", 0.5)];
        let rows: Vec<&CatalogEntry> = data.iter().collect();
        let page = paginate(&rows, 1, 24);
        let table = TableState {
            sort_by: Field::Scaling,
            sort_direction: SortDirection::Descending,
            ..Default::default()
        };

        let text = format_page(&page, &table);
        assert!(text.contains("scaling ▼"));
        assert!(text.contains("RGC"));
        assert!(text.contains("Showing 1 to 2 of 2 results"));
    }

    #[test]
    fn test_format_options_marks_excluded() {
        let mut explorer = Explorer::default();
        explorer.load(Catalog {
            metamers: vec![entry("RGC", 0.01), entry("V1", 0.5)],
            natural_images: vec![],
        });
        explorer.set_filter_value(Field::ModelName, "V1", false).unwrap();

        let text = format_options(&explorer);
        assert!(text.contains("RGC, (V1)"));
        assert!(text.contains("range: 0.010 .. 0.500"));
    }

    #[test]
    fn test_format_entry_shows_missing_as_dash() {
        let text = format_entry(&entry("RGC", 0.01), None);
        assert!(text.contains("model name: RGC"));
        assert!(text.contains("random seed: -"));
        assert!(text.contains("natural image: -"));
    }
}
