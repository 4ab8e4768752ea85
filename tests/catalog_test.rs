//! カタログ取得から一覧表示までのテスト
//!
//! ローカルディレクトリをデータ置き場として、取得・絞り込み・ページ分割を検証

use metamer_browser::cli::FilterArgs;
use metamer_browser::error::MetamerError;
use metamer_browser::fetch::DataSource;
use metamer_common::{Explorer, Field, RangeBound, SortDirection};
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

/// 50枚のメタマーと3枚の自然画像（うち2枚はガンマ補正済みで除外される）
fn write_catalog(dir: &Path) {
    let mut metamers: Vec<serde_json::Value> = (0..50)
        .map(|i| {
            serde_json::json!({
                "model_name": if i % 2 == 0 { "RGC_norm_gaussian" } else { "V1_norm_s6_gaussian" },
                "downsampled": i % 5 == 0,
                "psychophysics_comparison": "met_vs_ref",
                "target_image": format!("target_{}", i % 3),
                "scaling": ([0.01, 0.063, 0.5][i % 3]),
                "initialization_type": "white",
                "random_seed": i,
                "gamma_corrected": false,
                "file": format!("metamers/{}.png", i)
            })
        })
        .collect();
    for i in 0..2 {
        metamers.push(serde_json::json!({
            "model_name": "RGC_norm_gaussian",
            "target_image": "target_0",
            "scaling": 0.01,
            "random_seed": 100 + i,
            "gamma_corrected": true,
            "file": format!("metamers/gamma_{}.png", i)
        }));
    }
    let natural_images: Vec<serde_json::Value> = (0..3)
        .map(|i| {
            serde_json::json!({
                "target_image": format!("target_{}", i),
                "file": format!("natural/target_{}.png", i)
            })
        })
        .collect();

    let json = serde_json::json!({ "metamers": metamers, "natural_images": natural_images });
    std::fs::write(dir.join("metadata.json"), json.to_string()).expect("Failed to write catalog");
}

async fn load_explorer(dir: &Path) -> Explorer {
    let source = DataSource::new(&dir.display().to_string(), Duration::from_secs(5))
        .expect("Failed to create source");
    let catalog = source.fetch_catalog().await.expect("Failed to fetch catalog");
    let mut explorer = Explorer::new(24);
    explorer.load(catalog);
    explorer
}

/// ガンマ補正済みメタマーは読み込み時に除外
#[tokio::test]
async fn test_fetch_local_catalog() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_catalog(dir.path());

    let explorer = load_explorer(dir.path()).await;
    let catalog = explorer.catalog().unwrap();

    assert_eq!(catalog.len(), 50);
    assert_eq!(catalog.natural_images.len(), 3);
    assert!(catalog.metamers.iter().all(|e| !e.is_gamma_corrected()));
}

/// metadata.json が無い場合
#[tokio::test]
async fn test_fetch_missing_catalog() {
    let dir = tempdir().expect("Failed to create temp dir");
    let source =
        DataSource::new(&dir.path().display().to_string(), Duration::from_secs(5)).unwrap();

    let result = source.fetch_catalog().await;
    assert!(matches!(result, Err(MetamerError::FileNotFound(_))));
}

/// 壊れたJSON
#[tokio::test]
async fn test_fetch_invalid_catalog() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("metadata.json"), "{ not json").unwrap();
    let source =
        DataSource::new(&dir.path().display().to_string(), Duration::from_secs(5)).unwrap();

    let result = source.fetch_catalog().await;
    assert!(matches!(result, Err(MetamerError::Common(_))));
}

/// 1ページ24件で3ページ
#[tokio::test]
async fn test_pagination_over_catalog() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_catalog(dir.path());
    let mut explorer = load_explorer(dir.path()).await;

    let page = explorer.page().unwrap();
    assert_eq!(page.rows.len(), 24);
    assert_eq!(page.page_count(), 3);
    assert_eq!(page.summary(), "Showing 1 to 24 of 50 results");

    explorer.next_page();
    explorer.next_page();
    let last = explorer.page().unwrap();
    assert_eq!(last.rows.len(), 2);
    assert!(!last.has_next());

    // 最終ページからは進まない
    explorer.next_page();
    assert_eq!(explorer.table().current_page, 3);
}

/// CLIの絞り込み条件を適用すると1ページ目に戻る
#[tokio::test]
async fn test_filter_args_reset_page() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_catalog(dir.path());
    let mut explorer = load_explorer(dir.path()).await;
    explorer.go_to_page(2);

    let args = FilterArgs {
        model_name: vec!["V1_norm_s6_gaussian".into()],
        target_image: vec!["target_1".into()],
        ..Default::default()
    };
    args.apply(&mut explorer).unwrap();

    assert_eq!(explorer.table().current_page, 1);
    let rows = explorer.filtered_rows().unwrap();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|e| {
        e.model_name.as_deref() == Some("V1_norm_s6_gaussian")
            && e.target_image.as_deref() == Some("target_1")
    }));
}

/// 範囲スライダーと降順ソート
#[tokio::test]
async fn test_scaling_range_and_sort() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_catalog(dir.path());
    let mut explorer = load_explorer(dir.path()).await;

    // 0.05 は観測値 0.063 に丸められる
    explorer.set_range(Field::Scaling, RangeBound::From, 0.05).unwrap();
    let range = explorer.range(Field::Scaling).unwrap();
    assert_eq!(range.from, 0.063);
    assert_eq!(range.to, 0.5);

    explorer.set_sort(Field::Scaling, SortDirection::Descending);
    let rows = explorer.filtered_rows().unwrap();
    assert!(rows.iter().all(|e| e.scaling.unwrap() >= 0.063));
    assert_eq!(rows.first().unwrap().scaling, Some(0.5));
    assert_eq!(rows.last().unwrap().scaling, Some(0.063));
}

/// 全て除外すると0件（未読み込みとは区別される）
#[tokio::test]
async fn test_exclude_all_gives_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_catalog(dir.path());
    let mut explorer = load_explorer(dir.path()).await;

    explorer.set_all(Field::ModelName, false).unwrap();
    let rows = explorer.filtered_rows().unwrap();
    assert!(rows.is_empty());
    assert_eq!(explorer.page().unwrap().summary(), "Showing 0 to 0 of 0 results");

    assert!(Explorer::default().filtered_rows().is_none());
}

/// 選択中メタマーの自然画像
#[tokio::test]
async fn test_selected_natural_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_catalog(dir.path());
    let mut explorer = load_explorer(dir.path()).await;

    let entry = explorer.catalog().unwrap().metamers[4].clone();
    let short_id = entry.short_id();
    let found = explorer.catalog().unwrap().find_by_short_id(&short_id).cloned();
    assert_eq!(found.as_ref(), Some(&entry));

    explorer.select(entry.identity_key());
    assert_eq!(explorer.selected(), Some(&entry));
    assert_eq!(
        explorer.selected_natural().map(|n| n.file.as_str()),
        Some("natural/target_1.png")
    );
}
