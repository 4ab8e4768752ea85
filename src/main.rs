use anyhow::Context;
use clap::Parser;
use metamer_browser::{cli, config, error, fetch, render, report};
use cli::{Cli, Commands};
use config::Config;
use error::MetamerError;
use fetch::DataSource;
use metamer_common::{CatalogEntry, Dimensions, Explorer, SortDirection};
use render::RenderJob;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 短縮IDからメタマーを探す
fn find_entry(explorer: &Explorer, id: &str) -> error::Result<CatalogEntry> {
    explorer
        .catalog()
        .and_then(|catalog| catalog.find_by_short_id(id.trim()))
        .cloned()
        .ok_or_else(|| MetamerError::EntryNotFound(id.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut config = Config::load()?;

    // 設定コマンドはカタログを取得しない
    if let Commands::Config { set_data_url, set_page_size, show } = &cli.command {
        if let Some(url) = set_data_url {
            config.set_data_url(url.clone())?;
            config.save()?;
            println!("✔ データURLを設定しました");
        }
        if let Some(page_size) = *set_page_size {
            config.set_page_size(page_size)?;
            config.save()?;
            println!("✔ ページサイズを設定しました");
        }
        if *show {
            println!("設定:");
            println!("  データURL: {}", config.data_url());
            println!("  ページサイズ: {}", config.page_size);
            println!("  HTTPタイムアウト: {}秒", config.http_timeout_seconds);
            println!("  設定ファイル: {}", Config::config_path()?.display());
        }
        return Ok(());
    }

    let data_url = cli.data_url.clone().unwrap_or_else(|| config.data_url());
    let source = DataSource::new(&data_url, Duration::from_secs(config.http_timeout_seconds))?;
    let catalog = source
        .fetch_catalog()
        .await
        .with_context(|| format!("カタログを取得できません: {}", data_url))?;

    let mut explorer = Explorer::new(config.page_size);
    explorer.load(catalog);

    match cli.command {
        Commands::List { filters, sort, desc, page } => {
            if !filters.is_empty() {
                filters.apply(&mut explorer)?;
            }
            let direction = if desc { SortDirection::Descending } else { SortDirection::Ascending };
            let field = sort.unwrap_or(explorer.table().sort_by);
            explorer.set_sort(field, direction);
            explorer.go_to_page(page);

            let Some(page) = explorer.page() else {
                return Err(metamer_common::Error::NotLoaded.into());
            };
            if page.total == 0 {
                println!("条件に一致する画像はありません");
            } else if page.is_empty() {
                println!("ページ {} は範囲外です（全{}ページ）", page.page, page.page_count());
            } else {
                println!("{}", report::format_page(&page, explorer.table()));
            }
        }

        Commands::Options => {
            println!("{}", report::format_options(&explorer));
        }

        Commands::Show { id } => {
            let entry = find_entry(&explorer, &id)?;
            explorer.select(entry.identity_key());
            if let Some(selected) = explorer.selected() {
                println!("{}", report::format_entry(selected, explorer.selected_natural()));
            }
        }

        Commands::Render { id, viewport, gamma, zoom, center, output } => {
            println!("🖼  metamer-browser - 描画\n");

            let entry = find_entry(&explorer, &id)?;
            explorer.select(entry.identity_key());
            let natural = explorer.selected_natural().cloned();
            if natural.is_none() {
                tracing::warn!(id = %entry.short_id(), "対応する自然画像がありません");
            }

            println!("[1/2] 画像を取得中...");
            let metamer_bytes = source.fetch_asset(&entry).await?;
            let size = render::natural_size(&metamer_bytes)?;
            let view = viewport
                .map(|(w, h)| Dimensions::new(w as f64, h as f64))
                .unwrap_or(size);
            explorer.magnifier.set_viewport_size(view);
            explorer.magnifier.set_natural_size(size);

            if let Some(exponent) = gamma {
                explorer.gamma.set_exponent(exponent)?;
                explorer.gamma.set_active(true);
            }
            if let Some(zoom) = zoom {
                explorer.magnifier.set_active(true);
                explorer.magnifier.set_zoom(zoom);
                if let Some(center) = center {
                    explorer.magnifier.drag_to(center);
                }
                if !explorer.magnifier.is_ready() {
                    tracing::warn!(
                        id = %entry.short_id(),
                        "画像サイズが不明なため拡大表示は全体を描画します"
                    );
                }
            }

            let short_id = entry.short_id();
            let mut sources = vec![(format!("{}_synthesized", short_id), metamer_bytes)];
            if let Some(natural) = &natural {
                sources.push((format!("{}_natural", short_id), source.fetch_asset(natural).await?));
            }
            println!("✔ {}枚を取得\n", sources.len());

            let mut jobs = Vec::new();
            for (name, bytes) in sources {
                if explorer.magnifier.active {
                    jobs.push(RenderJob {
                        name: format!("{}_zoom", name),
                        bytes: bytes.clone(),
                        zoom: true,
                    });
                }
                jobs.push(RenderJob {
                    name,
                    bytes,
                    zoom: false,
                });
            }

            println!("[2/2] 描画中...");
            let magnifier = explorer.magnifier;
            let gamma_state = explorer.gamma.clone();
            let written = tokio::task::spawn_blocking(move || {
                render::render_all(&jobs, &magnifier, &gamma_state, &output)
            })
            .await??;

            for path in &written {
                println!("✔ {}", path.display());
            }
            println!("\n✅ 描画完了");
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}
