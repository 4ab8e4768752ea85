//! 画像の描画パイプライン
//!
//! 1. 画像をデコードして元サイズを拡大鏡に記録
//! 2. 画像全体（またはズーム時は切り出し矩形）を表示サイズへリサンプル
//! 3. ガンマ補正が有効ならLUTを適用
//! 4. PNGで保存
//!
//! 各画像は独立しているので並列に処理する。1枚の失敗は警告を出してスキップ。

use crate::error::{MetamerError, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use indicatif::{ProgressBar, ProgressStyle};
use metamer_common::{Dimensions, GammaState, MagnifierState, Rect};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// 描画する1枚
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// 出力ファイル名（拡張子なし）
    pub name: String,
    pub bytes: Vec<u8>,
    /// 拡大鏡の切り出し領域を描くか
    pub zoom: bool,
}

/// 画像を画像サイズ内に収まる整数矩形で切り出す
fn crop_to_bounds(image: &RgbaImage, region: Rect) -> RgbaImage {
    let (width, height) = image.dimensions();
    let x = region.x.max(0.0).floor().min(width.saturating_sub(1) as f64) as u32;
    let y = region.y.max(0.0).floor().min(height.saturating_sub(1) as f64) as u32;
    let w = (region.width.round().max(1.0) as u32).min(width - x);
    let h = (region.height.round().max(1.0) as u32).min(height - y);
    imageops::crop_imm(image, x, y, w, h).to_image()
}

/// `drawImage(src, sx, sy, sw, sh, 0, 0, vw, vh)` 相当
pub fn draw_to_viewport(
    image: &RgbaImage,
    source: Option<Rect>,
    viewport: (u32, u32),
) -> RgbaImage {
    let (vw, vh) = (viewport.0.max(1), viewport.1.max(1));
    match source {
        Some(region) => {
            let cropped = crop_to_bounds(image, region);
            imageops::resize(&cropped, vw, vh, FilterType::Triangle)
        }
        None if image.dimensions() == (vw, vh) => image.clone(),
        None => imageops::resize(image, vw, vh, FilterType::Triangle),
    }
}

fn viewport_pixels(magnifier: &MagnifierState, image: &RgbaImage) -> (u32, u32) {
    match magnifier.viewport_size.filter(|d| !d.is_degenerate()) {
        Some(size) => (size.width.round() as u32, size.height.round() as u32),
        None => image.dimensions(),
    }
}

/// 1枚分の表示画像を作る
///
/// ズーム時に幾何が未確定なら画像全体を描く。
pub fn render_view(
    image: &DynamicImage,
    magnifier: &MagnifierState,
    gamma: &GammaState,
    zoom: bool,
) -> Result<RgbaImage> {
    let rgba = image.to_rgba8();
    let viewport = viewport_pixels(magnifier, &rgba);
    // 切り出し矩形は実際に読み込んだ画像のサイズ基準
    let mut magnifier = *magnifier;
    magnifier.set_natural_size(Dimensions::new(rgba.width() as f64, rgba.height() as f64));
    let source = if zoom { magnifier.cropped_region() } else { None };
    let drawn = draw_to_viewport(&rgba, source, viewport);

    let (width, height) = drawn.dimensions();
    let pixels = gamma.render(drawn.as_raw())?;
    RgbaImage::from_raw(width, height, pixels.into_owned())
        .ok_or_else(|| MetamerError::Render(format!("バッファサイズ不一致: {}x{}", width, height)))
}

fn decode(job: &RenderJob) -> Result<DynamicImage> {
    image::load_from_memory(&job.bytes)
        .map_err(|e| MetamerError::ImageLoad(format!("{}: {}", job.name, e)))
}

/// 元画像サイズを読み取る
pub fn natural_size(bytes: &[u8]) -> Result<Dimensions> {
    let image = image::load_from_memory(bytes)?;
    Ok(Dimensions::new(image.width() as f64, image.height() as f64))
}

fn render_job(
    job: &RenderJob,
    magnifier: &MagnifierState,
    gamma: &GammaState,
    output_dir: &Path,
) -> Result<PathBuf> {
    let image = decode(job)?;
    let rendered = render_view(&image, magnifier, gamma, job.zoom)?;
    let path = output_dir.join(format!("{}.png", job.name));
    rendered.save(&path)?;
    Ok(path)
}

/// 全ジョブを並列に描画し、書き出せたパスを返す
pub fn render_all(
    jobs: &[RenderJob],
    magnifier: &MagnifierState,
    gamma: &GammaState,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let progress = ProgressBar::new(jobs.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}") {
        progress.set_style(style);
    }

    let written: Vec<PathBuf> = jobs
        .par_iter()
        .filter_map(|job| {
            let result = render_job(job, magnifier, gamma, output_dir);
            progress.inc(1);
            match result {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(name = %job.name, "描画をスキップ: {}", e);
                    None
                }
            }
        })
        .collect();

    progress.finish_and_clear();
    Ok(written)
}
