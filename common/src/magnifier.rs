//! 拡大鏡（ズーム）の幾何
//!
//! 表示サイズ（viewport）上の中心点と倍率から、
//! - 画面上の拡大鏡の枠サイズ
//! - 元画像（natural）ピクセル座標での切り出し矩形
//! を求める。サイズが未計測の間は `None` を返す。

use crate::types::{Dimensions, Position, Rect};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 4.0;

/// `Math.min(Math.max(x, min), max)` と同じ。min > max のときは max を返す
fn clamp_between(x: f64, min: f64, max: f64) -> f64 {
    x.max(min).min(max)
}

/// 拡大鏡の状態
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnifierState {
    pub active: bool,
    pub zoom_multiplier: f64,
    pub center: Position,
    pub natural_size: Option<Dimensions>,
    pub viewport_size: Option<Dimensions>,
}

impl Default for MagnifierState {
    fn default() -> Self {
        Self {
            active: false,
            zoom_multiplier: MIN_ZOOM,
            center: Position::new(200.0, 200.0),
            natural_size: None,
            viewport_size: None,
        }
    }
}

impl MagnifierState {
    fn sizes(&self) -> Option<(Dimensions, Dimensions)> {
        let view = self.viewport_size.filter(|d| !d.is_degenerate())?;
        let natural = self.natural_size.filter(|d| !d.is_degenerate())?;
        Some((view, natural))
    }

    /// 画面上の枠サイズ: `(view / natural) * view / zoom`
    pub fn box_size(&self) -> Option<Dimensions> {
        let (view, natural) = self.sizes()?;
        let zoom = self.zoom_multiplier;
        Some(Dimensions {
            width: (view.width / natural.width) * view.width / zoom,
            height: (view.height / natural.height) * view.height / zoom,
        })
    }

    /// 中心を移動（枠が表示領域に収まるようクランプ）
    ///
    /// 幾何が未確定ならそのまま返す。
    pub fn with_center(self, requested: Position) -> Self {
        let (Some(view), Some(size)) = (self.viewport_size, self.box_size()) else {
            return self;
        };
        let x = clamp_between(requested.x, size.width / 2.0, view.width - size.width / 2.0);
        let y = clamp_between(requested.y, size.height / 2.0, view.height - size.height / 2.0);
        Self {
            center: Position::new(x, y),
            ..self
        }
    }

    /// 現在の中心を再クランプ
    pub fn recentered(self) -> Self {
        self.with_center(self.center)
    }

    /// 画面上の枠（左上 + サイズ）
    pub fn box_rect(&self) -> Option<Rect> {
        let size = self.box_size()?;
        Some(Rect {
            x: self.center.x - size.width / 2.0,
            y: self.center.y - size.height / 2.0,
            width: size.width,
            height: size.height,
        })
    }

    /// 元画像ピクセル座標での切り出し矩形
    pub fn cropped_region(&self) -> Option<Rect> {
        let (view, natural) = self.sizes()?;
        let frame = self.box_rect()?;
        Some(Rect {
            x: natural.width * (frame.x / view.width),
            y: natural.height * (frame.y / view.height),
            width: natural.width * (frame.width / view.width),
            height: natural.height * (frame.height / view.height),
        })
    }

    pub fn toggle(&mut self) {
        self.active = !self.active;
        *self = self.recentered();
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        *self = self.recentered();
    }

    /// 倍率を [1, 4] に収めて設定。非有限値は無視
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        self.zoom_multiplier = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        *self = self.recentered();
    }

    /// ドラッグ（ポインタ位置は表示座標）
    pub fn drag_to(&mut self, position: Position) {
        *self = self.with_center(position);
    }

    /// 表示サイズの更新（最後の値が有効）
    pub fn set_viewport_size(&mut self, size: Dimensions) {
        self.viewport_size = Some(size);
        *self = self.recentered();
    }

    /// 画像読み込み完了時の元サイズ
    pub fn set_natural_size(&mut self, size: Dimensions) {
        self.natural_size = Some(size);
        *self = self.recentered();
    }

    pub fn is_ready(&self) -> bool {
        self.sizes().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(zoom: f64) -> MagnifierState {
        let mut state = MagnifierState::default();
        state.set_viewport_size(Dimensions::new(400.0, 300.0));
        state.set_natural_size(Dimensions::new(800.0, 600.0));
        state.set_zoom(zoom);
        state
    }

    #[test]
    fn test_not_ready_returns_none() {
        let state = MagnifierState::default();
        assert!(state.box_size().is_none());
        assert!(state.cropped_region().is_none());
        assert!(!state.is_ready());
        assert_eq!(state.with_center(Position::new(-5.0, -5.0)).center, state.center);
    }

    #[test]
    fn test_zero_size_is_not_ready() {
        let mut state = MagnifierState::default();
        state.set_viewport_size(Dimensions::new(0.0, 0.0));
        state.set_natural_size(Dimensions::new(800.0, 600.0));
        assert!(state.box_size().is_none());
    }

    #[test]
    fn test_box_size_shrinks_with_zoom() {
        let one = ready(1.0).box_size().unwrap();
        let two = ready(2.0).box_size().unwrap();
        assert_eq!(one, Dimensions::new(200.0, 150.0));
        assert_eq!(two, Dimensions::new(100.0, 75.0));
    }

    #[test]
    fn test_center_clamped_inside_viewport() {
        let state = ready(2.0);
        let low = state.with_center(Position::new(-100.0, -100.0));
        assert_eq!(low.center, Position::new(50.0, 37.5));
        let high = state.with_center(Position::new(1000.0, 1000.0));
        assert_eq!(high.center, Position::new(350.0, 262.5));
    }

    #[test]
    fn test_cropped_region_in_natural_pixels() {
        let mut state = ready(2.0);
        state.drag_to(Position::new(200.0, 150.0));
        let region = state.cropped_region().unwrap();
        assert_eq!(region, Rect { x: 300.0, y: 225.0, width: 200.0, height: 150.0 });
    }

    #[test]
    fn test_cropped_region_stays_in_bounds() {
        for zoom in [1.0, 2.0, 3.0, 4.0] {
            let mut state = ready(zoom);
            for (x, y) in [(-50.0, 10.0), (9999.0, -3.0), (120.0, 9999.0)] {
                state.drag_to(Position::new(x, y));
                let region = state.cropped_region().unwrap();
                assert!(region.x >= 0.0 && region.y >= 0.0);
                assert!(region.x + region.width <= 800.0 + 1e-9);
                assert!(region.y + region.height <= 600.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut state = ready(1.0);
        state.set_zoom(0.2);
        assert_eq!(state.zoom_multiplier, MIN_ZOOM);
        state.set_zoom(12.0);
        assert_eq!(state.zoom_multiplier, MAX_ZOOM);
        state.set_zoom(f64::NAN);
        assert_eq!(state.zoom_multiplier, MAX_ZOOM);
    }

    #[test]
    fn test_zoom_change_reclamps_center() {
        let mut state = ready(4.0);
        state.drag_to(Position::new(390.0, 290.0));
        state.set_zoom(1.0);
        let size = state.box_size().unwrap();
        assert_eq!(state.center.x, 400.0 - size.width / 2.0);
        assert_eq!(state.center.y, 300.0 - size.height / 2.0);
    }

    #[test]
    fn test_box_larger_than_viewport_does_not_panic() {
        let mut state = MagnifierState::default();
        state.set_viewport_size(Dimensions::new(400.0, 300.0));
        state.set_natural_size(Dimensions::new(200.0, 150.0));
        // 枠 800x600 > 表示領域、上限側（0）が優先される
        assert_eq!(state.center, Position::new(0.0, 0.0));
    }

    #[test]
    fn test_viewport_latest_value_wins() {
        let mut state = ready(1.0);
        state.set_viewport_size(Dimensions::new(800.0, 600.0));
        state.set_viewport_size(Dimensions::new(400.0, 300.0));
        assert_eq!(state.viewport_size, Some(Dimensions::new(400.0, 300.0)));
    }

    #[test]
    fn test_toggle_flips_active() {
        let mut state = ready(1.0);
        state.toggle();
        assert!(state.active);
        state.toggle();
        assert!(!state.active);
    }
}
