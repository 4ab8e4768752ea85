//! Metamer Explorer (WASM)
//!
//! 閲覧エンジンをブラウザから使うためのバインディング。
//! 描画（canvas・拡大鏡の枠・ドラッグ）はJavaScript側で行い、
//! 状態と計算はすべてこちらで持つ。

mod fetch;
mod views;

use metamer_common::{
    asset_url, Catalog, Dimensions, Explorer, Field, Position, RangeBound, DEFAULT_PAGE_SIZE,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use views::{EntryView, PageView, SelectionView};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

fn to_js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

/// JSON互換の形（MapではなくObject）でJSへ渡す
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(to_js_error)
}

pub(crate) fn parse_field(name: &str) -> Result<Field, String> {
    name.parse::<Field>().map_err(|e| e.to_string())
}

pub(crate) fn parse_bound(name: &str) -> Result<RangeBound, String> {
    match name.trim().to_lowercase().as_str() {
        "from" | "min" => Ok(RangeBound::From),
        "to" | "max" => Ok(RangeBound::To),
        other => Err(format!("Unknown range bound: {}", other)),
    }
}

/// ブラウザ側の閲覧状態
#[wasm_bindgen]
pub struct MetamerExplorer {
    inner: Explorer,
    base_url: String,
}

#[wasm_bindgen]
impl MetamerExplorer {
    #[wasm_bindgen(constructor)]
    pub fn new(base_url: String, page_size: Option<usize>) -> Self {
        Self {
            inner: Explorer::new(page_size.unwrap_or(DEFAULT_PAGE_SIZE)),
            base_url,
        }
    }

    /// metadata.json の内容を読み込む
    #[wasm_bindgen(js_name = loadJson)]
    pub fn load_json(&mut self, json: &str) -> Result<(), JsValue> {
        let catalog = Catalog::from_json(json).map_err(to_js_error)?;
        self.inner.load(catalog);
        Ok(())
    }

    #[wasm_bindgen(js_name = isLoaded)]
    pub fn is_loaded(&self) -> bool {
        self.inner.is_loaded()
    }

    /// 現在ページ（未読み込みなら null）
    pub fn page(&self) -> Result<JsValue, JsValue> {
        match self.inner.page() {
            Some(page) => to_js(&PageView::new(&page, &self.base_url)),
            None => Ok(JsValue::NULL),
        }
    }

    /// フィルタ状態全体（未読み込みなら null）
    pub fn filters(&self) -> Result<JsValue, JsValue> {
        match self.inner.filters() {
            Some(filters) => to_js(filters),
            None => Ok(JsValue::NULL),
        }
    }

    /// チェックボックスの選択肢
    pub fn options(&self, field: &str) -> Result<JsValue, JsValue> {
        let field = parse_field(field).map_err(to_js_error)?;
        to_js(&self.inner.options(field))
    }

    #[wasm_bindgen(js_name = setFilterValue)]
    pub fn set_filter_value(
        &mut self,
        field: &str,
        key: &str,
        included: bool,
    ) -> Result<(), JsValue> {
        let field = parse_field(field).map_err(to_js_error)?;
        self.inner
            .set_filter_value(field, key, included)
            .map_err(to_js_error)
    }

    /// 全選択/全解除
    #[wasm_bindgen(js_name = setAll)]
    pub fn set_all(&mut self, field: &str, included: bool) -> Result<(), JsValue> {
        let field = parse_field(field).map_err(to_js_error)?;
        self.inner.set_all(field, included).map_err(to_js_error)
    }

    /// 範囲スライダーの値（"from" / "to"）
    #[wasm_bindgen(js_name = setRange)]
    pub fn set_range(&mut self, field: &str, bound: &str, value: f64) -> Result<(), JsValue> {
        let field = parse_field(field).map_err(to_js_error)?;
        let bound = parse_bound(bound).map_err(to_js_error)?;
        self.inner.set_range(field, bound, value).map_err(to_js_error)
    }

    pub fn range(&self, field: &str) -> Result<JsValue, JsValue> {
        let field = parse_field(field).map_err(to_js_error)?;
        match self.inner.range(field) {
            Some(range) => to_js(&range),
            None => Ok(JsValue::NULL),
        }
    }

    /// 列ヘッダのクリック
    #[wasm_bindgen(js_name = sortByColumn)]
    pub fn sort_by_column(&mut self, field: &str) -> Result<(), JsValue> {
        let field = parse_field(field).map_err(to_js_error)?;
        self.inner.sort_by_column(field);
        Ok(())
    }

    #[wasm_bindgen(js_name = tableState)]
    pub fn table_state(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.table())
    }

    #[wasm_bindgen(js_name = goToPage)]
    pub fn go_to_page(&mut self, page: usize) {
        self.inner.go_to_page(page);
    }

    #[wasm_bindgen(js_name = nextPage)]
    pub fn next_page(&mut self) {
        self.inner.next_page();
    }

    #[wasm_bindgen(js_name = previousPage)]
    pub fn previous_page(&mut self) {
        self.inner.previous_page();
    }

    /// 行の選択（キーは page() の各行の key）
    pub fn select(&mut self, key: String) {
        self.inner.select(key);
    }

    /// 選択中の行のキー（表の強調表示用）
    #[wasm_bindgen(js_name = selectedKey)]
    pub fn selected_key(&self) -> Option<String> {
        self.inner.selected_key().map(str::to_string)
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.inner.clear_selection();
    }

    /// 選択中メタマーと自然画像のURL（未選択なら null）
    pub fn selected(&self) -> Result<JsValue, JsValue> {
        match self.inner.selected() {
            Some(entry) => to_js(&SelectionView::new(
                entry,
                self.inner.selected_natural(),
                &self.base_url,
            )),
            None => Ok(JsValue::NULL),
        }
    }

    // ---- ガンマ補正 ----

    #[wasm_bindgen(js_name = setGammaActive)]
    pub fn set_gamma_active(&mut self, active: bool) {
        self.inner.gamma.set_active(active);
    }

    #[wasm_bindgen(js_name = toggleGamma)]
    pub fn toggle_gamma(&mut self) {
        self.inner.gamma.toggle();
    }

    #[wasm_bindgen(js_name = setGammaExponent)]
    pub fn set_gamma_exponent(&mut self, exponent: f64) -> Result<(), JsValue> {
        self.inner.gamma.set_exponent(exponent).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = gammaSettings)]
    pub fn gamma_settings(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.gamma.settings())
    }

    /// 画像背後の背景グレー（0-255）
    #[wasm_bindgen(js_name = backgroundLevel)]
    pub fn background_level(&self) -> f64 {
        self.inner.gamma.background_level()
    }

    /// `ImageData.data` を表示用に変換（無効時はコピーのみ）
    #[wasm_bindgen(js_name = renderPixels)]
    pub fn render_pixels(&self, data: &[u8]) -> Result<Vec<u8>, JsValue> {
        let pixels = self.inner.gamma.render(data).map_err(to_js_error)?;
        Ok(pixels.into_owned())
    }

    // ---- 拡大鏡 ----

    #[wasm_bindgen(js_name = toggleMagnifier)]
    pub fn toggle_magnifier(&mut self) {
        self.inner.magnifier.toggle();
    }

    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, zoom: f64) {
        self.inner.magnifier.set_zoom(zoom);
    }

    /// ドラッグ中のポインタ位置（表示座標）
    #[wasm_bindgen(js_name = dragTo)]
    pub fn drag_to(&mut self, x: f64, y: f64) {
        self.inner.magnifier.drag_to(Position::new(x, y));
    }

    #[wasm_bindgen(js_name = setViewportSize)]
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.inner.magnifier.set_viewport_size(Dimensions::new(width, height));
    }

    #[wasm_bindgen(js_name = setNaturalSize)]
    pub fn set_natural_size(&mut self, width: f64, height: f64) {
        self.inner.magnifier.set_natural_size(Dimensions::new(width, height));
    }

    /// 表示サイズと元サイズが揃い、枠を描けるか
    #[wasm_bindgen(js_name = magnifierReady)]
    pub fn magnifier_ready(&self) -> bool {
        self.inner.magnifier.is_ready()
    }

    #[wasm_bindgen(js_name = magnifierState)]
    pub fn magnifier_state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.magnifier)
    }

    /// 表示座標での枠（幾何が未確定なら null）
    #[wasm_bindgen(js_name = magnifierBox)]
    pub fn magnifier_box(&self) -> Result<JsValue, JsValue> {
        match self.inner.magnifier.box_rect() {
            Some(rect) => to_js(&rect),
            None => Ok(JsValue::NULL),
        }
    }

    /// `drawImage` に渡す元画像上の切り出し矩形（幾何が未確定なら null）
    #[wasm_bindgen(js_name = croppedRegion)]
    pub fn cropped_region(&self) -> Result<JsValue, JsValue> {
        match self.inner.magnifier.cropped_region() {
            Some(rect) => to_js(&rect),
            None => Ok(JsValue::NULL),
        }
    }
}

/// カタログを取得して閲覧状態を作る
#[wasm_bindgen(js_name = fetchExplorer)]
pub async fn fetch_explorer(
    base_url: String,
    page_size: Option<usize>,
) -> Result<MetamerExplorer, JsValue> {
    let json = fetch::fetch_text(&metamer_common::metadata_url(&base_url)).await?;
    let mut explorer = MetamerExplorer::new(base_url, page_size);
    explorer.load_json(&json)?;
    Ok(explorer)
}

/// 1回限りのガンマ補正
#[wasm_bindgen(js_name = gammaCorrect)]
pub fn gamma_correct(data: &[u8], exponent: f64) -> Result<Vec<u8>, JsValue> {
    metamer_common::gamma_correct(data, exponent).map_err(to_js_error)
}

/// データURL基準の画像URL
#[wasm_bindgen(js_name = assetUrl)]
pub fn asset_url_for(base_url: &str, file: &str) -> String {
    asset_url(
        base_url,
        &metamer_common::CatalogEntry {
            file: file.to_string(),
            ..Default::default()
        },
    )
}
