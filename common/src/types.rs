//! カタログの型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - Field: メタデータのフィールド（フィルタ・ソート・表の列）
//! - FieldValue: 1エントリ上の1フィールドの値
//! - CatalogEntry: metadata.json の1レコード
//! - Dimensions / Position / Rect: 拡大鏡の幾何

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt;

use crate::error::Error;
use crate::lenient;

/// メタデータのフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ModelName,
    Downsampled,
    PsychophysicsComparison,
    TargetImage,
    Scaling,
    InitializationType,
    RandomSeed,
    GammaCorrected,
}

/// フィールド値の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Bool,
    Number,
    Integer,
}

impl Field {
    /// 全フィールド（説明テーブルの順）
    pub const ALL: [Field; 8] = [
        Field::ModelName,
        Field::Downsampled,
        Field::PsychophysicsComparison,
        Field::TargetImage,
        Field::Scaling,
        Field::InitializationType,
        Field::RandomSeed,
        Field::GammaCorrected,
    ];

    /// フィルタ対象のフィールド（random_seed, gamma_corrected 以外）
    pub const FILTERABLE: [Field; 6] = [
        Field::ModelName,
        Field::Downsampled,
        Field::PsychophysicsComparison,
        Field::TargetImage,
        Field::Scaling,
        Field::InitializationType,
    ];

    /// 表の列（gamma_corrected 以外）
    pub const TABLE_COLUMNS: [Field; 7] = [
        Field::ModelName,
        Field::Downsampled,
        Field::PsychophysicsComparison,
        Field::TargetImage,
        Field::Scaling,
        Field::InitializationType,
        Field::RandomSeed,
    ];

    /// JSON上のキー名
    pub fn name(&self) -> &'static str {
        match self {
            Field::ModelName => "model_name",
            Field::Downsampled => "downsampled",
            Field::PsychophysicsComparison => "psychophysics_comparison",
            Field::TargetImage => "target_image",
            Field::Scaling => "scaling",
            Field::InitializationType => "initialization_type",
            Field::RandomSeed => "random_seed",
            Field::GammaCorrected => "gamma_corrected",
        }
    }

    /// 表示用ラベル（アンダースコアを空白に）
    pub fn label(&self) -> String {
        self.name().replace('_', " ")
    }

    pub fn description(&self) -> &'static str {
        match self {
            Field::ModelName => "The model used to synthesize this image.",
            Field::Downsampled => "Whether the image was downsampled before synthesis.",
            Field::PsychophysicsComparison => {
                "The experimental comparison(s) this image was used in."
            }
            Field::TargetImage => {
                "The natural image whose model representation this metamer was synthesized to match."
            }
            Field::Scaling => "The model's scaling parameter used to synthesize this image.",
            Field::InitializationType => {
                "The image used to initialize metamer synthesis for this image."
            }
            Field::RandomSeed => {
                "The number used to set pytorch and numpy's random number generators for synthesis."
            }
            Field::GammaCorrected => "Whether this image has been gamma corrected.",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::ModelName
            | Field::PsychophysicsComparison
            | Field::TargetImage
            | Field::InitializationType => FieldKind::Text,
            Field::Downsampled | Field::GammaCorrected => FieldKind::Bool,
            Field::Scaling => FieldKind::Number,
            Field::RandomSeed => FieldKind::Integer,
        }
    }

    /// 範囲スライダーで絞り込むフィールドか
    pub fn is_range(&self) -> bool {
        matches!(self, Field::Scaling)
    }

    pub fn is_filterable(&self) -> bool {
        Self::FILTERABLE.contains(self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.name() == normalized)
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

/// 1エントリ上のフィールド値
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    Number(f64),
    Integer(i64),
}

impl FieldValue {
    fn rank(&self) -> u8 {
        match self {
            FieldValue::Bool(_) => 0,
            FieldValue::Integer(_) | FieldValue::Number(_) => 1,
            FieldValue::Text(_) => 2,
        }
    }

    /// 数値として解釈（範囲フィルタ用）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// ソート用の全順序
    pub fn total_cmp(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.rank().cmp(&b.rank()),
            },
        }
    }
}

/// JSON/JSと同じ文字列化（true / false / 1 / 0.5）
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Integer(n) => write!(f, "{}", n),
        }
    }
}

/// 数値キーの比較（文字列化されたフィルタキーを数値順に並べる）
pub fn compare_keys(kind: FieldKind, a: &str, b: &str) -> Ordering {
    match kind {
        FieldKind::Number | FieldKind::Integer => match (a.parse::<f64>(), b.parse::<f64>()) {
            (Ok(x), Ok(y)) => x.total_cmp(&y),
            _ => a.cmp(b),
        },
        _ => a.cmp(b),
    }
}

/// metadata.json の1レコード
///
/// メタデータ項目はJSONに欠けていることがあるため全て `Option`。
/// 型の合わない値も欠けた項目として読み、フィルタ時にスキップされる。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub model_name: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub downsampled: Option<bool>,

    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub psychophysics_comparison: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_image: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub scaling: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub initialization_type: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub random_seed: Option<i64>,

    #[serde(
        default,
        deserialize_with = "lenient::flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub gamma_corrected: Option<bool>,

    /// データURL基準の相対パス
    #[serde(default)]
    pub file: String,
}

impl CatalogEntry {
    pub fn value(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::ModelName => self.model_name.clone().map(FieldValue::Text),
            Field::Downsampled => self.downsampled.map(FieldValue::Bool),
            Field::PsychophysicsComparison => {
                self.psychophysics_comparison.clone().map(FieldValue::Text)
            }
            Field::TargetImage => self.target_image.clone().map(FieldValue::Text),
            Field::Scaling => self.scaling.map(FieldValue::Number),
            Field::InitializationType => self.initialization_type.clone().map(FieldValue::Text),
            Field::RandomSeed => self.random_seed.map(FieldValue::Integer),
            Field::GammaCorrected => self.gamma_corrected.map(FieldValue::Bool),
        }
    }

    /// フィルタ照合用の文字列値
    pub fn value_string(&self, field: Field) -> Option<String> {
        self.value(field).map(|v| v.to_string())
    }

    pub fn is_gamma_corrected(&self) -> bool {
        self.gamma_corrected.unwrap_or(false)
    }

    /// 再描画をまたいで選択行を特定するためのキー
    ///
    /// 全項目をキー名の昇順に `値_` で連結する。JSONに無い項目は含めない。
    pub fn identity_key(&self) -> String {
        let mut parts: Vec<(&str, String)> = Field::ALL
            .iter()
            .filter_map(|field| self.value_string(*field).map(|v| (field.name(), v)))
            .collect();
        parts.push(("file", self.file.clone()));
        parts.sort_by(|a, b| a.0.cmp(b.0));

        parts.into_iter().fold(String::new(), |mut key, (_, value)| {
            key.push_str(&value);
            key.push('_');
            key
        })
    }

    /// 識別キーのSHA-256先頭12桁（ファイル名・CLI指定用）
    pub fn short_id(&self) -> String {
        let digest = Sha256::digest(self.identity_key().as_bytes());
        hex::encode(digest)[..12].to_string()
    }
}

/// 幅・高さ
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// 0以下・非有限の寸法は未計測扱い
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// 座標
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 矩形（左上 + 寸法）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// ソート方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// 表ヘッダの矢印
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}
