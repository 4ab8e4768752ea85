//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid gamma exponent: {0} (must be finite and > 0)")]
    InvalidGamma(f64),

    #[error("Invalid pixel buffer: length {0} is not a multiple of 4")]
    InvalidPixelBuffer(usize),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field is not filterable: {0}")]
    NotFilterable(String),

    #[error("Catalog is not loaded")]
    NotLoaded,
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
