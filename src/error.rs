use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetamerError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("カタログ取得エラー: {0}")]
    Fetch(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像処理エラー: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("画像が見つかりません: {0}（`metamer-browser list` で表示されるIDを指定してください）")]
    EntryNotFound(String),

    #[error("引数エラー: {0}")]
    InvalidArgument(String),

    #[error("描画エラー: {0}")]
    Render(String),

    #[error(transparent)]
    Common(#[from] metamer_common::Error),
}

pub type Result<T> = std::result::Result<T, MetamerError>;
