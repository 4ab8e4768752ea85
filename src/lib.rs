//! metamer-browser
//!
//! メタマー画像カタログの取得・絞り込み・描画を行うCLI

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod render;
pub mod report;
