use crate::error::{MetamerError, Result};
use clap::{Args, Parser, Subcommand};
use metamer_common::{Explorer, Field, Position, RangeBound};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "metamer-browser")]
#[command(about = "メタマー画像カタログの閲覧ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// データのベースURL（またはディレクトリ）。設定ファイルより優先
    #[arg(long, global = true)]
    pub data_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 絞り込み・ソートした一覧を表示
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// ソート列（例: scaling, "model name"）
        #[arg(long)]
        sort: Option<Field>,

        /// 降順でソート
        #[arg(long)]
        desc: bool,

        /// 表示するページ（1始まり）
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// フィルタの選択肢を表示
    Options,

    /// 1枚の詳細を表示
    Show {
        /// 一覧に表示される短縮ID（前方一致）
        #[arg(required = true)]
        id: String,
    },

    /// メタマーと自然画像をPNGで書き出す
    Render {
        /// 一覧に表示される短縮ID（前方一致）
        #[arg(required = true)]
        id: String,

        /// 表示サイズ（例: 512x512）。省略時は元画像サイズ
        #[arg(long, value_parser = parse_viewport)]
        viewport: Option<(u32, u32)>,

        /// ガンマ補正の指数
        #[arg(short, long)]
        gamma: Option<f64>,

        /// ズーム倍率（1〜4）。指定時は拡大鏡の切り出しも書き出す
        #[arg(short, long)]
        zoom: Option<f64>,

        /// 拡大鏡の中心（表示座標、例: 200,200）。--zoom と併用
        #[arg(long, value_parser = parse_center, requires = "zoom")]
        center: Option<Position>,

        /// 出力ディレクトリ
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// 設定を管理
    Config {
        /// データURLを設定
        #[arg(long)]
        set_data_url: Option<String>,

        /// 1ページの行数を設定
        #[arg(long)]
        set_page_size: Option<usize>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 一覧の絞り込み条件（指定したフィールドは指定値のみ採用）
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// モデル名
    #[arg(long = "model", value_delimiter = ',')]
    pub model_name: Vec<String>,

    /// 実験での比較条件
    #[arg(long = "comparison", value_delimiter = ',')]
    pub psychophysics_comparison: Vec<String>,

    /// 初期化画像
    #[arg(long = "init", value_delimiter = ',')]
    pub initialization_type: Vec<String>,

    /// 対象の自然画像
    #[arg(long = "target", value_delimiter = ',')]
    pub target_image: Vec<String>,

    /// ダウンサンプル有無 (true/false)
    #[arg(long)]
    pub downsampled: Option<bool>,

    /// scaling の下限
    #[arg(long)]
    pub scaling_from: Option<f64>,

    /// scaling の上限
    #[arg(long)]
    pub scaling_to: Option<f64>,
}

impl FilterArgs {
    /// 条件が1つも指定されていないか
    pub fn is_empty(&self) -> bool {
        self.model_name.is_empty()
            && self.psychophysics_comparison.is_empty()
            && self.initialization_type.is_empty()
            && self.target_image.is_empty()
            && self.downsampled.is_none()
            && self.scaling_from.is_none()
            && self.scaling_to.is_none()
    }

    /// 条件をフィルタ状態へ反映
    pub fn apply(&self, explorer: &mut Explorer) -> Result<()> {
        let lists = [
            (Field::ModelName, &self.model_name),
            (Field::PsychophysicsComparison, &self.psychophysics_comparison),
            (Field::InitializationType, &self.initialization_type),
            (Field::TargetImage, &self.target_image),
        ];
        for (field, values) in lists {
            if values.is_empty() {
                continue;
            }
            select_only(explorer, field, values)?;
        }

        if let Some(downsampled) = self.downsampled {
            select_only(explorer, Field::Downsampled, &[downsampled.to_string()])?;
        }

        if let Some(from) = self.scaling_from {
            explorer.set_range(Field::Scaling, RangeBound::From, from)?;
        }
        if let Some(to) = self.scaling_to {
            explorer.set_range(Field::Scaling, RangeBound::To, to)?;
        }
        Ok(())
    }
}

fn select_only(explorer: &mut Explorer, field: Field, values: &[String]) -> Result<()> {
    explorer.set_all(field, false)?;
    for value in values {
        let value = value.trim();
        if !explorer.options(field).iter().any(|o| o.key == value) {
            tracing::warn!(field = %field, value, "カタログに存在しない値");
        }
        explorer.set_filter_value(field, value, true)?;
    }
    Ok(())
}

/// `WxH` 形式の表示サイズ
pub fn parse_viewport(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| MetamerError::InvalidArgument(format!("WxH 形式で指定してください: {}", s)))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| MetamerError::InvalidArgument(format!("不正なサイズ: {}", s)))
    };
    Ok((parse(w)?, parse(h)?))
}

/// `X,Y` 形式の座標
pub fn parse_center(s: &str) -> Result<Position> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| MetamerError::InvalidArgument(format!("X,Y 形式で指定してください: {}", s)))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| MetamerError::InvalidArgument(format!("不正な座標: {}", s)))
    };
    Ok(Position::new(parse(x)?, parse(y)?))
}
