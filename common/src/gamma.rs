//! ガンマ補正
//!
//! RGBA8バッファのR/G/Bに `(i/255)^(1/exponent) * 255` の256段ルックアップテーブルを適用する。
//! アルファはそのままコピー。入力バッファは変更しない。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// 1ピクセルあたりのチャンネル数
pub const CHANNELS: usize = 4;

fn validate_exponent(exponent: f64) -> Result<f64> {
    if exponent.is_finite() && exponent > 0.0 {
        Ok(exponent)
    } else {
        Err(Error::InvalidGamma(exponent))
    }
}

/// 指数ごとのルックアップテーブル
#[derive(Debug, Clone, PartialEq)]
pub struct GammaTable {
    exponent: f64,
    table: [u8; 256],
}

impl GammaTable {
    pub fn new(exponent: f64) -> Result<Self> {
        let exponent = validate_exponent(exponent)?;
        let inverse = 1.0 / exponent;
        let mut table = [0u8; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            let value = (i as f64 / 255.0).powf(inverse) * 255.0;
            *slot = value.round().clamp(0.0, 255.0) as u8;
        }
        Ok(Self { exponent, table })
    }

    fn identity() -> Self {
        let mut table = [0u8; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = i as u8;
        }
        Self { exponent: 1.0, table }
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    #[inline]
    pub fn map(&self, value: u8) -> u8 {
        self.table[value as usize]
    }

    /// 新しいバッファに補正結果を書き出す
    pub fn apply(&self, source: &[u8]) -> Result<Vec<u8>> {
        if source.len() % CHANNELS != 0 {
            return Err(Error::InvalidPixelBuffer(source.len()));
        }
        let mut output = Vec::with_capacity(source.len());
        for pixel in source.chunks_exact(CHANNELS) {
            output.push(self.map(pixel[0]));
            output.push(self.map(pixel[1]));
            output.push(self.map(pixel[2]));
            output.push(pixel[3]);
        }
        Ok(output)
    }
}

/// 1回限りの補正
pub fn gamma_correct(source: &[u8], exponent: f64) -> Result<Vec<u8>> {
    GammaTable::new(exponent)?.apply(source)
}

/// ガンマ補正の状態
///
/// テーブルは指数が変わった時だけ作り直す。
#[derive(Debug, Clone, PartialEq)]
pub struct GammaState {
    active: bool,
    table: GammaTable,
}

impl Default for GammaState {
    fn default() -> Self {
        Self {
            active: false,
            table: GammaTable::identity(),
        }
    }
}

/// シリアライズ用の表現（wasm側とのやり取り）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaSettings {
    pub active: bool,
    pub exponent: f64,
}

impl GammaState {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn exponent(&self) -> f64 {
        self.table.exponent()
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn toggle(&mut self) {
        self.active = !self.active;
    }

    pub fn set_exponent(&mut self, exponent: f64) -> Result<()> {
        if exponent != self.table.exponent() {
            self.table = GammaTable::new(exponent)?;
        }
        Ok(())
    }

    pub fn settings(&self) -> GammaSettings {
        GammaSettings {
            active: self.active,
            exponent: self.exponent(),
        }
    }

    /// 表示用バッファ。無効時は入力をそのまま借用で返す
    pub fn render<'a>(&self, source: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        if self.active {
            Ok(Cow::Owned(self.table.apply(source)?))
        } else {
            Ok(Cow::Borrowed(source))
        }
    }

    /// 画像背後の中間グレー（0-255）
    pub fn background_level(&self) -> f64 {
        if self.active {
            255.0 * 0.5f64.powf(1.0 / self.exponent())
        } else {
            255.0 / 2.0
        }
    }
}
