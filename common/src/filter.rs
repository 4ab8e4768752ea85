//! フィルタ状態
//!
//! フィルタ対象フィールドごとに「文字列化した値 → 採用フラグ」の表を持つ。
//! フィールド間はAND、同一フィールド内の採用値はOR。
//! 表が `None` のフィールドは絞り込まない。

use crate::error::{Error, Result};
use crate::types::{compare_keys, CatalogEntry, Field};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 1フィールド分の値 → 採用フラグ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldFilter {
    values: BTreeMap<String, bool>,
}

impl FieldFilter {
    /// 全値を採用状態で作成
    pub fn all_included<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: keys.into_iter().map(|k| (k.into(), true)).collect(),
        }
    }

    /// 表に無い値は不採用
    pub fn is_included(&self, key: &str) -> bool {
        self.values.get(key).copied().unwrap_or(false)
    }

    pub fn set(&mut self, key: impl Into<String>, included: bool) {
        self.values.insert(key.into(), included);
    }

    pub fn set_all(&mut self, included: bool) {
        for flag in self.values.values_mut() {
            *flag = included;
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 数値として解釈できるキーを昇順で
    fn numeric_keys(&self) -> Vec<(f64, &str)> {
        let mut keys: Vec<(f64, &str)> = self
            .values
            .keys()
            .filter_map(|k| k.parse::<f64>().ok().map(|n| (n, k.as_str())))
            .collect();
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        keys
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for FieldFilter {
    fn from_iter<T: IntoIterator<Item = (S, bool)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// チェックボックス表示用の選択肢
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub key: String,
    pub included: bool,
}

/// 範囲スライダーのどちらの端か
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeBound {
    From,
    To,
}

/// 範囲スライダーの現在値と端点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSelection {
    pub from: f64,
    pub to: f64,
    pub min: f64,
    pub max: f64,
}

/// フィルタ状態（フィルタ対象フィールドごとに1つ）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<FieldFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downsampled: Option<FieldFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psychophysics_comparison: Option<FieldFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_image: Option<FieldFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling: Option<FieldFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initialization_type: Option<FieldFilter>,
}

impl FilterState {
    /// カタログに出現する全値を採用状態で初期化
    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        let mut state = Self::default();
        for field in Field::FILTERABLE {
            let observed = crate::catalog::observed_values(entries, field);
            if let Some(slot) = state.slot_mut(field) {
                *slot = Some(FieldFilter::all_included(observed));
            }
        }
        state
    }

    fn slot(&self, field: Field) -> Option<&Option<FieldFilter>> {
        match field {
            Field::ModelName => Some(&self.model_name),
            Field::Downsampled => Some(&self.downsampled),
            Field::PsychophysicsComparison => Some(&self.psychophysics_comparison),
            Field::TargetImage => Some(&self.target_image),
            Field::Scaling => Some(&self.scaling),
            Field::InitializationType => Some(&self.initialization_type),
            Field::RandomSeed | Field::GammaCorrected => None,
        }
    }

    fn slot_mut(&mut self, field: Field) -> Option<&mut Option<FieldFilter>> {
        match field {
            Field::ModelName => Some(&mut self.model_name),
            Field::Downsampled => Some(&mut self.downsampled),
            Field::PsychophysicsComparison => Some(&mut self.psychophysics_comparison),
            Field::TargetImage => Some(&mut self.target_image),
            Field::Scaling => Some(&mut self.scaling),
            Field::InitializationType => Some(&mut self.initialization_type),
            Field::RandomSeed | Field::GammaCorrected => None,
        }
    }

    fn filter_mut(&mut self, field: Field) -> Result<&mut FieldFilter> {
        let slot = self
            .slot_mut(field)
            .ok_or_else(|| Error::NotFilterable(field.name().to_string()))?;
        Ok(slot.get_or_insert_with(FieldFilter::default))
    }

    pub fn get(&self, field: Field) -> Option<&FieldFilter> {
        self.slot(field).and_then(Option::as_ref)
    }

    /// 有効なフィルタを (フィールド, 表) で列挙
    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldFilter)> {
        Field::FILTERABLE
            .into_iter()
            .filter_map(move |field| self.get(field).map(|filter| (field, filter)))
    }

    pub fn is_included(&self, field: Field, key: &str) -> bool {
        self.get(field).is_some_and(|filter| filter.is_included(key))
    }

    /// チェックボックス1つの切り替え
    pub fn set_value(&mut self, field: Field, key: &str, included: bool) -> Result<()> {
        self.filter_mut(field)?.set(key, included);
        Ok(())
    }

    /// フィールドの表を丸ごと置き換え
    pub fn set_values(&mut self, field: Field, values: FieldFilter) -> Result<()> {
        *self.filter_mut(field)? = values;
        Ok(())
    }

    /// 「all」「none」
    pub fn set_all(&mut self, field: Field, included: bool) -> Result<()> {
        self.filter_mut(field)?.set_all(included);
        Ok(())
    }

    /// 数値フィールドの現在の範囲
    ///
    /// 採用値が無い場合は from/to を観測値の最小/最大とする。
    pub fn range(&self, field: Field) -> Option<RangeSelection> {
        let filter = self.get(field)?;
        let keys = filter.numeric_keys();
        let (min, _) = *keys.first()?;
        let (max, _) = *keys.last()?;
        let included: Vec<f64> = keys
            .iter()
            .filter(|(_, key)| filter.is_included(key))
            .map(|(n, _)| *n)
            .collect();
        Some(RangeSelection {
            from: included.first().copied().unwrap_or(min),
            to: included.last().copied().unwrap_or(max),
            min,
            max,
        })
    }

    /// 範囲スライダーの操作
    ///
    /// 要求値は観測値のうち要求値以上の最初の値に丸める（最大値を超えたら最大値）。
    /// from が to を超えたら to を、to が from を下回ったら from を追随させ、
    /// 表全体を `[from, to]` 内の値だけ採用するように作り直す。
    pub fn set_range(&mut self, field: Field, bound: RangeBound, value: f64) -> Result<()> {
        if !field.is_filterable() {
            return Err(Error::NotFilterable(field.name().to_string()));
        }
        // 表が無い、または数値キーが無い
        let Some(current) = self.range(field) else {
            return Ok(());
        };
        let filter = self.filter_mut(field)?;
        let keys: Vec<(f64, String)> = filter
            .numeric_keys()
            .into_iter()
            .map(|(n, k)| (n, k.to_string()))
            .collect();

        let index = keys.partition_point(|(n, _)| *n < value);
        let target = keys
            .get(index)
            .or_else(|| keys.last())
            .map(|(n, _)| *n)
            .unwrap_or(value);

        let (mut from, mut to) = match bound {
            RangeBound::From => (target, current.to),
            RangeBound::To => (current.from, target),
        };
        match bound {
            RangeBound::From if from > to => to = from,
            RangeBound::To if to < from => from = to,
            _ => {}
        }

        for (n, key) in keys {
            filter.set(key, n >= from && n <= to);
        }
        Ok(())
    }

    /// 表示用の選択肢（数値フィールドは数値順）
    pub fn options(&self, field: Field) -> Vec<FilterOption> {
        let Some(filter) = self.get(field) else {
            return Vec::new();
        };
        let mut options: Vec<FilterOption> = filter
            .iter()
            .map(|(key, included)| FilterOption {
                key: key.to_string(),
                included,
            })
            .collect();
        options.sort_by(|a, b| compare_keys(field.kind(), &a.key, &b.key));
        options
    }

    /// エントリが全フィルタを通るか
    ///
    /// エントリに無い項目はそのフィールドの判定をスキップする。
    pub fn accepts(&self, entry: &CatalogEntry) -> bool {
        for (field, filter) in self.iter() {
            let Some(value) = entry.value_string(field) else {
                tracing::debug!(
                    field = field.name(),
                    file = %entry.file,
                    "filter field missing on entry"
                );
                continue;
            };
            if !filter.is_included(&value) {
                return false;
            }
        }
        true
    }

    /// 絞り込み（入力順を保持）
    pub fn apply<'a, I>(&self, entries: I) -> Vec<&'a CatalogEntry>
    where
        I: IntoIterator<Item = &'a CatalogEntry>,
    {
        entries.into_iter().filter(|entry| self.accepts(entry)).collect()
    }
}
