//! metadata.json の項目を寛容に読むためのデシリアライザ
//!
//! 型が合わない値は警告を出して `None`（欠けた項目扱い）にする。
//! 1件の不正値でカタログ全体を読み込めなくなることはない。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn raw<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(deserializer)
}

fn mismatch<T>(expected: &str, value: &Value) -> Option<T> {
    tracing::warn!(
        expected,
        value = %value,
        "metadata value has unexpected type; treated as missing"
    );
    None
}

/// 文字列項目（数値・真偽値は文字列化して受け付ける）
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(raw(deserializer)?.and_then(|value| match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => mismatch("string", &other),
    }))
}

/// 真偽値項目（"true" / "false" の文字列も可）
pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(raw(deserializer)?.and_then(|value| match &value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => mismatch("bool", &value),
        },
        Value::Null => None,
        _ => mismatch("bool", &value),
    }))
}

/// 数値項目（数値として読める文字列も可）
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(raw(deserializer)?.and_then(|value| {
        let parsed = match &value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Null => return None,
            _ => None,
        };
        match parsed.filter(|n| n.is_finite()) {
            Some(n) => Some(n),
            None => mismatch("number", &value),
        }
    }))
}

/// 整数項目（`1.0` のような整数値の浮動小数も可）
pub fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    fn integral(n: f64) -> Option<i64> {
        (n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64).then_some(n as i64)
    }

    Ok(raw(deserializer)?.and_then(|value| {
        let parsed = match &value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
            Value::Null => return None,
            _ => None,
        };
        match parsed {
            Some(n) => Some(n),
            None => mismatch("integer", &value),
        }
    }))
}
