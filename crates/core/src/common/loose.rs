//! 宽松的单元格反序列化。
//!
//! API 返回的 JSON 与 pandas 写出的 CSV 对同一列的表示并不一致
//! (`5` / `5.0`、`true` / `True`、数组 / 文本)。这里的函数把这些形态统一
//! 折叠为 `Option`，无法识别的形态视为空值而不是报错。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Other(Value),
}

fn int_from_float(value: f64) -> Option<i64> {
    // i64 的可表示区间，超出即视为无效
    const LIMIT: f64 = 9_223_372_036_854_775_807.0;
    if !value.is_finite() || value.fract() != 0.0 || value.abs() >= LIMIT {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    Some(value as i64)
}

fn int_from_text(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(int_from_float))
}

fn bool_from_text(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "1" | "1.0" | "yes" => Some(true),
        "false" | "0" | "0.0" | "no" => Some(false),
        _ => None,
    }
}

/// 整数列：接受整数、整值浮点与数字文本。
pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<Cell>::deserialize(deserializer)?;
    Ok(cell.and_then(|cell| match cell {
        Cell::Int(v) => Some(v),
        Cell::Float(v) => int_from_float(v),
        Cell::Text(v) => int_from_text(&v),
        Cell::Bool(_) | Cell::Other(_) => None,
    }))
}

/// 浮点列：接受整数、浮点与数字文本。
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<Cell>::deserialize(deserializer)?;
    Ok(cell.and_then(|cell| match cell {
        Cell::Int(v) => v.to_string().parse::<f64>().ok(),
        Cell::Float(v) if v.is_finite() => Some(v),
        Cell::Text(v) => v.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Cell::Float(_) | Cell::Bool(_) | Cell::Other(_) => None,
    }))
}

/// 布尔列：接受 `true`/`True`/`1` 等写法。
pub fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<Cell>::deserialize(deserializer)?;
    Ok(cell.and_then(|cell| match cell {
        Cell::Bool(v) => Some(v),
        Cell::Int(1) => Some(true),
        Cell::Int(0) => Some(false),
        Cell::Text(v) => bool_from_text(&v),
        Cell::Int(_) | Cell::Float(_) | Cell::Other(_) => None,
    }))
}

/// # Summary
/// 文本列：保留任意形态的值。
///
/// # Logic
/// 1. 字符串原样保留，空串视为空值。
/// 2. 数字、布尔转为其字面文本。
/// 3. 数组、对象序列化为 JSON 文本 (例如 `all_awardings`)。
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<Cell>::deserialize(deserializer)?;
    Ok(cell.and_then(|cell| match cell {
        Cell::Text(v) if v.is_empty() => None,
        Cell::Text(v) => Some(v),
        Cell::Bool(v) => Some(v.to_string()),
        Cell::Int(v) => Some(v.to_string()),
        Cell::Float(v) => Some(v.to_string()),
        Cell::Other(Value::Null) => None,
        Cell::Other(v) => Some(v.to_string()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "opt_i64")]
        count: Option<i64>,
        #[serde(default, deserialize_with = "opt_bool")]
        flag: Option<bool>,
        #[serde(default, deserialize_with = "opt_text")]
        extra: Option<String>,
    }

    #[test]
    fn test_loose_json_cells() {
        let row: Row =
            serde_json::from_str(r#"{"count": 5.0, "flag": "True", "extra": [{"a": 1}]}"#).unwrap();
        assert_eq!(row.count, Some(5));
        assert_eq!(row.flag, Some(true));
        assert_eq!(row.extra.as_deref(), Some(r#"[{"a":1}]"#));
    }

    #[test]
    fn test_loose_unusable_cells_become_none() {
        let row: Row =
            serde_json::from_str(r#"{"count": "soon", "flag": 7, "extra": null}"#).unwrap();
        assert_eq!(row.count, None);
        assert_eq!(row.flag, None);
        assert_eq!(row.extra, None);

        let row: Row = serde_json::from_str("{}").unwrap();
        assert_eq!(row.count, None);
    }
}
