use bigdecimal::BigDecimal;
use serde::{self, Deserialize, Deserializer};
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumericRaw {
    String(String),
    Number(serde_json::Number),
}

impl NumericRaw {
    fn into_text(self) -> String {
        match self {
            NumericRaw::String(s) => s.trim().to_string(),
            // 整数无损；小数已被 serde_json 转成 f64
            NumericRaw::Number(n) => n.to_string(),
        }
    }
}

/// 字符串 -> BigDecimal，不经过 f64
///
/// JSON numbers are refused: serde_json has already rounded them through `f64`.
pub fn deserialize_bigdecimal<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    match NumericRaw::deserialize(deserializer)? {
        NumericRaw::String(text) => {
            BigDecimal::from_str(text.trim()).map_err(serde::de::Error::custom)
        }
        NumericRaw::Number(n) => Err(serde::de::Error::custom(format!(
            "decimal {} must be sent as a string to keep its precision",
            n
        ))),
    }
}

/// Unix seconds sent either as `"1726292220"` or `1726292220`.
pub fn deserialize_unix_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let text = NumericRaw::deserialize(deserializer)?.into_text();
    text.parse::<i64>()
        .map_err(|e| serde::de::Error::custom(format!("not a valid unix timestamp '{}': {}", text, e)))
}

/// `null` and missing fields both become `None`, blank strings too.
pub fn deserialize_blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}
