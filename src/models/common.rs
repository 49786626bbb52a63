use serde_json::Value;

/// Reads a non-negative count from a JSON number or numeric string.
///
/// Upstream mirrors disagree on whether counters are numbers or strings, and
/// some report fractional values. Negative, non-finite and non-numeric values
/// are treated as absent.
pub fn count_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().and_then(count_from_f64)),
        Value::String(text) => count_from_str(text),
        _ => None,
    }
}

pub fn count_from_str(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<u64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(count_from_f64))
}

fn count_from_f64(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value.trunc() as u64)
}

/// Adds up upstream counts, pinning at `u64::MAX` instead of overflowing.
pub fn saturating_total<I>(counts: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    counts.into_iter().fold(0, u64::saturating_add)
}

/// First value of `key` in a raw query string. Repeated keys never fail the request.
pub fn first_query_value(raw: Option<&str>, key: &str) -> Option<String> {
    let raw = raw?;
    url::form_urlencoded::parse(raw.as_bytes())
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

// Custom deserializer for counters that may arrive as numbers or numeric strings.
// Anything unreadable becomes 0 instead of failing the whole document.
pub fn deserialize_lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{Error, Visitor};
    use std::fmt;

    struct LenientCount;

    impl<'de> Visitor<'de> for LenientCount {
        type Value = u64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or numeric string")
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(u64::try_from(value).unwrap_or(0))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(count_from_f64(value).unwrap_or(0))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(count_from_str(value).unwrap_or(0))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(0)
        }
    }

    deserializer.deserialize_any(LenientCount)
}
