//! Amount handling: lenient parsing and fixed USD formatting
//!
//! Amounts arrive from the store, JSON bodies and CSV imports. Anything missing,
//! null or non-numeric becomes 0 so aggregates never see NaN.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Replace non-finite values with 0
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Normalize -0.0 to 0.0 for cleaner display
pub fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

/// Format as USD with two decimals and thousands separators: `$1,234.50`, `-$3.00`
pub fn format_usd(value: f64) -> String {
    let value = normalize_zero(sanitize(value));
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

/// Parse a currency string produced by [`format_usd`] (or a plain number)
pub fn parse_usd(text: &str) -> Option<f64> {
    let text = text.trim();
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let cleaned: String = rest
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let value: f64 = cleaned.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Serde helper: numbers, numeric strings and currency strings parse; anything else is 0
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawAmount>::deserialize(deserializer)? {
        Some(RawAmount::Number(n)) => sanitize(n),
        Some(RawAmount::Text(s)) => parse_usd(&s).unwrap_or(0.0),
        Some(RawAmount::Other(_)) | None => 0.0,
    })
}

/// Serde helper for optional amounts: missing, null or unparseable values are `None`
pub fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawAmount>::deserialize(deserializer)? {
        Some(RawAmount::Number(n)) if n.is_finite() => Some(n),
        Some(RawAmount::Text(s)) => parse_usd(&s),
        _ => None,
    })
}

/// Serde helper for head counts: same leniency as amounts, rounded and clamped at 0
pub fn deserialize_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserialize_amount(deserializer)?;
    Ok(value.round().max(0.0) as i64)
}
