//! Tolerant lookups over `serde_json::Value` trees.
//!
//! Converters never fail on a missing or mistyped optional field: every
//! helper here answers "absent" (`None`, `""`, `0`) instead of erroring,
//! and leaves the reporting to the validators.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Map, Value};

/// Key under which the XML tree stores element text when the element also
/// carries attributes.
pub const TEXT_KEY: &str = "_";

/// Key under which the XML tree stores attributes.
pub const ATTR_KEY: &str = "$";

/// First child of `node` matching any of `aliases`, in alias order.
///
/// Arrays are looked through: a repeated element resolves to its first
/// occurrence.
pub fn get<'a, S: AsRef<str>>(node: &'a Value, aliases: &[S]) -> Option<&'a Value> {
    let obj = first(node)?.as_object()?;
    aliases
        .iter()
        .find_map(|alias| obj.get(alias.as_ref()))
        .filter(|v| !v.is_null())
}

/// Same as [`get`] on an already-unwrapped object.
pub fn get_in<'a, S: AsRef<str>>(obj: &'a Map<String, Value>, aliases: &[S]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|alias| obj.get(alias.as_ref()))
        .filter(|v| !v.is_null())
}

/// `node` itself, or the first element when it is an array.
pub fn first(node: &Value) -> Option<&Value> {
    match node {
        Value::Array(items) => items.first(),
        Value::Null => None,
        other => Some(other),
    }
}

/// Normalize a single element or a repeated one into a list.
pub fn list(node: Option<&Value>) -> Vec<&Value> {
    match node {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter(|v| !v.is_null()).collect(),
        Some(other) => vec![other],
    }
}

/// Text content of a scalar or XML text node, trimmed. Absent → `""`.
pub fn text(node: Option<&Value>) -> String {
    match node.and_then(first) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Object(obj)) => obj
            .get(TEXT_KEY)
            .map(|t| text(Some(t)))
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Like [`text`], but `None` for blank values.
pub fn opt_text(node: Option<&Value>) -> Option<String> {
    non_empty(text(node))
}

pub fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Parse a decimal out of a JSON number or numeric string.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Numeric value, or `None` when absent or not numeric.
pub fn opt_decimal(node: Option<&Value>) -> Option<Decimal> {
    parse_decimal(&text(node))
}

/// Numeric value with a fallback of zero.
pub fn decimal_or_zero(node: Option<&Value>) -> Decimal {
    opt_decimal(node).unwrap_or(Decimal::ZERO)
}

/// `YYYY-MM-DD`, also accepting a date-time whose first ten characters are
/// the date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| {
        s.get(..10)
            .filter(|_| s.len() > 10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    })
}

pub fn opt_date(node: Option<&Value>) -> Option<NaiveDate> {
    parse_date(&text(node))
}

/// Boolean from `true`/`false` JSON or text.
pub fn flag(node: Option<&Value>) -> bool {
    match node.and_then(first) {
        Some(Value::Bool(b)) => *b,
        other => text(other).eq_ignore_ascii_case("true"),
    }
}

/// Round a monetary value to 2 decimal places, half away from zero.
pub fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
