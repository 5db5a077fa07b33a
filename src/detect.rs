//! Format detection: classify a raw payload before conversion.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::core::InvoiceError;

/// The declared transport format of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    Json,
    Xml,
}

impl FromStr for FormatHint {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hint = s.trim();
        if hint.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else if hint.eq_ignore_ascii_case("xml") {
            Ok(Self::Xml)
        } else {
            Err(InvoiceError::UnsupportedFormat(hint.to_string()))
        }
    }
}

impl fmt::Display for FormatHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Xml => "xml",
        })
    }
}

/// A payload as handed over by the transport layer: raw text, or a value
/// the host already parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Value(Value),
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

/// A payload whose shape has been identified. Each variant has exactly one
/// converter.
#[derive(Debug, Clone, PartialEq)]
pub enum InputPayload {
    /// Already in canonical snake_case shape.
    Canonical(Value),
    /// Flat camelCase object from older clients.
    Legacy(Value),
    /// Parsed XML tree.
    Xml(Value),
}

impl InputPayload {
    /// Short label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Canonical(_) => "canonical",
            Self::Legacy(_) => "legacy",
            Self::Xml(_) => "xml",
        }
    }
}

/// Keys whose joint presence marks a JSON object as canonical.
pub const CANONICAL_MARKERS: [&str; 4] = [
    "business_id",
    "irn",
    "accounting_supplier_party",
    "invoice_line",
];

/// Classify `payload` according to `hint`.
///
/// # Errors
///
/// Returns [`InvoiceError::UnsupportedFormat`] for an unknown hint (or
/// `xml` when the `xml` feature is disabled), and `MalformedJson` /
/// `MalformedXml` when the payload cannot be parsed as declared.
pub fn detect(payload: &Payload, hint: &str) -> Result<InputPayload, InvoiceError> {
    match hint.parse::<FormatHint>()? {
        FormatHint::Json => detect_json(payload),
        FormatHint::Xml => detect_xml(payload),
    }
}

fn detect_json(payload: &Payload) -> Result<InputPayload, InvoiceError> {
    let value = match payload {
        Payload::Text(text) => serde_json::from_str::<Value>(text)
            .map_err(|e| InvoiceError::MalformedJson(e.to_string()))?,
        Payload::Value(value) => value.clone(),
    };
    if !value.is_object() {
        return Err(InvoiceError::MalformedJson(
            "top-level value must be an object".into(),
        ));
    }
    Ok(if is_canonical(&value) {
        InputPayload::Canonical(value)
    } else {
        InputPayload::Legacy(value)
    })
}

/// True when `value` carries every canonical marker with the right shape.
pub fn is_canonical(value: &Value) -> bool {
    let [business_id, irn, supplier, lines] = CANONICAL_MARKERS;
    value.get(business_id).is_some_and(|v| !v.is_null())
        && value.get(irn).is_some_and(|v| !v.is_null())
        && value.get(supplier).is_some_and(Value::is_object)
        && value.get(lines).is_some_and(Value::is_array)
}

#[cfg(feature = "xml")]
fn detect_xml(payload: &Payload) -> Result<InputPayload, InvoiceError> {
    let tree = match payload {
        Payload::Text(text) | Payload::Value(Value::String(text)) => {
            crate::xml::parse_tree(text)?
        }
        Payload::Value(tree @ Value::Object(_)) => tree.clone(),
        Payload::Value(_) => {
            return Err(InvoiceError::MalformedXml(
                "expected XML text or a parsed element tree".into(),
            ));
        }
    };
    Ok(InputPayload::Xml(tree))
}

#[cfg(not(feature = "xml"))]
fn detect_xml(_payload: &Payload) -> Result<InputPayload, InvoiceError> {
    Err(InvoiceError::UnsupportedFormat(
        "xml (crate built without the `xml` feature)".into(),
    ))
}
