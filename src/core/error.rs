use serde::Serialize;
use thiserror::Error;

/// Errors that stop a validation call before any rule runs.
///
/// These are conversion failures: the payload could not be classified or
/// parsed into a tree at all. Everything past that point is reported as
/// [`ValidationError`] data instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvoiceError {
    /// The declared format hint is neither `json` nor `xml`.
    #[error("unsupported format '{0}' (expected \"json\" or \"xml\")")]
    UnsupportedFormat(String),

    /// The JSON payload could not be parsed or is not an object.
    #[error("malformed JSON payload: {0}")]
    MalformedJson(String),

    /// The XML payload could not be parsed into a document tree.
    #[error("malformed XML payload: {0}")]
    MalformedXml(String),

    /// The payload was parsed but could not be mapped to an invoice.
    #[error("conversion error: {0}")]
    Conversion(String),
}

/// Which validator pass produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Schema shape: required fields, types, formats, cross-field sums.
    Structural,
    /// Domain rules: code lists, tax ID wording, advisories.
    BusinessRule,
    /// Authority-mandated completeness.
    Compliance,
    /// A converter substituted a default for a missing value.
    Normalization,
}

/// A single validation finding with field path and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Dot-separated path to the field (e.g. "accounting_supplier_party.tin").
    /// Empty for document-level findings.
    pub field: String,
    /// Human-readable description.
    pub message: String,
    /// The pass that reported it.
    pub kind: ViolationKind,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    pub fn structural(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, ViolationKind::Structural)
    }

    pub fn business(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, ViolationKind::BusinessRule)
    }

    pub fn compliance(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, ViolationKind::Compliance)
    }

    pub fn normalization(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, ViolationKind::Normalization)
    }

    fn new(field: impl Into<String>, message: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind,
        }
    }
}

/// Errors and warnings produced by one validator pass.
///
/// Passes are pure functions returning `Findings`; the engine merges them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Append another pass's findings, preserving order.
    pub fn merge(&mut self, other: Findings) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
