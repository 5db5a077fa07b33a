//! Conversion of detected payloads into [`CanonicalInvoice`].
//!
//! Converters are lenient: they fill what they find, substitute documented
//! defaults for the rest and never fail on a missing optional field.

pub mod canonical;
pub mod legacy;

use chrono::NaiveDate;

use crate::core::{CanonicalInvoice, Findings, IdGenerator, ValidationError, ValidatorConfig};

/// Everything a converter needs besides the payload.
#[derive(Clone, Copy)]
pub struct ConvertContext<'a> {
    pub config: &'a ValidatorConfig,
    pub ids: &'a dyn IdGenerator,
    /// Validation date; also the fallback issue date for legacy payloads.
    pub today: NaiveDate,
}

impl ConvertContext<'_> {
    /// Record that `field` was filled with a default.
    pub fn defaulted(&self, findings: &mut Findings, field: &str, message: impl Into<String>) {
        if self.config.warn_on_defaults {
            findings.warning(ValidationError::normalization(field, message));
        }
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct Converted {
    pub invoice: CanonicalInvoice,
    /// Default-substitution warnings, and type mismatches found while
    /// decoding canonical JSON.
    pub findings: Findings,
}
