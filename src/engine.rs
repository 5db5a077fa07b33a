//! The validation entry point.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::convert::{ConvertContext, Converted, canonical, legacy};
use crate::core::*;
use crate::detect::{self, InputPayload, Payload};
use crate::validate::{validate_business, validate_compliance, validate_structure_with_tolerance};

/// Outcome of one validation call.
///
/// Serializes as `{ "isValid", "errors", "warnings", "normalizedInvoice",
/// "fieldErrors" }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True iff `errors` is empty.
    pub is_valid: bool,
    /// `"{field}: {message}"`, in pass order.
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Present whenever conversion succeeded, valid or not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_invoice: Option<CanonicalInvoice>,
    /// Error messages grouped by field path.
    pub field_errors: BTreeMap<String, Vec<String>>,
    /// The structured findings behind `errors` and `warnings`.
    #[serde(skip)]
    pub findings: Findings,
}

impl ValidationResult {
    fn conversion_failure(error: &InvoiceError) -> Self {
        Self {
            is_valid: false,
            errors: vec![error.to_string()],
            warnings: Vec::new(),
            normalized_invoice: None,
            field_errors: BTreeMap::new(),
            findings: Findings::new(),
        }
    }

    fn from_findings(invoice: CanonicalInvoice, findings: Findings) -> Self {
        let mut field_errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for e in findings.errors.iter().filter(|e| !e.field.is_empty()) {
            field_errors
                .entry(e.field.clone())
                .or_default()
                .push(e.message.clone());
        }
        Self {
            is_valid: findings.is_clean(),
            errors: findings.errors.iter().map(ToString::to_string).collect(),
            warnings: findings.warnings.iter().map(ToString::to_string).collect(),
            normalized_invoice: Some(invoice),
            field_errors,
            findings,
        }
    }

    /// Errors recorded against `field`.
    pub fn errors_for(&self, field: &str) -> &[String] {
        self.field_errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The result as a JSON value, in its wire shape.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Validates and normalizes invoices.
///
/// Holds no per-call state; one instance can serve any number of threads.
///
/// ```
/// use einvoice_gate::{FixedIds, InvoiceValidator};
/// use serde_json::json;
///
/// let validator = InvoiceValidator::new().with_id_generator(FixedIds::new("B-1", "INV-1"));
/// let result = validator.validate(json!({"supplier": {"name": "Acme"}}), "json");
/// assert!(!result.is_valid);
/// assert_eq!(result.normalized_invoice.unwrap().irn, "INV-1");
/// ```
pub struct InvoiceValidator {
    config: ValidatorConfig,
    ids: Box<dyn IdGenerator>,
    today: Option<NaiveDate>,
}

impl Default for InvoiceValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InvoiceValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvoiceValidator")
            .field("config", &self.config)
            .field("today", &self.today)
            .finish_non_exhaustive()
    }
}

impl InvoiceValidator {
    /// Default configuration, random ids, system clock.
    pub fn new() -> Self {
        Self {
            config: ValidatorConfig::default(),
            ids: Box::new(RandomIds),
            today: None,
        }
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the generator used for missing business ids and IRNs.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Pin the reference date instead of reading the system clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Detect and convert a payload without running the validator passes.
    ///
    /// The returned findings hold conversion notices and, for canonical
    /// input, type mismatches.
    ///
    /// # Errors
    ///
    /// Fails when the hint is unsupported or the payload cannot be parsed.
    pub fn normalize(
        &self,
        payload: impl Into<Payload>,
        hint: &str,
    ) -> Result<Converted, InvoiceError> {
        self.convert(payload.into(), hint, self.today())
    }

    fn convert(
        &self,
        payload: Payload,
        hint: &str,
        today: NaiveDate,
    ) -> Result<Converted, InvoiceError> {
        let detected = detect::detect(&payload, hint)?;
        tracing::debug!(format = detected.kind(), "payload shape detected");

        let ctx = ConvertContext {
            config: &self.config,
            ids: self.ids.as_ref(),
            today,
        };
        match detected {
            InputPayload::Canonical(Value::Object(obj)) => {
                Ok(canonical::from_canonical(&obj, &ctx))
            }
            InputPayload::Legacy(Value::Object(obj)) => Ok(legacy::from_legacy(&obj, &ctx)),
            #[cfg(feature = "xml")]
            InputPayload::Xml(tree) => Ok(crate::xml::from_ubl_tree(&tree, &ctx)),
            other => Err(InvoiceError::Conversion(format!(
                "cannot convert {} payload",
                other.kind()
            ))),
        }
    }

    /// Validate and normalize a payload.
    ///
    /// Never fails: conversion errors come back as an invalid result with a
    /// single error and no normalized invoice.
    pub fn validate(&self, payload: impl Into<Payload>, hint: &str) -> ValidationResult {
        let today = self.today();
        let Converted {
            invoice,
            mut findings,
        } = match self.convert(payload.into(), hint, today) {
            Ok(converted) => converted,
            Err(e) => {
                tracing::debug!(error = %e, "conversion failed");
                return ValidationResult::conversion_failure(&e);
            }
        };

        let structural =
            validate_structure_with_tolerance(&invoice, today, self.config.amount_tolerance);
        tracing::trace!(errors = structural.errors.len(), "structural pass");
        findings.merge(structural);

        let business = validate_business(&invoice, &self.config);
        tracing::trace!(
            errors = business.errors.len(),
            warnings = business.warnings.len(),
            "business rule pass"
        );
        findings.merge(business);

        let compliance = validate_compliance(&invoice);
        tracing::trace!(
            errors = compliance.errors.len(),
            warnings = compliance.warnings.len(),
            "compliance pass"
        );
        findings.merge(compliance);

        tracing::debug!(
            errors = findings.errors.len(),
            warnings = findings.warnings.len(),
            "validation finished"
        );
        ValidationResult::from_findings(invoice, findings)
    }
}

/// Validate with the default configuration, random ids and the system clock.
pub fn validate(payload: impl Into<Payload>, hint: &str) -> ValidationResult {
    InvoiceValidator::new().validate(payload, hint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> InvoiceValidator {
        InvoiceValidator::new()
            .with_id_generator(FixedIds::new("BID-1", "IRN-1"))
            .with_today(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    #[test]
    fn validator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InvoiceValidator>();
    }

    #[test]
    fn conversion_failure_shape() {
        let result = validator().validate("{broken", "json");
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("malformed JSON payload"));
        assert!(result.field_errors.is_empty());
        assert!(result.normalized_invoice.is_none());
    }

    #[test]
    fn unsupported_hint() {
        let result = validator().validate("{}", "csv");
        assert_eq!(result.errors, vec!["unsupported format 'csv' (expected \"json\" or \"xml\")"]);
    }

    #[test]
    fn field_errors_group_messages() {
        let result = validator().validate(json!({"supplier": {"taxId": "bad"}}), "json");
        let tin = result.errors_for("accounting_supplier_party.tin");
        assert_eq!(tin.len(), 2);
        assert_eq!(tin[0], "must match format 12345678-1234");
        assert!(result.errors_for("nope").is_empty());
    }

    #[test]
    fn wire_shape() {
        let value = validator().validate("[]", "json").to_json();
        assert_eq!(value["isValid"], json!(false));
        assert!(value.get("fieldErrors").is_some());
        assert!(value.get("normalizedInvoice").is_none());
        assert!(value.get("findings").is_none());
    }

    #[test]
    fn normalize_skips_validation() {
        let converted = validator()
            .normalize(json!({"supplier": {"name": "Acme"}}), "json")
            .unwrap();
        assert!(converted.findings.errors.is_empty());
        assert_eq!(converted.invoice.business_id, "BID-1");
    }
}
