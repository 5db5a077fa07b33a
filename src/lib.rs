//! # einvoice-gate
//!
//! Validation and normalization engine for e-invoice submissions.
//!
//! Accepts invoices as legacy flat JSON, UBL-like XML or already-canonical
//! JSON, converts them into one [`CanonicalInvoice`] and checks it in three
//! passes: structural, business rules and authority compliance. Every
//! finding carries a field path.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use einvoice_gate::{FixedIds, InvoiceValidator};
//! use serde_json::json;
//!
//! let validator = InvoiceValidator::new()
//!     .with_id_generator(FixedIds::new("BID-1", "INV-1"))
//!     .with_today(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
//!
//! let result = validator.validate(
//!     json!({
//!         "supplier": {"taxId": "12345678-0001", "name": "Acme", "email": "a@acme.com"},
//!         "lineItems": [{"quantity": 2, "unitPrice": 500, "totalPrice": 1000}],
//!         "total": {"subtotal": 1000, "taxTotal": 75, "amount": 1075}
//!     }),
//!     "json",
//! );
//!
//! assert!(result.is_valid, "{:?}", result.errors);
//! let invoice = result.normalized_invoice.unwrap();
//! assert_eq!(invoice.tax_total[0].tax_subtotal[0].tax_category.percent.to_string(), "7.5");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `xml` (default) | UBL-like XML input via `quick-xml` |

pub mod convert;
pub mod core;
pub mod detect;
pub mod engine;
pub mod lookup;
pub mod validate;

#[cfg(feature = "xml")]
pub mod xml;

pub use crate::core::{
    CanonicalInvoice, FixedIds, IdGenerator, InvoiceError, RandomIds, SequentialIds,
    ValidationError, ValidatorConfig, ViolationKind,
};
pub use detect::{FormatHint, InputPayload, Payload};
pub use engine::{InvoiceValidator, ValidationResult, validate};
