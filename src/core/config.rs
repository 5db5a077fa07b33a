use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::InvoiceError;

/// Operating country used when a party address has none.
pub const DEFAULT_COUNTRY_CODE: &str = "NG";

/// Currency substituted for both document and tax currency when a legacy
/// payload does not name one.
pub const DEFAULT_CURRENCY_CODE: &str = "NGN";

/// Jurisdiction's standard VAT rate in percent, used for legacy lines
/// without a `taxRate`.
pub const STANDARD_VAT_RATE: Decimal = dec!(7.5);

/// Tax category id attached to synthesized tax subtotals.
pub const STANDARD_TAX_CATEGORY_ID: &str = "VAT";

/// Document type assumed for legacy payloads without `invoiceTypeCode`.
///
/// This is 381 (credit note), not 380 (commercial invoice). Callers should
/// always send the code explicitly.
pub const DEFAULT_INVOICE_TYPE_CODE: &str = "381";

/// Line count above which a performance advisory is emitted.
pub const MAX_LINES_ADVISORY: usize = 1000;

/// Tolerance for monetary cross-field checks.
pub const AMOUNT_TOLERANCE: Decimal = dec!(0.01);

/// Knobs of the validation engine.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use einvoice_gate::ValidatorConfig;
///
/// let cfg = ValidatorConfig::from_json(r#"{ "max_lines_advisory": 50 }"#).unwrap();
/// assert_eq!(cfg.max_lines_advisory, 50);
/// assert_eq!(cfg.currency_code, "NGN");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub country_code: String,
    pub currency_code: String,
    pub standard_vat_rate: Decimal,
    pub tax_category_id: String,
    pub default_invoice_type_code: String,
    pub max_lines_advisory: usize,
    pub amount_tolerance: Decimal,
    /// Emit a warning for every default the legacy and XML converters substitute.
    pub warn_on_defaults: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            currency_code: DEFAULT_CURRENCY_CODE.to_string(),
            standard_vat_rate: STANDARD_VAT_RATE,
            tax_category_id: STANDARD_TAX_CATEGORY_ID.to_string(),
            default_invoice_type_code: DEFAULT_INVOICE_TYPE_CODE.to_string(),
            max_lines_advisory: MAX_LINES_ADVISORY,
            amount_tolerance: AMOUNT_TOLERANCE,
            warn_on_defaults: true,
        }
    }
}

impl ValidatorConfig {
    /// Parse a configuration from JSON, filling omitted fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, InvoiceError> {
        serde_json::from_str(json)
            .map_err(|e| InvoiceError::Conversion(format!("invalid validator config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ValidatorConfig::default();
        assert_eq!(cfg.country_code, "NG");
        assert_eq!(cfg.standard_vat_rate, dec!(7.5));
        assert_eq!(cfg.default_invoice_type_code, "381");
        assert!(cfg.warn_on_defaults);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ValidatorConfig::from_json(r#"{"warn_on_defaults": false, "standard_vat_rate": "5"}"#)
            .unwrap();
        assert!(!cfg.warn_on_defaults);
        assert_eq!(cfg.standard_vat_rate, dec!(5));
        assert_eq!(cfg.amount_tolerance, dec!(0.01));
    }

    #[test]
    fn rejects_garbage() {
        assert!(ValidatorConfig::from_json("not json").is_err());
    }
}
