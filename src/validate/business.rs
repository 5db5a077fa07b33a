use rust_decimal_macros::dec;

use super::{TIN_EXAMPLE, is_valid_tin};
use crate::core::*;
use crate::lookup::money;

/// Domain rules: code-list membership, tax ID wording and advisories.
pub fn validate_business(invoice: &CanonicalInvoice, config: &ValidatorConfig) -> Findings {
    let mut findings = Findings::new();

    let type_code = invoice.invoice_type_code.trim();
    if !type_code.is_empty() {
        match DocumentType::from_code(type_code) {
            None => findings.error(ValidationError::business(
                "invoice_type_code",
                format!(
                    "'{type_code}' is not a recognized document type; valid codes: {}",
                    code_list(DocumentType::ALL.iter().map(|t| t.code()))
                ),
            )),
            Some(doc) if doc.amends_prior_invoice() && invoice.billing_reference.is_empty() => {
                findings.warning(ValidationError::business(
                    "billing_reference",
                    format!(
                        "{} ({}) should reference the invoice it amends",
                        doc.description(),
                        doc.code()
                    ),
                ));
            }
            Some(_) => {}
        }
    }

    for (i, means) in invoice.payment_means.iter().enumerate() {
        let code = means.payment_means_code.trim();
        if !code.is_empty() && PaymentMeansCode::from_code(code).is_none() {
            findings.error(ValidationError::business(
                format!("payment_means[{i}].payment_means_code"),
                format!(
                    "'{code}' is not a recognized payment means; valid codes: {}",
                    code_list(PaymentMeansCode::ALL.iter().map(|m| m.code()))
                ),
            ));
        }
    }

    check_tin(&invoice.accounting_supplier_party, "accounting_supplier_party", "supplier", &mut findings);
    if let Some(customer) = &invoice.accounting_customer_party {
        check_tin(customer, "accounting_customer_party", "customer", &mut findings);
    }

    let lines = invoice.invoice_line.len();
    if lines > config.max_lines_advisory {
        findings.warning(ValidationError::business(
            "invoice_line",
            format!(
                "invoice has {lines} lines; more than {} may be rejected or split by the authority",
                config.max_lines_advisory
            ),
        ));
    }

    let document = invoice.document_currency_code.trim();
    let tax = invoice.tax_currency_code.trim();
    if !document.is_empty() && !tax.is_empty() && document != tax {
        findings.warning(ValidationError::business(
            "tax_currency_code",
            format!("tax currency {tax} differs from document currency {document}"),
        ));
    }
    for (field, code) in [("document_currency_code", document), ("tax_currency_code", tax)] {
        if code.len() == 3 && !is_known_currency_code(code) {
            findings.warning(ValidationError::business(
                field,
                format!("currency {code} is not commonly accepted by the authority"),
            ));
        }
    }

    for (i, total) in invoice.tax_total.iter().enumerate() {
        for (j, sub) in total.tax_subtotal.iter().enumerate() {
            let expected =
                money(sub.taxable_amount.saturating_mul(sub.tax_category.percent) / dec!(100));
            if expected.saturating_sub(sub.tax_amount).abs() > config.amount_tolerance {
                findings.warning(ValidationError::business(
                    format!("tax_total[{i}].tax_subtotal[{j}].tax_amount"),
                    format!(
                        "{} at {}% of {} is {expected}, found {}",
                        sub.tax_category.id,
                        sub.tax_category.percent,
                        sub.taxable_amount,
                        sub.tax_amount
                    ),
                ));
            }
        }
    }

    findings
}

/// The raw value is checked: padding around a valid TIN is rejected too.
fn check_tin(party: &Party, prefix: &str, role: &str, findings: &mut Findings) {
    let tin = party.tin.as_str();
    let message = if tin.trim().is_empty() {
        format!("{role} TIN (tax ID) is required; expected {TIN_EXAMPLE}")
    } else if !is_valid_tin(tin) {
        format!("{role} TIN (tax ID) '{tin}' is invalid; expected {TIN_EXAMPLE}")
    } else {
        return;
    };
    findings.error(ValidationError::business(format!("{prefix}.tin"), message));
}
