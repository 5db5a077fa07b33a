use rust_decimal::Decimal;

use super::is_valid_email;
use crate::core::*;

const SUPPLIER: &str = "accounting_supplier_party";

/// Completeness rules the tax authority enforces at submission time.
pub fn validate_compliance(invoice: &CanonicalInvoice) -> Findings {
    let mut findings = Findings::new();
    let supplier = &invoice.accounting_supplier_party;

    let email = supplier.email.as_deref().map(str::trim).unwrap_or_default();
    if email.is_empty() {
        error(&mut findings, "email", "supplier email is required for submission");
    } else if !is_valid_email(email) {
        error(
            &mut findings,
            "email",
            "supplier email must be in the form local@domain.tld",
        );
    }

    if let Some(phone) = &supplier.telephone {
        if !phone.trim().starts_with('+') {
            error(
                &mut findings,
                "telephone",
                "supplier telephone must start with + and the country code",
            );
        }
    }

    let address = &supplier.postal_address;
    if address.street_name.trim().is_empty() {
        error(
            &mut findings,
            "postal_address.street_name",
            "supplier street is required for submission",
        );
    }
    if address.city_name.trim().is_empty() {
        error(
            &mut findings,
            "postal_address.city_name",
            "supplier city is required for submission",
        );
    }

    for (i, line) in invoice.invoice_line.iter().enumerate() {
        let prefix = format!("invoice_line[{i}]");
        if line.item.description.trim().chars().count() < 3 {
            findings.error(ValidationError::compliance(
                format!("{prefix}.item.description"),
                "item description must be at least 3 characters",
            ));
        }
        if line.invoiced_quantity <= Decimal::ZERO {
            findings.error(ValidationError::compliance(
                format!("{prefix}.invoiced_quantity"),
                "quantity must be greater than zero",
            ));
        }
        if line.price.price_amount <= Decimal::ZERO {
            findings.error(ValidationError::compliance(
                format!("{prefix}.price.price_amount"),
                "unit price must be greater than zero",
            ));
        }
    }

    if invoice.tax_total.is_empty() {
        findings.warning(ValidationError::compliance(
            "tax_total",
            "no tax total given; state the tax exemption in the invoice note",
        ));
    }

    findings
}

fn error(findings: &mut Findings, field: &str, message: &str) {
    findings.error(ValidationError::compliance(format!("{SUPPLIER}.{field}"), message));
}
