use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{TIN_EXAMPLE, is_valid_email, is_valid_telephone, is_valid_time, is_valid_tin};
use crate::core::*;

/// Check the schema shape of an invoice: required fields, formats, ranges,
/// decimal places and the cross-field invariants.
///
/// `today` is the reference date for the "not in the future" rule.
pub fn validate_structure(invoice: &CanonicalInvoice, today: NaiveDate) -> Findings {
    validate_structure_with_tolerance(invoice, today, AMOUNT_TOLERANCE)
}

/// [`validate_structure`] with a custom tolerance for the sum invariants.
pub fn validate_structure_with_tolerance(
    invoice: &CanonicalInvoice,
    today: NaiveDate,
    tolerance: Decimal,
) -> Findings {
    let mut findings = Findings::new();

    required(&invoice.business_id, "business_id", &mut findings);
    required(&invoice.irn, "irn", &mut findings);

    match invoice.issue_date {
        None => error(&mut findings, "issue_date", "is required"),
        Some(issue) => {
            if issue > today {
                error(&mut findings, "issue_date", "must not be in the future");
            }
            if let Some(due) = invoice.due_date {
                if due <= issue {
                    error(&mut findings, "due_date", "must be after issue date");
                }
            }
        }
    }

    if let Some(time) = &invoice.issue_time {
        if !is_valid_time(time) {
            error(&mut findings, "issue_time", "must be a time in HH:MM:SS format");
        }
    }

    if required(&invoice.invoice_type_code, "invoice_type_code", &mut findings)
        && !is_digits(&invoice.invoice_type_code, 3)
    {
        error(&mut findings, "invoice_type_code", "must be a 3-digit code");
    }

    currency(&invoice.document_currency_code, "document_currency_code", &mut findings);
    currency(&invoice.tax_currency_code, "tax_currency_code", &mut findings);

    if let Some(period) = &invoice.invoice_delivery_period {
        if period.end_date <= period.start_date {
            error(
                &mut findings,
                "invoice_delivery_period.end_date",
                "must be after start date",
            );
        }
    }

    for (i, reference) in invoice.billing_reference.iter().enumerate() {
        required(&reference.irn, &format!("billing_reference[{i}].irn"), &mut findings);
    }

    validate_party(
        &invoice.accounting_supplier_party,
        "accounting_supplier_party",
        PartyRole::Supplier,
        &mut findings,
    );
    for (path, party) in invoice.optional_parties() {
        let role = if path == "accounting_customer_party" {
            PartyRole::Customer
        } else {
            PartyRole::Other
        };
        validate_party(party, path, role, &mut findings);
    }

    for (i, means) in invoice.payment_means.iter().enumerate() {
        let path = format!("payment_means[{i}].payment_means_code");
        if required(&means.payment_means_code, &path, &mut findings)
            && !means.payment_means_code.chars().all(|c| c.is_ascii_digit())
        {
            error(&mut findings, path, "must be a numeric code");
        }
    }

    for (i, ac) in invoice.allowance_charge.iter().enumerate() {
        amount(ac.amount, &format!("allowance_charge[{i}].amount"), &mut findings);
    }

    if invoice.invoice_line.is_empty() {
        error(&mut findings, "invoice_line", "must contain at least one line");
    }
    for (i, line) in invoice.invoice_line.iter().enumerate() {
        validate_line(line, &format!("invoice_line[{i}]"), &mut findings);
    }

    if invoice.tax_total.is_empty() {
        error(&mut findings, "tax_total", "must contain at least one tax total");
    }
    for (i, total) in invoice.tax_total.iter().enumerate() {
        validate_tax_total(total, &format!("tax_total[{i}]"), &mut findings);
    }

    validate_monetary_total(invoice, tolerance, &mut findings);

    findings
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartyRole {
    /// Full identification and contact details required.
    Supplier,
    /// Name, TIN and address required; contact details optional.
    Customer,
    /// Name required; everything else only format-checked when present.
    Other,
}

fn validate_party(party: &Party, prefix: &str, role: PartyRole, findings: &mut Findings) {
    required(&party.party_name, &format!("{prefix}.party_name"), findings);

    let tin_path = format!("{prefix}.tin");
    let has_tin = if role == PartyRole::Other {
        !party.tin.trim().is_empty()
    } else {
        required(&party.tin, &tin_path, findings)
    };
    if has_tin && !is_valid_tin(&party.tin) {
        error(findings, tin_path, format!("must match format {TIN_EXAMPLE}"));
    }

    let email_path = format!("{prefix}.email");
    match &party.email {
        Some(email) if !is_valid_email(email) => {
            error(findings, email_path, "must be a valid email address");
        }
        None if role == PartyRole::Supplier => error(findings, email_path, "is required"),
        _ => {}
    }

    if let Some(phone) = &party.telephone {
        if !is_valid_telephone(phone) {
            error(
                findings,
                format!("{prefix}.telephone"),
                "must be in international format, e.g. +2348012345678",
            );
        }
    }

    let address = &party.postal_address;
    let prefix = format!("{prefix}.postal_address");
    if role != PartyRole::Other {
        required(&address.street_name, &format!("{prefix}.street_name"), findings);
        required(&address.city_name, &format!("{prefix}.city_name"), findings);
    }
    let country_path = format!("{prefix}.country");
    let has_country = if role == PartyRole::Other {
        !address.country.trim().is_empty()
    } else {
        required(&address.country, &country_path, findings)
    };
    if has_country && !is_upper_alpha(&address.country, 2) {
        error(findings, country_path, "must be a 2-letter ISO 3166-1 code");
    }
}

fn validate_line(line: &InvoiceLine, prefix: &str, findings: &mut Findings) {
    required(&line.id, &format!("{prefix}.id"), findings);

    non_negative(
        line.invoiced_quantity,
        &format!("{prefix}.invoiced_quantity"),
        findings,
    );
    amount(
        line.line_extension_amount,
        &format!("{prefix}.line_extension_amount"),
        findings,
    );

    required(&line.item.name, &format!("{prefix}.item.name"), findings);

    let price = &line.price;
    non_negative(price.price_amount, &format!("{prefix}.price.price_amount"), findings);
    if let Some(base) = price.base_quantity {
        non_negative(base, &format!("{prefix}.price.base_quantity"), findings);
    }

    for (j, ac) in line.allowance_charge.iter().enumerate() {
        amount(ac.amount, &format!("{prefix}.allowance_charge[{j}].amount"), findings);
    }
}

fn validate_tax_total(total: &TaxTotal, prefix: &str, findings: &mut Findings) {
    amount(total.tax_amount, &format!("{prefix}.tax_amount"), findings);

    if total.tax_subtotal.is_empty() {
        error(
            findings,
            format!("{prefix}.tax_subtotal"),
            "must contain at least one subtotal",
        );
    }
    for (j, sub) in total.tax_subtotal.iter().enumerate() {
        let prefix = format!("{prefix}.tax_subtotal[{j}]");
        amount(sub.taxable_amount, &format!("{prefix}.taxable_amount"), findings);
        amount(sub.tax_amount, &format!("{prefix}.tax_amount"), findings);
        required(&sub.tax_category.id, &format!("{prefix}.tax_category.id"), findings);
        let percent = sub.tax_category.percent;
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            error(
                findings,
                format!("{prefix}.tax_category.percent"),
                "must be between 0 and 100",
            );
        }
    }
}

fn validate_monetary_total(invoice: &CanonicalInvoice, tolerance: Decimal, findings: &mut Findings) {
    let totals = &invoice.legal_monetary_total;
    let prefix = "legal_monetary_total";

    // Shape checks on line_extension_amount are folded into the sum check
    // below so that a mismatch yields a single finding for the field.
    amount(totals.tax_exclusive_amount, &format!("{prefix}.tax_exclusive_amount"), findings);
    amount(totals.tax_inclusive_amount, &format!("{prefix}.tax_inclusive_amount"), findings);
    amount(totals.payable_amount, &format!("{prefix}.payable_amount"), findings);
    for (name, value) in [
        ("allowance_total_amount", totals.allowance_total_amount),
        ("charge_total_amount", totals.charge_total_amount),
        ("prepaid_amount", totals.prepaid_amount),
    ] {
        if let Some(value) = value {
            amount(value, &format!("{prefix}.{name}"), findings);
        }
    }

    let line_sum = invoice.line_total();
    let line_path = format!("{prefix}.line_extension_amount");
    if line_sum.saturating_sub(totals.line_extension_amount).abs() > tolerance {
        error(
            findings,
            line_path,
            format!(
                "must equal the sum of invoice line amounts ({line_sum}), found {}",
                totals.line_extension_amount
            ),
        );
    } else if let Some(problem) = amount_problem(totals.line_extension_amount) {
        error(findings, line_path, problem);
    }

    let tax_sum = invoice.tax_amount_total();
    let expected = totals.tax_exclusive_amount.saturating_add(tax_sum);
    if expected.saturating_sub(totals.tax_inclusive_amount).abs() > tolerance {
        error(
            findings,
            format!("{prefix}.tax_inclusive_amount"),
            format!(
                "must equal tax exclusive amount plus tax ({expected}), found {}",
                totals.tax_inclusive_amount
            ),
        );
    }
}

fn error(findings: &mut Findings, field: impl Into<String>, message: impl Into<String>) {
    findings.error(ValidationError::structural(field, message));
}

/// Report a blank value; returns true when the value is present.
fn required(value: &str, field: &str, findings: &mut Findings) -> bool {
    if value.trim().is_empty() {
        error(findings, field, "is required");
        false
    } else {
        true
    }
}

fn currency(code: &str, field: &str, findings: &mut Findings) {
    if required(code, field, findings) && !is_upper_alpha(code, 3) {
        error(findings, field, "must be a 3-letter ISO 4217 code");
    }
}

fn non_negative(value: Decimal, field: &str, findings: &mut Findings) {
    if value < Decimal::ZERO {
        error(findings, field, "must not be negative");
    }
}

/// Monetary amount: non-negative, at most 2 decimal places.
fn amount(value: Decimal, field: &str, findings: &mut Findings) {
    if let Some(problem) = amount_problem(value) {
        error(findings, field, problem);
    }
}

fn amount_problem(value: Decimal) -> Option<&'static str> {
    if value < Decimal::ZERO {
        Some("must not be negative")
    } else if value.round_dp(2) != value {
        Some("must have at most 2 decimal places")
    } else {
        None
    }
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_digit())
}

fn is_upper_alpha(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_uppercase())
}
