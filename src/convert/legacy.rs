use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Map, Value};

use super::{ConvertContext, Converted};
use crate::core::*;
use crate::lookup::{self, get_in, money, opt_text, text};

/// Street and city substituted for a legacy party without an address.
pub const ADDRESS_PLACEHOLDER: &str = "N/A";

// Legacy key → accepted spellings.
const BUSINESS_ID: &[&str] = &["businessId", "business_id"];
const INVOICE_NUMBER: &[&str] = &["invoiceNumber", "invoice_number", "invoiceReferenceNumber", "irn"];
const INVOICE_DATE: &[&str] = &["invoiceDate", "invoice_date", "issueDate", "issue_date"];
const DUE_DATE: &[&str] = &["dueDate", "due_date"];
const TYPE_CODE: &[&str] = &["invoiceTypeCode", "invoice_type_code", "typeCode"];
const CURRENCY: &[&str] = &["currency", "currencyCode", "documentCurrencyCode"];
const TAX_CURRENCY: &[&str] = &["taxCurrency", "taxCurrencyCode"];
const NOTE: &[&str] = &["note", "notes"];
const PAYMENT_MEANS: &[&str] = &["paymentMeans", "paymentMethod", "payment_means"];
const SUPPLIER: &[&str] = &["supplier", "seller"];
const BUYER: &[&str] = &["buyer", "customer"];
const LINE_ITEMS: &[&str] = &["lineItems", "line_items", "items"];
const TOTAL: &[&str] = &["total", "totals"];

const PARTY_NAME: &[&str] = &["name", "partyName", "companyName"];
const PARTY_TIN: &[&str] = &["taxId", "tax_id", "tin", "TIN"];
const PARTY_EMAIL: &[&str] = &["email"];
const PARTY_PHONE: &[&str] = &["phone", "telephone"];
const PARTY_ADDRESS: &[&str] = &["address", "postalAddress"];
const STREET: &[&str] = &["street", "streetName", "line1"];
const CITY: &[&str] = &["city", "cityName"];
const POSTAL_CODE: &[&str] = &["postalCode", "postal_code", "zip"];
const STATE: &[&str] = &["state"];
const COUNTRY: &[&str] = &["country", "countryCode"];

const LINE_ID: &[&str] = &["id", "lineId"];
const LINE_DESCRIPTION: &[&str] = &["description"];
const LINE_NAME: &[&str] = &["name"];
const LINE_QUANTITY: &[&str] = &["quantity", "qty"];
const LINE_UNIT_PRICE: &[&str] = &["unitPrice", "unit_price", "price"];
const LINE_TOTAL: &[&str] = &["totalPrice", "total_price", "lineTotal"];
const LINE_TAX_RATE: &[&str] = &["taxRate", "vatRate", "tax_rate", "vat_rate"];
const LINE_HSN: &[&str] = &["hsnCode", "hsn_code"];
const LINE_CATEGORY: &[&str] = &["category", "productCategory"];

const SUBTOTAL: &[&str] = &["subtotal", "subTotal"];
const TAX_TOTAL: &[&str] = &["taxTotal", "tax_total", "tax"];
const AMOUNT: &[&str] = &["amount", "grandTotal", "total"];

/// Map a flat legacy invoice object onto the canonical shape.
///
/// Never fails: every gap is either filled with a documented default (and
/// noted as a warning) or left empty for the validators to report.
pub fn from_legacy(payload: &Map<String, Value>, ctx: &ConvertContext<'_>) -> Converted {
    let mut findings = Findings::new();

    let issue_date = match get_in(payload, INVOICE_DATE) {
        Some(v) => lookup::opt_date(Some(v)),
        None => {
            ctx.defaulted(&mut findings, "issue_date", "missing; defaulted to today");
            Some(ctx.today)
        }
    };

    let business_id = match opt_text(get_in(payload, BUSINESS_ID)) {
        Some(id) => id,
        None => {
            let id = ctx.ids.business_id();
            ctx.defaulted(&mut findings, "business_id", format!("missing; generated '{id}'"));
            id
        }
    };

    let irn = match opt_text(get_in(payload, INVOICE_NUMBER)) {
        Some(irn) => irn,
        None => {
            let irn = ctx.ids.irn(issue_date.unwrap_or(ctx.today));
            ctx.defaulted(&mut findings, "irn", format!("missing; generated '{irn}'"));
            irn
        }
    };

    let invoice_type_code = match opt_text(get_in(payload, TYPE_CODE)) {
        Some(code) => code,
        None => {
            let code = &ctx.config.default_invoice_type_code;
            let label = DocumentType::from_code(code)
                .map(|t| t.description())
                .unwrap_or("configured default");
            ctx.defaulted(
                &mut findings,
                "invoice_type_code",
                format!("missing; defaulted to {code} ({label}), send invoiceTypeCode explicitly"),
            );
            code.clone()
        }
    };

    let document_currency_code = match opt_text(get_in(payload, CURRENCY)) {
        Some(code) => code.to_ascii_uppercase(),
        None => {
            ctx.defaulted(
                &mut findings,
                "document_currency_code",
                format!("missing; defaulted to {}", ctx.config.currency_code),
            );
            ctx.config.currency_code.clone()
        }
    };
    let tax_currency_code = opt_text(get_in(payload, TAX_CURRENCY))
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or_else(|| document_currency_code.clone());

    let supplier = get_in(payload, SUPPLIER).and_then(Value::as_object);
    let accounting_supplier_party = party(
        supplier.unwrap_or(&Map::new()),
        "accounting_supplier_party",
        ctx,
        &mut findings,
    );
    let accounting_customer_party = get_in(payload, BUYER)
        .and_then(Value::as_object)
        .map(|buyer| party(buyer, "accounting_customer_party", ctx, &mut findings));

    let mut defaulted_rates = 0usize;
    let lines: Vec<LegacyLine> = lookup::list(get_in(payload, LINE_ITEMS))
        .into_iter()
        .enumerate()
        .map(|(i, item)| line(item, i, ctx, &mut defaulted_rates))
        .collect();
    if defaulted_rates > 0 {
        ctx.defaulted(
            &mut findings,
            "invoice_line",
            format!(
                "{defaulted_rates} line(s) without taxRate; assumed standard rate {}%",
                ctx.config.standard_vat_rate
            ),
        );
    }

    let rate = lines
        .first()
        .map(|l| l.rate)
        .unwrap_or(ctx.config.standard_vat_rate);
    let invoice_line: Vec<InvoiceLine> = lines.into_iter().map(|l| l.line).collect();

    let total = get_in(payload, TOTAL);
    let subtotal = match total.and_then(|t| lookup::get(t, SUBTOTAL)) {
        Some(v) => money(lookup::decimal_or_zero(Some(v))),
        None => {
            ctx.defaulted(&mut findings, "legal_monetary_total", "no total.subtotal; using sum of lines");
            money(
                invoice_line
                    .iter()
                    .fold(Decimal::ZERO, |acc, l| acc.saturating_add(l.line_extension_amount)),
            )
        }
    };
    let tax = match total.and_then(|t| lookup::get(t, TAX_TOTAL)) {
        Some(v) => money(lookup::decimal_or_zero(Some(v))),
        None => {
            ctx.defaulted(
                &mut findings,
                "tax_total",
                format!("no total.taxTotal; computed at {rate}%"),
            );
            money(subtotal.saturating_mul(rate) / dec!(100))
        }
    };
    let amount = match total.and_then(|t| lookup::get(t, AMOUNT)) {
        Some(v) => money(lookup::decimal_or_zero(Some(v))),
        None => subtotal.saturating_add(tax),
    };

    let invoice = CanonicalInvoice {
        business_id,
        irn,
        issue_date,
        due_date: lookup::opt_date(get_in(payload, DUE_DATE)),
        invoice_type_code,
        document_currency_code,
        tax_currency_code,
        note: opt_text(get_in(payload, NOTE)),
        accounting_supplier_party,
        accounting_customer_party,
        payment_means: payment_means(get_in(payload, PAYMENT_MEANS)),
        tax_total: vec![TaxTotal {
            tax_amount: tax,
            tax_subtotal: vec![TaxSubtotal {
                taxable_amount: subtotal,
                tax_amount: tax,
                tax_category: TaxCategory {
                    id: ctx.config.tax_category_id.clone(),
                    percent: rate,
                },
            }],
        }],
        legal_monetary_total: MonetaryTotal {
            line_extension_amount: subtotal,
            tax_exclusive_amount: subtotal,
            tax_inclusive_amount: amount,
            payable_amount: amount,
            ..MonetaryTotal::default()
        },
        invoice_line,
        ..CanonicalInvoice::default()
    };

    Converted { invoice, findings }
}

fn party(
    obj: &Map<String, Value>,
    path: &str,
    ctx: &ConvertContext<'_>,
    findings: &mut Findings,
) -> Party {
    // `address` is either a street line or a structured object; loose
    // city/state/country keys on the party itself are honored too.
    let address = get_in(obj, PARTY_ADDRESS);
    let structured = address.and_then(Value::as_object);
    let field = |keys: &[&str]| {
        structured
            .and_then(|a| opt_text(get_in(a, keys)))
            .or_else(|| opt_text(get_in(obj, keys)))
    };

    let street = match structured {
        Some(_) => field(STREET),
        None => opt_text(address).or_else(|| opt_text(get_in(obj, STREET))),
    };
    let street_name = street.unwrap_or_else(|| {
        ctx.defaulted(
            findings,
            &format!("{path}.postal_address.street_name"),
            format!("missing; substituted '{ADDRESS_PLACEHOLDER}'"),
        );
        ADDRESS_PLACEHOLDER.to_string()
    });
    let city_name = field(CITY).unwrap_or_else(|| {
        ctx.defaulted(
            findings,
            &format!("{path}.postal_address.city_name"),
            format!("missing; substituted '{ADDRESS_PLACEHOLDER}'"),
        );
        ADDRESS_PLACEHOLDER.to_string()
    });

    Party {
        party_name: text(get_in(obj, PARTY_NAME)),
        tin: text(get_in(obj, PARTY_TIN)),
        email: opt_text(get_in(obj, PARTY_EMAIL)),
        telephone: opt_text(get_in(obj, PARTY_PHONE)),
        business_description: None,
        postal_address: Address {
            street_name,
            city_name,
            postal_zone: field(POSTAL_CODE),
            state: field(STATE),
            country: field(COUNTRY)
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or_else(|| ctx.config.country_code.clone()),
        },
    }
}

/// A converted line plus its effective tax rate.
struct LegacyLine {
    line: InvoiceLine,
    rate: Decimal,
}

fn line(
    item: &Value,
    index: usize,
    ctx: &ConvertContext<'_>,
    defaulted_rates: &mut usize,
) -> LegacyLine {
    let get = |keys: &[&str]| lookup::get(item, keys);

    let quantity = lookup::decimal_or_zero(get(LINE_QUANTITY));
    let unit_price = lookup::decimal_or_zero(get(LINE_UNIT_PRICE));
    let line_amount =
        lookup::opt_decimal(get(LINE_TOTAL)).unwrap_or_else(|| quantity.saturating_mul(unit_price));

    let declared_rate = lookup::opt_decimal(get(LINE_TAX_RATE));
    if declared_rate.is_none() {
        *defaulted_rates += 1;
    }

    let fallback = format!("Item {}", index + 1);
    let description = opt_text(get(LINE_DESCRIPTION));
    let name = opt_text(get(LINE_NAME));

    let line = InvoiceLine {
        id: opt_text(get(LINE_ID)).unwrap_or_else(|| (index + 1).to_string()),
        hsn_code: opt_text(get(LINE_HSN)),
        product_category: opt_text(get(LINE_CATEGORY)),
        invoiced_quantity: quantity,
        line_extension_amount: money(line_amount),
        item: Item {
            name: name
                .clone()
                .or_else(|| description.clone())
                .unwrap_or_else(|| fallback.clone()),
            description: description.or(name).unwrap_or(fallback),
            sellers_item_identification: None,
        },
        price: Price {
            price_amount: unit_price,
            base_quantity: None,
            price_unit: None,
        },
        allowance_charge: Vec::new(),
    };

    LegacyLine {
        line,
        rate: declared_rate.unwrap_or(ctx.config.standard_vat_rate),
    }
}

/// `"30"`, `["10", "30"]` or `[{"code": "30"}]`.
fn payment_means(node: Option<&Value>) -> Vec<PaymentMeans> {
    lookup::list(node)
        .into_iter()
        .filter_map(|m| {
            let code = match m {
                Value::Object(obj) => opt_text(get_in(obj, &["code", "paymentMeansCode"])),
                other => opt_text(Some(other)),
            }?;
            Some(PaymentMeans {
                payment_means_code: code,
                payment_due_date: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn convert(payload: Value) -> Converted {
        let config = ValidatorConfig::default();
        let ids = FixedIds::new("BID-1", "IRN-1");
        let ctx = ConvertContext {
            config: &config,
            ids: &ids,
            today: today(),
        };
        from_legacy(payload.as_object().unwrap(), &ctx)
    }

    fn acme() -> Value {
        json!({
            "supplier": {"taxId": "12345678-0001", "name": "Acme", "email": "a@acme.com"},
            "lineItems": [{"quantity": 2, "unitPrice": 500, "totalPrice": 1000}],
            "total": {"subtotal": 1000, "taxTotal": 75, "amount": 1075}
        })
    }

    #[test]
    fn synthesizes_ids_and_defaults() {
        let conv = convert(acme());
        let inv = &conv.invoice;
        assert_eq!(inv.business_id, "BID-1");
        assert_eq!(inv.irn, "IRN-1");
        assert_eq!(inv.invoice_type_code, "381");
        assert_eq!(inv.document_currency_code, "NGN");
        assert_eq!(inv.tax_currency_code, "NGN");
        assert_eq!(inv.issue_date, Some(today()));
        assert!(conv.findings.errors.is_empty());
        assert!(
            conv.findings
                .warnings
                .iter()
                .any(|w| w.field == "invoice_type_code" && w.message.contains("381"))
        );
    }

    #[test]
    fn synthesizes_single_tax_subtotal() {
        let inv = convert(acme()).invoice;
        assert_eq!(inv.tax_total.len(), 1);
        let sub = &inv.tax_total[0].tax_subtotal[0];
        assert_eq!(sub.taxable_amount, dec!(1000));
        assert_eq!(sub.tax_amount, dec!(75));
        assert_eq!(sub.tax_category.id, "VAT");
        assert_eq!(sub.tax_category.percent, dec!(7.5));
        assert_eq!(inv.legal_monetary_total.line_extension_amount, dec!(1000));
        assert_eq!(inv.legal_monetary_total.tax_inclusive_amount, dec!(1075));
        assert_eq!(inv.legal_monetary_total.payable_amount, dec!(1075));
    }

    #[test]
    fn first_line_rate_tags_the_subtotal() {
        let mut payload = acme();
        payload["lineItems"][0]["taxRate"] = json!(5);
        let inv = convert(payload).invoice;
        assert_eq!(inv.tax_total[0].tax_subtotal[0].tax_category.percent, dec!(5));
    }

    #[test]
    fn line_fields_and_fallbacks() {
        let inv = convert(acme()).invoice;
        let line = &inv.invoice_line[0];
        assert_eq!(line.id, "1");
        assert_eq!(line.invoiced_quantity, dec!(2));
        assert_eq!(line.price.price_amount, dec!(500));
        assert_eq!(line.line_extension_amount, dec!(1000));
        assert_eq!(line.item.description, "Item 1");
        assert_eq!(line.item.name, "Item 1");
    }

    #[test]
    fn line_amount_computed_when_total_price_missing() {
        let payload = json!({
            "supplier": {"name": "Acme"},
            "lineItems": [{"description": "Cement bags", "quantity": "3", "unitPrice": "12.345"}]
        });
        let inv = convert(payload).invoice;
        assert_eq!(inv.invoice_line[0].line_extension_amount, dec!(37.04));
        assert_eq!(inv.invoice_line[0].item.name, "Cement bags");
        // no total block: subtotal = sum of lines, tax at 7.5%
        assert_eq!(inv.legal_monetary_total.line_extension_amount, dec!(37.04));
        assert_eq!(inv.tax_total[0].tax_amount, dec!(2.78));
        assert_eq!(inv.legal_monetary_total.payable_amount, dec!(39.82));
    }

    #[test]
    fn structured_and_string_addresses() {
        let payload = json!({
            "supplier": {
                "name": "Acme",
                "address": {"street": "1 Marina", "city": "Lagos", "state": "LA", "country": "gh"}
            },
            "buyer": {"name": "Buyer", "address": "5 Broad Street", "city": "Abuja"}
        });
        let inv = convert(payload).invoice;
        let s = &inv.accounting_supplier_party.postal_address;
        assert_eq!(s.street_name, "1 Marina");
        assert_eq!(s.city_name, "Lagos");
        assert_eq!(s.state.as_deref(), Some("LA"));
        assert_eq!(s.country, "GH");

        let b = &inv.accounting_customer_party.unwrap().postal_address;
        assert_eq!(b.street_name, "5 Broad Street");
        assert_eq!(b.city_name, "Abuja");
        assert_eq!(b.country, "NG");
    }

    #[test]
    fn missing_address_gets_placeholder_and_warning() {
        let conv = convert(acme());
        let addr = &conv.invoice.accounting_supplier_party.postal_address;
        assert_eq!(addr.street_name, ADDRESS_PLACEHOLDER);
        assert_eq!(addr.city_name, ADDRESS_PLACEHOLDER);
        assert!(
            conv.findings
                .warnings
                .iter()
                .any(|w| w.field == "accounting_supplier_party.postal_address.city_name")
        );
    }

    #[test]
    fn missing_supplier_email_is_left_for_validators() {
        let payload = json!({"supplier": {"taxId": "12345678-0001", "name": "Acme"}});
        let conv = convert(payload);
        assert_eq!(conv.invoice.accounting_supplier_party.email, None);
        assert!(conv.findings.errors.is_empty());
    }

    #[test]
    fn explicit_values_are_kept() {
        let payload = json!({
            "businessId": "b-77",
            "invoiceNumber": "INV-77",
            "invoiceDate": "2024-05-01T09:00:00Z",
            "dueDate": "2024-06-01",
            "invoiceTypeCode": 380,
            "currency": "usd",
            "paymentMeans": ["30", {"code": "10"}],
            "supplier": {"name": "Acme"}
        });
        let conv = convert(payload);
        let inv = &conv.invoice;
        assert_eq!(inv.business_id, "b-77");
        assert_eq!(inv.irn, "INV-77");
        assert_eq!(inv.issue_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(inv.due_date, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(inv.invoice_type_code, "380");
        assert_eq!(inv.document_currency_code, "USD");
        assert_eq!(inv.payment_means.len(), 2);
        assert_eq!(inv.payment_means[1].payment_means_code, "10");
    }

    #[test]
    fn warnings_can_be_disabled() {
        let config = ValidatorConfig {
            warn_on_defaults: false,
            ..ValidatorConfig::default()
        };
        let ids = FixedIds::new("B", "I");
        let ctx = ConvertContext {
            config: &config,
            ids: &ids,
            today: today(),
        };
        let conv = from_legacy(acme().as_object().unwrap(), &ctx);
        assert!(conv.findings.warnings.is_empty());
    }
}
