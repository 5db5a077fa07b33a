use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::{ConvertContext, Converted};
use crate::core::*;
use crate::lookup;

/// Decode a payload already in canonical shape.
///
/// Unlike `serde_json::from_value`, a mistyped field does not abort the
/// whole decode: it is reported as a structural error at its path and left
/// empty, so one call surfaces every problem at once. A party address
/// without a country gets `config.country_code`, noted as a warning.
pub fn from_canonical(payload: &Map<String, Value>, ctx: &ConvertContext<'_>) -> Converted {
    let mut d = Decoder {
        ctx: *ctx,
        findings: Findings::new(),
    };
    let invoice = d.invoice(payload);
    Converted {
        invoice,
        findings: d.findings,
    }
}

struct Decoder<'a> {
    ctx: ConvertContext<'a>,
    findings: Findings,
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

impl Decoder<'_> {
    fn mismatch(&mut self, path: String, message: &str) {
        self.findings.error(ValidationError::structural(path, message));
    }

    fn invoice(&mut self, o: &Map<String, Value>) -> CanonicalInvoice {
        if Self::field(o, "legal_monetary_total").is_none() {
            self.mismatch("legal_monetary_total".into(), "is required");
        }
        CanonicalInvoice {
            business_id: self.string(o, "", "business_id"),
            irn: self.string(o, "", "irn"),
            issue_date: self.date(o, "", "issue_date"),
            due_date: self.date(o, "", "due_date"),
            issue_time: self.opt_string(o, "", "issue_time"),
            invoice_type_code: self.string(o, "", "invoice_type_code"),
            document_currency_code: self.string(o, "", "document_currency_code"),
            tax_currency_code: self.string(o, "", "tax_currency_code"),
            note: self.opt_string(o, "", "note"),
            tax_point_date: self.date(o, "", "tax_point_date"),
            accounting_cost: self.opt_string(o, "", "accounting_cost"),
            buyer_reference: self.opt_string(o, "", "buyer_reference"),
            invoice_delivery_period: self
                .object(o, "", "invoice_delivery_period")
                .and_then(|p| self.period(p, "invoice_delivery_period")),
            order_reference: self.opt_string(o, "", "order_reference"),
            billing_reference: self.each(o, "", "billing_reference", Self::reference),
            additional_document_reference: self.each(
                o,
                "",
                "additional_document_reference",
                Self::reference,
            ),
            accounting_supplier_party: self
                .object(o, "", "accounting_supplier_party")
                .map(|p| self.party(p, "accounting_supplier_party"))
                .unwrap_or_default(),
            accounting_customer_party: self.opt_party(o, "accounting_customer_party"),
            payee_party: self.opt_party(o, "payee_party"),
            bill_party: self.opt_party(o, "bill_party"),
            ship_party: self.opt_party(o, "ship_party"),
            tax_representative_party: self.opt_party(o, "tax_representative_party"),
            actual_delivery_date: self.date(o, "", "actual_delivery_date"),
            payment_means: self.each(o, "", "payment_means", |d, m, path| PaymentMeans {
                payment_means_code: d.string(m, path, "payment_means_code"),
                payment_due_date: d.date(m, path, "payment_due_date"),
            }),
            payment_terms_note: self.opt_string(o, "", "payment_terms_note"),
            allowance_charge: self.each(o, "", "allowance_charge", Self::allowance_charge),
            tax_total: self.each(o, "", "tax_total", Self::tax_total),
            legal_monetary_total: self
                .object(o, "", "legal_monetary_total")
                .map(|m| self.monetary_total(m, "legal_monetary_total"))
                .unwrap_or_default(),
            invoice_line: self.each(o, "", "invoice_line", Self::line),
        }
    }

    fn opt_party(&mut self, o: &Map<String, Value>, key: &str) -> Option<Party> {
        self.object(o, "", key).map(|p| self.party(p, key))
    }

    fn party(&mut self, o: &Map<String, Value>, path: &str) -> Party {
        let address_path = join(path, "postal_address");
        let mut party = Party {
            party_name: self.string(o, path, "party_name"),
            tin: self.string(o, path, "tin"),
            email: self.opt_string(o, path, "email"),
            telephone: self.opt_string(o, path, "telephone"),
            business_description: self.opt_string(o, path, "business_description"),
            postal_address: self
                .object(o, path, "postal_address")
                .map(|a| Address {
                    street_name: self.string(a, &address_path, "street_name"),
                    city_name: self.string(a, &address_path, "city_name"),
                    postal_zone: self.opt_string(a, &address_path, "postal_zone"),
                    state: self.opt_string(a, &address_path, "state"),
                    country: self.string(a, &address_path, "country"),
                })
                .unwrap_or_default(),
        };
        if party.postal_address.country.trim().is_empty() {
            let ctx = self.ctx;
            let country = &ctx.config.country_code;
            ctx.defaulted(
                &mut self.findings,
                &join(&address_path, "country"),
                format!("missing; defaulted to {country}"),
            );
            party.postal_address.country = country.clone();
        }
        party
    }

    fn line(&mut self, o: &Map<String, Value>, path: &str) -> InvoiceLine {
        let item_path = join(path, "item");
        let price_path = join(path, "price");
        InvoiceLine {
            id: self.string(o, path, "id"),
            hsn_code: self.opt_string(o, path, "hsn_code"),
            product_category: self.opt_string(o, path, "product_category"),
            invoiced_quantity: self.decimal(o, path, "invoiced_quantity"),
            line_extension_amount: self.decimal(o, path, "line_extension_amount"),
            item: self
                .object(o, path, "item")
                .map(|i| Item {
                    name: self.string(i, &item_path, "name"),
                    description: self.string(i, &item_path, "description"),
                    sellers_item_identification: self.opt_string(
                        i,
                        &item_path,
                        "sellers_item_identification",
                    ),
                })
                .unwrap_or_default(),
            price: self
                .object(o, path, "price")
                .map(|p| Price {
                    price_amount: self.decimal(p, &price_path, "price_amount"),
                    base_quantity: self.opt_decimal(p, &price_path, "base_quantity"),
                    price_unit: self.opt_string(p, &price_path, "price_unit"),
                })
                .unwrap_or_default(),
            allowance_charge: self.each(o, path, "allowance_charge", Self::allowance_charge),
        }
    }

    fn allowance_charge(&mut self, o: &Map<String, Value>, path: &str) -> AllowanceCharge {
        AllowanceCharge {
            charge_indicator: self.boolean(o, path, "charge_indicator"),
            amount: self.decimal(o, path, "amount"),
        }
    }

    fn tax_total(&mut self, o: &Map<String, Value>, path: &str) -> TaxTotal {
        TaxTotal {
            tax_amount: self.decimal(o, path, "tax_amount"),
            tax_subtotal: self.each(o, path, "tax_subtotal", |d, s, path| {
                let category_path = join(path, "tax_category");
                TaxSubtotal {
                    taxable_amount: d.decimal(s, path, "taxable_amount"),
                    tax_amount: d.decimal(s, path, "tax_amount"),
                    tax_category: d
                        .object(s, path, "tax_category")
                        .map(|c| TaxCategory {
                            id: d.string(c, &category_path, "id"),
                            percent: d.decimal(c, &category_path, "percent"),
                        })
                        .unwrap_or_default(),
                }
            }),
        }
    }

    fn monetary_total(&mut self, o: &Map<String, Value>, path: &str) -> MonetaryTotal {
        MonetaryTotal {
            line_extension_amount: self.decimal(o, path, "line_extension_amount"),
            tax_exclusive_amount: self.decimal(o, path, "tax_exclusive_amount"),
            tax_inclusive_amount: self.decimal(o, path, "tax_inclusive_amount"),
            payable_amount: self.decimal(o, path, "payable_amount"),
            allowance_total_amount: self.opt_decimal(o, path, "allowance_total_amount"),
            charge_total_amount: self.opt_decimal(o, path, "charge_total_amount"),
            prepaid_amount: self.opt_decimal(o, path, "prepaid_amount"),
        }
    }

    fn reference(&mut self, o: &Map<String, Value>, path: &str) -> DocumentReference {
        DocumentReference {
            irn: self.string(o, path, "irn"),
            issue_date: self.date(o, path, "issue_date"),
        }
    }

    fn period(&mut self, o: &Map<String, Value>, path: &str) -> Option<Period> {
        let start = self.date(o, path, "start_date");
        let end = self.date(o, path, "end_date");
        match (start, end) {
            (Some(start_date), Some(end_date)) => Some(Period {
                start_date,
                end_date,
            }),
            _ => {
                self.mismatch(path.to_string(), "must have start_date and end_date");
                None
            }
        }
    }

    // -- scalar and container readers --

    fn field<'v>(o: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
        o.get(key).filter(|v| !v.is_null())
    }

    fn opt_string(&mut self, o: &Map<String, Value>, path: &str, key: &str) -> Option<String> {
        match Self::field(o, key)? {
            Value::String(s) => lookup::non_empty(s.clone()),
            v @ (Value::Number(_) | Value::Bool(_)) => Some(v.to_string()),
            _ => {
                self.mismatch(join(path, key), "must be a string");
                None
            }
        }
    }

    fn string(&mut self, o: &Map<String, Value>, path: &str, key: &str) -> String {
        self.opt_string(o, path, key).unwrap_or_default()
    }

    fn opt_decimal(&mut self, o: &Map<String, Value>, path: &str, key: &str) -> Option<Decimal> {
        let value = Self::field(o, key)?;
        let parsed = match value {
            Value::Number(n) => lookup::parse_decimal(&n.to_string()),
            Value::String(s) => lookup::parse_decimal(s),
            _ => None,
        };
        if parsed.is_none() {
            self.mismatch(join(path, key), "must be a number");
        }
        parsed
    }

    fn decimal(&mut self, o: &Map<String, Value>, path: &str, key: &str) -> Decimal {
        self.opt_decimal(o, path, key).unwrap_or_default()
    }

    fn date(&mut self, o: &Map<String, Value>, path: &str, key: &str) -> Option<NaiveDate> {
        let value = Self::field(o, key)?;
        let parsed = value
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok());
        if parsed.is_none() {
            self.mismatch(join(path, key), "must be a date in YYYY-MM-DD format");
        }
        parsed
    }

    fn boolean(&mut self, o: &Map<String, Value>, path: &str, key: &str) -> bool {
        match Self::field(o, key) {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
            Some(_) => {
                self.mismatch(join(path, key), "must be a boolean");
                false
            }
        }
    }

    fn object<'v>(
        &mut self,
        o: &'v Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Option<&'v Map<String, Value>> {
        let value = Self::field(o, key)?;
        if value.as_object().is_none() {
            self.mismatch(join(path, key), "must be an object");
        }
        value.as_object()
    }

    /// Decode every object element of the array at `key`.
    fn each<T>(
        &mut self,
        o: &Map<String, Value>,
        path: &str,
        key: &str,
        mut decode: impl FnMut(&mut Self, &Map<String, Value>, &str) -> T,
    ) -> Vec<T> {
        let base = join(path, key);
        let Some(value) = Self::field(o, key) else {
            return Vec::new();
        };
        let Some(items) = value.as_array() else {
            self.mismatch(base, "must be an array");
            return Vec::new();
        };
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let item_path = format!("{base}[{i}]");
                match item.as_object() {
                    Some(obj) => Some(decode(self, obj, &item_path)),
                    None => {
                        self.mismatch(item_path, "must be an object");
                        None
                    }
                }
            })
            .collect()
    }
}
