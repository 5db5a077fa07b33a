use rust_decimal::Decimal;
use serde_json::Value;

use super::PREFIX_CONVENTIONS;
use crate::convert::{ConvertContext, Converted};
use crate::core::*;
use crate::lookup::{self, ATTR_KEY, money, non_empty};

/// Local names accepted for the document element.
const ROOT_NAMES: [&str; 2] = ["Invoice", "CreditNote"];

// Party fields → UBL paths relative to a `cac:Party`, tried in order.
const PARTY_NAME: &[&str] = &[
    "cac:PartyName/cbc:Name",
    "cac:PartyLegalEntity/cbc:RegistrationName",
];
const PARTY_TIN: &[&str] = &[
    "cac:PartyTaxScheme/cbc:CompanyID",
    "cac:PartyLegalEntity/cbc:CompanyID",
    "cac:PartyIdentification/cbc:ID",
];
const PARTY_EMAIL: &[&str] = &["cac:Contact/cbc:ElectronicMail"];
const PARTY_PHONE: &[&str] = &["cac:Contact/cbc:Telephone"];
const PARTY_DESCRIPTION: &[&str] = &["cbc:BusinessDescription"];

// Address fields → paths relative to `cac:PostalAddress`.
const STREET: &[&str] = &["cbc:StreetName", "cac:AddressLine/cbc:Line"];
const CITY: &[&str] = &["cbc:CityName"];
const POSTAL_ZONE: &[&str] = &["cbc:PostalZone"];
const STATE: &[&str] = &["cbc:CountrySubentity"];
const COUNTRY: &[&str] = &["cac:Country/cbc:IdentificationCode"];

/// Extract a canonical invoice from a parsed UBL-like tree.
///
/// Accepts the tree as produced by [`super::parse_tree`] (wrapped in its
/// root element) or the root element's content directly. Missing elements
/// yield empty values; non-numeric amounts become zero.
pub fn from_ubl_tree(tree: &Value, ctx: &ConvertContext<'_>) -> Converted {
    let root = document_root(tree);
    let doc = Some(root);
    let mut findings = Findings::new();

    let business_id = match non_empty(text_at(doc, &["cbc:UUID"])) {
        Some(id) => id,
        None => {
            let id = ctx.ids.business_id();
            ctx.defaulted(
                &mut findings,
                "business_id",
                format!("document has no UUID; generated '{id}'"),
            );
            id
        }
    };

    let document_currency_code = match non_empty(text_at(doc, &["cbc:DocumentCurrencyCode"])) {
        Some(code) => code,
        None => {
            ctx.defaulted(
                &mut findings,
                "document_currency_code",
                format!("missing; defaulted to {}", ctx.config.currency_code),
            );
            ctx.config.currency_code.clone()
        }
    };
    let tax_currency_code = non_empty(text_at(doc, &["cbc:TaxCurrencyCode"]))
        .unwrap_or_else(|| document_currency_code.clone());

    let invoice_delivery_period = at(root, "cac:InvoicePeriod").and_then(|p| {
        Some(Period {
            start_date: lookup::parse_date(&text_at(Some(p), &["cbc:StartDate"]))?,
            end_date: lookup::parse_date(&text_at(Some(p), &["cbc:EndDate"]))?,
        })
    });

    let billing_reference = lookup::list(at(root, "cac:BillingReference"))
        .into_iter()
        .map(|r| DocumentReference {
            irn: text_at(Some(r), &["cac:InvoiceDocumentReference/cbc:ID"]),
            issue_date: date_at(Some(r), &["cac:InvoiceDocumentReference/cbc:IssueDate"]),
        })
        .collect();

    let additional_document_reference = lookup::list(at(root, "cac:AdditionalDocumentReference"))
        .into_iter()
        .map(|r| DocumentReference {
            irn: text_at(Some(r), &["cbc:ID"]),
            issue_date: date_at(Some(r), &["cbc:IssueDate"]),
        })
        .collect();

    let payment_means = lookup::list(at(root, "cac:PaymentMeans"))
        .into_iter()
        .map(|m| PaymentMeans {
            payment_means_code: text_at(Some(m), &["cbc:PaymentMeansCode"]),
            payment_due_date: date_at(Some(m), &["cbc:PaymentDueDate"]),
        })
        .collect();

    let tax_total = lookup::list(at(root, "cac:TaxTotal"))
        .into_iter()
        .map(tax_total_of)
        .collect();

    let totals = at(root, "cac:LegalMonetaryTotal");
    let legal_monetary_total = MonetaryTotal {
        line_extension_amount: money(decimal_at(totals, &["cbc:LineExtensionAmount"])),
        tax_exclusive_amount: money(decimal_at(totals, &["cbc:TaxExclusiveAmount"])),
        tax_inclusive_amount: money(decimal_at(totals, &["cbc:TaxInclusiveAmount"])),
        payable_amount: money(decimal_at(totals, &["cbc:PayableAmount"])),
        allowance_total_amount: opt_decimal_at(totals, &["cbc:AllowanceTotalAmount"]).map(money),
        charge_total_amount: opt_decimal_at(totals, &["cbc:ChargeTotalAmount"]).map(money),
        prepaid_amount: opt_decimal_at(totals, &["cbc:PrepaidAmount"]).map(money),
    };

    let invoice_line = lookup::list(at_any(root, &["cac:InvoiceLine", "cac:CreditNoteLine"]))
        .into_iter()
        .map(line_of)
        .collect();

    let invoice = CanonicalInvoice {
        business_id,
        irn: text_at(doc, &["cbc:ID"]),
        issue_date: date_at(doc, &["cbc:IssueDate"]),
        due_date: date_at(doc, &["cbc:DueDate", "cac:PaymentMeans/cbc:PaymentDueDate"]),
        issue_time: opt_text_at(doc, &["cbc:IssueTime"]),
        invoice_type_code: text_at(doc, &["cbc:InvoiceTypeCode", "cbc:CreditNoteTypeCode"]),
        document_currency_code,
        tax_currency_code,
        note: opt_text_at(doc, &["cbc:Note"]),
        tax_point_date: date_at(doc, &["cbc:TaxPointDate"]),
        accounting_cost: opt_text_at(doc, &["cbc:AccountingCost"]),
        buyer_reference: opt_text_at(doc, &["cbc:BuyerReference"]),
        invoice_delivery_period,
        order_reference: opt_text_at(doc, &["cac:OrderReference/cbc:ID"]),
        billing_reference,
        additional_document_reference,
        accounting_supplier_party: party(
            at_any(
                root,
                &["cac:AccountingSupplierParty/cac:Party", "cac:AccountingSupplierParty"],
            ),
            ctx,
        ),
        accounting_customer_party: optional_party(
            root,
            &["cac:AccountingCustomerParty/cac:Party", "cac:AccountingCustomerParty"],
            ctx,
        ),
        payee_party: optional_party(root, &["cac:PayeeParty"], ctx),
        bill_party: optional_party(root, &["cac:BuyerCustomerParty/cac:Party"], ctx),
        ship_party: optional_party(root, &["cac:Delivery/cac:DeliveryParty"], ctx),
        tax_representative_party: optional_party(root, &["cac:TaxRepresentativeParty"], ctx),
        actual_delivery_date: date_at(doc, &["cac:Delivery/cbc:ActualDeliveryDate"]),
        payment_means,
        payment_terms_note: opt_text_at(doc, &["cac:PaymentTerms/cbc:Note"]),
        allowance_charge: allowance_charges(root),
        tax_total,
        legal_monetary_total,
        invoice_line,
    };

    Converted { invoice, findings }
}

/// Unwrap `{"Invoice": {...}}`-style trees to the document element.
fn document_root(tree: &Value) -> &Value {
    match tree.as_object() {
        Some(obj) if obj.len() == 1 => obj
            .iter()
            .find(|(name, _)| {
                let local = name.rsplit(':').next().unwrap_or(name.as_str());
                ROOT_NAMES.contains(&local)
            })
            .map(|(_, content)| content)
            .unwrap_or(tree),
        _ => tree,
    }
}

/// Equivalent element names for one path segment written in UBL notation.
///
/// `cac:Party` → `["cac:Party", "ns2:Party", "Party"]`.
fn aliases(segment: &str) -> Vec<String> {
    let (prefix, local) = segment.split_once(':').unwrap_or(("", segment));
    let mut names: Vec<String> = match prefix {
        "cac" => PREFIX_CONVENTIONS
            .iter()
            .map(|(agg, _)| format!("{agg}:{local}"))
            .collect(),
        "cbc" => PREFIX_CONVENTIONS
            .iter()
            .map(|(_, basic)| format!("{basic}:{local}"))
            .collect(),
        "" => Vec::new(),
        _ => vec![segment.to_string()],
    };
    names.push(local.to_string());
    names
}

/// Follow a `/`-separated path; repeated elements resolve to their first
/// occurrence except for the last segment.
fn at<'a>(node: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('/')
        .try_fold(node, |cur, segment| lookup::get(cur, &aliases(segment)))
}

fn at_any<'a>(node: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths.iter().find_map(|p| at(node, p))
}

/// First non-empty text among `paths`.
fn text_at(node: Option<&Value>, paths: &[&str]) -> String {
    let Some(node) = node else {
        return String::new();
    };
    paths
        .iter()
        .map(|p| lookup::text(at(node, p)))
        .find(|t| !t.is_empty())
        .unwrap_or_default()
}

fn opt_text_at(node: Option<&Value>, paths: &[&str]) -> Option<String> {
    non_empty(text_at(node, paths))
}

fn opt_decimal_at(node: Option<&Value>, paths: &[&str]) -> Option<Decimal> {
    lookup::parse_decimal(&text_at(node, paths))
}

fn decimal_at(node: Option<&Value>, paths: &[&str]) -> Decimal {
    opt_decimal_at(node, paths).unwrap_or(Decimal::ZERO)
}

fn date_at(node: Option<&Value>, paths: &[&str]) -> Option<chrono::NaiveDate> {
    lookup::parse_date(&text_at(node, paths))
}

fn party(node: Option<&Value>, ctx: &ConvertContext<'_>) -> Party {
    let address = node.and_then(|n| at(n, "cac:PostalAddress"));
    Party {
        party_name: text_at(node, PARTY_NAME),
        tin: text_at(node, PARTY_TIN),
        email: opt_text_at(node, PARTY_EMAIL),
        telephone: opt_text_at(node, PARTY_PHONE),
        business_description: opt_text_at(node, PARTY_DESCRIPTION),
        postal_address: Address {
            street_name: text_at(address, STREET),
            city_name: text_at(address, CITY),
            postal_zone: opt_text_at(address, POSTAL_ZONE),
            state: opt_text_at(address, STATE),
            country: opt_text_at(address, COUNTRY)
                .unwrap_or_else(|| ctx.config.country_code.clone()),
        },
    }
}

fn optional_party(root: &Value, paths: &[&str], ctx: &ConvertContext<'_>) -> Option<Party> {
    at_any(root, paths).map(|node| party(Some(node), ctx))
}

fn tax_total_of(node: &Value) -> TaxTotal {
    TaxTotal {
        tax_amount: money(decimal_at(Some(node), &["cbc:TaxAmount"])),
        tax_subtotal: lookup::list(at(node, "cac:TaxSubtotal"))
            .into_iter()
            .map(|sub| {
                let sub = Some(sub);
                TaxSubtotal {
                    taxable_amount: money(decimal_at(sub, &["cbc:TaxableAmount"])),
                    tax_amount: money(decimal_at(sub, &["cbc:TaxAmount"])),
                    tax_category: TaxCategory {
                        id: text_at(sub, &["cac:TaxCategory/cbc:ID"]),
                        percent: decimal_at(sub, &["cac:TaxCategory/cbc:Percent", "cbc:Percent"]),
                    },
                }
            })
            .collect(),
    }
}

fn line_of(node: &Value) -> InvoiceLine {
    let line = Some(node);
    let item = at(node, "cac:Item");
    let price = at(node, "cac:Price");
    let price_unit = price
        .and_then(|p| at(p, "cbc:BaseQuantity"))
        .and_then(|q| q.get(ATTR_KEY))
        .and_then(|attrs| attrs.get("unitCode"))
        .and_then(Value::as_str)
        .map(str::to_string);

    InvoiceLine {
        id: text_at(line, &["cbc:ID"]),
        hsn_code: opt_text_at(
            item,
            &["cac:CommodityClassification/cbc:ItemClassificationCode"],
        ),
        product_category: None,
        invoiced_quantity: decimal_at(line, &["cbc:InvoicedQuantity", "cbc:CreditedQuantity"]),
        line_extension_amount: money(decimal_at(line, &["cbc:LineExtensionAmount"])),
        item: Item {
            name: text_at(item, &["cbc:Name"]),
            description: text_at(item, &["cbc:Description"]),
            sellers_item_identification: opt_text_at(
                item,
                &["cac:SellersItemIdentification/cbc:ID"],
            ),
        },
        price: Price {
            price_amount: decimal_at(price, &["cbc:PriceAmount"]),
            base_quantity: opt_decimal_at(price, &["cbc:BaseQuantity"]),
            price_unit,
        },
        allowance_charge: allowance_charges(node),
    }
}

fn allowance_charges(node: &Value) -> Vec<AllowanceCharge> {
    lookup::list(at(node, "cac:AllowanceCharge"))
        .into_iter()
        .map(|ac| AllowanceCharge {
            charge_indicator: lookup::flag(at(ac, "cbc:ChargeIndicator")),
            amount: money(decimal_at(Some(ac), &["cbc:Amount"])),
        })
        .collect()
}
