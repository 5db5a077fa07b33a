use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The canonical invoice every input format converges to.
///
/// Field names are the wire names of the national e-invoicing schema.
/// A value may be partially populated: converters fill what they find and
/// leave the gaps for the validators to report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalInvoice {
    /// Opaque identifier, unique per submission.
    pub business_id: String,
    /// Invoice reference number, unique per business.
    pub irn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// `HH:MM:SS`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_time: Option<String>,
    /// UNTDID 1001 document type code, e.g. "380".
    pub invoice_type_code: String,
    /// ISO 4217.
    pub document_currency_code: String,
    /// ISO 4217.
    pub tax_currency_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_point_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounting_cost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_delivery_period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_reference: Option<String>,
    /// Preceding invoices (credit/debit notes point back here).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub billing_reference: Vec<DocumentReference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_document_reference: Vec<DocumentReference>,
    pub accounting_supplier_party: Party,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounting_customer_party: Option<Party>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee_party: Option<Party>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_party: Option<Party>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_party: Option<Party>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_representative_party: Option<Party>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_delivery_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payment_means: Vec<PaymentMeans>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms_note: Option<String>,
    /// Document-level allowances and charges.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowance_charge: Vec<AllowanceCharge>,
    pub tax_total: Vec<TaxTotal>,
    pub legal_monetary_total: MonetaryTotal,
    pub invoice_line: Vec<InvoiceLine>,
}

impl CanonicalInvoice {
    /// The optional parties that are present, with their field path.
    pub fn optional_parties(&self) -> impl Iterator<Item = (&'static str, &Party)> {
        [
            ("accounting_customer_party", self.accounting_customer_party.as_ref()),
            ("payee_party", self.payee_party.as_ref()),
            ("bill_party", self.bill_party.as_ref()),
            ("ship_party", self.ship_party.as_ref()),
            ("tax_representative_party", self.tax_representative_party.as_ref()),
        ]
        .into_iter()
        .filter_map(|(path, party)| party.map(|p| (path, p)))
    }

    /// Sum of all line extension amounts.
    pub fn line_total(&self) -> Decimal {
        self.invoice_line
            .iter()
            .fold(Decimal::ZERO, |acc, l| acc.saturating_add(l.line_extension_amount))
    }

    /// Sum of all document-level tax amounts.
    pub fn tax_amount_total(&self) -> Decimal {
        self.tax_total
            .iter()
            .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.tax_amount))
    }
}

/// A trading party (supplier, customer, payee, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Party {
    pub party_name: String,
    /// Tax identification number, `12345678-1234`.
    pub tin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// International format, leading `+`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_description: Option<String>,
    pub postal_address: Address,
}

/// Postal address of a party.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street_name: String,
    pub city_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// ISO 3166-1 alpha-2.
    pub country: String,
}

/// One invoice line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceLine {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsn_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_category: Option<String>,
    pub invoiced_quantity: Decimal,
    /// Net amount of the line, at most 2 decimal places.
    pub line_extension_amount: Decimal,
    pub item: Item,
    pub price: Price,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowance_charge: Vec<AllowanceCharge>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sellers_item_identification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Price {
    /// Unit price.
    pub price_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_quantity: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_unit: Option<String>,
}

/// Allowance (discount) or charge, document- or line-level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowanceCharge {
    /// True = charge, false = allowance.
    pub charge_indicator: bool,
    pub amount: Decimal,
}

/// Tax total with its per-category breakdown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxTotal {
    pub tax_amount: Decimal,
    pub tax_subtotal: Vec<TaxSubtotal>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxSubtotal {
    pub taxable_amount: Decimal,
    pub tax_amount: Decimal,
    pub tax_category: TaxCategory,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxCategory {
    /// e.g. "VAT".
    pub id: String,
    /// Rate in percent, 0..=100.
    pub percent: Decimal,
}

/// Document totals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonetaryTotal {
    /// Sum of line net amounts.
    pub line_extension_amount: Decimal,
    pub tax_exclusive_amount: Decimal,
    pub tax_inclusive_amount: Decimal,
    pub payable_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowance_total_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_total_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepaid_amount: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentMeans {
    /// UNTDID 4461 code, e.g. "30".
    pub payment_means_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentReference {
    pub irn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
}

/// Delivery or invoicing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
