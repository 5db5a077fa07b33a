//! Converter behavior through the public API: legacy aliases, XML prefix
//! conventions and default substitution.
//!
//! Run with: `cargo test --test conversion_tests`

use chrono::NaiveDate;
use einvoice_gate::convert::legacy::{ADDRESS_PLACEHOLDER, from_legacy};
use einvoice_gate::convert::{ConvertContext, Converted};
use einvoice_gate::core::*;
use einvoice_gate::{InvoiceValidator, Payload};
use rust_decimal_macros::dec;
use serde_json::{Value, json};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn legacy(payload: Value) -> Converted {
    let config = ValidatorConfig::default();
    let ids = SequentialIds::new("T");
    let ctx = ConvertContext {
        config: &config,
        ids: &ids,
        today: today(),
    };
    from_legacy(payload.as_object().unwrap(), &ctx)
}

// ── Legacy JSON ─────────────────────────────────────────────────────────────

#[test]
fn snake_case_aliases() {
    let inv = legacy(json!({
        "business_id": "b-9",
        "invoice_number": "INV-9",
        "invoice_date": "2024-06-10",
        "supplier": {
            "tax_id": "12345678-0009",
            "name": "Snake Ltd",
            "address": {"street": "2 Allen Ave", "city": "Ikeja", "postal_code": "100271"}
        },
        "line_items": [{"qty": 4, "unit_price": "2.50", "vat_rate": 5}]
    }))
    .invoice;

    assert_eq!(inv.business_id, "b-9");
    assert_eq!(inv.irn, "INV-9");
    assert_eq!(inv.issue_date, NaiveDate::from_ymd_opt(2024, 6, 10));
    assert_eq!(inv.accounting_supplier_party.tin, "12345678-0009");
    assert_eq!(
        inv.accounting_supplier_party.postal_address.postal_zone.as_deref(),
        Some("100271")
    );
    assert_eq!(inv.invoice_line[0].line_extension_amount, dec!(10.00));
    assert_eq!(inv.tax_total[0].tax_subtotal[0].tax_category.percent, dec!(5));
    assert_eq!(inv.tax_total[0].tax_amount, dec!(0.50));
}

#[test]
fn generated_ids_come_from_the_injected_generator() {
    let conv = legacy(json!({"supplier": {"name": "Acme"}}));
    assert_eq!(conv.invoice.business_id, "T-BID-0001");
    assert_eq!(conv.invoice.irn, "T-IRN-0001");
}

#[test]
fn lines_are_numbered_and_described() {
    let inv = legacy(json!({
        "supplier": {"name": "Acme"},
        "items": [
            {"name": "Cement", "quantity": 1, "unitPrice": 10},
            {"description": "Rebar 12mm", "quantity": 1, "unitPrice": 20},
            {"quantity": 1, "unitPrice": 30}
        ]
    }))
    .invoice;

    let ids: Vec<&str> = inv.invoice_line.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(inv.invoice_line[0].item.description, "Cement");
    assert_eq!(inv.invoice_line[1].item.name, "Rebar 12mm");
    assert_eq!(inv.invoice_line[2].item.name, "Item 3");
    assert_eq!(inv.legal_monetary_total.line_extension_amount, dec!(60));
}

#[test]
fn placeholder_address_passes_validation_with_a_warning() {
    let result = InvoiceValidator::new()
        .with_id_generator(FixedIds::new("B", "I"))
        .with_today(today())
        .validate(
            json!({
                "invoiceTypeCode": "380",
                "supplier": {"taxId": "12345678-0001", "name": "Acme", "email": "a@acme.com"},
                "lineItems": [{"description": "Cement", "quantity": 1, "unitPrice": 100}]
            }),
            "json",
        );
    assert!(result.is_valid, "{:?}", result.errors);
    let inv = result.normalized_invoice.unwrap();
    assert_eq!(inv.accounting_supplier_party.postal_address.street_name, ADDRESS_PLACEHOLDER);
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.starts_with("accounting_supplier_party.postal_address.street_name:"))
    );
}

#[test]
fn legacy_text_payload() {
    let text = r#"{"supplier": {"name": "Acme"}, "currency": "ghs"}"#;
    let converted = InvoiceValidator::new()
        .with_today(today())
        .normalize(Payload::Text(text.into()), "json")
        .unwrap();
    assert_eq!(converted.invoice.document_currency_code, "GHS");
    assert_eq!(converted.invoice.tax_currency_code, "GHS");
}

// ── UBL-like XML ────────────────────────────────────────────────────────────

#[cfg(feature = "xml")]
mod xml {
    use super::*;

    fn convert(xml: &str) -> Converted {
        InvoiceValidator::new()
            .with_id_generator(FixedIds::new("GEN-B", "GEN-I"))
            .with_today(today())
            .normalize(xml, "xml")
            .unwrap()
    }

    const NS_PREFIXED: &str = r#"<ns1:Invoice xmlns:ns1="urn:inv" xmlns:ns2="urn:cac" xmlns:ns3="urn:cbc">
  <ns3:ID>INV-NS-1</ns3:ID>
  <ns3:IssueDate>2024-06-01</ns3:IssueDate>
  <ns3:InvoiceTypeCode>380</ns3:InvoiceTypeCode>
  <ns3:DocumentCurrencyCode>NGN</ns3:DocumentCurrencyCode>
  <ns2:AccountingSupplierParty>
    <ns2:Party>
      <ns2:PartyName><ns3:Name>Prefix Ltd</ns3:Name></ns2:PartyName>
      <ns2:PostalAddress>
        <ns3:StreetName>3 Awolowo Rd</ns3:StreetName>
        <ns3:CityName>Ikoyi</ns3:CityName>
        <ns2:Country><ns3:IdentificationCode>NG</ns3:IdentificationCode></ns2:Country>
      </ns2:PostalAddress>
      <ns2:PartyTaxScheme><ns3:CompanyID>12345678-0003</ns3:CompanyID></ns2:PartyTaxScheme>
      <ns2:Contact><ns3:ElectronicMail>ops@prefix.ng</ns3:ElectronicMail></ns2:Contact>
    </ns2:Party>
  </ns2:AccountingSupplierParty>
  <ns2:InvoiceLine>
    <ns3:ID>1</ns3:ID>
    <ns3:InvoicedQuantity>1</ns3:InvoicedQuantity>
    <ns3:LineExtensionAmount>100.00</ns3:LineExtensionAmount>
    <ns2:Item><ns3:Name>Diesel</ns3:Name><ns3:Description>Diesel 20L</ns3:Description></ns2:Item>
    <ns2:Price><ns3:PriceAmount>100.00</ns3:PriceAmount></ns2:Price>
  </ns2:InvoiceLine>
  <ns2:InvoiceLine>
    <ns3:ID>2</ns3:ID>
    <ns3:InvoicedQuantity>2</ns3:InvoicedQuantity>
    <ns3:LineExtensionAmount>50.005</ns3:LineExtensionAmount>
    <ns2:Item><ns3:Name>Oil</ns3:Name></ns2:Item>
    <ns2:Price><ns3:PriceAmount>abc</ns3:PriceAmount></ns2:Price>
  </ns2:InvoiceLine>
</ns1:Invoice>"#;

    #[test]
    fn alternate_prefixes() {
        let conv = convert(NS_PREFIXED);
        let inv = &conv.invoice;
        assert_eq!(inv.irn, "INV-NS-1");
        assert_eq!(inv.accounting_supplier_party.party_name, "Prefix Ltd");
        assert_eq!(inv.accounting_supplier_party.tin, "12345678-0003");
        assert_eq!(inv.accounting_supplier_party.email.as_deref(), Some("ops@prefix.ng"));
        assert_eq!(inv.accounting_supplier_party.postal_address.city_name, "Ikoyi");
    }

    #[test]
    fn repeated_lines_keep_order_and_amounts_are_rounded() {
        let inv = convert(NS_PREFIXED).invoice;
        assert_eq!(inv.invoice_line.len(), 2);
        assert_eq!(inv.invoice_line[1].id, "2");
        assert_eq!(inv.invoice_line[1].line_extension_amount, dec!(50.01));
        // non-numeric price falls back to zero
        assert_eq!(inv.invoice_line[1].price.price_amount, dec!(0));
    }

    #[test]
    fn missing_uuid_is_generated() {
        let conv = convert(NS_PREFIXED);
        assert_eq!(conv.invoice.business_id, "GEN-B");
        assert!(conv.findings.warnings.iter().any(|w| w.field == "business_id"));
        assert_eq!(conv.invoice.tax_currency_code, "NGN");
    }

    #[test]
    fn bare_names_without_prefixes() {
        let conv = convert(
            "<Invoice><ID>B-1</ID><UUID>u-1</UUID>\
             <AccountingSupplierParty><Party><PartyName><Name>Bare</Name></PartyName>\
             </Party></AccountingSupplierParty></Invoice>",
        );
        assert_eq!(conv.invoice.irn, "B-1");
        assert_eq!(conv.invoice.business_id, "u-1");
        assert_eq!(conv.invoice.accounting_supplier_party.party_name, "Bare");
        assert_eq!(conv.invoice.accounting_supplier_party.postal_address.country, "NG");
    }

    #[test]
    fn xml_passes_through_as_string_value() {
        let tree = Payload::Value(Value::String("<Invoice><ID>S-1</ID></Invoice>".into()));
        let conv = InvoiceValidator::new().normalize(tree, "xml").unwrap();
        assert_eq!(conv.invoice.irn, "S-1");
    }

    #[test]
    fn pre_parsed_tree() {
        let tree = json!({"Invoice": {"cbc:ID": "T-1", "cbc:UUID": "u"}});
        let conv = InvoiceValidator::new().normalize(tree, "xml").unwrap();
        assert_eq!(conv.invoice.irn, "T-1");
        assert!(conv.findings.warnings.iter().all(|w| w.field != "business_id"));
    }
}
