use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};

use einvoice_gate::xml;
use einvoice_gate::{FixedIds, InvoiceValidator};

fn validator() -> InvoiceValidator {
    InvoiceValidator::new()
        .with_id_generator(FixedIds::new("BENCH-B", "BENCH-I"))
        .with_today(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
}

fn legacy_invoice(lines: usize) -> Value {
    let items: Vec<Value> = (1..=lines)
        .map(|i| {
            json!({
                "id": i.to_string(),
                "description": format!("Item {i}"),
                "quantity": 2,
                "unitPrice": "9.99",
                "taxRate": 7.5
            })
        })
        .collect();
    json!({
        "businessId": "bench-1",
        "invoiceNumber": "INV-BENCH-1",
        "invoiceDate": "2024-06-01",
        "invoiceTypeCode": "380",
        "supplier": {
            "taxId": "12345678-0001",
            "name": "Benchmark Ltd",
            "email": "bench@example.ng",
            "address": {"street": "1 Marina", "city": "Lagos"}
        },
        "lineItems": items
    })
}

fn ubl_invoice(lines: usize) -> String {
    let mut xml = String::from(
        r#"<Invoice xmlns:cac="urn:cac" xmlns:cbc="urn:cbc">
  <cbc:UUID>bench-1</cbc:UUID>
  <cbc:ID>INV-BENCH-1</cbc:ID>
  <cbc:IssueDate>2024-06-01</cbc:IssueDate>
  <cbc:InvoiceTypeCode>380</cbc:InvoiceTypeCode>
  <cbc:DocumentCurrencyCode>NGN</cbc:DocumentCurrencyCode>
  <cac:AccountingSupplierParty><cac:Party>
    <cac:PartyName><cbc:Name>Benchmark Ltd</cbc:Name></cac:PartyName>
    <cac:PostalAddress><cbc:StreetName>1 Marina</cbc:StreetName><cbc:CityName>Lagos</cbc:CityName></cac:PostalAddress>
    <cac:PartyTaxScheme><cbc:CompanyID>12345678-0001</cbc:CompanyID></cac:PartyTaxScheme>
    <cac:Contact><cbc:ElectronicMail>bench@example.ng</cbc:ElectronicMail></cac:Contact>
  </cac:Party></cac:AccountingSupplierParty>
"#,
    );
    for i in 1..=lines {
        xml.push_str(&format!(
            "  <cac:InvoiceLine><cbc:ID>{i}</cbc:ID>\
             <cbc:InvoicedQuantity>2</cbc:InvoicedQuantity>\
             <cbc:LineExtensionAmount currencyID=\"NGN\">19.98</cbc:LineExtensionAmount>\
             <cac:Item><cbc:Name>Item {i}</cbc:Name><cbc:Description>Item {i}</cbc:Description></cac:Item>\
             <cac:Price><cbc:PriceAmount currencyID=\"NGN\">9.99</cbc:PriceAmount></cac:Price>\
             </cac:InvoiceLine>\n"
        ));
    }
    xml.push_str("</Invoice>");
    xml
}

fn bench_legacy(c: &mut Criterion) {
    let validator = validator();
    let small = legacy_invoice(10);
    c.bench_function("validate_legacy_10_lines", |b| {
        b.iter(|| black_box(validator.validate(black_box(small.clone()), "json")));
    });

    let big = legacy_invoice(1000);
    c.bench_function("validate_legacy_1000_lines", |b| {
        b.iter(|| black_box(validator.validate(black_box(big.clone()), "json")));
    });
}

fn bench_canonical(c: &mut Criterion) {
    let validator = validator();
    let normalized = validator
        .validate(legacy_invoice(10), "json")
        .normalized_invoice
        .unwrap();
    let canonical = serde_json::to_string(&normalized).unwrap();
    c.bench_function("validate_canonical_text_10_lines", |b| {
        b.iter(|| black_box(validator.validate(black_box(canonical.as_str()), "json")));
    });
}

fn bench_xml(c: &mut Criterion) {
    let doc = ubl_invoice(10);
    c.bench_function("xml_parse_tree", |b| {
        b.iter(|| black_box(xml::parse_tree(black_box(&doc))));
    });

    let validator = validator();
    c.bench_function("validate_xml_10_lines", |b| {
        b.iter(|| black_box(validator.validate(black_box(doc.as_str()), "xml")));
    });
}

criterion_group!(benches, bench_legacy, bench_canonical, bench_xml);
criterion_main!(benches);
