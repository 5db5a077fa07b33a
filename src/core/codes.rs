//! Fixed code lists: document types, payment means and currencies.

/// UNTDID 1001: document type codes accepted by the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    /// 380: Commercial invoice.
    CommercialInvoice,
    /// 381: Credit note.
    CreditNote,
    /// 383: Debit note.
    DebitNote,
    /// 384: Corrected invoice.
    Corrected,
    /// 385: Consolidated invoice.
    Consolidated,
    /// 386: Prepayment invoice.
    Prepayment,
    /// 389: Self-billed invoice.
    SelfBilled,
    /// 390: Delcredere invoice.
    Delcredere,
    /// 393: Factored invoice.
    Factored,
    /// 395: Consignment invoice.
    Consignment,
    /// 396: Factored credit note.
    FactoredCreditNote,
}

impl DocumentType {
    pub const ALL: [DocumentType; 11] = [
        Self::CommercialInvoice,
        Self::CreditNote,
        Self::DebitNote,
        Self::Corrected,
        Self::Consolidated,
        Self::Prepayment,
        Self::SelfBilled,
        Self::Delcredere,
        Self::Factored,
        Self::Consignment,
        Self::FactoredCreditNote,
    ];

    /// UNTDID 1001 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CommercialInvoice => "380",
            Self::CreditNote => "381",
            Self::DebitNote => "383",
            Self::Corrected => "384",
            Self::Consolidated => "385",
            Self::Prepayment => "386",
            Self::SelfBilled => "389",
            Self::Delcredere => "390",
            Self::Factored => "393",
            Self::Consignment => "395",
            Self::FactoredCreditNote => "396",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code.trim())
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::CommercialInvoice => "commercial invoice",
            Self::CreditNote => "credit note",
            Self::DebitNote => "debit note",
            Self::Corrected => "corrected invoice",
            Self::Consolidated => "consolidated invoice",
            Self::Prepayment => "prepayment invoice",
            Self::SelfBilled => "self-billed invoice",
            Self::Delcredere => "delcredere invoice",
            Self::Factored => "factored invoice",
            Self::Consignment => "consignment invoice",
            Self::FactoredCreditNote => "factored credit note",
        }
    }

    /// Credit, debit and corrective documents amend an earlier invoice and
    /// are expected to carry a billing reference to it.
    pub fn amends_prior_invoice(&self) -> bool {
        matches!(
            self,
            Self::CreditNote | Self::DebitNote | Self::Corrected | Self::FactoredCreditNote
        )
    }
}

/// UNTDID 4461: payment means codes accepted by the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMeansCode {
    /// 10: Cash.
    Cash,
    /// 20: Cheque.
    Cheque,
    /// 30: Credit transfer.
    CreditTransfer,
    /// 42: Payment to bank account.
    PaymentToBankAccount,
    /// 48: Bank card.
    BankCard,
    /// 49: Direct debit.
    DirectDebit,
    /// 57: Standing agreement.
    StandingAgreement,
    /// 58: SEPA credit transfer.
    SepaCreditTransfer,
    /// 59: SEPA direct debit.
    SepaDirectDebit,
    /// 68: Online payment service.
    OnlinePayment,
    /// 97: Clearing between partners.
    ClearingBetweenPartners,
}

impl PaymentMeansCode {
    pub const ALL: [PaymentMeansCode; 11] = [
        Self::Cash,
        Self::Cheque,
        Self::CreditTransfer,
        Self::PaymentToBankAccount,
        Self::BankCard,
        Self::DirectDebit,
        Self::StandingAgreement,
        Self::SepaCreditTransfer,
        Self::SepaDirectDebit,
        Self::OnlinePayment,
        Self::ClearingBetweenPartners,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Cash => "10",
            Self::Cheque => "20",
            Self::CreditTransfer => "30",
            Self::PaymentToBankAccount => "42",
            Self::BankCard => "48",
            Self::DirectDebit => "49",
            Self::StandingAgreement => "57",
            Self::SepaCreditTransfer => "58",
            Self::SepaDirectDebit => "59",
            Self::OnlinePayment => "68",
            Self::ClearingBetweenPartners => "97",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code.trim())
    }
}

/// Comma-separated list of codes, for error messages.
pub fn code_list<I, S>(codes: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .map(|c| c.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check whether `code` is an ISO 4217 currency code seen on invoices.
pub fn is_known_currency_code(code: &str) -> bool {
    CURRENCY_CODES.binary_search(&code).is_ok()
}

/// Sorted for binary search.
static CURRENCY_CODES: &[&str] = &[
    "AED", // UAE Dirham
    "AUD", // Australian Dollar
    "BWP", // Botswana Pula
    "CAD", // Canadian Dollar
    "CHF", // Swiss Franc
    "CNY", // Chinese Yuan
    "EGP", // Egyptian Pound
    "ETB", // Ethiopian Birr
    "EUR", // Euro
    "GBP", // Pound Sterling
    "GHS", // Ghanaian Cedi
    "GMD", // Gambian Dalasi
    "INR", // Indian Rupee
    "JPY", // Japanese Yen
    "KES", // Kenyan Shilling
    "LRD", // Liberian Dollar
    "MAD", // Moroccan Dirham
    "NGN", // Nigerian Naira
    "RWF", // Rwandan Franc
    "SAR", // Saudi Riyal
    "SLE", // Sierra Leonean Leone
    "TZS", // Tanzanian Shilling
    "UGX", // Ugandan Shilling
    "USD", // US Dollar
    "XAF", // Central African CFA Franc
    "XOF", // West African CFA Franc
    "ZAR", // South African Rand
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_type_codes_round_trip() {
        for t in DocumentType::ALL {
            assert_eq!(DocumentType::from_code(t.code()), Some(t));
        }
        assert_eq!(DocumentType::from_code("999"), None);
        assert_eq!(DocumentType::from_code(" 380 "), Some(DocumentType::CommercialInvoice));
    }

    #[test]
    fn payment_means_lookup() {
        assert_eq!(
            PaymentMeansCode::from_code("30"),
            Some(PaymentMeansCode::CreditTransfer)
        );
        assert_eq!(PaymentMeansCode::from_code("11"), None);
    }

    #[test]
    fn known_currencies() {
        assert!(is_known_currency_code("NGN"));
        assert!(is_known_currency_code("USD"));
        assert!(!is_known_currency_code("XYZ"));
        assert!(!is_known_currency_code("ngn"));
    }

    #[test]
    fn currency_list_is_sorted() {
        for window in CURRENCY_CODES.windows(2) {
            assert!(
                window[0] < window[1],
                "currency codes not sorted: {} >= {}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn code_list_joins() {
        assert_eq!(code_list(["380", "381"]), "380, 381");
    }
}
