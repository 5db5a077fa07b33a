//! The three validator passes.
//!
//! Each pass is a pure function from a [`CanonicalInvoice`] to
//! [`Findings`]; none of them stops at the first problem. The engine runs
//! all three regardless of earlier outcomes.
//!
//! [`CanonicalInvoice`]: crate::core::CanonicalInvoice
//! [`Findings`]: crate::core::Findings

mod business;
mod compliance;
mod structural;

pub use business::validate_business;
pub use compliance::validate_compliance;
pub use structural::{validate_structure, validate_structure_with_tolerance};

use std::sync::OnceLock;

use regex::Regex;

static TIN_REGEX: OnceLock<Regex> = OnceLock::new();
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
static TIME_REGEX: OnceLock<Regex> = OnceLock::new();

fn pattern<'a>(cell: &'a OnceLock<Regex>, source: &str) -> &'a Regex {
    cell.get_or_init(|| Regex::new(source).expect("static pattern compiles"))
}

/// Example shown in TIN format messages.
pub const TIN_EXAMPLE: &str = "12345678-1234";

/// Tax identification number: eight digits, hyphen, four digits.
///
/// ```
/// use einvoice_gate::validate::is_valid_tin;
///
/// assert!(is_valid_tin("12345678-0001"));
/// assert!(!is_valid_tin("1234567-0001"));
/// ```
pub fn is_valid_tin(tin: &str) -> bool {
    pattern(&TIN_REGEX, r"^\d{8}-\d{4}$").is_match(tin)
}

/// `local@domain.tld` with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    pattern(&EMAIL_REGEX, r"^[^\s@]+@[^\s@]+\.[^\s@]+$").is_match(email)
}

/// Leading `+`, then digits, spaces or hyphens; at least seven digits.
pub fn is_valid_telephone(phone: &str) -> bool {
    pattern(&PHONE_REGEX, r"^\+[\d\s-]+$").is_match(phone)
        && phone.chars().filter(char::is_ascii_digit).count() >= 7
}

/// `HH:MM:SS`, 24-hour clock.
pub fn is_valid_time(time: &str) -> bool {
    pattern(&TIME_REGEX, r"^([01]\d|2[0-3]):[0-5]\d:[0-5]\d$").is_match(time)
}
