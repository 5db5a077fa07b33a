//! UBL-like XML input.
//!
//! [`parse_tree`] turns XML text into a map/list tree; [`from_ubl_tree`]
//! extracts the canonical invoice from such a tree.
//!
//! ```
//! use einvoice_gate::xml;
//!
//! let tree = xml::parse_tree("<Invoice><cbc:ID>INV-7</cbc:ID></Invoice>").unwrap();
//! assert_eq!(tree["Invoice"]["cbc:ID"], "INV-7");
//! ```

mod tree;
mod ubl;

pub use tree::parse_tree;
pub use ubl::from_ubl_tree;

/// Namespace prefix conventions accepted for aggregate (`cac`) and basic
/// (`cbc`) components, in lookup order. The bare local name is always tried
/// last.
pub const PREFIX_CONVENTIONS: [(&str, &str); 2] = [("cac", "cbc"), ("ns2", "ns3")];
