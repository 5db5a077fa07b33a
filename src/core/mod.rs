//! Canonical invoice model, code lists, configuration and error types.
//!
//! Everything the converters and validators share lives here; nothing in
//! this module parses payloads or applies rules.

mod codes;
mod config;
mod error;
mod ids;
mod types;

pub use codes::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use types::*;
