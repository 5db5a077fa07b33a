use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{NaiveDate, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;

/// Source of identifiers synthesized for payloads that omit them.
///
/// The engine calls this at most twice per validation. Inject a
/// deterministic implementation (see [`SequentialIds`]) to make results
/// reproducible.
pub trait IdGenerator: Send + Sync {
    /// A fresh business id.
    fn business_id(&self) -> String;

    /// A fresh invoice reference number for an invoice issued on `date`.
    fn irn(&self, date: NaiveDate) -> String;
}

/// Timestamp + random suffix identifiers.
///
/// Business ids look like `1718445600000-a8Zk2QpX`, IRNs like
/// `INV-20240615-K3J9QZ`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn business_id(&self) -> String {
        format!("{}-{}", Utc::now().timestamp_millis(), random_suffix(8))
    }

    fn irn(&self, date: NaiveDate) -> String {
        format!(
            "INV-{}-{}",
            date.format("%Y%m%d"),
            random_suffix(6).to_ascii_uppercase()
        )
    }
}

fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Deterministic identifiers: `{prefix}-BID-0001`, `{prefix}-IRN-0001`, ...
///
/// Each kind has its own counter.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    zero_pad: usize,
    next_business: AtomicU64,
    next_irn: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            zero_pad: 4,
            next_business: AtomicU64::new(1),
            next_irn: AtomicU64::new(1),
        }
    }

    /// Set zero-padding width (default: 4, so "0001").
    pub fn with_padding(mut self, width: usize) -> Self {
        self.zero_pad = width;
        self
    }

    fn format(&self, kind: &str, num: u64) -> String {
        format!(
            "{}-{kind}-{:0>width$}",
            self.prefix,
            num,
            width = self.zero_pad
        )
    }
}

impl IdGenerator for SequentialIds {
    fn business_id(&self) -> String {
        let num = self.next_business.fetch_add(1, Ordering::Relaxed);
        self.format("BID", num)
    }

    fn irn(&self, _date: NaiveDate) -> String {
        let num = self.next_irn.fetch_add(1, Ordering::Relaxed);
        self.format("IRN", num)
    }
}

/// Always returns the same pair of identifiers.
#[derive(Debug, Clone)]
pub struct FixedIds {
    pub business_id: String,
    pub irn: String,
}

impl FixedIds {
    pub fn new(business_id: impl Into<String>, irn: impl Into<String>) -> Self {
        Self {
            business_id: business_id.into(),
            irn: irn.into(),
        }
    }
}

impl IdGenerator for FixedIds {
    fn business_id(&self) -> String {
        self.business_id.clone()
    }

    fn irn(&self, _date: NaiveDate) -> String {
        self.irn.clone()
    }
}
