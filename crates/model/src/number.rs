//! Session invoice number.
//!
//! `F-YYYYMMDD-NNNN`: the date the session started plus the last four
//! digits of the millisecond epoch timestamp. Locally distinguishing, not
//! globally unique; sub-second collisions within the same day are accepted.

use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};

/// Display identifier for the editing session.
///
/// Generated once when the session starts and immutable thereafter. It is
/// not part of the persisted draft state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Derive a number from the given wall-clock instant.
    ///
    /// The clock is passed in so tests stay deterministic.
    pub fn generate(now: DateTime<Local>) -> Self {
        let suffix = now.timestamp_millis().rem_euclid(10_000);
        Self(format!(
            "F-{}{:02}{:02}-{:04}",
            now.year(),
            now.month(),
            now.day(),
            suffix
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
