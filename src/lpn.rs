//! License plate numbers.
//!
//! An LPN is a date-prefixed correlative: `YYMMDD` followed by an 8-digit,
//! zero-padded sequence number (e.g. `25112600000026`). Outside of issuance
//! the value is treated as an opaque key.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Width of the zero-padded correlative suffix.
pub const CORRELATIVE_WIDTH: usize = 8;

/// Default last-issued correlative for a fresh warehouse.
pub const DEFAULT_INITIAL_SEQUENCE: u64 = 150;

/// License plate number identifying one received unit or pallet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lpn(String);

impl Lpn {
    /// Wraps a scanned value, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    /// Builds the LPN for `date` and `correlative`.
    pub fn generate(date: NaiveDate, correlative: u64) -> Self {
        Self(format!(
            "{:02}{:02}{:02}{:0width$}",
            date.year().rem_euclid(100),
            date.month(),
            date.day(),
            correlative,
            width = CORRELATIVE_WIDTH
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Date prefix, when the value follows the issued format.
    pub fn issue_date(&self) -> Option<NaiveDate> {
        if self.0.len() != 6 + CORRELATIVE_WIDTH || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: i32 = self.0[0..2].parse().ok()?;
        let month: u32 = self.0[2..4].parse().ok()?;
        let day: u32 = self.0[4..6].parse().ok()?;
        NaiveDate::from_ymd_opt(2000 + year, month, day)
    }
}

impl fmt::Display for Lpn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Lpn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Lpn {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Lpn {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for Lpn {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Lpn {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Persisted correlative counter. Holds the last issued value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LpnSequence {
    last: u64,
}

impl LpnSequence {
    pub fn starting_at(last: u64) -> Self {
        Self { last }
    }

    pub fn last(&self) -> u64 {
        self.last
    }

    /// Value the next call to [`LpnSequence::issue`] will use.
    pub fn peek(&self) -> u64 {
        self.last + 1
    }

    /// Advances the counter and returns the LPN for `date`.
    pub fn issue(&mut self, date: NaiveDate) -> Lpn {
        self.last += 1;
        let lpn = Lpn::generate(date, self.last);
        debug!(lpn = %lpn, correlative = self.last, "Issued LPN");
        lpn
    }
}

impl Default for LpnSequence {
    fn default() -> Self {
        Self::starting_at(DEFAULT_INITIAL_SEQUENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_pads_correlative() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 26).unwrap();
        assert_eq!(Lpn::generate(date, 26).as_str(), "25112600000026");
    }

    #[test]
    fn sequence_issues_consecutive_numbers() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let mut seq = LpnSequence::starting_at(25);
        assert_eq!(seq.peek(), 26);
        assert_eq!(seq.issue(date).as_str(), "24010500000026");
        assert_eq!(seq.issue(date).as_str(), "24010500000027");
        assert_eq!(seq.last(), 27);
    }

    #[test]
    fn new_trims_scanner_noise() {
        assert_eq!(Lpn::new("  25112600000026\n"), "25112600000026");
    }

    #[test]
    fn issue_date_reads_prefix() {
        let lpn = Lpn::new("25112600000026");
        assert_eq!(lpn.issue_date(), NaiveDate::from_ymd_opt(2025, 11, 26));
        assert_eq!(Lpn::new("TEST-1").issue_date(), None);
    }
}
