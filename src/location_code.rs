//! Scannable location codes.
//!
//! A code packs zone, aisle, position and level into a single token,
//! `ZZ-A-P-L` (e.g. `SE-A-1-5`: dry zone, aisle A, position 1, level 5).
//! Labels printed for empty slots and codes accepted at putaway go through
//! the same type, so the two always agree.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AssignmentError;
use crate::models::zone::ZoneCategory;

static LOCATION_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{2})-([A-Z0-9]+)-(\d+)-(\d+)$").unwrap());

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationCode {
    zone_code: String,
    aisle: String,
    position: u32,
    level: u32,
}

impl LocationCode {
    /// Parses operator input. Surrounding whitespace and letter case are ignored.
    ///
    /// The zone code is only checked for shape here; mapping it to a
    /// configured zone is the resolver's job.
    pub fn parse(raw: &str) -> Result<Self, AssignmentError> {
        let normalized = raw.trim().to_uppercase();
        let malformed = || AssignmentError::MalformedLocationCode {
            code: raw.trim().to_string(),
        };

        let caps = LOCATION_CODE_RE.captures(&normalized).ok_or_else(malformed)?;
        let position: u32 = caps[3].parse().map_err(|_| malformed())?;
        let level: u32 = caps[4].parse().map_err(|_| malformed())?;
        if position == 0 || level == 0 {
            return Err(malformed());
        }

        Ok(Self {
            zone_code: caps[1].to_string(),
            aisle: caps[2].to_string(),
            position,
            level,
        })
    }

    /// Canonical code for a slot in a zone of `category`.
    pub fn for_slot(category: ZoneCategory, aisle: &str, level: u32, position: u32) -> Self {
        Self {
            zone_code: category.zone_code().to_string(),
            aisle: aisle.trim().to_ascii_uppercase(),
            position,
            level,
        }
    }

    pub fn zone_code(&self) -> &str {
        &self.zone_code
    }

    /// `None` when the zone code maps to no category.
    pub fn category(&self) -> Option<ZoneCategory> {
        ZoneCategory::from_zone_code(&self.zone_code)
    }

    pub fn aisle(&self) -> &str {
        &self.aisle
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.zone_code, self.aisle, self.position, self.level
        )
    }
}

impl FromStr for LocationCode {
    type Err = AssignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LocationCode {
    type Error = AssignmentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LocationCode> for String {
    fn from(code: LocationCode) -> Self {
        code.to_string()
    }
}
