use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use validator::Validate;

/// Temperature category of a storage chamber.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ZoneCategory {
    Dry,
    Cold,
    Frozen,
}

impl ZoneCategory {
    /// Two-letter prefix used in scannable location codes.
    pub const fn zone_code(self) -> &'static str {
        match self {
            ZoneCategory::Dry => "SE",
            ZoneCategory::Cold => "RF",
            ZoneCategory::Frozen => "CG",
        }
    }

    /// Inverse of [`ZoneCategory::zone_code`]. Expects an uppercase code.
    pub fn from_zone_code(code: &str) -> Option<Self> {
        match code {
            "SE" => Some(ZoneCategory::Dry),
            "RF" => Some(ZoneCategory::Cold),
            "CG" => Some(ZoneCategory::Frozen),
            _ => None,
        }
    }
}

/// A storage chamber. Racks belong to exactly one zone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct Zone {
    pub id: String,

    #[validate(length(min = 1, max = 100))]
    pub name: String,

    pub category: ZoneCategory,

    /// Free-form label such as "2-8 °C".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
}

impl Zone {
    pub fn zone_code(&self) -> &'static str {
        self.category.zone_code()
    }
}
