use serde::{Deserialize, Serialize};

use crate::models::zone::ZoneCategory;

/// Catalog entry used when receiving stock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// SKU or EAN.
    pub code: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_zone: Option<ZoneCategory>,
}

/// Looks up a product by exact code.
pub fn find_by_code<'a>(catalog: &'a [Product], code: &str) -> Option<&'a Product> {
    let code = code.trim();
    catalog.iter().find(|p| p.code == code)
}
