//! Demo data for a fresh warehouse: two chambers, four racks, the sample
//! catalog and a few pallets (two shelved, one pending).

use chrono::{NaiveDate, TimeZone, Utc};

use crate::lpn::{Lpn, LpnSequence, DEFAULT_INITIAL_SEQUENCE};
use crate::models::inventory_item::{InventoryItem, PalletContents};
use crate::models::product::Product;
use crate::models::rack::{Rack, RackLocation};
use crate::models::zone::{Zone, ZoneCategory};
use crate::repositories::inventory::InventoryStore;
use crate::repositories::topology::TopologyStore;
use crate::warehouse::Warehouse;

pub fn zones() -> Vec<Zone> {
    vec![
        Zone {
            id: "zone-1".into(),
            name: "Cámara Seca A".into(),
            category: ZoneCategory::Dry,
            temperature: None,
        },
        Zone {
            id: "zone-2".into(),
            name: "Cámara Refrigerada".into(),
            category: ZoneCategory::Cold,
            temperature: None,
        },
    ]
}

pub fn racks() -> Vec<Rack> {
    vec![
        Rack::new(1, "zone-1", "A", 6, 9),
        Rack::new(2, "zone-1", "A", 6, 9),
        Rack::new(3, "zone-1", "B", 6, 9),
        Rack::new(4, "zone-2", "C", 5, 8),
    ]
}

pub fn catalog() -> Vec<Product> {
    let entries: [(&str, &str, &str, &str, ZoneCategory); 10] = [
        ("1", "7751234567890", "Arroz Extra Costeño 5kg", "Granos", ZoneCategory::Dry),
        ("2", "7759876543210", "Leche Gloria Azul 400g", "Lácteos", ZoneCategory::Dry),
        ("3", "7755555555555", "Filete Atún Florida", "Conservas", ZoneCategory::Dry),
        ("4", "7751111111111", "Aceite Primor Premium 1L", "Aceites", ZoneCategory::Dry),
        ("5", "7752222222222", "Fideos Don Vittorio Spaghetti", "Pastas", ZoneCategory::Dry),
        ("6", "7753333333333", "Galleta Soda San Jorge Pqt", "Snacks", ZoneCategory::Dry),
        ("7", "7756666666666", "Yogurt Fresa 1L", "Lácteos", ZoneCategory::Cold),
        ("8", "7757777777777", "Mantequilla Laive 200g", "Lácteos", ZoneCategory::Cold),
        ("9", "7758888888888", "Hamburguesa San Fernando", "Congelados", ZoneCategory::Frozen),
        ("10", "7759999999999", "Helado D'Onofrio Tricolor", "Congelados", ZoneCategory::Frozen),
    ];
    entries
        .into_iter()
        .map(|(id, code, name, category, zone)| Product {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            category: category.into(),
            default_zone: Some(zone),
        })
        .collect()
}

fn pallet(
    lpn: &str,
    code: &str,
    name: &str,
    quantity: u32,
    expiration: (i32, u32, u32),
    location: Option<RackLocation>,
) -> Option<InventoryItem> {
    Some(InventoryItem {
        lpn: Lpn::new(lpn),
        contents: PalletContents::Single {
            product_code: code.into(),
            product_name: name.into(),
            quantity,
        },
        expiration_date: NaiveDate::from_ymd_opt(expiration.0, expiration.1, expiration.2)?,
        reception_date: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).single()?,
        received_by: "Operador 01".into(),
        photos: Vec::new(),
        location,
    })
}

pub fn inventory() -> Vec<InventoryItem> {
    let at = |level, position| {
        Some(RackLocation {
            aisle: "A".into(),
            rack_id: 1,
            level,
            position,
        })
    };
    [
        pallet("24112600000001", "7751234567890", "Arroz Extra Costeño 5kg", 50, (2025, 12, 1), at(1, 1)),
        pallet("24112600000002", "7751234567890", "Arroz Extra Costeño 5kg", 50, (2025, 12, 1), at(1, 2)),
        pallet("25112600000026", "TEST-001", "Producto de Prueba", 100, (2025, 12, 31), None),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Topology with racks but no stock.
pub fn demo_topology() -> TopologyStore {
    TopologyStore::from_parts(zones(), racks())
}

/// Full demo state.
pub fn demo_warehouse() -> Warehouse {
    let inventory =
        InventoryStore::from_items(inventory()).expect("demo pallets occupy distinct slots");
    Warehouse::new(
        demo_topology(),
        inventory,
        LpnSequence::starting_at(DEFAULT_INITIAL_SEQUENCE),
    )
}
