//! SmartRack WMS
//!
//! Scan-driven putaway for a small cold-chain warehouse: pallets are
//! received under a generated LPN, then shelved by scanning a printed rack
//! location code. The resolver validates each scan against the zone and
//! rack topology and the live inventory before an assignment is applied.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod commands;
pub mod config;
pub mod errors;
pub mod location_code;
pub mod lpn;
pub mod models;
pub mod persistence;
pub mod repositories;
pub mod seed;
pub mod services;
pub mod warehouse;

pub use commands::{AssignLocationCommand, Command, DispatchCommand, ReceivePalletCommand};
pub use errors::{AssignmentError, InventoryError, ServiceError, StorageError, TopologyError};
pub use location_code::LocationCode;
pub use lpn::{Lpn, LpnSequence};
pub use services::putaway::{resolve_assignment, PutawayResolver};
pub use warehouse::Warehouse;
