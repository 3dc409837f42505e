pub mod expiration;
pub mod putaway;
pub mod receiving;
pub mod scan_session;
