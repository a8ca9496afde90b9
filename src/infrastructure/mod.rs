pub mod crypto;
pub mod db;
pub mod geocoding;
pub mod memory;
pub mod sessions;
pub mod storage;
