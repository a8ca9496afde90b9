pub mod memory_store;
pub mod redis_store;
