pub mod memory;
pub mod sqlite;

pub use memory::MemoryTickStore;
pub use sqlite::SqliteTickStore;
