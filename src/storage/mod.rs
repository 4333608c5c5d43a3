pub mod connection;
pub mod keys;
pub mod local_store;
pub mod memory;
pub mod setup;
pub mod sqlite;

pub use connection::{DbConn, DbPool, create_pool, get_connection};
pub use keys::StorageKey;
pub use local_store::{LocalStore, discard, read_json, write_json};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
