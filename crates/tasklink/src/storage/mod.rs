//! Settings storage traits and implementations
//!
//! This module defines the key-value store that holds the session token,
//! saved filters, compose state and the email link side table. The
//! trait-based design allows swapping between in-memory and persistent
//! storage implementations.

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemorySettingsStore;
pub use sqlite::SqliteSettingsStore;
pub use traits::SettingsStore;
