//! Relational persistence for materials and chat messages.

mod sqlite;

pub use sqlite::SqliteStore;
