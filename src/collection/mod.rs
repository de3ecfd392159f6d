//! Record types for the collections managed by support-desk.
//!
//! Each collection is one SurrealDB table. Records carry `created_at` /
//! `updated_at` timestamps and, where applicable, an `owner` reference fixed
//! at insert time (on-write ownership: later updates never change it).

pub mod broadcast;
pub mod comment;
pub mod contact;
pub mod file;
pub mod ticket;
pub mod topic;
pub mod user;

use surrealdb::sql::Thing;

/// Build a record pointer from a table name and a record key.
pub fn thing(table: &str, key: &str) -> Thing {
    Thing::from((table, key))
}

/// Extract the plain record key from a record pointer.
pub fn record_key(thing: &Thing) -> String {
    thing.id.to_raw()
}
