//! # Record Store Module
//!
//! Durable, file-backed storage shared by every record kind (products,
//! users): one generic store, seeded once from a fixture document and
//! rewritten wholesale on every mutation.

pub mod errors;
pub mod record;
pub mod seed;
mod store;

pub use errors::{StoreError, StoreResult};
pub use record::{Record, RecordId};
pub use seed::Normalize;
pub use store::RecordStore;
