//! # Record Kinds
//!
//! The contract a record kind implements to live in a [`RecordStore`].
//!
//! A kind supplies three shapes:
//! - the canonical record, which carries the immutable `id`
//! - a draft, the caller-supplied fields of a new record (no id)
//! - a patch, the optional fields of a partial update (no id)
//!
//! Because neither drafts nor patches can carry an id, the store alone
//! assigns ids and an update can never rewrite one.
//!
//! [`RecordStore`]: super::RecordStore

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::{StoreError, StoreResult};

/// Record identifier: positive, unique within its store, never reused
pub type RecordId = u64;

/// A persisted entity kind
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Fields of a record about to be created
    type Draft;

    /// Fields of a partial update; absent fields are left untouched
    type Patch;

    /// Kind name used in logs (e.g. "products")
    const KIND: &'static str;

    /// The record's id
    fn id(&self) -> RecordId;

    /// Build a record from a draft and the id the store allocated for it
    fn from_draft(id: RecordId, draft: Self::Draft) -> Self;

    /// Shallow-merge a patch over this record
    fn apply(&mut self, patch: Self::Patch);
}

/// The id after `id`, or [`StoreError::IdExhausted`] at the top of the range
pub(crate) fn next_id<R: Record>(id: RecordId) -> StoreResult<RecordId> {
    id.checked_add(1)
        .ok_or(StoreError::IdExhausted { kind: R::KIND })
}
