//! # Seed Loader
//!
//! One-shot bootstrap of a store whose durable file is absent, blank or
//! unreadable. Seed documents are JSON arrays whose entries may be in a
//! legacy or partial shape; every entry is normalized into the kind's
//! canonical record before the first durable write.
//!
//! Durable files go through the same entry normalization on load, so a
//! file written in an older shape is read leniently instead of replaced.
//!
//! Id rules during a normalization pass:
//! - a positive integer `id` below `u64::MAX` is kept, unless an earlier
//!   entry already took it
//! - anything else gets `1 + max(id normalized so far)`

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::warn;

use super::errors::StoreResult;
use super::record::{next_id, Record, RecordId};

/// A record kind that can be built from a raw seed entry
pub trait Normalize: Record {
    /// Normalize one seed entry, using `id` as the record id.
    ///
    /// Returns `Ok(None)` when the entry lacks a field the kind cannot do
    /// without; such entries are skipped.
    fn normalize(id: RecordId, entry: &Map<String, Value>) -> StoreResult<Option<Self>>;
}

/// Read a document holding a JSON array.
///
/// `Ok(None)` for a missing or blank file; `Err` with the reason when the
/// file is unreadable, not JSON, or not an array.
pub fn read_json_array(path: &Path) -> Result<Option<Vec<Value>>, String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(format!("unreadable: {}", e)),
    };

    if content.trim().is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Array(entries)) => Ok(Some(entries)),
        Ok(_) => Err("not a JSON array".to_string()),
        Err(e) => Err(format!("malformed: {}", e)),
    }
}

/// Read a seed document.
///
/// A missing seed, an unparseable one, or one that is not a JSON array all
/// yield an empty collection.
pub fn read_seed(path: &Path) -> Vec<Value> {
    match read_json_array(path) {
        Ok(entries) => entries.unwrap_or_default(),
        Err(reason) => {
            warn!(path = %path.display(), %reason, "seed document unusable, using empty collection");
            Vec::new()
        }
    }
}

/// Normalize raw entries into canonical records
pub fn normalize_entries<R: Normalize>(entries: Vec<Value>) -> StoreResult<Vec<R>> {
    let mut records = Vec::with_capacity(entries.len());
    let mut taken: HashSet<RecordId> = HashSet::new();
    let mut max_id: RecordId = 0;

    for (index, entry) in entries.into_iter().enumerate() {
        let Value::Object(fields) = entry else {
            warn!(kind = R::KIND, index, "skipping entry that is not an object");
            continue;
        };

        let id = match seed_id(&fields) {
            Some(id) if !taken.contains(&id) => id,
            _ => next_id::<R>(max_id)?,
        };

        match R::normalize(id, &fields)? {
            Some(record) => {
                taken.insert(id);
                max_id = max_id.max(id);
                records.push(record);
            }
            None => warn!(kind = R::KIND, index, "skipping incomplete entry"),
        }
    }

    Ok(records)
}

/// An id is kept only when it is a positive integer with a successor
fn seed_id(fields: &Map<String, Value>) -> Option<RecordId> {
    fields
        .get("id")
        .and_then(Value::as_u64)
        .filter(|id| *id > 0 && *id < RecordId::MAX)
}

/// Read a string field, if present and a string
pub fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Coerce a loosely-typed flag to a strict boolean.
///
/// `null`, `false`, `0`, `""` and absent are false; any other value is true.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
