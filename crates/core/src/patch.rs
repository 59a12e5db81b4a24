//! Helpers for partial-update (PATCH) request bodies.
//!
//! Nullable columns need three states in a patch: leave unchanged (field
//! absent), clear (explicit `null`) and set (a value). Such fields are typed
//! `Option<Option<T>>` and annotated with
//! `#[serde(default, deserialize_with = "gigledger_core::patch::double_option")]`.

use serde::{Deserialize, Deserializer};

/// Deserialize a present field into `Some(inner)`, so explicit `null`
/// becomes `Some(None)` while an absent field keeps the `None` default.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Merge a nullable patch field into the current value.
pub fn merge_nullable<T>(patch: Option<Option<T>>, current: Option<T>) -> Option<T> {
    match patch {
        Some(next) => next,
        None => current,
    }
}

/// Treat empty or whitespace-only strings as absent.
///
/// Forms submit `""` for untouched optional inputs.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
