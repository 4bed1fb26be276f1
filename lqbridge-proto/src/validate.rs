//! Mandatory-field checks for incoming wire maps.
//!
//! An absent key and a key present with [`WireValue::Null`] are treated
//! identically. Nothing here allocates or fails; callers decide which error
//! to raise.

use crate::wire::{WireMap, WireValue};

/// Returns `true` when `map` has `key` bound to a non-null value.
#[must_use]
pub fn has_non_null_key(map: &WireMap, key: &str) -> bool {
    map.get(key).is_some_and(|value| !value.is_null())
}

/// Returns `true` when every key in `keys` is present and non-null.
pub fn validate_mandatory_fields<'k, I>(map: &WireMap, keys: I) -> bool
where
    I: IntoIterator<Item = &'k str>,
{
    first_missing_field(map, keys).is_none()
}

/// Returns the first key in `keys` that is absent or null in `map`.
pub fn first_missing_field<'k, I>(map: &WireMap, keys: I) -> Option<&'k str>
where
    I: IntoIterator<Item = &'k str>,
{
    keys.into_iter().find(|key| !has_non_null_key(map, key))
}

/// Convenience for a whole wire value: non-map values have no keys.
#[must_use]
pub fn value_has_non_null_key(value: &WireValue, key: &str) -> bool {
    value.as_map().is_some_and(|map| has_non_null_key(map, key))
}
