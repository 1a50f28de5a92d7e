//! Canonical encoding and digests for audited field sets.
//!
//! Values are first converted to a `serde_json::Value`, whose object maps
//! are ordered by key, and then written compactly. The same field set
//! always yields the same bytes and therefore the same SHA-256 digest.

use crate::errors::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Canonical compact JSON with sorted object keys
///
/// # Errors
///
/// `Serialization` if the value cannot be represented as JSON.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&value)?)
}

/// Hex-encoded SHA-256 of the canonical JSON of `fields`
///
/// # Errors
///
/// `Serialization` if the value cannot be represented as JSON.
pub fn fields_digest<T: Serialize>(fields: &T) -> Result<String> {
    let canonical = canonical_json(fields)?;
    Ok(hash_string(&canonical))
}

fn hash_string(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())
}
