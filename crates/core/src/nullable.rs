//! Serde helper distinguishing "field absent" from "field explicitly null".
//!
//! Use on an `Option<Option<T>>` field together with `#[serde(default)]`:
//!
//! ```
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Patch {
//!     #[serde(default, deserialize_with = "orientati_core::nullable::deserialize_present")]
//!     website: Option<Option<String>>,
//! }
//!
//! let absent: Patch = serde_json::from_str("{}").unwrap();
//! assert_eq!(absent.website, None);
//!
//! let cleared: Patch = serde_json::from_str(r#"{"website": null}"#).unwrap();
//! assert_eq!(cleared.website, Some(None));
//! ```

use serde::{Deserialize, Deserializer};

/// Wrap whatever was present in the payload (including `null`) in `Some`.
///
/// Serde only calls this when the key exists, so an absent key keeps the
/// `#[serde(default)]` value of `None`.
pub fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
