// ── MacAddress ──────────────────────────────────────────────────────

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A MAC address string that is not six 2-hex-digit groups separated by
/// `:` or `-`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid MAC address: {input:?}")]
pub struct InvalidMac {
    pub input: String,
}

/// Validated MAC address, stored in canonical form (`aa:bb:cc:dd:ee:ff`).
///
/// Parsing accepts either separator and any case; the separators may be
/// mixed. Equality and hashing use the canonical form, so two spellings
/// of the same address compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress(String);

impl MacAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercase colon form, as used in router tables.
    pub fn to_uppercase(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl FromStr for MacAddress {
    type Err = InvalidMac;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let valid = bytes.len() == 17
            && bytes.iter().enumerate().all(|(i, b)| {
                if i % 3 == 2 {
                    matches!(b, b':' | b'-')
                } else {
                    b.is_ascii_hexdigit()
                }
            });
        if !valid {
            return Err(InvalidMac {
                input: s.to_owned(),
            });
        }
        Ok(Self(s.to_ascii_lowercase().replace('-', ":")))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
