//! Random identifiers for message and request IDs.
//!
//! [`ProtocolId`] holds 16 bytes drawn from the operating system RNG and
//! renders them in the familiar UUID grouping (`8-4-4-4-12`, lowercase
//! hex). No version or variant bits are forced, so the value is not a
//! conformant UUID; clients only rely on the textual shape.

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Serialize, Serializer};

/// Identifier attached to a published message or to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtocolId(uuid::Uuid);

impl ProtocolId {
    /// Generates a fresh identifier from 16 cryptographically random bytes.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        Self(uuid::Uuid::from_bytes(bytes))
    }

    /// Returns the raw 16 bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl Serialize for ProtocolId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
