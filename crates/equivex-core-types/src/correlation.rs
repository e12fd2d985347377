//! Invocation identity for log correlation.
//!
//! Each top-level comparison draws one [`InvocationId`]; its start, end and
//! error events all carry it, which keeps interleaved comparisons from
//! different test threads apart in a shared log.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one top-level comparison. Time-ordered (UUIDv7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(Uuid);

impl InvocationId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for InvocationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_invocation_is_distinct() {
        assert_ne!(InvocationId::new(), InvocationId::new());
    }

    #[test]
    fn test_ids_are_version_7() {
        assert_eq!(InvocationId::new().as_uuid().get_version_num(), 7);
    }

    #[test]
    fn test_serializes_as_bare_uuid_string() {
        let id = InvocationId::from(Uuid::nil());
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"00000000-0000-0000-0000-000000000000\""
        );
        let back: InvocationId =
            serde_json::from_str(&serde_json::to_string(&id).unwrap()).unwrap();
        assert_eq!(back, id);
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000000");
    }
}
