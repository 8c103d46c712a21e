use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier naming one homogeneous class of reusable handle ("track",
/// "building", "road", ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolKey(String);

impl PoolKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PoolKey {
    fn from(key: &str) -> Self {
        PoolKey::new(key)
    }
}

/// Identifier of the engine-side object produced by the instantiation
/// service. The streaming core never dereferences it; it only carries it
/// through to the placement sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct InstanceId(pub u64);

/// Identifier of one pooled handle inside the pool's slot registry.
///
/// This is what circulates through the lanes; the handle body (key,
/// instance, state tag) stays in the registry for the handle's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(pub(crate) u32);

impl HandleId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Ownership tag of a pooled handle.
///
/// A handle is in exactly one of the two states at any instant. The tag
/// lives on the handle's own slot record rather than in a side set, so a
/// repeated check-in observes `InPool` and no-ops instead of enqueueing the
/// handle twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Owned by the pool, inactive, position undefined.
    InPool,
    /// Owned by exactly one lane, positioned along the travel axis.
    Active,
}

/// Per-handle record kept by the pool for the handle's whole lifetime.
/// The pool key is immutable once created.
#[derive(Debug, Clone)]
pub(crate) struct HandleSlot {
    pub key: PoolKey,
    pub instance: InstanceId,
    pub state: HandleState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_key_display() {
        let key = PoolKey::new("track");
        assert_eq!(key.to_string(), "track");
        assert_eq!(key.as_str(), "track");
    }

    #[test]
    fn test_pool_key_from_str() {
        let key: PoolKey = "road".into();
        assert_eq!(key, PoolKey::new("road"));
    }
}
