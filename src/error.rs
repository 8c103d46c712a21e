//! Error handling for Metro Engine
//!
//! One unified error type for the pool and streaming subsystems. Pool
//! conditions (`UnknownPoolKey`, `PoolExhausted`, `NotPoolable`) are
//! recoverable at the call site and never abort the tick loop; lane and
//! config errors surface during construction or initialization.

use crate::pool::{HandleId, PoolKey};

/// Main error type for Metro Engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    // Pool errors
    #[error("no pool registered for key '{key}'")]
    UnknownPoolKey { key: PoolKey },

    #[error("pool '{key}' is exhausted (at max size)")]
    PoolExhausted { key: PoolKey },

    #[error("handle {handle:?} has no pool provenance")]
    NotPoolable { handle: HandleId },

    #[error("pool '{key}' is already registered")]
    DuplicatePool { key: PoolKey },

    // Lane errors
    #[error("pool '{key}' has no instantiable prefab variants")]
    EmptyPrefabSet { key: PoolKey },

    // Configuration errors
    #[error("invalid config: {field} ({reason})")]
    InvalidConfig { field: String, reason: String },

    #[error("IO error for {path}: {error}")]
    Io { path: String, error: String },

    #[error("config parse error: {error}")]
    ConfigParse { error: String },
}

/// Type alias for Results in Metro Engine
pub type EngineResult<T> = Result<T, EngineError>;

impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        EngineError::Io {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(error: toml::de::Error) -> Self {
        EngineError::ConfigParse {
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::UnknownPoolKey {
            key: PoolKey::new("lamp"),
        };
        assert_eq!(err.to_string(), "no pool registered for key 'lamp'");

        let err = EngineError::PoolExhausted {
            key: PoolKey::new("track"),
        };
        assert_eq!(err.to_string(), "pool 'track' is exhausted (at max size)");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EngineError = io.into();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}
