//! Environment configuration
//!
//! Plain config structs consumed by the coordinator and lanes, buildable
//! in code or parsed from TOML. Defaults carry the tuning the system
//! ships with; `validate` rejects configs the streaming invariants cannot
//! hold under (zero-length segments, inverted ranges, lanes pointing at
//! unregistered pools).

use serde::Deserialize;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::pool::{PoolConfig, PoolKey};

/// Track lane configuration
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub pool_key: PoolKey,
    pub initial_segment_count: usize,
    pub segment_length: f32,
    /// Axis position below which the head segment is retired.
    pub recycle_offset: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            pool_key: PoolKey::new("track"),
            initial_segment_count: 15,
            segment_length: 10.0,
            recycle_offset: -10.0,
        }
    }
}

/// Building lane configuration
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BuildingConfig {
    pub pool_key: PoolKey,
    /// How far ahead of the track leading edge rows are kept spawned.
    pub spawn_distance: f32,
    /// Axis position below which a row element is retired.
    pub recycle_distance: f32,
    /// Lateral offset range, mirrored across the axis per side.
    pub lateral_range: [f32; 2],
    /// Random gap between consecutive rows, drawn per row from `[min, max)`.
    pub spacing_range: [f32; 2],
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            pool_key: PoolKey::new("building"),
            spawn_distance: 100.0,
            recycle_distance: -50.0,
            lateral_range: [10.0, 20.0],
            spacing_range: [8.0, 15.0],
        }
    }
}

/// Road lane configuration
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RoadConfig {
    pub pool_key: PoolKey,
    pub segment_length: f32,
    /// Lateral distance of each road from the track centerline.
    pub offset_from_track: f32,
    pub initial_segment_count: usize,
    pub recycle_offset: f32,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            pool_key: PoolKey::new("road"),
            segment_length: 10.0,
            offset_from_track: 10.0,
            initial_segment_count: 15,
            recycle_offset: -10.0,
        }
    }
}

/// Top-level environment configuration
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Lateral center of the travel axis.
    pub center_x: f32,
    /// Travel speed in units per second; mutable at runtime through the
    /// coordinator.
    pub movement_speed: f32,
    /// Free handles to stock per pool before the first tick.
    pub warm_up_count: usize,
    /// Pinned rng seed for reproducible runs; entropy-seeded when absent.
    pub seed: Option<u64>,
    pub pools: Vec<PoolConfig>,
    pub track: TrackConfig,
    pub buildings: BuildingConfig,
    pub road: RoadConfig,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            center_x: 1.5,
            movement_speed: 5.0,
            warm_up_count: 50,
            seed: None,
            pools: Vec::new(),
            track: TrackConfig::default(),
            buildings: BuildingConfig::default(),
            road: RoadConfig::default(),
        }
    }
}

impl EnvironmentConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load_from_path(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| EngineError::Io {
            path: path.display().to_string(),
            error: err.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !self.movement_speed.is_finite() || self.movement_speed < 0.0 {
            return Err(invalid("movement_speed", "must be a non-negative number"));
        }
        if self.track.segment_length <= 0.0 {
            return Err(invalid("track.segment_length", "must be positive"));
        }
        if self.track.initial_segment_count == 0 {
            return Err(invalid("track.initial_segment_count", "must be at least 1"));
        }
        if self.road.segment_length <= 0.0 {
            return Err(invalid("road.segment_length", "must be positive"));
        }
        if self.road.initial_segment_count == 0 {
            return Err(invalid("road.initial_segment_count", "must be at least 1"));
        }
        if self.road.offset_from_track <= 0.0 {
            return Err(invalid("road.offset_from_track", "must be positive"));
        }
        if self.buildings.spawn_distance <= 0.0 {
            return Err(invalid("buildings.spawn_distance", "must be positive"));
        }
        let [gap_min, gap_max] = self.buildings.spacing_range;
        if gap_min <= 0.0 || gap_min >= gap_max {
            return Err(invalid(
                "buildings.spacing_range",
                "must satisfy 0 < min < max",
            ));
        }
        let [lat_min, lat_max] = self.buildings.lateral_range;
        if lat_min < 0.0 || lat_min >= lat_max {
            return Err(invalid(
                "buildings.lateral_range",
                "must satisfy 0 <= min < max",
            ));
        }

        let mut seen = Vec::new();
        for pool in &self.pools {
            if pool.max_size == 0 {
                return Err(invalid("pools.max_size", "must be at least 1"));
            }
            if pool.initial_size > pool.max_size {
                return Err(invalid("pools.initial_size", "exceeds max_size"));
            }
            if seen.contains(&&pool.pool_key) {
                return Err(invalid("pools.pool_key", "duplicate key"));
            }
            seen.push(&pool.pool_key);
        }
        for (field, key) in [
            ("track.pool_key", &self.track.pool_key),
            ("buildings.pool_key", &self.buildings.pool_key),
            ("road.pool_key", &self.road.pool_key),
        ] {
            if !seen.contains(&key) {
                return Err(EngineError::InvalidConfig {
                    field: field.to_string(),
                    reason: format!("no pool configured for key '{}'", key),
                });
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> EngineError {
    EngineError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
