//! Windowed environment streaming
//!
//! Maintains the illusion of infinite forward travel by continuously
//! recycling a bounded set of world segments as they fall behind the
//! moving reference frame.
//!
//! # Architecture Overview
//!
//! - **Config**: plain structs, code-built or TOML-loaded
//! - **Lane**: the streaming contract plus the three concrete lanes
//!   (track / buildings / road), each owning its own window(s)
//! - **Coordinator**: one shared clock, one shared pool, fixed per-tick
//!   lane order with per-lane failure isolation

pub mod building;
pub mod config;
pub mod coordinator;
pub mod lane;
pub mod road;
pub mod track;

// Re-export configuration surface
pub use config::{BuildingConfig, EnvironmentConfig, RoadConfig, TrackConfig};

// Re-export the lane contract and concrete lanes
pub use building::BuildingLane;
pub use lane::{LaneContext, LaneType, Placement, PlacementSink, StreamLane};
pub use road::RoadLane;
pub use track::TrackLane;

// Re-export the coordinator
pub use coordinator::{EnvironmentCoordinator, EnvironmentStats};
