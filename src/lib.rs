//! Metro Engine: endless-environment streaming core
//!
//! Object pooling and windowed procedural streaming for endless-runner
//! worlds: a keyed cache of reusable handles plus a family of environment
//! lanes (track / buildings / road) that recycle a bounded set of world
//! segments as they fall behind the moving reference frame.
//!
//! The engine is an embedded library. The host loop calls
//! [`EnvironmentCoordinator::tick`] once per frame with its delta time,
//! feeds speed changes in through
//! [`EnvironmentCoordinator::set_speed`], and pulls transform updates out
//! through [`EnvironmentCoordinator::publish`] into its own
//! [`PlacementSink`]. Object instantiation is injected as an
//! [`Instantiator`] capability; the engine never calls engine/runtime
//! APIs directly.

// Core subsystems
pub mod environment;
pub mod error;
pub mod pool;

// Export error types
pub use error::{EngineError, EngineResult};

// Export the pooling surface
pub use pool::{
    HandleId, HandleState, InstanceId, Instantiator, ObjectPool, PoolConfig, PoolKey, PoolStats,
};

// Export the streaming surface
pub use environment::{
    BuildingConfig, BuildingLane, EnvironmentConfig, EnvironmentCoordinator, EnvironmentStats,
    LaneContext, LaneType, Placement, PlacementSink, RoadConfig, RoadLane, StreamLane, TrackConfig,
    TrackLane,
};
