//! Keyed object pooling
//!
//! A generic reusable-object cache with strict single-ownership: every
//! handle is either `InPool` (owned by the pool) or `Active` (owned by
//! exactly one lane), tagged explicitly on its slot record so double
//! check-in is a no-op rather than a duplicate enqueue.
//!
//! - **Handle**: identity of one instantiated world object
//! - **ObjectPool**: keyed cache enforcing the per-key capacity bound
//! - **Instantiator**: injected factory capability for object creation

mod handle;
mod object_pool;

pub use handle::{HandleId, HandleState, InstanceId, PoolKey};
pub use object_pool::{Instantiator, ObjectPool, PoolConfig, PoolStats};
