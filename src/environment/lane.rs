//! Streaming lane contract
//!
//! Each lane owns one or more ordered windows of active handles positioned
//! along the travel axis. The coordinator drives every lane once per tick
//! in a fixed order: `advance` (pure translation) then `recycle` (trailing
//! edge retirement + leading edge respawn).

use cgmath::{One, Quaternion, Vector3};
use rand::rngs::StdRng;
use std::fmt;

use crate::error::EngineResult;
use crate::pool::{HandleId, InstanceId, ObjectPool, PoolKey};

/// Lane identifier tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneType {
    Track,
    Building,
    Road,
}

impl LaneType {
    pub fn name(self) -> &'static str {
        match self {
            LaneType::Track => "track",
            LaneType::Building => "building",
            LaneType::Road => "road",
        }
    }
}

impl fmt::Display for LaneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-tick context handed to each lane: the shared pool and rng plus the
/// cross-lane state a lane is allowed to read. Injected by the
/// coordinator; lanes hold no global references.
pub struct LaneContext<'a> {
    pub pool: &'a mut ObjectPool,
    pub rng: &'a mut StdRng,
    /// Distance the world moved this tick (`speed * delta_time`).
    pub motion: f32,
    /// Leading edge of the track lane, refreshed before dependent lanes
    /// run so they never stream out ahead of the track.
    pub track_end_z: f32,
    /// Lateral center of the travel axis.
    pub center_x: f32,
}

/// One transform update for the placement/render sink.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub instance: InstanceId,
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: f32,
}

/// Consumer of per-tick transform updates. How (or whether) they are
/// displayed is outside the engine.
pub trait PlacementSink {
    fn apply(&mut self, placement: Placement);
}

impl<F: FnMut(Placement)> PlacementSink for F {
    fn apply(&mut self, placement: Placement) {
        self(placement)
    }
}

/// Lifecycle contract for one independently streamed axis of content.
pub trait StreamLane {
    fn lane_type(&self) -> LaneType;

    /// Populate the window(s) to the starting steady state, positioned at
    /// fixed intervals from the origin.
    fn initialize(&mut self, ctx: &mut LaneContext<'_>) -> EngineResult<()>;

    /// Translate every active element backward by `ctx.motion`. Pure state
    /// update; no spawn or recycle decisions happen here.
    fn advance(&mut self, ctx: &mut LaneContext<'_>);

    /// Retire elements past the trailing edge, check them back in, and
    /// respawn at the leading edge per lane semantics.
    fn recycle(&mut self, ctx: &mut LaneContext<'_>);

    fn active_count(&self) -> usize;

    /// Report every active element's transform for the placement sink.
    fn visit_placements(&self, visitor: &mut dyn FnMut(Placement));
}

/// An element currently owned by a lane: the pooled handle identity plus
/// the transform the lane mutates each tick.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ActiveElement {
    pub handle: HandleId,
    pub instance: InstanceId,
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: f32,
}

impl ActiveElement {
    pub fn placement(&self) -> Placement {
        Placement {
            instance: self.instance,
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }
}

/// Check a handle out of `key` and wrap it at `position`. Failures are
/// logged and surface as a skipped spawn (`None`); recycling keeps freeing
/// handles, so the spawn is retried naturally on a later tick.
pub(crate) fn spawn_element(
    ctx: &mut LaneContext<'_>,
    key: &PoolKey,
    position: Vector3<f32>,
) -> Option<ActiveElement> {
    let handle = match ctx.pool.checkout(key) {
        Ok(handle) => handle,
        Err(err) => {
            log::warn!("spawn skipped for pool '{}': {}", key, err);
            return None;
        }
    };
    let instance = ctx.pool.instance_of(handle)?;
    Some(ActiveElement {
        handle,
        instance,
        position,
        rotation: Quaternion::one(),
        scale: 1.0,
    })
}
