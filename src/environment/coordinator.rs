//! Environment coordinator
//!
//! Owns the shared pool, the rng, the travel speed, and the three
//! streaming lanes, and drives them once per tick in a fixed order:
//! track first (so dependent lanes read a fresh leading edge), then
//! buildings, then road, each as `advance` followed by `recycle`.
//!
//! A lane whose initialization fails is disabled and reported once; the
//! remaining lanes keep streaming.

use rand::rngs::StdRng;

use crate::environment::building::BuildingLane;
use crate::environment::config::EnvironmentConfig;
use crate::environment::lane::{LaneContext, LaneType, PlacementSink, StreamLane};
use crate::environment::road::RoadLane;
use crate::environment::track::TrackLane;
use crate::error::EngineResult;
use crate::pool::{Instantiator, ObjectPool, PoolKey, PoolStats};

/// Per-lane and clock statistics snapshot
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvironmentStats {
    pub ticks: u64,
    pub track_active: usize,
    pub building_active: usize,
    pub road_active: usize,
}

pub struct EnvironmentCoordinator {
    center_x: f32,
    speed: f32,
    warm_up_count: usize,
    pool: ObjectPool,
    rng: StdRng,
    track: TrackLane,
    buildings: BuildingLane,
    road: RoadLane,
    /// Lanes whose initialization failed; skipped every tick.
    disabled: Vec<LaneType>,
    initialized: bool,
    ticks: u64,
}

impl EnvironmentCoordinator {
    /// Build a coordinator from a validated config and the host's
    /// instantiation service. Pools are registered here; lanes populate
    /// on [`initialize`](Self::initialize).
    pub fn new(config: EnvironmentConfig, factory: Box<dyn Instantiator>) -> EngineResult<Self> {
        use rand::SeedableRng;

        config.validate()?;

        let mut pool = match config.seed {
            Some(seed) => ObjectPool::with_seed(factory, seed),
            None => ObjectPool::new(factory),
        };
        for pool_config in &config.pools {
            pool.register(pool_config.clone())?;
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            center_x: config.center_x,
            speed: config.movement_speed,
            warm_up_count: config.warm_up_count,
            pool,
            rng,
            track: TrackLane::new(config.track),
            buildings: BuildingLane::new(config.buildings),
            road: RoadLane::new(config.road),
            disabled: Vec::new(),
            initialized: false,
            ticks: 0,
        })
    }

    /// Warm the pools and populate every lane to its starting steady
    /// state. A failed lane is disabled and reported; the rest proceed.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.pool.warm_up_all(self.warm_up_count);

        let Self {
            pool,
            rng,
            track,
            buildings,
            road,
            disabled,
            center_x,
            ..
        } = self;
        let mut ctx = LaneContext {
            pool,
            rng,
            motion: 0.0,
            track_end_z: 0.0,
            center_x: *center_x,
        };
        let lanes: [&mut dyn StreamLane; 3] = [track, buildings, road];
        for lane in lanes {
            if let Err(err) = lane.initialize(&mut ctx) {
                log::error!("{} lane disabled: {}", lane.lane_type(), err);
                disabled.push(lane.lane_type());
            }
        }
        self.initialized = true;
    }

    /// Advance the world by one frame. Speed changes made since the last
    /// tick take effect here; negative motion is clamped to zero.
    pub fn tick(&mut self, delta_time: f32) {
        if !self.initialized {
            self.initialize();
        }
        let motion = (self.speed * delta_time).max(0.0);

        let Self {
            pool,
            rng,
            track,
            buildings,
            road,
            disabled,
            center_x,
            ..
        } = self;
        let mut ctx = LaneContext {
            pool,
            rng,
            motion,
            track_end_z: track.end_z(),
            center_x: *center_x,
        };

        if !disabled.contains(&LaneType::Track) {
            track.advance(&mut ctx);
            track.recycle(&mut ctx);
        }
        // Buildings key their coverage off the track's post-recycle edge.
        ctx.track_end_z = track.end_z();
        if !disabled.contains(&LaneType::Building) {
            buildings.advance(&mut ctx);
            buildings.recycle(&mut ctx);
        }
        if !disabled.contains(&LaneType::Road) {
            road.advance(&mut ctx);
            road.recycle(&mut ctx);
        }

        self.ticks += 1;
    }

    /// Push every active element's transform to the placement sink.
    pub fn publish(&self, sink: &mut dyn PlacementSink) {
        let lanes: [&dyn StreamLane; 3] = [&self.track, &self.buildings, &self.road];
        for lane in lanes {
            if self.disabled.contains(&lane.lane_type()) {
                continue;
            }
            lane.visit_placements(&mut |placement| sink.apply(placement));
        }
    }

    /// External speed source; takes effect on the next tick.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn center_x(&self) -> f32 {
        self.center_x
    }

    /// Leading edge of the track lane.
    pub fn track_end_z(&self) -> f32 {
        self.track.end_z()
    }

    pub fn is_lane_enabled(&self, lane: LaneType) -> bool {
        !self.disabled.contains(&lane)
    }

    pub fn stats(&self) -> EnvironmentStats {
        EnvironmentStats {
            ticks: self.ticks,
            track_active: self.track.active_count(),
            building_active: self.buildings.active_count(),
            road_active: self.road.active_count(),
        }
    }

    pub fn pool_stats(&self, key: &PoolKey) -> Option<PoolStats> {
        self.pool.stats(key)
    }

    pub fn pool(&self) -> &ObjectPool {
        &self.pool
    }
}
