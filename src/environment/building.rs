//! Building lane
//!
//! Two independent unordered windows, one per side of the travel axis.
//! Rows spawn at randomly spaced positions until coverage reaches the
//! track's leading edge plus the configured ahead distance, so the
//! skyline never runs out in front of the track. This lane is coupled to
//! the track's progress, not to its own spawn history.

use cgmath::{Deg, Quaternion, Rotation3, Vector3};
use rand::Rng;

use crate::environment::config::BuildingConfig;
use crate::environment::lane::{
    spawn_element, ActiveElement, LaneContext, LaneType, Placement, StreamLane,
};
use crate::error::{EngineError, EngineResult};

pub struct BuildingLane {
    config: BuildingConfig,
    left: Vec<ActiveElement>,
    right: Vec<ActiveElement>,
}

impl BuildingLane {
    pub fn new(config: BuildingConfig) -> Self {
        Self {
            config,
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    /// Forward-most spawned row position across both sides.
    fn farthest_z(&self) -> f32 {
        self.left
            .iter()
            .chain(self.right.iter())
            .map(|building| building.position.z)
            .fold(0.0, f32::max)
    }

    /// Spawn one row: a building on each side at `z`, each with its own
    /// lateral offset. The left side additionally takes cosmetic random
    /// scale and yaw. Returns whether at least one side spawned.
    fn spawn_row(&mut self, ctx: &mut LaneContext<'_>, z: f32) -> bool {
        let [lat_min, lat_max] = self.config.lateral_range;
        let mut spawned = false;

        let left_x = -ctx.rng.gen_range(lat_min..lat_max);
        if let Some(mut building) =
            spawn_element(ctx, &self.config.pool_key, Vector3::new(left_x, 0.0, z))
        {
            building.scale = ctx.rng.gen_range(0.9..1.1);
            building.rotation = Quaternion::from_angle_y(Deg(ctx.rng.gen_range(0.0..360.0)));
            self.left.push(building);
            spawned = true;
        }

        let right_x = ctx.rng.gen_range(lat_min..lat_max);
        if let Some(building) =
            spawn_element(ctx, &self.config.pool_key, Vector3::new(right_x, 0.0, z))
        {
            self.right.push(building);
            spawned = true;
        }
        spawned
    }

    /// Refill forward until coverage reaches the track leading edge plus
    /// the spawn-ahead distance. A fully failed row means the pool is
    /// exhausted; the refill stops and is retried next tick.
    fn refill(&mut self, ctx: &mut LaneContext<'_>) {
        let [gap_min, gap_max] = self.config.spacing_range;
        let target = ctx.track_end_z + self.config.spawn_distance;
        let mut farthest = self.farthest_z();
        while farthest < target {
            let gap = ctx.rng.gen_range(gap_min..gap_max);
            if !self.spawn_row(ctx, farthest + gap) {
                break;
            }
            farthest = self.farthest_z();
        }
    }

    fn recycle_side(side: &mut Vec<ActiveElement>, ctx: &mut LaneContext<'_>, cutoff: f32) {
        for i in (0..side.len()).rev() {
            if side[i].position.z < cutoff {
                let building = side.remove(i);
                if let Err(err) = ctx.pool.checkin(building.handle) {
                    log::warn!("building checkin failed: {}", err);
                }
            }
        }
    }
}

impl StreamLane for BuildingLane {
    fn lane_type(&self) -> LaneType {
        LaneType::Building
    }

    fn initialize(&mut self, ctx: &mut LaneContext<'_>) -> EngineResult<()> {
        if ctx.pool.prefab_count(&self.config.pool_key) == 0 {
            return Err(EngineError::EmptyPrefabSet {
                key: self.config.pool_key.clone(),
            });
        }
        let [gap_min, gap_max] = self.config.spacing_range;
        let mut z = 0.0;
        while z < self.config.spawn_distance {
            self.spawn_row(ctx, z);
            z += ctx.rng.gen_range(gap_min..gap_max);
        }
        Ok(())
    }

    fn advance(&mut self, ctx: &mut LaneContext<'_>) {
        for building in self.left.iter_mut().chain(self.right.iter_mut()) {
            building.position.z -= ctx.motion;
        }
    }

    fn recycle(&mut self, ctx: &mut LaneContext<'_>) {
        // Unordered removal, independently per side; left/right parity is
        // not an invariant for this lane.
        Self::recycle_side(&mut self.left, ctx, self.config.recycle_distance);
        Self::recycle_side(&mut self.right, ctx, self.config.recycle_distance);
        self.refill(ctx);
    }

    fn active_count(&self) -> usize {
        self.left.len() + self.right.len()
    }

    fn visit_placements(&self, visitor: &mut dyn FnMut(Placement)) {
        for building in self.left.iter().chain(self.right.iter()) {
            visitor(building.placement());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::testing::TestInstantiator;
    use crate::pool::{ObjectPool, PoolConfig, PoolKey};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn building_pool(max: usize) -> ObjectPool {
        let mut pool = ObjectPool::with_seed(Box::new(TestInstantiator::new()), 1);
        pool.register(PoolConfig {
            pool_key: PoolKey::new("building"),
            prefabs: vec!["tower".to_string(), "block".to_string()],
            initial_size: 0,
            max_size: max,
        })
        .expect("register");
        pool
    }

    fn test_config() -> BuildingConfig {
        BuildingConfig {
            spawn_distance: 100.0,
            recycle_distance: -50.0,
            lateral_range: [10.0, 20.0],
            spacing_range: [8.0, 15.0],
            ..BuildingConfig::default()
        }
    }

    fn row_positions(lane: &BuildingLane) -> Vec<f32> {
        let mut zs: Vec<f32> = lane.left.iter().map(|b| b.position.z).collect();
        zs.sort_by(|a, b| a.partial_cmp(b).expect("finite"));
        zs
    }

    #[test]
    fn test_seeded_rows_are_reproducible() {
        let run = |seed: u64| {
            let mut pool = building_pool(200);
            let mut rng = StdRng::seed_from_u64(seed);
            let mut ctx = LaneContext {
                pool: &mut pool,
                rng: &mut rng,
                motion: 0.0,
                track_end_z: 140.0,
                center_x: 0.0,
            };
            let mut lane = BuildingLane::new(test_config());
            lane.initialize(&mut ctx).expect("initialize");
            row_positions(&lane)
        };

        let first = run(1234);
        let second = run(1234);
        assert_eq!(first, second);
        assert!(first.len() > 2);

        // Row spacing stays inside the configured range.
        for pair in first.windows(2) {
            let gap = pair[1] - pair[0];
            assert!((8.0..15.0).contains(&gap), "gap {} out of range", gap);
        }
    }

    #[test]
    fn test_coverage_tracks_leading_edge() {
        let mut pool = building_pool(400);
        let mut rng = StdRng::seed_from_u64(7);
        let mut lane = BuildingLane::new(test_config());
        {
            let mut ctx = LaneContext {
                pool: &mut pool,
                rng: &mut rng,
                motion: 0.0,
                track_end_z: 140.0,
                center_x: 0.0,
            };
            lane.initialize(&mut ctx).expect("initialize");
        }

        let mut track_end = 140.0;
        for _ in 0..300 {
            track_end += 0.9;
            let mut ctx = LaneContext {
                pool: &mut pool,
                rng: &mut rng,
                motion: 0.9,
                track_end_z: track_end,
                center_x: 0.0,
            };
            lane.advance(&mut ctx);
            lane.recycle(&mut ctx);

            assert!(
                lane.farthest_z() >= track_end + 100.0,
                "coverage fell behind: farthest {} target {}",
                lane.farthest_z(),
                track_end + 100.0
            );
        }
    }

    #[test]
    fn test_recycle_returns_buildings_behind_cutoff() {
        let mut pool = building_pool(400);
        let mut rng = StdRng::seed_from_u64(7);
        let mut lane = BuildingLane::new(test_config());
        let mut ctx = LaneContext {
            pool: &mut pool,
            rng: &mut rng,
            motion: 60.0,
            track_end_z: 140.0,
            center_x: 0.0,
        };
        lane.initialize(&mut ctx).expect("initialize");

        // One big step pushes early rows past the -50 cutoff.
        lane.advance(&mut ctx);
        lane.recycle(&mut ctx);

        for building in lane.left.iter().chain(lane.right.iter()) {
            assert!(building.position.z >= -50.0);
        }
        let stats = ctx.pool.stats(&PoolKey::new("building")).expect("stats");
        assert_eq!(stats.checked_out, lane.active_count());
    }

    #[test]
    fn test_left_side_takes_cosmetic_variation() {
        let mut pool = building_pool(200);
        let mut rng = StdRng::seed_from_u64(99);
        let mut ctx = LaneContext {
            pool: &mut pool,
            rng: &mut rng,
            motion: 0.0,
            track_end_z: 0.0,
            center_x: 0.0,
        };
        let mut lane = BuildingLane::new(test_config());
        lane.initialize(&mut ctx).expect("initialize");

        for building in &lane.left {
            assert!((0.9..1.1).contains(&building.scale));
            assert!(building.position.x <= -10.0 && building.position.x >= -20.0);
        }
        for building in &lane.right {
            assert_eq!(building.scale, 1.0);
            assert!(building.position.x >= 10.0 && building.position.x <= 20.0);
        }
    }

    #[test]
    fn test_exhausted_pool_stops_refill_without_panic() {
        let mut pool = building_pool(6);
        let mut rng = StdRng::seed_from_u64(5);
        let mut ctx = LaneContext {
            pool: &mut pool,
            rng: &mut rng,
            motion: 0.0,
            track_end_z: 500.0,
            center_x: 0.0,
        };
        let mut lane = BuildingLane::new(test_config());
        lane.initialize(&mut ctx).expect("initialize");
        lane.recycle(&mut ctx);

        assert_eq!(lane.active_count(), 6);
        let stats = ctx.pool.stats(&PoolKey::new("building")).expect("stats");
        assert_eq!(stats.checked_out, 6);
    }
}
