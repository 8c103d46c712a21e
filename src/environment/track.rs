//! Track lane
//!
//! A single FIFO window of fixed-length segments laid end-to-end from the
//! origin. The head is retired once it falls below the recycle cutoff and
//! one replacement is spawned at the leading edge, so the window keeps a
//! constant segment count while the leading edge tracker only grows.

use cgmath::Vector3;
use std::collections::VecDeque;

use crate::environment::config::TrackConfig;
use crate::environment::lane::{
    spawn_element, ActiveElement, LaneContext, LaneType, Placement, StreamLane,
};
use crate::error::{EngineError, EngineResult};

pub struct TrackLane {
    config: TrackConfig,
    /// Window ordered by ascending position: appended at the leading edge,
    /// removed at the trailing edge.
    segments: VecDeque<ActiveElement>,
    /// Forward-most spawned position. Other lanes read this to stay
    /// coupled to track progress.
    end_z: f32,
}

impl TrackLane {
    pub fn new(config: TrackConfig) -> Self {
        Self {
            config,
            segments: VecDeque::new(),
            end_z: 0.0,
        }
    }

    /// Current leading edge of spawned track.
    pub fn end_z(&self) -> f32 {
        self.end_z
    }

    fn spawn_segment(&mut self, ctx: &mut LaneContext<'_>, z: f32) {
        if let Some(segment) = spawn_element(ctx, &self.config.pool_key, Vector3::new(0.0, 0.0, z))
        {
            self.segments.push_back(segment);
        }
    }
}

impl StreamLane for TrackLane {
    fn lane_type(&self) -> LaneType {
        LaneType::Track
    }

    fn initialize(&mut self, ctx: &mut LaneContext<'_>) -> EngineResult<()> {
        if ctx.pool.prefab_count(&self.config.pool_key) == 0 {
            return Err(EngineError::EmptyPrefabSet {
                key: self.config.pool_key.clone(),
            });
        }
        for i in 0..self.config.initial_segment_count {
            self.spawn_segment(ctx, i as f32 * self.config.segment_length);
        }
        self.end_z = self.config.initial_segment_count.saturating_sub(1) as f32
            * self.config.segment_length;
        Ok(())
    }

    fn advance(&mut self, ctx: &mut LaneContext<'_>) {
        for segment in &mut self.segments {
            segment.position.z -= ctx.motion;
        }
    }

    fn recycle(&mut self, ctx: &mut LaneContext<'_>) {
        // At most one head retirement per tick: ticks are small relative to
        // a segment length, so a single boundary crossing can occur.
        let crossed = self
            .segments
            .front()
            .map(|head| head.position.z < self.config.recycle_offset)
            .unwrap_or(false);
        if !crossed {
            return;
        }
        if let Some(head) = self.segments.pop_front() {
            if let Err(err) = ctx.pool.checkin(head.handle) {
                log::warn!("track segment checkin failed: {}", err);
            }
            self.end_z += self.config.segment_length;
            self.spawn_segment(ctx, self.end_z);
        }
    }

    fn active_count(&self) -> usize {
        self.segments.len()
    }

    fn visit_placements(&self, visitor: &mut dyn FnMut(Placement)) {
        for segment in &self.segments {
            visitor(segment.placement());
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

    fn track_pool(max: usize) -> ObjectPool {
        let mut pool = ObjectPool::with_seed(Box::new(TestInstantiator::new()), 1);
        pool.register(PoolConfig {
            pool_key: PoolKey::new("track"),
            prefabs: vec!["track_segment".to_string()],
            initial_size: 0,
            max_size: max,
        })
        .expect("register");
        pool
    }

    fn small_config(count: usize, length: f32) -> TrackConfig {
        TrackConfig {
            initial_segment_count: count,
            segment_length: length,
            recycle_offset: -length,
            ..TrackConfig::default()
        }
    }

    fn positions(lane: &TrackLane) -> Vec<f32> {
        lane.segments.iter().map(|s| s.position.z).collect()
    }

    #[test]
    fn test_initialize_lays_segments_end_to_end() {
        let mut pool = track_pool(20);
        let mut rng = StdRng::seed_from_u64(42);
        let mut ctx = LaneContext {
            pool: &mut pool,
            rng: &mut rng,
            motion: 0.0,
            track_end_z: 0.0,
            center_x: 0.0,
        };
        let mut lane = TrackLane::new(small_config(3, 10.0));
        lane.initialize(&mut ctx).expect("initialize");

        assert_eq!(positions(&lane), vec![0.0, 10.0, 20.0]);
        assert_eq!(lane.end_z(), 20.0);
        assert_eq!(lane.active_count(), 3);
    }

    #[test]
    fn test_head_rotates_to_leading_edge() {
        // segmentLength=10, 3 segments; a travel distance of 11 pushes the
        // head below -10, so exactly one recycle occurs and the
        // replacement appears at z=30.
        let mut pool = track_pool(20);
        let mut rng = StdRng::seed_from_u64(42);
        let mut ctx = LaneContext {
            pool: &mut pool,
            rng: &mut rng,
            motion: 11.0,
            track_end_z: 0.0,
            center_x: 0.0,
        };
        let mut lane = TrackLane::new(small_config(3, 10.0));
        lane.initialize(&mut ctx).expect("initialize");

        lane.advance(&mut ctx);
        assert_eq!(positions(&lane), vec![-11.0, -1.0, 9.0]);

        lane.recycle(&mut ctx);
        assert_eq!(positions(&lane), vec![-1.0, 9.0, 30.0]);
        assert_eq!(lane.end_z(), 30.0);
        assert_eq!(lane.active_count(), 3);
    }

    #[test]
    fn test_no_recycle_before_cutoff() {
        let mut pool = track_pool(20);
        let mut rng = StdRng::seed_from_u64(42);
        let mut ctx = LaneContext {
            pool: &mut pool,
            rng: &mut rng,
            motion: 10.0,
            track_end_z: 0.0,
            center_x: 0.0,
        };
        let mut lane = TrackLane::new(small_config(3, 10.0));
        lane.initialize(&mut ctx).expect("initialize");

        // Head lands exactly on the cutoff; retirement requires strictly
        // below it.
        lane.advance(&mut ctx);
        lane.recycle(&mut ctx);
        assert_eq!(positions(&lane), vec![-10.0, 0.0, 10.0]);
        assert_eq!(lane.end_z(), 20.0);
    }

    #[test]
    fn test_window_stays_fifo_ordered() {
        let mut pool = track_pool(20);
        let mut rng = StdRng::seed_from_u64(42);
        let mut lane = TrackLane::new(small_config(5, 10.0));
        {
            let mut ctx = LaneContext {
                pool: &mut pool,
                rng: &mut rng,
                motion: 0.0,
                track_end_z: 0.0,
                center_x: 0.0,
            };
            lane.initialize(&mut ctx).expect("initialize");
        }

        for _ in 0..200 {
            let mut ctx = LaneContext {
                pool: &mut pool,
                rng: &mut rng,
                motion: 0.7,
                track_end_z: 0.0,
                center_x: 0.0,
            };
            lane.advance(&mut ctx);
            lane.recycle(&mut ctx);

            let zs = positions(&lane);
            for pair in zs.windows(2) {
                assert!(pair[0] < pair[1], "window out of order: {:?}", zs);
            }
            assert_eq!(lane.active_count(), 5);
        }
    }

    #[test]
    fn test_empty_prefab_set_fails_initialization() {
        let mut pool = ObjectPool::with_seed(Box::new(TestInstantiator::new()), 1);
        pool.register(PoolConfig {
            pool_key: PoolKey::new("track"),
            prefabs: Vec::new(),
            initial_size: 0,
            max_size: 10,
        })
        .expect("register");
        let mut rng = StdRng::seed_from_u64(42);
        let mut ctx = LaneContext {
            pool: &mut pool,
            rng: &mut rng,
            motion: 0.0,
            track_end_z: 0.0,
            center_x: 0.0,
        };

        let mut lane = TrackLane::new(small_config(3, 10.0));
        assert!(matches!(
            lane.initialize(&mut ctx),
            Err(EngineError::EmptyPrefabSet { .. })
        ));
    }
}
