//! Road lane
//!
//! Two FIFO windows, one per side of the track, recycled and respawned
//! strictly as pairs. A pair is retired only when both heads have crossed
//! the recycle cutoff and a new pair always spawns together at the shared
//! leading-edge tracker, so the two windows can never drift to different
//! lengths and desynchronize from the track centerline.

use cgmath::Vector3;
use std::collections::VecDeque;

use crate::environment::config::RoadConfig;
use crate::environment::lane::{
    spawn_element, ActiveElement, LaneContext, LaneType, Placement, StreamLane,
};
use crate::error::{EngineError, EngineResult};

pub struct RoadLane {
    config: RoadConfig,
    left: VecDeque<ActiveElement>,
    right: VecDeque<ActiveElement>,
    /// Shared leading-edge tracker for both windows.
    end_z: f32,
}

impl RoadLane {
    pub fn new(config: RoadConfig) -> Self {
        Self {
            config,
            left: VecDeque::new(),
            right: VecDeque::new(),
            end_z: 0.0,
        }
    }

    /// Spawn a left+right pair at `z`. If only one side can be checked
    /// out, the lone segment is returned immediately so the windows keep
    /// equal lengths; the pair is retried next tick.
    fn spawn_pair(&mut self, ctx: &mut LaneContext<'_>, z: f32) -> bool {
        let left_x = ctx.center_x - self.config.offset_from_track;
        let right_x = ctx.center_x + self.config.offset_from_track;

        let Some(left) = spawn_element(ctx, &self.config.pool_key, Vector3::new(left_x, 0.0, z))
        else {
            return false;
        };
        match spawn_element(ctx, &self.config.pool_key, Vector3::new(right_x, 0.0, z)) {
            Some(right) => {
                self.left.push_back(left);
                self.right.push_back(right);
                true
            }
            None => {
                if let Err(err) = ctx.pool.checkin(left.handle) {
                    log::warn!("road segment checkin failed: {}", err);
                }
                false
            }
        }
    }
}

impl StreamLane for RoadLane {
    fn lane_type(&self) -> LaneType {
        LaneType::Road
    }

    fn initialize(&mut self, ctx: &mut LaneContext<'_>) -> EngineResult<()> {
        if ctx.pool.prefab_count(&self.config.pool_key) == 0 {
            return Err(EngineError::EmptyPrefabSet {
                key: self.config.pool_key.clone(),
            });
        }
        for i in 0..self.config.initial_segment_count {
            self.spawn_pair(ctx, i as f32 * self.config.segment_length);
        }
        self.end_z = self.config.initial_segment_count.saturating_sub(1) as f32
            * self.config.segment_length;
        Ok(())
    }

    fn advance(&mut self, ctx: &mut LaneContext<'_>) {
        for segment in self.left.iter_mut().chain(self.right.iter_mut()) {
            segment.position.z -= ctx.motion;
        }
    }

    fn recycle(&mut self, ctx: &mut LaneContext<'_>) {
        // One pair at most per tick, and only when both heads crossed.
        let both_crossed = match (self.left.front(), self.right.front()) {
            (Some(left), Some(right)) => {
                left.position.z < self.config.recycle_offset
                    && right.position.z < self.config.recycle_offset
            }
            _ => false,
        };
        if !both_crossed {
            return;
        }
        if let (Some(left), Some(right)) = (self.left.pop_front(), self.right.pop_front()) {
            if let Err(err) = ctx.pool.checkin(left.handle) {
                log::warn!("road segment checkin failed: {}", err);
            }
            if let Err(err) = ctx.pool.checkin(right.handle) {
                log::warn!("road segment checkin failed: {}", err);
            }
            self.end_z += self.config.segment_length;
            self.spawn_pair(ctx, self.end_z);
        }
    }

    fn active_count(&self) -> usize {
        self.left.len() + self.right.len()
    }

    fn visit_placements(&self, visitor: &mut dyn FnMut(Placement)) {
        for segment in self.left.iter().chain(self.right.iter()) {
            visitor(segment.placement());
        }
    }
}
