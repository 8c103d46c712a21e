//! Keyed cache of reusable world-object handles.
//!
//! One `ObjectPool` instance is shared by every streaming lane; lanes use
//! disjoint keys, so no two lanes ever contend over the same handle set.
//! Check-in is idempotent: the state tag on each slot record guarantees a
//! handle is never enqueued twice, which would let `checkout` hand the same
//! live handle to two owners.

use rand::rngs::StdRng;
use rand::Rng;
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};

use crate::error::{EngineError, EngineResult};
use crate::pool::handle::{HandleId, HandleSlot, HandleState, InstanceId, PoolKey};

/// Produces one inert engine-side object for a pool key.
///
/// The streaming core depends on the host's instantiation service only
/// through this capability; it never calls engine or runtime APIs directly.
pub trait Instantiator: Send {
    fn instantiate(&mut self, key: &PoolKey, prefab: &str) -> InstanceId;
}

/// Configuration for one keyed pool
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub pool_key: PoolKey,
    /// Prefab variants this pool instantiates from. One is drawn at random
    /// per created handle.
    pub prefabs: Vec<String>,
    pub initial_size: usize,
    /// Hard cap on handles ever created for this key.
    pub max_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_key: PoolKey::new("default"),
            prefabs: Vec::new(),
            initial_size: 10,
            max_size: 50,
        }
    }
}

/// Pool statistics for one key
#[derive(Clone, Copy, Debug, Default)]
pub struct PoolStats {
    pub free: usize,
    pub checked_out: usize,
    pub created: usize,
    pub max_size: usize,
}

/// Per-key bookkeeping: config, the FIFO of free handles, and counters.
#[derive(Debug)]
struct PoolEntry {
    config: PoolConfig,
    free: VecDeque<HandleId>,
    checked_out: usize,
    /// Handles ever created for this key. Creation beyond `initial_size`
    /// is allowed up to `max_size`; handles are never destroyed.
    created: usize,
}

/// Keyed cache of reusable handles.
///
/// Owns creation (through the injected [`Instantiator`]), checkout, and
/// check-in; enforces the per-key capacity bound and prevents double
/// check-in.
pub struct ObjectPool {
    factory: Box<dyn Instantiator>,
    pools: HashMap<PoolKey, PoolEntry>,
    /// Registry of every handle ever created, indexed by `HandleId`.
    /// The slot record carries the handle's immutable key and its
    /// ownership tag.
    slots: Vec<HandleSlot>,
    rng: StdRng,
}

impl ObjectPool {
    pub fn new(factory: Box<dyn Instantiator>) -> Self {
        use rand::SeedableRng;

        Self {
            factory,
            pools: HashMap::new(),
            slots: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Pool with a pinned variant-selection seed, for reproducible runs.
    pub fn with_seed(factory: Box<dyn Instantiator>, seed: u64) -> Self {
        use rand::SeedableRng;

        Self {
            factory,
            pools: HashMap::new(),
            slots: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Register a keyed pool and stock it with `initial_size` handles.
    pub fn register(&mut self, config: PoolConfig) -> EngineResult<()> {
        let key = config.pool_key.clone();
        if self.pools.contains_key(&key) {
            return Err(EngineError::DuplicatePool { key });
        }
        if config.prefabs.is_empty() {
            log::warn!("pool '{}' registered with an empty prefab set", key);
        }

        let initial = config.initial_size.min(config.max_size);
        let stock = !config.prefabs.is_empty();
        self.pools.insert(
            key.clone(),
            PoolEntry {
                config,
                free: VecDeque::new(),
                checked_out: 0,
                created: 0,
            },
        );
        if stock {
            self.warm_up(&key, initial)?;
        }
        Ok(())
    }

    /// Ensure at least `min(target, max_size)` free handles exist for
    /// `key`, creating new ones as needed. Idempotent: repeated calls
    /// never exceed the key's capacity. Returns how many were created.
    pub fn warm_up(&mut self, key: &PoolKey, target: usize) -> EngineResult<usize> {
        if !self.pools.contains_key(key) {
            return Err(EngineError::UnknownPoolKey { key: key.clone() });
        }

        let mut added = 0;
        loop {
            let (free, created, max) = match self.pools.get(key) {
                Some(entry) => (entry.free.len(), entry.created, entry.config.max_size),
                None => break,
            };
            if free >= target || created >= max {
                break;
            }
            let id = self.create_handle(key, HandleState::InPool)?;
            if let Some(entry) = self.pools.get_mut(key) {
                entry.free.push_back(id);
            }
            added += 1;
        }
        Ok(added)
    }

    /// Warm every registered pool up to `target` free handles. Per-key
    /// failures are logged and do not stop the remaining pools.
    pub fn warm_up_all(&mut self, target: usize) {
        let keys: Vec<PoolKey> = self.pools.keys().cloned().collect();
        for key in keys {
            if let Err(err) = self.warm_up(&key, target) {
                log::warn!("warm-up skipped for pool '{}': {}", key, err);
            }
        }
    }

    /// Acquire a handle for `key`, reusing a free one when available and
    /// creating a new one while under the key's `max_size`.
    pub fn checkout(&mut self, key: &PoolKey) -> EngineResult<HandleId> {
        {
            let entry = self
                .pools
                .get_mut(key)
                .ok_or_else(|| EngineError::UnknownPoolKey { key: key.clone() })?;
            if let Some(id) = entry.free.pop_front() {
                entry.checked_out += 1;
                if let Some(slot) = self.slots.get_mut(id.index()) {
                    slot.state = HandleState::Active;
                }
                return Ok(id);
            }
            if entry.created >= entry.config.max_size {
                return Err(EngineError::PoolExhausted { key: key.clone() });
            }
        }

        let id = self.create_handle(key, HandleState::Active)?;
        if let Some(entry) = self.pools.get_mut(key) {
            entry.checked_out += 1;
        }
        Ok(id)
    }

    /// Return a handle to its pool. A handle already `InPool` is left
    /// untouched: check-in is idempotent so a double return can never
    /// enqueue the same handle twice.
    pub fn checkin(&mut self, handle: HandleId) -> EngineResult<()> {
        let slot = match self.slots.get_mut(handle.index()) {
            Some(slot) => slot,
            None => return Err(EngineError::NotPoolable { handle }),
        };
        if slot.state == HandleState::InPool {
            return Ok(());
        }
        slot.state = HandleState::InPool;
        let key = slot.key.clone();

        match self.pools.get_mut(&key) {
            Some(entry) => {
                entry.free.push_back(handle);
                entry.checked_out = entry.checked_out.saturating_sub(1);
                Ok(())
            }
            None => Err(EngineError::UnknownPoolKey { key }),
        }
    }

    /// Engine-side object behind a handle, if the handle exists.
    pub fn instance_of(&self, handle: HandleId) -> Option<InstanceId> {
        self.slots.get(handle.index()).map(|slot| slot.instance)
    }

    /// Whether a handle is currently owned by the pool.
    pub fn is_in_pool(&self, handle: HandleId) -> bool {
        self.slots
            .get(handle.index())
            .map(|slot| slot.state == HandleState::InPool)
            .unwrap_or(false)
    }

    /// Number of prefab variants registered for `key` (0 for unknown keys).
    pub fn prefab_count(&self, key: &PoolKey) -> usize {
        self.pools
            .get(key)
            .map(|entry| entry.config.prefabs.len())
            .unwrap_or(0)
    }

    pub fn stats(&self, key: &PoolKey) -> Option<PoolStats> {
        self.pools.get(key).map(|entry| PoolStats {
            free: entry.free.len(),
            checked_out: entry.checked_out,
            created: entry.created,
            max_size: entry.config.max_size,
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &PoolKey> {
        self.pools.keys()
    }

    /// Instantiate one handle for `key` via the factory. The caller
    /// updates the owning entry's free list / checked-out count.
    fn create_handle(&mut self, key: &PoolKey, state: HandleState) -> EngineResult<HandleId> {
        let prefab = {
            let entry = self
                .pools
                .get(key)
                .ok_or_else(|| EngineError::UnknownPoolKey { key: key.clone() })?;
            if entry.config.prefabs.is_empty() {
                return Err(EngineError::EmptyPrefabSet { key: key.clone() });
            }
            let variant = self.rng.gen_range(0..entry.config.prefabs.len());
            entry.config.prefabs[variant].clone()
        };

        let instance = self.factory.instantiate(key, &prefab);
        let id = HandleId(self.slots.len() as u32);
        self.slots.push(HandleSlot {
            key: key.clone(),
            instance,
            state,
        });
        if let Some(entry) = self.pools.get_mut(key) {
            entry.created += 1;
        }
        Ok(id)
    }
}
