//! Engine-wide state: configuration knobs and the six memoization caches.
//!
//! There are no module-level singletons; callers construct one [`EngineContext`] and pass it into
//! every top-level operation. Independent top-level calls may share a context across threads;
//! the caches synchronize internally and nothing else is shared.

use crate::cache::{Cache, Capacity};

/// Tunable limits. The recursion caps are empirically tuned values; no deeper meaning should be
/// read into them.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Maximum passes of the shrink fixpoint loop.
    pub shrink_iterations: u32,
    /// Maximum recursive depth of a single top-level integration.
    pub integrate_depth: u32,
    /// Maximum nesting of integration by parts within one session.
    pub by_parts_depth: u32,
    /// Largest whole exponent the power-expansion rewrite will unroll.
    pub expand_power_limit: i64,
    /// Capacity of each memoization cache.
    pub cache_capacity: Capacity,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shrink_iterations: 20,
            integrate_depth: 45,
            by_parts_depth: 2,
            expand_power_limit: 6,
            cache_capacity: Capacity::Bounded(50),
        }
    }
}

/// Shared engine state passed into every top-level call.
#[derive(Debug)]
pub struct EngineContext {
    pub config: EngineConfig,
    pub shrink_cache: Cache,
    pub cancel_cache: Cache,
    pub factor_cache: Cache,
    pub substitute_cache: Cache,
    pub derive_cache: Cache,
    pub integrate_cache: Cache,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            shrink_cache: Cache::new(config.cache_capacity),
            cancel_cache: Cache::new(config.cache_capacity),
            factor_cache: Cache::new(config.cache_capacity),
            substitute_cache: Cache::new(config.cache_capacity),
            derive_cache: Cache::new(config.cache_capacity),
            integrate_cache: Cache::new(config.cache_capacity),
        }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}
