//! Thread pool for the parallel extraction paths
//!
//! Gradient estimation and the cache-free extraction mode split the grid
//! into z-slabs and map over them on one process-wide rayon pool. The pool
//! is built lazily with defaults unless [`init_thread_pool`] ran first.

use isomesh_core::{Error, Result};
use log::{debug, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::OnceLock;

static SLAB_POOL: OnceLock<SlabPool> = OnceLock::new();

const DEFAULT_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Thread pool configuration for parallel processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPoolConfig {
    /// Number of threads to use (None = one per core)
    pub num_threads: Option<usize>,
    /// Run slabs on the calling thread instead
    pub enabled: bool,
    /// Fewest slabs handed to one task
    pub min_slabs_per_task: usize,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            enabled: true,
            min_slabs_per_task: 1,
        }
    }
}

impl ThreadPoolConfig {
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Enable or disable parallel processing (handy when debugging)
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_min_slabs_per_task(mut self, slabs: usize) -> Self {
        self.min_slabs_per_task = slabs.max(1);
        self
    }
}

struct SlabPool {
    config: ThreadPoolConfig,
    /// `None` when the pool could not be built or parallelism is off
    pool: Option<ThreadPool>,
}

impl SlabPool {
    fn build(config: ThreadPoolConfig) -> Result<Self> {
        if !config.enabled {
            return Ok(Self { config, pool: None });
        }

        let mut builder = ThreadPoolBuilder::new()
            .stack_size(DEFAULT_STACK_SIZE)
            .thread_name(|index| format!("isomesh-{}", index));
        if let Some(num_threads) = config.num_threads {
            builder = builder.num_threads(num_threads);
        }

        let pool = builder
            .build()
            .map_err(|e| Error::Algorithm(format!("Failed to create thread pool: {}", e)))?;
        debug!("Built slab pool with {} threads", pool.current_num_threads());
        Ok(Self {
            config,
            pool: Some(pool),
        })
    }

    fn global() -> &'static SlabPool {
        SLAB_POOL.get_or_init(|| {
            let config = ThreadPoolConfig::default();
            SlabPool::build(config.clone()).unwrap_or_else(|e| {
                warn!("{}, falling back to sequential execution", e);
                SlabPool { config, pool: None }
            })
        })
    }
}

/// Initialize the global thread pool with custom configuration
///
/// Must run before the first extraction. Returns an error if the pool
/// already exists or cannot be built.
pub fn init_thread_pool(config: ThreadPoolConfig) -> Result<()> {
    if SLAB_POOL.get().is_some() {
        return Err(Error::Algorithm("Thread pool already initialized".to_string()));
    }
    SLAB_POOL
        .set(SlabPool::build(config)?)
        .map_err(|_| Error::Algorithm("Thread pool already initialized".to_string()))
}

/// Configuration of the global pool, building it if needed
pub fn current_config() -> ThreadPoolConfig {
    SlabPool::global().config.clone()
}

/// Order-preserving map over `data`, in parallel when the pool allows
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    let slab_pool = SlabPool::global();
    match &slab_pool.pool {
        Some(pool) if data.len() > 1 => pool.install(|| {
            data.par_iter()
                .with_min_len(slab_pool.config.min_slabs_per_task)
                .map(f)
                .collect()
        }),
        _ => data.iter().map(f).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_pool_config() {
        let config = ThreadPoolConfig::default()
            .with_threads(4)
            .with_enabled(false)
            .with_min_slabs_per_task(0);

        assert_eq!(config.num_threads, Some(4));
        assert!(!config.enabled);
        assert_eq!(config.min_slabs_per_task, 1);
    }

    #[test]
    fn test_disabled_pool_has_no_threads() {
        let pool = SlabPool::build(ThreadPoolConfig::default().with_enabled(false)).unwrap();
        assert!(pool.pool.is_none());
    }

    #[test]
    fn test_second_init_is_rejected() {
        // the first parallel call may already have created the pool
        let _ = current_config();
        assert!(matches!(
            init_thread_pool(ThreadPoolConfig::default()),
            Err(Error::Algorithm(_))
        ));
    }

    #[test]
    fn test_parallel_map_preserves_order() {
        let data: Vec<usize> = (0..257).collect();
        let result = parallel_map(&data, |x| x * 2);
        assert_eq!(result, data.iter().map(|x| x * 2).collect::<Vec<_>>());
    }
}
