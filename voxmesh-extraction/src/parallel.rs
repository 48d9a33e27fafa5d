//! Parallel processing utilities for isosurface extraction
//!
//! Provides a configurable global thread pool and a small `parallel_map`
//! helper used to distribute grid planes across worker threads.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::{Arc, Mutex, OnceLock};
use voxmesh_core::{Error, Result};

static GLOBAL_THREAD_POOL: OnceLock<Arc<ThreadPool>> = OnceLock::new();
static THREAD_POOL_CONFIG: Mutex<ThreadPoolConfig> = Mutex::new(ThreadPoolConfig::new());

/// Thread pool configuration for parallel extraction
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Number of threads to use (None = one per logical CPU)
    pub num_threads: Option<usize>,
    /// Enable parallel processing (can be disabled for debugging)
    pub enabled: bool,
    /// Inputs shorter than this are processed sequentially
    pub min_parallel_len: usize,
}

impl ThreadPoolConfig {
    const fn new() -> Self {
        Self {
            num_threads: None,
            enabled: true,
            min_parallel_len: 2,
        }
    }

    /// Set number of threads
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Enable or disable parallel processing
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize the global thread pool with a custom configuration.
///
/// Must be called before the first extraction to take effect; afterwards the
/// pool is already built and the call is a no-op.
pub fn init_thread_pool(config: ThreadPoolConfig) -> Result<()> {
    if GLOBAL_THREAD_POOL.get().is_some() {
        return Ok(());
    }

    let mut builder = ThreadPoolBuilder::new().thread_name(|index| format!("voxmesh-{}", index));
    if let Some(num_threads) = config.num_threads {
        builder = builder.num_threads(num_threads);
    }

    let pool = builder
        .build()
        .map_err(|e| Error::Algorithm(format!("failed to create thread pool: {}", e)))?;

    if let Ok(mut global_config) = THREAD_POOL_CONFIG.lock() {
        *global_config = config;
    }

    GLOBAL_THREAD_POOL
        .set(Arc::new(pool))
        .map_err(|_| Error::Algorithm("thread pool already initialized".to_string()))?;

    Ok(())
}

/// Get the global thread pool, initializing with defaults if needed
pub fn get_thread_pool() -> Arc<ThreadPool> {
    GLOBAL_THREAD_POOL
        .get_or_init(|| {
            let pool = ThreadPoolBuilder::new()
                .num_threads(num_cpus::get())
                .thread_name(|index| format!("voxmesh-{}", index))
                .build()
                .expect("failed to create default thread pool");
            Arc::new(pool)
        })
        .clone()
}

fn get_config() -> ThreadPoolConfig {
    THREAD_POOL_CONFIG
        .lock()
        .map(|config| config.clone())
        .unwrap_or_default()
}

/// Execute an operation inside the global thread pool
pub fn execute_parallel<F, R>(op: F) -> R
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    get_thread_pool().install(op)
}

/// Map over a slice in parallel, preserving input order in the output
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    let config = get_config();
    if !config.enabled || data.len() < config.min_parallel_len {
        return data.iter().map(f).collect();
    }

    execute_parallel(|| data.par_iter().map(f).collect())
}
