//! ffi/state.rs
//! Process-wide configuration and handle pool behind the Python module.

use std::sync::{OnceLock, PoisonError, RwLock};

use deflate_bridge_core::config::BridgeConfig;
use deflate_bridge_core::pool::HandlePool;
use pyo3::prelude::*;

use super::errors::into_py_err;

static CONFIG: OnceLock<RwLock<BridgeConfig>> = OnceLock::new();
static POOL: OnceLock<HandlePool> = OnceLock::new();

fn config_lock() -> &'static RwLock<BridgeConfig> {
    CONFIG.get_or_init(|| RwLock::new(BridgeConfig::default()))
}

/// Snapshot of the current configuration.
pub fn current() -> BridgeConfig {
    config_lock().read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// The shared pool. Sized from the configuration in force at first use.
pub fn pool() -> &'static HandlePool {
    POOL.get_or_init(|| HandlePool::from_config(&current()))
}

/// Replaces the process-wide configuration with the given JSON document.
/// Missing keys take their defaults.
#[pyfunction]
pub fn configure(json: &str) -> PyResult<()> {
    let config = BridgeConfig::from_json(json).map_err(into_py_err)?;
    log::info!("bridge configuration replaced: {config:?}");
    *config_lock().write().unwrap_or_else(PoisonError::into_inner) = config;
    Ok(())
}

/// Returns the current configuration as JSON.
#[pyfunction]
pub fn config() -> PyResult<String> {
    current().to_json().map_err(into_py_err)
}

/// Frees every idle pooled handle. Returns how many were freed.
#[pyfunction]
pub fn drain_pool() -> usize {
    POOL.get().map_or(0, HandlePool::drain)
}
