//! pool.rs
//! Reuse of libdeflate contexts across calls and threads.
//!
//! Allocating a compressor is far more expensive than a small compress call,
//! so idle handles are parked in bounded lock-free queues: one per
//! compression level, one for decompressors. A handle is owned by exactly one
//! party at a time: the pool while idle, the caller between checkout and
//! checkin. The pool destroys whatever is idle when drained or dropped.

use crossbeam::queue::ArrayQueue;
use log::debug;

use crate::config::BridgeConfig;
use crate::constants::{MAX_LEVEL, MIN_LEVEL};
use crate::handle::{CompressorHandle, DecompressorHandle};
use crate::types::{BridgeError, Result};

pub struct HandlePool {
    /// Indexed by compression level.
    compressors: Vec<ArrayQueue<CompressorHandle>>,
    decompressors: ArrayQueue<DecompressorHandle>,
}

impl HandlePool {
    /// `capacity` idle handles per level; a full queue destroys returned handles.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let compressors = (MIN_LEVEL..=MAX_LEVEL).map(|_| ArrayQueue::new(capacity)).collect();
        Self { compressors, decompressors: ArrayQueue::new(capacity) }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.pool_capacity)
    }

    fn queue(&self, level: i32) -> Result<&ArrayQueue<CompressorHandle>> {
        usize::try_from(level - MIN_LEVEL)
            .ok()
            .and_then(|idx| self.compressors.get(idx))
            .ok_or(BridgeError::InvalidLevel { level })
    }

    pub fn checkout_compressor(&self, level: i32) -> Result<CompressorHandle> {
        match self.queue(level)?.pop() {
            Some(handle) => Ok(handle),
            None => CompressorHandle::create(level),
        }
    }

    pub fn checkin_compressor(&self, handle: CompressorHandle) {
        let Ok(queue) = self.queue(handle.level()) else {
            handle.destroy();
            return;
        };
        if let Err(overflow) = queue.push(handle) {
            debug!("compressor pool for level {} full, freeing", overflow.level());
            overflow.destroy();
        }
    }

    pub fn checkout_decompressor(&self) -> Result<DecompressorHandle> {
        match self.decompressors.pop() {
            Some(handle) => Ok(handle),
            None => DecompressorHandle::create(),
        }
    }

    pub fn checkin_decompressor(&self, handle: DecompressorHandle) {
        if let Err(overflow) = self.decompressors.push(handle) {
            debug!("decompressor pool full, freeing");
            overflow.destroy();
        }
    }

    pub fn idle_compressors(&self, level: i32) -> usize {
        self.queue(level).map_or(0, |q| q.len())
    }

    pub fn idle_decompressors(&self) -> usize {
        self.decompressors.len()
    }

    /// Destroys every idle handle and returns how many were freed.
    pub fn drain(&self) -> usize {
        let mut freed = 0;
        for queue in &self.compressors {
            while let Some(handle) = queue.pop() {
                handle.destroy();
                freed += 1;
            }
        }
        while let Some(handle) = self.decompressors.pop() {
            handle.destroy();
            freed += 1;
        }
        if freed > 0 {
            debug!("drained {freed} idle handles");
        }
        freed
    }
}

impl Default for HandlePool {
    fn default() -> Self {
        Self::from_config(&BridgeConfig::default())
    }
}

impl Drop for HandlePool {
    fn drop(&mut self) {
        self.drain();
    }
}
