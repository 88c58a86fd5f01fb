//! buffer/heap.rs
//! Relocatable buffer view: copy-in on acquire, copy-out on commit.
//!
//! The owning runtime may move a managed array at any point where it regains
//! control, so the native call never sees the array itself. Acquisition copies
//! the requested window into a staging allocation that stays put for the call;
//! release either copies that window back (commit) or drops it (abort).

use log::{trace, warn};

use crate::buffer::types::{
    ensure_window, BufferOrigin, BufferView, ManagedArray, RawSpan, ReleaseMode,
};
use crate::types::{BridgeError, Result};

/// The window copied out of the array for the current acquisition.
struct Staged {
    offset: usize,
    bytes: Vec<u8>,
}

pub struct HeapBuffer<A: ManagedArray> {
    array: A,
    staging: Option<Staged>,
    /// Largest staging allocation this view may make.
    budget: Option<usize>,
}

impl<A: ManagedArray> HeapBuffer<A> {
    pub fn new(array: A) -> Self {
        Self { array, staging: None, budget: None }
    }

    /// Caps the staging allocation. Windows larger than `budget` fail to acquire.
    pub fn with_budget(array: A, budget: Option<usize>) -> Self {
        Self { array, staging: None, budget }
    }

    pub fn array(&self) -> &A {
        &self.array
    }

    pub fn is_acquired(&self) -> bool {
        self.staging.is_some()
    }

    pub fn into_inner(self) -> A {
        self.array
    }

    fn stage(&self, offset: usize, len: usize) -> Result<Vec<u8>> {
        let failure = BridgeError::AcquisitionFailure { origin: BufferOrigin::Heap, len };
        if self.budget.is_some_and(|budget| len > budget) {
            warn!("heap window of {len} bytes exceeds staging budget {:?}", self.budget);
            return Err(failure);
        }
        let mut staging = Vec::new();
        if staging.try_reserve_exact(len).is_err() {
            warn!("could not allocate {len} staging bytes for heap view");
            return Err(failure);
        }
        staging.resize(len, 0);
        self.array.read_into(offset, &mut staging);
        Ok(staging)
    }
}

impl<A: ManagedArray> BufferView for HeapBuffer<A> {
    fn acquire(&mut self, offset: usize, len: usize) -> Result<RawSpan> {
        debug_assert!(self.staging.is_none(), "heap view acquired twice without release");
        ensure_window(offset, len, self.array.len())?;
        let bytes = self.stage(offset, len)?;
        let staged = self.staging.insert(Staged { offset, bytes });
        Ok(RawSpan { ptr: staged.bytes.as_mut_ptr(), len: staged.bytes.len() })
    }

    fn release(&mut self, mode: ReleaseMode) {
        let Some(staged) = self.staging.take() else {
            return;
        };
        if mode == ReleaseMode::Commit && self.array.is_writable() {
            trace!("committing {} staged bytes at offset {}", staged.bytes.len(), staged.offset);
            self.array.write_back(staged.offset, &staged.bytes);
        }
    }

    fn len(&self) -> usize {
        self.array.len()
    }

    fn is_writable(&self) -> bool {
        self.array.is_writable()
    }

    fn origin(&self) -> BufferOrigin {
        BufferOrigin::Heap
    }
}
