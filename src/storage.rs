//! Pluggable backing-buffer strategies.
//!
//! Containers are generic over a [`Storage`] and go through it whenever
//! they need a fresh buffer or drop an old one. Two strategies ship:
//!
//! - [`Heap`]: plain fallible allocation, the default.
//! - [`Pool`]: keeps released buffers on per-length shelves and hands
//!   them back out. Strassen allocates a lot of same-sized temporaries,
//!   and a pooled matrix recycles them.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::trace;

use crate::element::Element;
use crate::error::{MatrixError, Result};

/// How a container acquires and releases its buffer.
///
/// `allocate` must return a buffer of exactly `len` elements, all set to
/// `T::zero()`. `release` receives every buffer the container is done with,
/// exactly once.
pub trait Storage<T>: Clone + Default + Send + Sync {
    fn allocate(&self, len: usize) -> Result<Vec<T>>;

    fn release(&self, buffer: Vec<T>);
}

/// Number of elements in a `width` x `height` buffer, or an allocation
/// error if that doesn't fit in `usize`.
pub(crate) fn element_count(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .ok_or(MatrixError::Allocation {
            len: usize::MAX,
            source: None,
        })
}

/// Global-allocator storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Heap;

impl<T: Element> Storage<T> for Heap {
    fn allocate(&self, len: usize) -> Result<Vec<T>> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|source| MatrixError::Allocation {
                len,
                source: Some(source),
            })?;
        buffer.resize(len, T::zero());
        Ok(buffer)
    }

    fn release(&self, buffer: Vec<T>) {
        drop(buffer);
    }
}

const DEFAULT_BUFFERS_PER_LEN: usize = 16;

/// Recycling storage shared between every container created from it.
///
/// Cloning a `Pool` clones the handle, not the shelves.
pub struct Pool<T> {
    shelves: Arc<Mutex<HashMap<usize, Vec<Vec<T>>>>>,
    per_len: usize,
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFERS_PER_LEN)
    }

    /// Keep at most `per_len` idle buffers of any one length.
    pub fn with_capacity(per_len: usize) -> Self {
        Self {
            shelves: Arc::new(Mutex::new(HashMap::new())),
            per_len,
        }
    }

    /// Idle buffers currently held, across all lengths.
    pub fn cached(&self) -> usize {
        self.shelves().values().map(Vec::len).sum()
    }

    fn shelves(&self) -> MutexGuard<'_, HashMap<usize, Vec<Vec<T>>>> {
        // A panic while holding the lock can't leave a shelf half-written.
        self.shelves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            shelves: Arc::clone(&self.shelves),
            per_len: self.per_len,
        }
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("cached", &self.cached())
            .field("per_len", &self.per_len)
            .finish()
    }
}

impl<T: Element> Storage<T> for Pool<T> {
    fn allocate(&self, len: usize) -> Result<Vec<T>> {
        if len == 0 {
            return Ok(Vec::new());
        }

        let recycled = self.shelves().get_mut(&len).and_then(Vec::pop);
        match recycled {
            Some(mut buffer) => {
                trace!("pool: reusing buffer of {len} elements");
                buffer.fill(T::zero());
                Ok(buffer)
            }
            None => Heap.allocate(len),
        }
    }

    fn release(&self, buffer: Vec<T>) {
        let len = buffer.len();
        if len == 0 {
            return;
        }

        let mut shelves = self.shelves();
        let shelf = shelves.entry(len).or_default();
        if shelf.len() < self.per_len {
            shelf.push(buffer);
        }
    }
}
