//! Fixed-length, bounds-checked 1-D buffer.

use std::fmt;
use std::mem;
use std::ops::{Index, IndexMut};

use crate::element::Element;
use crate::error::{MatrixError, Result};
use crate::storage::{Heap, Storage};

/// A vector whose length is fixed at construction.
///
/// There is no resize and no empty moved-from state: the buffer lives as
/// long as the vector does and is handed back to its storage on drop.
pub struct Vector<T, S = Heap>
where
    S: Storage<T>,
{
    data: Vec<T>,
    storage: S,
}

impl<T: Element> Vector<T> {
    /// Allocate `len` zeroed elements on the heap.
    pub fn new(len: usize) -> Result<Self> {
        Self::with_storage(len, Heap)
    }

    /// Take ownership of `data`, dropping any spare capacity.
    pub fn from_vec(mut data: Vec<T>) -> Self {
        data.shrink_to_fit();
        Self {
            data,
            storage: Heap,
        }
    }
}

impl<T: Element, S: Storage<T>> Vector<T, S> {
    pub fn with_storage(len: usize, storage: S) -> Result<Self> {
        let data = storage.allocate(len)?;
        Ok(Self { data, storage })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        let len = self.data.len();
        self.data
            .get(index)
            .ok_or(MatrixError::IndexOutOfBounds { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.data.len();
        self.data
            .get_mut(index)
            .ok_or(MatrixError::IndexOutOfBounds { index, len })
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<T, S: Storage<T>> Drop for Vector<T, S> {
    fn drop(&mut self) {
        let data = mem::take(&mut self.data);
        self.storage.release(data);
    }
}

/// # Panics
///
/// Panics if the storage cannot supply the buffer.
impl<T: Element, S: Storage<T>> Clone for Vector<T, S> {
    fn clone(&self) -> Self {
        let mut data = match self.storage.allocate(self.data.len()) {
            Ok(data) => data,
            Err(err) => panic!("{err}"),
        };
        data.copy_from_slice(&self.data);
        Self {
            data,
            storage: self.storage.clone(),
        }
    }
}

/// # Panics
///
/// Panics if `index >= len()`. Use [`Vector::get`] for a checked read.
impl<T: Element, S: Storage<T>> Index<usize> for Vector<T, S> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T: Element, S: Storage<T>> IndexMut<usize> for Vector<T, S> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.get_mut(index) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T: Element, S: Storage<T>> PartialEq for Vector<T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<T: Element, S: Storage<T>> fmt::Debug for Vector<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.data.iter()).finish()
    }
}

impl<T: Element + fmt::Display, S: Storage<T>> fmt::Display for Vector<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ ")?;
        for value in &self.data {
            write!(f, "{value} ")?;
        }
        write!(f, "]")
    }
}
