//! Owning 2-D matrix container.
//!
//! Storage is a flat, row-major buffer: `height` rows of `width`
//! elements, cell `(x, y)` at `width * y + x`. Arithmetic lives in
//! [`ops`], transposition in [`transpose`].

pub mod ops;
pub mod transpose;

use std::fmt;
use std::mem;
use std::ops::{Index, IndexMut};

use crate::element::Element;
use crate::error::{MatrixError, Result};
use crate::storage::{Heap, Storage, element_count};

/// Dense matrix owning its buffer.
///
/// The buffer always holds exactly `width * height` elements. A matrix
/// with no elements holds no allocation, which is the state [`Matrix::take`]
/// leaves behind.
pub struct Matrix<T, S = Heap>
where
    S: Storage<T>,
{
    width: usize,
    height: usize,
    data: Vec<T>,
    storage: S,
}

impl<T: Element> Matrix<T> {
    /// Allocate a zeroed `width` x `height` matrix on the heap.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::with_storage(width, height, Heap)
    }

    pub fn filled(width: usize, height: usize, value: T) -> Result<Self> {
        let mut mat = Self::new(width, height)?;
        mat.fill(value);
        Ok(mat)
    }

    /// Wrap an existing row-major buffer.
    ///
    /// Fails with [`MatrixError::BufferLength`] unless `data` holds exactly
    /// `width * height` elements. Spare capacity is released first, so the
    /// buffer handed back to storage on drop is exactly that long.
    pub fn from_vec(width: usize, height: usize, mut data: Vec<T>) -> Result<Self> {
        if element_count(width, height)? != data.len() {
            return Err(MatrixError::BufferLength {
                width,
                height,
                len: data.len(),
            });
        }
        data.shrink_to_fit();
        Ok(Self {
            width,
            height,
            data,
            storage: Heap,
        })
    }

    /// The `n` x `n` multiplicative identity.
    pub fn identity(n: usize) -> Result<Self> {
        let mut mat = Self::new(n, n)?;
        for i in 0..n {
            mat.data[n * i + i] = T::one();
        }
        Ok(mat)
    }
}

impl<T: Element, S: Storage<T>> Matrix<T, S> {
    /// Allocate a zeroed `width` x `height` matrix from `storage`.
    pub fn with_storage(width: usize, height: usize, storage: S) -> Result<Self> {
        let len = element_count(width, height)?;
        let data = storage.allocate(len)?;
        Ok(Self {
            width,
            height,
            data,
            storage,
        })
    }

    /// A `0 x 0` matrix with no buffer.
    pub fn empty_in(storage: S) -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
            storage,
        }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Size of the element buffer in bytes.
    pub fn memory_footprint(&self) -> usize {
        self.data.len() * mem::size_of::<T>()
    }

    pub fn get(&self, x: usize, y: usize) -> Result<&T> {
        let offset = self.offset(x, y)?;
        Ok(&self.data[offset])
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Result<&mut T> {
        let offset = self.offset(x, y)?;
        Ok(&mut self.data[offset])
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) -> Result<()> {
        *self.get_mut(x, y)? = value;
        Ok(())
    }

    /// Row `y` as a slice of `width` elements.
    pub fn row(&self, y: usize) -> Result<&[T]> {
        if y >= self.height {
            return Err(self.out_of_bounds(0, y));
        }
        Ok(&self.data[y * self.width..(y + 1) * self.width])
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

    /// Move the contents out, leaving `self` as an empty `0 x 0` matrix
    /// that can be reused.
    pub fn take(&mut self) -> Self {
        let empty = Self::empty_in(self.storage.clone());
        mem::replace(self, empty)
    }

    /// Deep copy, reporting allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Self> {
        let mut data = self.storage.allocate(self.data.len())?;
        data.copy_from_slice(&self.data);
        Ok(Self {
            width: self.width,
            height: self.height,
            data,
            storage: self.storage.clone(),
        })
    }

    /// Copy-assign from `source`.
    ///
    /// When the element counts match the existing buffer is overwritten in
    /// place. Otherwise a new buffer is acquired first, so on failure
    /// `self` is left untouched.
    pub fn copy_from(&mut self, source: &Self) -> Result<()> {
        if self.data.len() == source.data.len() {
            self.data.copy_from_slice(&source.data);
        } else {
            let mut data = self.storage.allocate(source.data.len())?;
            data.copy_from_slice(&source.data);
            self.replace_data(data);
        }
        self.width = source.width;
        self.height = source.height;
        Ok(())
    }

    /// Swap in `other`'s buffer and extents, releasing the old buffer.
    pub(crate) fn assign(&mut self, mut other: Self) {
        let data = mem::take(&mut other.data);
        self.replace_data(data);
        self.width = other.width;
        self.height = other.height;
    }

    fn replace_data(&mut self, data: Vec<T>) {
        let old = mem::replace(&mut self.data, data);
        self.storage.release(old);
    }

    fn offset(&self, x: usize, y: usize) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(self.out_of_bounds(x, y));
        }
        Ok(self.width * y + x)
    }

    fn out_of_bounds(&self, x: usize, y: usize) -> MatrixError {
        MatrixError::CellOutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }
}

impl<T, S: Storage<T>> Drop for Matrix<T, S> {
    fn drop(&mut self) {
        let data = mem::take(&mut self.data);
        if !data.is_empty() {
            self.storage.release(data);
        }
    }
}

impl<T: Element, S: Storage<T>> Default for Matrix<T, S> {
    fn default() -> Self {
        Self::empty_in(S::default())
    }
}

/// Both methods take their buffer from the matrix's storage.
///
/// # Panics
///
/// Panics if the storage cannot supply the buffer, the way `Vec::clone`
/// aborts on exhaustion. Use [`Matrix::try_clone`] or
/// [`Matrix::copy_from`] to get the error instead.
impl<T: Element, S: Storage<T>> Clone for Matrix<T, S> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(err) => panic!("{err}"),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.copy_from(source) {
            panic!("{err}");
        }
    }
}

/// # Panics
///
/// Panics if `x >= width()` or `y >= height()`. Use [`Matrix::get`] for a
/// checked read.
impl<T: Element, S: Storage<T>> Index<(usize, usize)> for Matrix<T, S> {
    type Output = T;

    fn index(&self, (x, y): (usize, usize)) -> &T {
        match self.get(x, y) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T: Element, S: Storage<T>> IndexMut<(usize, usize)> for Matrix<T, S> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        match self.get_mut(x, y) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T: Element, S: Storage<T>> fmt::Debug for Matrix<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("data", &self.data)
            .finish()
    }
}

impl<T: Element + fmt::Display, S: Storage<T>> fmt::Display for Matrix<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == 0 {
            return Ok(());
        }
        for row in self.data.chunks(self.width) {
            for value in row {
                write!(f, "{value} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Pool;

    #[test]
    fn test_new_and_accessors() {
        let m: Matrix<i32> = Matrix::new(3, 2).unwrap();
        assert_eq!(m.width(), 3);
        assert_eq!(m.height(), 2);
        assert_eq!(m.len(), 6);
        assert_eq!(m.memory_footprint(), 6 * 4);
        assert!(!m.is_square());
        assert!(m.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_row_major_addressing() {
        let mut m: Matrix<i32> = Matrix::new(3, 2).unwrap();
        m[(2, 1)] = 9;
        m.set(1, 0, 4).unwrap();
        assert_eq!(m.as_slice(), &[0, 4, 0, 0, 0, 9]);
        assert_eq!(m.row(1).unwrap(), &[0, 0, 9]);
    }

    #[test]
    fn test_out_of_bounds_is_an_error() {
        let m: Matrix<f64> = Matrix::new(3, 2).unwrap();
        assert!(m.get(3, 0).is_err());
        assert!(m.get(0, 2).is_err());
        assert!(m.row(2).is_err());
        assert!(matches!(
            m.get(5, 7),
            Err(MatrixError::CellOutOfBounds {
                x: 5,
                y: 7,
                width: 3,
                height: 2
            })
        ));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_index_operator_panics_out_of_bounds() {
        let m: Matrix<f64> = Matrix::new(2, 2).unwrap();
        let _ = m[(0, 2)];
    }

    #[test]
    fn test_take_leaves_empty_matrix() {
        let mut a = Matrix::filled(2, 2, 7).unwrap();
        let b = a.take();

        assert_eq!(a.shape(), (0, 0));
        assert!(a.is_empty());
        assert_eq!(a.as_slice().len(), 0);
        assert_eq!(b.shape(), (2, 2));
        assert_eq!(b.as_slice(), &[7, 7, 7, 7]);

        // The moved-from matrix is still usable.
        a.copy_from(&b).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_copy_from_reuses_or_reallocates() {
        let src = Matrix::filled(3, 2, 1.5).unwrap();

        // Same element count, different shape: buffer reused.
        let mut same = Matrix::filled(2, 3, 0.0).unwrap();
        let before = same.as_slice().as_ptr();
        same.copy_from(&src).unwrap();
        assert_eq!(same.as_slice().as_ptr(), before);
        assert_eq!(same.shape(), (3, 2));
        assert_eq!(same.as_slice(), src.as_slice());

        let mut bigger = Matrix::filled(4, 4, 0.0).unwrap();
        bigger.copy_from(&src).unwrap();
        assert_eq!(bigger.len(), 6);
        assert_eq!(bigger.as_slice(), src.as_slice());
    }

    #[test]
    fn test_clone_is_deep() {
        let a = Matrix::filled(2, 2, 3u8).unwrap();
        let mut b = a.clone();
        b[(0, 0)] = 1;
        assert_eq!(a[(0, 0)], 3);
        assert_eq!(b[(0, 0)], 1);
    }

    #[test]
    fn test_identity() {
        let id: Matrix<i64> = Matrix::identity(3).unwrap();
        assert_eq!(id.as_slice(), &[1, 0, 0, 0, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(matches!(
            Matrix::from_vec(2, 2, vec![1, 2, 3]),
            Err(MatrixError::BufferLength {
                width: 2,
                height: 2,
                len: 3
            })
        ));
        let m = Matrix::from_vec(3, 1, vec![1, 2, 3]).unwrap();
        assert_eq!(m.shape(), (3, 1));
    }

    #[test]
    fn test_from_vec_drops_spare_capacity() {
        let mut data = Vec::with_capacity(64);
        data.extend([1, 2, 3, 4]);
        let m = Matrix::from_vec(2, 2, data).unwrap();
        assert_eq!(m.data.capacity(), 4);
    }

    #[test]
    fn test_new_rejects_overflowing_extents() {
        assert!(matches!(
            Matrix::<f64>::new(usize::MAX, 2),
            Err(MatrixError::Allocation { len: usize::MAX, source: None })
        ));
    }

    /// Heap storage that refuses buffers longer than `limit`.
    #[derive(Clone, Default)]
    struct Capped {
        limit: usize,
    }

    impl<T: Element> Storage<T> for Capped {
        fn allocate(&self, len: usize) -> Result<Vec<T>> {
            if len > self.limit {
                return Err(MatrixError::Allocation { len, source: None });
            }
            Heap.allocate(len)
        }

        fn release(&self, buffer: Vec<T>) {
            drop(buffer);
        }
    }

    fn capped(width: usize, height: usize, value: i32, limit: usize) -> Matrix<i32, Capped> {
        Matrix {
            width,
            height,
            data: vec![value; width * height],
            storage: Capped { limit },
        }
    }

    #[test]
    fn test_failed_copy_from_leaves_receiver_untouched() {
        let mut dst = capped(2, 2, 7, 4);
        let src = capped(3, 3, 1, usize::MAX);

        assert!(matches!(
            dst.copy_from(&src),
            Err(MatrixError::Allocation { len: 9, .. })
        ));
        assert_eq!(dst.shape(), (2, 2));
        assert_eq!(dst.as_slice(), &[7, 7, 7, 7]);
    }

    #[test]
    fn test_try_clone_reports_allocation_failure() {
        let m = capped(3, 3, 1, 4);
        assert!(matches!(
            m.try_clone(),
            Err(MatrixError::Allocation { len: 9, source: None })
        ));
    }

    #[test]
    #[should_panic(expected = "failed to allocate")]
    fn test_clone_panics_when_storage_refuses() {
        let m = capped(3, 3, 1, 4);
        let _ = m.clone();
    }

    #[test]
    fn test_pooled_clone_goes_through_pool() {
        let pool: Pool<i32> = Pool::new();
        drop(Matrix::with_storage(2, 2, pool.clone()).unwrap());
        assert_eq!(pool.cached(), 1);

        let mut a = Matrix::with_storage(2, 2, pool.clone()).unwrap();
        a.fill(5);
        let b = a.clone();
        assert_eq!(b.as_slice(), &[5, 5, 5, 5]);
        assert_eq!(pool.cached(), 0);

        drop(b);
        assert_eq!(pool.cached(), 1);
    }

    #[test]
    fn test_pooled_clone_from_releases_old_buffer() {
        let pool: Pool<i32> = Pool::new();
        let mut dst = Matrix::with_storage(2, 2, pool.clone()).unwrap();
        let mut src = Matrix::with_storage(3, 3, pool.clone()).unwrap();
        src.fill(2);

        dst.clone_from(&src);

        assert_eq!(dst.shape(), (3, 3));
        assert_eq!(dst.as_slice(), src.as_slice());
        assert_eq!(pool.cached(), 1);
    }

    #[test]
    fn test_pooled_matrix_returns_buffer_on_drop() {
        let pool: Pool<f32> = Pool::new();
        {
            let m = Matrix::with_storage(4, 4, pool.clone()).unwrap();
            assert_eq!(m.len(), 16);
        }
        assert_eq!(pool.cached(), 1);

        let again = Matrix::with_storage(8, 2, pool.clone()).unwrap();
        assert_eq!(pool.cached(), 0);
        assert!(again.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_display() {
        let m = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(m.to_string(), "1 2 \n3 4 \n");
    }
}
