//! Transposition: `dst = src^T`.

use super::Matrix;
use crate::element::Element;
use crate::error::Result;
use crate::storage::Storage;

/// Write the transpose of a row-major `rows` x `cols` slice into `dst`.
///
/// Works for any `Copy` element; [`Matrix::transposed`] calls it with the
/// matrix height as `rows` and its width as `cols`. Both slices must hold
/// exactly `rows * cols` elements.
///
/// ```
/// use haifisch::matrix::transpose::transpose_into;
///
/// // 3 wide, 2 tall
/// let src = [1u8, 2, 3,
///            4, 5, 6];
/// let mut dst = [0u8; 6];
///
/// transpose_into(&src, &mut dst, 2, 3);
///
/// assert_eq!(dst, [1, 4,
///                  2, 5,
///                  3, 6]);
/// ```
pub fn transpose_into<T: Copy>(src: &[T], dst: &mut [T], rows: usize, cols: usize) {
    debug_assert_eq!(src.len(), rows * cols);
    debug_assert_eq!(dst.len(), rows * cols);

    for i in 0..rows {
        for j in 0..cols {
            dst[j * rows + i] = src[i * cols + j];
        }
    }
}

/// A new matrix with the axes of `mat` swapped: `result(y, x) == mat(x, y)`.
pub fn transpose<T: Element, S: Storage<T>>(mat: &Matrix<T, S>) -> Result<Matrix<T, S>> {
    mat.transposed()
}

impl<T: Element, S: Storage<T>> Matrix<T, S> {
    /// Transposed copy; `self` is untouched and shares no memory with it.
    pub fn transposed(&self) -> Result<Self> {
        let mut result = Self::with_storage(self.height, self.width, self.storage.clone())?;
        transpose_into(&self.data, &mut result.data, self.height, self.width);
        Ok(result)
    }

    /// Replace `self` with its transpose.
    pub fn transpose(&mut self) -> Result<()> {
        let transposed = self.transposed()?;
        self.assign(transposed);
        Ok(())
    }
}
