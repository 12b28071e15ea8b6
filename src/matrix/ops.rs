//! Elementwise arithmetic, products and equality.
//!
//! The `try_*` methods are the checked API and report shape problems as
//! [`MatrixError::DimensionMismatch`]. The `std::ops` impls wrap them and
//! panic on the same conditions, so `&a + &b` reads naturally when shapes
//! are known to line up.

use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

use super::Matrix;
use crate::element::Element;
use crate::error::{MatrixError, Result};
use crate::multiply::{self, Multiplier};
use crate::storage::Storage;
use crate::vector::Vector;

impl<T: Element, S: Storage<T>> Matrix<T, S> {
    /// `self += rhs`, elementwise. Shapes must match exactly.
    pub fn try_add_assign(&mut self, rhs: &Self) -> Result<()> {
        self.check_same_shape("add", rhs)?;
        for (dst, &src) in self.data.iter_mut().zip(&rhs.data) {
            *dst += src;
        }
        Ok(())
    }

    /// `self -= rhs`, elementwise. Shapes must match exactly.
    pub fn try_sub_assign(&mut self, rhs: &Self) -> Result<()> {
        self.check_same_shape("sub", rhs)?;
        for (dst, &src) in self.data.iter_mut().zip(&rhs.data) {
            *dst -= src;
        }
        Ok(())
    }

    /// Multiply every element by `factor`.
    pub fn scale(&mut self, factor: T) {
        for value in &mut self.data {
            *value *= factor;
        }
    }

    /// `self = self * rhs`.
    ///
    /// The product goes into a fresh buffer which then replaces `self`'s;
    /// on error `self` is unchanged.
    pub fn try_mul_assign(&mut self, rhs: &Self) -> Result<()> {
        let product = multiply::multiply(self, rhs)?;
        self.assign(product);
        Ok(())
    }

    /// [`Matrix::try_mul_assign`] on a specific engine.
    pub fn try_mul_assign_with(&mut self, rhs: &Self, multiplier: &Multiplier) -> Result<()> {
        let product = multiplier.multiply(self, rhs)?;
        self.assign(product);
        Ok(())
    }

    pub fn try_add(&self, rhs: &Self) -> Result<Self> {
        self.check_same_shape("add", rhs)?;
        let mut result = self.try_clone()?;
        result.try_add_assign(rhs)?;
        Ok(result)
    }

    pub fn try_sub(&self, rhs: &Self) -> Result<Self> {
        self.check_same_shape("sub", rhs)?;
        let mut result = self.try_clone()?;
        result.try_sub_assign(rhs)?;
        Ok(result)
    }

    pub fn try_mul(&self, rhs: &Self) -> Result<Self> {
        multiply::multiply(self, rhs)
    }

    /// Matrix–vector product: `result[i] = Σ_j self(i, j) * vec[j]`.
    ///
    /// Requires `height() == vec.len()`; the result has `width()` elements.
    pub fn try_mul_vector(&self, vec: &Vector<T, S>) -> Result<Vector<T, S>> {
        if self.height != vec.len() {
            return Err(MatrixError::mismatch(
                "mul_vector",
                self.shape(),
                (vec.len(), 1),
            ));
        }

        let mut result = Vector::with_storage(self.width, vec.storage().clone())?;
        let v = vec.as_slice();
        for (i, out) in result.as_mut_slice().iter_mut().enumerate() {
            let mut accumulator = T::zero();
            for (j, &vj) in v.iter().enumerate() {
                accumulator += self.data[self.width * j + i] * vj;
            }
            *out = accumulator;
        }
        Ok(result)
    }

    fn check_same_shape(&self, op: &'static str, rhs: &Self) -> Result<()> {
        if self.shape() != rhs.shape() {
            return Err(MatrixError::mismatch(op, self.shape(), rhs.shape()));
        }
        Ok(())
    }
}

/// Matrices are equal when their shapes match and every element compares
/// equal with `T`'s own `==`. Storage is not part of the value.
impl<T: Element, S: Storage<T>> PartialEq for Matrix<T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.data == other.data
    }
}

#[track_caller]
fn or_panic<V>(result: Result<V>) -> V {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}

/// # Panics
///
/// Panics if the shapes differ.
impl<T: Element, S: Storage<T>> AddAssign<&Matrix<T, S>> for Matrix<T, S> {
    fn add_assign(&mut self, rhs: &Matrix<T, S>) {
        or_panic(self.try_add_assign(rhs));
    }
}

/// # Panics
///
/// Panics if the shapes differ.
impl<T: Element, S: Storage<T>> SubAssign<&Matrix<T, S>> for Matrix<T, S> {
    fn sub_assign(&mut self, rhs: &Matrix<T, S>) {
        or_panic(self.try_sub_assign(rhs));
    }
}

/// # Panics
///
/// Panics if `self.width() != rhs.height()` or the result can't be
/// allocated.
impl<T: Element, S: Storage<T>> MulAssign<&Matrix<T, S>> for Matrix<T, S> {
    fn mul_assign(&mut self, rhs: &Matrix<T, S>) {
        or_panic(self.try_mul_assign(rhs));
    }
}

impl<T: Element, S: Storage<T>> MulAssign<T> for Matrix<T, S> {
    fn mul_assign(&mut self, factor: T) {
        self.scale(factor);
    }
}

impl<T: Element, S: Storage<T>> Add for &Matrix<T, S> {
    type Output = Matrix<T, S>;

    fn add(self, rhs: Self) -> Matrix<T, S> {
        or_panic(self.try_add(rhs))
    }
}

impl<T: Element, S: Storage<T>> Sub for &Matrix<T, S> {
    type Output = Matrix<T, S>;

    fn sub(self, rhs: Self) -> Matrix<T, S> {
        or_panic(self.try_sub(rhs))
    }
}

impl<T: Element, S: Storage<T>> Mul for &Matrix<T, S> {
    type Output = Matrix<T, S>;

    fn mul(self, rhs: Self) -> Matrix<T, S> {
        or_panic(self.try_mul(rhs))
    }
}

impl<T: Element, S: Storage<T>> Mul<&Vector<T, S>> for &Matrix<T, S> {
    type Output = Vector<T, S>;

    fn mul(self, rhs: &Vector<T, S>) -> Vector<T, S> {
        or_panic(self.try_mul_vector(rhs))
    }
}
