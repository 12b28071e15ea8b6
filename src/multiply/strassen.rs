//! Strassen's recursive multiplication for square power-of-two operands.
//!
//! Each level splits both operands into four quadrants and forms seven
//! half-size products instead of eight:
//!
//! ```text
//! p1 = a11 * (b12 - b22)          c11 = p5 + p4 + p6 - p2
//! p2 = (a11 + a12) * b22          c12 = p1 + p2
//! p3 = (a21 + a22) * b11          c21 = p3 + p4
//! p4 = a22 * (b21 - b11)          c22 = p5 + p1 - p3 - p7
//! p5 = (a11 + a22) * (b11 + b22)
//! p6 = (a12 - a22) * (b21 + b22)
//! p7 = (a11 - a21) * (b11 + b12)
//! ```
//!
//! The seven products only read the quadrants, so with
//! [`Config::parallel_strassen`] they run as independent rayon tasks. All
//! seven finish before any output quadrant is written.

use rayon::prelude::*;

use super::kernel::matmul_ikj;
use crate::config::Config;
use crate::element::Element;
use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use crate::storage::Storage;

/// Sub-problems smaller than this are not worth a rayon task.
const PARALLEL_MIN_SIDE: usize = 64;

/// C = A * B for `n` x `n` operands with `n` a power of two.
///
/// Every temporary, including the result, comes from A's storage.
pub fn multiply<T, S>(lhs: &Matrix<T, S>, rhs: &Matrix<T, S>, config: &Config) -> Result<Matrix<T, S>>
where
    T: Element,
    S: Storage<T>,
{
    for mat in [lhs, rhs] {
        if !mat.is_square() || !mat.width().is_power_of_two() {
            return Err(MatrixError::NotSquarePowerOfTwo {
                width: mat.width(),
                height: mat.height(),
            });
        }
    }
    if lhs.shape() != rhs.shape() {
        return Err(MatrixError::mismatch("strassen multiply", lhs.shape(), rhs.shape()));
    }

    recurse(lhs, rhs, config.strassen_leaf.max(1), config.parallel_strassen)
}

fn recurse<T, S>(a: &Matrix<T, S>, b: &Matrix<T, S>, leaf: usize, parallel: bool) -> Result<Matrix<T, S>>
where
    T: Element,
    S: Storage<T>,
{
    let n = a.width();
    let mut c = Matrix::with_storage(n, n, a.storage().clone())?;

    if n == 1 {
        c.as_mut_slice()[0] = a.as_slice()[0] * b.as_slice()[0];
        return Ok(c);
    }
    if n <= leaf {
        matmul_ikj(a.as_slice(), b.as_slice(), c.as_mut_slice(), n, n, n);
        return Ok(c);
    }

    let k = n / 2;
    let [a11, a12, a21, a22] = quadrants(a)?;
    let [b11, b12, b21, b22] = quadrants(b)?;

    let b12_b22 = b12.try_sub(&b22)?;
    let a11_a12 = a11.try_add(&a12)?;
    let a21_a22 = a21.try_add(&a22)?;
    let b21_b11 = b21.try_sub(&b11)?;
    let a11_a22 = a11.try_add(&a22)?;
    let b11_b22 = b11.try_add(&b22)?;
    let a12_a22 = a12.try_sub(&a22)?;
    let b21_b22 = b21.try_add(&b22)?;
    let a11_a21 = a11.try_sub(&a21)?;
    let b11_b12 = b11.try_add(&b12)?;

    let operands = [
        (&a11, &b12_b22),
        (&a11_a12, &b22),
        (&a21_a22, &b11),
        (&a22, &b21_b11),
        (&a11_a22, &b11_b22),
        (&a12_a22, &b21_b22),
        (&a11_a21, &b11_b12),
    ];

    let products: Vec<Matrix<T, S>> = if parallel && k >= PARALLEL_MIN_SIDE {
        operands
            .par_iter()
            .map(|&(x, y)| recurse(x, y, leaf, parallel))
            .collect::<Result<_>>()?
    } else {
        operands
            .iter()
            .map(|&(x, y)| recurse(x, y, leaf, parallel))
            .collect::<Result<_>>()?
    };

    let p1 = products[0].as_slice();
    let p2 = products[1].as_slice();
    let p3 = products[2].as_slice();
    let p4 = products[3].as_slice();
    let p5 = products[4].as_slice();
    let p6 = products[5].as_slice();
    let p7 = products[6].as_slice();

    let out = c.as_mut_slice();
    for y in 0..k {
        for x in 0..k {
            let i = y * k + x;
            out[y * n + x] = p5[i] + p4[i] + p6[i] - p2[i];
            out[y * n + k + x] = p1[i] + p2[i];
            out[(y + k) * n + x] = p3[i] + p4[i];
            out[(y + k) * n + k + x] = p5[i] + p1[i] - p3[i] - p7[i];
        }
    }

    Ok(c)
}

/// Split an even-sided square matrix into `[top-left, top-right,
/// bottom-left, bottom-right]`.
fn quadrants<T, S>(mat: &Matrix<T, S>) -> Result<[Matrix<T, S>; 4]>
where
    T: Element,
    S: Storage<T>,
{
    let n = mat.width();
    let k = n / 2;
    let new_quadrant = || Matrix::with_storage(k, k, mat.storage().clone());
    let mut q = [new_quadrant()?, new_quadrant()?, new_quadrant()?, new_quadrant()?];

    let src = mat.as_slice();
    for y in 0..k {
        let top = &src[y * n..(y + 1) * n];
        let bottom = &src[(y + k) * n..(y + k + 1) * n];
        let dst = y * k..(y + 1) * k;

        q[0].as_mut_slice()[dst.clone()].copy_from_slice(&top[..k]);
        q[1].as_mut_slice()[dst.clone()].copy_from_slice(&top[k..]);
        q[2].as_mut_slice()[dst.clone()].copy_from_slice(&bottom[..k]);
        q[3].as_mut_slice()[dst].copy_from_slice(&bottom[k..]);
    }

    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multiply::naive;
    use crate::storage::Pool;

    fn sample(n: usize, seed: i64) -> Matrix<i64> {
        Matrix::from_vec(n, n, (0..(n * n) as i64).map(|i| (i * seed) % 11 - 5).collect()).unwrap()
    }

    #[test]
    fn test_filled_4x4() {
        let a = Matrix::filled(4, 4, 2.0).unwrap();
        let b = Matrix::filled(4, 4, 3.0).unwrap();

        let c = multiply(&a, &b, &Config::default()).unwrap();

        assert_eq!(c.shape(), (4, 4));
        assert!(c.as_slice().iter().all(|&v| v == 24.0));
    }

    #[test]
    fn test_2x2_by_hand() {
        let a = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
        let b = Matrix::from_vec(2, 2, vec![5, 6, 7, 8]).unwrap();

        let c = multiply(&a, &b, &Config::default()).unwrap();

        assert_eq!(c.as_slice(), &[19, 22, 43, 50]);
    }

    #[test]
    fn test_matches_naive_across_sizes() {
        for n in [1, 2, 4, 8, 16, 32] {
            let a = sample(n, 7);
            let b = sample(n, 3);
            let expected = naive::multiply(&a, &b, &Config::default()).unwrap();
            let got = multiply(&a, &b, &Config::default()).unwrap();
            assert_eq!(got, expected, "strassen_size_{}", n);
        }
    }

    #[test]
    fn test_leaf_and_parallel_options_agree() {
        let a = sample(128, 5);
        let b = sample(128, 9);
        let plain = multiply(&a, &b, &Config::default().with_strassen_leaf(16)).unwrap();
        let parallel = multiply(
            &a,
            &b,
            &Config::default().with_strassen_leaf(16).with_parallel_strassen(true),
        )
        .unwrap();
        let expected = naive::multiply(&a, &b, &Config::default()).unwrap();

        assert_eq!(plain, expected);
        assert_eq!(parallel, expected);
    }

    #[test]
    fn test_rejects_unsupported_shapes() {
        let odd = sample(3, 1);
        assert!(matches!(
            multiply(&odd, &odd, &Config::default()),
            Err(MatrixError::NotSquarePowerOfTwo { width: 3, height: 3 })
        ));

        let rect: Matrix<i64> = Matrix::new(4, 2).unwrap();
        assert!(multiply(&rect, &rect, &Config::default()).is_err());

        let (a, b) = (sample(4, 1), sample(8, 1));
        assert!(matches!(
            multiply(&a, &b, &Config::default()),
            Err(MatrixError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_pooled_storage_recycles_temporaries() {
        let pool: Pool<i64> = Pool::new();
        let mut a = Matrix::with_storage(8, 8, pool.clone()).unwrap();
        let mut b = Matrix::with_storage(8, 8, pool.clone()).unwrap();
        a.fill(2);
        b.fill(1);

        let c = multiply(&a, &b, &Config::default()).unwrap();

        assert!(c.as_slice().iter().all(|&v| v == 16));
        assert!(pool.cached() > 0);
    }
}
