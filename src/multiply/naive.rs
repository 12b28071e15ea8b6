//! Parallel, transpose-assisted triple-loop multiplication.
//!
//! B is transposed once up front so every output cell is a dot product of
//! two contiguous rows. Output rows are independent, so they are handed to
//! the worker pool as disjoint mutable chunks: no locking, and the only
//! synchronization is rayon's join before the result is returned.

use rayon::prelude::*;

use crate::config::Config;
use crate::element::Element;
use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use crate::storage::Storage;

/// C = A * B, with C freshly allocated from A's storage.
///
/// A is `k` wide and `m` tall, B is `n` wide and `k` tall, C comes out
/// `n` wide and `m` tall. Runs on whatever rayon pool is current; small
/// products stay on the calling thread (see [`Config::parallel_threshold`]).
pub fn multiply<T, S>(lhs: &Matrix<T, S>, rhs: &Matrix<T, S>, config: &Config) -> Result<Matrix<T, S>>
where
    T: Element,
    S: Storage<T>,
{
    if lhs.width() != rhs.height() {
        return Err(MatrixError::mismatch("naive multiply", lhs.shape(), rhs.shape()));
    }

    let (m, k, n) = (lhs.height(), lhs.width(), rhs.width());
    let mut result = Matrix::with_storage(n, m, lhs.storage().clone())?;
    if m == 0 || n == 0 {
        return Ok(result);
    }

    // Transpose B once at the start so its columns become rows
    let bt = rhs.transposed()?;
    let a = lhs.as_slice();
    let bt = bt.as_slice();

    let fill_row = |(i, row): (usize, &mut [T])| {
        let a_row = &a[i * k..(i + 1) * k];
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = dot(a_row, &bt[j * k..(j + 1) * k]);
        }
    };

    let threads = choose_thread_count(
        m,
        n,
        k,
        rayon::current_num_threads(),
        config.parallel_threshold,
    );

    if threads == 1 {
        result.as_mut_slice().chunks_mut(n).enumerate().for_each(fill_row);
    } else {
        let rows_per_task = m.div_ceil(threads);
        result
            .as_mut_slice()
            .par_chunks_mut(n)
            .enumerate()
            .with_min_len(rows_per_task)
            .for_each(fill_row);
    }

    Ok(result)
}

fn dot<T: Element>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b)
        .fold(T::zero(), |acc, (&x, &y)| acc + x * y)
}

/// How many workers a product is worth.
///
/// - < `threshold` FLOPs: 1 thread
/// - < 3 × `threshold` FLOPs: 2 threads
/// - Otherwise: up to `max_threads`
///
/// Never more workers than output rows.
fn choose_thread_count(m: usize, n: usize, k: usize, max_threads: usize, threshold: usize) -> usize {
    let flops = 2usize.saturating_mul(m).saturating_mul(n).saturating_mul(k);

    let optimal_threads = if flops < threshold {
        1
    } else if flops < threshold.saturating_mul(3) {
        2
    } else {
        max_threads
    };

    optimal_threads.min(m).min(max_threads).max(1)
}
