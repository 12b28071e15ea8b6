//! Matrix–matrix multiplication strategies and the dispatcher that picks
//! between them.
//!
//! - `naive`: parallel transpose-assisted triple loop, any compatible shapes
//! - `strassen`: recursive divide-and-conquer, square power-of-two only
//! - `kernel`: scalar i-k-j kernel, Strassen's leaf and the test oracle

pub mod kernel;
pub mod naive;
pub mod strassen;

use log::debug;

use crate::config::Config;
use crate::element::Element;
use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use crate::storage::Storage;

/// Which algorithm computes a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Naive,
    Strassen,
}

impl Strategy {
    /// Strassen when both operands are the same square power-of-two size,
    /// naive for everything else. Shapes are `(width, height)`.
    pub fn select(lhs: (usize, usize), rhs: (usize, usize)) -> Self {
        let (width, height) = lhs;
        if width == height && lhs == rhs && width.is_power_of_two() {
            Strategy::Strassen
        } else {
            Strategy::Naive
        }
    }
}

/// `lhs * rhs` with default settings on the global rayon pool.
pub fn multiply<T, S>(lhs: &Matrix<T, S>, rhs: &Matrix<T, S>) -> Result<Matrix<T, S>>
where
    T: Element,
    S: Storage<T>,
{
    multiply_with(lhs, rhs, &Config::default())
}

/// `lhs * rhs`, dispatched on shape.
///
/// Requires `lhs.width() == rhs.height()`; the result is `rhs.width()`
/// wide and `lhs.height()` tall.
pub fn multiply_with<T, S>(lhs: &Matrix<T, S>, rhs: &Matrix<T, S>, config: &Config) -> Result<Matrix<T, S>>
where
    T: Element,
    S: Storage<T>,
{
    let strategy = Strategy::select(lhs.shape(), rhs.shape());
    multiply_using(strategy, lhs, rhs, config)
}

/// `lhs * rhs` with an explicit strategy, skipping dispatch.
pub fn multiply_using<T, S>(
    strategy: Strategy,
    lhs: &Matrix<T, S>,
    rhs: &Matrix<T, S>,
    config: &Config,
) -> Result<Matrix<T, S>>
where
    T: Element,
    S: Storage<T>,
{
    if lhs.width() != rhs.height() {
        return Err(MatrixError::mismatch("multiply", lhs.shape(), rhs.shape()));
    }

    debug!(
        "multiply: {}x{} * {}x{} via {:?}",
        lhs.width(),
        lhs.height(),
        rhs.width(),
        rhs.height(),
        strategy
    );

    let result = match strategy {
        Strategy::Naive => naive::multiply(lhs, rhs, config)?,
        Strategy::Strassen => strassen::multiply(lhs, rhs, config)?,
    };

    debug!(
        "multiply: result {}x{}, {:.3} MiB",
        result.width(),
        result.height(),
        result.memory_footprint() as f64 / 1024.0 / 1024.0
    );

    Ok(result)
}

/// A multiply engine with its own settings and, when
/// [`Config::num_threads`] is non-zero, its own fixed-size worker pool.
#[derive(Debug, Default)]
pub struct Multiplier {
    config: Config,
    pool: Option<rayon::ThreadPool>,
}

impl Multiplier {
    pub fn new(config: Config) -> Result<Self> {
        let pool = match config.num_threads {
            0 => None,
            n => Some(rayon::ThreadPoolBuilder::new().num_threads(n).build()?),
        };
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Workers available to the naive strategy.
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// `lhs * rhs`, dispatched on shape.
    pub fn multiply<T, S>(&self, lhs: &Matrix<T, S>, rhs: &Matrix<T, S>) -> Result<Matrix<T, S>>
    where
        T: Element,
        S: Storage<T>,
    {
        let strategy = Strategy::select(lhs.shape(), rhs.shape());
        self.multiply_using(strategy, lhs, rhs)
    }

    /// `lhs * rhs` with an explicit strategy.
    pub fn multiply_using<T, S>(
        &self,
        strategy: Strategy,
        lhs: &Matrix<T, S>,
        rhs: &Matrix<T, S>,
    ) -> Result<Matrix<T, S>>
    where
        T: Element,
        S: Storage<T>,
    {
        match &self.pool {
            Some(pool) => pool.install(|| multiply_using(strategy, lhs, rhs, &self.config)),
            None => multiply_using(strategy, lhs, rhs, &self.config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_selection() {
        assert_eq!(Strategy::select((4, 4), (4, 4)), Strategy::Strassen);
        assert_eq!(Strategy::select((1, 1), (1, 1)), Strategy::Strassen);
        assert_eq!(Strategy::select((3, 3), (3, 3)), Strategy::Naive);
        assert_eq!(Strategy::select((4, 2), (2, 4)), Strategy::Naive);
        assert_eq!(Strategy::select((4, 4), (8, 4)), Strategy::Naive);
        assert_eq!(Strategy::select((0, 0), (0, 0)), Strategy::Naive);
    }

    #[test]
    fn test_dispatch_agrees_with_both_strategies() {
        let a = Matrix::from_vec(8, 8, (0..64).map(|i| (i % 7) as i64).collect()).unwrap();
        let b = Matrix::from_vec(8, 8, (0..64).map(|i| (i % 5) as i64 - 2).collect()).unwrap();
        let config = Config::default();

        let dispatched = multiply(&a, &b).unwrap();
        let naive = multiply_using(Strategy::Naive, &a, &b, &config).unwrap();
        let strassen = multiply_using(Strategy::Strassen, &a, &b, &config).unwrap();

        assert_eq!(dispatched, naive);
        assert_eq!(dispatched, strassen);
    }

    #[test]
    fn test_multiplier_owns_a_pool() {
        let multiplier = Multiplier::new(Config::default().with_num_threads(2)).unwrap();
        assert_eq!(multiplier.num_threads(), 2);

        let a = Matrix::filled(5, 3, 1.0).unwrap();
        let b = Matrix::filled(4, 5, 2.0).unwrap();
        let c = multiplier.multiply(&a, &b).unwrap();

        assert_eq!(c.shape(), (4, 3));
        assert!(c.as_slice().iter().all(|&v| v == 10.0));
    }

    #[test]
    fn test_incompatible_shapes_rejected() {
        let a: Matrix<f32> = Matrix::new(2, 3).unwrap();
        let b: Matrix<f32> = Matrix::new(2, 3).unwrap();
        let err = multiply(&a, &b).unwrap_err();
        assert!(err.to_string().contains("2x3"));
    }
}
