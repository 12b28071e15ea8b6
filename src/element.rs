//! Numeric element requirements.

use std::fmt;

use num_traits::{NumAssignOps, NumOps, One, Zero};

/// A value that can live inside a [`Matrix`](crate::Matrix) or
/// [`Vector`](crate::Vector).
///
/// Ring arithmetic plus value equality. `Zero` doubles as the initial
/// accumulator of every dot product, `One` builds identity matrices.
/// `Send + Sync` lets the multiply strategies share operands across the
/// worker pool.
///
/// Blanket-implemented, so every primitive integer and float qualifies.
/// Strassen forms differences of sub-blocks, so unsigned element types
/// can overflow there even when the final product fits.
pub trait Element:
    Copy + PartialEq + fmt::Debug + Zero + One + NumOps + NumAssignOps + Send + Sync + 'static
{
}

impl<T> Element for T where
    T: Copy + PartialEq + fmt::Debug + Zero + One + NumOps + NumAssignOps + Send + Sync + 'static
{
}
