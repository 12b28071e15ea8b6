//! Dense matrix and vector arithmetic with two multiplication strategies.
//!
//! I wanted to see where Strassen actually beats the textbook triple loop
//! on a real machine, so this crate has both behind one `*`: a parallel
//! naive multiply that transposes once for locality, and a recursive
//! Strassen for square power-of-two operands. The matrix picks one by
//! looking at the operand shapes.
//!
//! ## Usage
//!
//! ```
//! use haifisch::Matrix;
//!
//! let a = Matrix::filled(4, 4, 2.0).unwrap();
//! let b = Matrix::filled(4, 4, 3.0).unwrap();
//!
//! // 4x4 is a power of two, so this goes through Strassen
//! let c = &a * &b;
//! assert!(c.as_slice().iter().all(|&v| v == 24.0));
//! ```
//!
//! Everything that can fail has a checked `try_*` form:
//!
//! ```
//! use haifisch::{Matrix, MatrixError};
//!
//! let mut a: Matrix<i64> = Matrix::new(3, 2).unwrap();
//! let b: Matrix<i64> = Matrix::new(2, 3).unwrap();
//!
//! assert!(matches!(
//!     a.try_add_assign(&b),
//!     Err(MatrixError::DimensionMismatch { .. })
//! ));
//! ```
//!
//! For control over threads and Strassen's recursion, build a
//! [`Multiplier`]:
//!
//! ```
//! use haifisch::{Config, Matrix, Multiplier};
//!
//! let multiplier = Multiplier::new(Config::default().with_num_threads(4)).unwrap();
//!
//! let a = Matrix::filled(100, 100, 1.0f64).unwrap();
//! let c = multiplier.multiply(&a, &a).unwrap();
//! assert_eq!(c[(0, 0)], 100.0);
//! ```
//!
//! ## What's inside
//!
//! - Row-major `Matrix` and fixed-length `Vector` over a pluggable `Storage`
//! - Heap and pooled storage (the pool recycles Strassen's temporaries)
//! - Naive multiply on a rayon pool, serial for small products
//! - Strassen with an optional leaf size and parallel sub-products

pub mod config;
pub mod element;
pub mod error;
pub mod matrix;
pub mod multiply;
pub mod storage;
pub mod vector;

pub use config::Config;
pub use element::Element;
pub use error::{MatrixError, Result};
pub use matrix::Matrix;
pub use matrix::transpose::transpose;
pub use multiply::{Multiplier, Strategy, multiply, multiply_with};
pub use storage::{Heap, Pool, Storage};
pub use vector::Vector;
