//! Matrix-variate distributions over symmetric positive-definite matrices.
//!
//! The crate currently provides the [`Wishart`] distribution: its mean, its
//! (log-)density and random draws through the Bartlett decomposition. Matrices
//! are `nalgebra::DMatrix<f64>` and factorizations are nalgebra's lower
//! Cholesky decomposition.
//!
//! ```
//! use distmat::Wishart;
//! use nalgebra::DMatrix;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let w = Wishart::new(DMatrix::identity(2, 2), 4.0).unwrap();
//! let mut rng = StdRng::seed_from_u64(1);
//! let x = w.sample(&mut rng).unwrap();
//! assert!(w.ln_pdf(&x).unwrap().is_finite());
//! ```
#![warn(
    rust_2018_idioms,
    rust_2021_compatibility,
    missing_debug_implementations
)]

pub mod distributions;
pub mod error;
pub mod special;

pub use distributions::{CholeskyFactor, Wishart};
pub use error::WishartError;
