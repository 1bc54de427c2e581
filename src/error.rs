use thiserror::Error;

/// Errors returned by [`Wishart`](crate::Wishart) and its helpers.
#[derive(Debug, Error)]
pub enum WishartError {
    /// Degrees of freedom must be finite and strictly greater than `dim - 1`,
    /// and the scale matrix must have at least one row.
    #[error("invalid parameters: nu = {nu} must be finite and greater than dim - 1 for dim = {dim}")]
    InvalidParameter {
        /// Requested degrees of freedom
        nu: f64,
        /// Order of the scale matrix
        dim: usize,
    },

    /// The scale matrix has no Cholesky factorization.
    #[error("scale matrix is not positive definite")]
    NotPositiveDefinite,

    /// A matrix, factor or output buffer does not have the order of the distribution.
    #[error("dimension mismatch: expected order {expected}, got shape {found:?}")]
    DimensionMismatch {
        /// Order of the distribution
        expected: usize,
        /// Shape that was actually supplied
        found: (usize, usize),
    },

    /// The chi-squared draw of a Bartlett row is unusable: either the sampler rejected
    /// its degrees of freedom, or the draw was not strictly positive and finite.
    #[error("cannot sample chi-squared with {dof} degrees of freedom for row {row}")]
    SampleDomain {
        /// Row of the Bartlett factor being drawn
        row: usize,
        /// Degrees of freedom handed to the chi-squared sampler
        dof: f64,
        /// Underlying statrs error, absent when the draw itself was degenerate
        #[source]
        source: Option<statrs::StatsError>,
    },
}
