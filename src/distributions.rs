use crate::error::WishartError;
use crate::special::ln_multivariate_gamma;
use nalgebra::{Cholesky, DMatrix, Dynamic};
use rand::{distributions::Distribution, Rng};
use rand_distr::StandardNormal;
use statrs::distribution::ChiSquared;
use std::f64::consts::LN_2;
use std::sync::OnceLock;
use tracing::{debug, trace, warn};

type Matrix = DMatrix<f64>;

/// Cholesky factorization of a dynamically sized matrix, `M = L Lᵀ` with `L` lower triangular.
pub type CholeskyFactor = Cholesky<f64, Dynamic>;

/// Wishart distribution over `d×d` symmetric positive-definite matrices, parametrized by
/// the degrees of freedom `ν > d - 1` and a `d×d` positive-definite scale matrix `V`.
///
/// ```text
/// p(X) = |X|^((ν-d-1)/2) exp(-tr(V⁻¹X)/2) / (2^(νd/2) |V|^(ν/2) Γ_d(ν/2))
/// ```
///
/// Only the lower triangle of symmetric inputs is read.
#[derive(Debug, Clone)]
pub struct Wishart {
    nu: f64,
    dim: usize,
    chol_scale: CholeskyFactor,
    ln_det_scale: f64,
    lower: Matrix,
    // only materialized when needed
    scale: OnceLock<Matrix>,
}

impl Wishart {
    /// Factorizes `scale` and builds the distribution.
    ///
    /// Fails with [`WishartError::InvalidParameter`] if `nu` is not finite or
    /// `nu <= d - 1`, and with [`WishartError::NotPositiveDefinite`] if the
    /// Cholesky factorization of `scale` does not exist.
    pub fn new(scale: Matrix, nu: f64) -> Result<Self, WishartError> {
        let dim = scale.nrows();
        if scale.ncols() != dim {
            return Err(WishartError::DimensionMismatch {
                expected: dim,
                found: scale.shape(),
            });
        }
        if dim == 0 || !nu.is_finite() || nu <= dim as f64 - 1.0 {
            return Err(WishartError::InvalidParameter { nu, dim });
        }

        let chol_scale = match factorize(scale) {
            Some(chol) => chol,
            None => {
                warn!(dim, nu, "scale matrix is not positive definite");
                return Err(WishartError::NotPositiveDefinite);
            }
        };
        let lower = chol_scale.l();
        let ln_det_scale = ln_det(&chol_scale);
        debug!(dim, nu, ln_det_scale, "created wishart distribution");

        Ok(Wishart {
            nu,
            dim,
            chol_scale,
            ln_det_scale,
            lower,
            scale: OnceLock::new(),
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn nu(&self) -> f64 {
        self.nu
    }

    /// `ln |V|`, computed once from the factorization.
    pub fn ln_det_scale(&self) -> f64 {
        self.ln_det_scale
    }

    pub fn scale_cholesky(&self) -> &CholeskyFactor {
        &self.chol_scale
    }

    /// The scale matrix `V`, rebuilt from its factor on first use and cached.
    pub fn scale(&self) -> &Matrix {
        self.scale.get_or_init(|| gram_lower(&self.lower))
    }

    /// Mean of the distribution, `ν V`.
    pub fn mean(&self) -> Matrix {
        self.scale() * self.nu
    }

    /// Writes `ν V` into `out`, which must already be `d×d`.
    pub fn mean_into(&self, out: &mut Matrix) -> Result<(), WishartError> {
        self.check_shape(out.shape())?;
        out.copy_from(self.scale());
        *out *= self.nu;
        Ok(())
    }

    /// Density at `x`. Matrices that are not positive definite have density `0`.
    pub fn pdf(&self, x: &Matrix) -> Result<f64, WishartError> {
        self.ln_pdf(x).map(f64::exp)
    }

    /// Log-density at `x`, `-∞` when `x` is not positive definite.
    pub fn ln_pdf(&self, x: &Matrix) -> Result<f64, WishartError> {
        self.check_shape(x.shape())?;
        match factorize(x.clone_owned()) {
            Some(chol_x) => Ok(self.ln_pdf_factor(&chol_x)),
            None => {
                trace!("candidate is not positive definite");
                Ok(f64::NEG_INFINITY)
            }
        }
    }

    /// Log-density of the matrix whose Cholesky factorization is `chol_x`, `-∞` when
    /// the factor has a zero or non-finite diagonal entry.
    pub fn ln_pdf_cholesky(&self, chol_x: &CholeskyFactor) -> Result<f64, WishartError> {
        self.check_shape(chol_x.l_dirty().shape())?;
        if !has_positive_diagonal(chol_x) {
            trace!("factor of candidate is singular");
            return Ok(f64::NEG_INFINITY);
        }
        Ok(self.ln_pdf_factor(chol_x))
    }

    fn ln_pdf_factor(&self, chol_x: &CholeskyFactor) -> f64 {
        // ln p(X) = (ν-d-1)/2 ln|X| - tr(V⁻¹X)/2 - (νd/2) ln 2 - (ν/2) ln|V| - ln Γ_d(ν/2)
        let ln_det_x = ln_det(chol_x);

        // With V = L_V L_Vᵀ and X = L_X L_Xᵀ, tr(V⁻¹X) = ‖L_V⁻¹ L_X‖²_F.
        let l_x = chol_x.l();
        let trace = match self.lower.solve_lower_triangular(&l_x) {
            Some(z) => z.norm_squared(),
            None => return f64::NEG_INFINITY,
        };

        let nu = self.nu;
        let dim = self.dim as f64;
        0.5 * ((nu - dim - 1.0) * ln_det_x - trace - nu * dim * LN_2 - nu * self.ln_det_scale)
            - ln_multivariate_gamma(self.dim, 0.5 * nu)
    }

    /// Draws the Cholesky factorization of a random matrix from the distribution.
    pub fn sample_cholesky<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<CholeskyFactor, WishartError> {
        let l_x = self.bartlett_factor(rng)?;
        Ok(Cholesky::pack_dirty(l_x))
    }

    /// Replaces `out` with a freshly drawn factorization. `out` must be of order `d`.
    pub fn sample_cholesky_into<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        out: &mut CholeskyFactor,
    ) -> Result<(), WishartError> {
        self.check_shape(out.l_dirty().shape())?;
        *out = self.sample_cholesky(rng)?;
        Ok(())
    }

    /// Draws a random symmetric positive-definite matrix from the distribution.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Matrix, WishartError> {
        let l_x = self.bartlett_factor(rng)?;
        Ok(gram_lower(&l_x))
    }

    pub fn sample_into<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        out: &mut Matrix,
    ) -> Result<(), WishartError> {
        self.check_shape(out.shape())?;
        let x = self.sample(rng)?;
        out.copy_from(&x);
        Ok(())
    }

    fn bartlett_factor<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Matrix, WishartError> {
        // Bartlett decomposition: X = L_V A Aᵀ L_Vᵀ where A is lower triangular with
        // A_ii = sqrt(χ²(ν - i)) and A_ij ~ N(0, 1) below the diagonal. L_V A is then
        // lower triangular with a positive diagonal, i.e. the Cholesky factor of X.
        let mut a = Matrix::zeros(self.dim, self.dim);
        for i in 0..self.dim {
            let dof = self.nu - i as f64;
            let chi_sq = ChiSquared::new(dof).map_err(|source| WishartError::SampleDomain {
                row: i,
                dof,
                source: Some(source),
            })?;
            // small dof can underflow to exactly zero, which would leave X singular
            let c = chi_sq.sample(rng);
            if !(c.is_finite() && c > 0.0) {
                debug!(row = i, dof, draw = c, "degenerate chi-squared draw");
                return Err(WishartError::SampleDomain {
                    row: i,
                    dof,
                    source: None,
                });
            }
            a[(i, i)] = c.sqrt();
            for j in 0..i {
                let z: f64 = StandardNormal.sample(rng);
                a[(i, j)] = z;
            }
        }
        Ok(&self.lower * a)
    }

    fn check_shape(&self, found: (usize, usize)) -> Result<(), WishartError> {
        if found != (self.dim, self.dim) {
            return Err(WishartError::DimensionMismatch {
                expected: self.dim,
                found,
            });
        }
        Ok(())
    }
}

/// Lets a [`Wishart`] drive `Rng::sample_iter`. Each draw is a [`Wishart::sample`].
impl Distribution<Result<Matrix, WishartError>> for Wishart {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Matrix, WishartError> {
        Wishart::sample(self, rng)
    }
}

/// Cholesky factorization that also rejects singular matrices, whose factor
/// would carry a zero on its diagonal.
fn factorize(m: Matrix) -> Option<CholeskyFactor> {
    let chol = Cholesky::new(m)?;
    has_positive_diagonal(&chol).then_some(chol)
}

fn has_positive_diagonal(chol: &CholeskyFactor) -> bool {
    chol.l_dirty()
        .diagonal()
        .iter()
        .all(|l_ii| l_ii.is_finite() && *l_ii > 0.0)
}

/// `ln |M|` from the diagonal of its Cholesky factor.
fn ln_det(chol: &CholeskyFactor) -> f64 {
    2.0 * chol
        .l_dirty()
        .diagonal()
        .iter()
        .map(|l_ii| l_ii.ln())
        .sum::<f64>()
}

/// `L Lᵀ`, exactly symmetric.
fn gram_lower(l: &Matrix) -> Matrix {
    let mut m = l * l.transpose();
    m.fill_upper_triangle_with_lower_triangle();
    m
}
