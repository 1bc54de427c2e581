//! Special functions needed by the matrix distributions.

use statrs::function::gamma::ln_gamma;
use std::f64::consts::PI;

/// Natural logarithm of the multivariate gamma function of order `p`
///
/// ```text
/// ln Γ_p(a) = p(p-1)/4 · ln π + Σ_{j=0}^{p-1} ln Γ(a - j/2)
/// ```
///
/// The function is defined for `a > (p - 1) / 2`. Order zero is the empty
/// product and yields `0`.
pub fn ln_multivariate_gamma(p: usize, a: f64) -> f64 {
    let fp = p as f64;
    let constant = 0.25 * fp * (fp - 1.0) * PI.ln();
    (0..p).map(|j| ln_gamma(a - 0.5 * j as f64)).sum::<f64>() + constant
}
