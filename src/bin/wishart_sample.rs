//! Draws samples from a Wishart distribution with a banded scale matrix and
//! compares their empirical mean with `ν V`.
use anyhow::{Context, Result};
use clap::Parser;
use distmat::Wishart;
use itertools::Itertools;
use nalgebra::DMatrix;
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

const M_SIZE: usize = 5;
const NU: f64 = 7.0;
const SAMPLE_SIZE: usize = 50_000;

#[derive(Parser)]
#[command(name = "wishart-sample", version, about = "Sample a Wishart distribution")]
struct Cli {
    /// Order of the scale matrix
    #[arg(short, long, default_value_t = M_SIZE)]
    dim: usize,

    /// Degrees of freedom, must exceed dim - 1
    #[arg(short, long, default_value_t = NU)]
    nu: f64,

    /// Number of draws
    #[arg(short, long, default_value_t = SAMPLE_SIZE)]
    samples: usize,

    /// Seed for the random generator (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
}

/// Scale matrix with 1 on the diagonal and 0.5, 0.25 on the first two off-diagonals.
fn banded_scale(dim: usize) -> DMatrix<f64> {
    let mut v = DMatrix::zeros(dim, dim);
    v.fill_with_identity();
    v.fill_upper_triangle(0.5, 1);
    v.fill_upper_triangle(0.25, 2);
    v.fill_upper_triangle(0.0, 3);
    v.fill_lower_triangle(0.5, 1);
    v.fill_lower_triangle(0.25, 2);
    v.fill_lower_triangle(0.0, 3);
    v
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let wishart = Wishart::new(banded_scale(cli.dim), cli.nu)
        .context("failed to build the Wishart distribution")?;
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(dim = cli.dim, nu = cli.nu, samples = cli.samples, "sampling");

    let begin = std::time::Instant::now();
    let mut sum = DMatrix::zeros(cli.dim, cli.dim);
    let mut sum_ln_pdf = 0.0;
    let mut x = DMatrix::zeros(cli.dim, cli.dim);
    for _ in 0..cli.samples {
        wishart.sample_into(&mut rng, &mut x)?;
        sum_ln_pdf += wishart.ln_pdf(&x)?;
        sum += &x;
    }
    let elapsed = begin.elapsed();

    let n = cli.samples.max(1) as f64;
    let empirical = sum / n;
    let mean = wishart.mean();
    let max_dev = (0..cli.dim)
        .cartesian_product(0..cli.dim)
        .map(|(i, j)| (empirical[(i, j)] - mean[(i, j)]).abs())
        .fold(0.0, f64::max);

    println!("Took {} seconds", elapsed.as_secs_f32());
    println!("Expected mean (nu * V): {mean:.3}");
    println!("Empirical mean: {empirical:.3}");
    println!("Largest entry-wise deviation: {max_dev:.4}");
    println!("Average log density of the draws: {:.3}", sum_ln_pdf / n);
    Ok(())
}
