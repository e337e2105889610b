//! Seeded draws from continuous and discrete distributions.
//!
//! Samplers wrap `rand_distr` distributions and hold no random state of
//! their own; every draw comes from the caller's generator.

use rand::Rng;
use rand_distr::{Distribution, Gamma, Normal, Poisson};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid {distribution} parameters: {reason}")]
pub struct SamplingError {
    pub distribution: &'static str,
    pub reason: String,
}

impl SamplingError {
    fn new(distribution: &'static str, reason: impl std::fmt::Display) -> Self {
        Self {
            distribution,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NormalSampler(Normal<f64>);

impl NormalSampler {
    /// # Errors
    ///
    /// Returns [`SamplingError`] if `std_dev` is negative or either
    /// parameter is not finite.
    pub fn new(mean: f64, std_dev: f64) -> Result<Self, SamplingError> {
        if !mean.is_finite() || !std_dev.is_finite() {
            return Err(SamplingError::new("normal", "parameters must be finite"));
        }
        Normal::new(mean, std_dev)
            .map(Self)
            .map_err(|e| SamplingError::new("normal", e))
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.0.sample(rng)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PoissonSampler(Poisson<f64>);

impl PoissonSampler {
    /// # Errors
    ///
    /// Returns [`SamplingError`] if `lambda` is not positive and finite.
    pub fn new(lambda: f64) -> Result<Self, SamplingError> {
        Poisson::new(lambda)
            .map(Self)
            .map_err(|e| SamplingError::new("poisson", e))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        // Draws are non-negative whole numbers carried as f64.
        self.0.sample(rng) as u64
    }
}

/// Symmetric Dirichlet over `dim` categories, drawn as normalized
/// Gamma(`alpha`, 1) variates.
#[derive(Debug, Clone, Copy)]
pub struct DirichletSampler {
    gamma: Gamma<f64>,
    dim: usize,
}

impl DirichletSampler {
    /// # Errors
    ///
    /// Returns [`SamplingError`] if `alpha` is not positive or `dim` is zero.
    pub fn new(alpha: f64, dim: usize) -> Result<Self, SamplingError> {
        if dim == 0 {
            return Err(SamplingError::new(
                "dirichlet",
                "dimension must be at least 1",
            ));
        }
        let gamma = Gamma::new(alpha, 1.0).map_err(|e| SamplingError::new("dirichlet", e))?;
        Ok(Self { gamma, dim })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        let draws: Vec<f64> = (0..self.dim).map(|_| self.gamma.sample(rng)).collect();
        match crate::safe_renormalize(&draws) {
            crate::SafeNormalized::Normalized(weights) => weights,
            crate::SafeNormalized::Degenerate => {
                #[allow(clippy::cast_precision_loss)]
                let uniform = 1.0 / self.dim as f64;
                vec![uniform; self.dim]
            }
        }
    }
}
