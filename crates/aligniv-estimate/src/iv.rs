//! Two-stage least squares with heteroskedasticity-robust (HC0) standard
//! errors.

use std::fmt::Write;

use aligniv_core::{AugmentedPanel, PipelineError, Stage};
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

use crate::design::{self, Coefficient, IvSpec};
use crate::linalg::LeastSquares;
use crate::ols::{check_dimensions, first_stage, linalg_error, with_intercept, FirstStageResult};

const STAGE: Stage = Stage::TwoStageLeastSquares;

/// First-stage coefficients smaller than this, after scaling by the
/// instrument and treatment spreads, leave the model unidentified.
const IDENTIFICATION_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IvResult {
    pub outcome: String,
    pub treatment: String,
    pub instrument: String,
    pub n_obs: usize,
    /// Intercept, controls in the order given, then the treatment.
    pub coefficients: Vec<Coefficient>,
    pub covariance: &'static str,
    pub first_stage: FirstStageResult,
}

impl IvResult {
    /// The treatment effect row.
    #[must_use]
    pub fn treatment_effect(&self) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == self.treatment)
    }

    #[must_use]
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }

    /// Human-readable estimation summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "IV-2SLS Estimation Summary");
        let _ = writeln!(out, "Dep. variable: {}", self.outcome);
        let _ = writeln!(out, "Endogenous:    {}", self.treatment);
        let _ = writeln!(out, "Instrument:    {}", self.instrument);
        let _ = writeln!(out, "Observations:  {}", self.n_obs);
        let _ = writeln!(out, "Covariance:    {}", self.covariance);
        out.push_str(&crate::summary::coefficient_table(&self.coefficients, "z"));
        out
    }
}

/// Estimate `outcome ~ [intercept, controls, treatment]` instrumenting the
/// treatment with the instrument.
///
/// Runs [`first_stage`] first and refuses to continue when the instrument
/// does not move the treatment.
///
/// # Errors
///
/// - Any error from [`first_stage`].
/// - [`PipelineError::Identification`] if the first-stage instrument
///   coefficient is numerically zero.
/// - [`PipelineError::Numeric`] if either design is rank deficient.
pub fn two_stage_least_squares(
    panel: &AugmentedPanel,
    spec: &IvSpec,
) -> Result<IvResult, PipelineError> {
    let first = first_stage(panel, spec)?;

    let outcome = design::variable(panel, &spec.outcome, STAGE)?;
    let treatment = design::variable(panel, &spec.treatment, STAGE)?;
    let instrument = design::variable(panel, &spec.instrument, STAGE)?;
    let controls = design::controls(panel, spec, STAGE)?;

    let spread_d = design::std_dev(&treatment.values);
    let spread_z = design::std_dev(&instrument.values);
    if spread_d == 0.0 || (first.instrument_coef * spread_z / spread_d).abs() < IDENTIFICATION_TOLERANCE
    {
        return Err(PipelineError::identification(
            STAGE,
            format!(
                "first-stage coefficient on '{}' is {:e}; '{}' is unidentified",
                instrument.name, first.instrument_coef, treatment.name
            ),
        ));
    }

    let mut structural: Vec<&design::Variable> = controls.iter().collect();
    structural.push(&treatment);
    let mut instruments: Vec<&design::Variable> = controls.iter().collect();
    instruments.push(&instrument);

    let (x, names) =
        with_intercept(&structural).map_err(|e| linalg_error(STAGE, "building design", &e))?;
    let (z, _) = with_intercept(&instruments)
        .map_err(|e| linalg_error(STAGE, "building instruments", &e))?;

    let (n, p) = x.shape();
    check_dimensions(n, p, STAGE)?;

    let fit = fit_2sls(&x, &z, &DVector::from_column_slice(&outcome.values))?;

    let std_normal =
        Normal::new(0.0, 1.0).map_err(|e| PipelineError::numeric(STAGE, e.to_string()))?;
    let coefficients: Vec<Coefficient> = names
        .into_iter()
        .zip(fit.coefficients.iter())
        .enumerate()
        .map(|(j, (name, estimate))| {
            let std_error = fit.covariance[(j, j)].max(0.0).sqrt();
            let statistic = estimate / std_error;
            Coefficient {
                name,
                estimate: *estimate,
                std_error,
                statistic,
                p_value: 2.0 * std_normal.sf(statistic.abs()),
            }
        })
        .collect();

    let result = IvResult {
        outcome: outcome.name,
        treatment: treatment.name,
        instrument: instrument.name,
        n_obs: n,
        coefficients,
        covariance: "robust (HC0)",
        first_stage: first,
    };

    if let Some(effect) = result.treatment_effect() {
        tracing::info!(
            n_obs = n,
            estimate = effect.estimate,
            std_error = effect.std_error,
            p_value = effect.p_value,
            "fitted 2SLS"
        );
    }

    Ok(result)
}

struct IvFit {
    coefficients: DVector<f64>,
    covariance: DMatrix<f64>,
}

/// `X_hat = P_Z X`, `b = (X_hat'X_hat)^-1 X_hat'y`, with the HC0 sandwich
/// built from structural residuals `y - X b`.
fn fit_2sls(
    x: &DMatrix<f64>,
    z: &DMatrix<f64>,
    y: &DVector<f64>,
) -> Result<IvFit, PipelineError> {
    let instruments = LeastSquares::new(z)
        .map_err(|e| linalg_error(STAGE, "instrument matrix is rank deficient", &e))?;
    let x_hat = instruments.project(x);
    let projected = LeastSquares::new(&x_hat)
        .map_err(|e| linalg_error(STAGE, "projected design is rank deficient", &e))?;

    let coefficients = projected.solve(y);
    let residuals = y - x * &coefficients;

    let bread = projected.gram_inverse();
    let weighted = DMatrix::from_fn(x_hat.nrows(), x_hat.ncols(), |i, j| {
        x_hat[(i, j)] * residuals[i] * residuals[i]
    });
    let meat = x_hat.tr_mul(&weighted);
    let covariance = &bread * meat * &bread;

    Ok(IvFit {
        coefficients,
        covariance,
    })
}

#[cfg(test)]
#[path = "iv_test.rs"]
mod tests;
