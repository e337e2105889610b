//! First-stage diagnostic: OLS of the treatment on the instrument and
//! controls with classical standard errors.

use std::fmt::Write;

use aligniv_core::{AugmentedPanel, PipelineError, Stage};
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::design::{self, Coefficient, IvSpec, Variable, INTERCEPT};
use crate::linalg::{self, LeastSquares, LinalgError};

const STAGE: Stage = Stage::FirstStage;

/// Instrument strength and the full first-stage coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirstStageResult {
    pub treatment: String,
    pub instrument: String,
    pub n_obs: usize,
    pub df_resid: usize,
    /// Intercept, instrument, then controls in the order given.
    pub coefficients: Vec<Coefficient>,
    pub instrument_coef: f64,
    pub instrument_t: f64,
    pub instrument_p: f64,
    /// Square of `instrument_t`.
    pub f_stat: f64,
    pub r_squared: f64,
}

impl FirstStageResult {
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "First stage: {} on {} (n = {}, df = {})",
            self.treatment, self.instrument, self.n_obs, self.df_resid
        );
        out.push_str(&crate::summary::coefficient_table(&self.coefficients, "t"));
        let _ = writeln!(
            out,
            "instrument coef = {:.6}, t = {:.4}, p = {:.4}, F = {:.4}, R^2 = {:.4}",
            self.instrument_coef, self.instrument_t, self.instrument_p, self.f_stat, self.r_squared
        );
        out
    }
}

pub(crate) struct OlsFit {
    pub coefficients: DVector<f64>,
    pub xtx_inv: DMatrix<f64>,
    pub residuals: DVector<f64>,
}

/// Least squares of `y` on the columns of `x`.
pub(crate) fn fit_ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<OlsFit, LinalgError> {
    let ls = LeastSquares::new(x)?;
    let coefficients = ls.solve(y);
    let residuals = y - x * &coefficients;
    Ok(OlsFit {
        coefficients,
        xtx_inv: ls.gram_inverse(),
        residuals,
    })
}

/// Design matrix with a leading intercept column.
pub(crate) fn with_intercept(
    variables: &[&Variable],
) -> Result<(DMatrix<f64>, Vec<String>), LinalgError> {
    let n = variables.first().map_or(0, |v| v.values.len());
    let ones = vec![1.0; n];
    let mut columns: Vec<&[f64]> = vec![ones.as_slice()];
    columns.extend(variables.iter().map(|v| v.values.as_slice()));
    let names = std::iter::once(INTERCEPT.to_string())
        .chain(variables.iter().map(|v| v.name.clone()))
        .collect();
    Ok((linalg::from_columns(&columns)?, names))
}

pub(crate) fn check_dimensions(n: usize, p: usize, stage: Stage) -> Result<(), PipelineError> {
    if n <= p {
        return Err(PipelineError::numeric(
            stage,
            format!("{n} observations cannot identify {p} coefficients"),
        ));
    }
    Ok(())
}

pub(crate) fn linalg_error(stage: Stage, what: &str, err: &LinalgError) -> PipelineError {
    PipelineError::numeric(stage, format!("{what}: {err}"))
}

#[allow(clippy::cast_precision_loss)]
fn r_squared(y: &[f64], residuals: &[f64]) -> f64 {
    let mean = y.iter().sum::<f64>() / y.len() as f64;
    let tss: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    let rss: f64 = residuals.iter().map(|r| r * r).sum();
    if tss == 0.0 {
        return 0.0;
    }
    1.0 - rss / tss
}

/// Regress the treatment on `[intercept, instrument, controls]`.
///
/// # Errors
///
/// - [`PipelineError::DataIntegrity`] if a selected column is missing or
///   holds a non-finite value.
/// - [`PipelineError::DegenerateInput`] if the instrument is constant.
/// - [`PipelineError::Numeric`] if the design is rank deficient or has no
///   residual degrees of freedom.
pub fn first_stage(
    panel: &AugmentedPanel,
    spec: &IvSpec,
) -> Result<FirstStageResult, PipelineError> {
    let treatment = design::variable(panel, &spec.treatment, STAGE)?;
    let instrument = design::variable(panel, &spec.instrument, STAGE)?;
    let controls = design::controls(panel, spec, STAGE)?;

    if design::is_constant(&instrument.values) {
        return Err(PipelineError::degenerate(
            STAGE,
            format!("instrument '{}' has zero variance", instrument.name),
        ));
    }

    let mut regressors = vec![&instrument];
    regressors.extend(controls.iter());
    let (x, names) =
        with_intercept(&regressors).map_err(|e| linalg_error(STAGE, "building design", &e))?;

    let (n, p) = x.shape();
    check_dimensions(n, p, STAGE)?;

    let fit = fit_ols(&x, &DVector::from_column_slice(&treatment.values))
        .map_err(|e| linalg_error(STAGE, "first-stage design is rank deficient", &e))?;

    let df_resid = n - p;
    #[allow(clippy::cast_precision_loss)]
    let sigma2 = fit.residuals.iter().map(|r| r * r).sum::<f64>() / df_resid as f64;

    #[allow(clippy::cast_precision_loss)]
    let t_dist = StudentsT::new(0.0, 1.0, df_resid as f64)
        .map_err(|e| PipelineError::numeric(STAGE, e.to_string()))?;

    let coefficients: Vec<Coefficient> = names
        .into_iter()
        .zip(fit.coefficients.iter())
        .enumerate()
        .map(|(j, (name, estimate))| {
            let std_error = (sigma2 * fit.xtx_inv[(j, j)]).sqrt();
            let statistic = estimate / std_error;
            Coefficient {
                name,
                estimate: *estimate,
                std_error,
                statistic,
                p_value: 2.0 * t_dist.sf(statistic.abs()),
            }
        })
        .collect();

    // Column 1 is the instrument: intercept comes first.
    let inst = &coefficients[1];
    let result = FirstStageResult {
        treatment: treatment.name,
        instrument: instrument.name,
        n_obs: n,
        df_resid,
        instrument_coef: inst.estimate,
        instrument_t: inst.statistic,
        instrument_p: inst.p_value,
        f_stat: inst.statistic * inst.statistic,
        r_squared: r_squared(&treatment.values, fit.residuals.as_slice()),
        coefficients,
    };

    tracing::info!(
        n_obs = result.n_obs,
        coef = result.instrument_coef,
        t = result.instrument_t,
        f_stat = result.f_stat,
        "fitted first stage"
    );

    Ok(result)
}

#[cfg(test)]
#[path = "ols_test.rs"]
mod tests;
