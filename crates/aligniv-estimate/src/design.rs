//! Variable selection for the regressions and the coefficient record they
//! report.

use aligniv_core::{AugmentedPanel, Column, PipelineError, Stage};
use serde::Serialize;

/// Name used for the intercept term in coefficient tables.
pub const INTERCEPT: &str = "const";

/// Which panel columns play which role in the IV model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IvSpec {
    pub outcome: Column,
    pub treatment: Column,
    pub instrument: Column,
    pub controls: Vec<Column>,
}

impl Default for IvSpec {
    fn default() -> Self {
        Self {
            outcome: Column::TopicalAlignment,
            treatment: Column::Treatment,
            instrument: Column::MonthlyShock,
            controls: vec![Column::AvgSentiment],
        }
    }
}

/// One row of a coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    /// t-statistic for OLS, z-statistic for 2SLS.
    pub statistic: f64,
    pub p_value: f64,
}

/// A named numeric column pulled from the panel.
pub(crate) struct Variable {
    pub name: String,
    pub values: Vec<f64>,
}

/// Extract `column` from `panel`, failing on a missing category or a
/// non-finite value.
pub(crate) fn variable(
    panel: &AugmentedPanel,
    column: &Column,
    stage: Stage,
) -> Result<Variable, PipelineError> {
    let values = panel.column(column).ok_or_else(|| {
        PipelineError::data_integrity(stage, format!("missing required column '{column}'"))
    })?;
    if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
        let row = &panel.rows[idx].row;
        return Err(PipelineError::data_integrity(
            stage,
            format!(
                "non-finite value in column '{column}' for user {} in month {}",
                row.user_id, row.month
            ),
        ));
    }
    Ok(Variable {
        name: column.to_string(),
        values,
    })
}

pub(crate) fn controls(
    panel: &AugmentedPanel,
    spec: &IvSpec,
    stage: Stage,
) -> Result<Vec<Variable>, PipelineError> {
    spec.controls
        .iter()
        .map(|c| variable(panel, c, stage))
        .collect()
}

pub(crate) fn is_constant(values: &[f64]) -> bool {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    values.is_empty() || max - min == 0.0
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
}
