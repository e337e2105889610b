//! Text report and `results.json`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use aligniv_core::{AppConfig, AugmentedPanel, Month};
use aligniv_estimate::{FirstStageResult, IvResult, IvSpec};
use serde::Serialize;

use crate::pipeline::PanelArtifacts;

const HISTOGRAM_BINS: usize = 10;
const HISTOGRAM_WIDTH: usize = 40;

/// Five-number summary plus mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Distribution {
    /// `None` for an empty input.
    #[must_use]
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        #[allow(clippy::cast_precision_loss)]
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        Some(Self {
            count: sorted.len(),
            mean,
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Mean topical and sentiment alignment for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub month: Month,
    pub users: usize,
    pub topical_alignment: f64,
    pub sentiment_alignment: f64,
    pub monthly_shock: f64,
}

#[must_use]
pub fn monthly_trend(panel: &AugmentedPanel) -> Vec<MonthlyTrend> {
    let mut acc: BTreeMap<Month, (usize, f64, f64, f64)> = BTreeMap::new();
    for r in &panel.rows {
        let e = acc.entry(r.row.month).or_insert((0, 0.0, 0.0, r.monthly_shock));
        e.0 += 1;
        e.1 += r.row.topical_alignment;
        e.2 += r.row.sentiment_alignment;
    }
    acc.into_iter()
        .map(|(month, (users, topical, sentiment, shock))| {
            #[allow(clippy::cast_precision_loss)]
            let n = users as f64;
            MonthlyTrend {
                month,
                users,
                topical_alignment: topical / n,
                sentiment_alignment: sentiment / n,
                monthly_shock: shock,
            }
        })
        .collect()
}

/// Equal-width bin counts over `[min, max]`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn histogram(values: &[f64], min: f64, max: f64) -> Vec<usize> {
    let mut bins = vec![0; HISTOGRAM_BINS];
    let width = (max - min) / HISTOGRAM_BINS as f64;
    for v in values {
        let idx = if width > 0.0 {
            (((v - min) / width) as usize).min(HISTOGRAM_BINS - 1)
        } else {
            0
        };
        bins[idx] += 1;
    }
    bins
}

fn write_distribution(out: &mut String, values: &[f64]) {
    let Some(d) = Distribution::of(values) else {
        let _ = writeln!(out, "  (no rows)");
        return;
    };
    let _ = writeln!(
        out,
        "  n = {}, mean = {:.4}, min = {:.4}, q1 = {:.4}, median = {:.4}, q3 = {:.4}, max = {:.4}",
        d.count, d.mean, d.min, d.q1, d.median, d.q3, d.max
    );
    let bins = histogram(values, d.min, d.max);
    let peak = bins.iter().copied().max().unwrap_or(0).max(1);
    #[allow(clippy::cast_precision_loss)]
    let step = (d.max - d.min) / HISTOGRAM_BINS as f64;
    for (i, count) in bins.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let lo = d.min + step * i as f64;
        let bar = "#".repeat(count * HISTOGRAM_WIDTH / peak);
        let _ = writeln!(out, "  {lo:>8.4} | {bar} {count}");
    }
}

/// Human-readable run report.
#[must_use]
pub fn render_report(
    config: &AppConfig,
    spec: &IvSpec,
    artifacts: &PanelArtifacts,
    result: &IvResult,
) -> String {
    let panel = &artifacts.panel;
    let users: BTreeSet<&str> = panel.rows.iter().map(|r| r.row.user_id.as_str()).collect();
    let mut out = String::new();

    let _ = writeln!(out, "aligniv run report");
    let _ = writeln!(out, "==================");
    let _ = writeln!(out, "seed:               {}", config.analysis.seed);
    let _ = writeln!(out, "posts:              {}", artifacts.posts);
    let _ = writeln!(out, "check-in records:   {}", artifacts.checkins);
    let _ = writeln!(out, "panel rows:         {}", panel.rows.len());
    let _ = writeln!(out, "users:              {}", users.len());
    let _ = writeln!(out, "months:             {}", artifacts.instrument.len());
    let _ = writeln!(out, "event categories:   {}", panel.categories.join(", "));
    let _ = writeln!(
        out,
        "influencers:        {}",
        artifacts.assignment.influencers().join(", ")
    );
    let spikes: Vec<String> = artifacts
        .instrument
        .spike_months()
        .iter()
        .map(ToString::to_string)
        .collect();
    let _ = writeln!(out, "shock spike months: {}", spikes.join(", "));
    let controls: Vec<String> = spec.controls.iter().map(ToString::to_string).collect();
    let _ = writeln!(
        out,
        "model:              {} ~ {} [{}], instrument {}",
        spec.outcome,
        spec.treatment,
        controls.join(", "),
        spec.instrument
    );

    let _ = writeln!(out, "\nTopical alignment distribution");
    let topical: Vec<f64> = panel.rows.iter().map(|r| r.row.topical_alignment).collect();
    write_distribution(&mut out, &topical);

    let _ = writeln!(out, "\nMonthly trend");
    let _ = writeln!(
        out,
        "  {:<10} {:>6} {:>10} {:>10} {:>10}",
        "month", "users", "topical", "sentiment", "shock"
    );
    for t in monthly_trend(panel) {
        let _ = writeln!(
            out,
            "  {:<10} {:>6} {:>10.4} {:>10.4} {:>10.4}",
            t.month.to_string(),
            t.users,
            t.topical_alignment,
            t.sentiment_alignment,
            t.monthly_shock
        );
    }

    let _ = writeln!(out);
    out.push_str(&result.first_stage.summary());
    let _ = writeln!(out);
    out.push_str(&result.summary());
    out
}

/// Serialized form of a completed run.
#[derive(Debug, Serialize)]
pub struct ResultsFile<'a> {
    pub seed: u64,
    pub outcome: String,
    pub treatment: String,
    pub instrument: String,
    pub controls: Vec<String>,
    pub panel_rows: usize,
    pub influencers: &'a [String],
    pub topical_alignment: Option<Distribution>,
    pub monthly_trend: Vec<MonthlyTrend>,
    pub first_stage: &'a FirstStageResult,
    pub iv: &'a IvResult,
}

impl<'a> ResultsFile<'a> {
    #[must_use]
    pub fn new(
        config: &AppConfig,
        spec: &IvSpec,
        artifacts: &'a PanelArtifacts,
        result: &'a IvResult,
    ) -> Self {
        let topical: Vec<f64> = artifacts
            .panel
            .rows
            .iter()
            .map(|r| r.row.topical_alignment)
            .collect();
        Self {
            seed: config.analysis.seed,
            outcome: spec.outcome.to_string(),
            treatment: spec.treatment.to_string(),
            instrument: spec.instrument.to_string(),
            controls: spec.controls.iter().map(ToString::to_string).collect(),
            panel_rows: artifacts.panel.rows.len(),
            influencers: artifacts.assignment.influencers(),
            topical_alignment: Distribution::of(&topical),
            monthly_trend: monthly_trend(&artifacts.panel),
            first_stage: &result.first_stage,
            iv: result,
        }
    }
}
