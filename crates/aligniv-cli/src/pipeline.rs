//! End-to-end run: simulate, score, assemble, augment, estimate, report.

use std::path::{Path, PathBuf};

use aligniv_core::{AppConfig, AugmentedPanel, PipelineError};
use aligniv_estimate::{two_stage_least_squares, IvResult, IvSpec};
use aligniv_panel::{InfluencerAssignment, InstrumentSeries, PANEL_FILE};
use aligniv_sim::{KeywordTopicModel, SyntheticData};
use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::report::{render_report, ResultsFile};

pub const REPORT_FILE: &str = "report.txt";
pub const RESULTS_FILE: &str = "results.json";

/// One generator per randomized stage, all derived from the run seed.
pub struct StageRngs {
    pub simulation: StdRng,
    pub influencers: StdRng,
    pub instrument: StdRng,
}

impl StageRngs {
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        let mut master = StdRng::seed_from_u64(seed);
        Self {
            simulation: StdRng::from_rng(&mut master),
            influencers: StdRng::from_rng(&mut master),
            instrument: StdRng::from_rng(&mut master),
        }
    }
}

/// Everything produced before estimation.
#[derive(Debug, Clone)]
pub struct PanelArtifacts {
    pub panel: AugmentedPanel,
    pub assignment: InfluencerAssignment,
    pub instrument: InstrumentSeries,
    pub posts: usize,
    pub checkins: usize,
}

#[derive(Debug, Clone)]
pub struct RunOutputs {
    pub panel_path: PathBuf,
    pub report_path: PathBuf,
    pub results_path: PathBuf,
    pub report: String,
}

/// Generate the synthetic population for `config`.
///
/// # Errors
///
/// Returns an error if the simulation parameters are invalid.
pub fn simulate(config: &AppConfig, rngs: &mut StageRngs) -> anyhow::Result<SyntheticData> {
    aligniv_sim::generate(&config.simulation, &mut rngs.simulation)
        .context("failed to simulate synthetic activity")
}

/// Write the raw simulated logs into the output directory.
///
/// # Errors
///
/// Returns an error if simulation fails or a file cannot be written.
pub fn run_simulate(config: &AppConfig) -> anyhow::Result<(PathBuf, PathBuf)> {
    let mut rngs = StageRngs::from_seed(config.analysis.seed);
    let data = simulate(config, &mut rngs)?;
    aligniv_sim::write_synthetic_data(&config.output_dir, &data)
        .context("failed to write simulated logs")
}

/// Run every stage up to and including the augmented panel.
///
/// # Errors
///
/// Returns an error naming the stage that failed.
pub fn build_panel(config: &AppConfig) -> anyhow::Result<PanelArtifacts> {
    let mut rngs = StageRngs::from_seed(config.analysis.seed);
    let data = simulate(config, &mut rngs)?;
    panel_from_data(config, &data, &mut rngs)
}

/// Run the panel stages over already generated data.
///
/// # Errors
///
/// Returns an error naming the stage that failed.
pub fn panel_from_data(
    config: &AppConfig,
    data: &SyntheticData,
    rngs: &mut StageRngs,
) -> anyhow::Result<PanelArtifacts> {
    let posts = data.posts();

    let topic_observations = KeywordTopicModel::from_templates().infer_posts(&posts);
    let topical = aligniv_panel::compute_topical_alignment(&topic_observations)
        .context("topical alignment failed")?;

    let sentiment_observations = aligniv_sentiment::score_posts(&posts);
    let sentiment = aligniv_sentiment::compute_sentiment_alignment(&sentiment_observations)
        .context("sentiment alignment failed")?;

    let panel = aligniv_panel::assemble_panel(
        &topical,
        &sentiment,
        &data.checkins,
        config.analysis.max_join_drop_fraction,
    )
    .context("panel assembly failed")?;

    let assignment = aligniv_panel::assign_influencers(
        &panel,
        config.analysis.influencer_fraction,
        &mut rngs.influencers,
    )
    .context("influencer assignment failed")?;
    let instrument =
        InstrumentSeries::build(panel.rows.iter().map(|r| r.month), &mut rngs.instrument)
            .context("instrument construction failed")?;
    let augmented = aligniv_panel::augment_panel(
        &panel,
        &assignment,
        &instrument,
        config.analysis.shock_strength,
    )
    .context("treatment synthesis failed")?;

    Ok(PanelArtifacts {
        panel: augmented,
        assignment,
        instrument,
        posts: posts.len(),
        checkins: data.checkins.len(),
    })
}

/// First stage and 2SLS on the augmented panel.
///
/// # Errors
///
/// Returns the [`PipelineError`] from whichever regression failed; a
/// constant instrument fails in the first stage before 2SLS is attempted.
pub fn estimate(panel: &AugmentedPanel, spec: &IvSpec) -> Result<IvResult, PipelineError> {
    two_stage_least_squares(panel, spec)
}

fn write_text(path: &Path, contents: &str) -> anyhow::Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Full run. `panel.csv` is written before estimation so it survives an
/// estimation failure.
///
/// # Errors
///
/// Returns an error naming the failing stage or output file.
pub fn run(config: &AppConfig, spec: &IvSpec) -> anyhow::Result<RunOutputs> {
    let artifacts = build_panel(config)?;

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;
    let panel_path = config.output_dir.join(PANEL_FILE);
    aligniv_panel::write_panel_csv(&panel_path, &artifacts.panel)
        .with_context(|| format!("failed to write {}", panel_path.display()))?;

    let result = estimate(&artifacts.panel, spec).context("estimation failed")?;

    let report = render_report(config, spec, &artifacts, &result);
    let report_path = config.output_dir.join(REPORT_FILE);
    write_text(&report_path, &report)?;

    let results = ResultsFile::new(config, spec, &artifacts, &result);
    let json = serde_json::to_string_pretty(&results).context("failed to serialize results")?;
    let results_path = config.output_dir.join(RESULTS_FILE);
    write_text(&results_path, &json)?;

    tracing::info!(
        panel = %panel_path.display(),
        report = %report_path.display(),
        results = %results_path.display(),
        "run complete"
    );

    Ok(RunOutputs {
        panel_path,
        report_path,
        results_path,
        report,
    })
}
