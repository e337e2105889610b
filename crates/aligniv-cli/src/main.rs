use std::path::PathBuf;

use aligniv_core::{AppConfig, Column};
use aligniv_estimate::IvSpec;
use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "aligniv")]
#[command(about = "Topical and sentiment alignment panel with an IV treatment estimate")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Simulate activity, build panel.csv and estimate the treatment effect
    Run {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        model: ModelArgs,
    },
    /// Write the raw simulated tweets.csv and checkins.csv only
    Simulate {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Seed for every random draw in the run
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for output files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// YAML scenario overriding the simulation settings
    #[arg(long)]
    scenario: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ModelArgs {
    /// Outcome column
    #[arg(long, env = "ALIGNIV_OUTCOME", default_value_t = Column::TopicalAlignment)]
    outcome: Column,

    /// Endogenous treatment column
    #[arg(long, env = "ALIGNIV_TREATMENT", default_value_t = Column::Treatment)]
    treatment: Column,

    /// Instrument column
    #[arg(long, env = "ALIGNIV_INSTRUMENT", default_value_t = Column::MonthlyShock)]
    instrument: Column,

    /// Exogenous control column (repeatable)
    #[arg(long = "control", default_values_t = vec![Column::AvgSentiment])]
    controls: Vec<Column>,

    /// Fit without any controls
    #[arg(long, conflicts_with = "controls")]
    no_controls: bool,
}

impl ModelArgs {
    fn into_spec(self) -> IvSpec {
        IvSpec {
            outcome: self.outcome,
            treatment: self.treatment,
            instrument: self.instrument,
            controls: if self.no_controls {
                Vec::new()
            } else {
                self.controls
            },
        }
    }
}

fn apply_overrides(config: &mut AppConfig, common: CommonArgs) -> anyhow::Result<()> {
    if let Some(seed) = common.seed {
        config.analysis.seed = seed;
    }
    if let Some(dir) = common.output_dir {
        config.output_dir = dir;
    }
    if let Some(path) = common.scenario {
        config.simulation = aligniv_core::load_scenario(&path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?;
        config.scenario_path = Some(path);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut config = aligniv_core::load_app_config().context("failed to load configuration")?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Run { common, model }) => {
            apply_overrides(&mut config, common)?;
            let spec = model.into_spec();
            tracing::info!(
                seed = config.analysis.seed,
                output_dir = %config.output_dir.display(),
                "starting run"
            );
            let outputs = aligniv_cli::run(&config, &spec)?;
            println!("{}", outputs.report);
            println!("panel saved to {}", outputs.panel_path.display());
            println!("report saved to {}", outputs.report_path.display());
            println!("results saved to {}", outputs.results_path.display());
        }
        Some(Commands::Simulate { common }) => {
            apply_overrides(&mut config, common)?;
            let (posts, checkins) = aligniv_cli::run_simulate(&config)?;
            println!("posts saved to {}", posts.display());
            println!("check-ins saved to {}", checkins.display());
        }
        None => Cli::command().print_help()?,
    }

    Ok(())
}
