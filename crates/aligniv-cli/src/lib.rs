//! Orchestration for the `aligniv` binary.

pub mod pipeline;
pub mod report;

pub use pipeline::{
    build_panel, estimate, panel_from_data, run, run_simulate, simulate, PanelArtifacts,
    RunOutputs, StageRngs, REPORT_FILE, RESULTS_FILE,
};
