//! `panel.csv` writer.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use aligniv_core::csv::join_fields;
use aligniv_core::AugmentedPanel;

pub const PANEL_FILE: &str = "panel.csv";

/// Header row: fixed leading columns, sorted categories, then the
/// treatment block.
#[must_use]
pub fn panel_header(categories: &[String]) -> Vec<String> {
    let leading = [
        "user_id",
        "month",
        "topical_alignment",
        "avg_sentiment",
        "community_sentiment",
        "sentiment_alignment",
    ];
    let trailing = [
        "influencer",
        "influencer_topical_alignment",
        "monthly_shock",
        "treatment",
    ];
    leading
        .iter()
        .map(|s| (*s).to_string())
        .chain(categories.iter().cloned())
        .chain(trailing.iter().map(|s| (*s).to_string()))
        .collect()
}

/// Write the augmented panel, one line per row in panel order. Floats use
/// the shortest representation that round-trips.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_panel<W: Write>(out: &mut W, panel: &AugmentedPanel) -> io::Result<()> {
    writeln!(out, "{}", join_fields(panel_header(&panel.categories)))?;
    for r in &panel.rows {
        let mut fields = vec![
            r.row.user_id.clone(),
            r.row.month.to_string(),
            r.row.topical_alignment.to_string(),
            r.row.avg_sentiment.to_string(),
            r.row.community_sentiment.to_string(),
            r.row.sentiment_alignment.to_string(),
        ];
        fields.extend(r.row.event_counts.iter().map(u64::to_string));
        fields.extend([
            r.influencer.clone(),
            r.influencer_topical_alignment.to_string(),
            r.monthly_shock.to_string(),
            r.treatment.to_string(),
        ]);
        writeln!(out, "{}", join_fields(fields))?;
    }
    Ok(())
}

/// Write `panel.csv` at `path`.
///
/// # Errors
///
/// Returns any I/O error from creating or writing the file.
pub fn write_panel_csv(path: &Path, panel: &AugmentedPanel) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_panel(&mut writer, panel)?;
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = panel.rows.len(), "wrote panel");
    Ok(())
}
