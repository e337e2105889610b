use std::fmt::Write;

use crate::design::Coefficient;

/// Fixed-width coefficient table. `stat_label` is `t` or `z`.
#[must_use]
pub fn coefficient_table(coefficients: &[Coefficient], stat_label: &str) -> String {
    let width = coefficients
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0)
        .max(8);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$} {:>12} {:>12} {:>10} {:>10}",
        "", "estimate", "std.err", stat_label, "p-value"
    );
    for c in coefficients {
        let _ = writeln!(
            out,
            "{:<width$} {:>12.6} {:>12.6} {:>10.4} {:>10.4}",
            c.name, c.estimate, c.std_error, c.statistic, c.p_value
        );
    }
    out
}
