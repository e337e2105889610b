//! Raw simulation output: `tweets.csv` and `checkins.csv`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use aligniv_core::csv::join_fields;
use aligniv_core::CheckinEvent;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::SimError;
use crate::generator::{SimulatedPost, SyntheticData};

pub const POSTS_FILE: &str = "tweets.csv";
pub const CHECKINS_FILE: &str = "checkins.csv";

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Write posts as `user_id,timestamp,text,true_topic`.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_posts<W: Write>(out: &mut W, posts: &[SimulatedPost]) -> std::io::Result<()> {
    writeln!(out, "user_id,timestamp,text,true_topic")?;
    for p in posts {
        let line = join_fields([
            p.post.user_id.as_str(),
            format_timestamp(p.post.timestamp).as_str(),
            p.post.text.as_str(),
            p.true_topic,
        ]);
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Write check-ins as `user_id,timestamp,category,count`.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_checkins<W: Write>(out: &mut W, checkins: &[CheckinEvent]) -> std::io::Result<()> {
    writeln!(out, "user_id,timestamp,category,count")?;
    for c in checkins {
        let line = join_fields([
            c.user_id.clone(),
            format_timestamp(c.timestamp),
            c.category.clone(),
            c.count.to_string(),
        ]);
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn write_file<F>(path: &Path, what: &'static str, body: F) -> Result<(), SimError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let wrap = |source| SimError::Write { what, source };
    let file = File::create(path).map_err(wrap)?;
    let mut writer = BufWriter::new(file);
    body(&mut writer).map_err(wrap)?;
    writer.flush().map_err(wrap)
}

/// Write both raw logs into `dir`, creating it if needed. Returns the paths
/// written, posts first.
///
/// # Errors
///
/// Returns [`SimError::Write`] if the directory or either file cannot be
/// written.
pub fn write_synthetic_data(
    dir: &Path,
    data: &SyntheticData,
) -> Result<(PathBuf, PathBuf), SimError> {
    std::fs::create_dir_all(dir).map_err(|source| SimError::Write {
        what: "output directory",
        source,
    })?;

    let posts_path = dir.join(POSTS_FILE);
    write_file(&posts_path, POSTS_FILE, |w| write_posts(w, &data.posts))?;

    let checkins_path = dir.join(CHECKINS_FILE);
    write_file(&checkins_path, CHECKINS_FILE, |w| {
        write_checkins(w, &data.checkins)
    })?;

    tracing::info!(
        posts = %posts_path.display(),
        checkins = %checkins_path.display(),
        "wrote raw simulation logs"
    );
    Ok((posts_path, checkins_path))
}

#[cfg(test)]
mod tests {
    use aligniv_core::Post;
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn posts_csv_quotes_commas() {
        let posts = vec![SimulatedPost {
            post: Post {
                user_id: "user_0".to_string(),
                timestamp: Utc.with_ymd_and_hms(2010, 1, 5, 0, 0, 0).unwrap(),
                text: "rain, again".to_string(),
            },
            true_topic: "travel",
        }];
        let mut buf = Vec::new();
        write_posts(&mut buf, &posts).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "user_id,timestamp,text,true_topic\nuser_0,2010-01-05T00:00:00Z,\"rain, again\",travel\n"
        );
    }

    #[test]
    fn checkins_csv_has_one_line_per_event() {
        let checkins = vec![
            CheckinEvent {
                user_id: "user_1".to_string(),
                timestamp: Utc.with_ymd_and_hms(2010, 1, 31, 0, 0, 0).unwrap(),
                category: "gym".to_string(),
                count: 3,
            },
            CheckinEvent {
                user_id: "user_1".to_string(),
                timestamp: Utc.with_ymd_and_hms(2010, 1, 31, 0, 0, 0).unwrap(),
                category: "shop".to_string(),
                count: 12,
            },
        ];
        let mut buf = Vec::new();
        write_checkins(&mut buf, &checkins).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "user_1,2010-01-31T00:00:00Z,shop,12");
    }
}
