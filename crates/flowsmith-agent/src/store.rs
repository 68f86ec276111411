//! On-disk persistence of creation reports.
//!
//! Each successful run is written once, as pretty-printed JSON, to
//! `{dir}/{UTC timestamp}_{workflow name}.json`.  Files are opened with
//! `create_new`, so an existing report is never overwritten; on a name
//! collision a numeric suffix is appended.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{AgentError, Result};
use crate::orchestrator::CreationReport;

/// Directory results are written to when nothing else is configured.
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Name used when a workflow name sanitizes to nothing.
const FALLBACK_FILE_STEM: &str = "workflow";

/// Upper bound on collision suffixes tried before giving up.
const MAX_SUFFIX: u32 = 1000;

/// Writes [`CreationReport`]s into a directory.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `report`, returning the path written.
    pub async fn save(&self, report: &CreationReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AgentError::Persistence {
                path: self.dir.clone(),
                reason: e.to_string(),
            })?;

        let body = serde_json::to_vec_pretty(report)?;
        let stem = file_stem(report.timestamp, &report.workflow.name);

        for attempt in 0..=MAX_SUFFIX {
            let file_name = match attempt {
                0 => format!("{stem}.json"),
                n => format!("{stem}_{n}.json"),
            };
            let path = self.dir.join(file_name);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => file,
                Err(e) if e.kind() == IoErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "result file exists, trying next suffix");
                    continue;
                }
                Err(e) => {
                    return Err(AgentError::Persistence {
                        path,
                        reason: e.to_string(),
                    });
                }
            };

            file.write_all(&body).await.map_err(|e| AgentError::Persistence {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            file.flush().await.map_err(|e| AgentError::Persistence {
                path: path.clone(),
                reason: e.to_string(),
            })?;

            info!(path = %path.display(), bytes = body.len(), "creation report saved");
            return Ok(path);
        }

        Err(AgentError::Persistence {
            path: self.dir.join(format!("{stem}.json")),
            reason: format!("no free file name after {MAX_SUFFIX} attempts"),
        })
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new(DEFAULT_RESULTS_DIR)
    }
}

/// `{%Y%m%d_%H%M%S_%3f}_{safe name}`.
fn file_stem(timestamp: DateTime<Utc>, workflow_name: &str) -> String {
    format!(
        "{}_{}",
        timestamp.format("%Y%m%d_%H%M%S_%3f"),
        safe_name(workflow_name)
    )
}

/// Keep alphanumerics, spaces, `-` and `_`; trim; spaces become `_`.
pub fn safe_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let trimmed = kept.trim();
    if trimmed.is_empty() {
        FALLBACK_FILE_STEM.to_owned()
    } else {
        trimmed.replace(' ', "_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn safe_name_strips_punctuation() {
        assert_eq!(safe_name("Slack: alerts / prod!"), "Slack_alerts__prod");
        assert_eq!(safe_name("  Погода в таблицу  "), "Погода_в_таблицу");
        assert_eq!(safe_name("???"), "workflow");
        assert_eq!(safe_name(""), "workflow");
    }

    #[test]
    fn stem_has_millisecond_timestamp() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 14, 5, 9).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(file_stem(ts, "My Flow"), "20260301_140509_042_My_Flow");
    }

    #[test]
    fn default_dir_is_results() {
        assert_eq!(ResultStore::default().dir(), Path::new("results"));
    }
}
