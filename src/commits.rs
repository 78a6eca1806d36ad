//! Per-commit metadata export.
//!
//! Unlike the metrics pass, every commit is kept (merges included) and the
//! file list is not narrowed by the source filter.

use chrono::{DateTime, Utc};
use faultline_core::{FaultlineError, RunReport, Skipped};
use faultline_history::{CancelToken, Commit};
use serde::Serialize;

/// Metadata of one commit, with change totals against its first parent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    pub hash: String,
    pub author_name: String,
    pub author_email: String,
    pub authored_date: DateTime<Utc>,
    pub committer_name: String,
    pub committer_email: String,
    pub committed_date: DateTime<Utc>,
    /// Message with surrounding whitespace trimmed.
    pub message: String,
    pub parent_hashes: Vec<String>,
    pub is_merge: bool,
    /// Touched paths in diff order; deletions are listed by their old path.
    pub files_changed: Vec<String>,
    pub lines_added: u64,
    pub lines_deleted: u64,
}

impl From<&Commit> for CommitRecord {
    fn from(commit: &Commit) -> Self {
        let header = &commit.header;
        Self {
            hash: header.id.clone(),
            author_name: header.author.name.clone(),
            author_email: header.author.email.clone(),
            authored_date: DateTime::from_timestamp(header.timestamp, 0).unwrap_or_default(),
            committer_name: header.committer.name.clone(),
            committer_email: header.committer.email.clone(),
            committed_date: DateTime::from_timestamp(header.commit_time, 0).unwrap_or_default(),
            message: header.message.trim().to_string(),
            parent_hashes: header.parents.clone(),
            is_merge: header.is_merge(),
            files_changed: commit.changes.iter().map(|c| c.path.clone()).collect(),
            lines_added: commit.changes.iter().map(|c| c.lines_added).sum(),
            lines_deleted: commit.changes.iter().map(|c| c.lines_deleted).sum(),
        }
    }
}

/// Export every commit of `commits`, oldest first.
///
/// Commits the stream cannot load are listed as skipped under `unknown`.
pub fn export<I>(commits: I, cancel: &CancelToken) -> Result<RunReport<Vec<CommitRecord>>, FaultlineError>
where
    I: IntoIterator<Item = Result<Commit, FaultlineError>>,
{
    let mut report = RunReport::new(Vec::new());
    for item in commits {
        cancel.check()?;
        match item {
            Ok(commit) => {
                report.items.push(CommitRecord::from(&commit));
                report.processed += 1;
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "skipping commit that could not be read");
                report.skip(Skipped::new("unknown", e.to_string()));
            }
        }
    }
    Ok(report)
}
