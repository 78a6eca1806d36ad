//! Diff-and-blame analysis of a single fix commit.

use std::collections::{BTreeSet, HashMap};

use faultline_core::FaultlineError;
use faultline_history::CommitHeader;
use tracing::{debug, warn};

use crate::history::History;
use crate::links::FixRecord;

/// Commits of the analysed history, by full id.
///
/// Origins outside the index are discarded, and fixes found in it skip the
/// backend lookup.
#[derive(Debug, Clone, Default)]
pub struct CommitIndex {
    commits: HashMap<String, CommitHeader>,
}

impl CommitIndex {
    /// Index `headers` by id.
    pub fn new(headers: impl IntoIterator<Item = CommitHeader>) -> Self {
        Self {
            commits: headers
                .into_iter()
                .map(|header| (header.id.clone(), header))
                .collect(),
        }
    }

    /// Header of `id`, if indexed.
    pub fn get(&self, id: &str) -> Option<&CommitHeader> {
        self.commits.get(id)
    }

    /// Number of indexed commits.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

/// Outcome of analysing one fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    /// The fix was analysed; it may still have no retained origins.
    Linked(FixRecord),
    /// The fix produced no links, with the reason.
    Skipped {
        /// Fix id as given, or resolved when possible.
        id: String,
        /// Why the fix was not analysed.
        reason: String,
    },
}

impl FixOutcome {
    fn skipped(id: &str, reason: impl Into<String>) -> Self {
        FixOutcome::Skipped {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Analyse fix commit `fix` against `history`.
///
/// Root commits, merge commits, unresolvable ids and fixes touching no
/// tracked file are skipped. Each origin is recorded once; merge origins and
/// origins missing from `index` are dropped.
///
/// # Errors
///
/// Returns [`FaultlineError::Cancelled`] if the backend was cancelled
/// mid-analysis. Other backend errors also propagate.
pub fn analyze_fix<H: History>(
    history: &H,
    fix: &str,
    index: &CommitIndex,
) -> Result<FixOutcome, FaultlineError> {
    let header = match index.get(fix) {
        Some(header) => header.clone(),
        None => match history.resolve(fix) {
            Ok(header) => header,
            Err(FaultlineError::InvalidCommit(_)) => {
                warn!(fix, "fix commit cannot be resolved");
                return Ok(FixOutcome::skipped(fix, "unresolvable commit id"));
            }
            Err(e) => return Err(e),
        },
    };

    if header.is_root() {
        return Ok(FixOutcome::skipped(&header.id, "root commit"));
    }
    if header.is_merge() {
        return Ok(FixOutcome::skipped(&header.id, "merge commit"));
    }

    let region = history.modified_lines(&header)?;
    if region.is_empty() {
        return Ok(FixOutcome::skipped(&header.id, "no tracked changes"));
    }

    let mut origins = BTreeSet::new();
    for (path, lines) in region.iter() {
        origins.extend(history.origins_of(path, lines, &header)?.into_values());
    }

    let linked_to = origins
        .into_iter()
        .filter(|origin| match index.get(origin) {
            Some(candidate) if candidate.is_merge() => {
                debug!(fix = header.short_id(), origin = %origin, "discarding merge origin");
                false
            }
            Some(_) => true,
            None => {
                warn!(fix = header.short_id(), origin = %origin, "origin outside analysed history, discarding");
                false
            }
        })
        .collect();

    Ok(FixOutcome::Linked(FixRecord {
        fix: header.id,
        linked_to,
        modified_regions: region,
    }))
}
