//! Single-pass change-metrics accumulation.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use faultline_core::{FaultlineError, RunReport, Skipped};
use faultline_history::{CancelToken, ChangeKind, Commit, SourceFilter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::experience::{DeveloperExperience, Experience};
use crate::state::{FileState, FileTable, RenameConfidence};

const SECONDS_PER_DAY: f64 = 86_400.0;
const ROOT_SENTINEL: &str = "root";

/// Metrics of one non-merge commit.
///
/// Derived quantities default to 0 when their denominator is 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitMetrics {
    /// Full commit id.
    pub hash: String,
    /// Author name.
    pub author: String,
    /// Author email.
    pub email: String,
    /// Author time, unix seconds.
    pub timestamp: i64,
    /// Author time, RFC 3339.
    pub authored_at: DateTime<Utc>,
    /// First line of the commit message.
    pub message: String,
    /// Lines added.
    pub la: u64,
    /// Lines deleted.
    pub ld: u64,
    /// Mean size of the touched files before the commit.
    pub lt: f64,
    /// Distinct subsystems touched.
    pub ns: usize,
    /// Distinct directories touched.
    pub nd: usize,
    /// Files touched.
    pub nf: usize,
    /// Shannon entropy of the modification sizes across touched files.
    pub entropy: f64,
    /// Prior commits by the author.
    pub exp: u64,
    /// Prior commits by the author in the touched subsystems.
    pub sexp: u64,
    /// Recency-weighted prior commits by the author.
    pub rexp: f64,
    /// Distinct developers who touched these files before.
    pub ndev: usize,
    /// Mean days since the touched files were last changed.
    pub age: f64,
    /// Prior changes to the touched files.
    pub nuc: u64,
}

/// Shannon entropy, in bits, of the distribution given by `sizes`.
///
/// Zero sizes are ignored; an empty or single-valued distribution has
/// entropy 0.
///
/// # Examples
///
/// ```
/// use faultline_metrics::entropy;
///
/// assert_eq!(entropy([12]), 0.0);
/// assert_eq!(entropy([5, 5]), 1.0);
/// assert_eq!(entropy([0, 0]), 0.0);
/// ```
pub fn entropy(sizes: impl IntoIterator<Item = u64>) -> f64 {
    let sizes: Vec<u64> = sizes.into_iter().filter(|&size| size > 0).collect();
    let total: u64 = sizes.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let sum: f64 = sizes
        .iter()
        .map(|&size| {
            let p = size as f64 / total as f64;
            p * p.log2()
        })
        .sum();
    if sum == 0.0 {
        0.0
    } else {
        -sum
    }
}

/// One tracked file touched by the commit being observed.
#[derive(Debug)]
struct Touch {
    path: String,
    added: u64,
    deleted: u64,
    kind: ChangeKind,
}

impl Touch {
    fn is_deletion(&self) -> bool {
        self.kind == ChangeKind::Deleted
    }
}

/// Walks commits oldest-first and emits [`CommitMetrics`] per non-merge
/// commit.
///
/// The accumulator owns the file and developer tables for one pass. Feed it
/// commits strictly in order; reusing it across unrelated streams mixes
/// their state.
///
/// # Examples
///
/// ```
/// use faultline_history::{Author, ChangeKind, Commit, CommitHeader, FileChange};
/// use faultline_metrics::Accumulator;
///
/// let commit = Commit {
///     header: CommitHeader {
///         id: "c0ffee".into(),
///         parents: vec![],
///         author: Author::new("alice", "alice@example.com"),
///         timestamp: 1_700_000_000,
///         committer: Author::new("alice", "alice@example.com"),
///         commit_time: 1_700_000_000,
///         message: "initial import".into(),
///     },
///     changes: vec![FileChange {
///         path: "src/app.py".into(),
///         lines_added: 10,
///         lines_deleted: 0,
///         kind: ChangeKind::Added,
///     }],
/// };
///
/// let mut acc = Accumulator::default();
/// let metrics = acc.observe(&commit).unwrap();
/// assert_eq!(metrics.la, 10);
/// assert_eq!(metrics.nf, 1);
/// assert_eq!(metrics.exp, 0);
/// assert_eq!(acc.files().get("src/app.py").unwrap().loc, 10);
/// ```
#[derive(Debug, Clone)]
pub struct Accumulator {
    filter: Arc<SourceFilter>,
    files: FileTable,
    experience: DeveloperExperience,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new(Arc::new(SourceFilter::default()))
    }
}

impl Accumulator {
    /// Fresh accumulator counting only files accepted by `filter`.
    pub fn new(filter: Arc<SourceFilter>) -> Self {
        Self {
            filter,
            files: FileTable::default(),
            experience: DeveloperExperience::default(),
        }
    }

    /// Current file table.
    pub fn files(&self) -> &FileTable {
        &self.files
    }

    /// Current developer experience table.
    pub fn experience(&self) -> &DeveloperExperience {
        &self.experience
    }

    /// Consume a whole commit stream.
    ///
    /// Merge commits and commits the stream failed to load are listed in the
    /// report's skipped entries.
    ///
    /// # Errors
    ///
    /// Returns [`FaultlineError::Cancelled`] once `cancel` fires, or any
    /// other fatal error the stream yields.
    pub fn run<I>(
        &mut self,
        commits: I,
        cancel: &CancelToken,
    ) -> Result<RunReport<Vec<CommitMetrics>>, FaultlineError>
    where
        I: IntoIterator<Item = Result<Commit, FaultlineError>>,
    {
        let mut report = RunReport::new(Vec::new());
        for item in commits {
            cancel.check()?;
            let commit = match item {
                Ok(commit) => commit,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(error = %e, "skipping commit that could not be read");
                    report.skip(Skipped::new("unknown", e.to_string()));
                    continue;
                }
            };
            match self.observe(&commit) {
                Some(metrics) => {
                    report.items.push(metrics);
                    report.processed += 1;
                }
                None => report.skip(Skipped::new(commit.id(), "merge commit")),
            }
        }
        info!(
            processed = report.processed,
            skipped = report.skipped.len(),
            files = self.files.len(),
            "metrics pass complete"
        );
        Ok(report)
    }

    /// Fold one commit into the tables and return its metrics, or `None`
    /// for a merge commit.
    pub fn observe(&mut self, commit: &Commit) -> Option<CommitMetrics> {
        let header = &commit.header;
        if commit.is_merge() {
            debug!(commit = header.short_id(), "skipping merge commit");
            return None;
        }

        self.forget_untracked_renames(commit);
        let mut touches: Vec<Touch> = commit
            .changes
            .iter()
            .filter(|change| self.filter.is_tracked(&change.path))
            .map(|change| Touch {
                path: change.path.clone(),
                added: change.lines_added,
                deleted: change.lines_deleted,
                kind: change.kind.clone(),
            })
            .collect();
        self.resolve_renames(&mut touches, header.short_id());

        let mut subsystems = BTreeSet::new();
        let mut directories = BTreeSet::new();
        let mut developers = BTreeSet::new();
        let mut ages = Vec::new();
        let (mut la, mut ld, mut nuc) = (0u64, 0u64, 0u64);
        let mut touched_lines = 0i64;

        for touch in &touches {
            la += touch.added;
            ld += touch.deleted;
            let (subsystem, directory) = locate(&touch.path);
            subsystems.insert(subsystem);
            directories.insert(directory);

            match self.files.get_mut(&touch.path) {
                Some(state) => {
                    touched_lines += state.loc;
                    developers.extend(state.authors.iter().cloned());
                    let age = (header.timestamp - state.last_modified) as f64 / SECONDS_PER_DAY;
                    if age >= 0.0 {
                        ages.push(age);
                    }
                    nuc += state.nuc;
                    state.touch(touch.added, touch.deleted, &header.author, header.timestamp);
                }
                None if touch.is_deletion() => {
                    debug!(path = %touch.path, "deleted file had no recorded state");
                }
                None => self.files.insert(FileState::new(
                    touch.path.as_str(),
                    touch.added as i64 - touch.deleted as i64,
                    header.author.clone(),
                    header.timestamp,
                )),
            }
        }
        for touch in touches.iter().filter(|touch| touch.is_deletion()) {
            self.files.remove(&touch.path);
        }

        let nf = touches.len();
        let lt = if nf == 0 {
            0.0
        } else {
            touched_lines as f64 / nf as f64
        };
        let age = if ages.is_empty() {
            0.0
        } else {
            ages.iter().sum::<f64>() / ages.len() as f64
        };
        let entropy = entropy(touches.iter().map(|touch| touch.added + touch.deleted));

        let Experience { exp, sexp, rexp } =
            self.experience
                .before(&header.author, &subsystems, header.timestamp);
        self.experience
            .record(&header.author, &subsystems, header.timestamp);

        debug!(commit = header.short_id(), nf, la, ld, "observed commit");
        Some(CommitMetrics {
            hash: header.id.clone(),
            author: header.author.name.clone(),
            email: header.author.email.clone(),
            timestamp: header.timestamp,
            authored_at: DateTime::from_timestamp(header.timestamp, 0).unwrap_or_default(),
            message: header.summary().to_string(),
            la,
            ld,
            lt,
            ns: subsystems.len(),
            nd: directories.len(),
            nf,
            entropy,
            exp,
            sexp,
            rexp,
            ndev: developers.len(),
            age,
            nuc,
        })
    }

    /// Drop the state of tracked files renamed to a path outside the
    /// allow-list, so a later file at the old path starts fresh.
    fn forget_untracked_renames(&mut self, commit: &Commit) {
        for change in &commit.changes {
            let ChangeKind::Renamed { from } = &change.kind else {
                continue;
            };
            if self.filter.is_tracked(&change.path) {
                continue;
            }
            if self.files.remove(from).is_some() {
                debug!(
                    commit = commit.header.short_id(),
                    from = %from,
                    to = %change.path,
                    "file renamed out of the tracked set, dropping its state"
                );
            }
        }
    }

    /// Move file state along this commit's renames before any lookup.
    ///
    /// Recorded renames are applied first. Then every added path without
    /// state is paired with a deleted path of the same basename that has
    /// state; the pair is folded into a single inferred rename.
    fn resolve_renames(&mut self, touches: &mut Vec<Touch>, commit: &str) {
        for touch in touches.iter() {
            let ChangeKind::Renamed { from } = &touch.kind else {
                continue;
            };
            if !self
                .files
                .relocate(from, &touch.path, RenameConfidence::Recorded)
            {
                warn!(commit, from = %from, to = %touch.path, "rename source has no recorded state, treating as a new file");
            }
        }

        let mut absorbed = HashSet::new();
        for i in 0..touches.len() {
            if touches[i].kind != ChangeKind::Added || self.files.contains(&touches[i].path) {
                continue;
            }
            let name = basename(&touches[i].path);
            let Some(j) = touches.iter().enumerate().position(|(j, other)| {
                other.is_deletion()
                    && !absorbed.contains(&j)
                    && basename(&other.path) == name
                    && self.files.contains(&other.path)
            }) else {
                continue;
            };

            let from = touches[j].path.clone();
            let removed = touches[j].deleted;
            warn!(commit, from = %from, to = %touches[i].path, "inferring rename from matching basenames");
            self.files
                .relocate(&from, &touches[i].path, RenameConfidence::Inferred);
            touches[i].deleted += removed;
            touches[i].kind = ChangeKind::Renamed { from };
            absorbed.insert(j);
        }

        if !absorbed.is_empty() {
            let mut index = 0;
            touches.retain(|_| {
                let keep = !absorbed.contains(&index);
                index += 1;
                keep
            });
        }
    }
}

/// Subsystem (first path segment) and directory (all but the last segment)
/// of `path`; top-level files map both to `"root"`.
fn locate(path: &str) -> (String, String) {
    match path.rsplit_once('/') {
        Some((directory, _)) => {
            let subsystem = directory.split('/').next().unwrap_or(directory);
            (subsystem.to_string(), directory.to_string())
        }
        None => (ROOT_SENTINEL.to_string(), ROOT_SENTINEL.to_string()),
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultline_history::{Author, CommitHeader, FileChange};

    const DAY: i64 = 86_400;

    fn change(path: &str, added: u64, deleted: u64, kind: ChangeKind) -> FileChange {
        FileChange {
            path: path.into(),
            lines_added: added,
            lines_deleted: deleted,
            kind,
        }
    }

    fn commit(id: &str, author: &str, day: i64, changes: Vec<FileChange>) -> Commit {
        Commit {
            header: CommitHeader {
                id: id.into(),
                parents: vec!["parent".into()],
                author: Author::new(author, format!("{author}@example.com")),
                timestamp: day * DAY,
                committer: Author::new(author, format!("{author}@example.com")),
                commit_time: day * DAY,
                message: format!("{id} summary\n\nbody"),
            },
            changes,
        }
    }

    #[test]
    fn single_file_commit_has_zero_entropy() {
        let mut acc = Accumulator::default();
        let m = acc
            .observe(&commit("a", "alice", 0, vec![change("a.py", 7, 2, ChangeKind::Modified)]))
            .unwrap();
        assert_eq!(m.entropy, 0.0);
        assert!(serde_json::to_string(&m).unwrap().contains("\"entropy\":0.0"));
    }

    #[test]
    fn entropy_weights_files_by_modification_size() {
        assert_eq!(entropy([3, 3, 0]), 1.0);
        let skewed = entropy([1, 3]);
        assert!(skewed > 0.0 && skewed < 1.0);
        assert_eq!(entropy(std::iter::empty()), 0.0);
    }

    #[test]
    fn churn_sums_to_added_plus_deleted() {
        let changes = vec![
            change("src/a.py", 10, 2, ChangeKind::Modified),
            change("src/b.py", 0, 4, ChangeKind::Modified),
            change("lib/c.rs", 5, 0, ChangeKind::Added),
        ];
        let churn: u64 = changes.iter().map(FileChange::churn).sum();
        let mut acc = Accumulator::default();
        let m = acc.observe(&commit("a", "alice", 0, changes)).unwrap();
        assert_eq!(m.la + m.ld, churn);
        assert_eq!((m.la, m.ld), (15, 6));
        assert_eq!(m.nf, 3);
        assert_eq!(m.ns, 2);
        assert_eq!(m.nd, 2);
    }

    #[test]
    fn subsystems_and_directories_use_root_for_top_level_files() {
        let mut acc = Accumulator::default();
        let m = acc
            .observe(&commit(
                "a",
                "alice",
                0,
                vec![
                    change("setup.py", 1, 0, ChangeKind::Added),
                    change("pkg/core/a.py", 1, 0, ChangeKind::Added),
                    change("pkg/io/b.py", 1, 0, ChangeKind::Added),
                ],
            ))
            .unwrap();
        assert_eq!(m.ns, 2);
        assert_eq!(m.nd, 3);
    }

    #[test]
    fn nuc_counts_prior_changes_and_state_grows_per_touch() {
        let mut acc = Accumulator::default();
        let first = acc
            .observe(&commit("a", "alice", 0, vec![change("f.py", 5, 0, ChangeKind::Added)]))
            .unwrap();
        assert_eq!(first.nuc, 0);
        assert_eq!(acc.files().get("f.py").unwrap().nuc, 1);

        let mut previous = 1;
        for (day, id) in ["b", "c", "d"].iter().enumerate() {
            let m = acc
                .observe(&commit(id, "bob", day as i64 + 1, vec![change("f.py", 1, 1, ChangeKind::Modified)]))
                .unwrap();
            assert_eq!(m.nuc, previous);
            let now = acc.files().get("f.py").unwrap().nuc;
            assert!(now > previous);
            previous = now;
        }
    }

    #[test]
    fn renaming_out_of_the_tracked_set_drops_state() {
        let mut acc = Accumulator::default();
        acc.observe(&commit("a", "alice", 0, vec![change("util.py", 5, 0, ChangeKind::Added)]));
        acc.observe(&commit("b", "bob", 1, vec![change("util.py", 1, 1, ChangeKind::Modified)]));
        let moved = acc
            .observe(&commit(
                "c",
                "alice",
                2,
                vec![change("util.py.orig", 0, 0, ChangeKind::Renamed { from: "util.py".into() })],
            ))
            .unwrap();
        assert_eq!(moved.nf, 0);
        assert!(!acc.files().contains("util.py"));
        assert!(acc.files().is_empty());

        let fresh = acc
            .observe(&commit("d", "carol", 3, vec![change("util.py", 2, 0, ChangeKind::Added)]))
            .unwrap();
        assert_eq!((fresh.nuc, fresh.ndev), (0, 0));
        assert_eq!(fresh.lt, 0.0);
        assert_eq!(fresh.age, 0.0);
        let state = acc.files().get("util.py").unwrap();
        assert_eq!((state.loc, state.nuc, state.authors.len()), (2, 1, 1));
    }

    #[test]
    fn new_files_do_not_contribute_history() {
        let mut acc = Accumulator::default();
        acc.observe(&commit("a", "alice", 0, vec![change("old.py", 10, 0, ChangeKind::Added)]));
        let m = acc
            .observe(&commit(
                "b",
                "bob",
                4,
                vec![
                    change("old.py", 2, 0, ChangeKind::Modified),
                    change("new.py", 3, 0, ChangeKind::Added),
                ],
            ))
            .unwrap();
        assert_eq!(m.lt, 5.0);
        assert_eq!(m.age, 4.0);
        assert_eq!(m.ndev, 1);
        assert_eq!(m.nuc, 1);
        assert_eq!(acc.files().get("new.py").unwrap().loc, 3);
        assert_eq!(acc.files().get("old.py").unwrap().loc, 12);
    }

    #[test]
    fn clock_skew_yields_no_negative_age() {
        let mut acc = Accumulator::default();
        acc.observe(&commit("a", "alice", 10, vec![change("f.py", 3, 0, ChangeKind::Added)]));
        let m = acc
            .observe(&commit("b", "bob", 2, vec![change("f.py", 1, 0, ChangeKind::Modified)]))
            .unwrap();
        assert_eq!(m.age, 0.0);
        assert_eq!(m.nuc, 1);
    }

    #[test]
    fn recorded_rename_carries_state() {
        let mut acc = Accumulator::default();
        acc.observe(&commit("a", "alice", 0, vec![change("util.py", 5, 0, ChangeKind::Added)]));
        let renamed = acc
            .observe(&commit(
                "b",
                "bob",
                1,
                vec![change(
                    "pkg/util.py",
                    0,
                    0,
                    ChangeKind::Renamed {
                        from: "util.py".into(),
                    },
                )],
            ))
            .unwrap();
        assert_eq!(renamed.nuc, 1);
        assert_eq!(renamed.lt, 5.0);
        assert!(acc.files().get("util.py").is_none());

        let state = acc.files().get("pkg/util.py").unwrap();
        assert_eq!(state.nuc, 2);
        let lineage = state.lineage.as_ref().unwrap();
        assert_eq!(lineage.from, "util.py");
        assert_eq!(lineage.confidence, RenameConfidence::Recorded);

        let next = acc
            .observe(&commit("c", "carol", 2, vec![change("pkg/util.py", 1, 1, ChangeKind::Modified)]))
            .unwrap();
        assert_eq!(next.nuc, 2);
        assert_eq!(next.ndev, 2);
    }

    #[test]
    fn basename_match_infers_rename() {
        let mut acc = Accumulator::default();
        acc.observe(&commit("a", "alice", 0, vec![change("old/x.py", 4, 0, ChangeKind::Added)]));
        let m = acc
            .observe(&commit(
                "b",
                "bob",
                1,
                vec![
                    change("new/x.py", 6, 0, ChangeKind::Added),
                    change("old/x.py", 0, 4, ChangeKind::Deleted),
                ],
            ))
            .unwrap();
        assert_eq!(m.nf, 1);
        assert_eq!((m.la, m.ld), (6, 4));
        assert_eq!(m.nuc, 1);
        assert!(acc.files().get("old/x.py").is_none());

        let state = acc.files().get("new/x.py").unwrap();
        assert_eq!(state.loc, 6);
        assert_eq!(state.nuc, 2);
        assert_eq!(
            state.lineage.as_ref().unwrap().confidence,
            RenameConfidence::Inferred
        );
    }

    #[test]
    fn rename_without_known_source_starts_fresh() {
        let mut acc = Accumulator::default();
        let m = acc
            .observe(&commit(
                "a",
                "alice",
                0,
                vec![change(
                    "b.py",
                    3,
                    0,
                    ChangeKind::Renamed {
                        from: "ghost.py".into(),
                    },
                )],
            ))
            .unwrap();
        assert_eq!(m.nuc, 0);
        let state = acc.files().get("b.py").unwrap();
        assert_eq!(state.nuc, 1);
        assert!(state.lineage.is_none());
    }

    #[test]
    fn deleted_files_count_then_drop_state() {
        let mut acc = Accumulator::default();
        acc.observe(&commit("a", "alice", 0, vec![change("gone.py", 3, 0, ChangeKind::Added)]));
        let m = acc
            .observe(&commit("b", "bob", 1, vec![change("gone.py", 0, 3, ChangeKind::Deleted)]))
            .unwrap();
        assert_eq!(m.nf, 1);
        assert_eq!(m.ld, 3);
        assert_eq!(m.nuc, 1);
        assert!(acc.files().is_empty());
    }

    #[test]
    fn commit_without_tracked_files_yields_zeros() {
        let mut acc = Accumulator::default();
        let m = acc
            .observe(&commit("a", "alice", 0, vec![change("notes.xyz", 40, 2, ChangeKind::Added)]))
            .unwrap();
        assert_eq!((m.la, m.ld, m.nf, m.ns, m.nd, m.ndev, m.nuc), (0, 0, 0, 0, 0, 0, 0));
        assert_eq!((m.lt, m.age, m.entropy), (0.0, 0.0, 0.0));
        assert!(acc.files().is_empty());
        assert_eq!(acc.experience().commits_by(&Author::new("alice", "alice@example.com")), 1);
    }

    #[test]
    fn experience_counts_prior_commits() {
        let mut acc = Accumulator::default();
        let first = acc
            .observe(&commit("a", "alice", 0, vec![change("core/a.py", 1, 0, ChangeKind::Added)]))
            .unwrap();
        let second = acc
            .observe(&commit("b", "alice", 0, vec![change("core/b.py", 1, 0, ChangeKind::Added)]))
            .unwrap();
        let third = acc
            .observe(&commit("c", "alice", 0, vec![change("docs/c.py", 1, 0, ChangeKind::Added)]))
            .unwrap();
        assert_eq!((first.exp, second.exp, third.exp), (0, 1, 2));
        assert_eq!((second.sexp, third.sexp), (1, 0));
        assert_eq!(third.rexp, 2.0);
    }

    #[test]
    fn merge_commits_are_not_observed() {
        let mut merge = commit("m", "alice", 0, vec![change("a.py", 1, 0, ChangeKind::Added)]);
        merge.header.parents.push("other".into());

        let mut acc = Accumulator::default();
        assert!(acc.observe(&merge).is_none());
        assert!(acc.files().is_empty());

        let report = acc.run(vec![Ok(merge)], &CancelToken::new()).unwrap();
        assert_eq!(report.processed, 0);
        assert_eq!(report.skipped[0].id, "m");
        assert_eq!(report.skipped[0].reason, "merge commit");
    }

    #[test]
    fn run_skips_unreadable_commits_and_stops_on_cancel() {
        let stream = vec![
            Ok(commit("a", "alice", 0, vec![change("a.py", 1, 0, ChangeKind::Added)])),
            Err(FaultlineError::Git("failed to diff commit".into())),
        ];
        let report = Accumulator::default()
            .run(stream, &CancelToken::new())
            .unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.skipped.len(), 1);

        let cancel = CancelToken::new();
        cancel.cancel();
        let stream = vec![Ok(commit("a", "alice", 0, vec![]))];
        assert!(matches!(
            Accumulator::default().run(stream, &cancel),
            Err(FaultlineError::Cancelled)
        ));
    }

    #[test]
    fn metrics_record_uses_summary_and_rfc3339_time() {
        let mut acc = Accumulator::default();
        let m = acc.observe(&commit("a", "alice", 1, vec![])).unwrap();
        assert_eq!(m.message, "a summary");
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["authoredAt"], "1970-01-02T00:00:00Z");
        assert_eq!(json["email"], "alice@example.com");
    }

    #[test]
    fn identical_streams_serialize_identically() {
        let history = || {
            vec![
                commit("a", "alice", 0, vec![change("src/a.py", 8, 0, ChangeKind::Added)]),
                commit(
                    "b",
                    "bob",
                    3,
                    vec![
                        change("src/a.py", 2, 1, ChangeKind::Modified),
                        change("test/t.py", 9, 0, ChangeKind::Added),
                    ],
                ),
                commit("c", "alice", 5, vec![change("src/a.py", 0, 3, ChangeKind::Modified)]),
            ]
        };
        let render = || {
            let mut acc = Accumulator::default();
            let metrics: Vec<_> = history().iter().filter_map(|c| acc.observe(c)).collect();
            serde_json::to_string(&metrics).unwrap()
        };
        assert_eq!(render(), render());
    }
}
