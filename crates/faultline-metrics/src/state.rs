//! Per-file state carried across commits.

use std::collections::{BTreeMap, BTreeSet};

use faultline_history::Author;
use serde::Serialize;

/// How a file's identity was carried across a rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameConfidence {
    /// The backend recorded the rename.
    Recorded,
    /// Inferred by matching a deleted and an added file with the same basename.
    Inferred,
}

/// The most recent rename that brought a file to its current path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameLink {
    /// Path before the rename.
    pub from: String,
    /// Whether the link is authoritative.
    pub confidence: RenameConfidence,
}

/// Accumulated history of one file.
///
/// # Examples
///
/// ```
/// use faultline_history::Author;
/// use faultline_metrics::FileState;
///
/// let state = FileState::new("src/app.py", 40, Author::new("alice", "a@x"), 1_700_000_000);
/// assert_eq!(state.nuc, 1);
/// assert_eq!(state.authors.len(), 1);
/// assert!(state.lineage.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileState {
    /// Current path.
    pub path: String,
    /// Current line count as implied by the observed additions and deletions.
    pub loc: i64,
    /// Everyone who has touched the file.
    pub authors: BTreeSet<Author>,
    /// Author timestamp of the latest touch.
    pub last_modified: i64,
    /// Changes up to and including the latest touch.
    pub nuc: u64,
    /// Rename provenance, if the file arrived at `path` through a rename.
    pub lineage: Option<RenameLink>,
}

impl FileState {
    /// State of a file first seen in a commit by `author` at `timestamp`.
    pub fn new(path: impl Into<String>, loc: i64, author: Author, timestamp: i64) -> Self {
        Self {
            path: path.into(),
            loc,
            authors: BTreeSet::from([author]),
            last_modified: timestamp,
            nuc: 1,
            lineage: None,
        }
    }

    /// Apply one more touch.
    pub fn touch(&mut self, added: u64, deleted: u64, author: &Author, timestamp: i64) {
        self.loc += added as i64 - deleted as i64;
        self.last_modified = timestamp;
        self.authors.insert(author.clone());
        self.nuc += 1;
    }
}

/// Path-keyed table of [`FileState`]s.
///
/// # Examples
///
/// ```
/// use faultline_history::Author;
/// use faultline_metrics::{FileState, FileTable, RenameConfidence};
///
/// let mut table = FileTable::default();
/// table.insert(FileState::new("a.py", 3, Author::new("alice", "a@x"), 0));
/// assert!(table.relocate("a.py", "b.py", RenameConfidence::Recorded));
/// assert!(table.get("a.py").is_none());
/// assert_eq!(table.get("b.py").unwrap().loc, 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileTable {
    files: BTreeMap<String, FileState>,
}

impl FileTable {
    /// State of `path`, if known.
    pub fn get(&self, path: &str) -> Option<&FileState> {
        self.files.get(path)
    }

    /// Mutable state of `path`, if known.
    pub fn get_mut(&mut self, path: &str) -> Option<&mut FileState> {
        self.files.get_mut(path)
    }

    /// Whether `path` has state.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Insert or replace the state at `state.path`.
    pub fn insert(&mut self, state: FileState) {
        self.files.insert(state.path.clone(), state);
    }

    /// Drop the state of `path`.
    pub fn remove(&mut self, path: &str) -> Option<FileState> {
        self.files.remove(path)
    }

    /// Move the state of `from` to `to`, keeping everything accumulated so
    /// far. Returns `false` if `from` has no state.
    pub fn relocate(&mut self, from: &str, to: &str, confidence: RenameConfidence) -> bool {
        let Some(mut state) = self.files.remove(from) else {
            return false;
        };
        state.path = to.to_string();
        state.lineage = Some(RenameLink {
            from: from.to_string(),
            confidence,
        });
        self.files.insert(to.to_string(), state);
        true
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate states in path order.
    pub fn iter(&self) -> impl Iterator<Item = &FileState> {
        self.files.values()
    }
}
