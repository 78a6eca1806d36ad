//! Pre-image line regions of a commit.
//!
//! A [`DiffRegion`] records, per file, which lines of the parent version a
//! commit deleted or rewrote. Those are the lines whose earlier content is
//! suspect when the commit is a fix.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Mapping from pre-image path to the pre-image line numbers a commit removed
/// or changed.
///
/// # Examples
///
/// ```
/// use faultline_history::DiffRegion;
///
/// let mut region = DiffRegion::default();
/// region.insert("app.py", 3);
/// region.insert("app.py", 3);
/// assert_eq!(region.lines("app.py").unwrap().iter().copied().collect::<Vec<_>>(), vec![3]);
/// assert_eq!(region.line_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiffRegion {
    files: BTreeMap<String, BTreeSet<u32>>,
}

impl DiffRegion {
    /// Record a suspect pre-image line.
    pub fn insert(&mut self, path: impl Into<String>, line: u32) {
        self.files.entry(path.into()).or_default().insert(line);
    }

    /// Suspect lines of one file, if the file has any.
    pub fn lines(&self, path: &str) -> Option<&BTreeSet<u32>> {
        self.files.get(path)
    }

    /// Iterate files and their suspect lines in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<u32>)> {
        self.files.iter().map(|(path, lines)| (path.as_str(), lines))
    }

    /// `true` when no file has a suspect line.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of files with suspect lines.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total suspect lines across all files.
    pub fn line_count(&self) -> usize {
        self.files.values().map(BTreeSet::len).sum()
    }

    /// Keep only files whose path satisfies `keep`.
    pub fn retain_files(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.files.retain(|path, _| keep(path));
    }
}
