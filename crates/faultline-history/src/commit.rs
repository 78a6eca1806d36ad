//! Commit data as read from history.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a commit author.
///
/// # Examples
///
/// ```
/// use faultline_history::Author;
///
/// let author = Author::new("alice", "alice@example.com");
/// assert_eq!(author.to_string(), "alice <alice@example.com>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Author {
    /// Author name.
    pub name: String,
    /// Author email.
    pub email: String,
}

impl Author {
    /// Create an author identity.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.email.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} <{}>", self.name, self.email)
        }
    }
}

/// Commit metadata without file changes.
///
/// # Examples
///
/// ```
/// use faultline_history::{Author, CommitHeader};
///
/// let header = CommitHeader {
///     id: "a1b2c3d4e5".into(),
///     parents: vec!["ffff".into(), "eeee".into()],
///     author: Author::new("alice", "alice@example.com"),
///     timestamp: 1_700_000_000,
///     committer: Author::new("alice", "alice@example.com"),
///     commit_time: 1_700_000_000,
///     message: "Merge branch 'topic'\n\nDetails".into(),
/// };
/// assert!(header.is_merge());
/// assert_eq!(header.summary(), "Merge branch 'topic'");
/// assert_eq!(header.short_id(), "a1b2c3d4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitHeader {
    /// Full commit hash.
    pub id: String,
    /// Parent hashes, first parent first.
    pub parents: Vec<String>,
    /// Commit author.
    pub author: Author,
    /// Author timestamp, unix seconds.
    pub timestamp: i64,
    /// Who recorded the commit; differs from the author after rebases and
    /// applied patches.
    pub committer: Author,
    /// Committer timestamp, unix seconds.
    pub commit_time: i64,
    /// Full commit message.
    pub message: String,
}

impl CommitHeader {
    /// Number of parents.
    pub fn parent_count(&self) -> usize {
        self.parents.len()
    }

    /// `true` for commits with more than one parent.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// `true` for commits with no parent.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// First line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Eight-character abbreviation of the hash, for logs.
    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(8)]
    }
}

/// A commit together with the files it touched relative to its first parent.
///
/// # Examples
///
/// ```
/// use faultline_history::{Author, ChangeKind, Commit, CommitHeader, FileChange};
///
/// let commit = Commit {
///     header: CommitHeader {
///         id: "abc".into(),
///         parents: vec!["def".into()],
///         author: Author::new("alice", "alice@example.com"),
///         timestamp: 1_700_000_000,
///         committer: Author::new("alice", "alice@example.com"),
///         commit_time: 1_700_000_000,
///         message: "move util".into(),
///     },
///     changes: vec![FileChange {
///         path: "src/util.py".into(),
///         lines_added: 0,
///         lines_deleted: 0,
///         kind: ChangeKind::Renamed { from: "util.py".into() },
///     }],
/// };
/// let renames: Vec<_> = commit.renames().collect();
/// assert_eq!(renames, vec![("util.py", "src/util.py")]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Commit metadata.
    pub header: CommitHeader,
    /// Files touched, in diff order.
    pub changes: Vec<FileChange>,
}

impl Commit {
    /// Full commit hash.
    pub fn id(&self) -> &str {
        &self.header.id
    }

    /// `true` for commits with more than one parent.
    pub fn is_merge(&self) -> bool {
        self.header.is_merge()
    }

    /// Authoritative `(old_path, new_path)` pairs recorded by the backend.
    pub fn renames(&self) -> impl Iterator<Item = (&str, &str)> {
        self.changes.iter().filter_map(|c| match &c.kind {
            ChangeKind::Renamed { from } => Some((from.as_str(), c.path.as_str())),
            _ => None,
        })
    }
}

/// A single file change within a commit.
///
/// # Examples
///
/// ```
/// use faultline_history::{ChangeKind, FileChange};
///
/// let change = FileChange {
///     path: "src/main.rs".into(),
///     lines_added: 10,
///     lines_deleted: 3,
///     kind: ChangeKind::Modified,
/// };
/// assert_eq!(change.churn(), 13);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    /// Path after the change, relative to the repository root. For deleted
    /// files this is the removed path.
    pub path: String,
    /// Lines added in this commit.
    pub lines_added: u64,
    /// Lines deleted in this commit.
    pub lines_deleted: u64,
    /// Type of change.
    pub kind: ChangeKind,
}

impl FileChange {
    /// Lines added plus lines deleted.
    pub fn churn(&self) -> u64 {
        self.lines_added + self.lines_deleted
    }
}

/// Type of a file change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ChangeKind {
    /// New file.
    Added,
    /// Existing file modified.
    Modified,
    /// File removed.
    Deleted,
    /// File renamed from another path.
    Renamed {
        /// Path before the rename.
        from: String,
    },
}
