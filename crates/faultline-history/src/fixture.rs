//! Throwaway git repositories for tests.
//!
//! Enabled with the `fixture` feature. Commits get deterministic author
//! timestamps one day apart, starting at 2020-09-13.

use std::path::Path;

use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

const EPOCH: i64 = 1_600_000_000;
const DAY: i64 = 86_400;

/// Builds a repository commit by commit in a temporary directory.
///
/// `files` entries are `(path, Some(content))` to write a file and
/// `(path, None)` to delete it.
///
/// # Examples
///
/// ```
/// use faultline_history::fixture::RepoBuilder;
///
/// let mut repo = RepoBuilder::new();
/// let first = repo.commit("alice", "init", &[("a.py", Some("x = 1\n"))]);
/// let second = repo.commit("bob", "tweak", &[("a.py", Some("x = 2\n"))]);
/// assert_ne!(first, second);
/// ```
pub struct RepoBuilder {
    dir: TempDir,
    repo: Repository,
    clock: i64,
}

impl RepoBuilder {
    /// Initialize an empty repository.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let repo = Repository::init(dir.path()).expect("init repository");
        Self {
            dir,
            repo,
            clock: EPOCH,
        }
    }

    /// Working directory of the repository.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Author timestamp the next commit will get.
    pub fn now(&self) -> i64 {
        self.clock
    }

    /// Move the clock forward by `days` (may be negative to simulate skew).
    pub fn advance(&mut self, days: i64) {
        self.clock += days * DAY;
    }

    /// Commit `files` on top of HEAD and move HEAD.
    pub fn commit(&mut self, author: &str, message: &str, files: &[(&str, Option<&str>)]) -> String {
        self.stage(files);
        let parents = self.head().into_iter().collect();
        self.create(Some("HEAD"), author, message, parents)
    }

    /// Commit `files` on top of HEAD without moving HEAD, leaving the changes
    /// staged. A later [`merge`](Self::merge) of the returned id produces a
    /// merge whose tree contains them.
    pub fn commit_detached(
        &mut self,
        author: &str,
        message: &str,
        files: &[(&str, Option<&str>)],
    ) -> String {
        self.stage(files);
        let parents = self.head().into_iter().collect();
        self.create(None, author, message, parents)
    }

    /// Create a merge of HEAD and `other`, applying `files` in the merge
    /// itself.
    pub fn merge(
        &mut self,
        author: &str,
        message: &str,
        other: &str,
        files: &[(&str, Option<&str>)],
    ) -> String {
        self.stage(files);
        let mut parents: Vec<Oid> = self.head().into_iter().collect();
        parents.push(Oid::from_str(other).expect("valid commit id"));
        self.create(Some("HEAD"), author, message, parents)
    }

    /// Move `from` to `to` unchanged and commit.
    pub fn rename(&mut self, author: &str, message: &str, from: &str, to: &str) -> String {
        let content = std::fs::read_to_string(self.path().join(from)).expect("read renamed file");
        self.commit(author, message, &[(from, None), (to, Some(content.as_str()))])
    }

    /// Point a new branch `name` at `commit`.
    pub fn branch(&self, name: &str, commit: &str) {
        let target = self
            .repo
            .find_commit(Oid::from_str(commit).expect("valid commit id"))
            .expect("find commit");
        self.repo.branch(name, &target, true).expect("create branch");
    }

    fn head(&self) -> Option<Oid> {
        self.repo.head().ok().and_then(|head| head.target())
    }

    fn stage(&self, files: &[(&str, Option<&str>)]) {
        let mut index = self.repo.index().expect("open index");
        for (path, content) in files {
            let full = self.path().join(path);
            match content {
                Some(content) => {
                    if let Some(parent) = full.parent() {
                        std::fs::create_dir_all(parent).expect("create parent dirs");
                    }
                    std::fs::write(&full, content).expect("write file");
                    index.add_path(Path::new(path)).expect("stage file");
                }
                None => {
                    std::fs::remove_file(&full).expect("remove file");
                    index.remove_path(Path::new(path)).expect("unstage file");
                }
            }
        }
        index.write().expect("write index");
    }

    fn create(
        &mut self,
        update_ref: Option<&str>,
        author: &str,
        message: &str,
        parents: Vec<Oid>,
    ) -> String {
        let mut index = self.repo.index().expect("open index");
        let tree_id = index.write_tree().expect("write tree");
        let tree = self.repo.find_tree(tree_id).expect("find tree");

        let email = format!("{author}@example.com");
        let signature =
            Signature::new(author, &email, &Time::new(self.clock, 0)).expect("signature");

        let parents: Vec<git2::Commit<'_>> = parents
            .into_iter()
            .map(|oid| self.repo.find_commit(oid).expect("find parent"))
            .collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let oid = self
            .repo
            .commit(update_ref, &signature, &signature, message, &tree, &parent_refs)
            .expect("create commit");
        self.clock += DAY;
        oid.to_string()
    }
}

impl Default for RepoBuilder {
    fn default() -> Self {
        Self::new()
    }
}
