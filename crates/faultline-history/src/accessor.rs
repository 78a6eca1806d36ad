//! Git history queries via git2.
//!
//! Streams commits oldest-first with per-file line counts and rename
//! records, computes the pre-image regions a commit removed, and attributes
//! pre-image lines to the commits that last touched them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use faultline_core::FaultlineError;
use git2::{
    BlameOptions, Delta, Diff, DiffFindOptions, DiffOptions, ErrorCode, Oid, Patch, Repository,
    Revwalk, Sort,
};

use crate::cache::QueryCache;
use crate::cancel::CancelToken;
use crate::commit::{Author, ChangeKind, Commit, CommitHeader, FileChange};
use crate::filter::SourceFilter;
use crate::region::DiffRegion;

/// Query layer over one local repository.
///
/// An accessor owns its git2 handle, which is not `Sync`; concurrent callers
/// open one accessor each and share the [`QueryCache`] and [`SourceFilter`].
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use faultline_history::HistoryAccessor;
///
/// let history = HistoryAccessor::open(Path::new(".")).unwrap();
/// for commit in history.commits_of(None).unwrap() {
///     let commit = commit.unwrap();
///     println!("{} {}", commit.header.short_id(), commit.header.summary());
/// }
/// ```
pub struct HistoryAccessor {
    repo: Repository,
    path: PathBuf,
    filter: Arc<SourceFilter>,
    cache: Arc<QueryCache>,
    cancel: CancelToken,
}

impl HistoryAccessor {
    /// Open the repository at `path` with the default filter, a fresh cache,
    /// and no deadline.
    ///
    /// # Errors
    ///
    /// Returns [`FaultlineError::Config`] if `path` does not exist, or
    /// [`FaultlineError::NotARepository`] if it is not a git repository.
    pub fn open(path: &Path) -> Result<Self, FaultlineError> {
        if !path.exists() {
            return Err(FaultlineError::Config(format!(
                "repository path does not exist: {}",
                path.display()
            )));
        }

        let repo = Repository::open(path).map_err(|e| match e.code() {
            ErrorCode::NotFound => FaultlineError::NotARepository(path.to_path_buf()),
            _ => FaultlineError::Config(format!(
                "failed to open repository at {}: {e}",
                path.display()
            )),
        })?;

        Ok(Self {
            repo,
            path: path.to_path_buf(),
            filter: Arc::new(SourceFilter::default()),
            cache: Arc::new(QueryCache::new()),
            cancel: CancelToken::new(),
        })
    }

    /// Use `filter` for region computation.
    pub fn with_filter(mut self, filter: Arc<SourceFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Share `cache` with other accessors of the same run.
    pub fn with_cache(mut self, cache: Arc<QueryCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Check `cancel` before every backend call.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Path the repository was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The allow-list in use.
    pub fn filter(&self) -> &SourceFilter {
        &self.filter
    }

    /// The memoization cache in use.
    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Stream full commits of `branch` (default: HEAD), oldest first.
    ///
    /// File changes are computed lazily as the stream is pulled. Each call
    /// starts a fresh walk.
    ///
    /// # Errors
    ///
    /// Returns [`FaultlineError::Config`] if the branch cannot be resolved.
    pub fn commits_of(&self, branch: Option<&str>) -> Result<CommitStream<'_>, FaultlineError> {
        Ok(CommitStream {
            repo: &self.repo,
            walk: Some(self.walk(branch)?),
            cancel: self.cancel.clone(),
        })
    }

    /// Stream commit headers of `branch` (default: HEAD), oldest first,
    /// without computing diffs.
    ///
    /// # Errors
    ///
    /// Returns [`FaultlineError::Config`] if the branch cannot be resolved.
    pub fn headers_of(&self, branch: Option<&str>) -> Result<HeaderStream<'_>, FaultlineError> {
        Ok(HeaderStream {
            repo: &self.repo,
            walk: Some(self.walk(branch)?),
            cancel: self.cancel.clone(),
        })
    }

    /// Look up a commit by full or abbreviated hash.
    ///
    /// # Errors
    ///
    /// Returns [`FaultlineError::InvalidCommit`] if `id` is malformed or does
    /// not name a commit in this repository.
    pub fn resolve(&self, id: &str) -> Result<CommitHeader, FaultlineError> {
        self.cancel.check()?;
        let valid = !id.is_empty() && id.len() <= 40 && id.bytes().all(|b| b.is_ascii_hexdigit());
        if !valid {
            return Err(FaultlineError::InvalidCommit(id.to_string()));
        }

        let commit = self
            .repo
            .revparse_single(id)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|_| FaultlineError::InvalidCommit(id.to_string()))?;
        Ok(read_header(&commit))
    }

    /// Pre-image lines that `commit` removed or changed, per tracked file.
    ///
    /// Root and merge commits yield an empty region. A diff the backend
    /// refuses also yields an empty region, logged as a warning.
    ///
    /// # Errors
    ///
    /// Returns [`FaultlineError::Cancelled`] once the cancel token fires.
    pub fn modified_lines(&self, commit: &CommitHeader) -> Result<DiffRegion, FaultlineError> {
        self.cancel.check()?;
        if commit.parent_count() != 1 {
            return Ok(DiffRegion::default());
        }
        if let Some(region) = self.cache.region(&commit.id) {
            return Ok(region);
        }

        let mut region = self.removed_lines(&commit.id).unwrap_or_else(|e| {
            tracing::warn!(commit = %commit.short_id(), error = %e, "diff refused; treating as no evidence");
            DiffRegion::default()
        });
        region.retain_files(|path| self.filter.is_tracked(path));

        self.cache.store_region(&commit.id, region.clone());
        Ok(region)
    }

    /// The commit that last touched pre-image line `line` of `path`, as the
    /// file stood immediately before `commit`.
    ///
    /// `None` means no evidence: the path or revision does not exist, or the
    /// line is out of range.
    ///
    /// # Errors
    ///
    /// Returns [`FaultlineError::Cancelled`] once the cancel token fires.
    pub fn origin_of(
        &self,
        path: &str,
        line: u32,
        commit: &CommitHeader,
    ) -> Result<Option<String>, FaultlineError> {
        let mut origins = self.origins_of(path, [line], commit)?;
        Ok(origins.remove(&line))
    }

    /// Batch form of [`origin_of`](Self::origin_of): blames `path` once for
    /// all cache misses and memoizes every line by `(path, line, commit)`.
    ///
    /// Lines without evidence are absent from the result.
    ///
    /// # Errors
    ///
    /// Returns [`FaultlineError::Cancelled`] once the cancel token fires.
    pub fn origins_of(
        &self,
        path: &str,
        lines: impl IntoIterator<Item = u32>,
        commit: &CommitHeader,
    ) -> Result<BTreeMap<u32, String>, FaultlineError> {
        self.cancel.check()?;

        let mut resolved = BTreeMap::new();
        let mut missing = Vec::new();
        for line in lines {
            match self.cache.origin(path, line, &commit.id) {
                Some(Some(origin)) => {
                    resolved.insert(line, origin);
                }
                Some(None) => {}
                None => missing.push(line),
            }
        }
        if missing.is_empty() {
            return Ok(resolved);
        }

        let Some(parent) = commit.parents.first() else {
            for line in missing {
                self.cache.store_origin(path, line, &commit.id, None);
            }
            return Ok(resolved);
        };

        match self.blame_at(path, parent) {
            Ok(blame) => {
                for line in missing {
                    let origin = blame
                        .get_line(line as usize)
                        .map(|hunk| hunk.final_commit_id().to_string());
                    self.cache
                        .store_origin(path, line, &commit.id, origin.clone());
                    if let Some(origin) = origin {
                        resolved.insert(line, origin);
                    }
                }
            }
            Err(e) => {
                tracing::debug!(path, commit = %commit.short_id(), error = %e, "blame refused");
                for line in missing {
                    self.cache.store_origin(path, line, &commit.id, None);
                }
            }
        }

        Ok(resolved)
    }

    fn walk(&self, branch: Option<&str>) -> Result<Revwalk<'_>, FaultlineError> {
        let mut revwalk = self
            .repo
            .revwalk()
            .map_err(|e| FaultlineError::Git(format!("failed to create revwalk: {e}")))?;

        revwalk
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE)
            .map_err(|e| FaultlineError::Git(format!("failed to set sorting: {e}")))?;

        match branch {
            Some(branch) => {
                let oid = self.resolve_branch(branch)?;
                revwalk
                    .push(oid)
                    .map_err(|e| FaultlineError::Git(format!("failed to push oid: {e}")))?;
            }
            None => {
                revwalk.push_head().map_err(|e| {
                    FaultlineError::Config(format!("failed to push HEAD: {e}"))
                })?;
            }
        }

        Ok(revwalk)
    }

    fn resolve_branch(&self, branch: &str) -> Result<Oid, FaultlineError> {
        if let Ok(reference) = self.repo.resolve_reference_from_short_name(branch) {
            if let Ok(commit) = reference.peel_to_commit() {
                return Ok(commit.id());
            }
        }
        self.repo
            .revparse_single(branch)
            .and_then(|obj| obj.peel_to_commit())
            .map(|commit| commit.id())
            .map_err(|e| FaultlineError::Config(format!("failed to resolve branch '{branch}': {e}")))
    }

    fn removed_lines(&self, id: &str) -> Result<DiffRegion, git2::Error> {
        let commit = self.repo.find_commit(Oid::from_str(id)?)?;
        let mut opts = DiffOptions::new();
        opts.context_lines(0);
        let diff = diff_against_first_parent(&self.repo, &commit, &mut opts)?;

        // Paths come from the delta, never from rendered patch headers.
        let mut region = DiffRegion::default();
        diff.foreach(
            &mut |_delta, _progress| true,
            None,
            None,
            Some(&mut |delta, _hunk, line| {
                if let Some(lineno) = line.old_lineno().filter(|_| line.origin() == '-') {
                    region.insert(file_path(&delta.old_file()), lineno);
                }
                true
            }),
        )?;
        Ok(region)
    }

    fn blame_at(&self, path: &str, parent: &str) -> Result<git2::Blame<'_>, git2::Error> {
        let mut opts = BlameOptions::new();
        opts.newest_commit(Oid::from_str(parent)?);
        self.repo.blame_file(Path::new(path), Some(&mut opts))
    }
}

/// Lazy, oldest-first stream of full commits.
///
/// Yields `Err` for a commit whose data the backend cannot produce; callers
/// decide whether to skip it. Once the cancel token fires, the stream yields
/// [`FaultlineError::Cancelled`] and ends.
pub struct CommitStream<'r> {
    repo: &'r Repository,
    walk: Option<Revwalk<'r>>,
    cancel: CancelToken,
}

impl Iterator for CommitStream<'_> {
    type Item = Result<Commit, FaultlineError>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = match next_oid(&mut self.walk, &self.cancel)? {
            Ok(oid) => oid,
            Err(e) => return Some(Err(e)),
        };
        Some(load_commit(self.repo, oid))
    }
}

/// Lazy, oldest-first stream of commit headers.
pub struct HeaderStream<'r> {
    repo: &'r Repository,
    walk: Option<Revwalk<'r>>,
    cancel: CancelToken,
}

impl Iterator for HeaderStream<'_> {
    type Item = Result<CommitHeader, FaultlineError>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = match next_oid(&mut self.walk, &self.cancel)? {
            Ok(oid) => oid,
            Err(e) => return Some(Err(e)),
        };
        let header = self
            .repo
            .find_commit(oid)
            .map(|commit| read_header(&commit))
            .map_err(|e| FaultlineError::Git(format!("failed to find commit {oid}: {e}")));
        Some(header)
    }
}

fn next_oid(
    walk: &mut Option<Revwalk<'_>>,
    cancel: &CancelToken,
) -> Option<Result<Oid, FaultlineError>> {
    let next = walk.as_mut()?.next()?;
    if let Err(e) = cancel.check() {
        // Report cancellation once, then end the stream.
        *walk = None;
        return Some(Err(e));
    }
    Some(next.map_err(|e| FaultlineError::Git(format!("revwalk error: {e}"))))
}

fn read_header(commit: &git2::Commit<'_>) -> CommitHeader {
    let author = commit.author();
    let committer = commit.committer();
    CommitHeader {
        id: commit.id().to_string(),
        parents: commit.parent_ids().map(|oid| oid.to_string()).collect(),
        author: identity(&author),
        timestamp: author.when().seconds(),
        committer: identity(&committer),
        commit_time: committer.when().seconds(),
        message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
    }
}

fn identity(signature: &git2::Signature<'_>) -> Author {
    Author::new(
        signature.name().unwrap_or("unknown"),
        signature.email().unwrap_or(""),
    )
}

fn load_commit(repo: &Repository, oid: Oid) -> Result<Commit, FaultlineError> {
    let commit = repo
        .find_commit(oid)
        .map_err(|e| FaultlineError::Git(format!("failed to find commit {oid}: {e}")))?;
    let changes = extract_file_changes(repo, &commit)
        .map_err(|e| FaultlineError::Git(format!("failed to diff commit {oid}: {e}")))?;
    Ok(Commit {
        header: read_header(&commit),
        changes,
    })
}

fn diff_against_first_parent<'r>(
    repo: &'r Repository,
    commit: &git2::Commit<'r>,
    opts: &mut DiffOptions,
) -> Result<Diff<'r>, git2::Error> {
    let commit_tree = commit.tree()?;
    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    let mut diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&commit_tree), Some(opts))?;

    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    diff.find_similar(Some(&mut find_opts))?;
    Ok(diff)
}

fn file_path(file: &git2::DiffFile<'_>) -> String {
    file.path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn extract_file_changes(
    repo: &Repository,
    commit: &git2::Commit<'_>,
) -> Result<Vec<FileChange>, git2::Error> {
    let mut opts = DiffOptions::new();
    let diff = diff_against_first_parent(repo, commit, &mut opts)?;

    let mut changes = Vec::with_capacity(diff.deltas().len());
    for (idx, delta) in diff.deltas().enumerate() {
        let new_path = file_path(&delta.new_file());
        let old_path = file_path(&delta.old_file());

        let (path, kind) = match delta.status() {
            Delta::Added => (new_path, ChangeKind::Added),
            Delta::Deleted => (old_path, ChangeKind::Deleted),
            Delta::Renamed => (new_path, ChangeKind::Renamed { from: old_path }),
            _ => (new_path, ChangeKind::Modified),
        };
        if path.is_empty() {
            continue;
        }

        let (lines_added, lines_deleted) = match Patch::from_diff(&diff, idx)? {
            Some(patch) => {
                let (_context, added, deleted) = patch.line_stats()?;
                (added as u64, deleted as u64)
            }
            None => (0, 0),
        };

        changes.push(FileChange {
            path,
            lines_added,
            lines_deleted,
            kind,
        });
    }

    Ok(changes)
}
