//! Parallel fix linking over one repository.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use faultline_core::{FaultlineError, RunReport, Skipped};
use faultline_history::{CancelToken, CommitHeader, HistoryAccessor, QueryCache, SourceFilter};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::analysis::{analyze_fix, CommitIndex, FixOutcome};
use crate::links::LinkReport;

/// Linker tuning.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkOptions {
    /// Worker threads; `None` uses the available parallelism.
    pub workers: Option<usize>,
}

/// Links fix commits to the commits that introduced the lines they changed.
///
/// Every worker opens its own [`HistoryAccessor`] on the repository, and all
/// of them share one [`QueryCache`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use faultline_history::{CancelToken, HistoryAccessor, SourceFilter};
/// use faultline_szz::{LinkOptions, Linker};
///
/// let history = HistoryAccessor::open(".".as_ref()).unwrap();
/// let linker = Linker::new(".", Arc::new(SourceFilter::default()), LinkOptions::default());
/// let fixes = vec!["4f2a9c1".to_string()];
/// let report = linker
///     .link(history.headers_of(None).unwrap(), &fixes, &CancelToken::new())
///     .unwrap();
/// for record in report.items.links.records() {
///     println!("{} <- {:?}", record.origin, record.fixes);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Linker {
    repo: PathBuf,
    filter: Arc<SourceFilter>,
    cache: Arc<QueryCache>,
    workers: usize,
}

impl Linker {
    /// Linker over the repository at `repo`, with a fresh cache.
    pub fn new(repo: impl Into<PathBuf>, filter: Arc<SourceFilter>, options: LinkOptions) -> Self {
        let workers = options
            .workers
            .filter(|&n| n > 0)
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(NonZeroUsize::get)
                    .unwrap_or(1)
            });
        Self {
            repo: repo.into(),
            filter,
            cache: Arc::new(QueryCache::new()),
            workers,
        }
    }

    /// Share an existing cache instead of starting empty.
    pub fn with_cache(mut self, cache: Arc<QueryCache>) -> Self {
        self.cache = cache;
        self
    }

    /// The cache shared by all workers.
    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Link every fix in `fixes` against the history given by `headers`.
    ///
    /// Duplicate fix ids are analysed once. Fixes that produce no links are
    /// listed in the report's skipped entries; once `cancel` fires, the
    /// remaining fixes are skipped as `cancelled`.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be opened, the header
    /// stream fails fatally, or the worker pool cannot start.
    pub fn link<I>(
        &self,
        headers: I,
        fixes: &[String],
        cancel: &CancelToken,
    ) -> Result<RunReport<LinkReport>, FaultlineError>
    where
        I: IntoIterator<Item = Result<CommitHeader, FaultlineError>>,
    {
        // Fail fast on a bad path before spinning up workers.
        self.open(cancel)?;

        let mut index = Vec::new();
        for header in headers {
            match header {
                Ok(header) => index.push(header),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!(error = %e, "skipping unreadable commit header"),
            }
        }
        let index = CommitIndex::new(index);

        let mut seen = HashSet::new();
        let fixes: Vec<&str> = fixes
            .iter()
            .map(|fix| fix.trim())
            .filter(|fix| !fix.is_empty() && seen.insert(*fix))
            .collect();
        debug!(fixes = fixes.len(), commits = index.len(), workers = self.workers, "linking");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| FaultlineError::Config(format!("failed to start worker pool: {e}")))?;

        let outcomes: Vec<Result<FixOutcome, FaultlineError>> = pool.install(|| {
            fixes
                .par_iter()
                .map_init(
                    || self.open(cancel),
                    |history, fix| {
                        if cancel.is_cancelled() {
                            return Err(FaultlineError::Cancelled);
                        }
                        match history {
                            Ok(history) => analyze_fix(&*history, fix, &index),
                            Err(e) => Err(FaultlineError::Git(e.to_string())),
                        }
                    },
                )
                .collect()
        });

        let report = fold(&fixes, outcomes);
        let stats = self.cache.stats();
        info!(
            processed = report.processed,
            skipped = report.skipped.len(),
            origins = report.items.links.len(),
            cache_hits = stats.hits,
            cache_misses = stats.misses,
            "link pass complete"
        );
        Ok(report)
    }

    fn open(&self, cancel: &CancelToken) -> Result<HistoryAccessor, FaultlineError> {
        Ok(HistoryAccessor::open(&self.repo)?
            .with_filter(Arc::clone(&self.filter))
            .with_cache(Arc::clone(&self.cache))
            .with_cancel(cancel.clone()))
    }
}

/// Fold per-fix outcomes into a report, in input order.
fn fold(fixes: &[&str], outcomes: Vec<Result<FixOutcome, FaultlineError>>) -> RunReport<LinkReport> {
    let mut report = RunReport::new(LinkReport::default());
    for (fix, outcome) in fixes.iter().zip(outcomes) {
        match outcome {
            Ok(FixOutcome::Linked(record)) => {
                report.items.record(record);
                report.processed += 1;
            }
            Ok(FixOutcome::Skipped { id, reason }) => {
                debug!(fix = %id, %reason, "fix skipped");
                report.skip(Skipped::new(id, reason));
            }
            Err(FaultlineError::Cancelled) => report.skip(Skipped::new(*fix, "cancelled")),
            Err(e) => {
                warn!(fix, error = %e, "fix analysis failed");
                report.skip(Skipped::new(*fix, e.to_string()));
            }
        }
    }
    report
}
