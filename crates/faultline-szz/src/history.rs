//! The history queries the linker depends on.

use std::collections::{BTreeMap, BTreeSet};

use faultline_core::FaultlineError;
use faultline_history::{CommitHeader, DiffRegion, HistoryAccessor};

/// Backend for fix analysis.
///
/// Implemented by [`HistoryAccessor`]; tests substitute canned histories.
pub trait History {
    /// Look up a commit by full or abbreviated id.
    fn resolve(&self, id: &str) -> Result<CommitHeader, FaultlineError>;

    /// Pre-image lines `commit` removed or changed, per tracked file.
    fn modified_lines(&self, commit: &CommitHeader) -> Result<DiffRegion, FaultlineError>;

    /// Origin commit of each of `lines` in `path` as of `commit`'s parent.
    /// Lines without evidence are absent.
    fn origins_of(
        &self,
        path: &str,
        lines: &BTreeSet<u32>,
        commit: &CommitHeader,
    ) -> Result<BTreeMap<u32, String>, FaultlineError>;
}

impl History for HistoryAccessor {
    fn resolve(&self, id: &str) -> Result<CommitHeader, FaultlineError> {
        HistoryAccessor::resolve(self, id)
    }

    fn modified_lines(&self, commit: &CommitHeader) -> Result<DiffRegion, FaultlineError> {
        HistoryAccessor::modified_lines(self, commit)
    }

    fn origins_of(
        &self,
        path: &str,
        lines: &BTreeSet<u32>,
        commit: &CommitHeader,
    ) -> Result<BTreeMap<u32, String>, FaultlineError> {
        HistoryAccessor::origins_of(self, path, lines.iter().copied(), commit)
    }
}
