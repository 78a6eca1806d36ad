//! History access: commit streams, diff regions, and line blame via git2.
//!
//! [`HistoryAccessor`] is the single query layer both engines go through.
//! Blame and diff results are memoized in a [`QueryCache`] that can be
//! shared across threads, and every backend call honours a [`CancelToken`].

pub mod accessor;
pub mod cache;
pub mod cancel;
pub mod commit;
#[cfg(feature = "fixture")]
pub mod fixture;
pub mod filter;
pub mod region;

pub use accessor::{CommitStream, HeaderStream, HistoryAccessor};
pub use cache::{CacheStats, QueryCache};
pub use cancel::CancelToken;
pub use commit::{Author, ChangeKind, Commit, CommitHeader, FileChange};
pub use filter::SourceFilter;
pub use region::DiffRegion;
