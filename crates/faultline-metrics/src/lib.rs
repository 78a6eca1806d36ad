//! Incremental change metrics for defect prediction.
//!
//! Walks a commit stream oldest-first and emits, for every non-merge commit,
//! churn, diffusion, file-age, and developer-experience metrics. File and
//! developer state is owned by one [`Accumulator`] and threaded through the
//! pass, so independent runs never share state.

pub mod accumulator;
pub mod experience;
pub mod state;

pub use accumulator::{entropy, Accumulator, CommitMetrics};
pub use experience::{DeveloperExperience, Experience};
pub use state::{FileState, FileTable, RenameConfidence, RenameLink};
