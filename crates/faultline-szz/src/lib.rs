//! Bug-inducing commit linking (SZZ).
//!
//! For every fix commit, the pre-image lines it removed or changed are
//! blamed at the fix's parent; the commits that last touched those lines are
//! linked to the fix as likely bug-inducing. Fixes are analysed in parallel
//! on a bounded worker pool and folded into a [`FixLinkMap`] in input order.

#![warn(missing_docs)]

pub mod analysis;
pub mod history;
pub mod linker;
pub mod links;

pub use analysis::{analyze_fix, CommitIndex, FixOutcome};
pub use history::History;
pub use linker::{LinkOptions, Linker};
pub use links::{FixLinkMap, FixRecord, LinkRecord, LinkReport};
