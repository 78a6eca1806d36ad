//! Developer experience counters.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use faultline_history::Author;

const SECONDS_PER_YEAR: f64 = 365.25 * 86_400.0;

/// Experience of an author right before a commit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Experience {
    /// Prior commits by the author.
    pub exp: u64,
    /// Prior commits by the author in the subsystems the commit touches.
    pub sexp: u64,
    /// Prior commits weighted by `1 / (1 + years since)`.
    pub rexp: f64,
}

#[derive(Debug, Clone, Default)]
struct AuthorHistory {
    commits: u64,
    subsystems: BTreeMap<String, u64>,
    timestamps: Vec<i64>,
}

/// Per-author commit history, keyed by author identity.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use faultline_history::Author;
/// use faultline_metrics::DeveloperExperience;
///
/// let alice = Author::new("alice", "alice@example.com");
/// let core = BTreeSet::from(["core".to_string()]);
/// let mut experience = DeveloperExperience::default();
///
/// assert_eq!(experience.before(&alice, &core, 0).exp, 0);
/// experience.record(&alice, &core, 0);
/// let next = experience.before(&alice, &core, 0);
/// assert_eq!(next.exp, 1);
/// assert_eq!(next.sexp, 1);
/// assert_eq!(next.rexp, 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeveloperExperience {
    authors: HashMap<Author, AuthorHistory>,
}

impl DeveloperExperience {
    /// Experience of `author` for a commit at `timestamp` touching
    /// `subsystems`, counting only commits already recorded.
    pub fn before(&self, author: &Author, subsystems: &BTreeSet<String>, timestamp: i64) -> Experience {
        let Some(history) = self.authors.get(author) else {
            return Experience::default();
        };

        let sexp = subsystems
            .iter()
            .filter_map(|subsystem| history.subsystems.get(subsystem))
            .sum();
        let rexp = history
            .timestamps
            .iter()
            .map(|&then| {
                let years = ((timestamp - then) as f64 / SECONDS_PER_YEAR).max(0.0);
                1.0 / (1.0 + years)
            })
            .sum();

        Experience {
            exp: history.commits,
            sexp,
            rexp,
        }
    }

    /// Count a commit by `author`.
    pub fn record(&mut self, author: &Author, subsystems: &BTreeSet<String>, timestamp: i64) {
        let history = self.authors.entry(author.clone()).or_default();
        history.commits += 1;
        history.timestamps.push(timestamp);
        for subsystem in subsystems {
            *history.subsystems.entry(subsystem.clone()).or_default() += 1;
        }
    }

    /// Commits recorded for `author`.
    pub fn commits_by(&self, author: &Author) -> u64 {
        self.authors.get(author).map_or(0, |history| history.commits)
    }

    /// Number of distinct authors seen.
    pub fn author_count(&self) -> usize {
        self.authors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unknown_author_has_no_experience() {
        let experience = DeveloperExperience::default();
        let bob = Author::new("bob", "bob@example.com");
        assert_eq!(experience.before(&bob, &set(&["core"]), 0), Experience::default());
    }

    #[test]
    fn subsystem_experience_only_counts_touched_subsystems() {
        let alice = Author::new("alice", "alice@example.com");
        let mut experience = DeveloperExperience::default();
        experience.record(&alice, &set(&["core"]), 0);
        experience.record(&alice, &set(&["core", "docs"]), 0);
        experience.record(&alice, &set(&["cli"]), 0);

        assert_eq!(experience.before(&alice, &set(&["core"]), 0).sexp, 2);
        assert_eq!(experience.before(&alice, &set(&["core", "cli"]), 0).sexp, 3);
        assert_eq!(experience.before(&alice, &set(&["web"]), 0).sexp, 0);
        assert_eq!(experience.before(&alice, &set(&["web"]), 0).exp, 3);
    }

    #[test]
    fn recent_experience_decays_with_age() {
        let alice = Author::new("alice", "alice@example.com");
        let mut experience = DeveloperExperience::default();
        experience.record(&alice, &set(&["core"]), 0);

        let a_year_later = SECONDS_PER_YEAR as i64;
        let rexp = experience.before(&alice, &set(&["core"]), a_year_later).rexp;
        assert!((rexp - 0.5).abs() < 1e-9);
    }

    #[test]
    fn clock_skew_does_not_inflate_recent_experience() {
        let alice = Author::new("alice", "alice@example.com");
        let mut experience = DeveloperExperience::default();
        experience.record(&alice, &set(&[]), 1_000_000);
        assert_eq!(experience.before(&alice, &set(&[]), 0).rexp, 1.0);
    }

    #[test]
    fn authors_are_keyed_by_name_and_email() {
        let mut experience = DeveloperExperience::default();
        experience.record(&Author::new("alice", "a@work"), &set(&[]), 0);
        experience.record(&Author::new("alice", "a@home"), &set(&[]), 0);
        assert_eq!(experience.author_count(), 2);
        assert_eq!(experience.commits_by(&Author::new("alice", "a@work")), 1);
    }
}
