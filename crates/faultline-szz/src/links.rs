//! Link results.

use std::collections::{BTreeMap, BTreeSet};

use faultline_history::DiffRegion;
use serde::Serialize;

/// Mapping from origin commit to the fix commits that blame it.
///
/// Each origin holds a set: a fix is recorded once per origin however many
/// of its lines implicate it, and distinct fixes blaming the same origin all
/// appear.
///
/// # Examples
///
/// ```
/// use faultline_szz::FixLinkMap;
///
/// let mut links = FixLinkMap::default();
/// links.add("b1", "f1");
/// links.add("b1", "f1");
/// links.add("b1", "f2");
/// assert_eq!(links.fixes_for("b1").unwrap().len(), 2);
/// assert_eq!(links.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FixLinkMap {
    links: BTreeMap<String, BTreeSet<String>>,
}

impl FixLinkMap {
    /// Link `fix` to `origin`.
    pub fn add(&mut self, origin: impl Into<String>, fix: impl Into<String>) {
        self.links.entry(origin.into()).or_default().insert(fix.into());
    }

    /// Fixes linked to `origin`.
    pub fn fixes_for(&self, origin: &str) -> Option<&BTreeSet<String>> {
        self.links.get(origin)
    }

    /// Whether `origin` is linked to any fix.
    pub fn contains(&self, origin: &str) -> bool {
        self.links.contains_key(origin)
    }

    /// Number of origins.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether no origin was linked.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Iterate `(origin, fixes)` in origin order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.links.iter().map(|(origin, fixes)| (origin.as_str(), fixes))
    }

    /// Output records, sorted by origin.
    pub fn records(&self) -> Vec<LinkRecord> {
        self.iter()
            .map(|(origin, fixes)| LinkRecord {
                origin: origin.to_string(),
                fixes: fixes.iter().cloned().collect(),
            })
            .collect()
    }
}

/// One origin commit and the fixes blaming it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    /// Suspected bug-inducing commit.
    pub origin: String,
    /// Fixes that blamed it, sorted.
    pub fixes: Vec<String>,
}

/// What the analysis of one fix found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixRecord {
    /// Full id of the fix commit.
    pub fix: String,
    /// Retained origin commits, sorted.
    pub linked_to: Vec<String>,
    /// Pre-image lines the fix removed or changed.
    pub modified_regions: DiffRegion,
}

/// Result of a link run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkReport {
    /// Origin to fixes.
    pub links: FixLinkMap,
    /// Per-fix details, in input order.
    pub fixes: Vec<FixRecord>,
}

impl LinkReport {
    /// Fold one analysed fix into the report.
    pub fn record(&mut self, fix: FixRecord) {
        for origin in &fix.linked_to {
            self.links.add(origin.as_str(), fix.fix.as_str());
        }
        self.fixes.push(fix);
    }
}
