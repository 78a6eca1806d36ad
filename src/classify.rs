//! Keyword-based commit message classification.
//!
//! Supplies the fix set for `faultline link` when no explicit list is given.

use std::fmt;

use faultline_history::CommitHeader;
use serde::Serialize;

/// Maintenance category of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Corrective,
    FeatureAddition,
    Preventative,
    Perfective,
    NonFunctional,
    #[serde(rename = "none")]
    Unclassified,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Corrective => "corrective",
            Category::FeatureAddition => "featureAddition",
            Category::Preventative => "preventative",
            Category::Perfective => "perfective",
            Category::NonFunctional => "nonFunctional",
            Category::Unclassified => "none",
        };
        f.write_str(name)
    }
}

/// Checked in order; the first category with a matching keyword wins.
const TAXONOMY: &[(Category, &[&str])] = &[
    (Category::Corrective, &["fix", "bug", "wrong", "fail", "problem"]),
    (
        Category::FeatureAddition,
        &["new", "add", "requirement", "initial", "create"],
    ),
    (Category::Preventative, &["test", "junit", "coverage", "assert"]),
    (Category::Perfective, &["clean", "better"]),
    (Category::NonFunctional, &["doc", "merge"]),
];

/// Classify a commit message. A keyword matches when it occurs anywhere in
/// a word, ignoring case.
pub fn classify(message: &str) -> Category {
    let words: Vec<String> = message.split_whitespace().map(str::to_lowercase).collect();
    TAXONOMY
        .iter()
        .find(|(_, keywords)| {
            words
                .iter()
                .any(|word| keywords.iter().any(|keyword| word.contains(keyword)))
        })
        .map_or(Category::Unclassified, |(category, _)| *category)
}

/// One classified commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedCommit {
    pub hash: String,
    pub category: Category,
    pub message: String,
}

/// Classify every non-merge commit, keeping stream order.
pub fn classify_all(headers: &[CommitHeader]) -> Vec<ClassifiedCommit> {
    headers
        .iter()
        .filter(|header| !header.is_merge())
        .map(|header| ClassifiedCommit {
            hash: header.id.clone(),
            category: classify(&header.message),
            message: header.summary().to_string(),
        })
        .collect()
}

/// Ids of the corrective commits among `headers`.
pub fn corrective_ids(headers: &[CommitHeader]) -> Vec<String> {
    classify_all(headers)
        .into_iter()
        .filter(|commit| commit.category == Category::Corrective)
        .map(|commit| commit.hash)
        .collect()
}
