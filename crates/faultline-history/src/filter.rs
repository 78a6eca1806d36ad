//! Allow-list of recognized source files.
//!
//! Both engines run every path through the same [`SourceFilter`] so that
//! build artifacts, binaries, and other noise never reach the analysis.

use std::collections::HashSet;
use std::path::Path;

use faultline_core::{FaultlineError, FilterConfig};

/// Files and patterns that count as tracked source.
///
/// # Examples
///
/// ```
/// use faultline_history::SourceFilter;
///
/// let filter = SourceFilter::default();
/// assert!(filter.is_tracked("src/app.py"));
/// assert!(filter.is_tracked("docker/Dockerfile"));
/// assert!(!filter.is_tracked("assets/logo.png"));
/// ```
#[derive(Debug, Clone)]
pub struct SourceFilter {
    extensions: HashSet<String>,
    basenames: HashSet<String>,
    patterns: Vec<glob::Pattern>,
}

impl SourceFilter {
    /// Build a filter from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FaultlineError::Config`] if a glob pattern is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use faultline_core::FilterConfig;
    /// use faultline_history::SourceFilter;
    ///
    /// let config = FilterConfig {
    ///     extensions: vec!["PY".into()],
    ///     basenames: vec![],
    ///     patterns: vec!["tools/*.txt".into()],
    /// };
    /// let filter = SourceFilter::from_config(&config).unwrap();
    /// assert!(filter.is_tracked("a/b.py"));
    /// assert!(filter.is_tracked("tools/list.txt"));
    /// assert!(!filter.is_tracked("a/b.rs"));
    /// ```
    pub fn from_config(config: &FilterConfig) -> Result<Self, FaultlineError> {
        let mut patterns = Vec::with_capacity(config.patterns.len());
        for pat in &config.patterns {
            let compiled = glob::Pattern::new(pat).map_err(|e| {
                FaultlineError::Config(format!("invalid filter pattern '{pat}': {e}"))
            })?;
            patterns.push(compiled);
        }

        Ok(Self {
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            basenames: config.basenames.iter().cloned().collect(),
            patterns,
        })
    }

    /// Check whether a repository-relative path is tracked.
    pub fn is_tracked(&self, path: &str) -> bool {
        let p = Path::new(path);

        if let Some(name) = p.file_name().and_then(|n| n.to_str()) {
            if self.basenames.contains(name) {
                return true;
            }
        }

        if let Some(ext) = p.extension().and_then(|e| e.to_str()) {
            if self.extensions.contains(&ext.to_ascii_lowercase()) {
                return true;
            }
        }

        self.patterns.iter().any(|pat| pat.matches(path))
    }
}

impl Default for SourceFilter {
    fn default() -> Self {
        let config = FilterConfig::default();
        Self {
            extensions: config.extensions.into_iter().collect(),
            basenames: config.basenames.into_iter().collect(),
            patterns: Vec::new(),
        }
    }
}
