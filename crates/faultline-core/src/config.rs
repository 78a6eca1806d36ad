use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FaultlineError;

/// Top-level configuration loaded from `.faultline.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use faultline_core::FaultlineConfig;
///
/// let config = FaultlineConfig::default();
/// assert!(config.history.branch.is_none());
/// assert!(config.filter.extensions.contains(&"py".to_string()));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaultlineConfig {
    /// Commit stream settings.
    #[serde(default)]
    pub history: HistoryConfig,
    /// Allow-list of recognized source files.
    #[serde(default)]
    pub filter: FilterConfig,
    /// Bug-inducing commit linker settings.
    #[serde(default)]
    pub linker: LinkerConfig,
}

impl FaultlineConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FaultlineError::Io`] if the file cannot be read, or
    /// [`FaultlineError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use faultline_core::FaultlineConfig;
    /// use std::path::Path;
    ///
    /// let config = FaultlineConfig::from_file(Path::new(".faultline.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, FaultlineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`FaultlineError::Toml`] if parsing fails, or
    /// [`FaultlineError::Config`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use faultline_core::FaultlineConfig;
    ///
    /// let toml = r#"
    /// [linker]
    /// workers = 2
    /// "#;
    /// let config = FaultlineConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.linker.workers, Some(2));
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, FaultlineError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), FaultlineError> {
        if self.linker.workers == Some(0) {
            return Err(FaultlineError::Config(
                "linker.workers must be at least 1".into(),
            ));
        }
        if self.filter.extensions.is_empty()
            && self.filter.basenames.is_empty()
            && self.filter.patterns.is_empty()
        {
            return Err(FaultlineError::Config(
                "filter allow-list is empty; no file would ever be analyzed".into(),
            ));
        }
        Ok(())
    }
}

/// Which history to traverse.
///
/// # Examples
///
/// ```
/// use faultline_core::HistoryConfig;
///
/// let config = HistoryConfig { branch: Some("main".into()) };
/// assert_eq!(config.branch.as_deref(), Some("main"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Branch or ref to walk (default: HEAD).
    pub branch: Option<String>,
}

/// Allow-list of recognized source-file types shared by both engines.
///
/// A path is tracked when its extension is in `extensions`, its file name is
/// in `basenames`, or it matches one of the glob `patterns`.
///
/// # Examples
///
/// ```
/// use faultline_core::FilterConfig;
///
/// let config = FilterConfig::default();
/// assert!(config.extensions.contains(&"rs".to_string()));
/// assert!(config.basenames.contains(&"Makefile".to_string()));
/// assert!(config.patterns.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// File extensions without the leading dot, compared case-insensitively.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Exact file names such as `Makefile` or `Dockerfile`.
    #[serde(default = "default_basenames")]
    pub basenames: Vec<String>,
    /// Additional glob patterns matched against the full path.
    #[serde(default)]
    pub patterns: Vec<String>,
}

const DEFAULT_EXTENSIONS: &[&str] = &[
    // source
    "py", "rs", "c", "h", "cc", "cpp", "cxx", "hpp", "hh", "java", "kt", "kts", "scala", "go",
    "rb", "php", "js", "jsx", "mjs", "cjs", "ts", "tsx", "cs", "swift", "m", "mm", "sh", "bash",
    "pl", "pm", "lua", "r", "sql", "vue", "svelte", "dart", "ex", "exs", "erl", "hs", "clj",
    "groovy", "zig",
    // build
    "gradle", "cmake", "mk", "bazel", "bzl",
    // config
    "toml", "yaml", "yml", "json", "xml", "ini", "cfg", "conf", "properties",
];

const DEFAULT_BASENAMES: &[&str] = &[
    "Makefile",
    "CMakeLists.txt",
    "Dockerfile",
    "Gemfile",
    "Rakefile",
    "Jenkinsfile",
    "BUILD",
    "WORKSPACE",
    "go.mod",
    "requirements.txt",
];

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect()
}

fn default_basenames() -> Vec<String> {
    DEFAULT_BASENAMES.iter().map(|s| (*s).to_string()).collect()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            basenames: default_basenames(),
            patterns: Vec::new(),
        }
    }
}

/// Bug-inducing commit linker configuration.
///
/// # Examples
///
/// ```
/// use faultline_core::LinkerConfig;
///
/// let config = LinkerConfig::default();
/// assert!(config.workers.is_none());
/// assert!(config.timeout_secs.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkerConfig {
    /// Worker threads for fix analysis (default: available parallelism).
    pub workers: Option<usize>,
    /// Wall-clock budget for the whole linking run, in seconds.
    pub timeout_secs: Option<u64>,
}
