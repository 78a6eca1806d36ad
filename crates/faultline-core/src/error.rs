use std::path::PathBuf;

/// Errors that can occur while mining a repository.
///
/// Library crates use this type directly; the binary crate converts to
/// `miette` diagnostics at the boundary.
///
/// # Examples
///
/// ```
/// use faultline_core::FaultlineError;
///
/// let err = FaultlineError::InvalidCommit("zzz".into());
/// assert!(err.to_string().contains("zzz"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum FaultlineError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(faultline::config))]
    Config(String),

    /// The path does not point at a git repository.
    #[error("not a git repository: {}", .0.display())]
    #[diagnostic(
        code(faultline::not_a_repository),
        help("run inside a git working copy or pass --path")
    )]
    NotARepository(PathBuf),

    /// Git backend failure.
    #[error("git error: {0}")]
    Git(String),

    /// A commit identifier that is malformed or unknown to the repository.
    #[error("invalid commit: {0}")]
    #[diagnostic(code(faultline::invalid_commit))]
    InvalidCommit(String),

    /// The run was cancelled or its deadline expired.
    #[error("operation cancelled")]
    #[diagnostic(
        code(faultline::cancelled),
        help("raise --timeout or [linker] timeout_secs")
    )]
    Cancelled,

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(faultline::config))]
    Toml(#[from] toml::de::Error),
}

impl FaultlineError {
    /// Whether this error should abort the whole run rather than a single item.
    ///
    /// # Examples
    ///
    /// ```
    /// use faultline_core::FaultlineError;
    ///
    /// assert!(FaultlineError::Config("bad".into()).is_fatal());
    /// assert!(!FaultlineError::Git("no such revision".into()).is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FaultlineError::Config(_)
                | FaultlineError::NotARepository(_)
                | FaultlineError::Toml(_)
                | FaultlineError::Cancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: FaultlineError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = FaultlineError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn not_a_repository_shows_path() {
        let err = FaultlineError::NotARepository(PathBuf::from("/tmp/nowhere"));
        assert!(err.to_string().contains("/tmp/nowhere"));
    }

    #[test]
    fn backend_failures_are_not_fatal() {
        assert!(!FaultlineError::Git("refused".into()).is_fatal());
        assert!(!FaultlineError::InvalidCommit("abc".into()).is_fatal());
        assert!(FaultlineError::Cancelled.is_fatal());
    }
}
