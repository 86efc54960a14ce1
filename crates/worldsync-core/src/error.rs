use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for operator-facing decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    CatalogRejected,
    MissingTextures,
    StoreIo,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::CatalogRejected => "E1002",
            Self::MissingTextures => "E2001",
            Self::StoreIo => "E3001",
            Self::LockContention => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::CatalogRejected => "Catalog file rejected",
            Self::MissingTextures => "Referenced textures missing",
            Self::StoreIo => "Store read/write failed",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in worldsync.toml and retry."),
            Self::CatalogRejected => {
                Some("Re-export the catalog file; the envelope failed validation.")
            }
            Self::MissingTextures => {
                Some("Add the listed files to the texture directory before syncing.")
            }
            Self::StoreIo => Some("Check the store path, disk space, and permissions."),
            Self::LockContention => {
                Some("Retry after the other wsync process releases its lock.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Crate-wide reconciliation error.
///
/// Conflicts and unmapped category codes are *not* errors: they are reported
/// through decision events and counters. Everything here aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The catalog file failed envelope validation before any work started.
    #[error("catalog rejected: {reason}")]
    CatalogRejected {
        /// Why the envelope was refused.
        reason: String,
    },

    /// In-scope items reference textures with no resolved asset.
    ///
    /// Detected by the preflight before any write path is opened.
    #[error("{} referenced textures are missing: {}", missing.len(), missing.join(", "))]
    MissingTextures {
        /// Bare asset names with no backing file, sorted.
        missing: Vec<String>,
    },

    /// A store read or write failed. Not-found lookups are never this.
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Filesystem failure while reading catalog or asset files.
    #[error("io error at {path}: {source}")]
    Io {
        /// The file or directory that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::CatalogRejected { .. } => ErrorCode::CatalogRejected,
            Self::MissingTextures { .. } => ErrorCode::MissingTextures,
            Self::Store(_) => ErrorCode::StoreIo,
            Self::Io { .. } => ErrorCode::StoreIo,
        }
    }
}
