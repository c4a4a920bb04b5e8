//! Error types for the scenario core.
//!
//! The index and the graph model never fail on data-shape problems: bounds
//! violations, self loops, duplicate ids and absent removals are reported
//! through `bool`/`Option` return values. The enums below cover the few
//! genuine failures: bad settings access, unreadable scenario sources and
//! broken snapshots.

/// Invalid access to the scenario settings record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The key is not part of the closed settings set
    #[error("'{0}' is not a valid setting")]
    UnknownKey(String),

    /// The key exists but the value has the wrong kind
    #[error("setting '{key}' expects a {expected} value")]
    WrongKind {
        /// Canonical key name
        key: &'static str,
        /// Kind the setting stores
        expected: &'static str,
    },
}

/// Terminal failure while reading a scenario script.
///
/// Raised before any parse pass runs, so a caller that sees this error can
/// rely on its live scenario being untouched.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// The source could not be read at all
    #[error("unable to read scenario source: {0}")]
    Io(#[from] std::io::Error),

    /// The source is not UTF-8 text
    #[error("scenario source is not valid UTF-8 text (byte offset {offset})")]
    Encoding {
        /// Offset of the first invalid byte
        offset: usize,
    },

    /// A block is closed without being opened, or never closed
    #[error("unbalanced braces in scenario source at line {line}")]
    Unbalanced {
        /// 1-based line where the imbalance was detected
        line: usize,
    },
}

/// Failure while saving or restoring a session snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Snapshot file could not be read or written
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot contents are not valid JSON for the record types
    #[error("snapshot serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot was written by an incompatible format revision
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the snapshot
        found: u32,
        /// Version this build understands
        expected: u32,
    },
}
