//! Common error types for kanjidex

use thiserror::Error;

/// Common result type for kanjidex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which step of entry reconciliation was in flight when a failure occurred.
///
/// Reconciliation spans three collections with no transactional boundary;
/// an error surfaced with a phase tells the caller how far the entry got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePhase {
    Kanji,
    CompoundWords,
    ExampleSentences,
}

impl std::fmt::Display for ReconcilePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcilePhase::Kanji => write!(f, "kanji upsert"),
            ReconcilePhase::CompoundWords => write!(f, "compound word linking"),
            ReconcilePhase::ExampleSentences => write!(f, "example sentence linking"),
        }
    }
}

/// Common error types across the kanjidex crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Document encode/decode error (wraps serde_json::Error)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested record not found (update/delete targets, id lookups)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Create attempted for a natural key that already has a record
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Imported entry is missing a required field for its target shape
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Entry reconciliation aborted partway; earlier phases are already
    /// applied and are not rolled back.
    #[error("Reconciliation of kanji '{kanji}' aborted during {phase}: {source}")]
    Reconcile {
        kanji: String,
        phase: ReconcilePhase,
        #[source]
        source: Box<Error>,
    },

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}
