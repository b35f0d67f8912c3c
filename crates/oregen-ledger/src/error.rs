/// Errors from ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The ledger has not been opened, or has been shut down.
    #[error("ledger store is unavailable")]
    Unavailable,

    /// Error reported by SQLite.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O error while preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted row could not be decoded into a ledger entry.
    #[error("invalid ledger row: {0}")]
    InvalidRow(String),

    /// The configured legacy table name is not a plain SQL identifier.
    #[error("invalid legacy table name: {0:?}")]
    InvalidTableName(String),

    /// A legacy-table operation was requested but no legacy ore is configured.
    #[error("no legacy ore type is configured")]
    LegacyDisabled,

    /// A thread panicked while holding the ledger lock.
    #[error("ledger lock poisoned")]
    LockPoisoned,
}

impl LedgerError {
    /// Returns `true` for errors that mean "the store is not there", as
    /// opposed to a fault inside an open store.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
