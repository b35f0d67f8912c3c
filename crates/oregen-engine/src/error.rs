use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid identifier: {0}")]
    Type(#[from] oregen_types::TypeError),

    #[error("ore type {0} is registered twice")]
    DuplicateOre(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] oregen_ledger::LedgerError),
}

pub type EngineResult<T> = Result<T, EngineError>;
