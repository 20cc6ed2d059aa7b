use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("server seed is not valid hex: {0}")]
    InvalidSeed(String),
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("invalid reel configuration: {0}")]
    InvalidReels(String),
    #[error("payline {0} reads a row outside the visible window")]
    InvalidPayline(usize),
}

/// Why a spin was refused. Everything except `Engine` is the caller's fault
/// and leaves no state behind.
#[derive(Debug, Error, PartialEq)]
pub enum SpinError {
    #[error("missing commitId")]
    MissingCommitment,
    #[error("invalid bet amount: {0}")]
    BetOutOfRange(f64),
    #[error("invalid or expired commitId")]
    UnknownCommitment,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl SpinError {
    pub fn is_client_error(&self) -> bool {
        !matches!(self, SpinError::Engine(_))
    }
}
