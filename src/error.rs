use thiserror::Error;

/// Fatal errors: the whole invocation is rejected.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("search profile has no keywords")]
    NoKeywords,

    #[error("settings error: {0}")]
    Settings(#[from] config::ConfigError),
}

/// Why a single card could not be turned into a draft. Never aborts the batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("card has no text and no fragments")]
    EmptyCard,

    #[error("fragment {index} is malformed: {reason}")]
    MalformedFragment { index: usize, reason: String },
}

/// A card that was dropped from the run, kept so callers can inspect it.
#[derive(Debug, Clone, PartialEq)]
pub struct CardFailure {
    /// 1-based position of the card in the input.
    pub position: usize,
    pub locator: String,
    pub reason: ExtractError,
}
