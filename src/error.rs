//! Error types for Fortell.

use thiserror::Error;

/// Library-level error type for Fortell operations.
#[derive(Error, Debug)]
pub enum FortellError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio download failed: {0}")]
    AudioDownload(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Speech synthesis failed: {0}")]
    SpeechSynthesis(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Fortell operations.
pub type Result<T> = std::result::Result<T, FortellError>;
