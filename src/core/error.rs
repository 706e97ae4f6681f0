use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisError {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Stale handle: {0}")]
    StaleHandle(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Invalid cue script '{input}': {message}")]
    CueParse { input: String, message: String },

    #[error("Log line {line}: {message}")]
    LogParse { line: usize, message: String },

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VisError>;
