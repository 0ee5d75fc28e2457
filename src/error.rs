use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("row source unavailable: {0}")]
    Source(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
