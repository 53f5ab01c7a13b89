use thiserror::Error;

/// Errors raised while loading or writing a manifest document.
///
/// These are structural failures only; semantic problems in a well-formed
/// manifest are reported by the validator as a list instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing the manifest file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing or conversion failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// TOML parsing failed.
    #[error("toml parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
    /// TOML serialization failed.
    #[error("toml write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    /// The document is not a well-formed manifest.
    #[error("malformed manifest: {0}")]
    Structure(String),
    /// The file extension does not map to a known format.
    #[error("unsupported manifest format: {0}")]
    UnsupportedFormat(String),
}

/// Convenience alias for results returned by BFT crates.
pub type Result<T> = std::result::Result<T, Error>;
