use std::path::PathBuf;

/// Errors raised while loading or verifying scheme definitions.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SchemeError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML in {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse stage table of scheme {scheme}: {source}")]
    Csv {
        scheme: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid definition of scheme {scheme}: {message}")]
    InvalidDefinition { scheme: String, message: String },

    #[error("scheme {scheme} is inconsistent: {}", .issues.join("; "))]
    Inconsistent { scheme: String, issues: Vec<String> },

    #[error("duplicate scheme id: {id}")]
    DuplicateScheme { id: String },

    #[error("invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("invalid sha256 for {path}: {message}")]
    InvalidSha256 { path: PathBuf, message: String },

    #[error("invalid manifest path {path}: {message}")]
    InvalidPath { path: PathBuf, message: String },

    #[error("missing file listed in manifest: {path}")]
    MissingFile { path: PathBuf },

    #[error("unexpected file present in scheme directory: {path}")]
    UnexpectedFile { path: PathBuf },

    #[error("sha256 mismatch for {path} (expected {expected}, got {actual})")]
    Sha256Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

impl SchemeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn definition(scheme: &str, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            scheme: scheme.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemeError>;
