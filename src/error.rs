use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SyncError {
    #[error("catalog request failed: {0}")]
    CatalogHttp(String),

    #[error("catalog returned status {status}: {message}")]
    CatalogStatus { status: u16, message: String },

    #[error("failed to parse catalog response: {0}")]
    CatalogParse(String),

    #[error("dataset request failed: {0}")]
    DatasetHttp(String),

    #[error("dataset returned status {status}: {message}")]
    DatasetStatus { status: u16, message: String },

    #[error("descriptor has no download URL: {0}")]
    MissingDownloadUrl(String),

    #[error("invalid download URL: {0}")]
    InvalidDownloadUrl(String),

    #[error("malformed tabular data: {0}")]
    Table(String),

    #[error("failed to read metadata file at {0}")]
    MetadataRead(PathBuf),

    #[error("failed to parse metadata file: {0}")]
    MetadataParse(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
