use camino::Utf8PathBuf;
use thiserror::Error;

use crate::catalog::filter::FilterReport;

#[derive(Error, Debug)]
pub enum Gaia3dError {
    #[error("Catalog query failed: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Catalog service returned an error: {0}")]
    ServiceError(String),

    #[error("Unexpected catalog response format: {0}")]
    CatalogFormat(String),

    #[error("No star left after filtering ({0})")]
    EmptyResultSet(FilterReport),

    #[error("Unable to write {path}: {source}")]
    WriteFailure {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to read {path}: {source}")]
    ReadFailure {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Orbit integration failed: {0}")]
    IntegrationFailure(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image encoding error: {0}")]
    ImageEncoding(#[from] image::ImageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unable to perform I/O operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Logger initialization failed: {0}")]
    LoggerInit(#[from] flexi_logger::FlexiLoggerError),
}

impl PartialEq for Gaia3dError {
    fn eq(&self, other: &Self) -> bool {
        use Gaia3dError::*;
        match (self, other) {
            (ServiceError(a), ServiceError(b)) => a == b,
            (CatalogFormat(a), CatalogFormat(b)) => a == b,
            (EmptyResultSet(a), EmptyResultSet(b)) => a == b,
            (WriteFailure { path: a, .. }, WriteFailure { path: b, .. }) => a == b,
            (ReadFailure { path: a, .. }, ReadFailure { path: b, .. }) => a == b,
            (IntegrationFailure(a), IntegrationFailure(b)) => a == b,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,

            // not comparable: same variant is enough
            (NetworkFailure(_), NetworkFailure(_)) => true,
            (Serialization(_), Serialization(_)) => true,
            (ImageEncoding(_), ImageEncoding(_)) => true,
            (Csv(_), Csv(_)) => true,
            (IoError(_), IoError(_)) => true,
            (LoggerInit(_), LoggerInit(_)) => true,

            _ => false,
        }
    }
}
