use formats::FormatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid file name {name:?}: {reason}")]
    InvalidInput { name: String, reason: &'static str },

    #[error("unknown dataset {0:?}")]
    UnknownDataset(String),

    #[error("{dataset}/{file} not found")]
    NotFound { dataset: String, file: String },

    #[error("failed to read {dataset}/{file}: {source}")]
    Io {
        dataset: String,
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{dataset}/{file} is corrupt: {source}")]
    Corrupt {
        dataset: String,
        file: String,
        #[source]
        source: FormatError,
    },
}
