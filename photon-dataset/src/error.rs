use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("unknown split: {0}")]
    UnknownSplit(String),

    #[error("sample index {index} out of range (dataset length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse split list {path}: {source}")]
    SplitList {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed category file line: {0:?}")]
    CategoryLine(String),

    #[error("malformed sample table {path}: {message}")]
    Table { path: PathBuf, message: String },
}
