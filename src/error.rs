use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Failed to parse XML at byte {position}: {message}")]
    Parse { position: u64, message: String },

    #[error("Found <{record}> records but no <{section}> section to rewrite")]
    MissingSection { section: String, record: String },

    #[error("Invalid output file name: {0}")]
    InvalidFileName(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Selection references record {0}, which is not in the batch")]
    UnknownRecord(usize),

    #[error("Failed to write XML: {0}")]
    Write(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SplitError {
    pub(crate) fn parse(position: u64, message: impl Into<String>) -> Self {
        SplitError::Parse {
            position,
            message: message.into(),
        }
    }
}
