//! Error types for resubscribe.

use crate::model::ItemState;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read input {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("progress storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid state transition from {from} to {to}")]
    InvalidTransition { from: ItemState, to: ItemState },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("authorization failed: {0}")]
    Auth(String),

    #[error("remote API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
