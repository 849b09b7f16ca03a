//! Error types for cashfeed-store

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Write rejected: {message}")]
    Rejected { message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid fixture: {0}")]
    InvalidFixture(#[from] serde_json::Error),
}

