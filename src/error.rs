use dotenv::Error as DotError;
use serde_json::Error as JsonError;
use std::io::Error as IoError;
use std::num;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(#[from] IoError),

    #[error("serialization error: {0}")]
    Serialization(#[from] JsonError),

    #[error("application for {0} already exists")]
    AlreadyExists(i64),

    #[error("no application for {0}")]
    NotFound(i64),

    #[error("dotenv error")]
    DotEnvError(#[from] DotError),

    #[error("parse int error: {0}")]
    ParseIntError(#[from] num::ParseIntError),
}
