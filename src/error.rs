// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Failure reading the local env file. Absence is not an error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Rejected command-line or prompt input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("LAWD_CD must be exactly 5 digits, got {0:?}")]
    InvalidRegionCode(String),

    #[error("DEAL_YMD must be a valid YYYYMM month, got {0:?}")]
    InvalidDealYmd(String),
}

/// Failure issuing the trade request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered {status}")]
    Status { status: reqwest::StatusCode },
}

/// Failure turning a response body into a CSV file.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("malformed XML: {0}")]
    MalformedXml(#[from] roxmltree::Error),

    #[error("response header has no <{0}> element")]
    MissingField(&'static str),

    #[error("writing {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
