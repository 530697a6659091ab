//! Error types for the parse, fetch, update and session stages

use thiserror::Error;

/// Malformed CSV input. Aborts the run before any network activity.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("CSV file has no header row")]
    MissingHeader,

    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),

    #[error("line {line}: invalid {column} '{value}'")]
    InvalidField {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Failed `GET {base_url}/{id}`. The row is skipped.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("device {id}: registry returned status {status}")]
    Status { id: i64, status: u16 },

    #[error("device {id}: request failed: {message}")]
    Transport { id: i64, message: String },

    #[error("device {id}: unexpected response body: {source}")]
    Decode {
        id: i64,
        #[source]
        source: serde_json::Error,
    },
}

/// Failed `PUT {base_url}/{id}`. Recorded in the summary.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("device {id}: registry returned status {status}")]
    Status { id: i64, status: u16 },

    #[error("device {id}: request failed: {message}")]
    Transport { id: i64, message: String },
}

/// Action not allowed in the current session state
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while session is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("no changes to apply")]
    NothingToApply,
}
