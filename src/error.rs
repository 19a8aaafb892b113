//! Error types for the compliance classifier.
//!
//! This module provides custom error types using `thiserror`. Each variant maps
//! onto one caller-visible failure class through [`ClassifierError::status_code`].

use rusqlite::{ffi, ErrorCode};
use thiserror::Error;

/// Errors that can occur while storing rules or classifying messages.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Requested entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Insert collided with an existing rule id or keyword
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Keyword references a rule that does not exist
    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    /// Input failed validation
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Connection pool errors
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Result with `ClassifierError`
pub type Result<T> = std::result::Result<T, ClassifierError>;

impl ClassifierError {
    /// HTTP-style status class for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::DuplicateKey(_) | Self::ForeignKey(_) => 409,
            Self::Validation(_) => 422,
            _ => 500,
        }
    }

    /// Short label used for metrics and log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::ForeignKey(_) => "foreign_key",
            Self::Validation(_) => "validation",
            Self::Database(_) | Self::Pool(_) => "database",
            Self::Io(_) | Self::Csv(_) | Self::Serialization(_) => "io",
        }
    }
}

/// Constraint families the store distinguishes on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Constraint {
    /// Primary key or unique index collision
    Duplicate,
    /// Referenced row does not exist
    ForeignKey,
}

/// Classify a SQLite constraint failure by its extended result code.
pub(crate) fn constraint_violation(err: &rusqlite::Error) -> Option<Constraint> {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation => {
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => Some(Constraint::Duplicate),
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Constraint::ForeignKey),
                _ => None,
            }
        }
        _ => None,
    }
}
