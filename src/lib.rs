//! Compliance Classifier - Keyword Rules for Physician Messages
//!
//! A Rust library that stores keyword-based compliance rules and tags
//! messages with the rule whose keyword equals the message topic.
//!
//! # Features
//!
//! - Append-only rule store backed by SQLite
//! - Atomic ingestion of a rule and its keyword set
//! - Exact-match topic classification
//! - Rule file and physician/message CSV import

/// Topic classification
pub mod classifier;
/// Configuration management
pub mod config;
/// Database operations and connection pooling
pub mod db;
/// Error types
pub mod error;
/// Rule file and CSV import
pub mod import;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Message lookup abstraction
pub mod repository;
/// Rule store and ingestion
pub mod rules;
/// Database schema definitions
pub mod schema;
/// Input validation
pub mod validation;

// Re-export key components for easier access
pub use classifier::Classifier;
pub use db::Database;
pub use error::{ClassifierError, Result};
pub use models::{ClassMessage, ClassificationRule, RuleCreateRequest};
pub use repository::MessageRepository;
pub use rules::RuleStore;
