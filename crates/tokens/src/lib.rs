//! `support-console-tokens`: token extraction, timestamp normalization and
//! set reconciliation for support log files.
//!
//! Pure engine crate: receives document bytes, returns structured results.
//! Stateless between calls.

pub mod config;
pub mod dedup;
pub mod error;
pub mod export;
pub mod extract;
pub mod model;
pub mod pattern;
pub mod reconcile;
pub mod sort;
pub mod timestamp;

pub use config::{ExtractConfig, PrefixChoice};
pub use error::TokenError;
pub use extract::{extract_token_set, extract_tokens, Extractor, TokenSet};
pub use model::{DocumentWarning, ExtractedToken, Extraction, Timestamp};
pub use pattern::TokenPattern;
pub use reconcile::{reconcile, reconcile_documents, DocumentReconciliation, Reconciliation};
pub use sort::{sort_document, sort_table, SortedTable};
pub use timestamp::{TimestampNormalizer, TimestampRule};

pub use support_console_io::{Record, SourceDocument};
