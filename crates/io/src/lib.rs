//! `support-console-io`: turns uploaded bytes into rows or lines.
//!
//! Delimited text and spreadsheets become a [`Table`] of [`Record`]s; every
//! other document is decoded to text and scanned line by line by the caller.

pub mod csv;
pub mod decode;
pub mod document;
pub mod error;
pub mod xlsx;

pub use decode::{decode_bytes, Decoded};
pub use document::{
    load, Document, DocumentContent, DocumentKind, Record, SourceDocument, SpreadsheetFormat,
    Table,
};
pub use error::LoadError;
