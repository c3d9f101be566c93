use std::collections::BTreeSet;

use serde::Serialize;
use support_console_io::{load, Document, DocumentContent, SourceDocument};

use crate::dedup::{first_seen, latest_per_token, Occurrence};
use crate::error::TokenError;
use crate::model::{DocumentWarning, ExtractedToken, Extraction, UNKNOWN_MARKER};
use crate::pattern::TokenPattern;
use crate::timestamp::{timestamp_from_line, TimestampNormalizer};

/// Distinct tokens found across a batch, without timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenSet {
    pub tokens: BTreeSet<String>,
    pub documents_scanned: usize,
    pub warnings: Vec<DocumentWarning>,
}

impl TokenSet {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Scans documents for one token pattern.
///
/// Holds only immutable configuration; every call is independent.
#[derive(Debug)]
pub struct Extractor {
    pattern: TokenPattern,
    normalizer: TimestampNormalizer,
    unknown_marker: String,
}

impl Extractor {
    pub fn new(pattern: TokenPattern) -> Self {
        Self {
            pattern,
            normalizer: TimestampNormalizer::default(),
            unknown_marker: UNKNOWN_MARKER.to_string(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: TimestampNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_unknown_marker(mut self, marker: impl Into<String>) -> Self {
        self.unknown_marker = marker.into();
        self
    }

    pub fn pattern(&self) -> &TokenPattern {
        &self.pattern
    }

    pub fn normalizer(&self) -> &TimestampNormalizer {
        &self.normalizer
    }

    /// Extract one row per distinct token across all documents.
    ///
    /// With `include_time`, each token carries its most recent known time and
    /// the list is newest first (unknown times last). Without it, tokens are
    /// listed once each in first-seen order.
    pub fn extract(
        &self,
        documents: &[SourceDocument],
        include_time: bool,
    ) -> Result<Extraction, TokenError> {
        if documents.is_empty() {
            return Err(TokenError::NoInput);
        }

        let (occurrences, warnings) = self.scan(documents, include_time);

        let tokens: Vec<ExtractedToken> = if include_time {
            latest_per_token(&occurrences)
                .into_iter()
                .map(|(token, ts)| ExtractedToken {
                    token,
                    timestamp: Some(ts),
                    time: Some(ts.display(&self.unknown_marker)),
                })
                .collect()
        } else {
            first_seen(&occurrences)
                .into_iter()
                .map(|token| ExtractedToken {
                    token,
                    timestamp: None,
                    time: None,
                })
                .collect()
        };

        log::debug!(
            "extracted {} distinct tokens from {} occurrences in {} documents ({} failed)",
            tokens.len(),
            occurrences.len(),
            documents.len(),
            warnings.len()
        );

        Ok(Extraction {
            tokens,
            include_time,
            documents_scanned: documents.len(),
            occurrences: occurrences.len(),
            warnings,
        })
    }

    /// Same scanning rules as [`Extractor::extract`], no timestamps.
    pub fn extract_set(&self, documents: &[SourceDocument]) -> Result<TokenSet, TokenError> {
        if documents.is_empty() {
            return Err(TokenError::NoInput);
        }

        let (occurrences, warnings) = self.scan(documents, false);
        Ok(TokenSet {
            tokens: occurrences.into_iter().map(|o| o.token).collect(),
            documents_scanned: documents.len(),
            warnings,
        })
    }

    fn scan(
        &self,
        documents: &[SourceDocument],
        include_time: bool,
    ) -> (Vec<Occurrence>, Vec<DocumentWarning>) {
        let mut occurrences = Vec::new();
        let mut warnings = Vec::new();

        for source in documents {
            match load(source) {
                Ok(doc) => self.scan_document(&doc, include_time, &mut occurrences),
                Err(err) => {
                    log::warn!("skipping document: {err}");
                    warnings.push(DocumentWarning::from(err));
                }
            }
        }

        (occurrences, warnings)
    }

    fn scan_document(&self, doc: &Document, include_time: bool, out: &mut Vec<Occurrence>) {
        match &doc.content {
            DocumentContent::Table(table) => {
                for record in &table.records {
                    let text = record.search_text();
                    let matches: Vec<&str> = self.pattern.find_all(&text).collect();
                    if matches.is_empty() {
                        continue;
                    }
                    let timestamp = include_time.then(|| self.normalizer.normalize(record));
                    out.extend(matches.into_iter().map(|token| Occurrence {
                        token: token.to_string(),
                        timestamp,
                    }));
                }
            }
            DocumentContent::Text(text) => {
                for line in text.lines() {
                    let matches: Vec<&str> = self.pattern.find_all(line).collect();
                    if matches.is_empty() {
                        continue;
                    }
                    let timestamp = include_time.then(|| timestamp_from_line(line));
                    out.extend(matches.into_iter().map(|token| Occurrence {
                        token: token.to_string(),
                        timestamp,
                    }));
                }
            }
        }
    }
}

/// Extract with the default timestamp rules and unknown marker.
pub fn extract_tokens(
    documents: &[SourceDocument],
    pattern: &TokenPattern,
    include_time: bool,
) -> Result<Extraction, TokenError> {
    Extractor::new(pattern.clone()).extract(documents, include_time)
}

/// Set-only extraction with the default rules.
pub fn extract_token_set(
    documents: &[SourceDocument],
    pattern: &TokenPattern,
) -> Result<TokenSet, TokenError> {
    Extractor::new(pattern.clone()).extract_set(documents)
}
