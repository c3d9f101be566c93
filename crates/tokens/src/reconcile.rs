use std::collections::BTreeSet;

use serde::Serialize;
use support_console_io::SourceDocument;

use crate::error::TokenError;
use crate::extract::Extractor;
use crate::model::DocumentWarning;

/// Set differences between the tokens of side A and side B.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// In A, not in B.
    pub missing_in_b: BTreeSet<String>,
    /// In B, not in A.
    pub extra_in_b: BTreeSet<String>,
    pub common: BTreeSet<String>,
    pub count_a: usize,
    pub count_b: usize,
}

impl Reconciliation {
    /// Both sides hold exactly the same tokens.
    pub fn is_balanced(&self) -> bool {
        self.missing_in_b.is_empty() && self.extra_in_b.is_empty()
    }
}

/// Compare two token sets.
pub fn reconcile(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Reconciliation {
    Reconciliation {
        missing_in_b: a.difference(b).cloned().collect(),
        extra_in_b: b.difference(a).cloned().collect(),
        common: a.intersection(b).cloned().collect(),
        count_a: a.len(),
        count_b: b.len(),
    }
}

/// Reconciliation of two documents plus any load warnings from either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReconciliation {
    pub result: Reconciliation,
    pub warnings: Vec<DocumentWarning>,
}

/// Extract both documents with the same extractor, then compare.
///
/// A side that fails to load contributes an empty set and a warning.
pub fn reconcile_documents(
    a: &SourceDocument,
    b: &SourceDocument,
    extractor: &Extractor,
) -> Result<DocumentReconciliation, TokenError> {
    let set_a = extractor.extract_set(std::slice::from_ref(a))?;
    let set_b = extractor.extract_set(std::slice::from_ref(b))?;

    let result = reconcile(&set_a.tokens, &set_b.tokens);
    log::debug!(
        "reconciled '{}' ({}) against '{}' ({}): {} missing, {} extra, {} common",
        a.name,
        result.count_a,
        b.name,
        result.count_b,
        result.missing_in_b.len(),
        result.extra_in_b.len(),
        result.common.len()
    );

    let mut warnings = set_a.warnings;
    warnings.extend(set_b.warnings);

    Ok(DocumentReconciliation { result, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::TokenPattern;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn basic_differences() {
        let r = reconcile(&set(&["x1", "x2", "x3"]), &set(&["x2", "x3", "x4"]));
        assert_eq!(r.missing_in_b, set(&["x1"]));
        assert_eq!(r.extra_in_b, set(&["x4"]));
        assert_eq!(r.common, set(&["x2", "x3"]));
        assert_eq!(r.count_a, 3);
        assert_eq!(r.count_b, 3);
        assert!(!r.is_balanced());
    }

    #[test]
    fn identical_sets_are_balanced() {
        let r = reconcile(&set(&["a", "b"]), &set(&["b", "a"]));
        assert!(r.is_balanced());
        assert_eq!(r.common.len(), 2);
    }

    #[test]
    fn empty_sides() {
        let r = reconcile(&set(&[]), &set(&["b"]));
        assert!(r.missing_in_b.is_empty());
        assert_eq!(r.extra_in_b, set(&["b"]));
        assert_eq!(r.count_a, 0);
    }

    #[test]
    fn documents_of_different_shapes() {
        let t = |c: char| format!("payment_{}", c.to_string().repeat(32));
        let a = SourceDocument::new("a.csv", format!("ref\n{}\n{}\n", t('1'), t('2')));
        let b = SourceDocument::new("b.log", format!("ok {} and {}\n", t('2'), t('3')));
        let extractor = Extractor::new(TokenPattern::new("payment_").unwrap());

        let out = reconcile_documents(&a, &b, &extractor).unwrap();
        assert_eq!(out.result.missing_in_b, BTreeSet::from([t('1')]));
        assert_eq!(out.result.extra_in_b, BTreeSet::from([t('3')]));
        assert_eq!(out.result.common, BTreeSet::from([t('2')]));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn unreadable_side_is_a_warning() {
        let a = SourceDocument::new("a.log", format!("payout_{}", "f".repeat(32)));
        let b = SourceDocument::new("b.xlsx", b"junk".to_vec());
        let extractor = Extractor::new(TokenPattern::new("payout_").unwrap());

        let out = reconcile_documents(&a, &b, &extractor).unwrap();
        assert_eq!(out.result.count_b, 0);
        assert_eq!(out.result.missing_in_b.len(), 1);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].document, "b.xlsx");
    }
}
