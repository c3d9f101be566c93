use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::model::Timestamp;

/// One pattern match against one record or line.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub token: String,
    /// `None` when time was not requested for this run.
    pub timestamp: Option<Timestamp>,
}

/// Reduce occurrences to one entry per token carrying the most recent known
/// timestamp (or unknown), sorted newest first with unknown entries last.
///
/// Ties keep the earliest occurrence in input order, both when choosing a
/// token's timestamp and when ordering tokens with equal timestamps.
pub fn latest_per_token(occurrences: &[Occurrence]) -> Vec<(String, Timestamp)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut latest: Vec<(String, Timestamp)> = Vec::new();

    for occ in occurrences {
        let ts = occ.timestamp.unwrap_or(Timestamp::Unknown);
        match index.get(occ.token.as_str()) {
            Some(&i) => {
                if ts.rank_cmp(&latest[i].1) == Ordering::Greater {
                    latest[i].1 = ts;
                }
            }
            None => {
                index.insert(occ.token.as_str(), latest.len());
                latest.push((occ.token.clone(), ts));
            }
        }
    }

    // Stable: first-seen order survives among equal timestamps
    latest.sort_by(|a, b| b.1.rank_cmp(&a.1));
    latest
}

/// Distinct token strings in first-seen order.
pub fn first_seen(occurrences: &[Occurrence]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for occ in occurrences {
        if seen.insert(occ.token.as_str()) {
            out.push(occ.token.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(token: &str, ts: Option<f64>) -> Occurrence {
        Occurrence {
            token: token.into(),
            timestamp: Some(ts.map(Timestamp::Known).unwrap_or(Timestamp::Unknown)),
        }
    }

    #[test]
    fn keeps_latest_known_time() {
        let out = latest_per_token(&[occ("a", Some(10.0)), occ("a", Some(30.0)), occ("a", Some(20.0))]);
        assert_eq!(out, vec![("a".to_string(), Timestamp::Known(30.0))]);
    }

    #[test]
    fn known_time_beats_unknown_regardless_of_order() {
        let out = latest_per_token(&[occ("a", None), occ("a", Some(5.0)), occ("a", None)]);
        assert_eq!(out, vec![("a".to_string(), Timestamp::Known(5.0))]);
    }

    #[test]
    fn unknown_only_tokens_are_kept_and_sorted_last() {
        let out = latest_per_token(&[occ("u", None), occ("k1", Some(1.0)), occ("k2", Some(2.0))]);
        let tokens: Vec<_> = out.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tokens, vec!["k2", "k1", "u"]);
        assert_eq!(out[2].1, Timestamp::Unknown);
    }

    #[test]
    fn equal_times_keep_first_seen_order() {
        let out = latest_per_token(&[
            occ("b", Some(7.0)),
            occ("a", Some(7.0)),
            occ("c", None),
            occ("d", None),
        ]);
        let tokens: Vec<_> = out.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tokens, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn absent_timestamps_count_as_unknown() {
        let occurrences = vec![Occurrence {
            token: "a".into(),
            timestamp: None,
        }];
        assert_eq!(latest_per_token(&occurrences), vec![("a".to_string(), Timestamp::Unknown)]);
    }

    #[test]
    fn first_seen_dedups_in_order() {
        let out = first_seen(&[occ("b", None), occ("a", None), occ("b", None)]);
        assert_eq!(out, vec!["b", "a"]);
    }
}
