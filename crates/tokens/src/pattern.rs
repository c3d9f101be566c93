use regex::Regex;

use crate::error::TokenError;

/// Default length of the hexadecimal suffix.
pub const DEFAULT_HEX_LEN: usize = 32;

/// Upper bound for the hexadecimal suffix length.
pub const MAX_HEX_LEN: usize = 256;

/// Literal prefix followed by exactly `hex_len` hexadecimal characters.
///
/// The prefix is matched exactly as given (regex metacharacters are escaped);
/// the hex suffix is case-insensitive.
#[derive(Debug, Clone)]
pub struct TokenPattern {
    prefix: String,
    hex_len: usize,
    regex: Regex,
}

impl TokenPattern {
    pub fn new(prefix: &str) -> Result<Self, TokenError> {
        Self::with_hex_len(prefix, DEFAULT_HEX_LEN)
    }

    pub fn with_hex_len(prefix: &str, hex_len: usize) -> Result<Self, TokenError> {
        if prefix.trim().is_empty() {
            return Err(TokenError::InvalidPattern("prefix must not be empty".into()));
        }
        if hex_len == 0 || hex_len > MAX_HEX_LEN {
            return Err(TokenError::InvalidPattern(format!(
                "hex length must be between 1 and {MAX_HEX_LEN}, got {hex_len}"
            )));
        }

        let source = format!("{}[0-9a-fA-F]{{{}}}", regex::escape(prefix), hex_len);
        let regex = Regex::new(&source).map_err(|e| TokenError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            prefix: prefix.to_string(),
            hex_len,
            regex,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn hex_len(&self) -> usize {
        self.hex_len
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// All non-overlapping matches, left to right.
    pub fn find_all<'t>(&self, text: &'t str) -> impl Iterator<Item = &'t str> + use<'_, 't> {
        self.regex.find_iter(text).map(|m| m.as_str())
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "deadbeefdeadbeefdeadbeefdeadbeef";

    #[test]
    fn matches_prefix_plus_hex() {
        let p = TokenPattern::new("payout_").unwrap();
        let text = format!("id=payout_{HEX} done");
        assert_eq!(p.find_all(&text).collect::<Vec<_>>(), vec![format!("payout_{HEX}")]);
    }

    #[test]
    fn hex_suffix_is_case_insensitive() {
        let p = TokenPattern::new("payout_").unwrap();
        let upper = HEX.to_uppercase();
        let text = format!("payout_{upper}");
        assert_eq!(p.find_all(&text).collect::<Vec<_>>(), vec![text.as_str()]);
    }

    #[test]
    fn prefix_is_case_sensitive_literal() {
        let p = TokenPattern::new("payout_").unwrap();
        assert!(!p.is_match(&format!("PAYOUT_{HEX}")));
        assert!(!p.is_match(&format!("payouts_{HEX}")));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let p = TokenPattern::new("a.b_").unwrap();
        assert!(p.is_match(&format!("a.b_{HEX}")));
        assert!(!p.is_match(&format!("axb_{HEX}")));

        let p = TokenPattern::new("inv(1)+").unwrap();
        assert!(p.is_match(&format!("inv(1)+{HEX}")));
        assert!(!p.is_match(&format!("inv11{HEX}")));
    }

    #[test]
    fn short_suffix_does_not_match() {
        let p = TokenPattern::new("payout_").unwrap();
        assert!(!p.is_match("payout_deadbeef"));
        assert!(!p.is_match(&format!("payout_{}", &HEX[..31])));
    }

    #[test]
    fn longer_hex_run_yields_first_hex_len_chars() {
        let p = TokenPattern::new("payout_").unwrap();
        let text = format!("payout_{HEX}ff");
        assert_eq!(p.find_all(&text).collect::<Vec<_>>(), vec![format!("payout_{HEX}")]);
    }

    #[test]
    fn multiple_matches_in_one_string() {
        let p = TokenPattern::with_hex_len("tx_", 4).unwrap();
        let found: Vec<_> = p.find_all("tx_abcd, tx_0000 tx_12 tx_FFFF").collect();
        assert_eq!(found, vec!["tx_abcd", "tx_0000", "tx_FFFF"]);
    }

    #[test]
    fn empty_prefix_is_rejected() {
        let err = TokenPattern::new("").unwrap_err();
        assert!(err.to_string().contains("prefix must not be empty"));
        assert!(TokenPattern::new("   ").is_err());
    }

    #[test]
    fn hex_len_bounds() {
        assert!(TokenPattern::with_hex_len("p_", 0).is_err());
        assert!(TokenPattern::with_hex_len("p_", MAX_HEX_LEN + 1).is_err());
        assert_eq!(TokenPattern::with_hex_len("p_", 16).unwrap().hex_len(), 16);
    }
}
