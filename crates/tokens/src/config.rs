use serde::Deserialize;

use crate::error::TokenError;
use crate::extract::Extractor;
use crate::model::UNKNOWN_MARKER;
use crate::pattern::{TokenPattern, DEFAULT_HEX_LEN, MAX_HEX_LEN};
use crate::timestamp::{
    TimestampNormalizer, DEFAULT_DATE_FIELD, DEFAULT_NANOS_FIELD, DEFAULT_TIME_FIELD,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_hex_len")]
    pub hex_len: usize,
    #[serde(default = "default_unknown_marker")]
    pub unknown_marker: String,
    #[serde(default = "default_presets")]
    pub presets: Vec<PresetConfig>,
    #[serde(default)]
    pub timestamp: TimestampFields,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            hex_len: default_hex_len(),
            unknown_marker: default_unknown_marker(),
            presets: default_presets(),
            timestamp: TimestampFields::default(),
        }
    }
}

fn default_hex_len() -> usize {
    DEFAULT_HEX_LEN
}

fn default_unknown_marker() -> String {
    UNKNOWN_MARKER.to_string()
}

fn default_presets() -> Vec<PresetConfig> {
    vec![
        PresetConfig {
            name: "payout".into(),
            prefix: "payout_".into(),
        },
        PresetConfig {
            name: "payment".into(),
            prefix: "payment_".into(),
        },
    ]
}

// ---------------------------------------------------------------------------
// Presets + prefix choice
// ---------------------------------------------------------------------------

/// A named token family offered to users, e.g. `payout` → `payout_`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PresetConfig {
    pub name: String,
    pub prefix: String,
}

/// Which prefix a run uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixChoice {
    /// Looked up by preset name or preset prefix, case-insensitively.
    /// The resolved prefix is lower-cased.
    Preset(String),
    /// Used exactly as typed.
    Custom(String),
}

// ---------------------------------------------------------------------------
// Timestamp columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimestampFields {
    #[serde(default = "default_nanos_field")]
    pub nanos_field: String,
    #[serde(default = "default_date_field")]
    pub date_field: String,
    #[serde(default = "default_time_field")]
    pub time_field: String,
}

impl Default for TimestampFields {
    fn default() -> Self {
        Self {
            nanos_field: default_nanos_field(),
            date_field: default_date_field(),
            time_field: default_time_field(),
        }
    }
}

fn default_nanos_field() -> String {
    DEFAULT_NANOS_FIELD.to_string()
}

fn default_date_field() -> String {
    DEFAULT_DATE_FIELD.to_string()
}

fn default_time_field() -> String {
    DEFAULT_TIME_FIELD.to_string()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ExtractConfig {
    pub fn from_toml(input: &str) -> Result<Self, TokenError> {
        let config: ExtractConfig =
            toml::from_str(input).map_err(|e| TokenError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TokenError> {
        if self.hex_len == 0 || self.hex_len > MAX_HEX_LEN {
            return Err(TokenError::ConfigValidation(format!(
                "hex_len must be between 1 and {MAX_HEX_LEN}, got {}",
                self.hex_len
            )));
        }

        if self.unknown_marker.trim().is_empty() {
            return Err(TokenError::ConfigValidation(
                "unknown_marker must not be empty".into(),
            ));
        }

        for (i, preset) in self.presets.iter().enumerate() {
            if preset.name.trim().is_empty() {
                return Err(TokenError::ConfigValidation(format!(
                    "preset #{}: name must not be empty",
                    i + 1
                )));
            }
            if preset.prefix.trim().is_empty() {
                return Err(TokenError::ConfigValidation(format!(
                    "preset '{}': prefix must not be empty",
                    preset.name
                )));
            }
            if self.presets[..i]
                .iter()
                .any(|p| p.name.eq_ignore_ascii_case(&preset.name))
            {
                return Err(TokenError::ConfigValidation(format!(
                    "duplicate preset '{}'",
                    preset.name
                )));
            }
        }

        let ts = &self.timestamp;
        for (key, value) in [
            ("nanos_field", &ts.nanos_field),
            ("date_field", &ts.date_field),
            ("time_field", &ts.time_field),
        ] {
            if value.trim().is_empty() {
                return Err(TokenError::ConfigValidation(format!(
                    "timestamp.{key} must not be empty"
                )));
            }
        }

        Ok(())
    }

    pub fn preset(&self, name: &str) -> Option<&PresetConfig> {
        let wanted = name.trim();
        self.presets.iter().find(|p| {
            p.name.eq_ignore_ascii_case(wanted) || p.prefix.eq_ignore_ascii_case(wanted)
        })
    }

    /// The literal prefix a choice stands for.
    pub fn resolve_prefix(&self, choice: &PrefixChoice) -> Result<String, TokenError> {
        match choice {
            PrefixChoice::Preset(name) => self
                .preset(name)
                .map(|p| p.prefix.to_lowercase())
                .ok_or_else(|| TokenError::UnknownPreset(name.clone())),
            PrefixChoice::Custom(prefix) => {
                if prefix.trim().is_empty() {
                    return Err(TokenError::InvalidPattern(
                        "custom prefix must not be empty".into(),
                    ));
                }
                Ok(prefix.clone())
            }
        }
    }

    pub fn pattern(&self, choice: &PrefixChoice) -> Result<TokenPattern, TokenError> {
        TokenPattern::with_hex_len(&self.resolve_prefix(choice)?, self.hex_len)
    }

    pub fn normalizer(&self) -> TimestampNormalizer {
        TimestampNormalizer::with_fields(
            &self.timestamp.nanos_field,
            &self.timestamp.date_field,
            &self.timestamp.time_field,
        )
    }

    /// Extractor wired with this config's pattern, timestamp columns and marker.
    pub fn extractor(&self, choice: &PrefixChoice) -> Result<Extractor, TokenError> {
        Ok(Extractor::new(self.pattern(choice)?)
            .with_normalizer(self.normalizer())
            .with_unknown_marker(self.unknown_marker.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
hex_len = 24
unknown_marker = "-"

[[presets]]
name = "invoice"
prefix = "INV_"

[[presets]]
name = "refund"
prefix = "re_"

[timestamp]
nanos_field = "ts_ns"
date_field = "day"
time_field = "clock"
"#;

    #[test]
    fn defaults_match_the_support_tooling() {
        let config = ExtractConfig::default();
        assert_eq!(config.hex_len, 32);
        assert_eq!(config.unknown_marker, "Unknown");
        assert_eq!(config.presets.len(), 2);
        assert_eq!(config.timestamp.nanos_field, "Timestamp ns");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = ExtractConfig::from_toml("").unwrap();
        assert_eq!(config.hex_len, 32);
        assert_eq!(config.preset("payout").unwrap().prefix, "payout_");
    }

    #[test]
    fn parse_full() {
        let config = ExtractConfig::from_toml(FULL).unwrap();
        assert_eq!(config.hex_len, 24);
        assert_eq!(config.unknown_marker, "-");
        assert_eq!(config.presets.len(), 2);
        assert_eq!(config.timestamp.date_field, "day");
        assert_eq!(
            config.normalizer().rule_names(),
            vec!["nanos_epoch", "date_time_pair", "time_field"]
        );
    }

    #[test]
    fn partial_timestamp_table_keeps_other_defaults() {
        let config = ExtractConfig::from_toml("[timestamp]\ntime_field = \"When\"\n").unwrap();
        assert_eq!(config.timestamp.time_field, "When");
        assert_eq!(config.timestamp.date_field, "Date");
    }

    #[test]
    fn preset_prefix_is_lowercased() {
        let config = ExtractConfig::from_toml(FULL).unwrap();
        let prefix = config
            .resolve_prefix(&PrefixChoice::Preset("Invoice".into()))
            .unwrap();
        assert_eq!(prefix, "inv_");
    }

    #[test]
    fn preset_found_by_prefix_label() {
        let config = ExtractConfig::default();
        let prefix = config
            .resolve_prefix(&PrefixChoice::Preset("payment_".into()))
            .unwrap();
        assert_eq!(prefix, "payment_");
    }

    #[test]
    fn custom_prefix_is_kept_as_typed() {
        let config = ExtractConfig::default();
        let prefix = config
            .resolve_prefix(&PrefixChoice::Custom("Acct-".into()))
            .unwrap();
        assert_eq!(prefix, "Acct-");
    }

    #[test]
    fn reject_empty_custom_prefix() {
        let config = ExtractConfig::default();
        let err = config.pattern(&PrefixChoice::Custom("  ".into())).unwrap_err();
        assert!(matches!(err, TokenError::InvalidPattern(_)));
    }

    #[test]
    fn reject_unknown_preset() {
        let config = ExtractConfig::default();
        let err = config.pattern(&PrefixChoice::Preset("refund".into())).unwrap_err();
        assert!(err.to_string().contains("unknown preset: refund"));
    }

    #[test]
    fn pattern_uses_configured_hex_len() {
        let config = ExtractConfig::from_toml(FULL).unwrap();
        let pattern = config.pattern(&PrefixChoice::Preset("refund".into())).unwrap();
        assert_eq!(pattern.hex_len(), 24);
        assert!(pattern.is_match(&format!("re_{}", "a".repeat(24))));
        assert!(!pattern.is_match(&format!("re_{}", "a".repeat(23))));
    }

    #[test]
    fn reject_bad_hex_len() {
        let err = ExtractConfig::from_toml("hex_len = 0").unwrap_err();
        assert!(err.to_string().contains("hex_len must be between"));
    }

    #[test]
    fn reject_duplicate_preset() {
        let input = r#"
[[presets]]
name = "payout"
prefix = "payout_"

[[presets]]
name = "Payout"
prefix = "po_"
"#;
        let err = ExtractConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("duplicate preset 'Payout'"));
    }

    #[test]
    fn reject_blank_field_name() {
        let err = ExtractConfig::from_toml("[timestamp]\ndate_field = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("timestamp.date_field"));
    }

    #[test]
    fn reject_malformed_toml() {
        let err = ExtractConfig::from_toml("hex_len = \"many\"").unwrap_err();
        assert!(matches!(err, TokenError::ConfigParse(_)));
    }
}
