//! Timestamp normalization.
//!
//! Logs expose time in incompatible shapes: raw nanosecond counters, split
//! `Date` / `Time` columns, or a timestamp embedded in a text line. A record
//! is resolved by an ordered chain of [`TimestampRule`]s; the first rule that
//! resolves wins, and a record no rule resolves is [`Timestamp::Unknown`].

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use support_console_io::Record;

use crate::model::Timestamp;

/// Default column names, as exported by the support tooling.
pub const DEFAULT_NANOS_FIELD: &str = "Timestamp ns";
pub const DEFAULT_DATE_FIELD: &str = "Date";
pub const DEFAULT_TIME_FIELD: &str = "Time";

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// What one rule made of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// Fields this rule needs are absent or blank.
    NotApplicable,
    /// Fields are present but could not be parsed.
    Malformed { field: String, value: String },
    /// Seconds since the Unix epoch.
    Resolved(f64),
}

pub trait TimestampRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, record: &Record) -> RuleOutcome;
}

/// Nanosecond epoch counter, possibly padded with leading underscores.
pub struct NanosEpochRule {
    pub field: String,
}

impl TimestampRule for NanosEpochRule {
    fn name(&self) -> &'static str {
        "nanos_epoch"
    }

    fn apply(&self, record: &Record) -> RuleOutcome {
        let Some(raw) = record.non_empty(&self.field) else {
            return RuleOutcome::NotApplicable;
        };
        match parse_nanos(raw) {
            Some(seconds) => RuleOutcome::Resolved(seconds),
            None => RuleOutcome::Malformed {
                field: self.field.clone(),
                value: raw.to_string(),
            },
        }
    }
}

/// Separate date and time columns, joined with a space.
pub struct DateTimePairRule {
    pub date_field: String,
    pub time_field: String,
}

impl TimestampRule for DateTimePairRule {
    fn name(&self) -> &'static str {
        "date_time_pair"
    }

    fn apply(&self, record: &Record) -> RuleOutcome {
        let (Some(date), Some(time)) = (
            record.non_empty(&self.date_field),
            record.non_empty(&self.time_field),
        ) else {
            return RuleOutcome::NotApplicable;
        };

        let combined = format!("{date} {time}");
        if let Some(dt) = parse_datetime(&combined) {
            return RuleOutcome::Resolved(epoch_seconds(&dt));
        }

        // Spreadsheets render date cells as midnight date-times; combine the
        // calendar day with the time-of-day column instead.
        if let (Some(day), Some(tod)) = (parse_datetime(date), parse_time_of_day(time)) {
            let dt = Utc.from_utc_datetime(&day.date_naive().and_time(tod));
            return RuleOutcome::Resolved(epoch_seconds(&dt));
        }

        RuleOutcome::Malformed {
            field: format!("{} + {}", self.date_field, self.time_field),
            value: combined,
        }
    }
}

/// A single column holding a full date-time.
pub struct TimeFieldRule {
    pub field: String,
}

impl TimestampRule for TimeFieldRule {
    fn name(&self) -> &'static str {
        "time_field"
    }

    fn apply(&self, record: &Record) -> RuleOutcome {
        let Some(raw) = record.non_empty(&self.field) else {
            return RuleOutcome::NotApplicable;
        };
        match parse_datetime(raw) {
            Some(dt) => RuleOutcome::Resolved(epoch_seconds(&dt)),
            None => RuleOutcome::Malformed {
                field: self.field.clone(),
                value: raw.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Ordered rule chain; first resolved rule wins.
pub struct TimestampNormalizer {
    rules: Vec<Box<dyn TimestampRule>>,
}

impl TimestampNormalizer {
    pub fn new(rules: Vec<Box<dyn TimestampRule>>) -> Self {
        Self { rules }
    }

    /// Standard chain: nanosecond epoch, then date + time, then time alone.
    pub fn with_fields(nanos_field: &str, date_field: &str, time_field: &str) -> Self {
        Self::new(vec![
            Box::new(NanosEpochRule {
                field: nanos_field.to_string(),
            }),
            Box::new(DateTimePairRule {
                date_field: date_field.to_string(),
                time_field: time_field.to_string(),
            }),
            Box::new(TimeFieldRule {
                field: time_field.to_string(),
            }),
        ])
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn normalize(&self, record: &Record) -> Timestamp {
        for rule in &self.rules {
            match rule.apply(record) {
                RuleOutcome::Resolved(seconds) => return Timestamp::from_seconds(seconds),
                RuleOutcome::Malformed { field, value } => {
                    log::debug!("rule {}: cannot parse {field} = {value:?}", rule.name());
                }
                RuleOutcome::NotApplicable => {}
            }
        }
        Timestamp::Unknown
    }
}

impl Default for TimestampNormalizer {
    fn default() -> Self {
        Self::with_fields(DEFAULT_NANOS_FIELD, DEFAULT_DATE_FIELD, DEFAULT_TIME_FIELD)
    }
}

impl fmt::Debug for TimestampNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampNormalizer")
            .field("rules", &self.rule_names())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Free-text lines
// ---------------------------------------------------------------------------

fn line_timestamp_re() -> &'static Regex {
    static LINE_TS_RE: OnceLock<Regex> = OnceLock::new();
    LINE_TS_RE.get_or_init(|| {
        Regex::new(r"([0-9]{4}-[0-9]{2}-[0-9]{2})[\sT]([0-9]{2}:[0-9]{2}:[0-9]{2})")
            .expect("valid line timestamp regex")
    })
}

/// First `YYYY-MM-DD[ T]HH:MM:SS` in a text line, or unknown.
pub fn timestamp_from_line(line: &str) -> Timestamp {
    let Some(caps) = line_timestamp_re().captures(line) else {
        return Timestamp::Unknown;
    };
    let candidate = format!("{} {}", &caps[1], &caps[2]);
    match NaiveDateTime::parse_from_str(&candidate, "%Y-%m-%d %H:%M:%S") {
        Ok(ndt) => Timestamp::from_seconds(epoch_seconds(&Utc.from_utc_datetime(&ndt))),
        Err(_) => {
            log::debug!("line timestamp {candidate:?} is not a valid date-time");
            Timestamp::Unknown
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    // Day-first only when month-first cannot apply (day > 12)
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d-%b-%Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%b %d %Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
    "%Y%m%dT%H%M%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d %Y",
    "%b %d, %Y",
];

const TIME_OF_DAY_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// Best-effort date-time parsing across common log and spreadsheet formats.
///
/// Values with an explicit offset are converted to UTC; naive values (and a
/// trailing `Z`, `UTC` or `GMT`) are taken as UTC; date-only values resolve
/// to midnight. A bare time of day is not a point in time and yields `None`.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let s = strip_utc_designator(s);
    for fmt in DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }
    }

    None
}

fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let s = raw.trim();
    TIME_OF_DAY_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

fn strip_utc_designator(s: &str) -> &str {
    for suffix in [" UTC", " GMT", "Z", "z"] {
        if let Some(stripped) = s.strip_suffix(suffix) {
            return stripped.trim_end();
        }
    }
    s
}

/// Nanosecond counter text to seconds. Whitespace and leading `_` padding are
/// ignored; non-numeric and non-finite values are rejected.
fn parse_nanos(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_start_matches('_');
    let nanos = match cleaned.parse::<i64>() {
        Ok(n) => n as f64,
        Err(_) => cleaned.parse::<f64>().ok()?,
    };
    Timestamp::from_seconds(nanos / 1e9).seconds()
}

fn epoch_seconds(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1e9
}
