//! Canonicalization of raw extracted text.
//!
//! Every function here is total and idempotent: unknown shapes come back
//! trimmed instead of failing, and feeding an output back in returns it
//! unchanged.

pub mod address;

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::core::fields::{FieldKey, FieldKind};
use crate::core::types::{Gender, Relationship};

pub use address::{split_address, AddressParts};

const MAX_TEXT_LEN: usize = 100;

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[T ].*)?$").unwrap());
static US_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{4})$").unwrap());
static SHORT_YEAR_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{2})$").unwrap());
static SPELLED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})$").unwrap()
});
static DAY_FIRST_SPELLED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})\s+([A-Za-z]{3,9})\.?,?\s+(\d{4})$").unwrap()
});

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const STATES: [(&str, &str); 50] = [
    ("alabama", "AL"),
    ("alaska", "AK"),
    ("arizona", "AZ"),
    ("arkansas", "AR"),
    ("california", "CA"),
    ("colorado", "CO"),
    ("connecticut", "CT"),
    ("delaware", "DE"),
    ("florida", "FL"),
    ("georgia", "GA"),
    ("hawaii", "HI"),
    ("idaho", "ID"),
    ("illinois", "IL"),
    ("indiana", "IN"),
    ("iowa", "IA"),
    ("kansas", "KS"),
    ("kentucky", "KY"),
    ("louisiana", "LA"),
    ("maine", "ME"),
    ("maryland", "MD"),
    ("massachusetts", "MA"),
    ("michigan", "MI"),
    ("minnesota", "MN"),
    ("mississippi", "MS"),
    ("missouri", "MO"),
    ("montana", "MT"),
    ("nebraska", "NE"),
    ("nevada", "NV"),
    ("new hampshire", "NH"),
    ("new jersey", "NJ"),
    ("new mexico", "NM"),
    ("new york", "NY"),
    ("north carolina", "NC"),
    ("north dakota", "ND"),
    ("ohio", "OH"),
    ("oklahoma", "OK"),
    ("oregon", "OR"),
    ("pennsylvania", "PA"),
    ("rhode island", "RI"),
    ("south carolina", "SC"),
    ("south dakota", "SD"),
    ("tennessee", "TN"),
    ("texas", "TX"),
    ("utah", "UT"),
    ("vermont", "VT"),
    ("virginia", "VA"),
    ("washington", "WA"),
    ("west virginia", "WV"),
    ("wisconsin", "WI"),
    ("wyoming", "WY"),
];

fn digits_of(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// `5557890123` / `1-555-789-0123` → `(555) 789-0123`.
pub fn normalize_phone(raw: &str) -> String {
    let digits = digits_of(raw);
    let ten = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('1') => &digits[1..],
        _ => return raw.trim().to_string(),
    };
    format!("({}) {}-{}", &ten[..3], &ten[3..6], &ten[6..])
}

/// Any supported date shape → zero-padded `MM/DD/YYYY`.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    parse_date(trimmed)
        .map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Parse the date shapes EMR pages commonly render. Two-digit years pivot at
/// 50: `70` is 1970, `05` is 2005.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Some(caps) = ISO_DATE.captures(raw) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = US_DATE.captures(raw) {
        return ymd(&caps[3], &caps[1], &caps[2]);
    }
    if let Some(caps) = SHORT_YEAR_DATE.captures(raw) {
        let yy: i32 = caps[3].parse().ok()?;
        let year = if yy > 50 { 1900 + yy } else { 2000 + yy };
        return ymd(&year.to_string(), &caps[1], &caps[2]);
    }
    if let Some(caps) = SPELLED_DATE.captures(raw) {
        let month = month_number(&caps[1])?;
        return ymd(&caps[3], &month.to_string(), &caps[2]);
    }
    if let Some(caps) = DAY_FIRST_SPELLED_DATE.captures(raw) {
        let month = month_number(&caps[2])?;
        return ymd(&caps[3], &month.to_string(), &caps[1]);
    }
    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// `Mar`, `march`, `Sept` → 3 / 3 / 9.
fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(&lower))
        .map(|i| i as u32 + 1)
}

/// 9 digits → `AAA-BB-CCCC`.
pub fn normalize_ssn(raw: &str) -> String {
    let digits = digits_of(raw);
    if digits.len() == 9 {
        format!("{}-{}-{}", &digits[..3], &digits[3..5], &digits[5..])
    } else {
        raw.trim().to_string()
    }
}

/// 5 digits as-is, 9 digits → `AAAAA-BBBB`.
pub fn normalize_zip(raw: &str) -> String {
    let digits = digits_of(raw);
    match digits.len() {
        5 => digits,
        9 => format!("{}-{}", &digits[..5], &digits[5..]),
        _ => raw.trim().to_string(),
    }
}

/// First word decides: `M`, `male`, `Man` → Male; `F`, `female` → Female;
/// `O`, `X`, `nonbinary` → Other. Anything else is unknown.
pub fn parse_gender(raw: &str) -> Option<Gender> {
    let first = raw
        .trim()
        .split(|c: char| c.is_whitespace() || c == '/' || c == ',' || c == '(')
        .find(|w| !w.is_empty())?
        .trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '-')
        .to_ascii_lowercase();
    match first.as_str() {
        "m" | "male" | "man" => Some(Gender::Male),
        "f" | "female" | "woman" => Some(Gender::Female),
        "o" | "other" | "x" | "nonbinary" | "non-binary" => Some(Gender::Other),
        _ => None,
    }
}

pub fn normalize_gender(raw: &str) -> String {
    parse_gender(raw)
        .map(|g| g.as_str().to_string())
        .unwrap_or_default()
}

/// Two-letter code for a full state name (`"new york"` → `NY`).
pub fn state_code(name: &str) -> Option<&'static str> {
    let wanted = name.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_lowercase();
    STATES
        .iter()
        .find(|(full, _)| *full == wanted)
        .map(|(_, code)| *code)
}

pub fn normalize_state(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('.');
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return trimmed.to_ascii_uppercase();
    }
    state_code(trimmed)
        .map(str::to_string)
        .unwrap_or_else(|| raw.trim().to_string())
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn normalize_mrn(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Strip angle brackets, collapse whitespace, cap the length.
pub fn sanitize_text(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| *c != '<' && *c != '>').collect();
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    let capped: String = collapsed.chars().take(MAX_TEXT_LEN).collect();
    capped.trim_end().to_string()
}

pub fn parse_relationship(raw: &str) -> Relationship {
    let lower = raw.to_lowercase();
    let has_word = |words: &[&str]| {
        lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| words.contains(&w))
    };
    if has_word(&["self", "patient", "same"]) {
        Relationship::SelfInsured
    } else if has_word(&["spouse", "wife", "husband", "partner"]) {
        Relationship::Spouse
    } else if has_word(&["child", "son", "daughter", "dependent"]) {
        Relationship::Child
    } else {
        Relationship::Other
    }
}

/// Route a raw value through the normalizer for its field.
pub fn normalize_field(field: FieldKey, raw: &str) -> String {
    match field.kind() {
        FieldKind::Name | FieldKind::Text => sanitize_text(raw),
        FieldKind::Date => normalize_date(raw),
        FieldKind::Phone => normalize_phone(raw),
        FieldKind::Email => normalize_email(raw),
        FieldKind::Ssn => normalize_ssn(raw),
        FieldKind::Zip => normalize_zip(raw),
        FieldKind::State => normalize_state(raw),
        FieldKind::Gender => normalize_gender(raw),
        FieldKind::Mrn => normalize_mrn(raw),
        FieldKind::Relationship => parse_relationship(raw).as_str().to_string(),
    }
}
