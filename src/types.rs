/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Role value in `userdetails.userrole` that may submit household surveys
pub const COMMUNITY_WORKER_ROLE: &str = "community_worker";

/// How a community worker is addressed in `/community/:id/upload`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerRef {
    /// Numeric internal id (`userdetails.personid`)
    PersonId(i32),
    /// External ABHA identifier (`userdetails.abhaid`)
    AbhaId(String),
}

impl WorkerRef {
    /// Anything that reads as a number is a person id, truncated to its
    /// leading integer (`"1.0"`, `"1e3"` and `"0x1"` are all person 1).
    /// Everything else, including numbers outside int4, is an ABHA id.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match Some(trimmed).filter(|s| is_numeric(s)).and_then(leading_integer) {
            Some(id) => WorkerRef::PersonId(id),
            None => WorkerRef::AbhaId(raw.to_string()),
        }
    }
}

/// Decimal, exponent, or 0x/0o/0b literal
fn is_numeric(s: &str) -> bool {
    let radix_digits = |prefix: [&str; 2], radix: u32| {
        prefix
            .iter()
            .find_map(|p| s.strip_prefix(p))
            .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_digit(radix)))
    };
    if let Some(valid) = radix_digits(["0x", "0X"], 16)
        .or_else(|| radix_digits(["0o", "0O"], 8))
        .or_else(|| radix_digits(["0b", "0B"], 2))
    {
        return valid;
    }

    // f64 parsing also takes "inf" and "nan", which are not ids
    s.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')) && s.parse::<f64>().is_ok()
}

/// Optional sign then the longest run of digits; only `0x` switches radix
fn leading_integer(s: &str) -> Option<i32> {
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = match rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, rest),
    };

    let end = digits.find(|c: char| !c.is_digit(radix)).unwrap_or(digits.len());
    let magnitude = i64::from_str_radix(digits.get(..end).filter(|d| !d.is_empty())?, radix).ok()?;
    i32::try_from(if negative { -magnitude } else { magnitude }).ok()
}

/// Filter for GET /getCommunityDetails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommunityLookup {
    Household(String),
    Patient(i32),
}
