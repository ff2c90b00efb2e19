//! # Machine-Readable Zone
//!
//! Formats the two fixed-width MRZ lines printed at the bottom of the data
//! page and carried in the signed record.
//!
//! ```text
//! line 1: P<{issuer}<{SURNAME}<<{GIVEN<NAMES}<<<<<<<<<<<<<<<<<<<<<<<<
//! line 2: {document9}<{issuer}{YYMMDD dob}{sex}{YYMMDD expiry}<<<<<<<<<<
//! ```
//!
//! Every character is drawn from `[A-Z0-9<]`: input is uppercased first,
//! anything outside the alphabet becomes the filler, and only then is the
//! line padded or truncated. No check digits are computed.

use serde::{Deserialize, Serialize};

use crate::record::Sex;

/// Width of each MRZ line.
pub const MRZ_LINE_LEN: usize = 44;

/// Width of the document-number field on line 2.
pub const DOC_FIELD_LEN: usize = 9;

/// The MRZ filler character.
pub const MRZ_FILLER: char = '<';

/// Date used when a date field is absent or empty.
const DEFAULT_DATE: &str = "1990-01-01";

/// The fields the MRZ is derived from. Nothing else influences the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MrzInput<'a> {
    pub surname: &'a str,
    pub given_names: &'a str,
    pub document_number: &'a str,
    pub date_of_birth: Option<&'a str>,
    pub date_of_expiry: Option<&'a str>,
    pub sex: Sex,
    pub issuer_code: &'a str,
}

/// The two encoded lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Mrz {
    pub line1: String,
    pub line2: String,
}

impl Mrz {
    /// Encode both lines from their inputs.
    pub fn encode(input: &MrzInput<'_>) -> Self {
        let given: Vec<&str> = input.given_names.split_whitespace().collect();
        let line1 = pad_right(
            &format!(
                "P<{}<{}<<{}",
                input.issuer_code,
                input.surname,
                given.join("<")
            ),
            MRZ_LINE_LEN,
        );

        let document = pad_right(input.document_number, DOC_FIELD_LEN);
        let line2 = pad_right(
            &format!(
                "{document}<{}{}{}{}",
                input.issuer_code,
                yymmdd(input.date_of_birth),
                input.sex.code(),
                yymmdd(input.date_of_expiry),
            ),
            MRZ_LINE_LEN,
        );

        Self { line1, line2 }
    }

    /// True when both lines are exactly [`MRZ_LINE_LEN`] characters from the
    /// MRZ alphabet.
    pub fn is_well_formed(&self) -> bool {
        [&self.line1, &self.line2]
            .iter()
            .all(|line| line.len() == MRZ_LINE_LEN && line.chars().all(is_mrz_char))
    }
}

fn is_mrz_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == MRZ_FILLER
}

/// Uppercase and replace every character outside `[A-Z0-9<]` with the filler.
pub fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| {
            let upper = c.to_ascii_uppercase();
            if is_mrz_char(upper) {
                upper
            } else {
                MRZ_FILLER
            }
        })
        .collect()
}

/// Sanitize, then pad with the filler or truncate to exactly `len` characters.
pub fn pad_right(s: &str, len: usize) -> String {
    sanitize(s)
        .chars()
        .chain(std::iter::repeat(MRZ_FILLER))
        .take(len)
        .collect()
}

/// Convert an ISO-ish `YYYY-MM-DD` date to `YYMMDD`.
///
/// An absent or empty date means `1990-01-01`. Missing month or day
/// components default to `01`; single-digit components are zero-padded.
pub fn yymmdd(date: Option<&str>) -> String {
    let date = date.map(str::trim).filter(|d| !d.is_empty()).unwrap_or(DEFAULT_DATE);
    let mut parts = date.split('-');
    let year = parts.next().unwrap_or("1990");
    let month = parts.next().unwrap_or("01");
    let day = parts.next().unwrap_or("01");
    format!(
        "{}{}{}",
        two_digits(last_two(year), "90"),
        two_digits(month, "01"),
        two_digits(day, "01")
    )
}

fn last_two(year: &str) -> &str {
    let start = year.char_indices().rev().nth(1).map_or(0, |(i, _)| i);
    &year[start..]
}

fn two_digits<'a>(component: &'a str, fallback: &'a str) -> String {
    let component = if component.is_empty() { fallback } else { component };
    let mut out: String = component.chars().take(2).collect();
    if out.chars().count() == 1 {
        out.insert(0, '0');
    }
    out
}
