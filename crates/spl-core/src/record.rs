//! # Document Record
//!
//! The signed payload of a bundle: issuer profile, subject, document number,
//! validity dates, issuance instant and the derived MRZ.
//!
//! The MRZ is derived state. [`DocumentRecord`] keeps its fields private and
//! recomputes the MRZ in the constructor and in every mutator, so an
//! in-memory record can never carry an MRZ that disagrees with its inputs.
//! A deserialized record may (it came from outside); use
//! [`DocumentRecord::mrz_is_consistent()`] to check.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SplError;
use crate::mrz::{Mrz, MrzInput};
use crate::temporal::Timestamp;

/// Prefix of every document number.
pub const DOCUMENT_NUMBER_PREFIX: &str = "SPL-";

const DOCUMENT_NUMBER_DIGITS: usize = 6;

// ---------------------------------------------------------------------------
// Sex
// ---------------------------------------------------------------------------

/// Sex marker as printed in the MRZ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sex {
    M,
    F,
    #[default]
    X,
}

impl Sex {
    /// The single-character MRZ code.
    pub fn code(self) -> char {
        match self {
            Sex::M => 'M',
            Sex::F => 'F',
            Sex::X => 'X',
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Sex {
    type Err = SplError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M" => Ok(Sex::M),
            "F" => Ok(Sex::F),
            "X" => Ok(Sex::X),
            other => Err(SplError::Validation(format!(
                "sex must be one of M, F, X; got {other:?}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Issuer profile
// ---------------------------------------------------------------------------

/// The (fictional) issuing authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssuerProfile {
    pub name: String,
    /// Three-letter code used in the MRZ.
    pub code: String,
    pub disclaimer: String,
}

impl Default for IssuerProfile {
    fn default() -> Self {
        Self {
            name: "Republic of Sampleland".to_string(),
            code: "XAA".to_string(),
            disclaimer: "FICTIONAL DOCUMENT NO LEGAL VALUE".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Subject
// ---------------------------------------------------------------------------

/// Identity fields of the holder, stored as entered (after defaulting).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Subject {
    pub surname: String,
    pub given_names: String,
    pub nationality: String,
    pub sex: Sex,
    pub date_of_birth: String,
    pub place_of_birth: String,
}

impl Default for Subject {
    fn default() -> Self {
        Self {
            surname: "DOE".to_string(),
            given_names: "JANE".to_string(),
            nationality: "SAMPLELAND".to_string(),
            sex: Sex::X,
            date_of_birth: "1990-01-01".to_string(),
            place_of_birth: "SAMPLE CITY".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Document number
// ---------------------------------------------------------------------------

/// `SPL-` followed by six decimal digits.
///
/// Numbers are drawn uniformly at random per issuance. Uniqueness is not
/// tracked; the 10^6 width is the only collision resistance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentNumber(String);

impl DocumentNumber {
    /// Draw a fresh number from the thread-local RNG.
    pub fn random() -> Self {
        Self::generate(&mut rand::thread_rng())
    }

    /// Draw a fresh number from the given RNG.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let n: u32 = rng.gen_range(0..1_000_000);
        Self(format!("{DOCUMENT_NUMBER_PREFIX}{n:06}"))
    }

    /// Validate and wrap an existing number.
    pub fn parse(s: &str) -> Result<Self, SplError> {
        let digits = s.strip_prefix(DOCUMENT_NUMBER_PREFIX).ok_or_else(|| {
            SplError::Validation(format!("document number must start with SPL-: {s:?}"))
        })?;
        if digits.len() != DOCUMENT_NUMBER_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SplError::Validation(format!(
                "document number must end in {DOCUMENT_NUMBER_DIGITS} digits: {s:?}"
            )));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DocumentNumber {
    type Error = SplError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DocumentNumber> for String {
    fn from(value: DocumentNumber) -> Self {
        value.0
    }
}

// ---------------------------------------------------------------------------
// Document record
// ---------------------------------------------------------------------------

/// The signed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DocumentRecord {
    issuer: IssuerProfile,
    subject: Subject,
    document_number: DocumentNumber,
    issue_date: String,
    expiry_date: String,
    issued_at: Timestamp,
    mrz: Mrz,
}

impl DocumentRecord {
    /// Assemble a record and derive its MRZ.
    pub fn new(
        issuer: IssuerProfile,
        subject: Subject,
        document_number: DocumentNumber,
        issue_date: impl Into<String>,
        expiry_date: impl Into<String>,
        issued_at: Timestamp,
    ) -> Self {
        let issue_date = issue_date.into();
        let expiry_date = expiry_date.into();
        let mut record = Self {
            issuer,
            subject,
            document_number,
            issue_date,
            expiry_date,
            issued_at,
            mrz: Mrz {
                line1: String::new(),
                line2: String::new(),
            },
        };
        record.refresh_mrz();
        record
    }

    pub fn issuer(&self) -> &IssuerProfile {
        &self.issuer
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn document_number(&self) -> &DocumentNumber {
        &self.document_number
    }

    pub fn issue_date(&self) -> &str {
        &self.issue_date
    }

    pub fn expiry_date(&self) -> &str {
        &self.expiry_date
    }

    pub fn issued_at(&self) -> Timestamp {
        self.issued_at
    }

    pub fn mrz(&self) -> &Mrz {
        &self.mrz
    }

    /// Edit the subject in place; the MRZ is recomputed afterwards.
    pub fn update_subject(&mut self, edit: impl FnOnce(&mut Subject)) {
        edit(&mut self.subject);
        self.refresh_mrz();
    }

    pub fn set_issuer(&mut self, issuer: IssuerProfile) {
        self.issuer = issuer;
        self.refresh_mrz();
    }

    pub fn set_document_number(&mut self, number: DocumentNumber) {
        self.document_number = number;
        self.refresh_mrz();
    }

    pub fn set_expiry_date(&mut self, date: impl Into<String>) {
        self.expiry_date = date.into();
        self.refresh_mrz();
    }

    /// The issue date is not an MRZ input; no recomputation needed.
    pub fn set_issue_date(&mut self, date: impl Into<String>) {
        self.issue_date = date.into();
    }

    /// The fields the MRZ is derived from, borrowed from this record.
    pub fn mrz_input(&self) -> MrzInput<'_> {
        MrzInput {
            surname: &self.subject.surname,
            given_names: &self.subject.given_names,
            document_number: self.document_number.as_str(),
            date_of_birth: Some(&self.subject.date_of_birth),
            date_of_expiry: Some(&self.expiry_date),
            sex: self.subject.sex,
            issuer_code: &self.issuer.code,
        }
    }

    /// True when the stored MRZ equals the one derived from the current fields.
    pub fn mrz_is_consistent(&self) -> bool {
        self.mrz == Mrz::encode(&self.mrz_input())
    }

    fn refresh_mrz(&mut self) {
        self.mrz = Mrz::encode(&self.mrz_input());
    }
}
