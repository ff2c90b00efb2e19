//! # Issuance Request
//!
//! The caller-facing input record. Every subject and document field is
//! optional; an absent or empty field takes its documented default. Only
//! the photo is required.

use serde::{Deserialize, Serialize};
use spl_core::{
    DocumentNumber, DocumentRecord, IssuerProfile, Sex, SplError, Subject, Timestamp,
};

pub const DEFAULT_ISSUE_DATE: &str = "2025-01-01";
pub const DEFAULT_EXPIRY_DATE: &str = "2035-01-01";

/// Wire names follow the original form: `givenNames`, `dob`, `pob`, `doi`,
/// `doe`, `photoDataUrl`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_names: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, rename = "dob", skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, rename = "pob", skip_serializing_if = "Option::is_none")]
    pub place_of_birth: Option<String>,
    #[serde(default, rename = "doi", skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(default, rename = "doe", skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_data_url: Option<String>,
}

fn given(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl IssueRequest {
    /// The photo data URL, if one was supplied and is non-empty.
    pub fn photo(&self) -> Option<&str> {
        given(&self.photo_data_url)
    }

    /// Subject fields with defaults applied.
    ///
    /// # Errors
    ///
    /// [`SplError::Validation`] if `sex` is present but not M, F or X.
    pub fn subject(&self) -> Result<Subject, SplError> {
        let defaults = Subject::default();
        let sex = match given(&self.sex) {
            Some(s) => s.parse::<Sex>()?,
            None => defaults.sex,
        };
        let pick = |field: &Option<String>, default: String| {
            given(field).map(str::to_string).unwrap_or(default)
        };
        Ok(Subject {
            surname: pick(&self.surname, defaults.surname),
            given_names: pick(&self.given_names, defaults.given_names),
            nationality: pick(&self.nationality, defaults.nationality),
            sex,
            date_of_birth: pick(&self.date_of_birth, defaults.date_of_birth),
            place_of_birth: pick(&self.place_of_birth, defaults.place_of_birth),
        })
    }

    /// Assemble the record to sign. The MRZ is derived by the record itself.
    pub fn to_record(
        &self,
        issuer: IssuerProfile,
        document_number: DocumentNumber,
        issued_at: Timestamp,
    ) -> Result<DocumentRecord, SplError> {
        Ok(DocumentRecord::new(
            issuer,
            self.subject()?,
            document_number,
            given(&self.issue_date).unwrap_or(DEFAULT_ISSUE_DATE),
            given(&self.expiry_date).unwrap_or(DEFAULT_EXPIRY_DATE),
            issued_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_request_takes_defaults() {
        let req: IssueRequest = serde_json::from_str("{}").unwrap();
        let subject = req.subject().unwrap();
        assert_eq!(subject, Subject::default());
        assert!(req.photo().is_none());
    }

    #[test]
    fn test_empty_strings_count_as_missing() {
        let req: IssueRequest =
            serde_json::from_str(r#"{"surname":"","doe":"","photoDataUrl":""}"#).unwrap();
        let record = req
            .to_record(
                IssuerProfile::default(),
                DocumentNumber::parse("SPL-000001").unwrap(),
                Timestamp::parse("2025-01-01T00:00:00Z").unwrap(),
            )
            .unwrap();
        assert_eq!(record.subject().surname, "DOE");
        assert_eq!(record.expiry_date(), DEFAULT_EXPIRY_DATE);
        assert_eq!(record.issue_date(), DEFAULT_ISSUE_DATE);
        assert!(req.photo().is_none());
    }

    #[test]
    fn test_wire_names() {
        let req: IssueRequest = serde_json::from_str(
            r#"{"givenNames":"Mary Ann","dob":"1985-07-04","pob":"Harbor","sex":"f","photoDataUrl":"data:x"}"#,
        )
        .unwrap();
        let subject = req.subject().unwrap();
        assert_eq!(subject.given_names, "Mary Ann");
        assert_eq!(subject.date_of_birth, "1985-07-04");
        assert_eq!(subject.place_of_birth, "Harbor");
        assert_eq!(subject.sex, Sex::F);
        assert_eq!(req.photo(), Some("data:x"));
    }

    #[test]
    fn test_unknown_sex_rejected() {
        let req = IssueRequest {
            sex: Some("Q".into()),
            ..Default::default()
        };
        assert!(matches!(req.subject(), Err(SplError::Validation(_))));
    }
}
