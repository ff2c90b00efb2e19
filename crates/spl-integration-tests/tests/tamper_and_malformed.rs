//! Verification outcomes for altered and malformed bundles.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use proptest::prelude::*;
use spl_bundle::{verify, verify_encoded, Bundle, BundleError};
use spl_core::{DocumentNumber, DocumentRecord, IssuerProfile, Subject, Timestamp};
use spl_crypto::{Ed25519KeyPair, Ed25519Signature, SIGNATURE_LEN};

fn record() -> DocumentRecord {
    DocumentRecord::new(
        IssuerProfile::default(),
        Subject::default(),
        DocumentNumber::parse("SPL-000123").unwrap(),
        "2025-01-01",
        "2035-01-01",
        Timestamp::parse("2025-06-01T08:30:00Z").unwrap(),
    )
}

fn bundle() -> Bundle {
    Bundle::build_with_key(record(), &Ed25519KeyPair::from_seed(&[42u8; 32])).unwrap()
}

fn json_value(b: &Bundle) -> serde_json::Value {
    serde_json::from_str(&b.to_json().unwrap()).unwrap()
}

fn encode(value: &serde_json::Value) -> String {
    STANDARD.encode(serde_json::to_vec(value).unwrap())
}

#[test]
fn altered_payload_fields_fail() {
    let edits: [fn(&mut DocumentRecord); 5] = [
        |r| r.update_subject(|s| s.surname = "ROE".into()),
        |r| r.update_subject(|s| s.place_of_birth = "ELSEWHERE".into()),
        |r| r.set_expiry_date("2099-01-01"),
        |r| r.set_issue_date("2024-12-31"),
        |r| r.set_document_number(DocumentNumber::parse("SPL-999999").unwrap()),
    ];
    for edit in edits {
        let mut b = bundle();
        edit(&mut b.payload);
        assert!(!verify(&b).unwrap());
    }
}

#[test]
fn swapped_key_fails() {
    let mut b = bundle();
    b.public_key = Ed25519KeyPair::from_seed(&[1u8; 32]).public_key();
    assert!(!verify(&b).unwrap());
}

#[test]
fn hand_edited_mrz_fails_and_is_reported() {
    let mut value = json_value(&bundle());
    value["payload"]["mrz"]["line1"] = serde_json::json!(format!("{:<<44}", "P<XAA<ROE<<JANE"));
    let b = Bundle::from_base64(&encode(&value)).unwrap();
    let report = spl_bundle::inspect(&b).unwrap();
    assert!(!report.signature_valid);
    assert!(!report.mrz_consistent);
}

#[test]
fn injected_field_is_malformed() {
    let mut value = json_value(&bundle());
    value["payload"]["admin"] = serde_json::json!(true);
    let err = verify_encoded(&encode(&value)).unwrap_err();
    assert!(matches!(err, BundleError::Malformed(_)));
}

#[test]
fn missing_fields_are_malformed() {
    for field in ["payload", "signature", "publicKey"] {
        let mut value = json_value(&bundle());
        value.as_object_mut().unwrap().remove(field);
        let err = verify_encoded(&encode(&value)).unwrap_err();
        assert!(matches!(err, BundleError::Malformed(_)), "{field}");
    }
}

#[test]
fn wrong_length_material_is_malformed() {
    let mut value = json_value(&bundle());
    value["signature"] = serde_json::json!(STANDARD.encode([0u8; SIGNATURE_LEN - 1]));
    assert!(matches!(
        verify_encoded(&encode(&value)),
        Err(BundleError::Malformed(_))
    ));

    let mut value = json_value(&bundle());
    value["publicKey"] = serde_json::json!(STANDARD.encode([0u8; 31]));
    assert!(matches!(
        verify_encoded(&encode(&value)),
        Err(BundleError::Malformed(_))
    ));
}

#[test]
fn not_base64_is_malformed() {
    assert!(matches!(
        verify_encoded("%%% definitely not base64 %%%"),
        Err(BundleError::Malformed(_))
    ));
}

/// Byte range of the `payload` value inside the compact bundle JSON.
fn payload_span(json: &str) -> std::ops::Range<usize> {
    let start = r#"{"payload":"#.len();
    let end = json.find(r#","signature":"#).unwrap();
    start..end
}

fn verify_raw(json: &[u8]) -> Result<bool, BundleError> {
    verify_encoded(&STANDARD.encode(json))
}

#[test]
fn issued_at_rewrites_are_malformed() {
    let json = bundle().to_json().unwrap();
    assert!(json.contains(r#""issuedAt":"2025-06-01T08:30:00Z""#));
    for rewritten in [
        "2025-06-01t08:30:00Z",
        "2025-06-01 08:30:00Z",
        "2025-06-01T08:30:00.999Z",
        "2025-06-01T08:30:00+00:00",
    ] {
        let edited = json.replace("2025-06-01T08:30:00Z", rewritten);
        assert!(
            matches!(verify_raw(edited.as_bytes()), Err(BundleError::Malformed(_))),
            "{rewritten}"
        );
    }
}

#[test]
fn no_single_byte_payload_edit_verifies() {
    let json = bundle().to_json().unwrap();
    assert!(verify_raw(json.as_bytes()).unwrap());
    for index in payload_span(&json) {
        for replacement in [b' ', b't', b'T', b'0', b'1', b'<', b'\\'] {
            let mut bytes = json.clone().into_bytes();
            if bytes[index] == replacement {
                continue;
            }
            bytes[index] = replacement;
            let outcome = verify_raw(&bytes);
            assert!(
                matches!(outcome, Ok(false) | Err(BundleError::Malformed(_))),
                "byte {index} -> {:?} gave {outcome:?}",
                replacement as char
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn any_single_bit_flip_in_signature_fails(index in 0..SIGNATURE_LEN, bit in 0u8..8) {
        let mut b = bundle();
        let mut bytes = *b.signature.as_bytes();
        bytes[index] ^= 1 << bit;
        b.signature = Ed25519Signature::from_bytes(bytes);
        prop_assert!(!verify(&b).unwrap());
    }

    #[test]
    fn any_payload_byte_replacement_fails(
        position in any::<prop::sample::Index>(),
        replacement in any::<u8>(),
    ) {
        let json = bundle().to_json().unwrap();
        let span = payload_span(&json);
        let index = span.start + position.index(span.len());
        let mut bytes = json.into_bytes();
        prop_assume!(bytes[index] != replacement);
        bytes[index] = replacement;
        let outcome = verify_raw(&bytes);
        prop_assert!(
            matches!(outcome, Ok(false) | Err(BundleError::Malformed(_))),
            "byte {} -> {:#04x} gave {:?}", index, replacement, outcome
        );
    }
}
