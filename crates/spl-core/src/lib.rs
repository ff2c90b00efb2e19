//! # spl-core: Foundational Types for the Sampleland Issuer
//!
//! The leaf crate of the workspace. It defines everything that must be
//! byte-for-byte identical between the party that signs a credential and the
//! party that verifies it:
//!
//! - **`CanonicalBytes`**: the only construction path for signed messages.
//!   Keys are sorted at every nesting level, scalars have one textual form,
//!   and cyclic composites are rejected.
//!
//! - **`DocumentRecord`**: the signed payload. Its machine-readable zone is
//!   derived state: every mutator recomputes it, and there is no setter for
//!   the MRZ itself.
//!
//! - **`Mrz`**: the two 44-character machine-readable-zone lines.
//!
//! - **`Timestamp`**: UTC, seconds precision, `Z` suffix.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `spl-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod error;
pub mod mrz;
pub mod record;
pub mod temporal;

pub use canonical::{CanonicalBytes, Datum};
pub use error::{CanonicalizationError, SplError};
pub use mrz::{Mrz, MrzInput, DOC_FIELD_LEN, MRZ_FILLER, MRZ_LINE_LEN};
pub use record::{DocumentNumber, DocumentRecord, IssuerProfile, Sex, Subject, DOCUMENT_NUMBER_PREFIX};
pub use temporal::Timestamp;
