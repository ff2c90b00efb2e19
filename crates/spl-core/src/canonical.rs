//! # Canonical Serialization
//!
//! Defines `CanonicalBytes`, the sole construction path for bytes that get
//! signed or verified anywhere in the workspace.
//!
//! ## Wire-Format Contract
//!
//! The signer and the verifier must derive byte-identical messages from the
//! same logical record, so the rules below are part of the bundle format:
//!
//! 1. **Maps**: keys sorted lexicographically (byte order) at every nesting
//!    level. Insertion order never matters. If a map holds the same key
//!    twice, the last insertion wins.
//! 2. **Sequences**: element order preserved.
//! 3. **Strings**: JSON string escaping as produced by `serde_json`.
//! 4. **Integers**: plain decimal.
//! 5. **Floats**: integral values below 2^53 are written as integers (so
//!    `2.0` and `2` encode identically and `-0.0` becomes `0`); other finite
//!    values use the shortest round-trip form. NaN and infinities are
//!    rejected.
//! 6. **Separators**: compact (`,` and `:`), no whitespace.
//!
//! ## Cycle Guard
//!
//! Records assembled at runtime from [`Datum`] trees can share composite
//! nodes through `Rc`. Every encoding pass tracks the identity of each
//! sequence and map it enters; reaching one a second time fails with
//! [`CanonicalizationError::CircularReference`] instead of recursing forever.
//! The tracking set lives only for the duration of one top-level call.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Largest magnitude at which every integral `f64` is exactly an integer.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Shared, mutable handle to a sequence node.
pub type SeqRef = Rc<RefCell<Vec<Datum>>>;

/// Shared, mutable handle to a map node. Entries keep insertion order;
/// canonical ordering is applied at encoding time.
pub type MapRef = Rc<RefCell<Vec<(String, Datum)>>>;

/// A dynamically-built record tree.
///
/// Composite nodes are reference-counted so a caller can assemble records
/// incrementally and share sub-trees. That also makes cycles expressible,
/// which is why encoding carries a cycle guard.
#[derive(Clone)]
pub enum Datum {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Seq(SeqRef),
    Map(MapRef),
}

impl Datum {
    /// Build a text scalar.
    pub fn text(value: impl Into<String>) -> Self {
        Datum::Text(value.into())
    }

    /// Build a sequence node from its elements.
    pub fn seq(items: Vec<Datum>) -> Self {
        Datum::Seq(Rc::new(RefCell::new(items)))
    }

    /// Build a map node from `(key, value)` pairs in the given order.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Datum)>,
    {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Datum::Map(Rc::new(RefCell::new(entries)))
    }

    /// Append to a sequence node. Returns `false` if `self` is not a sequence.
    pub fn push(&self, value: Datum) -> bool {
        match self {
            Datum::Seq(items) => {
                items.borrow_mut().push(value);
                true
            }
            _ => false,
        }
    }

    /// Insert into a map node, replacing an existing entry with the same key
    /// in place. Returns `false` if `self` is not a map.
    pub fn insert(&self, key: impl Into<String>, value: Datum) -> bool {
        match self {
            Datum::Map(entries) => {
                let key = key.into();
                let mut entries = entries.borrow_mut();
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(slot) => slot.1 = value,
                    None => entries.push((key, value)),
                }
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for Datum {
    // Shallow on purpose: a cyclic tree must still be printable.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Datum::Null => f.write_str("Null"),
            Datum::Bool(b) => write!(f, "Bool({b})"),
            Datum::Int(i) => write!(f, "Int({i})"),
            Datum::UInt(u) => write!(f, "UInt({u})"),
            Datum::Float(x) => write!(f, "Float({x})"),
            Datum::Text(s) => write!(f, "Text({s:?})"),
            Datum::Seq(items) => write!(f, "Seq(len={})", items.borrow().len()),
            Datum::Map(entries) => write!(f, "Map(len={})", entries.borrow().len()),
        }
    }
}

impl From<Value> for Datum {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Datum::Null,
            Value::Bool(b) => Datum::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Datum::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Datum::UInt(u)
                } else {
                    Datum::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Datum::Text(s),
            Value::Array(items) => Datum::seq(items.into_iter().map(Datum::from).collect()),
            Value::Object(map) => Datum::map(map.into_iter().map(|(k, v)| (k, Datum::from(v)))),
        }
    }
}

/// Bytes produced exclusively by the canonical encoder.
///
/// # Invariants
///
/// - The only constructors are [`CanonicalBytes::new()`] and
///   [`CanonicalBytes::from_datum()`].
/// - The content is valid UTF-8 JSON with sorted keys and compact separators.
///
/// The inner `Vec<u8>` is private, so downstream code cannot hand the signer
/// bytes that skipped canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `SerializationFailed` if the value cannot be represented as
    /// JSON (e.g. a map with non-string keys) and `NonFiniteNumber` for NaN
    /// or infinite floats.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_datum(&Datum::from(value))
    }

    /// Canonicalize a runtime-built record tree.
    ///
    /// # Errors
    ///
    /// Returns `CircularReference` when a composite node is reached twice.
    pub fn from_datum(datum: &Datum) -> Result<Self, CanonicalizationError> {
        let mut encoder = Encoder::default();
        encoder.encode(datum)?;
        Ok(Self(encoder.out.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Default)]
struct Encoder {
    out: String,
    seen: HashSet<*const ()>,
}

impl Encoder {
    fn enter(&mut self, node: *const ()) -> Result<(), CanonicalizationError> {
        if self.seen.insert(node) {
            Ok(())
        } else {
            Err(CanonicalizationError::CircularReference)
        }
    }

    fn encode(&mut self, datum: &Datum) -> Result<(), CanonicalizationError> {
        match datum {
            Datum::Null => self.out.push_str("null"),
            Datum::Bool(true) => self.out.push_str("true"),
            Datum::Bool(false) => self.out.push_str("false"),
            Datum::Int(i) => {
                let _ = write!(self.out, "{i}");
            }
            Datum::UInt(u) => {
                let _ = write!(self.out, "{u}");
            }
            Datum::Float(f) => self.encode_float(*f)?,
            Datum::Text(s) => self.encode_str(s)?,
            Datum::Seq(items) => {
                self.enter(Rc::as_ptr(items) as *const ())?;
                let items = items.borrow();
                self.out.push('[');
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        self.out.push(',');
                    }
                    self.encode(item)?;
                }
                self.out.push(']');
            }
            Datum::Map(entries) => {
                self.enter(Rc::as_ptr(entries) as *const ())?;
                let entries = entries.borrow();
                let mut sorted: Vec<&(String, Datum)> = entries.iter().collect();
                // Stable sort: among duplicate keys the last insertion stays last.
                sorted.sort_by(|a, b| a.0.cmp(&b.0));
                self.out.push('{');
                let mut first = true;
                for (idx, entry) in sorted.iter().enumerate() {
                    if sorted.get(idx + 1).is_some_and(|next| next.0 == entry.0) {
                        continue;
                    }
                    if !first {
                        self.out.push(',');
                    }
                    first = false;
                    self.encode_str(&entry.0)?;
                    self.out.push(':');
                    self.encode(&entry.1)?;
                }
                self.out.push('}');
            }
        }
        Ok(())
    }

    fn encode_str(&mut self, s: &str) -> Result<(), CanonicalizationError> {
        self.out.push_str(&serde_json::to_string(s)?);
        Ok(())
    }

    fn encode_float(&mut self, f: f64) -> Result<(), CanonicalizationError> {
        if !f.is_finite() {
            return Err(CanonicalizationError::NonFiniteNumber(f));
        }
        if f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER {
            let _ = write!(self.out, "{}", f as i64);
        } else {
            self.out.push_str(&serde_json::to_string(&f)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_str(datum: &Datum) -> String {
        let cb = CanonicalBytes::from_datum(datum).expect("should canonicalize");
        String::from_utf8(cb.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_canonical_bytes_simple_dict() {
        let data = serde_json::json!({"b": 2, "a": 1, "c": "hello"});
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"a":1,"b":2,"c":"hello"}"#);
    }

    #[test]
    fn test_canonical_bytes_nested() {
        let data = serde_json::json!({
            "outer": {"b": 2, "a": 1},
            "list": [3, 2, 1]
        });
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a = Datum::map([
            ("surname", Datum::text("DOE")),
            ("given", Datum::text("JANE")),
            ("nested", Datum::map([("z", Datum::Int(1)), ("a", Datum::Int(2))])),
        ]);
        let b = Datum::map([
            ("nested", Datum::map([("a", Datum::Int(2)), ("z", Datum::Int(1))])),
            ("given", Datum::text("JANE")),
            ("surname", Datum::text("DOE")),
        ]);
        assert_eq!(
            CanonicalBytes::from_datum(&a).unwrap(),
            CanonicalBytes::from_datum(&b).unwrap()
        );
    }

    #[test]
    fn test_sequence_order_is_significant() {
        let a = Datum::seq(vec![Datum::Int(1), Datum::Int(2)]);
        let b = Datum::seq(vec![Datum::Int(2), Datum::Int(1)]);
        assert_ne!(encode_str(&a), encode_str(&b));
    }

    #[test]
    fn test_duplicate_key_last_insert_wins() {
        let m = Datum::map([("k", Datum::Int(1)), ("k", Datum::Int(2))]);
        assert_eq!(encode_str(&m), r#"{"k":2}"#);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let m = Datum::map([("a", Datum::Int(1))]);
        assert!(m.insert("a", Datum::text("x")));
        assert!(m.insert("b", Datum::Null));
        assert_eq!(encode_str(&m), r#"{"a":"x","b":null}"#);
        assert!(!Datum::Null.insert("a", Datum::Null));
    }

    #[test]
    fn test_self_referencing_map_rejected() {
        let m = Datum::map([("name", Datum::text("loop"))]);
        m.insert("self", m.clone());
        let err = CanonicalBytes::from_datum(&m).unwrap_err();
        assert!(matches!(err, CanonicalizationError::CircularReference));
    }

    #[test]
    fn test_indirect_cycle_through_sequence_rejected() {
        let list = Datum::seq(vec![]);
        let holder = Datum::map([("items", list.clone())]);
        list.push(holder.clone());
        assert!(matches!(
            CanonicalBytes::from_datum(&holder),
            Err(CanonicalizationError::CircularReference)
        ));
    }

    #[test]
    fn test_shared_node_reached_twice_rejected() {
        let shared = Datum::map([("v", Datum::Int(1))]);
        let root = Datum::seq(vec![shared.clone(), shared]);
        assert!(matches!(
            CanonicalBytes::from_datum(&root),
            Err(CanonicalizationError::CircularReference)
        ));
    }

    #[test]
    fn test_guard_resets_between_calls() {
        let m = Datum::map([("a", Datum::Int(1))]);
        assert!(CanonicalBytes::from_datum(&m).is_ok());
        assert!(CanonicalBytes::from_datum(&m).is_ok());
    }

    #[test]
    fn test_cyclic_datum_debug_is_shallow() {
        let m = Datum::map([("a", Datum::Int(1))]);
        m.insert("self", m.clone());
        assert_eq!(format!("{m:?}"), "Map(len=2)");
    }

    #[test]
    fn test_integral_float_matches_integer() {
        let a = Datum::map([("n", Datum::Float(2.0))]);
        let b = Datum::map([("n", Datum::Int(2))]);
        assert_eq!(encode_str(&a), encode_str(&b));
    }

    #[test]
    fn test_negative_zero_normalized() {
        assert_eq!(encode_str(&Datum::Float(-0.0)), "0");
    }

    #[test]
    fn test_fractional_float_encoded() {
        let data = serde_json::json!({"amount": 1.5});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"amount":1.5}"#);
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(matches!(
            CanonicalBytes::from_datum(&Datum::Float(f64::NAN)),
            Err(CanonicalizationError::NonFiniteNumber(_))
        ));
        assert!(CanonicalBytes::from_datum(&Datum::Float(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_string_escaping() {
        let data = Datum::text("line\n\"quoted\"");
        assert_eq!(encode_str(&data), r#""line\n\"quoted\"""#);
    }

    #[test]
    fn test_unicode_passthrough() {
        let data = serde_json::json!({"name": "\u{00e9}\u{00e8}"});
        let cb = CanonicalBytes::new(&data).unwrap();
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert!(s.contains('\u{00e9}'));
    }

    #[test]
    fn test_scalars() {
        assert_eq!(encode_str(&Datum::Null), "null");
        assert_eq!(encode_str(&Datum::Bool(true)), "true");
        assert_eq!(encode_str(&Datum::Int(-42)), "-42");
        assert_eq!(encode_str(&Datum::UInt(u64::MAX)), "18446744073709551615");
    }

    #[test]
    fn test_empty_composites() {
        assert_eq!(encode_str(&Datum::seq(vec![])), "[]");
        assert_eq!(encode_str(&Datum::map(Vec::<(String, Datum)>::new())), "{}");
    }

    #[test]
    fn test_len_and_is_empty() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        assert!(!cb.is_empty());
        assert_eq!(cb.len(), 7);
    }
}
