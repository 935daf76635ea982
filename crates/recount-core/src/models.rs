//! Shared typed models used by the annotation index, split index and catalog.

use std::fmt;

use indexmap::Equivalent;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Field name constants
// ---------------------------------------------------------------------------

/// Annotation field holding the counted object class.
pub const CLASS_FIELD: &str = "class";

/// Annotation field holding the referring attribute.
pub const ATTRIBUTE_FIELD: &str = "attribute";

/// Annotation field holding the attribute type.
pub const TYPE_FIELD: &str = "type";

// ---------------------------------------------------------------------------
// 1. PairKey
// ---------------------------------------------------------------------------

/// An `(image_id, caption)` pair, the composite key of every index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub image_id: String,
    pub caption: String,
}

impl PairKey {
    pub fn new(image_id: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            caption: caption.into(),
        }
    }

    pub fn as_pair_ref(&self) -> PairRef<'_> {
        PairRef {
            image_id: &self.image_id,
            caption: &self.caption,
        }
    }

    /// Normalise a JSON `[image_id, caption]` array into a pair.
    ///
    /// The error is a bare shape description; callers wrap it in the error
    /// variant that fits their context.
    pub fn from_json(value: &Value) -> Result<Self, String> {
        let items = match value {
            Value::Array(items) => items,
            other => return Err(format!("expected a 2-element array, got {}", json_kind(other))),
        };
        if items.len() != 2 {
            return Err(format!("expected a 2-element array, got {} elements", items.len()));
        }
        match (&items[0], &items[1]) {
            (Value::String(image_id), Value::String(caption)) => {
                Ok(Self::new(image_id.as_str(), caption.as_str()))
            }
            (a, b) => Err(format!(
                "expected [string, string], got [{}, {}]",
                json_kind(a),
                json_kind(b)
            )),
        }
    }
}

impl From<(String, String)> for PairKey {
    fn from((image_id, caption): (String, String)) -> Self {
        Self { image_id, caption }
    }
}

impl From<PairKey> for (String, String) {
    fn from(pair: PairKey) -> Self {
        (pair.image_id, pair.caption)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.image_id, self.caption)
    }
}

/// Borrowed view of a [`PairKey`], used to look up maps without allocating.
///
/// Hashes identically to `PairKey` because `String` and `&str` hash the same.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PairRef<'a> {
    pub image_id: &'a str,
    pub caption: &'a str,
}

impl<'a> PairRef<'a> {
    pub fn new(image_id: &'a str, caption: &'a str) -> Self {
        Self { image_id, caption }
    }
}

impl Equivalent<PairKey> for PairRef<'_> {
    fn equivalent(&self, key: &PairKey) -> bool {
        self.image_id == key.image_id && self.caption == key.caption
    }
}

// ---------------------------------------------------------------------------
// 2. FieldsRecord
// ---------------------------------------------------------------------------

/// The annotation fields attached to one pair.
///
/// Every field of the source object is kept, in source order, not only the
/// three named ones.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldsRecord(Map<String, Value>);

impl FieldsRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for FieldsRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

// ---------------------------------------------------------------------------
// 3. SourceDocument
// ---------------------------------------------------------------------------

/// A source document handed to the catalog: its text plus a label used in
/// logs and the construction summary (usually the file path).
#[derive(Clone, Debug)]
pub struct SourceDocument {
    pub label: String,
    pub text: String,
}

impl SourceDocument {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Short name of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
