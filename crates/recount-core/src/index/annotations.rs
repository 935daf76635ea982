//! Flat `(image_id, caption) -> fields` annotation index.
//!
//! The annotation source nests captions inside images:
//!
//! ```json
//! {
//!   "img1": {
//!     "a red cup": {"class": "cup", "attribute": "red", "type": "color"}
//!   }
//! }
//! ```
//!
//! Building the index projects that structure onto a single composite-key
//! map once, so every query is one hash probe regardless of nesting depth.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{RecountError, RecountResult};
use crate::models::{
    json_kind, FieldsRecord, PairKey, PairRef, ATTRIBUTE_FIELD, CLASS_FIELD, TYPE_FIELD,
};

const SOURCE_NAME: &str = "annotation source";

#[derive(Clone, Debug, Default)]
pub struct AnnotationIndex {
    entries: IndexMap<PairKey, FieldsRecord>,
}

impl AnnotationIndex {
    /// Parse and flatten an annotation document.
    pub fn from_json_str(text: &str) -> RecountResult<Self> {
        Self::from_labeled_str(SOURCE_NAME, text)
    }

    /// Like [`from_json_str`](Self::from_json_str), naming `source` (usually
    /// the file path) in parse errors.
    pub fn from_labeled_str(source: &str, text: &str) -> RecountResult<Self> {
        let doc: Value = serde_json::from_str(text)
            .map_err(|e| RecountError::source_parse(source, e.to_string()))?;
        Self::build(source, doc)
    }

    /// Flatten an already-parsed annotation document.
    ///
    /// The top level, every image entry and every caption entry must be JSON
    /// objects. Field values are kept as-is.
    pub fn from_value(doc: Value) -> RecountResult<Self> {
        Self::build(SOURCE_NAME, doc)
    }

    fn build(source: &str, doc: Value) -> RecountResult<Self> {
        let images = match doc {
            Value::Object(images) => images,
            other => {
                return Err(RecountError::source_parse(
                    source,
                    format!("top level must be an object, got {}", json_kind(&other)),
                ))
            }
        };

        let mut nested = Vec::with_capacity(images.len());
        for (image_id, captions) in images {
            let captions = match captions {
                Value::Object(captions) => captions,
                other => {
                    return Err(RecountError::source_parse(
                        source,
                        format!(
                            "image {image_id:?} must map captions to records, got {}",
                            json_kind(&other)
                        ),
                    ))
                }
            };
            let mut records = Vec::with_capacity(captions.len());
            for (caption, fields) in captions {
                let fields = match fields {
                    Value::Object(fields) => fields,
                    other => {
                        return Err(RecountError::source_parse(
                            source,
                            format!(
                                "record for ({image_id:?}, {caption:?}) must be an object, got {}",
                                json_kind(&other)
                            ),
                        ))
                    }
                };
                records.push((caption, FieldsRecord::new(fields)));
            }
            nested.push((image_id, records));
        }

        Ok(Self::from_entries(nested))
    }

    /// Flatten `(image_id, captions)` entries in iteration order.
    ///
    /// A pair emitted twice keeps the record written last.
    pub fn from_entries<I, C>(images: I) -> Self
    where
        I: IntoIterator<Item = (String, C)>,
        C: IntoIterator<Item = (String, FieldsRecord)>,
    {
        let mut entries: IndexMap<PairKey, FieldsRecord> = IndexMap::new();
        let mut image_count = 0usize;
        let mut overwritten = 0usize;

        for (image_id, captions) in images {
            image_count += 1;
            for (caption, record) in captions {
                let key = PairKey::new(image_id.as_str(), caption);
                if let Some(previous) = entries.insert(key, record) {
                    overwritten += 1;
                    warn!(
                        image_id = %image_id,
                        dropped_fields = previous.len(),
                        "duplicate annotation pair; keeping the later record"
                    );
                }
            }
        }

        debug!(
            images = image_count,
            pairs = entries.len(),
            overwritten,
            "annotation index built"
        );
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, image_id: &str, caption: &str) -> bool {
        self.entries.contains_key(&PairRef::new(image_id, caption))
    }

    /// Pairs and records in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &FieldsRecord)> {
        self.entries.iter()
    }

    /// Full record for a pair.
    pub fn get(&self, image_id: &str, caption: &str) -> RecountResult<&FieldsRecord> {
        self.entries
            .get(&PairRef::new(image_id, caption))
            .ok_or_else(|| RecountError::key_not_found(image_id, caption))
    }

    /// Raw value of any field of a pair's record.
    pub fn field(&self, image_id: &str, caption: &str, field: &str) -> RecountResult<&Value> {
        self.get(image_id, caption)?
            .get(field)
            .ok_or_else(|| RecountError::FieldMissing {
                image_id: image_id.to_string(),
                caption: caption.to_string(),
                field: field.to_string(),
            })
    }

    pub fn class_name(&self, image_id: &str, caption: &str) -> RecountResult<&str> {
        self.string_field(image_id, caption, CLASS_FIELD)
    }

    pub fn attribute_name(&self, image_id: &str, caption: &str) -> RecountResult<&str> {
        self.string_field(image_id, caption, ATTRIBUTE_FIELD)
    }

    pub fn type_name(&self, image_id: &str, caption: &str) -> RecountResult<&str> {
        self.string_field(image_id, caption, TYPE_FIELD)
    }

    fn string_field(&self, image_id: &str, caption: &str, field: &str) -> RecountResult<&str> {
        match self.field(image_id, caption, field)? {
            Value::String(value) => Ok(value.as_str()),
            _ => Err(RecountError::FieldNotString {
                image_id: image_id.to_string(),
                caption: caption.to_string(),
                field: field.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
