//! Dataset catalog: the annotation and split indexes behind one query facade.
//!
//! A catalog is built once from the two source documents and never mutated,
//! so a shared reference (or an `Arc`) can be read from any number of threads
//! without locking.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::ResolvedPaths;
use crate::errors::{RecountError, RecountResult};
use crate::index::{AnnotationIndex, SplitIndex};
use crate::models::{json_kind, FieldsRecord, PairKey, SourceDocument};

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Identity of one source document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceInfo {
    pub label: String,
    /// Hex SHA-256 of the document text.
    pub sha256: String,
    pub bytes: usize,
}

impl SourceInfo {
    fn of(document: &SourceDocument) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(document.text.as_bytes());
        Self {
            label: document.label.clone(),
            sha256: format!("{:x}", hasher.finalize()),
            bytes: document.text.len(),
        }
    }
}

/// What a catalog was built from, and how large it is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogSummary {
    pub annotation_source: SourceInfo,
    pub split_source: SourceInfo,
    pub image_root: String,
    pub annotation_pairs: usize,
    pub split_counts: IndexMap<String, usize>,
}

impl fmt::Display for CatalogSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "annotation file: {} ({} pairs, sha256 {})",
            self.annotation_source.label,
            self.annotation_pairs,
            short_digest(&self.annotation_source.sha256)
        )?;
        writeln!(
            f,
            "split file: {} (sha256 {})",
            self.split_source.label,
            short_digest(&self.split_source.sha256)
        )?;
        write!(f, "image root: {}", self.image_root)?;
        for (split, count) in &self.split_counts {
            write!(f, "\n{split}: {count}")?;
        }
        Ok(())
    }
}

fn short_digest(digest: &str) -> &str {
    &digest[..digest.len().min(12)]
}

// ---------------------------------------------------------------------------
// DatasetCatalog
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct DatasetCatalog {
    annotations: AnnotationIndex,
    splits: SplitIndex,
    image_root: String,
    summary: CatalogSummary,
}

impl DatasetCatalog {
    /// Build from raw document text, with generic source labels.
    pub fn from_documents(
        annotation_text: &str,
        split_text: &str,
        image_root: impl Into<String>,
    ) -> RecountResult<Self> {
        Self::from_sources(
            SourceDocument::new("<annotations>", annotation_text),
            SourceDocument::new("<splits>", split_text),
            image_root,
        )
    }

    /// Read both source files and build the catalog.
    pub fn open(paths: &ResolvedPaths) -> RecountResult<Self> {
        let annotation_text = std::fs::read_to_string(&paths.annotation_file)?;
        let split_text = std::fs::read_to_string(&paths.split_file)?;
        Self::from_sources(
            SourceDocument::new(paths.annotation_file.display().to_string(), annotation_text),
            SourceDocument::new(paths.split_file.display().to_string(), split_text),
            paths.image_root.clone(),
        )
    }

    /// Parse both documents and build the indexes. Either document failing to
    /// parse fails the whole construction.
    pub fn from_sources(
        annotation: SourceDocument,
        split: SourceDocument,
        image_root: impl Into<String>,
    ) -> RecountResult<Self> {
        let annotations = AnnotationIndex::from_labeled_str(&annotation.label, &annotation.text)?;
        let splits = SplitIndex::from_labeled_str(&split.label, &split.text)?;
        let image_root = image_root.into();

        let summary = CatalogSummary {
            annotation_source: SourceInfo::of(&annotation),
            split_source: SourceInfo::of(&split),
            image_root: image_root.clone(),
            annotation_pairs: annotations.len(),
            split_counts: splits.split_counts(),
        };
        info!("dataset catalog loaded\n{summary}");

        Ok(Self {
            annotations,
            splits,
            image_root,
            summary,
        })
    }

    pub fn summary(&self) -> &CatalogSummary {
        &self.summary
    }

    /// The image root exactly as configured.
    pub fn image_root(&self) -> &str {
        &self.image_root
    }

    pub fn annotations(&self) -> &AnnotationIndex {
        &self.annotations
    }

    pub fn splits(&self) -> &SplitIndex {
        &self.splits
    }

    // -----------------------------------------------------------------------
    // Annotation queries
    // -----------------------------------------------------------------------

    pub fn annotation(&self, image_id: &str, caption: &str) -> RecountResult<&FieldsRecord> {
        self.annotations.get(image_id, caption)
    }

    pub fn class_name(&self, image_id: &str, caption: &str) -> RecountResult<&str> {
        self.annotations.class_name(image_id, caption)
    }

    pub fn attribute_name(&self, image_id: &str, caption: &str) -> RecountResult<&str> {
        self.annotations.attribute_name(image_id, caption)
    }

    pub fn type_name(&self, image_id: &str, caption: &str) -> RecountResult<&str> {
        self.annotations.type_name(image_id, caption)
    }

    // -----------------------------------------------------------------------
    // Split queries
    // -----------------------------------------------------------------------

    pub fn members_of_split(&self, split: &str) -> RecountResult<&[PairKey]> {
        self.splits.members(split)
    }

    /// `None` means the pair belongs to no split; it is not an error.
    pub fn split_of(&self, image_id: &str, caption: &str) -> Option<&str> {
        self.splits.split_of(image_id, caption)
    }

    // -----------------------------------------------------------------------
    // Prompts
    // -----------------------------------------------------------------------

    /// Prompt list for an untyped `[image_id, caption]` value: the caption
    /// alone, in a list of one.
    ///
    /// The value must be a 2-element array whose second element is a string.
    /// The image id is discarded, so its type is not checked.
    pub fn prompt_for(&self, pair: &Value) -> RecountResult<Vec<String>> {
        let items = match pair {
            Value::Array(items) if items.len() == 2 => items,
            Value::Array(items) => {
                return Err(RecountError::InvalidArgument(format!(
                    "expected an (image_id, caption) pair, got {} elements",
                    items.len()
                )))
            }
            other => {
                return Err(RecountError::InvalidArgument(format!(
                    "expected an (image_id, caption) pair, got {}",
                    json_kind(other)
                )))
            }
        };
        match &items[1] {
            Value::String(caption) => Ok(vec![caption.clone()]),
            other => Err(RecountError::InvalidArgument(format!(
                "caption must be a string, got {}",
                json_kind(other)
            ))),
        }
    }

    pub fn prompt_for_pair(&self, pair: &PairKey) -> Vec<String> {
        vec![pair.caption.clone()]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
