//! Split membership index: split name -> ordered `(image_id, caption)` pairs.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{RecountError, RecountResult};
use crate::models::{json_kind, PairKey, PairRef};

const SOURCE_NAME: &str = "split source";

/// Ordered split assignment plus a reverse `pair -> split` map.
///
/// Splits keep the order they had in the source, and so does every split's
/// pair sequence. The reverse map is built once and records, for each pair,
/// the first split (in split order) whose sequence contains it, which is
/// exactly what a linear scan over all splits would return.
#[derive(Clone, Debug, Default)]
pub struct SplitIndex {
    splits: IndexMap<String, Vec<PairKey>>,
    owner: IndexMap<PairKey, usize>,
}

impl SplitIndex {
    /// Parse and flatten a split document.
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

    /// Build from `{split: [[image_id, caption], ...]}`.
    ///
    /// Every entry must be a 2-element array of strings.
    pub fn from_value(doc: Value) -> RecountResult<Self> {
        Self::build(SOURCE_NAME, doc)
    }

    fn build(source: &str, doc: Value) -> RecountResult<Self> {
        let splits = match doc {
            Value::Object(splits) => splits,
            other => {
                return Err(RecountError::source_parse(
                    source,
                    format!("top level must be an object, got {}", json_kind(&other)),
                ))
            }
        };

        let mut parsed = Vec::with_capacity(splits.len());
        for (split, entries) in splits {
            let entries = match entries {
                Value::Array(entries) => entries,
                other => {
                    return Err(RecountError::source_parse(
                        source,
                        format!("split {split:?} must be an array, got {}", json_kind(&other)),
                    ))
                }
            };
            let pairs = entries
                .iter()
                .enumerate()
                .map(|(position, entry)| {
                    PairKey::from_json(entry).map_err(|reason| {
                        RecountError::source_parse(
                            source,
                            format!("split {split:?} entry {position}: {reason}"),
                        )
                    })
                })
                .collect::<RecountResult<Vec<_>>>()?;
            parsed.push((split, pairs));
        }

        Ok(Self::from_splits(parsed))
    }

    /// Build from already-normalised splits, in iteration order.
    ///
    /// A split name given twice keeps its first position and its last
    /// sequence.
    pub fn from_splits<I>(splits: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<PairKey>)>,
    {
        let splits: IndexMap<String, Vec<PairKey>> = splits.into_iter().collect();

        let mut owner: IndexMap<PairKey, usize> = IndexMap::new();
        for (position, (split, pairs)) in splits.iter().enumerate() {
            for pair in pairs {
                match owner.get(pair) {
                    None => {
                        owner.insert(pair.clone(), position);
                    }
                    Some(&first) if first != position => {
                        let kept = splits.get_index(first).map_or("", |(name, _)| name.as_str());
                        warn!(
                            pair = %pair,
                            kept,
                            ignored = %split,
                            "pair assigned to more than one split"
                        );
                    }
                    Some(_) => {}
                }
            }
        }

        let index = Self { splits, owner };
        debug!(
            splits = index.splits.len(),
            pairs = index.total_pairs(),
            "split index built"
        );
        index
    }

    /// Pairs of a split, in source order.
    pub fn members(&self, split: &str) -> RecountResult<&[PairKey]> {
        self.splits
            .get(split)
            .map(Vec::as_slice)
            .ok_or_else(|| RecountError::UnknownSplit(split.to_string()))
    }

    /// Name of the first split containing the pair, or `None` when the pair
    /// is unassigned.
    pub fn split_of(&self, image_id: &str, caption: &str) -> Option<&str> {
        let position = *self.owner.get(&PairRef::new(image_id, caption))?;
        self.splits
            .get_index(position)
            .map(|(name, _)| name.as_str())
    }

    /// Split names in source order.
    pub fn split_names(&self) -> impl Iterator<Item = &str> {
        self.splits.keys().map(String::as_str)
    }

    /// Number of pairs per split, in source order.
    pub fn split_counts(&self) -> IndexMap<String, usize> {
        self.splits
            .iter()
            .map(|(name, pairs)| (name.clone(), pairs.len()))
            .collect()
    }

    pub fn contains_split(&self, split: &str) -> bool {
        self.splits.contains_key(split)
    }

    /// Number of splits.
    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    /// Pairs across all splits, duplicates included.
    pub fn total_pairs(&self) -> usize {
        self.splits.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PairKey])> {
        self.splits
            .iter()
            .map(|(name, pairs)| (name.as_str(), pairs.as_slice()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pair(image_id: &str, caption: &str) -> PairKey {
        PairKey::new(image_id, caption)
    }

    fn sample_index() -> SplitIndex {
        SplitIndex::from_value(json!({
            "train": [["img1", "a red cup"], ["img3", "chairs"], ["img1", "the left chair"]],
            "val": [["img2", "apples"]],
            "test": []
        }))
        .unwrap()
    }

    #[test]
    fn test_members_preserve_source_order() {
        let index = sample_index();
        assert_eq!(
            index.members("train").unwrap(),
            &[
                pair("img1", "a red cup"),
                pair("img3", "chairs"),
                pair("img1", "the left chair"),
            ]
        );
        assert!(index.members("test").unwrap().is_empty());
    }

    #[test]
    fn test_split_names_keep_source_order() {
        let index = sample_index();
        let names: Vec<&str> = index.split_names().collect();
        assert_eq!(names, vec!["train", "val", "test"]);
        assert_eq!(index.total_pairs(), 4);
    }

    #[test]
    fn test_unknown_split_fails() {
        let index = sample_index();
        match index.members("holdout") {
            Err(RecountError::UnknownSplit(name)) => assert_eq!(name, "holdout"),
            other => panic!("expected UnknownSplit, got {other:?}"),
        }
    }

    #[test]
    fn test_split_of_found_and_unassigned() {
        let index = sample_index();
        assert_eq!(index.split_of("img2", "apples"), Some("val"));
        assert_eq!(index.split_of("img1", "the left chair"), Some("train"));
        assert_eq!(index.split_of("img2", "pears"), None);
    }

    #[test]
    fn test_split_of_returns_first_split_in_order() {
        let index = SplitIndex::from_splits(vec![
            ("val".to_string(), vec![pair("img1", "cups")]),
            ("train".to_string(), vec![pair("img2", "mugs"), pair("img1", "cups")]),
        ]);
        assert_eq!(index.split_of("img1", "cups"), Some("val"));
    }

    #[test]
    fn test_open_split_names() {
        let index = SplitIndex::from_value(json!({"holdout-2024": [["img7", "birds"]]})).unwrap();
        assert_eq!(index.split_of("img7", "birds"), Some("holdout-2024"));
        assert_eq!(index.split_counts().get("holdout-2024"), Some(&1));
    }

    #[test]
    fn test_rejects_wrong_arity_entries() {
        let err = SplitIndex::from_value(json!({"train": [["img1", "cups", "extra"]]})).unwrap_err();
        match err {
            RecountError::SourceParse { message, .. } => {
                assert!(message.contains("\"train\" entry 0"));
            }
            other => panic!("expected SourceParse, got {other:?}"),
        }
        assert!(SplitIndex::from_value(json!({"train": [["img1"]]})).is_err());
    }

    #[test]
    fn test_syntax_error_is_source_parse() {
        match SplitIndex::from_labeled_str("anno/splits.json", r#"{"train": [["img1", "cups"]"#) {
            Err(RecountError::SourceParse { source_name, .. }) => {
                assert_eq!(source_name, "anno/splits.json");
            }
            other => panic!("expected SourceParse, got {other:?}"),
        }
        assert!(matches!(
            SplitIndex::from_json_str("not json"),
            Err(RecountError::SourceParse { .. })
        ));
    }

    #[test]
    fn test_rejects_non_array_split() {
        assert!(matches!(
            SplitIndex::from_value(json!({"train": {"img1": "cups"}})),
            Err(RecountError::SourceParse { .. })
        ));
        assert!(matches!(
            SplitIndex::from_value(json!("train")),
            Err(RecountError::SourceParse { .. })
        ));
    }
}
