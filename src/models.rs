//! Core data models used throughout note-recall.
//!
//! These types represent the notes, chunk records, and split labels that flow
//! through the indexing and query pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::RecallError;

/// A note read from the vault, before chunking.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    /// Path relative to the vault root, `/`-separated.
    pub relative_path: String,
    pub file_name: String,
    pub front_matter: FrontMatter,
    pub body: String,
}

/// Flat key/value front matter. Date-like values are already ISO-8601.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    fields: BTreeMap<String, String>,
}

impl FrontMatter {
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn date(&self) -> Option<&str> {
        self.get("date")
    }

    pub fn day(&self) -> Option<&str> {
        self.get("day")
    }

    pub fn note_type(&self) -> Option<&str> {
        self.get("type")
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// One persisted chunk. Position `i` in the metadata file pairs with vector `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChunkRecord {
    pub file: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    pub chunk: usize,
    pub text: String,
    #[serde(
        default,
        rename = "type",
        skip_serializing_if = "Option::is_none"
    )]
    pub note_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitLabel>,
}

impl ChunkRecord {
    pub fn from_document(doc: &Document, chunk: usize, text: String) -> Self {
        let fm = &doc.front_matter;
        Self {
            file: doc.file_name.clone(),
            path: doc.relative_path.clone(),
            date: fm.date().map(str::to_string),
            day: fm.day().map(str::to_string),
            chunk,
            text,
            note_type: fm.note_type().map(str::to_string),
            split: None,
        }
    }

    pub fn has_type(&self, note_type: &str) -> bool {
        self.note_type.as_deref() == Some(note_type)
    }
}

/// Training split assigned to a workout entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitLabel {
    Push,
    Pull,
    Legs,
    Mixed,
}

impl SplitLabel {
    pub const ALL: [SplitLabel; 4] = [
        SplitLabel::Push,
        SplitLabel::Pull,
        SplitLabel::Legs,
        SplitLabel::Mixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SplitLabel::Push => "Push",
            SplitLabel::Pull => "Pull",
            SplitLabel::Legs => "Legs",
            SplitLabel::Mixed => "Mixed",
        }
    }
}

impl fmt::Display for SplitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitLabel {
    type Err = RecallError;

    /// Exact match after trimming surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SplitLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == trimmed)
            .ok_or_else(|| RecallError::InvalidClassificationLabel(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_label_parses_trimmed() {
        assert_eq!("  Legs\n".parse::<SplitLabel>().unwrap(), SplitLabel::Legs);
    }

    #[test]
    fn test_split_label_rejects_unknown() {
        let err = "Cardio".parse::<SplitLabel>().unwrap_err();
        assert!(matches!(err, RecallError::InvalidClassificationLabel(ref s) if s == "Cardio"));
        assert!("push".parse::<SplitLabel>().is_err());
    }

    #[test]
    fn test_record_omits_absent_fields() {
        let record = ChunkRecord {
            file: "a.md".into(),
            path: "Week 1/a.md".into(),
            date: None,
            day: None,
            chunk: 0,
            text: "hello".into(),
            note_type: Some("schedule".into()),
            split: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "schedule");
        assert!(json.get("date").is_none());
        assert!(json.get("split").is_none());
    }

    #[test]
    fn test_record_rejects_unknown_fields() {
        let raw = r#"{"file":"a.md","path":"a.md","chunk":0,"text":"x","colour":"red"}"#;
        assert!(serde_json::from_str::<ChunkRecord>(raw).is_err());
    }

    #[test]
    fn test_record_reads_split_label() {
        let raw = r#"{"file":"a.md","path":"a.md","chunk":1,"text":"x","type":"workouts","split":"Pull"}"#;
        let record: ChunkRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.split, Some(SplitLabel::Pull));
        assert!(record.has_type("workouts"));
    }
}
