//! Note loading and front-matter extraction.
//!
//! A note may open with a `---` line, followed by YAML key/value pairs and a
//! closing `---` line. Everything after the closing delimiter is the body.
//! Only flat scalar values are kept; date-like values are normalised to
//! ISO-8601 so that `date: 2025-11-03` and `date: 2025-11-03 07:30` compare
//! the same way the query side writes dates.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{RecallError, Result};
use crate::models::{Document, FrontMatter};
use crate::vault::VaultEntry;

const DELIMITER: &str = "---";

/// Read a vault entry from disk and split it into front matter and body.
pub fn load_document(entry: &VaultEntry) -> Result<Document> {
    let content = std::fs::read_to_string(&entry.path)?;
    let (front_matter, body) = parse_note(&entry.path, &content)?;

    let file_name = entry
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(Document {
        path: entry.path.clone(),
        relative_path: entry.relative_path.clone(),
        file_name,
        front_matter,
        body,
    })
}

/// Split raw note content into `(front matter, trimmed body)`.
///
/// `path` is used for error reporting only.
pub fn parse_note(path: &Path, content: &str) -> Result<(FrontMatter, String)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut lines = content.split_inclusive('\n');
    let opens_with_delimiter = lines
        .next()
        .map(|first| first.trim_end() == DELIMITER)
        .unwrap_or(false);

    if !opens_with_delimiter {
        return Ok((FrontMatter::default(), content.trim().to_string()));
    }

    let mut offset = content
        .split_inclusive('\n')
        .next()
        .map(str::len)
        .unwrap_or(0);
    let fm_start = offset;

    for line in lines {
        if line.trim_end() == DELIMITER {
            let yaml = &content[fm_start..offset];
            let body = &content[offset + line.len()..];
            let front_matter = parse_front_matter(path, yaml)?;
            return Ok((front_matter, body.trim().to_string()));
        }
        offset += line.len();
    }

    Err(RecallError::MalformedFrontMatter {
        path: path.to_path_buf(),
        reason: "missing closing '---' delimiter".to_string(),
    })
}

fn parse_front_matter(path: &Path, yaml: &str) -> Result<FrontMatter> {
    if yaml.trim().is_empty() {
        return Ok(FrontMatter::default());
    }

    let malformed = |reason: String| RecallError::MalformedFrontMatter {
        path: path.to_path_buf(),
        reason,
    };

    let value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| malformed(e.to_string()))?;

    let mapping = match value {
        serde_yaml::Value::Mapping(m) => m,
        serde_yaml::Value::Null => return Ok(FrontMatter::default()),
        _ => return Err(malformed("front matter is not a key/value mapping".into())),
    };

    let mut fields = BTreeMap::new();
    for (key, value) in mapping {
        let Some(key) = scalar_to_string(&key) else {
            continue;
        };
        match scalar_to_string(&value) {
            Some(v) => {
                fields.insert(key, normalize_value(&v));
            }
            None => tracing::debug!(key = %key, "ignoring non-scalar front matter value"),
        }
    }

    Ok(FrontMatter::new(fields))
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Normalise date and datetime strings to ISO-8601; pass anything else through.
pub fn normalize_value(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return dt.format("%Y-%m-%dT%H:%M:%S").to_string();
        }
    }

    raw.to_string()
}
