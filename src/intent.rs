//! Query intent classification.
//!
//! A question resolves through a strict priority chain:
//!
//! 1. an ISO date (`YYYY-MM-DD`) anywhere in the text → [`QueryIntent::ExactDate`]
//! 2. one or more `week <N>` mentions, case-insensitive → [`QueryIntent::WeekRange`]
//! 3. anything else → [`QueryIntent::Semantic`]
//!
//! Week numbers keep their order of appearance and are not deduplicated.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryIntent {
    ExactDate(String),
    WeekRange(Vec<u32>),
    Semantic,
}

/// Which of the non-semantic tiers a query may resolve to.
///
/// Semantic retrieval is always available as the final fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentBranches {
    pub exact_date: bool,
    pub week_range: bool,
}

impl Default for IntentBranches {
    fn default() -> Self {
        Self {
            exact_date: true,
            week_range: true,
        }
    }
}

fn date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid date regex"))
}

fn week_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bweek\s+(\d+)").expect("valid week regex"))
}

/// Classify with every tier enabled.
pub fn classify(question: &str) -> QueryIntent {
    classify_with(question, IntentBranches::default())
}

pub fn classify_with(question: &str, branches: IntentBranches) -> QueryIntent {
    if branches.exact_date {
        if let Some(date) = extract_iso_date(question) {
            return QueryIntent::ExactDate(date);
        }
    }

    if branches.week_range {
        let weeks = extract_weeks(question);
        if !weeks.is_empty() {
            return QueryIntent::WeekRange(weeks);
        }
    }

    QueryIntent::Semantic
}

pub fn extract_iso_date(text: &str) -> Option<String> {
    date_pattern().find(text).map(|m| m.as_str().to_string())
}

/// Every `week <N>` number in order of appearance, duplicates included.
/// Numbers too large for `u32` are ignored.
pub fn extract_weeks(text: &str) -> Vec<u32> {
    week_pattern()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect()
}
