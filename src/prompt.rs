//! Prompt templates for answer generation.
//!
//! A prompt is task framing, a fixed rule block, the context and the
//! question. Multi-week bundles use a comparison layout with one
//! `Week N` section per requested week.

use crate::context::{ContextBundle, ContextEntry, WeekBlock};

/// Task framing, chosen from the active type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    WorkoutLog,
    Schedule,
    PersonalNotes,
}

impl Framing {
    pub fn for_type(note_type: Option<&str>) -> Self {
        match note_type {
            Some("workouts") | Some("workouts-summary") => Framing::WorkoutLog,
            Some("schedule") => Framing::Schedule,
            _ => Framing::PersonalNotes,
        }
    }

    fn single(self) -> &'static str {
        match self {
            Framing::WorkoutLog => {
                "You are answering questions about personal workout logs.\n\
                 The context below is raw workout log text.\n\
                 Describe what workout was performed and which muscle groups were trained."
            }
            Framing::Schedule => {
                "You are answering questions about a personal schedule.\n\
                 The context below is raw schedule notes.\n\
                 Describe the planned activities and their timing."
            }
            Framing::PersonalNotes => {
                "You are answering questions about personal notes.\n\
                 The context below is raw note text."
            }
        }
    }

    fn comparison(self) -> &'static str {
        match self {
            Framing::WorkoutLog => {
                "You are comparing personal workout logs across weeks.\n\
                 Each section below holds the raw workout log for one week.\n\
                 Compare the training performed and the muscle groups trained in each week."
            }
            Framing::Schedule => {
                "You are comparing a personal schedule across weeks.\n\
                 Each section below holds the raw schedule notes for one week.\n\
                 Compare the planned activities in each week."
            }
            Framing::PersonalNotes => {
                "You are comparing personal notes across weeks.\n\
                 Each section below holds the raw notes for one week."
            }
        }
    }
}

const RULES: &str = "\
If context is provided, you MUST answer by interpreting it.
Do NOT say \"Not found in notes\" unless the context is empty.
Do not invent information.";

const COMPARISON_RULES: &str = "\
Answer from the sections only. If a week's section is empty, say that week has no notes.
Do not invent information.";

/// Render the prompt for a bundle, or `None` for `NotFound`.
pub fn render(bundle: &ContextBundle, framing: Framing, question: &str) -> Option<String> {
    match bundle {
        ContextBundle::Entries(entries) => Some(single_prompt(entries, framing, question)),
        ContextBundle::Weeks(blocks) => Some(comparison_prompt(blocks, framing, question)),
        ContextBundle::NotFound => None,
    }
}

pub fn single_prompt(entries: &[ContextEntry], framing: Framing, question: &str) -> String {
    format!(
        "{}\n\n{}\n\nContext:\n{}\n\nQuestion:\n{}\n",
        framing.single(),
        RULES,
        join_texts(entries),
        question.trim()
    )
}

pub fn comparison_prompt(blocks: &[WeekBlock], framing: Framing, question: &str) -> String {
    let mut sections = String::new();
    for block in blocks {
        sections.push_str(&format!("### Week {}\n", block.week));
        if block.entries.is_empty() {
            sections.push_str("(no notes)\n");
        } else {
            sections.push_str(&join_texts(&block.entries));
            sections.push('\n');
        }
        sections.push('\n');
    }

    format!(
        "{}\n\n{}\n\nContext:\n{}Question:\n{}\n",
        framing.comparison(),
        COMPARISON_RULES,
        sections,
        question.trim()
    )
}

fn join_texts(entries: &[ContextEntry]) -> String {
    entries
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str) -> ContextEntry {
        ContextEntry {
            ordinal: 0,
            file: "mon.md".into(),
            path: "Week 10/mon.md".into(),
            date: None,
            text: text.into(),
            distance: None,
        }
    }

    #[test]
    fn test_framing_by_type() {
        assert_eq!(Framing::for_type(Some("workouts")), Framing::WorkoutLog);
        assert_eq!(Framing::for_type(Some("workouts-summary")), Framing::WorkoutLog);
        assert_eq!(Framing::for_type(Some("schedule")), Framing::Schedule);
        assert_eq!(Framing::for_type(Some("journal")), Framing::PersonalNotes);
        assert_eq!(Framing::for_type(None), Framing::PersonalNotes);
    }

    #[test]
    fn test_single_prompt_layout() {
        let prompt = single_prompt(
            &[entry("Bench press 5x5"), entry("Dips 3x10")],
            Framing::WorkoutLog,
            " What did I do? ",
        );
        assert!(prompt.starts_with("You are answering questions about personal workout logs."));
        assert!(prompt.contains("Do not invent information."));
        assert!(prompt.contains("Context:\nBench press 5x5\nDips 3x10\n\nQuestion:\nWhat did I do?\n"));
    }

    #[test]
    fn test_comparison_prompt_sections() {
        let blocks = vec![
            WeekBlock {
                week: 10,
                entries: vec![entry("Bench press 5x5")],
            },
            WeekBlock {
                week: 12,
                entries: vec![],
            },
        ];
        let prompt = comparison_prompt(&blocks, Framing::WorkoutLog, "compare");
        let w10 = prompt.find("### Week 10\nBench press 5x5").unwrap();
        let w12 = prompt.find("### Week 12\n(no notes)").unwrap();
        assert!(w10 < w12);
        assert!(prompt.contains("Do not invent information."));
    }

    #[test]
    fn test_not_found_renders_nothing() {
        assert_eq!(render(&ContextBundle::NotFound, Framing::Schedule, "q"), None);
    }
}
