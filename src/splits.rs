//! Workout split labelling.
//!
//! Sends each unlabelled workout chunk to the generator with a fixed
//! four-way instruction and records the answer in the metadata file. Records
//! that already carry a `split` are never sent again, so repeated runs
//! converge.

use anyhow::{Context, Result};

use crate::config::{Config, IndexConfig};
use crate::error;
use crate::generation::{self, Generator};
use crate::metadata::{save_metadata, Corpus};
use crate::models::{ChunkRecord, SplitLabel};

const WORKOUT_TYPE: &str = "workouts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyMode {
    /// Report what would change; leave records untouched.
    DryRun,
    Write,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyReport {
    /// Records labelled (or, in a dry run, that would be labelled).
    pub updated: usize,
    /// Records whose generator reply was not a valid label.
    pub skipped: usize,
    pub already_labeled: usize,
}

pub fn split_prompt(workout_text: &str) -> String {
    format!(
        "You are classifying a workout into one of four categories.\n\
         \n\
         Rules:\n\
         - Push = chest, shoulders, triceps dominant\n\
         - Pull = back, biceps, rear delts dominant\n\
         - Legs = quads, hamstrings, glutes, calves dominant\n\
         - Mixed = no clear dominance\n\
         \n\
         Return ONLY one word from:\n\
         Push, Pull, Legs, Mixed\n\
         \n\
         Workout log:\n\
         {}\n",
        workout_text.trim()
    )
}

fn is_workout_with_text(record: &ChunkRecord) -> bool {
    record.has_type(WORKOUT_TYPE) && !record.text.trim().is_empty()
}

/// Label every eligible record. A generator failure aborts the run; in
/// write mode records labelled before the failure stay labelled in memory
/// but the caller must not persist them.
pub async fn classify_splits(
    records: &mut [ChunkRecord],
    generator: &dyn Generator,
    mode: ClassifyMode,
) -> error::Result<ClassifyReport> {
    let mut report = ClassifyReport::default();

    for record in records.iter_mut().filter(|r| is_workout_with_text(r)) {
        if record.split.is_some() {
            report.already_labeled += 1;
            continue;
        }

        let reply = generator.generate(&split_prompt(&record.text)).await?;
        match reply.parse::<SplitLabel>() {
            Ok(label) => {
                tracing::info!(path = %record.path, chunk = record.chunk, split = %label, "classified");
                if mode == ClassifyMode::Write {
                    record.split = Some(label);
                }
                report.updated += 1;
            }
            Err(e) => {
                tracing::warn!(path = %record.path, chunk = record.chunk, error = %e, "skipping record");
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}

/// Label the records of a persisted corpus.
///
/// The index and metadata are loaded as a pair, so a store whose lengths
/// disagree is rejected before the generator is called. The metadata file
/// is rewritten only in write mode and only when a label changed.
pub async fn classify_store(
    index: &IndexConfig,
    generator: &dyn Generator,
    mode: ClassifyMode,
) -> Result<ClassifyReport> {
    let mut corpus = Corpus::load(index).with_context(|| {
        format!(
            "loading index {} and metadata {}",
            index.path.display(),
            index.metadata_path.display()
        )
    })?;

    let report = classify_splits(corpus.records_mut(), generator, mode).await?;

    if mode == ClassifyMode::Write && report.updated > 0 {
        save_metadata(&index.metadata_path, corpus.records())
            .with_context(|| format!("writing metadata {}", index.metadata_path.display()))?;
    }
    Ok(report)
}

/// CLI entry point for `recall classify`.
pub async fn run_classify(config: &Config, write: bool) -> Result<()> {
    let generator = generation::create_generator(&config.generation)?;
    let mode = if write {
        ClassifyMode::Write
    } else {
        ClassifyMode::DryRun
    };

    tracing::info!(model = generator.model_name(), ?mode, "classifying workout splits");
    let report = classify_store(&config.index, generator.as_ref(), mode).await?;

    println!("classify");
    match mode {
        ClassifyMode::Write => println!("  updated: {}", report.updated),
        ClassifyMode::DryRun => println!("  would update: {}", report.updated),
    }
    println!("  skipped: {}", report.skipped);
    println!("  already labeled: {}", report.already_labeled);
    if mode == ClassifyMode::DryRun {
        println!("  dry run: run with --write to persist changes");
    }
    println!("ok");

    Ok(())
}
