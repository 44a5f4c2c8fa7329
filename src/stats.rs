//! Index statistics.
//!
//! Summarises what the persisted index holds: chunk and note counts, the
//! embedding dimension, date coverage, a per-type breakdown and split
//! labelling progress. Used by `recall stats` to check that a build picked up
//! what was expected.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::time::UNIX_EPOCH;

use crate::config::Config;
use crate::metadata::Corpus;
use crate::models::ChunkRecord;

const UNTYPED: &str = "(none)";

/// Chunk and note counts for one `type` value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeStats {
    pub notes: usize,
    pub chunks: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusStats {
    pub chunks: usize,
    pub notes: usize,
    pub dims: usize,
    pub dated_chunks: usize,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub by_type: BTreeMap<String, TypeStats>,
    pub workout_chunks: usize,
    pub labelled_workouts: usize,
}

impl CorpusStats {
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let mut stats = Self::from_records(corpus.records());
        stats.dims = corpus.index().dims();
        stats
    }

    pub fn from_records(records: &[ChunkRecord]) -> Self {
        let mut stats = CorpusStats {
            chunks: records.len(),
            ..Default::default()
        };
        let mut notes: BTreeSet<&str> = BTreeSet::new();
        let mut notes_by_type: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        let mut dates: BTreeSet<&str> = BTreeSet::new();

        for r in records {
            notes.insert(&r.path);
            let ty = r.note_type.as_deref().unwrap_or(UNTYPED);
            notes_by_type.entry(ty).or_default().insert(&r.path);
            stats.by_type.entry(ty.to_string()).or_default().chunks += 1;

            if let Some(date) = r.date.as_deref() {
                stats.dated_chunks += 1;
                dates.insert(date);
            }
            if r.has_type("workouts") {
                stats.workout_chunks += 1;
                if r.split.is_some() {
                    stats.labelled_workouts += 1;
                }
            }
        }

        for (ty, paths) in notes_by_type {
            if let Some(entry) = stats.by_type.get_mut(ty) {
                entry.notes = paths.len();
            }
        }
        stats.notes = notes.len();
        stats.first_date = dates.first().map(|d| d.to_string());
        stats.last_date = dates.last().map(|d| d.to_string());
        stats
    }
}

/// CLI entry point for `recall stats`.
pub async fn run_stats(config: &Config) -> Result<()> {
    let corpus = Corpus::load(&config.index).with_context(|| {
        format!(
            "loading index {} and metadata {}",
            config.index.path.display(),
            config.index.metadata_path.display()
        )
    })?;
    let stats = CorpusStats::from_corpus(&corpus);

    let index_meta = std::fs::metadata(&config.index.path).ok();
    let index_size = index_meta.as_ref().map(|m| m.len()).unwrap_or(0);
    let built = index_meta
        .and_then(|m| m.modified().ok())
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| format_ts_relative(d.as_secs() as i64))
        .unwrap_or_else(|| "unknown".to_string());
    let metadata_size = std::fs::metadata(&config.index.metadata_path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("stats");
    println!(
        "  index: {} ({})",
        config.index.path.display(),
        format_bytes(index_size)
    );
    println!(
        "  metadata: {} ({})",
        config.index.metadata_path.display(),
        format_bytes(metadata_size)
    );
    println!("  built: {}", built);
    println!("  dimensions: {}", stats.dims);
    println!("  notes: {}", stats.notes);
    println!("  chunks: {}", stats.chunks);
    match (&stats.first_date, &stats.last_date) {
        (Some(first), Some(last)) => println!(
            "  dates: {} .. {} ({} dated chunks)",
            first, last, stats.dated_chunks
        ),
        _ => println!("  dates: none"),
    }
    if stats.workout_chunks > 0 {
        println!(
            "  splits labelled: {} / {} ({}%)",
            stats.labelled_workouts,
            stats.workout_chunks,
            (stats.labelled_workouts * 100) / stats.workout_chunks
        );
    }

    if !stats.by_type.is_empty() {
        println!();
        println!("  {:<24} {:>6} {:>8}", "TYPE", "NOTES", "CHUNKS");
        println!("  {}", "-".repeat(40));
        for (ty, s) in &stats.by_type {
            println!("  {:<24} {:>6} {:>8}", ty, s.notes, s.chunks);
        }
    }
    println!("ok");

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Relative time for recent timestamps, ISO otherwise.
fn format_ts_relative(ts: i64) -> String {
    let delta = chrono::Utc::now().timestamp() - ts;
    match delta {
        d if d < 0 => format_ts_iso(ts),
        d if d < 60 => "just now".to_string(),
        d if d < 3600 => plural(d / 60, "min"),
        d if d < 86400 => plural(d / 3600, "hour"),
        d if d < 86400 * 30 => plural(d / 86400, "day"),
        _ => format_ts_iso(ts),
    }
}

fn plural(n: i64, unit: &str) -> String {
    format!("{} {}{} ago", n, unit, if n == 1 { "" } else { "s" })
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}
