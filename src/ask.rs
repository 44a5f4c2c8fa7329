//! Question answering: classify → assemble → generate.
//!
//! The generator only ever sees non-empty context. When the assembler
//! reports [`ContextBundle::NotFound`] the pipeline stops and returns
//! [`Answer::NotFound`] without contacting the generator.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::context::{ContextAssembler, ContextBundle, ContextEntry, QueryProfile};
use crate::embedding::{self, Embedder};
use crate::error;
use crate::generation::{self, Generator};
use crate::intent::{classify_with, QueryIntent};
use crate::metadata::Corpus;
use crate::prompt::{self, Framing};

pub const NOT_FOUND_MESSAGE: &str = "Not found in notes.";

/// Where a piece of context came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub path: String,
    pub date: Option<String>,
}

impl From<&ContextEntry> for Source {
    fn from(entry: &ContextEntry) -> Self {
        Self {
            path: entry.path.clone(),
            date: entry.date.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Generated { text: String, sources: Vec<Source> },
    NotFound,
}

/// A classified question and the context selected for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub intent: QueryIntent,
    pub bundle: ContextBundle,
}

impl Resolution {
    pub fn sources(&self) -> Vec<Source> {
        self.bundle.entries().into_iter().map(Source::from).collect()
    }
}

/// Classify `question` and assemble its context. Never calls a generator.
pub async fn resolve(
    corpus: &Corpus,
    question: &str,
    profile: &QueryProfile,
    top_k: usize,
    embedder: &dyn Embedder,
) -> error::Result<Resolution> {
    let intent = classify_with(question, profile.branches);
    tracing::debug!(?intent, type_filter = ?profile.type_filter.note_type(), "classified question");

    let bundle = ContextAssembler::new(corpus, top_k)
        .assemble(&intent, &profile.type_filter, question, embedder)
        .await?;
    Ok(Resolution { intent, bundle })
}

pub async fn answer_question(
    corpus: &Corpus,
    question: &str,
    profile: &QueryProfile,
    top_k: usize,
    embedder: &dyn Embedder,
    generator: &dyn Generator,
) -> error::Result<Answer> {
    let resolution = resolve(corpus, question, profile, top_k, embedder).await?;
    answer_resolved(&resolution, question, profile, generator).await
}

/// Render the prompt for an already resolved question and generate the
/// answer. An empty bundle yields [`Answer::NotFound`] without a call.
pub async fn answer_resolved(
    resolution: &Resolution,
    question: &str,
    profile: &QueryProfile,
    generator: &dyn Generator,
) -> error::Result<Answer> {
    let framing = Framing::for_type(profile.type_filter.note_type());
    let Some(prompt) = prompt::render(&resolution.bundle, framing, question) else {
        return Ok(Answer::NotFound);
    };

    tracing::info!(model = generator.model_name(), "generating answer");
    let text = generator.generate(&prompt).await?;
    Ok(Answer::Generated {
        text,
        sources: resolution.sources(),
    })
}

// ============ CLI ============

fn load_corpus(config: &Config) -> Result<Corpus> {
    Corpus::load(&config.index).with_context(|| {
        format!(
            "loading index {} and metadata {}",
            config.index.path.display(),
            config.index.metadata_path.display()
        )
    })
}

fn describe(intent: &QueryIntent) -> String {
    match intent {
        QueryIntent::ExactDate(date) => format!("Exact-date lookup: {}", date),
        QueryIntent::WeekRange(weeks) => {
            let weeks: Vec<String> = weeks.iter().map(|w| w.to_string()).collect();
            format!("Week lookup: {}", weeks.join(", "))
        }
        QueryIntent::Semantic => "Semantic retrieval".to_string(),
    }
}

fn print_sources(sources: &[Source]) {
    for source in sources {
        match &source.date {
            Some(date) => println!("  {} {}", source.path, date),
            None => println!("  {}", source.path),
        }
    }
}

/// CLI entry point for `recall ask`.
pub async fn run_ask(
    config: &Config,
    question: &str,
    profile: &QueryProfile,
    top_k: Option<usize>,
) -> Result<()> {
    let corpus = load_corpus(config)?;
    let embedder = embedding::create_embedder(&config.embedding)?;
    let generator = generation::create_generator(&config.generation)?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);

    let resolution = resolve(&corpus, question, profile, top_k, embedder.as_ref()).await?;
    println!("{}", describe(&resolution.intent));

    match answer_resolved(&resolution, question, profile, generator.as_ref()).await? {
        Answer::NotFound => println!("{}", NOT_FOUND_MESSAGE),
        Answer::Generated { text, sources } => {
            print_sources(&sources);
            println!();
            println!("Answer:");
            println!("{}", text);
        }
    }
    Ok(())
}

/// CLI entry point for `recall context`: print what `ask` would send.
pub async fn run_context(
    config: &Config,
    question: &str,
    profile: &QueryProfile,
    top_k: Option<usize>,
) -> Result<()> {
    let corpus = load_corpus(config)?;
    let embedder = embedding::create_embedder(&config.embedding)?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);

    let resolution = resolve(&corpus, question, profile, top_k, embedder.as_ref()).await?;
    println!("{}", describe(&resolution.intent));

    match &resolution.bundle {
        ContextBundle::NotFound => println!("{}", NOT_FOUND_MESSAGE),
        ContextBundle::Entries(entries) => {
            for (i, entry) in entries.iter().enumerate() {
                print_entry(i + 1, entry);
            }
        }
        ContextBundle::Weeks(blocks) => {
            for block in blocks {
                println!("Week {} ({} entries)", block.week, block.entries.len());
                for (i, entry) in block.entries.iter().enumerate() {
                    print_entry(i + 1, entry);
                }
            }
        }
    }
    Ok(())
}

fn print_entry(n: usize, entry: &ContextEntry) {
    match entry.distance {
        Some(d) => println!("{}. [{:.4}] {}", n, d, entry.path),
        None => println!("{}. {}", n, entry.path),
    }
    if let Some(date) = &entry.date {
        println!("    date: {}", date);
    }
    println!("    excerpt: \"{}\"", excerpt(&entry.text));
}

fn excerpt(text: &str) -> String {
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    match flat.char_indices().nth(160) {
        Some((cut, _)) => format!("{}…", &flat[..cut]),
        None => flat.to_string(),
    }
}
