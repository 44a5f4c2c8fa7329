//! Context assembly.
//!
//! Turns a [`QueryIntent`] into a [`ContextBundle`]: the chunk texts that
//! ground an answer. Every branch applies the same [`TypeFilter`], and every
//! branch decides "not found" before a generator could be involved.
//!
//! | Intent | Selection |
//! |--------|-----------|
//! | `ExactDate(d)` | records with `date == d` |
//! | `WeekRange([n])` | records whose `path` contains `"Week n"` |
//! | `WeekRange([n, m, …])` | one labelled block per week |
//! | `Semantic` | global top-K by L2 distance, then filtered to allowed ordinals |
//!
//! Semantic filtering happens after ranking, so a filtered query can return
//! fewer than K entries (or none) even when matching records exist further
//! down the ranking.

use std::collections::HashSet;

use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::Neighbor;
use crate::intent::{IntentBranches, QueryIntent};
use crate::metadata::Corpus;
use crate::models::ChunkRecord;

/// Restricts context to records of one note type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeFilter(Option<String>);

impl TypeFilter {
    /// Match every record.
    pub fn any() -> Self {
        Self(None)
    }

    pub fn only(note_type: impl Into<String>) -> Self {
        Self(Some(note_type.into()))
    }

    pub fn from_option(note_type: Option<String>) -> Self {
        Self(note_type)
    }

    pub fn note_type(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn matches(&self, record: &ChunkRecord) -> bool {
        match &self.0 {
            None => true,
            Some(t) => record.has_type(t),
        }
    }

    /// Ordinals of every record passing the filter.
    pub fn allowed_ordinals(&self, records: &[ChunkRecord]) -> AllowedOrdinals {
        match &self.0 {
            None => AllowedOrdinals::All,
            Some(_) => AllowedOrdinals::Only(
                records
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| self.matches(r))
                    .map(|(i, _)| i)
                    .collect(),
            ),
        }
    }
}

/// The set of ordinals a semantic query may return, computed once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrdinals {
    All,
    Only(HashSet<usize>),
}

impl AllowedOrdinals {
    pub fn contains(&self, ordinal: usize) -> bool {
        match self {
            AllowedOrdinals::All => true,
            AllowedOrdinals::Only(set) => set.contains(&ordinal),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AllowedOrdinals::Only(set) if set.is_empty())
    }
}

/// Type filter plus enabled intent tiers for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryProfile {
    pub type_filter: TypeFilter,
    pub branches: IntentBranches,
}

impl QueryProfile {
    pub fn for_type(note_type: impl Into<String>) -> Self {
        Self {
            type_filter: TypeFilter::only(note_type),
            branches: IntentBranches::default(),
        }
    }
}

/// One record selected as context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextEntry {
    pub ordinal: usize,
    pub file: String,
    pub path: String,
    pub date: Option<String>,
    pub text: String,
    /// Distance to the question, for semantic hits.
    pub distance: Option<f32>,
}

impl ContextEntry {
    fn from_record(ordinal: usize, record: &ChunkRecord) -> Self {
        Self {
            ordinal,
            file: record.file.clone(),
            path: record.path.clone(),
            date: record.date.clone(),
            text: record.text.clone(),
            distance: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekBlock {
    pub week: u32,
    pub entries: Vec<ContextEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContextBundle {
    /// A single block of entries, in metadata or ranking order.
    Entries(Vec<ContextEntry>),
    /// One labelled block per requested week, in request order.
    Weeks(Vec<WeekBlock>),
    NotFound,
}

impl ContextBundle {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContextBundle::NotFound)
    }

    /// Every entry in the bundle, in order.
    pub fn entries(&self) -> Vec<&ContextEntry> {
        match self {
            ContextBundle::Entries(entries) => entries.iter().collect(),
            ContextBundle::Weeks(blocks) => blocks.iter().flat_map(|b| b.entries.iter()).collect(),
            ContextBundle::NotFound => Vec::new(),
        }
    }
}

pub struct ContextAssembler<'a> {
    corpus: &'a Corpus,
    top_k: usize,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(corpus: &'a Corpus, top_k: usize) -> Self {
        Self { corpus, top_k }
    }

    /// Select context for `intent`. Only the semantic branch calls the embedder.
    pub async fn assemble(
        &self,
        intent: &QueryIntent,
        filter: &TypeFilter,
        question: &str,
        embedder: &dyn Embedder,
    ) -> Result<ContextBundle> {
        let bundle = match intent {
            QueryIntent::ExactDate(date) => {
                non_empty(self.collect(filter, |r| r.date.as_deref() == Some(date.as_str())))
            }
            QueryIntent::WeekRange(weeks) => self.weeks(weeks, filter),
            QueryIntent::Semantic => self.semantic(question, filter, embedder).await?,
        };
        Ok(bundle)
    }

    fn collect(
        &self,
        filter: &TypeFilter,
        predicate: impl Fn(&ChunkRecord) -> bool,
    ) -> Vec<ContextEntry> {
        self.corpus
            .records()
            .iter()
            .enumerate()
            .filter(|(_, r)| filter.matches(r) && predicate(r))
            .map(|(i, r)| ContextEntry::from_record(i, r))
            .collect()
    }

    fn week(&self, week: u32, filter: &TypeFilter) -> Vec<ContextEntry> {
        let needle = format!("Week {}", week);
        self.collect(filter, |r| r.path.contains(&needle))
    }

    fn weeks(&self, weeks: &[u32], filter: &TypeFilter) -> ContextBundle {
        match weeks {
            [] => ContextBundle::NotFound,
            [single] => non_empty(self.week(*single, filter)),
            many => {
                let blocks: Vec<WeekBlock> = many
                    .iter()
                    .map(|&week| WeekBlock {
                        week,
                        entries: self.week(week, filter),
                    })
                    .collect();
                if blocks.iter().all(|b| b.entries.is_empty()) {
                    ContextBundle::NotFound
                } else {
                    ContextBundle::Weeks(blocks)
                }
            }
        }
    }

    async fn semantic(
        &self,
        question: &str,
        filter: &TypeFilter,
        embedder: &dyn Embedder,
    ) -> Result<ContextBundle> {
        let allowed = filter.allowed_ordinals(self.corpus.records());
        if allowed.is_empty() || self.corpus.is_empty() {
            return Ok(ContextBundle::NotFound);
        }

        let query = embedder.embed(question).await?;
        let ranked = self.corpus.index().search(&query, self.top_k)?;
        let kept = filter_ranked(ranked, &allowed);
        tracing::debug!(top_k = self.top_k, kept = kept.len(), "semantic retrieval");

        let records = self.corpus.records();
        let entries: Vec<ContextEntry> = kept
            .into_iter()
            .filter_map(|n| {
                records.get(n.ordinal).map(|r| ContextEntry {
                    distance: Some(n.distance),
                    ..ContextEntry::from_record(n.ordinal, r)
                })
            })
            .collect();

        Ok(non_empty(entries))
    }
}

/// Drop ranked neighbors outside the allowed set, keeping rank order.
pub fn filter_ranked(ranked: Vec<Neighbor>, allowed: &AllowedOrdinals) -> Vec<Neighbor> {
    ranked
        .into_iter()
        .filter(|n| allowed.contains(n.ordinal))
        .collect()
}

fn non_empty(entries: Vec<ContextEntry>) -> ContextBundle {
    if entries.is_empty() {
        ContextBundle::NotFound
    } else {
        ContextBundle::Entries(entries)
    }
}
