//! Ordinal-aligned chunk metadata and the loaded index/metadata pair.
//!
//! The metadata file is a JSON array of [`ChunkRecord`]s; record `i`
//! describes vector `i` of the [`VectorIndex`]. [`Corpus::load`] refuses to
//! return a pair whose lengths differ.

use std::path::Path;

use crate::config::IndexConfig;
use crate::error::{RecallError, Result};
use crate::index::{write_atomic, VectorIndex};
use crate::models::ChunkRecord;

pub fn load_metadata(path: &Path) -> Result<Vec<ChunkRecord>> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| RecallError::InvalidMetadata(format!("{}: {}", path.display(), e)))
}

/// Overwrite the whole metadata file in one atomic rename.
pub fn save_metadata(path: &Path, records: &[ChunkRecord]) -> Result<()> {
    let json = serde_json::to_vec_pretty(records)?;
    write_atomic(path, &json)
}

/// A vector index together with its metadata records.
#[derive(Debug, Clone)]
pub struct Corpus {
    index: VectorIndex,
    records: Vec<ChunkRecord>,
}

impl Corpus {
    /// Pair an index with its records, failing if their lengths differ.
    pub fn new(index: VectorIndex, records: Vec<ChunkRecord>) -> Result<Self> {
        if index.len() != records.len() {
            return Err(RecallError::IndexMetadataMismatch {
                vectors: index.len(),
                records: records.len(),
            });
        }
        Ok(Self { index, records })
    }

    pub fn load(config: &IndexConfig) -> Result<Self> {
        let index = VectorIndex::load(&config.path)?;
        let records = load_metadata(&config.metadata_path)?;
        tracing::debug!(
            vectors = index.len(),
            records = records.len(),
            dims = index.dims(),
            "loaded corpus"
        );
        Self::new(index, records)
    }

    /// Persist both files. Metadata is written last so a reader never sees
    /// new records next to an old index for longer than one rename.
    pub fn save(&self, config: &IndexConfig) -> Result<()> {
        self.index.save(&config.path)?;
        save_metadata(&config.metadata_path, &self.records)
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn records(&self) -> &[ChunkRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [ChunkRecord] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
