//! Flat, append-only L2 vector index.
//!
//! Vectors are addressed by insertion ordinal. There is no update or delete;
//! a content change means building a new index and saving it over the old
//! file.
//!
//! # File format
//!
//! ```text
//! offset  size        field
//! 0       4           magic "NRVI"
//! 4       4           format version (u32 LE, currently 1)
//! 8       4           dimension (u32 LE)
//! 12      8           vector count (u64 LE)
//! 20      count*dim*4 f32 LE components, insertion order
//! ```

use std::cmp::Ordering;
use std::path::Path;

use crate::embedding::{bytes_to_vec, vec_to_bytes};
use crate::error::{RecallError, Result};

const MAGIC: &[u8; 4] = b"NRVI";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 20;

/// One search hit: ordinal and Euclidean distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub ordinal: usize,
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dims: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            data: Vec::new(),
        }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        if self.dims == 0 {
            0
        } else {
            self.data.len() / self.dims
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a vector; returns its ordinal.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        if vector.len() != self.dims || self.dims == 0 {
            return Err(RecallError::DimensionMismatch {
                expected: self.dims,
                actual: vector.len(),
            });
        }
        let ordinal = self.len();
        self.data.extend_from_slice(vector);
        Ok(ordinal)
    }

    pub fn vector(&self, ordinal: usize) -> Option<&[f32]> {
        let start = ordinal.checked_mul(self.dims)?;
        self.data.get(start..start + self.dims)
    }

    /// The `k` nearest vectors to `query`, closest first. Equal distances
    /// are ordered by ordinal.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dims {
            return Err(RecallError::DimensionMismatch {
                expected: self.dims,
                actual: query.len(),
            });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut neighbors: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dims)
            .enumerate()
            .map(|(ordinal, v)| Neighbor {
                ordinal,
                distance: l2_distance(query, v),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.ordinal.cmp(&b.ordinal))
        });
        neighbors.truncate(k);
        Ok(neighbors)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.dims as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&vec_to_bytes(&self.data));
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN || &bytes[0..4] != MAGIC {
            return Err(RecallError::CorruptIndex("missing NRVI header".into()));
        }
        let version = read_u32(&bytes[4..8]);
        if version != FORMAT_VERSION {
            return Err(RecallError::CorruptIndex(format!(
                "unsupported format version {}",
                version
            )));
        }
        let dims = read_u32(&bytes[8..12]) as usize;
        let count = u64::from_le_bytes([
            bytes[12], bytes[13], bytes[14], bytes[15], bytes[16], bytes[17], bytes[18], bytes[19],
        ]) as usize;

        let payload = &bytes[HEADER_LEN..];
        let expected = count
            .checked_mul(dims)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| RecallError::CorruptIndex("header sizes overflow".into()))?;
        if payload.len() != expected {
            return Err(RecallError::CorruptIndex(format!(
                "expected {} payload bytes for {} vectors of dimension {}, found {}",
                expected,
                count,
                dims,
                payload.len()
            )));
        }
        if dims == 0 && count > 0 {
            return Err(RecallError::CorruptIndex("zero dimension with vectors".into()));
        }

        Ok(Self {
            dims,
            data: bytes_to_vec(payload),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Write the index to `path`, replacing any previous file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_bytes())
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Euclidean distance between two equal-length vectors.
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Write to a sibling temp file and rename it over `path`.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
