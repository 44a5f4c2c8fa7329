//! # Note Recall
//!
//! Question answering over a personal Markdown vault.
//!
//! Notes are split into overlapping token windows, embedded into a flat L2
//! index, and paired ordinal-for-ordinal with a JSON metadata file. Questions
//! are classified into an exact-date lookup, a week lookup or a semantic
//! search; the matching chunks become the context for a single generator
//! call. When nothing matches, the answer is "Not found in notes." and the
//! generator is never contacted.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────┐   ┌──────────┐   ┌─────────┐   ┌──────────────────┐
//! │  Vault  │──▶│  Loader  │──▶│ Chunker │──▶│ index.bin +      │
//! │  (.md)  │   │ (YAML fm)│   │ (tokens)│   │ metadata.json    │
//! └─────────┘   └──────────┘   └─────────┘   └────────┬─────────┘
//!                                                     │
//!              ┌──────────┐   ┌───────────┐   ┌───────▼────────┐
//!  question ──▶│  Intent  │──▶│  Context  │──▶│ Prompt +       │
//!              │          │   │ Assembler │   │ Generator      │
//!              └──────────┘   └───────────┘   └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! recall index
//! recall ask "What did I do on 2025-11-03?" --type workouts
//! recall ask "Compare week 10 and week 12" --type workouts
//! recall classify --write
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Library error type |
//! | [`models`] | Documents, chunk records, split labels |
//! | [`vault`] | Vault file discovery |
//! | [`loader`] | Front-matter parsing |
//! | [`chunk`] | Token-window chunking |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`generation`] | Text generation provider abstraction |
//! | [`index`] | Flat L2 vector index |
//! | [`metadata`] | Metadata file and the index/metadata pair |
//! | [`ingest`] | Full index rebuild |
//! | [`intent`] | Question classification |
//! | [`context`] | Context assembly |
//! | [`prompt`] | Prompt templates |
//! | [`ask`] | Question answering pipeline |
//! | [`splits`] | Workout split labelling |
//! | [`stats`] | Index statistics |

pub mod ask;
pub mod chunk;
pub mod config;
pub mod context;
pub mod embedding;
pub mod error;
pub mod generation;
mod http;
pub mod index;
pub mod ingest;
pub mod intent;
pub mod loader;
pub mod metadata;
pub mod models;
pub mod prompt;
pub mod splits;
pub mod stats;
pub mod vault;
