//! tableqa - Question answering over tabular corpora
//!
//! A reasoning agent that answers natural-language questions against
//! uploaded tables: spreadsheets are normalized into flat-header csvs,
//! chunked and embedded into a (optionally sharded) semantic index, and a
//! think-act-observe loop drives retrieval and arithmetic tools until a
//! final answer emerges.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Model and embedding provider traits with an OpenAI-compatible client
//! - **Tools**: Tool registry with retrieval, query-splitting, and arithmetic tools
//! - **Retrieval**: Loaders, chunker, sharded vector index, cache store
//! - **Table**: Spreadsheet grid readers and header normalization
//! - **Agent**: The bounded reasoning loop and its scratchpad
//! - **CLI**: Command-line interface and REPL

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod retrieval;
pub mod table;
pub mod tools;

// Re-export commonly used items
pub use agent::Agent;
pub use cli::Repl;
pub use crate::core::{Config, Result, RunOutcome, TableqaError};
