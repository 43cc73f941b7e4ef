//! Table module - spreadsheet normalization
//!
//! Grid readers, header flattening, and corpus description rendering.

pub mod describe;
pub mod grid;
pub mod headers;

pub use describe::{collect_file_paths, preprocess_tables};
pub use grid::{Cell, Grid};
pub use headers::{structure_headers, FlattenedHeaders, NormalizedTable};
