//! Shared display and configuration types for spyglass.
//!
//! Kept dependency-light (serde only) so the core library and any
//! front-end can agree on column identifiers and number formatting
//! without pulling in the parsing stack.

pub mod columns;
pub mod formatting;

pub use columns::{ColumnName, DEFAULT_COLUMN_ORDER};
