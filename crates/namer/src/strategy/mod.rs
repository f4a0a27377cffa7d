//! Naming strategies: how one identifier format encodes and decodes its components.
//!
//! A strategy knows nothing about validation. It turns components into a
//! name and back, once for a single record and once for a whole column of
//! records. The [`Namer`](crate::Namer) façade decides when each path runs.

mod delimited;
mod pattern;

pub use delimited::DelimitedStrategy;
pub use pattern::PatternStrategy;

use std::fmt;

use crate::batch::{ComponentBatch, ComponentTable, NameBatch};
use crate::components::Components;
use crate::error::ComponentResult;
use crate::schema::ComponentSchema;

/// Encode/decode contract for one identifier format.
///
/// Implementations are immutable and shareable across threads. Encoding must
/// be a deterministic function of the declared fields, and decoding must
/// invert it: `decode_one(encode_one(c)) == c` for every valid `c`.
pub trait NamingStrategy: fmt::Debug + Send + Sync {
    /// Fields this format is built from.
    fn schema(&self) -> &ComponentSchema;

    /// Render one components mapping.
    fn encode_one(&self, components: &Components) -> ComponentResult<String>;

    /// Split one name into its components.
    fn decode_one(&self, name: &str) -> ComponentResult<Components>;

    /// Render every row of a table using whole-column operations. The result
    /// has one slot per input row, in input order; rows that cannot be
    /// rendered carry an encoding error instead of a name.
    fn encode_many(&self, table: &ComponentTable) -> NameBatch;

    /// Decode every name into one table row, in input order. Names that do
    /// not have the expected shape carry a decoding error and null cells.
    fn decode_many(&self, names: &[&str]) -> ComponentBatch;

    /// Fill in components the strategy owns before validation runs.
    fn complete(&self, components: Components) -> Components {
        components
    }

    /// Column-wise counterpart of [`complete`](Self::complete).
    fn complete_many(&self, table: ComponentTable) -> ComponentTable {
        table
    }
}
