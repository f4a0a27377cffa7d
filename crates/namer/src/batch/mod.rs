//! Columnar batches: component tables, aligned results, and the adapter
//! between batch shapes and strategy entry points.

mod adapter;
mod result;
mod table;

pub use adapter::NamerInput;
pub(crate) use adapter::{
    apply_defaults, apply_forced, scatter_components, scatter_names, strip_column_prefix,
};
pub use result::{ComponentBatch, NameBatch, RowError};
pub use table::ComponentTable;
