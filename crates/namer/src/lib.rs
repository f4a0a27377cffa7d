//! Namer: schema-validated formatting and parsing of identifier strings.
//!
//! An identifier format is a [`NamingStrategy`]: it turns a components
//! mapping into a name and back, for one record or a whole column of
//! records. A [`Namer`] wraps one strategy with validation and coercion and
//! exposes the same four operations for every format.
//!
//! # Core Principles
//!
//! - **Composition**: a new format is a new strategy, never a new namer
//! - **Columnar batches**: batch operations work column by column
//! - **Aligned results**: batch output keeps every input row, in order
//!
//! # Example
//!
//! ```
//! use namer::{ComponentTable, components, dtid_namer};
//!
//! let namer = dtid_namer().unwrap();
//!
//! let name = namer
//!     .format(&components! { "document_id" => "1234", "tabletype" => "some-org_2", "tnum" => 3 })
//!     .unwrap();
//! assert_eq!(name, "1234/some-org_2/3");
//!
//! let parsed = namer.parse_many(&["1234/some-org_2/3", "bad-string"]);
//! assert_eq!(parsed.len(), 2);
//! assert!(parsed.error_at(1).is_some());
//!
//! let table = ComponentTable::from_rows(&[parsed.get(0).unwrap()]);
//! assert_eq!(namer.format_many(&table).get(0), Some("1234/some-org_2/3"));
//! ```

pub mod batch;
pub mod components;
pub mod error;
pub mod formats;
pub mod input;
pub mod schema;
pub mod strategy;
pub mod validation;

mod namer;

pub use crate::namer::{FormatOptions, Namer, NamerConfig};
pub use batch::{ComponentBatch, ComponentTable, NameBatch, NamerInput, RowError};
pub use components::Components;
pub use error::{ComponentError, ComponentResult, NamerError, Result};
pub use formats::{SsFileStrategy, dtid_namer, ss_file_namer};
pub use schema::{Coercion, ComponentSchema, Constraint, FieldSpec, FieldType, Value};
pub use strategy::{DelimitedStrategy, NamingStrategy, PatternStrategy};
pub use validation::Validator;
