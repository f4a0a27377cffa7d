//! Document-table identifiers: `<document_id>/<tabletype>/<tnum>`.
//!
//! `tnum` is canonically a string. Integer input is coerced to its decimal
//! form, so `tnum = 3` and `tnum = "3"` format identically, and parsing
//! always yields the string `"3"`.

use crate::error::Result;
use crate::namer::Namer;
use crate::schema::{Coercion, ComponentSchema, FieldSpec};
use crate::strategy::DelimitedStrategy;

/// Field names, in name order.
pub const DTID_FIELDS: [&str; 3] = ["document_id", "tabletype", "tnum"];

pub const DTID_SEPARATOR: char = '/';

pub fn dtid_schema() -> Result<ComponentSchema> {
    ComponentSchema::new(vec![
        FieldSpec::string(DTID_FIELDS[0]),
        FieldSpec::string(DTID_FIELDS[1]),
        FieldSpec::string(DTID_FIELDS[2]).coerce(Coercion::ToString),
    ])
}

pub fn dtid_strategy() -> Result<DelimitedStrategy> {
    DelimitedStrategy::new(dtid_schema()?, DTID_SEPARATOR)
}

/// Namer for document-table identifiers.
pub fn dtid_namer() -> Result<Namer> {
    Ok(Namer::new(dtid_strategy()?))
}
