//! Concrete identifier formats.

mod dtid;
mod ss_file;

pub use dtid::{DTID_FIELDS, DTID_SEPARATOR, dtid_namer, dtid_schema, dtid_strategy};
pub use ss_file::{SS_FILE_FIELDS, SsFileStrategy, ss_file_namer};
