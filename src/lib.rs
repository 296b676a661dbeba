//! Log the rows of a user table without leaking personally identifiable information.
//!
//! Every row is turned into a `field=value; field=value` line by a [`RowFormatter`], in which
//! the values of sensitive fields are replaced by [`MASK`]. The line is then logged through a
//! [`UserDataLogger`], whose [`RedactingFormatter`] masks every occurrence of a sensitive field
//! name in the rendered output before it is written.

pub mod fields;
pub mod logging;
pub mod redact;
pub mod render;
pub mod row;

#[cfg(feature = "mysql")]
pub mod db;

mod export;

pub use export::log_rows;
pub use fields::{FieldSet, FieldSetError, Masked, MASK, PII_FIELDS};
pub use logging::{Output, UserDataLogger, LOGGER_NAME};
pub use redact::RedactingFormatter;
pub use render::{LogRecord, MessageRenderer, Render, TemplateRenderer, TemplateError};
pub use row::{format_log, Row, RowFormatter};
