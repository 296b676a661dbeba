use crate::fields::{FieldSet, MASK};
use crate::render::{LogRecord, Render};

/// Renders log records with an inner [`Render`] and then masks every occurrence of the
/// configured field names in the resulting text.
///
/// The masking is a plain substring replacement over the whole rendered line. It is not
/// aware of `key=value` structure, so a field name that is part of some other word is masked
/// as well: with `name` configured, `username updated` comes out as `user*** updated`.
#[derive(Debug, Clone)]
pub struct RedactingFormatter<R> {
    fields: FieldSet,
    renderer: R,
}

impl<R: Render> RedactingFormatter<R> {
    pub fn new(fields: FieldSet, renderer: R) -> Self {
        Self { fields, renderer }
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// Renders `record` and redacts the result.
    pub fn format(&self, record: &LogRecord<'_>) -> String {
        let line = self.renderer.render(record);
        self.redact(line)
    }

    /// Replaces each configured field name in `text` with the mask, in field order.
    pub fn redact(&self, text: impl Into<String>) -> String {
        self.fields
            .iter()
            .fold(text.into(), |text, field| text.replace(field, MASK))
    }
}
