use crate::fields::{FieldSet, MASK, PII_FIELDS};
use std::fmt;

/// One record from the data source, as an ordered sequence of values rendered to text.
pub type Row = Vec<String>;

const SEPARATOR: &str = "; ";

/// Turns rows into `field=value; field=value` lines.
///
/// Values are labeled by position: the i-th value gets the i-th label, whatever the
/// source column actually was. Pairing stops at the shorter of the labels and the row,
/// so missing values produce no pair at all and extra values are ignored.
#[derive(Debug, Clone)]
pub struct RowFormatter {
    labels: Vec<String>,
    sensitive: FieldSet,
}

impl RowFormatter {
    pub fn new<I, S>(labels: I, sensitive: FieldSet) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            sensitive,
        }
    }

    /// A formatter that labels values with the sensitive field names themselves,
    /// so every emitted value is masked.
    pub fn masking_all(sensitive: FieldSet) -> Self {
        let labels = sensitive.iter().map(str::to_owned).collect::<Vec<_>>();
        Self::new(labels, sensitive)
    }

    pub fn format<V: fmt::Display>(&self, row: &[V]) -> String {
        let pairs = self.labels.iter().zip(row).map(|(field, value)| {
            if self.sensitive.contains(field) {
                format!("{}={}", field, MASK)
            } else {
                format!("{}={}", field, value)
            }
        });
        pairs.collect::<Vec<_>>().join(SEPARATOR)
    }
}

impl Default for RowFormatter {
    fn default() -> Self {
        Self::masking_all(FieldSet::default())
    }
}

/// Formats `row` against the PII fields, masking every value.
///
/// ```
/// assert_eq!(
///     filtered_logger::format_log(&["Bob", "bob@x.com"]),
///     "name=***; email=***"
/// );
/// ```
pub fn format_log<V: fmt::Display>(row: &[V]) -> String {
    let sensitive = FieldSet::new(PII_FIELDS.iter().copied());
    RowFormatter::masking_all(sensitive).format(row)
}
