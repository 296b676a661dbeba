use std::fmt;

/// The string every redacted value or field name is replaced with.
pub const MASK: &str = "***";

/// Field names considered personally identifiable in the `users` table.
pub const PII_FIELDS: [&str; 5] = ["name", "email", "phone", "ssn", "password"];

/// An ordered set of sensitive field names.
///
/// The set is fixed once constructed. Membership is an exact, case sensitive string match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet(Vec<String>);

impl FieldSet {
    /// Creates a set from the given names, keeping their order. Duplicates and empty names
    /// are dropped.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !name.is_empty() && !fields.contains(&name) {
                fields.push(name);
            }
        }
        Self(fields)
    }

    /// Returns true if `field` is exactly one of the names in this set.
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|name| name == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for FieldSet {
    /// The PII field set, `name, email, phone, ssn, password`.
    fn default() -> Self {
        Self::new(PII_FIELDS.iter().copied())
    }
}

impl std::str::FromStr for FieldSet {
    type Err = FieldSetError;

    /// Parses a comma separated list of field names. Whitespace around names and empty entries
    /// are ignored, but at least one name must remain.
    ///
    /// Names that occur inside [`MASK`] are rejected. Masking such a name would create new
    /// occurrences of it, so redacting the same text twice would keep growing it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = Self::new(s.split(',').map(str::trim).filter(|name| !name.is_empty()));
        if fields.is_empty() {
            return Err(FieldSetError::Empty);
        }
        if let Some(name) = fields.iter().find(|name| MASK.contains(*name)) {
            return Err(FieldSetError::InsideMask(name.to_owned()));
        }
        Ok(fields)
    }
}

/// Represents a failure to parse a [`FieldSet`] from a list of names.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldSetError {
    /// The list did not contain a single field name.
    Empty,
    /// The field name is part of the mask itself.
    InsideMask(String),
}

impl fmt::Display for FieldSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use FieldSetError::*;
        match self {
            Empty => "No field names given".fmt(f),
            InsideMask(name) => write!(f, "Field name '{}' is part of the mask '{}'", name, MASK),
        }
    }
}

impl std::error::Error for FieldSetError {}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.join(",").fmt(f)
    }
}

/// Wrap any value in this to have its Display/Debug format replaced by [`MASK`].
/// Makes it possible to log the shape of a value, such as a connection config,
/// without writing out the secret itself.
pub struct Masked<T>(pub T);

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}
