//! Turning a log record into a line of text, before any redaction happens.

use chrono::{DateTime, Local};
use std::fmt;

/// Timestamp layout used by the `{timestamp}` placeholder, e.g. `2024-01-02 03:04:05,678`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// A single log call, with the message already formatted.
#[derive(Debug, Clone)]
pub struct LogRecord<'a> {
    pub message: String,
    pub level: log::Level,
    pub logger: &'a str,
    pub timestamp: DateTime<Local>,
}

impl<'a> LogRecord<'a> {
    /// Captures `record` and stamps it with the current local time.
    pub fn from_log(record: &'a log::Record<'_>) -> Self {
        Self {
            message: record.args().to_string(),
            level: record.level(),
            logger: record.target(),
            timestamp: Local::now(),
        }
    }
}

/// Something that can turn a [`LogRecord`] into text.
pub trait Render: Send + Sync {
    fn render(&self, record: &LogRecord<'_>) -> String;
}

/// Renders only the message.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageRenderer;

impl Render for MessageRenderer {
    fn render(&self, record: &LogRecord<'_>) -> String {
        record.message.clone()
    }
}

impl<R: Render + ?Sized> Render for Box<R> {
    fn render(&self, record: &LogRecord<'_>) -> String {
        (**self).render(record)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Timestamp,
    Level,
    Logger,
    Message,
}

/// Renders records according to a pattern such as `[{logger}] {level} {timestamp}: {message}`.
///
/// Supported placeholders are `{timestamp}`, `{level}`, `{logger}` and `{message}`.
/// A literal brace is written as `{{` or `}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRenderer {
    segments: Vec<Segment>,
}

impl TemplateRenderer {
    pub fn parse(pattern: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.char_indices().peekable();
        while let Some((position, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|&(_, c)| c) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, c)) => name.push(c),
                            None => return Err(TemplateError::Unclosed { position }),
                        }
                    }
                    let segment = match name.as_str() {
                        "timestamp" => Segment::Timestamp,
                        "level" => Segment::Level,
                        "logger" => Segment::Logger,
                        "message" => Segment::Message,
                        _ => return Err(TemplateError::UnknownPlaceholder { position, name }),
                    };
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                }
                '}' if chars.peek().map(|&(_, c)| c) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(TemplateError::UnmatchedClose { position }),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }
}

impl std::str::FromStr for TemplateRenderer {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Render for TemplateRenderer {
    fn render(&self, record: &LogRecord<'_>) -> String {
        use fmt::Write as _;

        let mut line = String::new();
        for segment in &self.segments {
            // Writing into a String never fails.
            let _ = match segment {
                Segment::Literal(text) => line.write_str(text),
                Segment::Timestamp => write!(line, "{}", record.timestamp.format(TIMESTAMP_FORMAT)),
                Segment::Level => write!(line, "{}", record.level),
                Segment::Logger => line.write_str(record.logger),
                Segment::Message => line.write_str(&record.message),
            };
        }
        line
    }
}

/// Represents a failure to parse a [`TemplateRenderer`] pattern.
/// Positions are byte offsets into the pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateError {
    /// A `{` was never closed.
    Unclosed { position: usize },
    /// A lone `}` that does not close a placeholder.
    UnmatchedClose { position: usize },
    /// The placeholder name is not one of the supported ones.
    UnknownPlaceholder { position: usize, name: String },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TemplateError::*;
        match self {
            Unclosed { position } => write!(f, "Unclosed '{{' at position {}", position),
            UnmatchedClose { position } => write!(f, "Unmatched '}}' at position {}", position),
            UnknownPlaceholder { position, name } => {
                write!(f, "Unknown placeholder {{{}}} at position {}", name, position)
            }
        }
    }
}

impl std::error::Error for TemplateError {}
