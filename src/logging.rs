use crate::redact::RedactingFormatter;
use crate::render::{LogRecord, Render};
use env_logger::{Target, WriteStyle};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fmt;
use std::io::{self, Write};

/// Name of the logger the user rows are written under.
pub const LOGGER_NAME: &str = "user_data";

/// Where a [`UserDataLogger`] writes its lines.
pub enum Output {
    Stdout,
    Stderr,
    /// Any writer, for example a file or an in-memory buffer.
    Pipe(Box<dyn Write + Send + 'static>),
}

impl Output {
    fn into_target(self) -> Target {
        match self {
            Output::Stdout => Target::Stdout,
            Output::Stderr => Target::Stderr,
            Output::Pipe(pipe) => Target::Pipe(pipe),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Output::Stdout
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout => f.write_str("stdout"),
            Output::Stderr => f.write_str("stderr"),
            Output::Pipe(_) => f.write_str("pipe"),
        }
    }
}

impl std::str::FromStr for Output {
    type Err = io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(Output::Stdout),
            "stderr" => Ok(Output::Stderr),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid output '{}', expected 'stdout' or 'stderr'", s),
            )),
        }
    }
}

/// A logger writing redacted lines to a single output.
///
/// This is not installed as the global `log` logger. It is created explicitly and handed to
/// whatever code emits user data, and it lives only as long as its owner keeps it.
pub struct UserDataLogger {
    name: String,
    inner: env_logger::Logger,
}

impl UserDataLogger {
    /// Creates a logger called `name` that drops records below `level`, formats the rest
    /// with `formatter` and writes one line per record to `output`.
    pub fn new<R>(
        name: impl Into<String>,
        level: LevelFilter,
        formatter: RedactingFormatter<R>,
        output: Output,
    ) -> Self
    where
        R: Render + 'static,
    {
        let mut builder = env_logger::Builder::new();
        builder
            .filter_level(level)
            .write_style(WriteStyle::Never)
            .target(output.into_target())
            .format(move |buf, record| {
                let line = formatter.format(&LogRecord::from_log(record));
                writeln!(buf, "{}", line)
            });
        Self {
            name: name.into(),
            inner: builder.build(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if a record at `level` would be written.
    pub fn enabled(&self, level: Level) -> bool {
        self.inner
            .enabled(&Metadata::builder().level(level).target(&self.name).build())
    }

    /// Writes `message` at `level`. The line goes to the output as part of this call, nothing
    /// is buffered in between. Write errors are dropped by `env_logger` and not reported.
    pub fn log(&self, level: Level, message: &str) {
        self.inner.log(
            &Record::builder()
                .args(format_args!("{}", message))
                .level(level)
                .target(&self.name)
                .build(),
        );
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message)
    }
}

impl fmt::Debug for UserDataLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserDataLogger")
            .field("name", &self.name)
            .field("level", &self.inner.filter())
            .finish()
    }
}
