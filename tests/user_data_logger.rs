use filtered_logger::{
    log_rows, FieldSet, MessageRenderer, Output, RedactingFormatter, Row, RowFormatter,
    TemplateRenderer, UserDataLogger, LOGGER_NAME,
};
use futures::stream;
use log::{Level, LevelFilter};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// An in-memory output that can be read back after the logger has written to it.
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An output whose every write fails.
struct Closed;

impl Write for Closed {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }
}

fn logger(capture: &Capture) -> UserDataLogger {
    UserDataLogger::new(
        LOGGER_NAME,
        LevelFilter::Info,
        RedactingFormatter::new(FieldSet::default(), MessageRenderer),
        Output::Pipe(Box::new(capture.clone())),
    )
}

fn rows(rows: &[&[&str]]) -> Vec<Result<Row, io::Error>> {
    rows.iter()
        .map(|row| Ok(row.iter().map(|value| value.to_string()).collect()))
        .collect()
}

#[test]
fn writes_one_redacted_line_per_message() {
    let capture = Capture::default();
    let logger = logger(&capture);

    logger.info("name=Bob; email=bob@x.com");
    logger.info("username updated");

    assert_eq!(
        capture.contents(),
        "***=Bob; ***=bob@x.com\nuser*** updated\n"
    );
}

#[test]
fn drops_records_below_level() {
    let capture = Capture::default();
    let logger = logger(&capture);

    assert!(logger.enabled(Level::Warn));
    assert!(!logger.enabled(Level::Debug));
    logger.log(Level::Debug, "debug line");
    logger.log(Level::Warn, "warn line");

    assert_eq!(capture.contents(), "warn line\n");
}

#[test]
fn template_sees_logger_name_and_level() {
    let capture = Capture::default();
    let logger = UserDataLogger::new(
        "audit",
        LevelFilter::Info,
        RedactingFormatter::new(
            FieldSet::default(),
            TemplateRenderer::parse("{logger} {level}: {message}").unwrap(),
        ),
        Output::Pipe(Box::new(capture.clone())),
    );

    logger.info("email=***");

    assert_eq!(logger.name(), "audit");
    assert_eq!(capture.contents(), "audit INFO: ***=***\n");
}

#[tokio::test]
async fn logs_rows_in_order() {
    let capture = Capture::default();
    let logger = logger(&capture);
    let source = stream::iter(rows(&[
        &["Alice", "alice@x.com", "555-1234", "123-45-6789", "secret"],
        &["Bob", "bob@x.com"],
        &[],
    ]));

    let num_rows = log_rows(source, &RowFormatter::default(), &logger)
        .await
        .unwrap();

    assert_eq!(num_rows, 3);
    // Row formatting already masks the values, and the formatter then masks the names.
    assert_eq!(
        capture.contents(),
        "***=***; ***=***; ***=***; ***=***; ***=***\n***=***; ***=***\n\n"
    );
}

#[tokio::test]
async fn stops_at_first_source_error() {
    let capture = Capture::default();
    let logger = logger(&capture);
    let mut source = rows(&[&["Alice"], &["Bob"], &["Carol"]]);
    source[1] = Err(io::Error::new(io::ErrorKind::BrokenPipe, "lost connection"));

    let error = log_rows(stream::iter(source), &RowFormatter::default(), &logger)
        .await
        .unwrap_err();

    assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    assert_eq!(capture.contents(), "***=***\n");
}

#[tokio::test]
async fn unmasked_columns_pass_through() {
    let capture = Capture::default();
    let logger = logger(&capture);
    let formatter = RowFormatter::new(vec!["id", "email"], FieldSet::new(vec!["email"]));
    let source = stream::iter(rows(&[&["1", "a@x.com"], &["2", "b@x.com"]]));

    log_rows(source, &formatter, &logger).await.unwrap();

    assert_eq!(capture.contents(), "id=1; ***=***\nid=2; ***=***\n");
}

/// Each line is on the output as soon as the call returns.
#[test]
fn lines_are_written_without_flushing() {
    let capture = Capture::default();
    let logger = logger(&capture);

    logger.info("first");
    assert_eq!(capture.contents(), "first\n");
    logger.info("second");
    assert_eq!(capture.contents(), "first\nsecond\n");
}

/// Write errors on the output are not reported back to the caller.
#[tokio::test]
async fn output_errors_are_dropped() {
    let logger = UserDataLogger::new(
        LOGGER_NAME,
        LevelFilter::Info,
        RedactingFormatter::new(FieldSet::default(), MessageRenderer),
        Output::Pipe(Box::new(Closed)),
    );
    let source = stream::iter(rows(&[&["Alice"], &["Bob"]]));

    let num_rows = log_rows(source, &RowFormatter::default(), &logger)
        .await
        .unwrap();

    assert_eq!(num_rows, 2);
}

#[test]
fn output_debug_has_no_quotes() {
    assert_eq!(format!("{:?}", Output::Stdout), "stdout");
    assert_eq!(format!("{:?}", Output::Stderr), "stderr");
    assert_eq!(format!("{:?}", Output::Pipe(Box::new(Closed))), "pipe");
}
