use chrono::{Local, TimeZone};
use filtered_logger::{
    FieldSet, LogRecord, MessageRenderer, RedactingFormatter, Render, TemplateRenderer,
};

fn record(message: &str) -> LogRecord<'static> {
    LogRecord {
        message: message.to_owned(),
        level: log::Level::Info,
        logger: "user_data",
        timestamp: Local.with_ymd_and_hms(2019, 11, 19, 18, 24, 25).unwrap(),
    }
}

fn formatter() -> RedactingFormatter<MessageRenderer> {
    RedactingFormatter::new(FieldSet::default(), MessageRenderer)
}

#[test]
fn masks_field_names_in_message() {
    assert_eq!(
        formatter().format(&record("name=Bob; email=bob@x.com")),
        "***=Bob; ***=bob@x.com"
    );
}

/// The replacement is a plain substring match and also hits words that merely
/// contain a field name.
#[test]
fn masks_field_names_inside_other_words() {
    assert_eq!(
        formatter().format(&record("username updated")),
        "user*** updated"
    );
    assert_eq!(
        formatter().format(&record("passwords and telephones")),
        "***s and tele***s"
    );
}

#[test]
fn text_without_field_names_is_untouched() {
    assert_eq!(formatter().format(&record("nothing to see")), "nothing to see");
}

#[test]
fn redaction_is_idempotent() {
    let formatter = formatter();
    let once = formatter.redact("name=***; email=***; my username and ssn");
    let twice = formatter.redact(once.clone());
    assert_eq!(once, twice);
    assert_eq!(once, "***=***; ***=***; my user*** and ***");
}

#[test]
fn redacts_after_rendering_metadata() {
    let renderer = TemplateRenderer::parse("[{logger}] {level} {timestamp}: {message}").unwrap();
    let formatter = RedactingFormatter::new(FieldSet::new(vec!["user", "name"]), renderer);
    assert_eq!(
        formatter.format(&record("name=***")),
        "[***_data] INFO 2019-11-19 18:24:25,000: ***=***"
    );
}

#[test]
fn empty_field_set_changes_nothing() {
    let formatter = RedactingFormatter::new(FieldSet::new(Vec::<String>::new()), MessageRenderer);
    assert_eq!(formatter.format(&record("name=Bob")), "name=Bob");
}

struct Upper;

impl Render for Upper {
    fn render(&self, record: &LogRecord<'_>) -> String {
        record.message.to_uppercase()
    }
}

/// Matching happens against the rendered text, not the original message.
#[test]
fn uses_the_wrapped_renderer() {
    let formatter = RedactingFormatter::new(FieldSet::default(), Upper);
    assert_eq!(formatter.format(&record("name=Bob")), "NAME=BOB");

    let formatter = RedactingFormatter::new(
        FieldSet::default(),
        Box::new(MessageRenderer) as Box<dyn Render>,
    );
    assert_eq!(formatter.format(&record("name=Bob")), "***=Bob");
}
