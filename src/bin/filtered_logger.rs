use err_context::{BoxedErrorExt as _, ResultExt as _};
use filtered_logger::db::{self, DbConfig};
use filtered_logger::{
    log_rows, FieldSet, MessageRenderer, Output, RedactingFormatter, Render, RowFormatter,
    TemplateRenderer, UserDataLogger, LOGGER_NAME,
};
use log::LevelFilter;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "filtered_logger",
    about = "Log every row of the users table with personal data masked"
)]
struct Options {
    #[structopt(flatten)]
    db: DbConfig,

    /// Comma separated list of sensitive field names.
    /// Defaults to name,email,phone,ssn,password.
    #[structopt(long = "fields")]
    fields: Option<FieldSet>,

    /// Layout of each output line, using the placeholders {timestamp}, {level}, {logger}
    /// and {message}. If not given, only the message is written.
    #[structopt(long = "format")]
    format: Option<TemplateRenderer>,

    /// Where to write the masked rows.
    #[structopt(
        long = "output",
        default_value = "stdout",
        possible_values = &["stdout", "stderr"]
    )]
    output: Output,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    let options = Options::from_args();
    if let Err(error) = run(options).await {
        log::error!("Error: {}", error.display("\nCaused by: "));
        std::process::exit(1);
    }
}

async fn run(options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let Options {
        db: db_config,
        fields,
        format,
        output,
    } = options;
    let fields = fields.unwrap_or_default();
    log::debug!("Masking fields {}", fields);

    let renderer: Box<dyn Render> = match format {
        Some(template) => Box::new(template),
        None => Box::new(MessageRenderer),
    };
    let logger = UserDataLogger::new(
        LOGGER_NAME,
        LevelFilter::Info,
        RedactingFormatter::new(fields.clone(), renderer),
        output,
    );
    let row_formatter = RowFormatter::masking_all(fields);

    let mut connection = db::get_db(&db_config).await.with_context(|_| {
        format!(
            "Failed to open database {} on {}:{}",
            db_config.database, db_config.host, db_config.port
        )
    })?;

    let result = log_rows(
        db::fetch_rows(&mut connection, db::USERS_QUERY),
        &row_formatter,
        &logger,
    )
    .await;
    // The connection is closed whether or not all rows made it through.
    let close_result = db::close(connection).await;
    if let (Err(_), Err(error)) = (&result, &close_result) {
        log::warn!("{}", error);
    }

    let num_rows = result.context("Failed while logging users")?;
    close_result?;
    log::info!("Logged {} users", num_rows);
    Ok(())
}
