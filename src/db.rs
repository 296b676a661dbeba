//! Reading the `users` table from MySQL.

use crate::fields::Masked;
use crate::row::Row;
use futures::{Stream, StreamExt};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{ConnectOptions, Connection, Row as _, TypeInfo, ValueRef};
use std::fmt;
use structopt::StructOpt;

/// Selects every row of the users table, in whatever order the server returns them.
pub const USERS_QUERY: &str = "SELECT * FROM users;";

/// Text used for SQL NULL values.
const NULL_TEXT: &str = "None";

/// Connection parameters for the MySQL server holding the users table.
/// Every option falls back to an environment variable.
#[derive(Clone, StructOpt)]
pub struct DbConfig {
    /// Host name or IP of the MySQL server.
    #[structopt(
        long = "db-host",
        env = "PERSONAL_DATA_DB_HOST",
        default_value = "localhost"
    )]
    pub host: String,

    /// TCP port of the MySQL server.
    #[structopt(long = "db-port", env = "PERSONAL_DATA_DB_PORT", default_value = "3306")]
    pub port: u16,

    /// User to log in as.
    #[structopt(long = "db-user", env = "PERSONAL_DATA_DB_USERNAME", default_value = "root")]
    pub user: String,

    /// Password of the database user. Empty means no password.
    #[structopt(
        long = "db-password",
        env = "PERSONAL_DATA_DB_PASSWORD",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub password: String,

    /// Name of the database containing the users table.
    #[structopt(long = "db-name", env = "PERSONAL_DATA_DB_NAME")]
    pub database: String,
}

impl DbConfig {
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);
        let options = if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        };
        // Statements are logged with their SQL text at INFO by default. Keep them out of
        // the normal diagnostic output.
        options.log_statements(log::LevelFilter::Debug)
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &Masked(&self.password))
            .field("database", &self.database)
            .finish()
    }
}

/// Failure to read rows from the database.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to connect or log in to the server.
    Connect(sqlx::Error),
    /// The query failed or the result stream broke off.
    Query(sqlx::Error),
    /// A column of a returned row could not be read.
    Decode(sqlx::Error),
    /// Failed to cleanly close the connection.
    Close(sqlx::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;
        match self {
            Connect(_) => "Failed to connect to the database",
            Query(_) => "Failed to query the users table",
            Decode(_) => "Failed to read a column value",
            Close(_) => "Failed to close the database connection",
        }
        .fmt(f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use Error::*;
        match self {
            Connect(e) | Query(e) | Decode(e) | Close(e) => Some(e),
        }
    }
}

/// Opens a connection to the server described by `config`.
pub async fn get_db(config: &DbConfig) -> Result<MySqlConnection, Error> {
    log::debug!("Connecting with {:?}", config);
    let connection = MySqlConnection::connect_with(&config.connect_options())
        .await
        .map_err(Error::Connect)?;
    log::info!(
        "Connected to {}:{}/{}",
        config.host,
        config.port,
        config.database
    );
    Ok(connection)
}

/// Closes `connection`, waiting for the server to acknowledge.
pub async fn close(connection: MySqlConnection) -> Result<(), Error> {
    connection.close().await.map_err(Error::Close)
}

/// Runs `query` and streams the resulting rows with every column rendered as text.
///
/// The stream borrows the connection, so the connection stays open for as long as the
/// stream is alive and cannot be closed before it is dropped.
pub fn fetch_rows<'c>(
    connection: &'c mut MySqlConnection,
    query: &'c str,
) -> impl Stream<Item = Result<Row, Error>> + 'c {
    log::debug!("Executing {}", query);
    sqlx::query(query).fetch(connection).map(|result| {
        let row = result.map_err(Error::Query)?;
        row_values(&row).map_err(Error::Decode)
    })
}

fn row_values(row: &MySqlRow) -> Result<Row, sqlx::Error> {
    (0..row.len()).map(|index| column_text(row, index)).collect()
}

/// How a column value is turned into text, picked from the SQL type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Signed,
    Unsigned,
    Float,
    Double,
    /// Sent as a string of bits, rendered as the unsigned integer they spell.
    Bit,
    DateTime,
    Date,
    Time,
    /// Raw bytes, rendered as UTF-8 with invalid sequences replaced.
    Binary,
    /// Anything the server sends as text, including DECIMAL.
    Text,
    /// Types without a meaningful text rendering.
    Other,
}

fn column_kind(type_name: &str) -> ColumnKind {
    if type_name.ends_with(" UNSIGNED") {
        return ColumnKind::Unsigned;
    }
    match type_name {
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            ColumnKind::Signed
        }
        "FLOAT" => ColumnKind::Float,
        "DOUBLE" => ColumnKind::Double,
        "BIT" => ColumnKind::Bit,
        "DATETIME" | "TIMESTAMP" => ColumnKind::DateTime,
        "DATE" => ColumnKind::Date,
        "TIME" => ColumnKind::Time,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            ColumnKind::Binary
        }
        "GEOMETRY" => ColumnKind::Other,
        _ => ColumnKind::Text,
    }
}

/// The value of a BIT column, most significant byte first.
fn bit_value(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |value, byte| (value << 8) | u64::from(*byte))
}

fn lossy_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Renders the value at `index` as text, whatever its SQL type.
/// Values that can not be rendered come out as their type name in angle brackets.
fn column_text(row: &MySqlRow, index: usize) -> Result<String, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(NULL_TEXT.to_owned());
    }
    let type_name = raw.type_info().name().to_owned();

    // The decoder is picked from the type name, so the compatibility check of `try_get`
    // is skipped.
    let text = match column_kind(&type_name) {
        ColumnKind::Signed => row.try_get_unchecked::<i64, _>(index).map(|v| v.to_string()),
        ColumnKind::Unsigned => row.try_get_unchecked::<u64, _>(index).map(|v| v.to_string()),
        ColumnKind::Float => row.try_get_unchecked::<f32, _>(index).map(|v| v.to_string()),
        ColumnKind::Double => row.try_get_unchecked::<f64, _>(index).map(|v| v.to_string()),
        ColumnKind::Bit => row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .map(|v| bit_value(&v).to_string()),
        ColumnKind::DateTime => row
            .try_get_unchecked::<chrono::NaiveDateTime, _>(index)
            .map(|v| v.to_string()),
        ColumnKind::Date => row
            .try_get_unchecked::<chrono::NaiveDate, _>(index)
            .map(|v| v.to_string()),
        ColumnKind::Time => row
            .try_get_unchecked::<chrono::NaiveTime, _>(index)
            .map(|v| v.to_string()),
        ColumnKind::Binary | ColumnKind::Text => row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .map(|v| lossy_text(&v)),
        ColumnKind::Other => return Ok(format!("<{}>", type_name)),
    };
    Ok(text.unwrap_or_else(|error| {
        log::debug!(
            "Failed to render column {} of type {}: {}",
            index,
            type_name,
            error
        );
        format!("<{}>", type_name)
    }))
}
