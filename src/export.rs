use crate::logging::UserDataLogger;
use crate::row::{Row, RowFormatter};
use futures::{pin_mut, Stream, TryStreamExt};

/// Pulls rows from `rows` one at a time, formats each with `formatter` and logs it at INFO
/// level with `logger`. A row is written before the next one is requested, so the output
/// order is the input order.
///
/// Returns the number of rows handed to `logger`. Stops at the first error from `rows` and
/// returns it; rows that came before the error have already been written.
pub async fn log_rows<S, E>(
    rows: S,
    formatter: &RowFormatter,
    logger: &UserDataLogger,
) -> Result<usize, E>
where
    S: Stream<Item = Result<Row, E>>,
{
    pin_mut!(rows);
    let mut num_rows = 0;
    let result = loop {
        match rows.try_next().await {
            Ok(Some(row)) => {
                logger.info(&formatter.format(&row));
                num_rows += 1;
            }
            Ok(None) => break Ok(num_rows),
            Err(error) => break Err(error),
        }
    };
    log::debug!("Logged {} rows", num_rows);
    result
}
