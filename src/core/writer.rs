// Serializes a table back to the dialect: quoted strings, codec numbers, one record per line.
use std::io::Write;

use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::format::WriteOptions;
use crate::core::number::MAX_DIGITS;
use crate::core::row::Cell;
use crate::core::table::Table;

/// Writes `table` to `out`.
///
/// Every cell and header name is checked before the first byte is written, so an
/// `Encoding` error leaves `out` untouched.
pub fn write_table<W: Write>(out: &mut W, table: &Table, options: &WriteOptions) -> Result<(), Error> {
    check_encodable(table, options)?;
    let eol = options.line_ending.as_bytes();

    if options.header {
        let names: Vec<String> = table
            .schema()
            .fields()
            .iter()
            .map(|field| format!("\"{}\"", field.name))
            .collect();
        out.write_all(names.join(",").as_bytes()).map_err(io_error)?;
        out.write_all(eol).map_err(io_error)?;
    }
    for row in table.rows() {
        let cells: Vec<String> = row
            .cells()
            .iter()
            .map(|cell| match cell {
                Cell::Number(value) => value.to_string(),
                Cell::String(value) => format!("\"{value}\""),
            })
            .collect();
        out.write_all(cells.join(",").as_bytes()).map_err(io_error)?;
        out.write_all(eol).map_err(io_error)?;
    }
    out.flush().map_err(io_error)?;
    debug!(rows = table.len(), header = options.header, "table written");
    Ok(())
}

pub fn to_bytes(table: &Table, options: &WriteOptions) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    write_table(&mut buf, table, options)?;
    Ok(buf)
}

fn check_encodable(table: &Table, options: &WriteOptions) -> Result<(), Error> {
    if options.header {
        if let Some(field) = table.schema().fields().iter().find(|f| !encodable(&f.name)) {
            return Err(encoding_error("field name contains a quote or line break")
                .with_field(field.name.clone()));
        }
    }
    for (ordinal, row) in table.rows().enumerate() {
        for (cell, field) in row.cells().iter().zip(table.schema().fields()) {
            let problem = match cell {
                Cell::String(value) if !encodable(value) => {
                    Some("string value contains a quote or line break")
                }
                Cell::Number(value) if !value.is_encodable() => Some("number value has too many digits"),
                _ => None,
            };
            if let Some(problem) = problem {
                return Err(encoding_error(problem)
                    .with_field(field.name.clone())
                    .with_row(ordinal));
            }
        }
    }
    Ok(())
}

fn encodable(text: &str) -> bool {
    !text.bytes().any(|byte| matches!(byte, b'"' | b'\r' | b'\n'))
}

fn encoding_error(problem: &str) -> Error {
    Error::new(ErrorKind::Encoding)
        .with_message(problem)
        .with_hint(format!(
            "Strings cannot contain '\"', CR or LF, and numbers are limited to {MAX_DIGITS} digits."
        ))
}

fn io_error(err: std::io::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("failed to write table")
        .with_source(err)
}
