//! Purpose: Build a typed table from dialect bytes.
//! Exports: `build`, `build_with`.
//! Role: Two-phase reader: infer the schema from the first line(s), then materialize every row.
//! Invariants: Input is expected to be validated; malformed input yields an error, never a panic.
//! Invariants: Rows are appended in input order and always conform to the inferred schema.
use bstr::{BStr, ByteSlice};
use tracing::{debug, warn};

use crate::core::error::{Error, ErrorKind};
use crate::core::format::ReadOptions;
use crate::core::number::Number;
use crate::core::row::{Cell, Row};
use crate::core::schema::{Field, FieldKind, Schema};
use crate::core::table::Table;

pub fn build(bytes: &[u8], has_header: bool) -> Result<Table, Error> {
    build_with(bytes, &ReadOptions::new(has_header))
}

pub fn build_with(bytes: &[u8], options: &ReadOptions) -> Result<Table, Error> {
    let lines = logical_lines(bytes);
    let Some(first) = lines.first() else {
        return Err(Error::new(ErrorKind::Grammar).with_message("input has no lines"));
    };

    let rlen = field_count(first);
    let names: Vec<String> = if options.has_header {
        split_fields(first)
            .into_iter()
            .map(|token| unquote(token).to_str_lossy().into_owned())
            .collect()
    } else {
        (0..rlen).map(|index| format!("x{index}")).collect()
    };

    let skip = usize::from(options.has_header);
    let data: Vec<&[u8]> = lines
        .iter()
        .skip(skip)
        .enumerate()
        .filter_map(|(offset, line)| {
            if line.is_empty() {
                warn!(line = offset + skip, "skipping blank line");
                None
            } else {
                Some(line.as_slice())
            }
        })
        .collect();

    let Some(sample) = data.first() else {
        return Err(Error::new(ErrorKind::Grammar)
            .with_message("no data row to infer column kinds from")
            .with_hint("Add at least one record after the header."));
    };
    let schema = infer_schema(names, sample)?;

    let mut table = Table::new(schema);
    for (ordinal, line) in data.iter().enumerate() {
        let row = materialize(table.schema(), line).map_err(|err| err.with_row(ordinal))?;
        table.push_unchecked(row);
    }
    debug!(
        rows = table.len(),
        columns = rlen,
        has_header = options.has_header,
        "table built"
    );
    Ok(table)
}

fn infer_schema(names: Vec<String>, sample: &[u8]) -> Result<Schema, Error> {
    let tokens = split_fields(sample);
    if tokens.len() != names.len() {
        return Err(field_count_error(tokens.len(), names.len()).with_row(0));
    }
    let fields = names
        .into_iter()
        .zip(tokens)
        .map(|(name, token)| {
            let kind = if token.first() == Some(&b'"') {
                FieldKind::String
            } else {
                FieldKind::Number
            };
            Field::new(name, kind)
        })
        .collect();
    Ok(Schema::new(fields))
}

fn materialize(schema: &Schema, line: &[u8]) -> Result<Row, Error> {
    let tokens = split_fields(line);
    if tokens.len() != schema.len() {
        return Err(field_count_error(tokens.len(), schema.len()));
    }
    let mut cells = Vec::with_capacity(tokens.len());
    for (token, field) in tokens.into_iter().zip(schema.fields()) {
        let cell = match field.kind {
            FieldKind::String => Cell::String(unquote(token).to_str_lossy().into_owned()),
            FieldKind::Number => {
                let text = token.to_str().map_err(|err| {
                    Error::new(ErrorKind::Parse)
                        .with_message(format!("number field {:?} is not UTF-8", BStr::new(token)))
                        .with_source(err)
                })?;
                Cell::Number(Number::parse(text).map_err(|err| err.with_field(field.name.clone()))?)
            }
        };
        cells.push(cell);
    }
    Ok(Row::new(cells))
}

fn field_count_error(found: usize, expected: usize) -> Error {
    Error::new(ErrorKind::Grammar).with_message(format!(
        "record has {found} fields, expected {expected}"
    ))
}

// LF-delimited lines with every CR removed; a trailing LF does not start another line.
fn logical_lines(bytes: &[u8]) -> Vec<Vec<u8>> {
    let mut lines: Vec<Vec<u8>> = bytes
        .split(|byte| *byte == b'\n')
        .map(|line| line.iter().copied().filter(|byte| *byte != b'\r').collect())
        .collect();
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

fn field_count(line: &[u8]) -> usize {
    let mut in_quotes = false;
    let mut count = 1;
    for &byte in line {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => count += 1,
            _ => {}
        }
    }
    count
}

/// Splits a logical line on top-level commas; commas inside quotes do not separate fields.
pub(crate) fn split_fields(line: &[u8]) -> Vec<&[u8]> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (index, &byte) in line.iter().enumerate() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => {
                fields.push(&line[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);
    fields
}

fn unquote(token: &[u8]) -> &[u8] {
    let token = token.strip_prefix(b"\"").unwrap_or(token);
    token.strip_suffix(b"\"").unwrap_or(token)
}
