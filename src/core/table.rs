//! Purpose: Mutable in-memory table of typed rows sharing one schema.
//! Exports: `Table`.
//! Role: Store used by the builder, query engine and writer; owns schema and rows.
//! Invariants: Every row has exactly `schema.len()` cells whose kinds match positionally.
//! Invariants: Failed mutations and accessors leave rows and cursor unchanged.
//! Invariants: Read paths (`rows`, `len`, `schema`) never move the cursor.
use crate::core::cursor::Cursor;
use crate::core::error::{Error, ErrorKind};
use crate::core::number::Number;
use crate::core::row::{Cell, Row};
use crate::core::schema::{FieldKind, FieldRef, Schema};

#[derive(Clone, Debug)]
pub struct Table {
    schema: Schema,
    rows: Vec<Row>,
    cursor: Cursor,
}

impl Table {
    /// Creates a table with zero rows and the cursor before the first row.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            cursor: Cursor::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn position(&self) -> Cursor {
        self.cursor
    }

    pub fn current(&self) -> Option<&Row> {
        self.cursor.index().and_then(|index| self.rows.get(index))
    }

    pub fn next(&mut self) -> Option<&Row> {
        let index = self.cursor.advance(self.rows.len())?;
        self.rows.get(index)
    }

    pub fn rewind(&mut self) {
        self.cursor = Cursor::BeforeFirst;
    }

    /// Appends a copy of `row`; the cursor keeps pointing at the same row.
    pub fn insert(&mut self, row: &Row) -> Result<(), Error> {
        row.conforms_to(&self.schema)?;
        self.rows.push(row.clone());
        Ok(())
    }

    /// Appends an owned row that has already been checked against the schema.
    pub(crate) fn push_unchecked(&mut self, row: Row) {
        debug_assert!(row.conforms_to(&self.schema).is_ok());
        self.rows.push(row);
    }

    /// Appends a zero-valued row and moves the cursor onto it.
    pub fn insert_blank(&mut self) {
        self.rows.push(Row::blank(&self.schema));
        self.cursor = Cursor::At(self.rows.len() - 1);
    }

    /// Removes the row at the cursor and moves the cursor to the preceding row.
    pub fn delete_current(&mut self) -> Result<Row, Error> {
        let index = self.current_index()?;
        let row = self.rows.remove(index);
        self.cursor = Cursor::after_removal(index);
        Ok(row)
    }

    pub fn get_number<'a>(&self, field: impl Into<FieldRef<'a>>) -> Result<Number, Error> {
        let column = self.schema.resolve_kind(field.into(), FieldKind::Number)?;
        match self.current_row()?.get(column) {
            Some(Cell::Number(value)) => Ok(*value),
            _ => Err(corrupt_cell(column)),
        }
    }

    pub fn get_string<'a>(&self, field: impl Into<FieldRef<'a>>) -> Result<String, Error> {
        let column = self.schema.resolve_kind(field.into(), FieldKind::String)?;
        match self.current_row()?.get(column) {
            Some(Cell::String(value)) => Ok(value.clone()),
            _ => Err(corrupt_cell(column)),
        }
    }

    pub fn set_number<'a>(
        &mut self,
        field: impl Into<FieldRef<'a>>,
        value: Number,
    ) -> Result<(), Error> {
        let column = self.schema.resolve_kind(field.into(), FieldKind::Number)?;
        self.replace_cell(column, Cell::Number(value))
    }

    pub fn set_string<'a>(
        &mut self,
        field: impl Into<FieldRef<'a>>,
        value: impl Into<String>,
    ) -> Result<(), Error> {
        let column = self.schema.resolve_kind(field.into(), FieldKind::String)?;
        self.replace_cell(column, Cell::String(value.into()))
    }

    fn replace_cell(&mut self, column: usize, value: Cell) -> Result<(), Error> {
        let index = self.current_index()?;
        let cell = self.rows[index]
            .cell_mut(column)
            .ok_or_else(|| corrupt_cell(column))?;
        *cell = value;
        Ok(())
    }

    fn current_index(&self) -> Result<usize, Error> {
        self.cursor.index().ok_or_else(no_current_row)
    }

    fn current_row(&self) -> Result<&Row, Error> {
        self.current().ok_or_else(no_current_row)
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.rows == other.rows
    }
}

fn no_current_row() -> Error {
    Error::new(ErrorKind::Usage)
        .with_message("cursor is before the first row")
        .with_hint("Call next() or insert_blank() before reading or writing fields.")
}

fn corrupt_cell(column: usize) -> Error {
    Error::new(ErrorKind::Internal).with_message(format!("row cell {column} does not match schema"))
}
