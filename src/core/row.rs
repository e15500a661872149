// Typed cells and rows aligned positionally to a schema.
use crate::core::error::{Error, ErrorKind};
use crate::core::number::Number;
use crate::core::schema::{FieldKind, Schema};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Cell {
    Number(Number),
    String(String),
}

impl Cell {
    pub fn kind(&self) -> FieldKind {
        match self {
            Cell::Number(_) => FieldKind::Number,
            Cell::String(_) => FieldKind::String,
        }
    }

    pub fn zero(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Number => Cell::Number(Number::ZERO),
            FieldKind::String => Cell::String(String::new()),
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Cell::Number(value) => Some(value),
            Cell::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::String(value) => Some(value),
            Cell::Number(_) => None,
        }
    }
}

impl From<Number> for Cell {
    fn from(value: Number) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::String(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::String(value)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn blank(schema: &Schema) -> Self {
        Self {
            cells: schema
                .fields()
                .iter()
                .map(|field| Cell::zero(field.kind))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    /// Checks that the row has one cell per column and every cell matches its column kind.
    pub fn conforms_to(&self, schema: &Schema) -> Result<(), Error> {
        if self.cells.len() != schema.len() {
            return Err(Error::new(ErrorKind::OutOfRange).with_message(format!(
                "row has {} cells, schema has {} columns",
                self.cells.len(),
                schema.len()
            )));
        }
        for (cell, field) in self.cells.iter().zip(schema.fields()) {
            if cell.kind() != field.kind {
                return Err(Error::new(ErrorKind::KindMismatch)
                    .with_message(format!(
                        "{} cell in a {} column",
                        cell.kind().as_str(),
                        field.kind.as_str()
                    ))
                    .with_field(field.name.clone()));
            }
        }
        Ok(())
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Self::new(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, Row};
    use crate::core::error::ErrorKind;
    use crate::core::number::Number;
    use crate::core::schema::{Field, Schema};

    fn schema() -> Schema {
        Schema::new(vec![Field::string("name"), Field::number("age")])
    }

    #[test]
    fn blank_row_is_zero_valued() {
        let row = Row::blank(&schema());
        assert_eq!(
            row.cells(),
            &[Cell::String(String::new()), Cell::Number(Number::ZERO)]
        );
    }

    #[test]
    fn conformance_checks_length_then_kinds() {
        let schema = schema();
        let short = Row::new(vec![Cell::from("a")]);
        assert_eq!(short.conforms_to(&schema).unwrap_err().kind(), ErrorKind::OutOfRange);

        let swapped = Row::new(vec![Cell::from(Number::from(1i64)), Cell::from("a")]);
        let err = swapped.conforms_to(&schema).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KindMismatch);
        assert_eq!(err.field(), Some("name"));

        let good = Row::new(vec![Cell::from("a"), Cell::from(Number::from(1i64))]);
        good.conforms_to(&schema).expect("conforms");
    }
}
