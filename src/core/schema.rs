//! Purpose: Column descriptors and field resolution for tables.
//! Exports: `FieldKind`, `Field`, `Schema`, `FieldRef`.
//! Role: Fixed column layout shared by every row of a table.
//! Invariants: Position is a column's identity; names may repeat and resolve to the first match.
use serde::Serialize;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Number,
    String,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Number => "number",
            FieldKind::String => "string",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }
}

/// Column selector accepted by the table accessors: a field name or a position.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldRef<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for FieldRef<'a> {
    fn from(name: &'a str) -> Self {
        FieldRef::Name(name)
    }
}

impl<'a> From<&'a String> for FieldRef<'a> {
    fn from(name: &'a String) -> Self {
        FieldRef::Name(name.as_str())
    }
}

impl From<usize> for FieldRef<'_> {
    fn from(index: usize) -> Self {
        FieldRef::Index(index)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn resolve(&self, field: FieldRef<'_>) -> Result<usize, Error> {
        match field {
            FieldRef::Name(name) => self.position(name).ok_or_else(|| {
                Error::new(ErrorKind::NotFound)
                    .with_message("no column with that name")
                    .with_field(name)
            }),
            FieldRef::Index(index) if index < self.fields.len() => Ok(index),
            FieldRef::Index(index) => Err(Error::new(ErrorKind::OutOfRange).with_message(format!(
                "column index {index} outside [0, {})",
                self.fields.len()
            ))),
        }
    }

    /// Resolves `field` and checks that the column holds `kind`.
    pub fn resolve_kind(&self, field: FieldRef<'_>, kind: FieldKind) -> Result<usize, Error> {
        let index = self.resolve(field)?;
        let column = &self.fields[index];
        if column.kind != kind {
            return Err(Error::new(ErrorKind::KindMismatch)
                .with_message(format!(
                    "column is a {} column, not a {} column",
                    column.kind.as_str(),
                    kind.as_str()
                ))
                .with_field(column.name.clone()));
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::{Field, FieldKind, FieldRef, Schema};
    use crate::core::error::ErrorKind;

    fn schema() -> Schema {
        Schema::new(vec![
            Field::string("name"),
            Field::number("age"),
            Field::number("name"),
        ])
    }

    #[test]
    fn duplicate_names_resolve_to_first_match() {
        assert_eq!(schema().resolve(FieldRef::from("name")).expect("name"), 0);
    }

    #[test]
    fn resolve_reports_distinct_failures() {
        let schema = schema();
        assert_eq!(
            schema.resolve("missing".into()).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            schema.resolve(FieldRef::Index(3)).unwrap_err().kind(),
            ErrorKind::OutOfRange
        );
        assert_eq!(
            schema
                .resolve_kind("name".into(), FieldKind::Number)
                .unwrap_err()
                .kind(),
            ErrorKind::KindMismatch
        );
        assert_eq!(schema.resolve_kind(FieldRef::Index(2), FieldKind::Number).expect("ok"), 2);
    }

    #[test]
    fn schema_serializes_as_field_list() {
        let json = serde_json::to_value(Schema::new(vec![Field::number("age")])).expect("json");
        assert_eq!(json, serde_json::json!([{"name": "age", "kind": "number"}]));
    }
}
