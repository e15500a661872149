// Error modeling shared by the validator, builder, table store, set engine and writer.
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    Io,
    Grammar,
    NotFound,
    KindMismatch,
    OutOfRange,
    Encoding,
    SizeMismatch,
    Parse,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    field: Option<String>,
    row: Option<usize>,
    path: Option<PathBuf>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            field: None,
            row: None,
            path: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn row(&self) -> Option<usize> {
        self.row
    }

    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {field})")?;
        }
        if let Some(row) = self.row {
            write!(f, " (row: {row})")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Io => 4,
        ErrorKind::Grammar => 5,
        ErrorKind::KindMismatch => 6,
        ErrorKind::OutOfRange => 7,
        ErrorKind::Encoding => 8,
        ErrorKind::SizeMismatch => 9,
        ErrorKind::Parse => 10,
    }
}

#[cfg(test)]
mod tests {
    use super::{to_exit_code, Error, ErrorKind};

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (ErrorKind::Internal, 1),
            (ErrorKind::Usage, 2),
            (ErrorKind::NotFound, 3),
            (ErrorKind::Io, 4),
            (ErrorKind::Grammar, 5),
            (ErrorKind::KindMismatch, 6),
            (ErrorKind::OutOfRange, 7),
            (ErrorKind::Encoding, 8),
            (ErrorKind::SizeMismatch, 9),
            (ErrorKind::Parse, 10),
        ];

        for (kind, code) in cases {
            assert_eq!(to_exit_code(kind), code);
        }
    }

    #[test]
    fn display_includes_context() {
        let err = Error::new(ErrorKind::KindMismatch)
            .with_message("column is not a number")
            .with_field("name")
            .with_row(3);
        assert_eq!(
            err.to_string(),
            "KindMismatch: column is not a number (field: name) (row: 3)"
        );
    }
}
