//! Purpose: Define the public Rust API boundary for csvtab.
//! Exports: Core types and operations needed by the CLI and library users.
//! Role: Public, additive-only surface over the core modules.
//! Invariants: Callers should reach table, set and query types through this module.

mod validation;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::cursor::Cursor;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::format::{LineEnding, ReadOptions, WriteOptions};
pub use crate::core::number::Number;
pub use crate::core::reader::{build, build_with};
pub use crate::core::row::{Cell, Row};
pub use crate::core::schema::{Field, FieldKind, FieldRef, Schema};
pub use crate::core::select::{Operator, Partition, partition, select_records, select_subset};
pub use crate::core::set::RowSet;
pub use crate::core::table::Table;
pub use crate::core::validate::validate;
pub use crate::core::writer::{to_bytes, write_table};
pub use validation::{ValidationReport, ValidationStatus, validate_report};
