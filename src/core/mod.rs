// Core modules implementing validation, table storage, set algebra, queries and serialization.
pub mod cursor;
pub mod error;
pub mod format;
pub mod number;
pub mod reader;
pub mod row;
pub mod schema;
pub mod select;
pub mod set;
pub mod table;
pub mod validate;
pub mod writer;
