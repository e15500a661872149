//! Purpose: Library crate behind the `csvtab` CLI: a typed, quoted-CSV table toolkit.
//! Exports: `api` (stable surface), `core` (validator, builder, table, sets, queries, writer).
//! Role: Validate dialect text, build typed tables, select and partition rows, write them back.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
//! Invariants: Library code logs through `tracing` only; subscribers are installed by binaries.
pub mod api;
pub mod core;
