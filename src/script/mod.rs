//! SQL script handling for duckpad.
//!
//! This module isolates the statement splitter from execution so it can be
//! tested as a pure function.

mod splitter;

pub use splitter::{split_statements, Statement};
