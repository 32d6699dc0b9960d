//! Output formatting (human and JSON)

pub mod console;
pub mod formatter;
pub mod json;
