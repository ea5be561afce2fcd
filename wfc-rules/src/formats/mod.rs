//! Module defining parsers for different catalog file formats.

// Export the core parser trait
pub mod parser;
pub use parser::FormatParser;

#[cfg(feature = "serde")]
pub mod document;
pub mod json_format;
pub mod ron_format;

pub use json_format::JsonFormatParser;
pub use ron_format::RonFormatParser;
