use crate::{LoadError, TileCatalog};

/// Trait defining the interface for format-specific catalog parsers.
///
/// Implementors of this trait can read a tile catalog from different file
/// formats (e.g., RON, JSON).
pub trait FormatParser {
    /// Parses file content into a `TileCatalog`.
    ///
    /// # Arguments
    ///
    /// * `content` - A string slice containing the catalog file content
    ///
    /// # Returns
    ///
    /// * `Ok(TileCatalog)` - Successfully parsed catalog
    /// * `Err(LoadError)` - Error encountered during parsing
    fn parse(&self, content: &str) -> Result<TileCatalog, LoadError>;

    /// Returns a descriptive name for this parser format.
    ///
    /// This can be used for debugging, logging, or user-facing error messages.
    fn format_name(&self) -> &'static str;
}
