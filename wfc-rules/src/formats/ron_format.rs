use crate::formats::FormatParser;
#[cfg(feature = "serde")]
use crate::formats::document::CatalogDocument;
use crate::{LoadError, TileCatalog};

/// A parser implementation for RON (Rusty Object Notation) catalog files.
#[derive(Debug, Default, Clone, Copy)]
pub struct RonFormatParser;

impl RonFormatParser {
    /// Creates a new RON format parser
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for RonFormatParser {
    fn format_name(&self) -> &'static str {
        "Rusty Object Notation (RON)"
    }

    #[cfg(feature = "serde")]
    fn parse(&self, ron_content: &str) -> Result<TileCatalog, LoadError> {
        let document: CatalogDocument = ron::from_str(ron_content)
            .map_err(|e| LoadError::ParseError(format!("RON deserialization failed: {e}")))?;
        document.into_catalog()
    }

    /// Stub implementation when the `serde` feature is not enabled.
    #[cfg(not(feature = "serde"))]
    fn parse(&self, _ron_content: &str) -> Result<TileCatalog, LoadError> {
        Err(LoadError::FeatureNotEnabled(
            "serde (required for RON parsing)".to_string(),
        ))
    }
}

/// Parses a tile catalog defined in a RON string.
pub fn parse_ron_catalog(ron_content: &str) -> Result<TileCatalog, LoadError> {
    RonFormatParser::new().parse(ron_content)
}
