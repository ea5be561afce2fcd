use crate::formats::FormatParser;
#[cfg(feature = "serde")]
use crate::formats::document::CatalogDocument;
use crate::{LoadError, TileCatalog};

/// A parser implementation for JSON catalog files. Same document shape as RON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatParser;

impl JsonFormatParser {
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for JsonFormatParser {
    fn format_name(&self) -> &'static str {
        "JSON"
    }

    #[cfg(feature = "serde")]
    fn parse(&self, json_content: &str) -> Result<TileCatalog, LoadError> {
        let document: CatalogDocument = serde_json::from_str(json_content)
            .map_err(|e| LoadError::ParseError(format!("JSON deserialization failed: {e}")))?;
        document.into_catalog()
    }

    #[cfg(not(feature = "serde"))]
    fn parse(&self, _json_content: &str) -> Result<TileCatalog, LoadError> {
        Err(LoadError::FeatureNotEnabled(
            "serde (required for JSON parsing)".to_string(),
        ))
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use crate::Direction;

    #[test]
    fn test_parse_json() {
        let content = r#"{
            "topology": "Hexagon2d",
            "tiles": [
                { "name": "a", "weight": 2 },
                { "name": "b", "enabled": false }
            ],
            "connections": [["a", "b", ["hex_right_up", "up"]]]
        }"#;
        let catalog = JsonFormatParser::new().parse(content).expect("valid catalog");
        let a = catalog.tile_id("a").unwrap();
        let b = catalog.tile_id("b").unwrap();
        assert!(!catalog.tile(b).unwrap().enabled);
        assert!(catalog.allows(a, b, Direction::HexRightUp));
        assert!(catalog.allows(b, a, Direction::HexLeftDown));
        assert!(catalog.allows(b, a, Direction::Down));
    }
}
