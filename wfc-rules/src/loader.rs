use crate::formats::{FormatParser, JsonFormatParser, RonFormatParser};
use crate::{LoadError, TileCatalog};
use std::path::Path;

/// Loads a tile catalog from a file, choosing the format by extension.
///
/// # Arguments
///
/// * `path` - The path to the catalog file (`.ron` or `.json`).
///
/// # Returns
///
/// A `Result` containing the loaded `TileCatalog` on success,
/// or a `LoadError` on failure.
///
/// # Errors
///
/// * `LoadError::UnsupportedFormat` for any other extension.
/// * `LoadError::Io` if the file cannot be read.
/// * `LoadError::ParseError` / `LoadError::InvalidData` from the parser.
pub fn load_from_file(path: &Path) -> Result<TileCatalog, LoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let parser: &dyn FormatParser = match extension.as_str() {
        "ron" => &RonFormatParser,
        "json" => &JsonFormatParser,
        _ => return Err(LoadError::UnsupportedFormat(path.display().to_string())),
    };

    let content = std::fs::read_to_string(path)?;
    log::debug!(
        "Parsing {} as {}",
        path.display(),
        parser.format_name()
    );
    let catalog = parser.parse(&content)?;
    log::info!(
        "Loaded {} tiles ({}) from {}",
        catalog.len(),
        catalog.topology(),
        path.display()
    );
    Ok(catalog)
}
