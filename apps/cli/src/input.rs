//! # Line Item Input
//!
//! Reads already-flattened invoice lines from JSON. Invoice document
//! parsing happens upstream; this file format is what it hands over.
//!
//! Both a bare array and an object with an `items` array are accepted:
//! ```json
//! [{ "code": "7891", "name": "Arroz", "acquisitionCost": 10.0, "commercialQuantity": 5 }]
//! { "items": [ ... ] }
//! ```

use precifica_core::validation::{validate_item_count, validate_line_item};
use precifica_core::LineItem;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::error::{CliError, CliResult};

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemsFile {
    List(Vec<LineItem>),
    Wrapped { items: Vec<LineItem> },
}

/// Loads and validates the line items in `path`.
pub fn load_items(path: &Path) -> CliResult<Vec<LineItem>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| CliError::InputLoadFailed(format!("{}: {}", path.display(), e)))?;
    let items = parse_items(&contents)?;
    info!(path = %path.display(), count = items.len(), "Loaded line items");
    Ok(items)
}

/// Parses and validates a JSON document of line items.
pub fn parse_items(contents: &str) -> CliResult<Vec<LineItem>> {
    let file: ItemsFile = serde_json::from_str(contents)
        .map_err(|e| CliError::InputLoadFailed(e.to_string()))?;
    let items = match file {
        ItemsFile::List(items) | ItemsFile::Wrapped { items } => items,
    };

    validate_item_count(items.len())?;
    for (index, item) in items.iter().enumerate() {
        validate_line_item(item).map_err(|e| {
            CliError::InputLoadFailed(format!("item {} ({}): {}", index + 1, item.code, e))
        })?;
    }

    Ok(items)
}
