//! Bulk input enumeration: text files and image folders

use crate::error::ExtractError;
use std::fs;
use std::path::{Path, PathBuf};

/// Image file extensions accepted in bulk image mode
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

/// Read a bulk text file into individual items
///
/// `.txt` files are split on the given delimiter; `.csv` files yield one
/// item per row with cells joined by spaces. Blank items are dropped.
pub fn read_bulk_text(path: &Path, delimiter: &str) -> Result<Vec<String>, ExtractError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" => {
            let contents = fs::read_to_string(path)?;
            Ok(contents
                .split(delimiter)
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect())
        }
        "csv" => {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_path(path)?;

            let mut items = Vec::new();
            for row in reader.records() {
                let row = row?;
                let text = row.iter().collect::<Vec<_>>().join(" ");
                if !text.trim().is_empty() {
                    items.push(text.trim().to_string());
                }
            }
            Ok(items)
        }
        _ => Err(ExtractError::UnsupportedBulkFile(
            path.display().to_string(),
        )),
    }
}

/// List image files in a folder, sorted by file name
///
/// Sorting makes bulk runs reproducible; directory iteration order is
/// platform-dependent.
pub fn list_images(folder: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let mut images: Vec<PathBuf> = fs::read_dir(folder)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();

    images.sort();
    Ok(images)
}
