use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::domain::image::{MediaType, UploadedImage};

/// Read an image from disk as if it had been uploaded.
/// The media type is declared from the file extension.
pub fn read_image_file(path: &Path) -> Result<UploadedImage> {
    let bytes = fs::read(path)
        .with_context(|| format!("Cannot read image file '{}'", path.display()))?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    let declared = MediaType::from_extension(&file_name).map(|m| m.mime().to_string());

    tracing::debug!("Read image file '{}' ({} bytes)", path.display(), bytes.len());
    Ok(UploadedImage::new(file_name, declared, bytes))
}
