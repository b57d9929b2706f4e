use crate::types::AppError;

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use image::{ImageFormat, RgbaImage};
use tempfile::Builder;

/// Multiplies a channel by `factor` and truncates toward zero.
pub fn scale_channel(value: u8, factor: f64) -> u8 {
    (value as f64 * factor) as u8
}

/// Format to write `path` back in: the extension wins, then whatever the
/// decoder sniffed from the content, then PNG.
pub fn output_format(path: &Path, detected: Option<ImageFormat>) -> ImageFormat {
    ImageFormat::from_path(path)
        .ok()
        .or(detected)
        .unwrap_or(ImageFormat::Png)
}

/// Encodes `img` and atomically replaces the file at `path` with it.
///
/// The encoded bytes go to a temp file next to `path` which is renamed over
/// the original only once it is fully written. The original permissions are
/// carried over when the file already exists. Symlinks are followed so the
/// file they point at is the one replaced.
pub fn save_atomically(img: &RgbaImage, path: &Path, format: ImageFormat) -> Result<(), AppError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)
        .map_err(|source| AppError::Encode {
            path: path.to_path_buf(),
            source,
        })?;

    let io_err = |source: std::io::Error| AppError::Io {
        path: path.to_path_buf(),
        source,
    };

    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = Builder::new()
        .prefix(".icon-recolor-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_err)?;
    tmp.write_all(buf.get_ref()).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;

    if let Ok(metadata) = fs::metadata(&target) {
        tmp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(io_err)?;
    }

    tmp.persist(&target).map_err(|e| io_err(e.error))?;
    Ok(())
}
