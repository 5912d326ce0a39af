//! EXIF side-car files.
//!
//! Camera data is not read from the image itself. Instead a photographer can
//! drop a flat JSON object next to an image with the same stem:
//!
//! ```text
//! public/albums/weddings/
//! ├── 001-first-look.jpg
//! └── 001-first-look.json   {"camera": "X-T5", "lens": "56mm f/1.2", "iso": 400}
//! ```
//!
//! A missing side-car is the normal case and yields `None`. A side-car that
//! exists but cannot be read or parsed is logged and also yields `None`, so
//! one bad file never stops a collection from loading.

use crate::types::ExifRecord;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Path of the side-car for an image: same stem, `.json` extension.
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("json")
}

/// Read the EXIF side-car for an image, if one exists and is well-formed.
pub fn read_exif_companion(image_path: &Path) -> Option<ExifRecord> {
    let path = sidecar_path(image_path);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return None,
        Err(err) => {
            warn!(image = %image_path.display(), error = %err, "failed to read EXIF side-car");
            return None;
        }
    };

    match serde_json::from_str::<ExifRecord>(&raw) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!(image = %image_path.display(), error = %err, "failed to parse EXIF side-car");
            None
        }
    }
}
