//! Shared test utilities for the darkroom test suite.
//!
//! Provides synthetic image headers (just enough bytes for the dimension
//! probe), fixture directory builders, and extractors over scan results.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let dir = collection_dir(tmp.path(), GalleryKind::Albums, "weddings");
//! write_file(&dir, "001.png", &png_header(800, 600));
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::types::{GalleryCollection, GalleryKind, GallerySummary};

// =========================================================================
// Synthetic headers
// =========================================================================

/// PNG signature followed by an IHDR chunk declaring `width`×`height`.
pub fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[8, 2, 0, 0, 0]);
    bytes.extend_from_slice(&[0, 0, 0, 0]); // CRC, unchecked
    bytes
}

/// SOI, a JFIF APP0 segment, one SOF segment of the given marker, SOS, EOI.
///
/// Layout: APP0 at 2..20, SOF at 20..39.
pub fn jpeg_with_sof(marker: u8, width: u16, height: u16) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8];
    bytes.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    bytes.extend_from_slice(b"JFIF\0");
    bytes.extend_from_slice(&[1, 1, 0, 0, 1, 0, 1, 0, 0]);

    bytes.extend_from_slice(&[0xFF, marker, 0x00, 0x11, 0x08]);
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&[3, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1]);

    bytes.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 1, 1, 0, 0, 0x3F, 0]);
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

fn riff(chunk: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut bytes = b"RIFF".to_vec();
    bytes.extend_from_slice(&((payload.len() + 12) as u32).to_le_bytes());
    bytes.extend_from_slice(b"WEBP");
    bytes.extend_from_slice(chunk);
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

/// Lossy WebP: frame tag, start code, 14-bit width and height.
pub fn webp_vp8(width: u16, height: u16) -> Vec<u8> {
    let mut payload = vec![0x30, 0x01, 0x00, 0x9D, 0x01, 0x2A];
    payload.extend_from_slice(&width.to_le_bytes());
    payload.extend_from_slice(&height.to_le_bytes());
    payload.extend_from_slice(&[0; 8]);
    riff(b"VP8 ", &payload)
}

/// Lossless WebP: signature byte then packed 14-bit `width-1`/`height-1`.
pub fn webp_vp8l(width: u32, height: u32) -> Vec<u8> {
    let bits = (width - 1) | ((height - 1) << 14);
    let mut payload = vec![0x2F];
    payload.extend_from_slice(&bits.to_le_bytes());
    payload.extend_from_slice(&[0; 8]);
    riff(b"VP8L", &payload)
}

/// Extended WebP: flags, then 24-bit `width-1` and `height-1`.
pub fn webp_vp8x(width: u32, height: u32) -> Vec<u8> {
    let mut payload = vec![0; 4];
    payload.extend_from_slice(&(width - 1).to_le_bytes()[..3]);
    payload.extend_from_slice(&(height - 1).to_le_bytes()[..3]);
    payload.extend_from_slice(&[0; 8]);
    riff(b"VP8X", &payload)
}

// =========================================================================
// Fixture directories
// =========================================================================

/// Create `{root}/{kind}/{slug}/` and return its path.
pub fn collection_dir(root: &Path, kind: GalleryKind, slug: &str) -> PathBuf {
    let dir = root.join(kind.as_str()).join(slug);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Set a directory's modification time. Call after its last write.
pub fn set_mtime(path: &Path, time: SystemTime) {
    File::open(path).unwrap().set_modified(time).unwrap();
}

// =========================================================================
// Extractors
// =========================================================================

pub fn image_srcs(collection: &GalleryCollection) -> Vec<&str> {
    collection.images.iter().map(|i| i.src.as_str()).collect()
}

pub fn collection_slugs(collections: &[GalleryCollection]) -> Vec<&str> {
    collections.iter().map(|c| c.slug.as_str()).collect()
}

/// An image-less collection with only the fields ordering cares about.
pub fn stub_collection(slug: &str, updated_at: Option<DateTime<Utc>>) -> GalleryCollection {
    GalleryCollection {
        summary: GallerySummary {
            slug: slug.to_string(),
            title: slug.to_string(),
            kind: GalleryKind::Albums,
            href: format!("/albums/{slug}"),
            cover_image: None,
            image_count: 0,
            tags: vec!["albums".to_string()],
            updated_at,
        },
        images: Vec::new(),
    }
}
