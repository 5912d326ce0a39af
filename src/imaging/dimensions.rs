//! Header-only dimension probing for PNG, JPEG, WebP and SVG.
//!
//! The page layer only needs width and height to reserve layout space, so
//! instead of decoding the image we read the handful of header bytes that
//! carry the size:
//!
//! | Format | Where the size lives |
//! |---|---|
//! | PNG  | IHDR: big-endian u32 width @16, height @20 |
//! | JPEG | first SOF0..SOF3 segment: u16 height @+5, width @+7 |
//! | WebP `VP8 `  | lossy frame header: u16 LE @26 / @28 (14 bits) |
//! | WebP `VP8L`  | lossless header: two packed 14-bit `size - 1` fields @21 |
//! | WebP `VP8X`  | extended header: two 24-bit LE `size - 1` fields @24 / @27 |
//! | SVG  | root `width`/`height` attributes, else `viewBox` |
//!
//! [`probe_file`] reads at most [`HEADER_PREFIX_LEN`] bytes of a raster
//! file, so large camera exports are never loaded whole.
//!
//! Nothing here returns a parse error. [`image_dimensions`] substitutes
//! [`FALLBACK_DIMENSIONS`] when a header is short, garbled, or of an
//! unknown format, so a bad file never breaks a page render.

use crate::types::Dimensions;
use regex::Regex;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::sync::LazyLock;

/// Size reported when a header cannot be read (a 3:2 landscape frame).
pub const FALLBACK_DIMENSIONS: Dimensions = Dimensions {
    width: 1600,
    height: 1066,
};

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const VP8L_SIGNATURE: u8 = 0x2F;
const WEBP_MIN_LEN: usize = 30;

/// Bytes read up front from PNG, JPEG and WebP files. Enough for the EXIF
/// and ICC segments a camera puts ahead of the JPEG frame header.
pub const HEADER_PREFIX_LEN: u64 = 256 * 1024;

/// Probe an image file on disk.
///
/// Raster formats are read up to [`HEADER_PREFIX_LEN`] bytes; the remainder
/// is only read when the prefix held no usable header and the file is longer.
/// SVG is read whole, since its root tag can follow an arbitrary prolog.
/// Only I/O failures are errors; an unreadable header is `Ok(None)`.
pub fn probe_file(path: &Path) -> io::Result<Option<Dimensions>> {
    if extension_of(path) == "svg" {
        let bytes = fs::read(path)?;
        return Ok(try_image_dimensions(path, &bytes));
    }

    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.by_ref().take(HEADER_PREFIX_LEN).read_to_end(&mut bytes)?;
    if let Some(dims) = try_image_dimensions(path, &bytes) {
        return Ok(Some(dims));
    }
    if (bytes.len() as u64) < HEADER_PREFIX_LEN {
        return Ok(None);
    }

    file.read_to_end(&mut bytes)?;
    Ok(try_image_dimensions(path, &bytes))
}

/// Dimensions of an image, falling back to [`FALLBACK_DIMENSIONS`].
///
/// The format is chosen by the (case-insensitive) extension of `path`;
/// `bytes` is the file content.
pub fn image_dimensions(path: &Path, bytes: &[u8]) -> Dimensions {
    try_image_dimensions(path, bytes).unwrap_or(FALLBACK_DIMENSIONS)
}

/// Dimensions of an image, or `None` when the header cannot be read.
///
/// Zero-sized results count as unreadable.
pub fn try_image_dimensions(path: &Path, bytes: &[u8]) -> Option<Dimensions> {
    let (width, height) = match extension_of(path).as_str() {
        "png" => parse_png(bytes),
        "jpg" | "jpeg" => parse_jpeg(bytes),
        "webp" => parse_webp(bytes),
        "svg" => parse_svg(&String::from_utf8_lossy(bytes)),
        _ => None,
    }?;

    (width > 0 && height > 0).then_some(Dimensions { width, height })
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ---------------------------------------------------------------------------
// Byte readers
// ---------------------------------------------------------------------------

fn slice_at<const N: usize>(data: &[u8], at: usize) -> Option<[u8; N]> {
    data.get(at..at.checked_add(N)?)?.try_into().ok()
}

fn be_u16(data: &[u8], at: usize) -> Option<u16> {
    slice_at::<2>(data, at).map(u16::from_be_bytes)
}

fn be_u32(data: &[u8], at: usize) -> Option<u32> {
    slice_at::<4>(data, at).map(u32::from_be_bytes)
}

fn le_u16(data: &[u8], at: usize) -> Option<u16> {
    slice_at::<2>(data, at).map(u16::from_le_bytes)
}

fn le_u24(data: &[u8], at: usize) -> Option<u32> {
    slice_at::<3>(data, at).map(|[a, b, c]| u32::from_le_bytes([a, b, c, 0]))
}

fn le_u32(data: &[u8], at: usize) -> Option<u32> {
    slice_at::<4>(data, at).map(u32::from_le_bytes)
}

// ---------------------------------------------------------------------------
// PNG
// ---------------------------------------------------------------------------

fn parse_png(data: &[u8]) -> Option<(u32, u32)> {
    if !data.starts_with(PNG_SIGNATURE) {
        return None;
    }
    Some((be_u32(data, 16)?, be_u32(data, 20)?))
}

// ---------------------------------------------------------------------------
// JPEG
// ---------------------------------------------------------------------------

/// Walk the marker segments until the first baseline/progressive frame header.
///
/// Segment layout: `FF <marker> <len: u16 BE>`, where `len` counts itself
/// but not the two marker bytes. SOF payload: precision (1), height (2),
/// width (2), so height sits at +5 and width at +7 from the `FF`.
fn parse_jpeg(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }

    let mut pos = 2;
    while pos < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = *data.get(pos + 1)?;
        match marker {
            // EOI or SOS: no frame header before the scan data means no size
            0xD9 | 0xDA => break,
            // Fill byte before a marker
            0xFF => {
                pos += 1;
                continue;
            }
            // Standalone markers (TEM, RSTn) carry no length
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            _ => {}
        }

        let length = usize::from(be_u16(data, pos + 2)?);
        if length < 2 {
            break;
        }
        if (0xC0..=0xC3).contains(&marker) {
            let height = be_u16(data, pos + 5)?;
            let width = be_u16(data, pos + 7)?;
            return Some((u32::from(width), u32::from(height)));
        }
        pos += length + 2;
    }
    None
}

// ---------------------------------------------------------------------------
// WebP
// ---------------------------------------------------------------------------

fn parse_webp(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < WEBP_MIN_LEN || &data[0..4] != b"RIFF" || &data[8..12] != b"WEBP" {
        return None;
    }

    match &data[12..16] {
        // Lossy: 3-byte frame tag + 3-byte start code, then 14-bit sizes
        // (the top two bits are a scaling hint)
        b"VP8 " => {
            let width = le_u16(data, 26)? & 0x3FFF;
            let height = le_u16(data, 28)? & 0x3FFF;
            Some((u32::from(width), u32::from(height)))
        }
        // Lossless: signature byte, then width-1 and height-1 as 14-bit fields
        b"VP8L" => {
            if data[20] != VP8L_SIGNATURE {
                return None;
            }
            let bits = le_u32(data, 21)?;
            let width = (bits & 0x3FFF) + 1;
            let height = ((bits >> 14) & 0x3FFF) + 1;
            Some((width, height))
        }
        // Extended: flags (4 bytes), then canvas width-1 and height-1 as u24
        b"VP8X" => Some((le_u24(data, 24)? + 1, le_u24(data, 27)? + 1)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// SVG
// ---------------------------------------------------------------------------

static SVG_ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<svg\b[^>]*>").expect("static regex"));
static SVG_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)width\s*=\s*["']\s*([0-9]*\.?[0-9]+)(?:px)?\s*["']"#)
        .expect("static regex")
});
static SVG_HEIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)height\s*=\s*["']\s*([0-9]*\.?[0-9]+)(?:px)?\s*["']"#)
        .expect("static regex")
});
static SVG_VIEWBOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)viewBox\s*=\s*["']([^"']*)["']"#).expect("static regex")
});

/// Read the size from the root `<svg>` element.
///
/// Explicit `width`/`height` attributes (unitless or `px`) win. Otherwise
/// the third and fourth numbers of `viewBox` are used. Percentages and other
/// units are ignored.
fn parse_svg(content: &str) -> Option<(u32, u32)> {
    let root = SVG_ROOT.find(content)?.as_str();

    let width = capture_number(&SVG_WIDTH, root);
    let height = capture_number(&SVG_HEIGHT, root);
    if let (Some(w), Some(h)) = (width, height) {
        return Some((to_pixels(w)?, to_pixels(h)?));
    }

    let view_box = SVG_VIEWBOX.captures(root)?.get(1)?.as_str();
    let parts: Vec<f64> = view_box
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    if parts.len() != 4 {
        return None;
    }
    Some((to_pixels(parts[2])?, to_pixels(parts[3])?))
}

fn capture_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

fn to_pixels(value: f64) -> Option<u32> {
    if !value.is_finite() || value <= 0.0 || value > f64::from(u32::MAX) {
        return None;
    }
    Some((value.round() as u32).max(1))
}
