//! Inline gradient placeholders.
//!
//! Each image gets a tiny SVG with a diagonal two-stop gradient whose colors
//! are hashed from the image's identity. It is small enough to inline in the
//! page as a `data:` URI and stable across builds, so the page never shows a
//! different placeholder for the same photo.

use crate::config::PlaceholderConfig;
use crate::naming::hash_string_to_hsl;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Build the placeholder for `key` with the stock 32×24 size and color presets.
pub fn build_placeholder(key: &str) -> String {
    build_placeholder_with(key, &PlaceholderConfig::default())
}

/// Build a `data:image/svg+xml;base64,…` placeholder for `key`.
///
/// The base color hashes `key`, the accent hashes `"{key}-accent"`, each
/// with its own saturation/lightness preset.
pub fn build_placeholder_with(key: &str, config: &PlaceholderConfig) -> String {
    let base = hash_string_to_hsl(key, config.base_saturation, config.base_lightness);
    let accent = hash_string_to_hsl(
        &format!("{key}-accent"),
        config.accent_saturation,
        config.accent_lightness,
    );
    let svg = gradient_svg(config.width, config.height, &base, &accent);
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

fn gradient_svg(width: u32, height: u32, from: &str, to: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><defs><linearGradient id="g" x1="0" x2="1" y1="0" y2="1"><stop offset="0" stop-color="{from}"/><stop offset="1" stop-color="{to}"/></linearGradient></defs><rect width="{width}" height="{height}" fill="url(#g)"/></svg>"#
    )
}
