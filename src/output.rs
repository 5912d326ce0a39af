//! CLI output formatting for gallery reads and contact dry runs.
//!
//! # Information-First Display
//!
//! Every entity is shown by its semantic identity (positional index and
//! title) first. The public path, tags, and timestamps follow as indented
//! context lines, so the output reads as a content inventory of `public/`.
//!
//! # Output Format
//!
//! ## Collection
//!
//! ```text
//! 001 Weddings (2 photos)
//!     Href: /albums/weddings
//!     Updated: 2024-03-05 14:00 UTC
//!     Tags: albums, weddings
//!     001 A
//!         Source: /albums/weddings/A.jpg
//!         Size: 1024x768
//!     002 B
//!         Source: /albums/weddings/b.jpg
//!         Size: 1024x768
//!         Exif: aperture, iso
//! ```
//!
//! ## Summaries
//!
//! ```text
//! Albums
//! 001 Portraits (1 photos)
//!     Href: /albums/portraits
//!     Updated: never
//!     Tags: albums, portraits
//!     Cover: /albums/portraits/p.webp
//! ```
//!
//! ## Contact
//!
//! ```text
//! From: studio@example.com
//! To: studio@example.com
//! Reply-To: ada@example.com
//! Subject: New photography inquiry — Wedding
//!
//! Name: Ada Lovelace
//! ...
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::contact::{ContactResponse, InquiryEmail};
use crate::types::{GalleryCollection, GalleryImage, GalleryKind, GallerySummary};
use chrono::{DateTime, Utc};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Positional index + title, with photo count.
///
/// ```text
/// 001 Weddings (12 photos)
/// ```
fn entity_header(index: usize, title: &str, count: usize) -> String {
    format!("{} {} ({} photos)", format_index(index), title, count)
}

fn format_updated(updated_at: Option<&DateTime<Utc>>) -> String {
    match updated_at {
        Some(t) => t.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "never".to_string(),
    }
}

/// Header and context lines for one summary at `depth`.
fn summary_lines(index: usize, summary: &GallerySummary, depth: usize) -> Vec<String> {
    let base = indent(depth);
    let ctx = indent(depth + 1);
    vec![
        format!(
            "{}{}",
            base,
            entity_header(index, &summary.title, summary.image_count)
        ),
        format!("{}Href: {}", ctx, summary.href),
        format!("{}Updated: {}", ctx, format_updated(summary.updated_at.as_ref())),
        format!("{}Tags: {}", ctx, summary.tags.join(", ")),
    ]
}

fn image_lines(index: usize, image: &GalleryImage, depth: usize) -> Vec<String> {
    let ctx = indent(depth + 1);
    let mut lines = vec![
        format!("{}{} {}", indent(depth), format_index(index), image.alt),
        format!("{}Source: {}", ctx, image.src),
        format!("{}Size: {}x{}", ctx, image.width, image.height),
    ];
    if let Some(exif) = image.exif.as_ref().filter(|e| !e.is_empty()) {
        let keys: Vec<&str> = exif.keys().map(String::as_str).collect();
        lines.push(format!("{}Exif: {}", ctx, keys.join(", ")));
    }
    lines
}

fn kind_heading(kind: GalleryKind) -> &'static str {
    match kind {
        GalleryKind::Albums => "Albums",
        GalleryKind::Events => "Events",
    }
}

// ============================================================================
// Gallery views
// ============================================================================

/// One collection with every image.
pub fn format_collection(collection: &GalleryCollection) -> Vec<String> {
    let mut lines = summary_lines(1, &collection.summary, 0);
    for (i, image) in collection.images.iter().enumerate() {
        lines.extend(image_lines(i + 1, image, 1));
    }
    lines
}

pub fn print_collection(collection: &GalleryCollection) {
    print_lines(format_collection(collection));
}

/// Collections listed as summaries, with a cover line instead of images.
///
/// `heading` is printed first when given (`Albums`, `Events`, `All`).
pub fn format_summaries(heading: Option<&str>, collections: &[GalleryCollection]) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(h) = heading {
        lines.push(h.to_string());
    }
    if collections.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }
    for (i, collection) in collections.iter().enumerate() {
        lines.extend(summary_lines(i + 1, &collection.summary, 0));
        if let Some(cover) = &collection.cover_image {
            lines.push(format!("{}Cover: {}", indent(1), cover.src));
        }
    }
    lines
}

pub fn print_summaries(heading: Option<&str>, collections: &[GalleryCollection]) {
    print_lines(format_summaries(heading, collections));
}

/// Kind heading, then one line per slug.
pub fn format_slugs(kind: GalleryKind, slugs: &[String]) -> Vec<String> {
    let mut lines = vec![kind_heading(kind).to_string()];
    for (i, slug) in slugs.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), slug));
    }
    lines
}

pub fn print_slugs(kind: GalleryKind, slugs: &[String]) {
    print_lines(format_slugs(kind, slugs));
}

pub fn format_featured(summaries: &[GallerySummary]) -> Vec<String> {
    let mut lines = vec!["Featured".to_string()];
    for (i, summary) in summaries.iter().enumerate() {
        lines.extend(summary_lines(i + 1, summary, 0));
    }
    lines
}

pub fn print_featured(summaries: &[GallerySummary]) {
    print_lines(format_featured(summaries));
}

// ============================================================================
// Contact
// ============================================================================

/// Envelope headers, a blank line, then the plain-text body.
pub fn format_email(email: &InquiryEmail) -> Vec<String> {
    let mut lines = vec![
        format!("From: {}", email.from),
        format!("To: {}", email.to.join(", ")),
        format!("Reply-To: {}", email.reply_to),
        format!("Subject: {}", email.subject),
        String::new(),
    ];
    lines.extend(email.text.lines().map(str::to_string));
    lines
}

pub fn print_email(email: &InquiryEmail) {
    print_lines(format_email(email));
}

/// Status line, optional retry hint, then the JSON body.
pub fn format_contact_response(response: &ContactResponse) -> Vec<String> {
    let mut lines = vec![format!("Status: {}", response.status)];
    if let Some(secs) = response.retry_after_secs {
        lines.push(format!("Retry-After: {}", secs));
    }
    lines.push(response.body.to_string());
    lines
}

pub fn print_contact_response(response: &ContactResponse) {
    print_lines(format_contact_response(response));
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}
