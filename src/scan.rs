//! Filesystem scanning and collection assembly.
//!
//! Collections are plain directories under the public root, one root per
//! [`GalleryKind`]:
//!
//! ```text
//! public/
//! ├── albums/
//! │   ├── weddings/                # Collection (slug = "weddings")
//! │   │   ├── 001-first-look.jpg   # Image
//! │   │   ├── 001-first-look.json  # Optional EXIF side-car, never an image
//! │   │   └── 002-vows.webp
//! │   └── empty-folder/            # No images = no collection
//! └── events/
//!     └── car-meet-2024/
//!         └── hero.png
//! ```
//!
//! ## Rules
//!
//! - Every regular file directly inside a collection directory is an image,
//!   except `*.json` side-cars and hidden dot-files.
//! - Images are ordered by file name, case-insensitively. The first image is
//!   the cover.
//! - A directory that is missing, empty, or holds no images is not a
//!   collection. That is never an error: lookups return `None` and listings
//!   skip it. Any other I/O failure (permissions, a vanished mount) is
//!   propagated.
//!
//! ## Parallelism
//!
//! Per-file reads within a collection, per-collection reads within a kind,
//! and the two kinds themselves all run on the rayon pool. Results are
//! collected in input order, so the output never depends on which read
//! finishes first.

use crate::config::{PlaceholderConfig, SiteConfig};
use crate::imaging::{FALLBACK_DIMENSIONS, build_placeholder_with, probe_file};
use crate::metadata::read_exif_companion;
use crate::naming::{file_name_to_alt, slug_tags, slug_to_title};
use crate::types::{
    Dimensions, GalleryCollection, GalleryImage, GalleryKind, GallerySummary,
};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where to scan and how to derive per-image values.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory holding one subdirectory per kind.
    pub public_root: PathBuf,
    pub placeholder: PlaceholderConfig,
    /// Size reported for images whose header cannot be read.
    pub fallback: Dimensions,
}

impl ScanOptions {
    /// Stock placeholder and fallback settings for `public_root`.
    pub fn new(public_root: impl Into<PathBuf>) -> Self {
        Self {
            public_root: public_root.into(),
            placeholder: PlaceholderConfig::default(),
            fallback: FALLBACK_DIMENSIONS,
        }
    }

    /// Options from a loaded config, resolving `public_root` against `site_root`.
    pub fn from_config(config: &SiteConfig, site_root: &Path) -> Self {
        Self {
            public_root: config.public_dir(site_root),
            placeholder: config.placeholder.clone(),
            fallback: config.dimensions.fallback(),
        }
    }

    pub fn kind_dir(&self, kind: GalleryKind) -> PathBuf {
        self.public_root.join(kind.as_str())
    }
}

/// Read one image file into a [`GalleryImage`].
///
/// Only the image header is read. Dimension probing and side-car lookup
/// never fail; only opening or reading the image itself can.
pub fn read_image(
    options: &ScanOptions,
    kind: GalleryKind,
    slug: &str,
    file_name: &str,
) -> Result<GalleryImage, ScanError> {
    let image_path = options.kind_dir(kind).join(slug).join(file_name);
    let dims = probe_file(&image_path)?.unwrap_or(options.fallback);

    let placeholder = build_placeholder_with(
        &format!("{kind}-{slug}-{file_name}"),
        &options.placeholder,
    );
    let alt = file_name_to_alt(file_name);

    Ok(GalleryImage {
        src: format!("/{kind}/{slug}/{file_name}"),
        caption: alt.clone(),
        alt,
        width: dims.width,
        height: dims.height,
        placeholder,
        exif: read_exif_companion(&image_path),
    })
}

/// Load one collection, or `None` when the directory holds no images.
pub fn get_collection(
    options: &ScanOptions,
    kind: GalleryKind,
    slug: &str,
) -> Result<Option<GalleryCollection>, ScanError> {
    if !is_valid_slug(slug) {
        return Ok(None);
    }

    let dir = options.kind_dir(kind).join(slug);
    let entries = read_dir_safe(&dir)?;
    if entries.is_empty() {
        return Ok(None);
    }

    let mut files: Vec<String> = entries
        .iter()
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| is_image_candidate(name))
        .collect();
    files.sort_by(|a, b| compare_names(a, b));

    let images = files
        .par_iter()
        .map(|file| read_image(options, kind, slug, file))
        .collect::<Result<Vec<_>, _>>()?;

    if images.is_empty() {
        return Ok(None);
    }

    let updated_at = fs::metadata(&dir)?
        .modified()
        .ok()
        .map(DateTime::<Utc>::from);

    debug!(%kind, slug, images = images.len(), "scanned collection");

    Ok(Some(GalleryCollection {
        summary: GallerySummary {
            slug: slug.to_string(),
            title: slug_to_title(slug),
            kind,
            href: format!("/{kind}/{slug}"),
            cover_image: images.first().cloned(),
            image_count: images.len(),
            tags: slug_tags(kind, slug),
            updated_at,
        },
        images,
    }))
}

/// Names of every subdirectory under a kind's root, sorted.
pub fn list_slugs(options: &ScanOptions, kind: GalleryKind) -> Result<Vec<String>, ScanError> {
    let mut slugs: Vec<String> = read_dir_safe(&options.kind_dir(kind))?
        .iter()
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    slugs.sort_by(|a, b| compare_names(a, b));
    Ok(slugs)
}

/// Every non-empty collection of one kind, ordered by slug.
pub fn list_collections(
    options: &ScanOptions,
    kind: GalleryKind,
) -> Result<Vec<GalleryCollection>, ScanError> {
    let slugs = list_slugs(options, kind)?;
    let collections = slugs
        .par_iter()
        .map(|slug| get_collection(options, kind, slug))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(collections.into_iter().flatten().collect())
}

/// Collections of every kind, most recently updated first.
pub fn all_collections(options: &ScanOptions) -> Result<Vec<GalleryCollection>, ScanError> {
    let (events, albums) = rayon::join(
        || list_collections(options, GalleryKind::Events),
        || list_collections(options, GalleryKind::Albums),
    );
    let mut all = events?;
    all.extend(albums?);
    sort_by_recency(&mut all);
    Ok(all)
}

/// The first `count` collections of an already sorted list, without images.
pub fn featured(sorted: &[GalleryCollection], count: usize) -> Vec<GallerySummary> {
    sorted.iter().take(count).map(GalleryCollection::to_summary).collect()
}

/// Sort newest first. Collections without a timestamp sort last; ties keep
/// their existing order.
pub fn sort_by_recency(collections: &mut [GalleryCollection]) {
    collections.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// Name order that ignores case and accents (`apple` < `Église` < `zebra`),
/// with the raw name as a tie-breaker so the result is total and deterministic.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Base letters only: canonical decomposition, combining marks dropped,
/// then lower-cased.
fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// A slug must name a single directory entry below the kind root.
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\'])
        && !slug.contains('\0')
}

fn is_image_candidate(name: &str) -> bool {
    !name.starts_with('.') && !name.ends_with(".json")
}

/// List a directory, treating "does not exist" (or "is not a directory") as empty.
fn read_dir_safe(dir: &Path) -> Result<Vec<fs::DirEntry>, ScanError> {
    match fs::read_dir(dir) {
        Ok(iter) => Ok(iter.collect::<Result<Vec<_>, _>>()?),
        Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            Ok(Vec::new())
        }
        Err(err) => Err(err.into()),
    }
}
