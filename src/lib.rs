//! # Darkroom
//!
//! The content pipeline behind a photography portfolio. The file system is
//! the data source: every folder under `public/albums/` or `public/events/`
//! is a collection, and every file in it is a photograph.
//!
//! ```text
//! public/
//! ├── albums/
//! │   └── weddings/
//! │       ├── 001.jpg
//! │       ├── 001.json         # optional EXIF side-car
//! │       └── 002.webp
//! └── events/
//!     └── car-meet-2024/
//!         └── hero.png
//! ```
//!
//! Collections are read on demand and memoized for the life of a
//! [`Gallery`]. Images are never decoded: dimensions come from the first few
//! header bytes, and every image gets a deterministic SVG gradient
//! placeholder so layouts do not shift while the real file loads.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`gallery`] | Memoized read API: summaries, collections, slugs, featured |
//! | [`scan`] | Directory walking and collection assembly |
//! | [`cache`] | Per-process memo cache keyed by operation and arguments |
//! | [`imaging`] | Header-only dimension probe and placeholder generator |
//! | [`metadata`] | EXIF side-car (`{basename}.json`) reader |
//! | [`naming`] | Slug → title, file name → alt text, string → HSL color |
//! | [`types`] | Shared serializable types (`GalleryCollection`, `GallerySummary`, ...) |
//! | [`contact`] | Contact form validation, rate limiting, inquiry emails |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Header Probing Over Decoding
//!
//! A portfolio page needs `width`/`height` for every image to reserve space,
//! but decoding hundreds of full-size JPEGs on each cold start is wasteful.
//! [`imaging::dimensions`] reads only PNG, JPEG, WebP, and SVG headers and
//! falls back to 1600×1066 when it cannot tell. A wrong guess costs a
//! slightly off aspect ratio, never a failed page.
//!
//! ## Deploy-Time Freshness
//!
//! The site is redeployed whenever photos change, so the memo cache is never
//! invalidated on its own. Long-running hosts that want to pick up new
//! folders call [`Gallery::clear_cache`].
//!
//! ## Directory Mtime as `updatedAt`
//!
//! Adding or removing a photo bumps its folder's modification time, which is
//! what "recently updated" means to a visitor. Collections whose mtime cannot
//! be read sort last.

pub mod cache;
pub mod config;
pub mod contact;
pub mod gallery;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use gallery::Gallery;
pub use types::{
    Dimensions, ExifRecord, ExifValue, GalleryCollection, GalleryImage, GalleryKind,
    GallerySummary,
};
