//! The read API consumed by the page layer.
//!
//! [`Gallery`] wraps the [`scan`](crate::scan) functions with a
//! [`MemoCache`]: each distinct call is computed once per `Gallery` and then
//! served from memory. Dropping a new folder into `public/albums/` shows up
//! after [`Gallery::clear_cache`] or a process restart.
//!
//! | Operation | Returns |
//! |---|---|
//! | [`summaries`](Gallery::summaries) | every collection of one kind |
//! | [`all_summaries`](Gallery::all_summaries) | every collection, newest first |
//! | [`collection`](Gallery::collection) | one collection by kind + slug |
//! | [`slugs`](Gallery::slugs) | directory names of one kind |
//! | [`featured`](Gallery::featured) | first N of `all_summaries`, without images |

use crate::cache::{CacheKey, CachedValue, MemoCache};
use crate::config::SiteConfig;
use crate::scan::{self, ScanError, ScanOptions};
use crate::types::{GalleryCollection, GalleryKind, GallerySummary};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug)]
pub struct Gallery {
    options: ScanOptions,
    cache: MemoCache,
}

impl Gallery {
    /// Gallery over `public_root` with stock placeholder and fallback settings.
    pub fn new(public_root: impl Into<PathBuf>) -> Self {
        Self::with_options(ScanOptions::new(public_root))
    }

    /// Gallery configured from a site config; `public_root` resolves against `site_root`.
    pub fn from_config(config: &SiteConfig, site_root: &Path) -> Self {
        Self::with_options(ScanOptions::from_config(config, site_root))
    }

    pub fn with_options(options: ScanOptions) -> Self {
        Self {
            options,
            cache: MemoCache::new(),
        }
    }

    pub fn public_root(&self) -> &Path {
        &self.options.public_root
    }

    /// Every non-empty collection of `kind`, ordered by slug.
    pub fn summaries(&self, kind: GalleryKind) -> Result<Arc<Vec<GalleryCollection>>, ScanError> {
        let value = self.cache.get_or_try_insert(CacheKey::Summaries(kind), || {
            scan::list_collections(&self.options, kind)
                .map(|c| CachedValue::Collections(Arc::new(c)))
        })?;
        Ok(expect_collections(value))
    }

    /// Albums and events merged, most recently updated first.
    pub fn all_summaries(&self) -> Result<Arc<Vec<GalleryCollection>>, ScanError> {
        let value = self.cache.get_or_try_insert(CacheKey::AllSummaries, || {
            scan::all_collections(&self.options).map(|c| CachedValue::Collections(Arc::new(c)))
        })?;
        Ok(expect_collections(value))
    }

    /// One collection, or `None` when the directory is missing or has no images.
    pub fn collection(
        &self,
        kind: GalleryKind,
        slug: &str,
    ) -> Result<Option<Arc<GalleryCollection>>, ScanError> {
        let key = CacheKey::Collection(kind, slug.to_string());
        let value = self.cache.get_or_try_insert(key, || {
            scan::get_collection(&self.options, kind, slug)
                .map(|c| CachedValue::Collection(c.map(Arc::new)))
        })?;
        match value {
            CachedValue::Collection(c) => Ok(c),
            other => unreachable!("collection key holds {other:?}"),
        }
    }

    /// Subdirectory names under the kind's root, including empty ones.
    pub fn slugs(&self, kind: GalleryKind) -> Result<Arc<Vec<String>>, ScanError> {
        let value = self.cache.get_or_try_insert(CacheKey::Slugs(kind), || {
            scan::list_slugs(&self.options, kind).map(|s| CachedValue::Slugs(Arc::new(s)))
        })?;
        match value {
            CachedValue::Slugs(s) => Ok(s),
            other => unreachable!("slugs key holds {other:?}"),
        }
    }

    /// The `count` most recently updated collections, without their images.
    pub fn featured(&self, count: usize) -> Result<Arc<Vec<GallerySummary>>, ScanError> {
        let value = self.cache.get_or_try_insert(CacheKey::Featured(count), || {
            let all = self.all_summaries()?;
            Ok::<_, ScanError>(CachedValue::Summaries(Arc::new(scan::featured(&all, count))))
        })?;
        match value {
            CachedValue::Summaries(s) => Ok(s),
            other => unreachable!("featured key holds {other:?}"),
        }
    }

    /// Forget every memoized result.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

fn expect_collections(value: CachedValue) -> Arc<Vec<GalleryCollection>> {
    match value {
        CachedValue::Collections(c) => c,
        other => unreachable!("collection list key holds {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

        let weddings = collection_dir(tmp.path(), GalleryKind::Albums, "weddings");
        write_file(&weddings, "b.jpg", &jpeg_with_sof(0xC0, 1024, 768));
        write_file(&weddings, "A.jpg", &jpeg_with_sof(0xC0, 1024, 768));
        write_file(&weddings, "c.json", br#"{"iso": 200}"#);
        set_mtime(&weddings, base);

        let meet = collection_dir(tmp.path(), GalleryKind::Events, "car-meet-2024");
        write_file(&meet, "hero.png", &png_header(800, 600));
        set_mtime(&meet, base + Duration::from_secs(3600));

        let portraits = collection_dir(tmp.path(), GalleryKind::Albums, "portraits");
        write_file(&portraits, "p.webp", &webp_vp8x(4000, 6000));
        set_mtime(&portraits, base - Duration::from_secs(3600));

        collection_dir(tmp.path(), GalleryKind::Events, "empty-night");
        tmp
    }

    #[test]
    fn collection_lookup() {
        let tmp = fixture();
        let gallery = Gallery::new(tmp.path());
        let weddings = gallery
            .collection(GalleryKind::Albums, "weddings")
            .unwrap()
            .unwrap();
        assert_eq!(
            image_srcs(&weddings),
            vec!["/albums/weddings/A.jpg", "/albums/weddings/b.jpg"]
        );
        assert_eq!(weddings.image_count, 2);
        assert!(gallery.collection(GalleryKind::Albums, "nope").unwrap().is_none());
        assert!(
            gallery
                .collection(GalleryKind::Events, "empty-night")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn slugs_include_empty_directories() {
        let tmp = fixture();
        let gallery = Gallery::new(tmp.path());
        assert_eq!(
            gallery.slugs(GalleryKind::Events).unwrap().as_slice(),
            ["car-meet-2024", "empty-night"]
        );
        let events = gallery.summaries(GalleryKind::Events).unwrap();
        assert_eq!(collection_slugs(&events), vec!["car-meet-2024"]);
    }

    #[test]
    fn all_summaries_newest_first() {
        let tmp = fixture();
        let gallery = Gallery::new(tmp.path());
        let all = gallery.all_summaries().unwrap();
        assert_eq!(
            collection_slugs(&all),
            vec!["car-meet-2024", "weddings", "portraits"]
        );
    }

    #[test]
    fn featured_is_prefix_of_all_summaries() {
        let tmp = fixture();
        let gallery = Gallery::new(tmp.path());
        let featured = gallery.featured(2).unwrap();
        let all = gallery.all_summaries().unwrap();
        assert_eq!(featured.len(), 2);
        for (summary, collection) in featured.iter().zip(all.iter()) {
            assert_eq!(summary, &collection.summary);
        }
    }

    #[test]
    fn repeated_reads_do_not_rescan() {
        let tmp = fixture();
        let gallery = Gallery::new(tmp.path());
        let first = gallery.summaries(GalleryKind::Albums).unwrap();

        // A new folder is invisible until the cache is cleared
        let fresh = collection_dir(tmp.path(), GalleryKind::Albums, "fresh");
        write_file(&fresh, "a.png", &png_header(10, 10));

        let second = gallery.summaries(GalleryKind::Albums).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);

        gallery.clear_cache();
        assert_eq!(gallery.cached_entries(), 0);
        assert_eq!(gallery.summaries(GalleryKind::Albums).unwrap().len(), 3);
    }

    #[test]
    fn deleted_files_stay_visible_until_cleared() {
        let tmp = fixture();
        let gallery = Gallery::new(tmp.path());
        assert!(gallery.collection(GalleryKind::Events, "car-meet-2024").unwrap().is_some());

        std::fs::remove_dir_all(tmp.path().join("events/car-meet-2024")).unwrap();
        assert!(gallery.collection(GalleryKind::Events, "car-meet-2024").unwrap().is_some());

        gallery.clear_cache();
        assert!(gallery.collection(GalleryKind::Events, "car-meet-2024").unwrap().is_none());
    }

    #[test]
    fn featured_and_all_summaries_are_cached_separately() {
        let tmp = fixture();
        let gallery = Gallery::new(tmp.path());
        gallery.featured(1).unwrap();
        gallery.featured(2).unwrap();
        // AllSummaries + Featured(1) + Featured(2)
        assert_eq!(gallery.cached_entries(), 3);
    }
}
