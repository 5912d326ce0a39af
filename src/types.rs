//! Shared gallery types handed to the page layer.
//!
//! Field names serialize in camelCase (`coverImage`, `imageCount`,
//! `updatedAt`, `type`) because the presentation layer consumes these values
//! as JSON without a translation step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The closed set of collection kinds, each with its own root directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryKind {
    Albums,
    Events,
}

impl GalleryKind {
    /// Every kind, in the order they are merged before sorting.
    pub const ALL: [GalleryKind; 2] = [GalleryKind::Events, GalleryKind::Albums];

    /// Directory name under the public root, also used in URLs and tags.
    pub fn as_str(self) -> &'static str {
        match self {
            GalleryKind::Albums => "albums",
            GalleryKind::Events => "events",
        }
    }
}

impl fmt::Display for GalleryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown gallery kind '{}' (expected albums or events)", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for GalleryKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "albums" => Ok(GalleryKind::Albums),
            "events" => Ok(GalleryKind::Events),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

/// Intrinsic pixel size of an image. Both sides are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A single side-car value: free text or a number (f-stop, ISO, focal length).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExifValue {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for ExifValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExifValue::Text(s) => f.write_str(s),
            ExifValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Flat key/value record loaded from `{basename}.json` beside an image.
pub type ExifRecord = BTreeMap<String, ExifValue>;

/// One photograph as exposed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    /// Public path: `/{kind}/{slug}/{file_name}`
    pub src: String,
    pub alt: String,
    pub caption: String,
    pub width: u32,
    pub height: u32,
    /// Inline `data:` URI shown until the real image loads
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exif: Option<ExifRecord>,
}

/// Lightweight description of one collection directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GallerySummary {
    pub slug: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: GalleryKind,
    pub href: String,
    pub cover_image: Option<GalleryImage>,
    pub image_count: usize,
    pub tags: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A collection directory with every image, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryCollection {
    #[serde(flatten)]
    pub summary: GallerySummary,
    pub images: Vec<GalleryImage>,
}

impl GalleryCollection {
    /// Drop the image list, keeping the summary fields.
    pub fn to_summary(&self) -> GallerySummary {
        self.summary.clone()
    }
}

impl std::ops::Deref for GalleryCollection {
    type Target = GallerySummary;

    fn deref(&self) -> &Self::Target {
        &self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("albums".parse::<GalleryKind>(), Ok(GalleryKind::Albums));
        assert_eq!("Events".parse::<GalleryKind>(), Ok(GalleryKind::Events));
        assert!("portfolio".parse::<GalleryKind>().is_err());
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&GalleryKind::Events).unwrap();
        assert_eq!(json, "\"events\"");
    }

    #[test]
    fn exif_value_accepts_text_and_numbers() {
        let record: ExifRecord =
            serde_json::from_str(r#"{"camera": "X-T5", "iso": 400, "aperture": 2.8}"#).unwrap();
        assert_eq!(record["camera"], ExifValue::Text("X-T5".into()));
        assert_eq!(record["iso"].to_string(), "400");
        assert_eq!(record["aperture"].to_string(), "2.8");
    }

    #[test]
    fn summary_serializes_with_camel_case_and_type() {
        let summary = GallerySummary {
            slug: "car-meet-2024".into(),
            title: "Car Meet 2024".into(),
            kind: GalleryKind::Events,
            href: "/events/car-meet-2024".into(),
            cover_image: None,
            image_count: 0,
            tags: vec!["events".into()],
            updated_at: None,
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["type"], "events");
        assert_eq!(value["imageCount"], 0);
        assert!(value["coverImage"].is_null());
        assert!(value["updatedAt"].is_null());
    }

    #[test]
    fn collection_flattens_summary_fields() {
        let collection = GalleryCollection {
            summary: GallerySummary {
                slug: "weddings".into(),
                title: "Weddings".into(),
                kind: GalleryKind::Albums,
                href: "/albums/weddings".into(),
                cover_image: None,
                image_count: 0,
                tags: vec!["albums".into(), "weddings".into()],
                updated_at: None,
            },
            images: vec![],
        };
        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["slug"], "weddings");
        assert!(value["images"].as_array().unwrap().is_empty());
    }
}
