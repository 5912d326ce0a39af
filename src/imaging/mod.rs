//! Image inspection without decoding.
//!
//! | Operation | Module |
//! |---|---|
//! | **Identify** | [`dimensions`]: PNG / JPEG / WebP / SVG header probe |
//! | **Placeholder** | [`placeholder`]: hashed gradient as an inline SVG data URI |
//!
//! Only the bytes needed for layout are interpreted; pixel data is never
//! touched, so the crate carries no image codec.

pub mod dimensions;
pub mod placeholder;

pub use dimensions::{
    FALLBACK_DIMENSIONS, HEADER_PREFIX_LEN, image_dimensions, probe_file, try_image_dimensions,
};
pub use placeholder::{build_placeholder, build_placeholder_with};
