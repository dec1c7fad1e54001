//! Face-region cropping.
//!
//! The indexing worker hands this module the original photo bytes and the
//! bounding box from the detection task. A degenerate or absent box falls
//! back to the full image, the documented behavior when no face was found.
//! Output is always JPEG, matching the `faces/` namespace suffix.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use tracing::warn;

use crate::error::Result;
use crate::types::BoundingBox;

/// Crop the face region out of `photo` and re-encode it as JPEG.
///
/// `region` is clamped to the image bounds; a box that is degenerate, or
/// that collapses to zero area once clamped, yields the full image.
pub fn crop_face(photo: &[u8], region: Option<BoundingBox>) -> Result<Vec<u8>> {
    let img = image::load_from_memory(photo)?;
    let cropped = match region.filter(|b| !b.is_degenerate()) {
        Some(bbox) => crop_region(&img, bbox),
        None => img,
    };

    // JPEG has no alpha channel, so flatten before encoding.
    let rgb = DynamicImage::ImageRgb8(cropped.to_rgb8());
    let mut buf = Cursor::new(Vec::new());
    rgb.write_to(&mut buf, ImageFormat::Jpeg)?;
    Ok(buf.into_inner())
}

fn crop_region(img: &DynamicImage, bbox: BoundingBox) -> DynamicImage {
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    let x1 = bbox.x1.clamp(0, w);
    let y1 = bbox.y1.clamp(0, h);
    let x2 = bbox.x2.clamp(0, w);
    let y2 = bbox.y2.clamp(0, h);

    if x2 <= x1 || y2 <= y1 {
        warn!(
            x1 = bbox.x1,
            y1 = bbox.y1,
            x2 = bbox.x2,
            y2 = bbox.y2,
            width = img.width(),
            height = img.height(),
            "bounding box outside image bounds, using full image"
        );
        return img.clone();
    }

    img.crop_imm(x1 as u32, y1 as u32, (x2 - x1) as u32, (y2 - y1) as u32)
}
