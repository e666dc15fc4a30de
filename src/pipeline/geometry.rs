//! Pure geometry helpers used to prepare detected regions for text
//! extraction. None of these touch the network or block.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use crate::models::detection::BoundingBox;

/// Background used when padding crops to a square canvas.
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("degenerate box after clamping: ({x1},{y1})..({x2},{y2})")]
    DegenerateBox { x1: i64, y1: i64, x2: i64, y2: i64 },
}

/// Clamp a detector box to image bounds.
///
/// Returns `GeometryError::DegenerateBox` when clamping leaves no area.
/// That is a per-detection skip, never a failure of the whole image.
pub fn clamp_box(
    bbox: BoundingBox,
    image_width: u32,
    image_height: u32,
) -> Result<BoundingBox, GeometryError> {
    let x1 = bbox.x1.max(0);
    let y1 = bbox.y1.max(0);
    let x2 = bbox.x2.min(i64::from(image_width));
    let y2 = bbox.y2.min(i64::from(image_height));

    if x2 <= x1 || y2 <= y1 {
        return Err(GeometryError::DegenerateBox { x1, y1, x2, y2 });
    }

    Ok(BoundingBox { x1, y1, x2, y2 })
}

/// Pad an image to a square canvas, centering the original on `background`.
/// Already-square images are returned as-is.
pub fn pad_to_square(image: RgbImage, background: Rgb<u8>) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == height {
        return image;
    }

    let side = width.max(height);
    let mut canvas = RgbImage::from_pixel(side, side, background);
    let x = i64::from((side - width) / 2);
    let y = i64::from((side - height) / 2);
    imageops::replace(&mut canvas, &image, x, y);
    canvas
}

/// Downscale so that neither dimension exceeds `max_size`, preserving aspect
/// ratio. Images already within bounds are returned as-is; this never
/// upscales.
pub fn constrain_max_dimension(image: RgbImage, max_size: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let largest = width.max(height);
    if largest <= max_size {
        return image;
    }

    let scale = f64::from(max_size) / f64::from(largest);
    let new_width = ((f64::from(width) * scale) as u32).max(1);
    let new_height = ((f64::from(height) * scale) as u32).max(1);
    imageops::resize(&image, new_width, new_height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x1: i64, y1: i64, x2: i64, y2: i64) -> BoundingBox {
        BoundingBox::new(x1, y1, x2, y2)
    }

    #[test]
    fn clamp_leaves_in_bounds_box_unchanged() {
        let clamped = clamp_box(bbox(10, 20, 50, 60), 100, 100).unwrap();
        assert_eq!(clamped, bbox(10, 20, 50, 60));
    }

    #[test]
    fn clamp_pulls_negative_origin_to_zero() {
        let clamped = clamp_box(bbox(-5, -8, 40, 40), 100, 100).unwrap();
        assert_eq!(clamped, bbox(0, 0, 40, 40));
    }

    #[test]
    fn clamp_caps_extent_to_image_bounds() {
        let clamped = clamp_box(bbox(10, 10, 500, 500), 100, 80).unwrap();
        assert_eq!(clamped, bbox(10, 10, 100, 80));
    }

    #[test]
    fn clamp_rejects_zero_area_box() {
        assert!(clamp_box(bbox(30, 10, 30, 50), 100, 100).is_err());
        assert!(clamp_box(bbox(10, 50, 60, 50), 100, 100).is_err());
    }

    #[test]
    fn clamp_rejects_box_entirely_outside_image() {
        assert!(clamp_box(bbox(200, 200, 300, 300), 100, 100).is_err());
        assert!(clamp_box(bbox(-50, -50, -10, -10), 100, 100).is_err());
    }

    #[test]
    fn pad_returns_square_image_unchanged() {
        let image = RgbImage::from_pixel(32, 32, Rgb([1, 2, 3]));
        let padded = pad_to_square(image.clone(), WHITE);
        assert_eq!(padded, image);
    }

    #[test]
    fn pad_centers_on_square_canvas() {
        let image = RgbImage::from_pixel(10, 4, Rgb([9, 9, 9]));
        let padded = pad_to_square(image, WHITE);
        assert_eq!(padded.dimensions(), (10, 10));
        // (10 - 4) / 2 = 3 rows of background above and below
        assert_eq!(*padded.get_pixel(0, 0), WHITE);
        assert_eq!(*padded.get_pixel(0, 2), WHITE);
        assert_eq!(*padded.get_pixel(0, 3), Rgb([9, 9, 9]));
        assert_eq!(*padded.get_pixel(0, 6), Rgb([9, 9, 9]));
        assert_eq!(*padded.get_pixel(0, 7), WHITE);
    }

    #[test]
    fn pad_floors_offset_for_odd_margins() {
        let image = RgbImage::from_pixel(3, 8, Rgb([7, 7, 7]));
        let padded = pad_to_square(image, WHITE);
        assert_eq!(padded.dimensions(), (8, 8));
        // (8 - 3) / 2 = 2, so columns 2..5 carry the original
        assert_eq!(*padded.get_pixel(1, 0), WHITE);
        assert_eq!(*padded.get_pixel(2, 0), Rgb([7, 7, 7]));
        assert_eq!(*padded.get_pixel(4, 0), Rgb([7, 7, 7]));
        assert_eq!(*padded.get_pixel(5, 0), WHITE);
    }

    #[test]
    fn pad_is_idempotent() {
        let image = RgbImage::from_pixel(6, 11, Rgb([5, 5, 5]));
        let once = pad_to_square(image, WHITE);
        let twice = pad_to_square(once.clone(), WHITE);
        assert_eq!(once, twice);
    }

    #[test]
    fn constrain_leaves_small_image_unchanged() {
        let image = RgbImage::from_pixel(100, 60, Rgb([4, 4, 4]));
        let constrained = constrain_max_dimension(image.clone(), 1024);
        assert_eq!(constrained, image);
    }

    #[test]
    fn constrain_shrinks_largest_side_to_max() {
        let image = RgbImage::from_pixel(2048, 1024, Rgb([4, 4, 4]));
        let constrained = constrain_max_dimension(image, 1024);
        assert_eq!(constrained.dimensions(), (1024, 512));
    }

    #[test]
    fn constrain_never_increases_dimensions() {
        let image = RgbImage::from_pixel(640, 480, Rgb([4, 4, 4]));
        let constrained = constrain_max_dimension(image, 500);
        let (w, h) = constrained.dimensions();
        assert!(w <= 640 && h <= 480);
        assert!(w.max(h) <= 500);
    }

    #[test]
    fn constrain_preserves_aspect_ratio() {
        let image = RgbImage::from_pixel(1500, 1000, Rgb([4, 4, 4]));
        let constrained = constrain_max_dimension(image, 600);
        let (w, h) = constrained.dimensions();
        let original_ratio = 1500.0 / 1000.0;
        let new_ratio = f64::from(w) / f64::from(h);
        assert!((original_ratio - new_ratio).abs() < 0.01);
    }
}
