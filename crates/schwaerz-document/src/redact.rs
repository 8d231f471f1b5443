// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Redaction painting — fills detection boxes with solid black.
//
// Only the top-left and bottom-right corners of a region are used. Corners
// are rounded to whole pixels and the rectangle between them is filled
// inclusive of both corners, clipped to the image. Rotated quadrilaterals
// therefore get their axis-aligned span between those two corners, which
// can miss part of a skewed word.

use image::{DynamicImage, Luma, LumaA, Rgb, Rgba};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use schwaerz_core::Region;
use tracing::{debug, instrument};

/// Pixel rectangle covered by `region`, corners ordered so the rectangle is
/// never inverted.
pub fn redaction_rect(region: &Region) -> Rect {
    let (a, b) = (region.top_left(), region.bottom_right());
    let (ax, ay) = (to_pixel(a.x), to_pixel(a.y));
    let (bx, by) = (to_pixel(b.x), to_pixel(b.y));

    let (left, right) = (ax.min(bx), ax.max(bx));
    let (top, bottom) = (ay.min(by), ay.max(by));
    Rect::at(left, top).of_size((right - left + 1) as u32, (bottom - top + 1) as u32)
}

/// Nearest whole pixel, bounded well inside `i32` so rectangle arithmetic
/// cannot overflow. NaN lands on zero.
fn to_pixel(coordinate: f64) -> i32 {
    const LIMIT: f64 = 16_777_216.0;
    coordinate.round().clamp(-LIMIT, LIMIT) as i32
}

/// Paint every region black onto `image` in place.
///
/// Dimensions never change. 8-bit luma and RGB(A) buffers are painted as-is;
/// any other pixel layout is converted to 8-bit RGB first.
#[instrument(skip_all, fields(regions = regions.len()))]
pub fn paint_redactions(image: &mut DynamicImage, regions: &[Region]) {
    if !matches!(
        image,
        DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_)
    ) {
        *image = DynamicImage::ImageRgb8(image.to_rgb8());
    }

    let mut painted = 0usize;
    for region in regions {
        let rect = redaction_rect(region);
        match image {
            DynamicImage::ImageLuma8(buf) => draw_filled_rect_mut(buf, rect, Luma([0u8])),
            DynamicImage::ImageLumaA8(buf) => draw_filled_rect_mut(buf, rect, LumaA([0u8, 255])),
            DynamicImage::ImageRgba8(buf) => draw_filled_rect_mut(buf, rect, Rgba([0u8, 0, 0, 255])),
            DynamicImage::ImageRgb8(buf) => draw_filled_rect_mut(buf, rect, Rgb([0u8, 0, 0])),
            _ => continue,
        }
        painted += 1;
    }
    debug!(painted, "redaction boxes painted");
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};
    use schwaerz_core::Point;

    fn white(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
    }

    fn is_black(image: &DynamicImage, x: u32, y: u32) -> bool {
        image.get_pixel(x, y).0[..3] == [0, 0, 0]
    }

    #[test]
    fn rect_includes_both_corners() {
        let rect = redaction_rect(&Region::axis_aligned(10.4, 20.6, 30.5, 40.0));
        assert_eq!((rect.left(), rect.top()), (10, 21));
        assert_eq!((rect.right(), rect.bottom()), (31, 40));
    }

    #[test]
    fn swapped_corners_are_normalized() {
        let region = Region::new([
            Point::new(50.0, 40.0),
            Point::new(10.0, 40.0),
            Point::new(10.0, 5.0),
            Point::new(50.0, 5.0),
        ]);
        let rect = redaction_rect(&region);
        assert_eq!((rect.left(), rect.top(), rect.right(), rect.bottom()), (10, 5, 50, 40));
    }

    #[test]
    fn paints_inside_leaves_outside() {
        let mut img = white(100, 60);
        let region = Region::axis_aligned(10.0, 10.0, 40.0, 20.0);
        paint_redactions(&mut img, &[region]);

        assert!(is_black(&img, 10, 10));
        assert!(is_black(&img, 40, 20));
        assert!(is_black(&img, 25, 15));
        assert!(!is_black(&img, 9, 10));
        assert!(!is_black(&img, 41, 20));
        assert!(!is_black(&img, 25, 21));
        assert_eq!(img.dimensions(), (100, 60));
    }

    #[test]
    fn out_of_bounds_regions_are_clipped() {
        let mut img = white(20, 20);
        let regions = [
            Region::axis_aligned(-5.0, -5.0, 3.0, 3.0),
            Region::axis_aligned(500.0, 500.0, 600.0, 600.0),
        ];
        paint_redactions(&mut img, &regions);
        assert!(is_black(&img, 0, 0));
        assert!(is_black(&img, 3, 3));
        assert!(!is_black(&img, 19, 19));
        assert_eq!(img.dimensions(), (20, 20));
    }

    #[test]
    fn sixteen_bit_images_are_painted_as_rgb() {
        let mut img = DynamicImage::ImageRgb16(image::ImageBuffer::from_pixel(
            8,
            8,
            Rgb([u16::MAX, u16::MAX, u16::MAX]),
        ));
        paint_redactions(&mut img, &[Region::axis_aligned(0.0, 0.0, 2.0, 2.0)]);
        assert!(matches!(img, DynamicImage::ImageRgb8(_)));
        assert!(is_black(&img, 1, 1));
        assert!(!is_black(&img, 5, 5));
    }

    #[test]
    fn no_regions_leaves_image_untouched() {
        let mut img = white(4, 4);
        let before = img.clone();
        paint_redactions(&mut img, &[]);
        assert_eq!(img, before);
    }
}
