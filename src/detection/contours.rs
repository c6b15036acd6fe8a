use crate::models::Region;
use image::GrayImage;
use imageproc::contours::{BorderType, Contour, find_contours};

/// Bounding rectangle of a traced border (inclusive of its extreme points)
pub fn bounding_rect(contour: &Contour<u32>) -> Option<Region> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &contour.points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(Region::from_corners(min_x, min_y, max_x, max_y))
}

/// Bounding rectangles of the outermost borders in a binary image.
///
/// Non-zero pixels are foreground. Borders nested inside another border
/// (holes and anything within them) are skipped. Rectangles come back in the
/// raster order in which the borders were discovered.
///
/// On a Canny edge map the ring sits one pixel outside the filled shape, so a
/// white field at (x, y, w, h) comes back as (x - 1, y - 1, w + 2, h + 2).
pub fn find_external_rects(binary: &GrayImage) -> Vec<Region> {
    find_contours::<u32>(binary)
        .iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .filter_map(bounding_rect)
        .collect()
}
