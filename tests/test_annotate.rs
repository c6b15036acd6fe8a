//! Integration tests for the annotator.
//!
//! Tests cover:
//! - Mosaic only touches its computed rectangle, including near edges
//! - Sequence and timestamp overlays (shadow under glyph, fixed format)
//! - Reference size warning check

mod common;

use common::*;
use contact_sheet::annotate::{self, Annotator, font};
use std::time::{Duration, UNIX_EPOCH};
use time::UtcOffset;

#[test]
fn test_mosaic_changes_only_target_rect() {
    let annotator = Annotator::default();
    let original = patterned_image(400, 200, 7);
    let mut img = original.clone();
    let detected = DetectedRegion::found(Region::new(50, 60, 300, 40));

    let rect = annotator.mosaic_rect(&img, &detected);
    assert_eq!(rect, Some(Region::new(58, 64, 220, 32)));

    annotator.apply_mosaic(&mut img, &detected);

    assert!(unchanged_outside(&original, &img, rect));
    let changed = img
        .enumerate_pixels()
        .filter(|(x, y, p)| original.get_pixel(*x, *y) != *p)
        .count();
    assert!(changed > 220 * 32 / 2, "only {} pixels blurred", changed);
}

#[test]
fn test_mosaic_is_clipped_at_image_edge() {
    let annotator = Annotator::default();
    let original = patterned_image(400, 200, 3);
    let mut img = original.clone();
    let detected = DetectedRegion::found(Region::new(300, 180, 90, 15));

    let rect = annotator.mosaic_rect(&img, &detected);
    assert_eq!(rect, Some(Region::new(308, 184, 92, 16)));

    annotator.apply_mosaic(&mut img, &detected);

    assert_eq!(img.dimensions(), (400, 200));
    assert!(unchanged_outside(&original, &img, rect));
    assert_ne!(img, original);
}

#[test]
fn test_mosaic_outside_image_is_skipped() {
    let annotator = Annotator::default();
    let original = patterned_image(100, 50, 1);
    let mut img = original.clone();
    let detected = DetectedRegion::found(Region::new(95, 48, 10, 10));

    assert_eq!(annotator.mosaic_rect(&img, &detected), None);
    annotator.apply_mosaic(&mut img, &detected);
    assert_eq!(img, original);
}

#[test]
fn test_mosaic_needs_a_detection() {
    let annotator = Annotator::default();
    let original = patterned_image(300, 100, 9);
    let mut img = original.clone();

    annotator.apply_mosaic(&mut img, &DetectedRegion::not_found());
    assert_eq!(img, original);
}

#[test]
fn test_sequence_draws_shadow_then_glyph() {
    let annotator = Annotator::default();
    let style = annotator.sequence;
    let mut img = solid_image(200, 100, image::Rgb([0, 0, 0]));

    annotator.draw_sequence(&mut img, 0);

    assert_eq!(img.dimensions(), (200, 100));
    // "1" lights the middle column of its top row
    let glyph_x = (style.x + 2 * style.scale as i32) as u32;
    assert_eq!(*img.get_pixel(glyph_x, style.y as u32), style.color);
    // the shadow peeks out below-right of the glyph stroke
    let (dx, dy) = style.shadow_offset;
    let shadow_x = (style.x + 3 * style.scale as i32 + dx - 1) as u32;
    let shadow_y = (style.y + dy) as u32;
    assert_eq!(*img.get_pixel(shadow_x, shadow_y), style.shadow_color);
    // nothing drawn left of the text
    assert_eq!(*img.get_pixel(0, 0), image::Rgb([0, 0, 0]));
}

#[test]
fn test_sequence_uses_one_based_index() {
    let annotator = Annotator::default();
    let mut twelve = solid_image(200, 100, image::Rgb([0, 0, 0]));
    let mut expected = twelve.clone();

    annotator.draw_sequence(&mut twelve, 11);

    let style = annotator.sequence;
    let (dx, dy) = style.shadow_offset;
    font::draw_text(&mut expected, "12", style.x + dx, style.y + dy, style.scale, style.shadow_color);
    font::draw_text(&mut expected, "12", style.x, style.y, style.scale, style.color);
    assert_eq!(twelve, expected);
}

#[test]
fn test_timestamp_format() -> anyhow::Result<()> {
    let time = UNIX_EPOCH + Duration::from_secs(1_700_000_000);

    assert_eq!(annotate::format_timestamp(time, UtcOffset::UTC)?, "2023-11-14 22:13:20");

    let plus_eight = UtcOffset::from_hms(8, 0, 0)?;
    assert_eq!(annotate::format_timestamp(time, plus_eight)?, "2023-11-15 06:13:20");
    Ok(())
}

#[test]
fn test_timestamp_stays_inside_text_box() {
    let annotator = Annotator::default();
    let style = annotator.timestamp;
    let original = patterned_image(500, 200, 4);
    let mut img = original.clone();

    annotator.draw_timestamp(&mut img, UNIX_EPOCH + Duration::from_secs(1_700_000_000));

    let (w, h) = font::text_size("2023-11-14 22:13:20", style.scale);
    let (dx, dy) = style.shadow_offset;
    let text_box = Region::new(
        style.x as u32,
        style.y as u32,
        w + dx as u32,
        h + dy as u32,
    );
    assert!(unchanged_outside(&original, &img, Some(text_box)));
    assert_ne!(img, original);
}

#[test]
fn test_text_is_clipped_on_small_images() {
    let annotator = Annotator::default();
    let mut img = solid_image(30, 30, image::Rgb([0, 0, 0]));

    annotator.draw_sequence(&mut img, 1234);
    annotator.draw_timestamp(&mut img, UNIX_EPOCH);

    assert_eq!(img.dimensions(), (30, 30));
}

#[test]
fn test_text_size() {
    assert_eq!(font::text_size("", 3), (0, 0));
    assert_eq!(font::text_size("1", 1), (5, 7));
    assert_eq!(font::text_size("12", 2), ((5 + 1 + 5) * 2, 14));
}

#[test]
fn test_reference_size_check() {
    assert!(annotate::check_reference_size("shot", 1920, 1080));
    assert!(annotate::check_reference_size("shot", 2560, 1440));
    assert!(!annotate::check_reference_size("shot", 400, 200));
}
