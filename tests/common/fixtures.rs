use contact_sheet::models::Region;
use image::{ImageBuffer, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Background gray used for synthetic screenshots; never passes the white filter
pub const BACKGROUND: Rgb<u8> = Rgb([180, 180, 180]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Creates a single-colour image
pub fn solid_image(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    ImageBuffer::from_pixel(width, height, color)
}

/// Creates an image whose pixels all differ from their neighbours, so any blur
/// or misplaced copy shows up. `seed` makes images distinguishable.
pub fn patterned_image(width: u32, height: u32, seed: u8) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        let checker = if (x + y) % 2 == 0 { 0u8 } else { 200u8 };
        Rgb([
            checker.wrapping_add(seed),
            (x % 251) as u8,
            ((y * 3) % 251) as u8 ^ seed,
        ])
    })
}

/// A gray "screenshot" with pure white rectangles painted on it
pub fn screenshot_with_fields(width: u32, height: u32, fields: &[Region]) -> RgbImage {
    let mut img = solid_image(width, height, BACKGROUND);
    for field in fields {
        for y in field.y..field.y + field.height {
            for x in field.x..field.x + field.width {
                img.put_pixel(x, y, WHITE);
            }
        }
    }
    img
}

/// Saves a PNG into `dir` and returns its path
pub fn write_png(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    img.save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save test image");
    path
}

/// Every pixel outside `region` is identical in both images
pub fn unchanged_outside(before: &RgbImage, after: &RgbImage, region: Option<Region>) -> bool {
    before.dimensions() == after.dimensions()
        && before.enumerate_pixels().all(|(x, y, p)| {
            region.map(|r| r.contains(x, y)).unwrap_or(false) || after.get_pixel(x, y) == p
        })
}
