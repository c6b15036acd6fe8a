//! Integration tests for grid layout and compositing.
//!
//! Tests cover:
//! - Canvas size for explicit rows/cols with margins
//! - Row-major placement and centering (even and odd padding)
//! - Auto layout and partial auto layout
//! - Configuration errors reported before allocation
//! - Cell origins with margins near the integer limit

mod common;

use common::*;
use contact_sheet::grid::{self, GridLayout, auto_grid, compute_layout, resolve_grid};
use image::imageops;

#[test]
fn test_canvas_size_uses_max_cell_and_margins() -> anyhow::Result<()> {
    let dims = [(30, 20), (50, 10), (40, 40)];
    let layout = compute_layout(&dims, 2, 2, 5)?;

    assert_eq!(layout.cell_width, 50);
    assert_eq!(layout.cell_height, 40);
    assert_eq!(layout.canvas_width(), 2 * 50 + 5);
    assert_eq!(layout.canvas_height(), 2 * 40 + 5);
    Ok(())
}

#[test]
fn test_single_row_has_no_vertical_margin() -> anyhow::Result<()> {
    let layout = compute_layout(&[(10, 10), (10, 10), (10, 10)], 1, 3, 7)?;
    assert_eq!(layout.canvas_width(), 3 * 10 + 2 * 7);
    assert_eq!(layout.canvas_height(), 10);
    Ok(())
}

#[test]
fn test_placement_is_row_major_and_centered() -> anyhow::Result<()> {
    let layout = compute_layout(&[(30, 20), (50, 10), (40, 40), (31, 21)], 2, 2, 5)?;

    // cell 50x40, cells start at 0 and 55 horizontally, 0 and 45 vertically
    assert_eq!(layout.placement(0, 30, 20), (10, 10));
    assert_eq!(layout.placement(1, 50, 10), (55, 15));
    assert_eq!(layout.placement(2, 40, 40), (5, 45));
    // odd padding remainder rounds down
    assert_eq!(layout.placement(3, 31, 21), (55 + 9, 45 + 9));
    Ok(())
}

#[test]
fn test_compose_copies_pixels_into_cells() -> anyhow::Result<()> {
    let a = patterned_image(30, 20, 1);
    let b = patterned_image(50, 10, 2);
    let c = patterned_image(40, 40, 3);
    let canvas = grid::compose_grid(&[&a, &b, &c], 2, 2, 5)?;

    assert_eq!(canvas.dimensions(), (105, 85));
    assert_eq!(canvas.get_pixel(10, 10), a.get_pixel(0, 0));
    assert_eq!(canvas.get_pixel(39, 29), a.get_pixel(29, 19));
    assert_eq!(canvas.get_pixel(55, 15), b.get_pixel(0, 0));
    assert_eq!(canvas.get_pixel(5, 45), c.get_pixel(0, 0));

    // padding around a centered image, margins and the unused cell stay white
    assert_eq!(*canvas.get_pixel(9, 10), WHITE);
    assert_eq!(*canvas.get_pixel(52, 0), WHITE);
    assert_eq!(*canvas.get_pixel(0, 42), WHITE);
    assert_eq!(*canvas.get_pixel(80, 60), WHITE);
    Ok(())
}

#[test]
fn test_four_equal_images_with_margin() -> anyhow::Result<()> {
    let images: Vec<_> = (0..4).map(|i| patterned_image(100, 100, i * 40)).collect();
    let refs: Vec<_> = images.iter().collect();
    let dims: Vec<_> = images.iter().map(|i| i.dimensions()).collect();

    let layout = compute_layout(&dims, 2, 2, 10)?;
    assert_eq!((layout.canvas_width(), layout.canvas_height()), (210, 210));

    let origins: Vec<_> = (0..4).map(|i| layout.placement(i, 100, 100)).collect();
    assert_eq!(origins, vec![(0, 0), (110, 0), (0, 110), (110, 110)]);

    let canvas = grid::compose(&refs, &layout);
    for (img, (x, y)) in images.iter().zip(origins) {
        let cell = imageops::crop_imm(&canvas, x, y, 100, 100).to_image();
        assert_eq!(&cell, img);
    }
    Ok(())
}

#[test]
fn test_auto_layout() {
    assert_eq!(auto_grid(7), (3, 3));
    assert_eq!(auto_grid(4), (2, 2));
    assert_eq!(auto_grid(5), (3, 2));
    assert_eq!(auto_grid(1), (1, 1));
    assert_eq!(auto_grid(10), (4, 3));
}

#[test]
fn test_partial_auto_layout_derives_missing_side() {
    assert_eq!(resolve_grid(7, 0, 0), (3, 3));
    assert_eq!(resolve_grid(7, 2, 0), (2, 4));
    assert_eq!(resolve_grid(7, 0, 2), (4, 2));
    assert_eq!(resolve_grid(7, 1, 9), (1, 9));
}

#[test]
fn test_auto_layout_is_used_when_unset() -> anyhow::Result<()> {
    let dims = vec![(10, 10); 7];
    let layout = compute_layout(&dims, 0, 0, 0)?;
    assert_eq!((layout.rows, layout.cols), (3, 3));
    assert!(layout.capacity() >= 7);
    Ok(())
}

#[test]
fn test_insufficient_cells_is_rejected() {
    let dims = vec![(10, 10); 5];
    let result = compute_layout(&dims, 2, 2, 0);
    assert_eq!(
        result,
        Err(LayoutError::InsufficientCells {
            rows: 2,
            cols: 2,
            count: 5
        })
    );
}

#[test]
fn test_empty_set_is_rejected() {
    assert_eq!(compute_layout(&[], 2, 2, 0), Err(LayoutError::Empty));
}

#[test]
fn test_oversized_canvas_is_rejected() {
    let dims = [(u32::MAX / 2 + 1, 1), (10, 1)];
    let result = compute_layout(&dims, 1, 2, 0);
    assert!(matches!(result, Err(LayoutError::CanvasTooLarge { .. })));
}

#[test]
fn test_single_cell_layout_ignores_margin() {
    let layout = GridLayout {
        rows: 1,
        cols: 1,
        cell_width: 5,
        cell_height: 6,
        margin: 3,
    };
    assert_eq!(layout.canvas_width(), 5);
    assert_eq!(layout.canvas_height(), 6);
    assert_eq!(layout.cell_origin(0), (0, 0));
}

#[test]
fn test_huge_margin_on_single_cell_places_at_origin() -> anyhow::Result<()> {
    let layout = compute_layout(&[(10, 10)], 1, 1, u32::MAX)?;

    assert_eq!(layout.placement(0, 10, 10), (0, 0));
    assert_eq!((layout.canvas_width(), layout.canvas_height()), (10, 10));
    Ok(())
}

#[test]
fn test_huge_margin_in_single_column_stays_in_range() -> anyhow::Result<()> {
    let margin = u32::MAX - 100;
    let layout = compute_layout(&[(10, 10), (10, 10)], 2, 1, margin)?;

    assert_eq!(layout.cell_origin(1), (0, 10 + margin));
    assert_eq!(layout.placement(1, 10, 10), (0, 10 + margin));
    assert_eq!(layout.canvas_height(), 20 + margin);
    Ok(())
}
