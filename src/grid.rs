use crate::error::LayoutError;
use image::{Rgb, RgbImage, imageops};

/// Uniform grid that a set of images is tiled into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: u32,
    pub cols: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub margin: u32,
}

impl GridLayout {
    pub fn canvas_width(&self) -> u32 {
        self.cols * self.cell_width + self.cols.saturating_sub(1) * self.margin
    }

    pub fn canvas_height(&self) -> u32 {
        self.rows * self.cell_height + self.rows.saturating_sub(1) * self.margin
    }

    pub fn capacity(&self) -> u64 {
        self.rows as u64 * self.cols as u64
    }

    /// Top-left corner of the cell for flat index `i` (row-major).
    ///
    /// Cell and margin terms are multiplied separately: both stay within the
    /// canvas spans `compute_layout` checked, while `cell + margin` may not.
    pub fn cell_origin(&self, i: usize) -> (u32, u32) {
        let row = i as u32 / self.cols;
        let col = i as u32 % self.cols;
        (
            col * self.cell_width + col * self.margin,
            row * self.cell_height + row * self.margin,
        )
    }

    /// Where an image of the given size lands when centered in cell `i`
    pub fn placement(&self, i: usize, width: u32, height: u32) -> (u32, u32) {
        let (cell_x, cell_y) = self.cell_origin(i);
        (
            cell_x + (self.cell_width - width) / 2,
            cell_y + (self.cell_height - height) / 2,
        )
    }
}

/// Rows and columns derived from the image count alone
pub fn auto_grid(count: usize) -> (u32, u32) {
    let rows = (count as f64).sqrt().ceil().max(1.0) as u32;
    let cols = count.div_ceil(rows as usize) as u32;
    (rows, cols.max(1))
}

/// Resolve rows/cols (0 = unset) for `count` images.
///
/// Both unset: `rows = ceil(sqrt(n))`, `cols = ceil(n / rows)`. One unset: it is
/// derived from the other. Both set: taken as given.
pub fn resolve_grid(count: usize, rows: u32, cols: u32) -> (u32, u32) {
    match (rows, cols) {
        (0, 0) => auto_grid(count),
        (r, 0) => (r, (count.div_ceil(r as usize) as u32).max(1)),
        (0, c) => ((count.div_ceil(c as usize) as u32).max(1), c),
        (r, c) => (r, c),
    }
}

/// Validate the grid for a set of image sizes before anything is allocated
pub fn compute_layout(
    dimensions: &[(u32, u32)],
    rows: u32,
    cols: u32,
    margin: u32,
) -> Result<GridLayout, LayoutError> {
    let count = dimensions.len();
    if count == 0 {
        return Err(LayoutError::Empty);
    }

    let (rows, cols) = resolve_grid(count, rows, cols);
    if (rows as u64) * (cols as u64) < count as u64 {
        return Err(LayoutError::InsufficientCells { rows, cols, count });
    }

    let cell_width = dimensions.iter().map(|d| d.0).max().unwrap_or(0);
    let cell_height = dimensions.iter().map(|d| d.1).max().unwrap_or(0);

    let too_large = LayoutError::CanvasTooLarge {
        rows,
        cols,
        cell_width,
        cell_height,
    };
    let span = |n: u32, cell: u32| -> Option<u32> {
        n.checked_mul(cell)?
            .checked_add(n.saturating_sub(1).checked_mul(margin)?)
    };
    let canvas_w = span(cols, cell_width).ok_or_else(|| too_large.clone())?;
    let canvas_h = span(rows, cell_height).ok_or_else(|| too_large.clone())?;
    // Pixel buffer length must also fit
    if (canvas_w as u64 * canvas_h as u64 * 3) > isize::MAX as u64 {
        return Err(too_large);
    }

    Ok(GridLayout {
        rows,
        cols,
        cell_width,
        cell_height,
        margin,
    })
}

/// Tile images onto a white canvas, each centered in its cell
pub fn compose(images: &[&RgbImage], layout: &GridLayout) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(
        layout.canvas_width(),
        layout.canvas_height(),
        Rgb([255, 255, 255]),
    );

    for (i, img) in images.iter().enumerate() {
        let (x, y) = layout.placement(i, img.width(), img.height());
        imageops::replace(&mut canvas, *img, x as i64, y as i64);
    }

    canvas
}

/// Compute the layout and compose in one go
pub fn compose_grid(
    images: &[&RgbImage],
    rows: u32,
    cols: u32,
    margin: u32,
) -> Result<RgbImage, LayoutError> {
    let dims: Vec<(u32, u32)> = images.iter().map(|img| img.dimensions()).collect();
    let layout = compute_layout(&dims, rows, cols, margin)?;
    Ok(compose(images, &layout))
}
