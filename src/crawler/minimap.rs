//! Minimap overlay painted into the top-right corner of the 3D view.
//!
//! Unexplored cells stay fogged; explored cells show walls, stairs and a
//! faint path tint. The player is a white triangle pointing along the facing.

use image::{Rgb, RgbImage};

use super::projector::Point;
use super::raster::{self, BLACK, WHITE};
use super::state::{Cell, Floor, Pose};

pub const FOG: Rgb<u8> = Rgb([25, 25, 25]);
/// #8E8D8A
pub const PRIMARY: Rgb<u8> = Rgb([0x8E, 0x8D, 0x8A]);
/// #E98074
pub const ACCENT: Rgb<u8> = Rgb([0xE9, 0x80, 0x74]);

const FULL_SIZE: f64 = 64.0;
const FULL_MARGIN: f64 = 12.0;
const PADDING: f64 = 4.0;
const BACKDROP_ALPHA: f64 = 0.8;
const PATH_ALPHA: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Hidden,
    Wall,
    Stairs,
    Path,
}

pub fn tone(floor: &Floor, x: i32, y: i32) -> Tone {
    if !floor.is_explored(x, y) {
        return Tone::Hidden;
    }
    match floor.cell_at(x, y) {
        Cell::Wall => Tone::Wall,
        Cell::Stairs => Tone::Stairs,
        Cell::Path => Tone::Path,
    }
}

/// Where the minimap sits on a raster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub cell_w: f64,
    pub cell_h: f64,
}

impl Layout {
    /// 64 px on views at least 256 px wide; a quarter of the width on small
    /// views, but never less than one pixel per cell.
    pub fn for_view(width: u32, floor: &Floor) -> Self {
        let w = width as f64;
        let (size, margin) = if w >= 256.0 {
            (FULL_SIZE, FULL_MARGIN)
        } else {
            let size = (w / 4.0).max(floor.width.max(floor.height) as f64).min(w);
            (size, (size * FULL_MARGIN / FULL_SIZE).floor())
        };
        let margin = margin.min((w - size).max(0.0));
        Self {
            x: (w - margin - size).max(0.0),
            y: margin,
            size,
            cell_w: size / floor.width.max(1) as f64,
            cell_h: size / floor.height.max(1) as f64,
        }
    }

    pub fn cell_origin(&self, x: usize, y: usize) -> (f64, f64) {
        (self.x + x as f64 * self.cell_w, self.y + y as f64 * self.cell_h)
    }

    pub fn cell_centre(&self, x: i32, y: i32) -> Point {
        Point::new(
            self.x + (x as f64 + 0.5) * self.cell_w,
            self.y + (y as f64 + 0.5) * self.cell_h,
        )
    }
}

pub fn paint(img: &mut RgbImage, pose: &Pose, floor: &Floor) {
    let layout = Layout::for_view(img.width(), floor);
    let pad = if layout.size >= FULL_SIZE { PADDING } else { 0.0 };
    raster::fill_rect(
        img,
        layout.x - pad,
        layout.y - pad,
        layout.x + layout.size + pad,
        layout.y + layout.size + pad,
        BLACK,
        BACKDROP_ALPHA,
    );

    // Gap between cells only once they are big enough to show it.
    let gap = if layout.cell_w.min(layout.cell_h) >= 3.0 { 0.5 } else { 0.0 };
    for y in 0..floor.height {
        for x in 0..floor.width {
            let (color, alpha) = match tone(floor, x as i32, y as i32) {
                Tone::Hidden => (FOG, 1.0),
                Tone::Wall => (PRIMARY, 1.0),
                Tone::Stairs => (ACCENT, 1.0),
                Tone::Path => (WHITE, PATH_ALPHA),
            };
            let (cx, cy) = layout.cell_origin(x, y);
            raster::fill_rect(
                img,
                cx,
                cy,
                cx + layout.cell_w - gap,
                cy + layout.cell_h - gap,
                color,
                alpha,
            );
        }
    }

    paint_marker(img, &layout, pose);
}

fn paint_marker(img: &mut RgbImage, layout: &Layout, pose: &Pose) {
    let cell = layout.cell_w.min(layout.cell_h);
    if cell < 3.0 {
        // Too small for a triangle: light the whole cell.
        let (x, y) = layout.cell_origin(pose.x.max(0) as usize, pose.y.max(0) as usize);
        raster::fill_rect(img, x, y, x + layout.cell_w, y + layout.cell_h, WHITE, 1.0);
        return;
    }

    let centre = layout.cell_centre(pose.x, pose.y);
    let r = 0.45 * cell;
    let (fx, fy) = pose.facing.forward();
    let (rx, ry) = pose.facing.right();
    let (fx, fy, rx, ry) = (fx as f64, fy as f64, rx as f64, ry as f64);

    let tip = Point::new(centre.x + fx * r, centre.y + fy * r);
    let back = Point::new(centre.x - fx * r * 0.5, centre.y - fy * r * 0.5);
    let left = Point::new(back.x - rx * r * 0.8, back.y - ry * r * 0.8);
    let right = Point::new(back.x + rx * r * 0.8, back.y + ry * r * 0.8);
    raster::fill_polygon(img, &[tip, right, left], WHITE, 1.0);
}
