//! Widgets shared by the crawler screens.
//!
//! - [`ClickableList`]: wrapped option list that registers its own tap targets.
//! - [`RasterView`]: an `RgbImage` drawn with half-block cells.

use image::RgbImage;
use ratzilla::ratatui::buffer::Buffer;
use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::Color;
use ratzilla::ratatui::text::Line;
use ratzilla::ratatui::widgets::{Block, Widget};

use crate::input::ClickState;

// ── ClickableList ──────────────────────────────────────────────

/// Lines for a wrapped, bordered `Paragraph`, each optionally bound to an
/// action. Targets follow the rows the lines actually land on, so inserting
/// a header above an option moves its target with it.
pub struct ClickableList<'a> {
    lines: Vec<(Line<'a>, Option<u16>)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push((line, None));
    }

    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        self.lines.push((line, Some(action_id)));
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines.into_iter().map(|(line, _)| line).collect()
    }

    /// Register one target per visual row of every clickable line, laid out
    /// inside `block` drawn over `area` with wrapping at the inner width.
    /// Rows past the bottom of the block are clipped.
    pub fn register_targets(&self, area: Rect, block: &Block, cs: &mut ClickState) {
        let inner = block.inner(area);
        if inner.width == 0 {
            return;
        }
        let width = inner.width as usize;
        let mut row = inner.y;
        for (line, action) in &self.lines {
            if row >= inner.bottom() {
                break;
            }
            let height = line.width().max(1).div_ceil(width) as u16;
            if let Some(id) = *action {
                for r in row..row.saturating_add(height) {
                    cs.add_row_target(inner, r, id);
                }
            }
            row = row.saturating_add(height);
        }
    }
}

// ── RasterView ─────────────────────────────────────────────────

/// Pixel size of the raster that exactly fills `area` with half-block cells.
pub fn raster_size(area: Rect) -> (u32, u32) {
    (area.width as u32, area.height as u32 * 2)
}

/// Draws an image with `▀`: foreground is the upper pixel, background the
/// lower one, so each terminal cell shows two vertically stacked pixels.
///
/// Pixels outside the image are left untouched; cells outside the image
/// keep whatever the buffer had.
pub struct RasterView<'a> {
    image: &'a RgbImage,
}

impl<'a> RasterView<'a> {
    pub fn new(image: &'a RgbImage) -> Self {
        Self { image }
    }
}

fn pixel_color(image: &RgbImage, x: u32, y: u32) -> Option<Color> {
    if x < image.width() && y < image.height() {
        let [r, g, b] = image.get_pixel(x, y).0;
        Some(Color::Rgb(r, g, b))
    } else {
        None
    }
}

impl Widget for RasterView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        for row in 0..area.height {
            for col in 0..area.width {
                let (px, py) = (col as u32, row as u32 * 2);
                let Some(top) = pixel_color(self.image, px, py) else {
                    continue;
                };
                let bottom = pixel_color(self.image, px, py + 1).unwrap_or(Color::Reset);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_char('\u{2580}').set_fg(top).set_bg(bottom);
                }
            }
        }
    }
}
