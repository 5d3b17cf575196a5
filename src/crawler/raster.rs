//! Pixel primitives over `RgbImage`: scanline polygon fill, rects, strokes.
//!
//! Sampling is at pixel centres, so a shape covers pixel `(px, py)` when
//! `(px + 0.5, py + 0.5)` falls inside it. Alpha is blended in place.

use image::{Rgb, RgbImage};

use super::projector::{Point, Quad};

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Multiply every channel by `factor`, clamped.
pub fn shade(color: Rgb<u8>, factor: f64) -> Rgb<u8> {
    let f = factor.clamp(0.0, 1.0);
    let Rgb([r, g, b]) = color;
    Rgb([
        (r as f64 * f).round() as u8,
        (g as f64 * f).round() as u8,
        (b as f64 * f).round() as u8,
    ])
}

pub fn blend(dst: &mut Rgb<u8>, src: Rgb<u8>, alpha: f64) {
    if alpha >= 1.0 {
        *dst = src;
        return;
    }
    if alpha <= 0.0 {
        return;
    }
    for i in 0..3 {
        let mixed = dst.0[i] as f64 * (1.0 - alpha) + src.0[i] as f64 * alpha;
        dst.0[i] = mixed.round().clamp(0.0, 255.0) as u8;
    }
}

pub fn fill(img: &mut RgbImage, color: Rgb<u8>) {
    for pixel in img.pixels_mut() {
        *pixel = color;
    }
}

/// Pixel index range whose centres fall in `[lo, hi)`, clipped to `0..limit`.
fn span(lo: f64, hi: f64, limit: u32) -> std::ops::Range<u32> {
    let start = (lo - 0.5).ceil().max(0.0);
    let end = (hi - 0.5).ceil().min(limit as f64);
    if end <= start {
        return 0..0;
    }
    start as u32..end as u32
}

pub fn fill_rect(img: &mut RgbImage, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb<u8>, alpha: f64) {
    let (w, h) = img.dimensions();
    for py in span(y0, y1, h) {
        for px in span(x0, x1, w) {
            blend(img.get_pixel_mut(px, py), color, alpha);
        }
    }
}

/// Even-odd scanline fill. Works for any simple polygon; faces are convex.
pub fn fill_polygon(img: &mut RgbImage, points: &[Point], color: Rgb<u8>, alpha: f64) {
    if points.len() < 3 {
        return;
    }
    let (w, h) = img.dimensions();
    let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

    let mut crossings: Vec<f64> = Vec::with_capacity(points.len());
    for py in span(min_y, max_y, h) {
        let yc = py as f64 + 0.5;
        crossings.clear();
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            // Half-open on y so shared vertices count once.
            if (a.y <= yc && b.y > yc) || (b.y <= yc && a.y > yc) {
                let t = (yc - a.y) / (b.y - a.y);
                crossings.push(a.x + t * (b.x - a.x));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for pair in crossings.chunks_exact(2) {
            for px in span(pair[0], pair[1], w) {
                blend(img.get_pixel_mut(px, py), color, alpha);
            }
        }
    }
}

pub fn fill_quad(img: &mut RgbImage, quad: &Quad, color: Rgb<u8>, alpha: f64) {
    fill_polygon(img, &quad.corners, color, alpha);
}

/// Thick line as a filled quad around the segment.
pub fn stroke_segment(img: &mut RgbImage, a: Point, b: Point, width: f64, color: Rgb<u8>, alpha: f64) {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return;
    }
    let (nx, ny) = (-dy / len * width / 2.0, dx / len * width / 2.0);
    fill_polygon(
        img,
        &[
            Point::new(a.x + nx, a.y + ny),
            Point::new(b.x + nx, b.y + ny),
            Point::new(b.x - nx, b.y - ny),
            Point::new(a.x - nx, a.y - ny),
        ],
        color,
        alpha,
    );
}

/// Outline of an axis-aligned rect, `width` px thick, centred on its edges.
#[allow(clippy::too_many_arguments)]
pub fn stroke_rect(img: &mut RgbImage, x0: f64, y0: f64, x1: f64, y1: f64, width: f64, color: Rgb<u8>, alpha: f64) {
    let half = width / 2.0;
    fill_rect(img, x0 - half, y0 - half, x1 + half, y0 + half, color, alpha);
    fill_rect(img, x0 - half, y1 - half, x1 + half, y1 + half, color, alpha);
    fill_rect(img, x0 - half, y0 + half, x0 + half, y1 - half, color, alpha);
    fill_rect(img, x1 - half, y0 + half, x1 + half, y1 - half, color, alpha);
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    fn count(img: &RgbImage, color: Rgb<u8>) -> usize {
        img.pixels().filter(|&&p| p == color).count()
    }

    #[test]
    fn shade_scales_and_clamps() {
        assert_eq!(shade(Rgb([200, 100, 50]), 0.5), Rgb([100, 50, 25]));
        assert_eq!(shade(Rgb([200, 100, 50]), -1.0), BLACK);
        assert_eq!(shade(Rgb([200, 100, 50]), 2.0), Rgb([200, 100, 50]));
    }

    #[test]
    fn blend_half() {
        let mut p = BLACK;
        blend(&mut p, WHITE, 0.5);
        assert_eq!(p, Rgb([128, 128, 128]));
        blend(&mut p, RED, 0.0);
        assert_eq!(p, Rgb([128, 128, 128]));
        blend(&mut p, RED, 1.0);
        assert_eq!(p, RED);
    }

    #[test]
    fn rect_samples_pixel_centres() {
        let mut img = RgbImage::new(10, 10);
        fill_rect(&mut img, 2.0, 3.0, 5.0, 4.0, RED, 1.0);
        assert_eq!(count(&img, RED), 3);
        assert_eq!(*img.get_pixel(2, 3), RED);
        assert_eq!(*img.get_pixel(4, 3), RED);
        assert_eq!(*img.get_pixel(5, 3), BLACK);
    }

    #[test]
    fn rect_is_clipped() {
        let mut img = RgbImage::new(4, 4);
        fill_rect(&mut img, -10.0, -10.0, 100.0, 2.0, RED, 1.0);
        assert_eq!(count(&img, RED), 8);
    }

    #[test]
    fn polygon_matches_rect() {
        let mut a = RgbImage::new(20, 20);
        let mut b = RgbImage::new(20, 20);
        fill_rect(&mut a, 3.0, 4.0, 11.0, 9.0, RED, 1.0);
        fill_polygon(
            &mut b,
            &[
                Point::new(3.0, 4.0),
                Point::new(11.0, 4.0),
                Point::new(11.0, 9.0),
                Point::new(3.0, 9.0),
            ],
            RED,
            1.0,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn triangle_covers_about_half_of_bounding_box() {
        let mut img = RgbImage::new(20, 20);
        fill_polygon(
            &mut img,
            &[Point::new(0.0, 0.0), Point::new(20.0, 0.0), Point::new(0.0, 20.0)],
            RED,
            1.0,
        );
        let n = count(&img, RED);
        assert!((180..=220).contains(&n), "covered {}", n);
        assert_eq!(*img.get_pixel(1, 1), RED);
        assert_eq!(*img.get_pixel(18, 18), BLACK);
    }

    #[test]
    fn degenerate_polygon_draws_nothing() {
        let mut img = RgbImage::new(8, 8);
        fill_polygon(&mut img, &[Point::new(1.0, 1.0), Point::new(6.0, 6.0)], RED, 1.0);
        stroke_segment(&mut img, Point::new(2.0, 2.0), Point::new(2.0, 2.0), 3.0, RED, 1.0);
        assert_eq!(count(&img, RED), 0);
    }

    #[test]
    fn horizontal_stroke_has_width() {
        let mut img = RgbImage::new(20, 20);
        stroke_segment(&mut img, Point::new(2.0, 10.0), Point::new(18.0, 10.0), 2.0, RED, 1.0);
        assert_eq!(*img.get_pixel(10, 9), RED);
        assert_eq!(*img.get_pixel(10, 10), RED);
        assert_eq!(*img.get_pixel(10, 8), BLACK);
        assert_eq!(*img.get_pixel(10, 11), BLACK);
    }

    #[test]
    fn stroke_rect_leaves_inside_untouched() {
        let mut img = RgbImage::new(20, 20);
        stroke_rect(&mut img, 4.0, 4.0, 16.0, 16.0, 2.0, RED, 1.0);
        assert_eq!(*img.get_pixel(10, 10), BLACK);
        assert_eq!(*img.get_pixel(4, 10), RED);
        assert_eq!(*img.get_pixel(10, 3), RED);
    }
}
