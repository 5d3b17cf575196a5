//! First-person dungeon view, painted back to front into an `RgbImage`.
//!
//! For each depth slice `d` (far to near) the three cells one step past the
//! slice become front faces and the two cells beside the slice become side
//! faces. Later (nearer) faces overwrite earlier ones, so no depth buffer is
//! needed. Light falls off linearly with depth.

use image::{Rgb, RgbImage};

use super::minimap;
use super::projector::{CameraParams, Point, Projector, Quad};
use super::raster::{self, BLACK, WHITE};
use super::state::{Cell, Floor, Pose};

/// #2C3E50
pub const SKY: Rgb<u8> = Rgb([0x2C, 0x3E, 0x50]);
/// #9C8F84
pub const GROUND: Rgb<u8> = Rgb([0x9C, 0x8F, 0x84]);
pub const WALL: Rgb<u8> = Rgb([176, 162, 149]);
pub const STAIRS: Rgb<u8> = Rgb([140, 130, 120]);

pub const FRONT_SHADE: f64 = 0.9;
pub const SIDE_SHADE: f64 = 1.0;

const STAIR_STEPS: u32 = 6;
/// Share of the face the opening is inset by at the sides and top.
const OPENING_INSET: f64 = 0.1;
/// Treads climb from the floor line up this share of the face height.
const TREAD_SPAN: f64 = 0.6;
const OPENING: Rgb<u8> = Rgb([20, 15, 15]);
const STEP_HIGHLIGHT: Rgb<u8> = Rgb([200, 190, 180]);
const ARCH: Rgb<u8> = Rgb([60, 50, 45]);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceKind {
    Front,
    Left,
    Right,
}

/// One visible non-path surface, ready to paint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Face {
    pub kind: FaceKind,
    /// Slice the face belongs to (0 = the player's own slice).
    pub depth: u32,
    pub lateral: i32,
    pub cell: Cell,
    pub quad: Quad,
    pub light: f64,
}

impl Face {
    pub fn color(&self) -> Rgb<u8> {
        let base = if self.cell == Cell::Stairs { STAIRS } else { WALL };
        let factor = match self.kind {
            FaceKind::Front => FRONT_SHADE,
            FaceKind::Left | FaceKind::Right => SIDE_SHADE,
        };
        raster::shade(base, self.light * factor)
    }
}

pub fn light_at(depth: u32, max_depth: u32) -> f64 {
    (1.0 - depth as f64 / max_depth.max(1) as f64).max(0.0)
}

/// Every non-path face in painting order (farthest slice first).
pub fn plan_faces(pose: &Pose, floor: &Floor, camera: &CameraParams) -> Vec<Face> {
    let projector = Projector::new(*camera);
    let mut faces = Vec::new();

    for d in (0..=camera.max_depth).rev() {
        let near = Projector::near_depth(d);
        let far = d as f64 + 1.0;
        let light = light_at(d, camera.max_depth);
        let depth = d as i32;

        for lateral in [-1, 0, 1] {
            let (x, y) = pose.view_cell(depth + 1, lateral);
            let cell = floor.cell_at(x, y);
            if cell == Cell::Path {
                continue;
            }
            faces.push(Face {
                kind: FaceKind::Front,
                depth: d,
                lateral,
                cell,
                quad: projector.front_face(far, lateral as f64).widen(1.0),
                light,
            });
        }

        for (lateral, kind) in [(-1, FaceKind::Left), (1, FaceKind::Right)] {
            let (x, y) = pose.view_cell(depth, lateral);
            let cell = floor.cell_at(x, y);
            if cell == Cell::Path {
                continue;
            }
            faces.push(Face {
                kind,
                depth: d,
                lateral,
                cell,
                quad: projector.side_face(near, far, lateral as f64 * 0.5),
                light,
            });
        }
    }
    faces
}

pub fn render(pose: &Pose, floor: &Floor, camera: &CameraParams) -> RgbImage {
    let mut img = RgbImage::new(camera.width, camera.height);
    paint_background(&mut img);

    for face in plan_faces(pose, floor, camera) {
        raster::fill_quad(&mut img, &face.quad, face.color(), 1.0);
        if face.cell == Cell::Stairs {
            paint_stairs(&mut img, &face);
        }
    }

    apply_vignette(&mut img);
    minimap::paint(&mut img, pose, floor);
    img
}

fn paint_background(img: &mut RgbImage) {
    let (w, h) = img.dimensions();
    raster::fill(img, SKY);
    raster::fill_rect(img, 0.0, h as f64 / 2.0, w as f64, h as f64, GROUND, 1.0);
}

fn tread_light(light: f64, step: u32) -> f64 {
    light * (0.3 + 0.7 * step as f64 / STAIR_STEPS as f64)
}

/// Height of tread edge `step` above the floor line: `bottom` at step
/// `STAIR_STEPS`, `TREAD_SPAN` of the way up toward `top` at step 0.
fn tread_y(top: f64, bottom: f64, step: u32) -> f64 {
    bottom - (bottom - top) * TREAD_SPAN * (1.0 - step as f64 / STAIR_STEPS as f64)
}

fn paint_stairs(img: &mut RgbImage, face: &Face) {
    match face.kind {
        FaceKind::Front => paint_front_stairs(img, face),
        FaceKind::Left | FaceKind::Right => paint_side_stairs(img, face),
    }
}

/// Dark opening down to the floor line, treads narrowing as they rise,
/// framed by an arch.
fn paint_front_stairs(img: &mut RgbImage, face: &Face) {
    let [tl, tr, br, bl] = face.quad.corners;
    let (w, h) = (tr.x - tl.x, bl.y - tl.y);
    let light = face.light;

    let opening = [
        Point::new(tl.x + w * OPENING_INSET, tl.y + h * OPENING_INSET),
        Point::new(tr.x - w * OPENING_INSET, tr.y + h * OPENING_INSET),
        Point::new(br.x - w * OPENING_INSET, br.y),
        Point::new(bl.x + w * OPENING_INSET, bl.y),
    ];
    raster::fill_polygon(img, &opening, OPENING, light);

    for i in 0..STAIR_STEPS {
        let step_light = tread_light(light, i);
        let y0 = tread_y(tl.y, bl.y, i);
        let y1 = tread_y(tl.y, bl.y, i + 1);
        let inset = w * (0.15 + 0.1 * i as f64 / STAIR_STEPS as f64);
        let (x0, x1) = (tl.x + inset, tr.x - inset);

        raster::fill_rect(img, x0, y0, x1, y1 + 1.0, STAIRS, step_light);
        raster::fill_rect(img, x0, y0, x1, y0 + 2.0, STEP_HIGHLIGHT, step_light * 0.5);
    }

    raster::stroke_rect(img, opening[0].x, opening[0].y, opening[1].x, bl.y, 3.0, ARCH, light);
}

/// Same staircase seen from the side: the opening and every tread follow
/// the face's slanted top and bottom edges.
fn paint_side_stairs(img: &mut RgbImage, face: &Face) {
    let [tl, tr, br, bl] = face.quad.corners;
    let light = face.light;

    let opening = [
        Point::new(tl.x, tl.y + (bl.y - tl.y) * OPENING_INSET),
        Point::new(tr.x, tr.y + (br.y - tr.y) * OPENING_INSET),
        br,
        bl,
    ];
    raster::fill_polygon(img, &opening, OPENING, light);

    for i in 0..STAIR_STEPS {
        let step_light = tread_light(light, i);
        let near_edge = Point::new(tl.x, tread_y(tl.y, bl.y, i));
        let far_edge = Point::new(tr.x, tread_y(tr.y, br.y, i));
        let tread = [
            near_edge,
            far_edge,
            Point::new(tr.x, tread_y(tr.y, br.y, i + 1)),
            Point::new(tl.x, tread_y(tl.y, bl.y, i + 1)),
        ];
        raster::fill_polygon(img, &tread, STAIRS, step_light);
        raster::stroke_segment(img, near_edge, far_edge, 1.0, WHITE, step_light * 0.3);
    }

    for (i, &a) in opening.iter().enumerate() {
        let b = opening[(i + 1) % opening.len()];
        raster::stroke_segment(img, a, b, 3.0, ARCH, light);
    }
}

/// Darken toward the edges: alpha 0 inside `W/4`, rising to 0.5 at `W/1.1`.
fn apply_vignette(img: &mut RgbImage) {
    let (w, h) = img.dimensions();
    let (cx, cy) = (w as f64 / 2.0, h as f64 / 2.0);
    let inner = w as f64 / 4.0;
    let outer = w as f64 / 1.1;
    if outer <= inner {
        return;
    }
    for (px, py, pixel) in img.enumerate_pixels_mut() {
        let dx = px as f64 + 0.5 - cx;
        let dy = py as f64 + 0.5 - cy;
        let r = (dx * dx + dy * dy).sqrt();
        if r <= inner {
            continue;
        }
        let alpha = ((r - inner) / (outer - inner)).min(1.0) * 0.5;
        raster::blend(pixel, BLACK, alpha);
    }
}
