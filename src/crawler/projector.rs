//! Perspective divide for the first-person view.
//!
//! A view-space point at forward depth `d` and lateral offset `s` (cells,
//! positive to the right) lands at
//!
//! ```text
//! x = W/2 + s · W · fov / max(ε, d)
//! y = H/2 ± H · fov / max(ε, d) / 2
//! ```
//!
//! Walls are one cell tall, so the vertical extent is symmetric about the
//! horizon.

/// Floor for the perspective divide.
pub const DEPTH_EPSILON: f64 = 0.01;

/// Near edge of the slice the player stands in.
pub const NEAR_PLANE: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraParams {
    pub fov_scale: f64,
    /// Number of forward slices drawn.
    pub max_depth: u32,
    /// Raster size in pixels.
    pub width: u32,
    pub height: u32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            fov_scale: 0.8,
            max_depth: 6,
            width: 400,
            height: 300,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Convex screen-space quad, corners in drawing order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub corners: [Point; 4],
}

impl Quad {
    /// Grow horizontally by `px` on each side. Hides seams between
    /// adjacent front faces.
    pub fn widen(mut self, px: f64) -> Self {
        let cx = self.corners.iter().map(|p| p.x).sum::<f64>() / 4.0;
        for p in &mut self.corners {
            if p.x < cx {
                p.x -= px;
            } else {
                p.x += px;
            }
        }
        self
    }

    /// `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        )
    }

    #[cfg(test)]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (x0, y0, x1, y1) = self.bounds();
        if x < x0 || x > x1 || y < y0 || y > y1 {
            return false;
        }
        // Same side of every edge (either winding).
        let mut sign = 0.0;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % 4];
            let cross = (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x);
            if cross == 0.0 {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Projector {
    camera: CameraParams,
}

impl Projector {
    pub fn new(camera: CameraParams) -> Self {
        Self { camera }
    }

    fn scale(&self, d: f64) -> f64 {
        self.camera.fov_scale / d.max(DEPTH_EPSILON)
    }

    pub fn screen_x(&self, d: f64, s: f64) -> f64 {
        let w = self.camera.width as f64;
        w / 2.0 + s * w * self.scale(d)
    }

    fn half_extent(&self, d: f64) -> f64 {
        self.camera.height as f64 * self.scale(d) / 2.0
    }

    pub fn screen_top(&self, d: f64) -> f64 {
        self.camera.height as f64 / 2.0 - self.half_extent(d)
    }

    pub fn screen_bottom(&self, d: f64) -> f64 {
        self.camera.height as f64 / 2.0 + self.half_extent(d)
    }

    /// Near edge of slice `d`; the player's own slice starts at the near plane.
    pub fn near_depth(d: u32) -> f64 {
        if d == 0 {
            NEAR_PLANE
        } else {
            d as f64
        }
    }

    /// Face seen head-on at depth `far`, spanning lateral `[s - 0.5, s + 0.5]`.
    pub fn front_face(&self, far: f64, s: f64) -> Quad {
        let left = self.screen_x(far, s - 0.5);
        let right = self.screen_x(far, s + 0.5);
        let (top, bottom) = (self.screen_top(far), self.screen_bottom(far));
        Quad {
            corners: [
                Point::new(left, top),
                Point::new(right, top),
                Point::new(right, bottom),
                Point::new(left, bottom),
            ],
        }
    }

    /// Face running from `near` to `far` along lateral line `edge` (±0.5).
    pub fn side_face(&self, near: f64, far: f64, edge: f64) -> Quad {
        let xn = self.screen_x(near, edge);
        let xf = self.screen_x(far, edge);
        Quad {
            corners: [
                Point::new(xn, self.screen_top(near)),
                Point::new(xf, self.screen_top(far)),
                Point::new(xf, self.screen_bottom(far)),
                Point::new(xn, self.screen_bottom(near)),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector() -> Projector {
        Projector::new(CameraParams::default())
    }

    #[test]
    fn centre_line_is_screen_centre() {
        let p = projector();
        for d in [0.05, 1.0, 3.0, 6.0] {
            assert!((p.screen_x(d, 0.0) - 200.0).abs() < 1e-9);
        }
    }

    #[test]
    fn known_values_at_depth_one() {
        let p = projector();
        // 400 * 0.8 = 320 px per lateral cell at d = 1
        assert!((p.screen_x(1.0, 0.5) - 360.0).abs() < 1e-9);
        assert!((p.screen_x(1.0, -0.5) - 40.0).abs() < 1e-9);
        // vertical extent 300 * 0.8 = 240, centred on 150
        assert!((p.screen_top(1.0) - 30.0).abs() < 1e-9);
        assert!((p.screen_bottom(1.0) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_depth_is_clamped() {
        let p = projector();
        let clamped = p.screen_x(DEPTH_EPSILON, 1.0);
        assert_eq!(p.screen_x(0.0, 1.0), clamped);
        assert_eq!(p.screen_x(-3.0, 1.0), clamped);
        assert!(clamped.is_finite());
        assert!(p.screen_top(0.0).is_finite());
    }

    #[test]
    fn near_depth_uses_near_plane() {
        assert_eq!(Projector::near_depth(0), NEAR_PLANE);
        assert_eq!(Projector::near_depth(3), 3.0);
    }

    #[test]
    fn front_face_spans_half_cells() {
        let p = projector();
        let q = p.front_face(2.0, 0.0);
        let (x0, y0, x1, y1) = q.bounds();
        assert!((x0 - p.screen_x(2.0, -0.5)).abs() < 1e-9);
        assert!((x1 - p.screen_x(2.0, 0.5)).abs() < 1e-9);
        assert!((y0 - p.screen_top(2.0)).abs() < 1e-9);
        assert!((y1 - p.screen_bottom(2.0)).abs() < 1e-9);
    }

    #[test]
    fn widen_grows_both_sides() {
        let q = projector().front_face(2.0, 0.0);
        let (x0, _, x1, _) = q.bounds();
        let (wx0, _, wx1, _) = q.widen(1.0).bounds();
        assert!((x0 - wx0 - 1.0).abs() < 1e-9);
        assert!((wx1 - x1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn side_face_is_trapezoid_toward_horizon() {
        let p = projector();
        let q = p.side_face(1.0, 2.0, -0.5);
        let [near_top, far_top, far_bottom, near_bottom] = q.corners;
        assert!(near_top.x < far_top.x);
        assert!(near_bottom.y - near_top.y > far_bottom.y - far_top.y);
        assert!(q.contains((near_top.x + far_top.x) / 2.0, 150.0));
        assert!(!q.contains(200.0, 150.0));
    }

    #[test]
    fn quad_contains_either_winding() {
        let q = Quad {
            corners: [
                Point::new(0.0, 0.0),
                Point::new(0.0, 10.0),
                Point::new(10.0, 10.0),
                Point::new(10.0, 0.0),
            ],
        };
        assert!(q.contains(5.0, 5.0));
        assert!(!q.contains(11.0, 5.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_extent_shrinks_with_depth(
                s in prop_oneof![-3.0f64..-0.01, 0.01f64..3.0],
                d1 in DEPTH_EPSILON..6.0f64,
                step in 0.001f64..3.0,
            ) {
                let p = Projector::new(CameraParams::default());
                let d2 = d1 + step;
                let off1 = (p.screen_x(d1, s) - 200.0).abs();
                let off2 = (p.screen_x(d2, s) - 200.0).abs();
                prop_assert!(off2 < off1);
                prop_assert!(p.screen_bottom(d2) - p.screen_top(d2) < p.screen_bottom(d1) - p.screen_top(d1));
            }

            #[test]
            fn prop_screen_x_is_linear_in_lateral(
                d in DEPTH_EPSILON..6.0f64,
                a in -3.0f64..3.0,
                b in -3.0f64..3.0,
            ) {
                let p = Projector::new(CameraParams::default());
                let c = 200.0;
                let sum = p.screen_x(d, a + b) - c;
                let parts = (p.screen_x(d, a) - c) + (p.screen_x(d, b) - c);
                prop_assert!((sum - parts).abs() < 1e-6 * (1.0 + sum.abs()));
            }
        }
    }
}
