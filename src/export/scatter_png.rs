//! Static 3-D scatter of the galactocentric point cloud.
//!
//! Orthographic projection with a fixed camera (azimuth −60°, elevation 30°). Each axis
//! is rescaled to its own data range, so the point cloud fills a cube whose wireframe is
//! drawn behind the points, together with an x/y/z triad (red/green/blue) on the corner
//! at the axes' minima.
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use itertools::{Itertools, MinMaxResult};
use nalgebra::Vector3;

use crate::constants::{Degree, RADEG};
use crate::galactocentric::GalactocentricPoint;
use crate::gaia3d_errors::Gaia3dError;
use crate::raster::{
    blank_canvas, encode_png, with_alpha, PlotCanvas, AXIS_X, AXIS_Y, AXIS_Z, FOREGROUND, GRID,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterStyle {
    pub width: u32,
    pub height: u32,
    pub azimuth: Degree,
    pub elevation: Degree,
    pub point_radius: i32,
    pub point_alpha: f64,
}

impl Default for ScatterStyle {
    fn default() -> Self {
        ScatterStyle {
            width: 1000,
            height: 800,
            azimuth: -60.0,
            elevation: 30.0,
            point_radius: 1,
            point_alpha: 0.5,
        }
    }
}

/// Padded `(min, max)` of one coordinate.
fn axis_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = match values.minmax() {
        MinMaxResult::NoElements => (-1.0, 1.0),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };
    let pad = ((hi - lo) * 0.05).max(1e-3);
    (lo - pad, hi + pad)
}

struct Camera {
    right: Vector3<f64>,
    up: Vector3<f64>,
    ranges: [(f64, f64); 3],
    scale: f64,
    center: (f64, f64),
}

impl Camera {
    fn new(points: &[GalactocentricPoint], style: &ScatterStyle) -> Self {
        let (sa, ca) = (style.azimuth * RADEG).sin_cos();
        let (se, ce) = (style.elevation * RADEG).sin_cos();

        Camera {
            right: Vector3::new(-sa, ca, 0.0),
            up: Vector3::new(-se * ca, -se * sa, ce),
            ranges: [
                axis_range(points.iter().map(|p| p.x)),
                axis_range(points.iter().map(|p| p.y)),
                axis_range(points.iter().map(|p| p.z)),
            ],
            // the unit cube's projection fits within a radius of sqrt(3)
            scale: 0.5 * style.width.min(style.height) as f64 / 3f64.sqrt() * 0.95,
            center: (style.width as f64 / 2.0, style.height as f64 / 2.0),
        }
    }

    /// Map data coordinates to the unit cube `[-1, 1]³`.
    fn normalize(&self, p: Vector3<f64>) -> Vector3<f64> {
        let n = |v: f64, (lo, hi): (f64, f64)| 2.0 * (v - lo) / (hi - lo) - 1.0;
        Vector3::new(
            n(p.x, self.ranges[0]),
            n(p.y, self.ranges[1]),
            n(p.z, self.ranges[2]),
        )
    }

    fn project_unit(&self, u: Vector3<f64>) -> (f64, f64) {
        (
            self.center.0 + u.dot(&self.right) * self.scale,
            self.center.1 - u.dot(&self.up) * self.scale,
        )
    }

    fn project(&self, p: Vector3<f64>) -> (f64, f64) {
        self.project_unit(self.normalize(p))
    }

    fn segment_end(&self, u: Vector3<f64>) -> (f32, f32) {
        let (px, py) = self.project_unit(u);
        (px as f32, py as f32)
    }
}

fn draw_frame(canvas: &mut PlotCanvas, camera: &Camera) {
    let corners: Vec<Vector3<f64>> = (0..8)
        .map(|i| {
            Vector3::new(
                if i & 1 == 0 { -1.0 } else { 1.0 },
                if i & 2 == 0 { -1.0 } else { 1.0 },
                if i & 4 == 0 { -1.0 } else { 1.0 },
            )
        })
        .collect();

    for (i, j) in (0..8usize).tuple_combinations() {
        // cube edges join corners differing in exactly one coordinate
        if (i ^ j).count_ones() == 1 {
            draw_line_segment_mut(
                canvas,
                camera.segment_end(corners[i]),
                camera.segment_end(corners[j]),
                GRID,
            );
        }
    }

    let origin = corners[0];
    for (axis, color) in [(Vector3::x(), AXIS_X), (Vector3::y(), AXIS_Y), (Vector3::z(), AXIS_Z)] {
        draw_line_segment_mut(
            canvas,
            camera.segment_end(origin),
            camera.segment_end(origin + axis * 0.6),
            color,
        );
    }
}

/// Render the scatter plot as PNG bytes.
pub fn render_scatter_png(
    points: &[GalactocentricPoint],
    style: &ScatterStyle,
) -> Result<Vec<u8>, Gaia3dError> {
    if style.width == 0 || style.height == 0 {
        return Err(Gaia3dError::InvalidParameter(
            "image dimensions must be non-zero".into(),
        ));
    }

    let mut canvas = blank_canvas(style.width, style.height);
    let camera = Camera::new(points, style);
    let point_color = with_alpha(FOREGROUND, style.point_alpha);

    draw_frame(&mut canvas, &camera);
    for p in points {
        let (px, py) = camera.project(p.position());
        draw_filled_circle_mut(
            &mut canvas,
            (px.round() as i32, py.round() as i32),
            style.point_radius,
            point_color,
        );
    }

    encode_png(canvas)
}
