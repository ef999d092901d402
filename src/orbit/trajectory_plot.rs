//! Top view (x–y plane) of an integrated orbit.
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use itertools::{Itertools, MinMaxResult};

use crate::gaia3d_errors::Gaia3dError;
use crate::orbit::OrbitSample;
use crate::raster::{blank_canvas, encode_png, Viewport, AXIS_X, AXIS_Y, FOREGROUND, GRID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrbitPlotStyle {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
}

impl Default for OrbitPlotStyle {
    fn default() -> Self {
        OrbitPlotStyle {
            width: 800,
            height: 800,
            margin: 40,
        }
    }
}

/// Half-width of a square centered on the Galactic center containing the whole trajectory.
fn extent(samples: &[OrbitSample]) -> f64 {
    let reach = match samples
        .iter()
        .flat_map(|s| [s.x.abs(), s.y.abs()])
        .minmax()
    {
        MinMaxResult::NoElements => 1.0,
        MinMaxResult::OneElement(v) => v,
        MinMaxResult::MinMax(_, hi) => hi,
    };
    (reach * 1.05).max(1e-3)
}

/// Render the x–y trajectory as PNG bytes, equal aspect, Galactic center in the middle.
pub fn render_orbit_png(
    samples: &[OrbitSample],
    style: &OrbitPlotStyle,
) -> Result<Vec<u8>, Gaia3dError> {
    if style.width == 0 || style.height == 0 {
        return Err(Gaia3dError::InvalidParameter(
            "image dimensions must be non-zero".into(),
        ));
    }

    let half = extent(samples);
    let viewport = Viewport::fit_equal(
        (-half, half),
        (-half, half),
        style.width,
        style.height,
        style.margin,
    );
    let mut canvas = blank_canvas(style.width, style.height);

    for (from, to) in [((-half, 0.0), (half, 0.0)), ((0.0, -half), (0.0, half))] {
        draw_line_segment_mut(
            &mut canvas,
            viewport.to_pixel(from.0, from.1),
            viewport.to_pixel(to.0, to.1),
            GRID,
        );
    }

    let path = samples
        .iter()
        .map(|s| viewport.to_pixel(s.x, s.y))
        .collect_vec();
    for (&from, &to) in path.iter().tuple_windows() {
        draw_line_segment_mut(&mut canvas, from, to, FOREGROUND);
    }

    let marker = |(x, y): (f32, f32)| (x.round() as i32, y.round() as i32);
    draw_filled_circle_mut(&mut canvas, marker(viewport.to_pixel(0.0, 0.0)), 4, AXIS_Y);
    if let Some(&start) = path.first() {
        draw_filled_circle_mut(&mut canvas, marker(start), 4, AXIS_X);
    }

    encode_png(canvas)
}
