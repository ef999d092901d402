//! Raster plumbing shared by the static plots.
//!
//! Plots are drawn with `imageproc::drawing` on a [`Blend`] wrapped RGBA buffer, so that
//! translucent colors are alpha-composited over what is already there. The finished
//! canvas is flattened to RGB and PNG-encoded in memory; nothing touches the disk before
//! every artifact of a run exists.
use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::Blend;

use crate::gaia3d_errors::Gaia3dError;

pub const BACKGROUND: Rgba<u8> = Rgba([12, 14, 24, 255]);
pub const FOREGROUND: Rgba<u8> = Rgba([230, 230, 230, 255]);
pub const AXIS_X: Rgba<u8> = Rgba([220, 80, 70, 255]);
pub const AXIS_Y: Rgba<u8> = Rgba([90, 200, 110, 255]);
pub const AXIS_Z: Rgba<u8> = Rgba([90, 140, 230, 255]);
pub const GRID: Rgba<u8> = Rgba([60, 64, 80, 255]);

/// Drawing target of every plot.
pub type PlotCanvas = Blend<RgbaImage>;

/// Opaque canvas filled with [`BACKGROUND`].
pub fn blank_canvas(width: u32, height: u32) -> PlotCanvas {
    Blend(RgbaImage::from_pixel(width, height, BACKGROUND))
}

/// `color` with its opacity replaced by `alpha` in `[0, 1]`.
pub fn with_alpha(color: Rgba<u8>, alpha: f64) -> Rgba<u8> {
    let Rgba([r, g, b, _]) = color;
    Rgba([r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8])
}

/// Flatten the canvas to RGB and encode it as PNG in memory.
pub fn encode_png(canvas: PlotCanvas) -> Result<Vec<u8>, Gaia3dError> {
    let rgb = DynamicImage::ImageRgba8(canvas.0).into_rgb8();
    let mut bytes = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Affine map from a data rectangle to pixel space, `y` pointing up in data space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scale: f64,
    data_center: (f64, f64),
    pixel_center: (f64, f64),
}

impl Viewport {
    /// Fit `[x_min, x_max] × [y_min, y_max]` into a `width × height` canvas with `margin`
    /// pixels on each side, using the same scale on both axes.
    pub fn fit_equal(
        (x_min, x_max): (f64, f64),
        (y_min, y_max): (f64, f64),
        width: u32,
        height: u32,
        margin: u32,
    ) -> Self {
        let usable_w = (width.saturating_sub(2 * margin)).max(1) as f64;
        let usable_h = (height.saturating_sub(2 * margin)).max(1) as f64;
        let span_x = (x_max - x_min).abs().max(f64::EPSILON);
        let span_y = (y_max - y_min).abs().max(f64::EPSILON);

        Viewport {
            scale: (usable_w / span_x).min(usable_h / span_y),
            data_center: ((x_min + x_max) / 2.0, (y_min + y_max) / 2.0),
            pixel_center: (width as f64 / 2.0, height as f64 / 2.0),
        }
    }

    pub fn to_pixel(&self, x: f64, y: f64) -> (f32, f32) {
        (
            (self.pixel_center.0 + (x - self.data_center.0) * self.scale) as f32,
            (self.pixel_center.1 - (y - self.data_center.1) * self.scale) as f32,
        )
    }
}
