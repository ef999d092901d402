use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::constants::Radian;

/// Principal axis of a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Construct a right-handed 3×3 rotation matrix around one of the principal axes.
///
/// This is an **active rotation**: the vector is rotated by `alpha` in the direct
/// (counter-clockwise) sense while the frame stays fixed, `x' = R · x`.
///
/// # Arguments
///
/// * `alpha` - Rotation angle in **radians**.
/// * `axis` - Axis of rotation.
///
/// # See also
/// * [`frame_rotation`] – the passive counterpart used for changes of basis
pub fn rotmt(alpha: Radian, axis: Axis) -> Matrix3<f64> {
    let axis = match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Change-of-basis matrix for a frame rotated by `angle` around `axis`.
///
/// Expresses in the rotated frame a vector given in the original one, the
/// convention of the Astropy `rotation_matrix` helper. For `Z`:
///
/// ```text
/// |  cos a  sin a  0 |
/// | -sin a  cos a  0 |
/// |    0      0    1 |
/// ```
pub fn frame_rotation(angle: Radian, axis: Axis) -> Matrix3<f64> {
    rotmt(-angle, axis)
}
