//! # Galactocentric frame
//!
//! Conversion of cleaned catalog entries ([`StarRecord`]) into Cartesian galactocentric
//! positions and velocities ([`GalactocentricPoint`]).
//!
//! ## Convention
//!
//! The frame follows the Astropy `Galactocentric` definition with its v4.0 defaults:
//!
//! * right-handed, origin at the Galactic center,
//! * `x` points from the Sun's projection on the midplane toward the center
//!   (the Sun sits at `x ≈ −8.12 kpc`),
//! * `y` points in the direction of Galactic rotation at the Sun,
//! * `z` points toward the North Galactic Pole, the Sun being `z☉` above the midplane.
//!
//! ```text
//! R = Rx(roll₀ − roll) · Ry(−δ_gc) · Rz(α_gc)        (change-of-basis rotations)
//! H = Ry(−asin(z☉ / d☉))
//! r_gc = H·R·r_icrs − H·(d☉, 0, 0)
//! v_gc = H·R·v_icrs + v☉
//! ```
//!
//! The matrix `H·R` and the offset are computed once per frame in a [`FrameTransform`];
//! every star of a run goes through the same transform.
//!
//! ## Usage
//!
//! ```rust
//! use gaia3d::catalog::StarRecord;
//! use gaia3d::galactocentric::{GalactocentricFrame, FrameTransform};
//!
//! let transform = FrameTransform::new(&GalactocentricFrame::default());
//! let star = StarRecord {
//!     source_id: 1, ra: 266.4051, dec: -28.936175, parallax: 1.0 / 8.122,
//!     pmra: 0.0, pmdec: 0.0, radial_velocity: 0.0,
//! };
//! let point = transform.apply(&star);
//! assert!(point.x.abs() < 1e-9 && point.y.abs() < 1e-9 && point.z.abs() < 1e-9);
//! ```
pub mod icrs;
pub mod rotation;

use std::fmt;

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::catalog::StarRecord;
use crate::constants::{Degree, Kiloparsec, KmPerSec, SourceId, PC_TO_KPC, RADEG};
use crate::gaia3d_errors::Gaia3dError;
use icrs::icrs_state;
use rotation::{frame_rotation, Axis};

/// Roll angle aligning the frame's `x–z` plane with the Galactic plane when `roll = 0`.
pub const ROLL0: Degree = 58.598_632_030_6;

/// A star expressed in the galactocentric frame.
///
/// Positions in kpc, velocities in km/s. Field names and order are those of the JSON dump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GalactocentricPoint {
    pub source_id: SourceId,
    pub x: Kiloparsec,
    pub y: Kiloparsec,
    pub z: Kiloparsec,
    pub vx: KmPerSec,
    pub vy: KmPerSec,
    pub vz: KmPerSec,
}

impl GalactocentricPoint {
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::new(self.vx, self.vy, self.vz)
    }

    /// Distance to the Galactic center.
    pub fn radius(&self) -> Kiloparsec {
        self.position().norm()
    }
}

/// Parameters of the galactocentric frame.
///
/// Defaults (Astropy v4.0)
/// -----------------
/// * `galcen_ra`: 266.4051°, `galcen_dec`: −28.936175° (Sgr A*, ICRS)
/// * `galcen_distance`: 8.122 kpc
/// * `z_sun`: 20.8 pc
/// * `v_sun`: (12.9, 245.6, 7.78) km/s
/// * `roll`: 0°
#[derive(Debug, Clone, PartialEq)]
pub struct GalactocentricFrame {
    pub galcen_ra: Degree,
    pub galcen_dec: Degree,
    pub galcen_distance: Kiloparsec,
    pub z_sun: Kiloparsec,
    pub v_sun: Vector3<KmPerSec>,
    pub roll: Degree,
}

impl Default for GalactocentricFrame {
    fn default() -> Self {
        GalactocentricFrame {
            galcen_ra: 266.4051,
            galcen_dec: -28.936175,
            galcen_distance: 8.122,
            z_sun: 20.8 * PC_TO_KPC,
            v_sun: Vector3::new(12.9, 245.6, 7.78),
            roll: 0.0,
        }
    }
}

impl GalactocentricFrame {
    pub fn builder() -> GalactocentricFrameBuilder {
        GalactocentricFrameBuilder::default()
    }
}

impl fmt::Display for GalactocentricFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Galactocentric(ra={}°, dec={}°, d={} kpc, z_sun={} pc, v_sun=({}, {}, {}) km/s, roll={}°)",
            self.galcen_ra,
            self.galcen_dec,
            self.galcen_distance,
            self.z_sun / PC_TO_KPC,
            self.v_sun.x,
            self.v_sun.y,
            self.v_sun.z,
            self.roll
        )
    }
}

/// Builder for [`GalactocentricFrame`], with validation.
#[derive(Debug, Clone, Default)]
pub struct GalactocentricFrameBuilder {
    frame: GalactocentricFrame,
}

impl GalactocentricFrameBuilder {
    pub fn galcen_ra(mut self, v: Degree) -> Self {
        self.frame.galcen_ra = v;
        self
    }
    pub fn galcen_dec(mut self, v: Degree) -> Self {
        self.frame.galcen_dec = v;
        self
    }
    pub fn galcen_distance(mut self, v: Kiloparsec) -> Self {
        self.frame.galcen_distance = v;
        self
    }
    /// Solar height above the midplane, in **parsecs**.
    pub fn z_sun_pc(mut self, v: f64) -> Self {
        self.frame.z_sun = v * PC_TO_KPC;
        self
    }
    pub fn v_sun(mut self, vx: KmPerSec, vy: KmPerSec, vz: KmPerSec) -> Self {
        self.frame.v_sun = Vector3::new(vx, vy, vz);
        self
    }
    pub fn roll(mut self, v: Degree) -> Self {
        self.frame.roll = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * every value finite
    /// * `galcen_distance > 0`
    /// * `|z_sun| < galcen_distance`
    /// * `-90 ≤ galcen_dec ≤ 90`
    pub fn build(self) -> Result<GalactocentricFrame, Gaia3dError> {
        let f = &self.frame;
        let all_finite = [f.galcen_ra, f.galcen_dec, f.galcen_distance, f.z_sun, f.roll]
            .iter()
            .chain(f.v_sun.iter())
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(Gaia3dError::InvalidParameter(
                "galactocentric frame parameters must be finite".into(),
            ));
        }
        if f.galcen_distance <= 0.0 {
            return Err(Gaia3dError::InvalidParameter(
                "galcen_distance must be > 0".into(),
            ));
        }
        if f.z_sun.abs() >= f.galcen_distance {
            return Err(Gaia3dError::InvalidParameter(
                "|z_sun| must be smaller than galcen_distance".into(),
            ));
        }
        if !(-90.0..=90.0).contains(&f.galcen_dec) {
            return Err(Gaia3dError::InvalidParameter(
                "galcen_dec must lie in [-90, 90]".into(),
            ));
        }
        Ok(self.frame)
    }
}

/// Precomputed ICRS → galactocentric transform.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTransform {
    rotation: Matrix3<f64>,
    offset: Vector3<f64>,
    v_sun: Vector3<f64>,
}

impl FrameTransform {
    pub fn new(frame: &GalactocentricFrame) -> Self {
        let rot_ra = frame_rotation(frame.galcen_ra * RADEG, Axis::Z);
        let rot_dec = frame_rotation(-frame.galcen_dec * RADEG, Axis::Y);
        let rot_roll = frame_rotation((ROLL0 - frame.roll) * RADEG, Axis::X);
        let align = rot_roll * rot_dec * rot_ra;

        let tilt = frame_rotation(-(frame.z_sun / frame.galcen_distance).asin(), Axis::Y);

        FrameTransform {
            rotation: tilt * align,
            offset: -(tilt * Vector3::new(frame.galcen_distance, 0.0, 0.0)),
            v_sun: frame.v_sun,
        }
    }

    /// Galactocentric position of the Sun.
    pub fn sun_position(&self) -> Vector3<f64> {
        self.offset
    }

    /// Transform one star. Pure, deterministic.
    pub fn apply(&self, star: &StarRecord) -> GalactocentricPoint {
        let (pos_icrs, vel_icrs) = icrs_state(star);
        let pos = self.rotation * pos_icrs + self.offset;
        let vel = self.rotation * vel_icrs + self.v_sun;

        GalactocentricPoint {
            source_id: star.source_id,
            x: pos.x,
            y: pos.y,
            z: pos.z,
            vx: vel.x,
            vy: vel.y,
            vz: vel.z,
        }
    }
}

/// Transform every star with the same frame, keeping the input order.
pub fn to_galactocentric(stars: &[StarRecord], frame: &GalactocentricFrame) -> Vec<GalactocentricPoint> {
    let transform = FrameTransform::new(frame);
    log::info!("Transforming {} stars to {frame}", stars.len());
    stars.iter().map(|s| transform.apply(s)).collect()
}

#[cfg(test)]
mod galactocentric_test {
    use super::*;
    use approx::assert_relative_eq;

    fn star(ra: f64, dec: f64, parallax: f64) -> StarRecord {
        StarRecord {
            source_id: 1,
            ra,
            dec,
            parallax,
            pmra: 0.0,
            pmdec: 0.0,
            radial_velocity: 0.0,
        }
    }

    #[test]
    fn test_galactic_center_maps_to_origin() {
        let frame = GalactocentricFrame::default();
        let transform = FrameTransform::new(&frame);
        let p = transform.apply(&star(frame.galcen_ra, frame.galcen_dec, 1.0 / frame.galcen_distance));
        assert_relative_eq!(p.position(), Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn test_nearby_star_sits_at_sun() {
        let transform = FrameTransform::new(&GalactocentricFrame::default());
        // 1 AU-ish away: parallax of 1e9 mas
        let p = transform.apply(&star(10.0, 20.0, 1e9));
        let sun = transform.sun_position();
        assert_relative_eq!(p.position(), sun, epsilon = 1e-8);

        let d: f64 = 8.122;
        let z: f64 = 0.0208;
        assert_relative_eq!(sun.x, -(d * d - z * z).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(sun.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(sun.z, z, epsilon = 1e-12);
    }

    #[test]
    fn test_star_at_rest_moves_with_sun() {
        let transform = FrameTransform::new(&GalactocentricFrame::default());
        let p = transform.apply(&star(200.0, 45.0, 2.0));
        assert_relative_eq!(p.velocity(), Vector3::new(12.9, 245.6, 7.78), epsilon = 1e-10);
    }

    #[test]
    fn test_north_galactic_pole_points_up() {
        let transform = FrameTransform::new(&GalactocentricFrame::default());
        // ICRS direction of the NGP, 1 kpc away
        let p = transform.apply(&star(192.85948, 27.12825, 1.0));
        assert!(p.z > 0.99, "z = {}", p.z);
        assert!(p.y.abs() < 0.01, "y = {}", p.y);
        assert_relative_eq!(p.x, -8.12, epsilon = 0.05);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let s = StarRecord {
            source_id: 99,
            ra: 83.6,
            dec: 22.0,
            parallax: 0.7,
            pmra: 3.1,
            pmdec: -1.7,
            radial_velocity: 12.0,
        };
        let frame = GalactocentricFrame::default();
        let a = to_galactocentric(&[s], &frame);
        let b = to_galactocentric(&[s], &frame);
        assert_eq!(a, b);
        assert_eq!(a[0].source_id, 99);
    }

    #[test]
    fn test_rotation_preserves_heliocentric_distance() {
        let transform = FrameTransform::new(&GalactocentricFrame::default());
        let p = transform.apply(&star(300.0, -60.0, 0.25));
        let helio = p.position() - transform.sun_position();
        assert_relative_eq!(helio.norm(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_builder_validation() {
        assert!(GalactocentricFrame::builder()
            .galcen_distance(-1.0)
            .build()
            .is_err());
        assert!(GalactocentricFrame::builder()
            .z_sun_pc(9000.0)
            .build()
            .is_err());
        assert!(GalactocentricFrame::builder()
            .galcen_dec(95.0)
            .build()
            .is_err());
        let frame = GalactocentricFrame::builder()
            .galcen_distance(8.3)
            .z_sun_pc(27.0)
            .v_sun(11.1, 232.24, 7.25)
            .build()
            .unwrap();
        assert_relative_eq!(frame.z_sun, 0.027, epsilon = 1e-15);
    }
}
