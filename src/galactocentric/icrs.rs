use nalgebra::Vector3;

use crate::catalog::StarRecord;
use crate::constants::{Degree, K_PM, RADEG};

/// Unit vectors of the local spherical basis at (α, δ): radial, east, north.
///
/// ```text
/// r̂ = ( cosδ cosα,  cosδ sinα, sinδ)
/// α̂ = (-sinα,       cosα,      0   )
/// δ̂ = (-sinδ cosα, -sinδ sinα, cosδ)
/// ```
pub fn local_basis(ra: Degree, dec: Degree) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
    let (sa, ca) = (ra * RADEG).sin_cos();
    let (sd, cd) = (dec * RADEG).sin_cos();

    let r_hat = Vector3::new(cd * ca, cd * sa, sd);
    let ra_hat = Vector3::new(-sa, ca, 0.0);
    let dec_hat = Vector3::new(-sd * ca, -sd * sa, cd);
    (r_hat, ra_hat, dec_hat)
}

/// Barycentric ICRS Cartesian state of a star.
///
/// Return
/// ------
/// * position in kpc
/// * velocity in km/s, from the radial velocity and the proper motions scaled by the distance
pub fn icrs_state(star: &StarRecord) -> (Vector3<f64>, Vector3<f64>) {
    let distance = star.distance_kpc();
    let (r_hat, ra_hat, dec_hat) = local_basis(star.ra, star.dec);

    let position = r_hat * distance;
    let velocity = r_hat * star.radial_velocity
        + ra_hat * (K_PM * star.pmra * distance)
        + dec_hat * (K_PM * star.pmdec * distance);

    (position, velocity)
}

#[cfg(test)]
mod icrs_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_local_basis_is_orthonormal() {
        let (r, a, d) = local_basis(123.4, -56.7);
        assert_relative_eq!(r.norm(), 1.0, epsilon = 1e-15);
        assert_relative_eq!(a.norm(), 1.0, epsilon = 1e-15);
        assert_relative_eq!(d.norm(), 1.0, epsilon = 1e-15);
        assert_relative_eq!(r.dot(&a), 0.0, epsilon = 1e-15);
        assert_relative_eq!(r.dot(&d), 0.0, epsilon = 1e-15);
        // right-handed: east × north = radial
        assert_relative_eq!(a.cross(&d), r, epsilon = 1e-15);
    }

    #[test]
    fn test_icrs_state_transverse_speed() {
        let star = StarRecord {
            source_id: 7,
            ra: 0.0,
            dec: 0.0,
            parallax: 0.5,
            pmra: 10.0,
            pmdec: 0.0,
            radial_velocity: 30.0,
        };
        let (pos, vel) = icrs_state(&star);
        assert_relative_eq!(pos, Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-15);
        // 10 mas/yr at 2 kpc
        assert_relative_eq!(vel.y, K_PM * 20.0, epsilon = 1e-12);
        assert_relative_eq!(vel.x, 30.0, epsilon = 1e-12);
        assert_relative_eq!(vel.z, 0.0, epsilon = 1e-12);
    }
}
