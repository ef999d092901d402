use approx::assert_relative_eq;
use gaia3d::orbit::potential::{MilkyWayPotential, Potential};
use gaia3d::orbit::{circular_period, integrate_orbit, OrbitParams};

#[test]
fn test_circular_orbit_closes_after_one_period() {
    let mw = MilkyWayPotential::mw2014();
    let period = circular_period(&mw, 8.0);
    // ~ 2π · 8 kpc / 225 kpc/Gyr
    assert_relative_eq!(period, 0.2234, epsilon = 1e-3);

    let params = OrbitParams::builder()
        .radius(8.0)
        .duration(period)
        .samples(201)
        .build()
        .unwrap();
    let orbit = integrate_orbit(&mw, &params).unwrap();

    let (start, end) = (orbit[0], orbit[orbit.len() - 1]);
    assert_relative_eq!(end.t, period, max_relative = 1e-9);
    assert_relative_eq!(end.x, start.x, epsilon = 1e-6);
    assert_relative_eq!(end.y, start.y, epsilon = 1e-6);

    // half a period later the particle is on the other side
    assert_relative_eq!(orbit[100].x, -8.0, epsilon = 1e-6);
}

#[test]
fn test_orbit_is_deterministic() {
    let mw = MilkyWayPotential::mw2014();
    let params = OrbitParams::builder()
        .tangential_velocity(Some(180.0))
        .duration(0.5)
        .samples(50)
        .build()
        .unwrap();
    let a = integrate_orbit(&mw, &params).unwrap();
    let b = integrate_orbit(&mw, &params).unwrap();
    assert_eq!(a, b);

    // sub-circular start: the particle falls inward
    assert!(a.iter().any(|s| (s.x * s.x + s.y * s.y).sqrt() < 7.0));
}

#[test]
fn test_flat_rotation_curve_region() {
    let mw = MilkyWayPotential::mw2014();
    let kms = gaia3d::constants::KMS_TO_KPC_GYR;
    for r in [6.0, 8.0, 10.0, 12.0] {
        let vc = mw.circular_velocity(r) / kms;
        assert!((190.0..240.0).contains(&vc), "v_c({r}) = {vc}");
    }
}
