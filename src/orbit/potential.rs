//! # Analytic Milky Way potential
//!
//! Force fields used by the orbit integration, in physical units: positions in kpc,
//! accelerations in kpc/Gyr². Every component has an amplitude `amp` absorbing `G·M`.
//!
//! | component                   | potential / density                                          |
//! |-----------------------------|--------------------------------------------------------------|
//! | [`MiyamotoNagai`] disk      | Φ = −amp / √(R² + (a + √(z² + b²))²)                          |
//! | [`Nfw`] halo                | Φ = −amp · ln(1 + r/a) / r                                    |
//! | [`PowerSphericalCutoff`]    | ρ = amp · r^(−α) · exp(−(r/r_c)²)                             |
//!
//! [`MilkyWayPotential::mw2014`] composes the three the way Bovy (2015) `MWPotential2014`
//! does: each component contributes a fixed fraction of the radial force at `R₀ = 8 kpc`,
//! the total giving a circular velocity of 220 km/s there.
use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::constants::{Kiloparsec, KmPerSec, KMS_TO_KPC_GYR};

/// Anything able to pull a test particle.
pub trait Potential {
    /// Acceleration (kpc/Gyr²) at `pos` (kpc).
    fn acceleration(&self, pos: &Vector3<f64>) -> Vector3<f64>;

    /// Circular velocity in the midplane at radius `r`, in kpc/Gyr.
    fn circular_velocity(&self, r: Kiloparsec) -> f64 {
        let a_r = self.acceleration(&Vector3::new(r, 0.0, 0.0)).x;
        (-a_r * r).max(0.0).sqrt()
    }
}

/// Miyamoto & Nagai (1975) flattened disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiyamotoNagai {
    pub amp: f64,
    pub a: Kiloparsec,
    pub b: Kiloparsec,
}

impl MiyamotoNagai {
    pub fn potential(&self, pos: &Vector3<f64>) -> f64 {
        let zb = (pos.z * pos.z + self.b * self.b).sqrt();
        let r2 = pos.x * pos.x + pos.y * pos.y;
        -self.amp / (r2 + (self.a + zb).powi(2)).sqrt()
    }
}

impl Potential for MiyamotoNagai {
    fn acceleration(&self, pos: &Vector3<f64>) -> Vector3<f64> {
        let zb = (pos.z * pos.z + self.b * self.b).sqrt();
        let r2 = pos.x * pos.x + pos.y * pos.y;
        let d3 = (r2 + (self.a + zb).powi(2)).powf(1.5);
        -self.amp / d3 * Vector3::new(pos.x, pos.y, pos.z * (self.a + zb) / zb)
    }
}

/// Navarro, Frenk & White (1997) halo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nfw {
    pub amp: f64,
    pub a: Kiloparsec,
}

impl Nfw {
    pub fn potential(&self, pos: &Vector3<f64>) -> f64 {
        let r = pos.norm();
        if r < f64::EPSILON {
            return -self.amp / self.a;
        }
        -self.amp * (1.0 + r / self.a).ln() / r
    }
}

impl Potential for Nfw {
    fn acceleration(&self, pos: &Vector3<f64>) -> Vector3<f64> {
        let r = pos.norm();
        if r < f64::EPSILON {
            return Vector3::zeros();
        }
        let dphi_dr = self.amp * ((1.0 + r / self.a).ln() / (r * r) - 1.0 / (r * (r + self.a)));
        -dphi_dr / r * pos
    }
}

/// Spherical power-law density with a Gaussian cutoff (bulge).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSphericalCutoff {
    pub amp: f64,
    pub alpha: f64,
    pub rc: Kiloparsec,
}

impl PowerSphericalCutoff {
    /// Enclosed mass (in units of `amp`·kpc³) within `r`.
    fn enclosed_mass(&self, r: f64) -> f64 {
        let s = 1.5 - self.alpha / 2.0;
        2.0 * PI * self.rc.powf(3.0 - self.alpha) * lower_incomplete_gamma(s, (r / self.rc).powi(2))
    }
}

impl Potential for PowerSphericalCutoff {
    fn acceleration(&self, pos: &Vector3<f64>) -> Vector3<f64> {
        let r = pos.norm();
        if r < f64::EPSILON {
            return Vector3::zeros();
        }
        -self.amp * self.enclosed_mass(r) / (r * r * r) * pos
    }
}

const GAMMA_EPS: f64 = 1e-15;
const GAMMA_FPMIN: f64 = 1e-300;
const GAMMA_MAX_ITER: usize = 500;

/// ln Γ(x) for x > 0, Lanczos approximation.
pub fn ln_gamma(x: f64) -> f64 {
    const COF: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.120_865_097_386_617_9e-2,
        -0.539_523_938_495_3e-5,
    ];
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut y = x;
    let mut ser = 1.000_000_000_190_015;
    for c in COF {
        y += 1.0;
        ser += c / y;
    }
    -tmp + (2.506_628_274_631_000_5 * ser / x).ln()
}

/// Lower incomplete gamma function γ(s, x), not regularized.
///
/// Series expansion below `x = s + 1`, Lentz continued fraction for the complement above.
pub fn lower_incomplete_gamma(s: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let prefactor = (-x + s * x.ln()).exp();

    if x < s + 1.0 {
        let mut ap = s;
        let mut del = 1.0 / s;
        let mut sum = del;
        for _ in 0..GAMMA_MAX_ITER {
            ap += 1.0;
            del *= x / ap;
            sum += del;
            if del.abs() < sum.abs() * GAMMA_EPS {
                break;
            }
        }
        return sum * prefactor;
    }

    let mut b = x + 1.0 - s;
    let mut c = 1.0 / GAMMA_FPMIN;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=GAMMA_MAX_ITER {
        let an = -(i as f64) * (i as f64 - s);
        b += 2.0;
        d = an * d + b;
        if d.abs() < GAMMA_FPMIN {
            d = GAMMA_FPMIN;
        }
        c = b + an / c;
        if c.abs() < GAMMA_FPMIN {
            c = GAMMA_FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < GAMMA_EPS {
            break;
        }
    }
    ln_gamma(s).exp() - prefactor * h
}

/// Bulge + disk + halo composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MilkyWayPotential {
    pub bulge: PowerSphericalCutoff,
    pub disk: MiyamotoNagai,
    pub halo: Nfw,
}

/// Normalization radius.
pub const MW2014_R0: Kiloparsec = 8.0;
/// Circular velocity at [`MW2014_R0`].
pub const MW2014_VC: KmPerSec = 220.0;

/// Scale a unit-amplitude component so its radial force at `r0` equals `fraction · vc² / r0`.
fn normalized_amp(unit: &dyn Potential, fraction: f64, r0: Kiloparsec, vc_kpc_gyr: f64) -> f64 {
    let unit_force = -unit.acceleration(&Vector3::new(r0, 0.0, 0.0)).x;
    fraction * vc_kpc_gyr * vc_kpc_gyr / r0 / unit_force
}

impl MilkyWayPotential {
    /// `MWPotential2014`: bulge 5 %, disk 60 %, halo 35 % of the radial force at 8 kpc.
    pub fn mw2014() -> Self {
        Self::normalized(MW2014_R0, MW2014_VC, [0.05, 0.60, 0.35])
    }

    /// Same shapes as [`MilkyWayPotential::mw2014`], other normalization.
    ///
    /// Arguments
    /// ---------
    /// * `r0`: normalization radius (kpc)
    /// * `vc`: circular velocity at `r0` (km/s)
    /// * `fractions`: radial force share of bulge, disk and halo
    pub fn normalized(r0: Kiloparsec, vc: KmPerSec, [f_bulge, f_disk, f_halo]: [f64; 3]) -> Self {
        let vc = vc * KMS_TO_KPC_GYR;

        let mut bulge = PowerSphericalCutoff {
            amp: 1.0,
            alpha: 1.8,
            rc: 1.9,
        };
        let mut disk = MiyamotoNagai {
            amp: 1.0,
            a: 3.0,
            b: 0.28,
        };
        let mut halo = Nfw { amp: 1.0, a: 16.0 };

        bulge.amp = normalized_amp(&bulge, f_bulge, r0, vc);
        disk.amp = normalized_amp(&disk, f_disk, r0, vc);
        halo.amp = normalized_amp(&halo, f_halo, r0, vc);

        MilkyWayPotential { bulge, disk, halo }
    }
}

impl Potential for MilkyWayPotential {
    fn acceleration(&self, pos: &Vector3<f64>) -> Vector3<f64> {
        self.bulge.acceleration(pos) + self.disk.acceleration(pos) + self.halo.acceleration(pos)
    }
}
