//! # Test-particle orbit in the Milky Way
//!
//! Integrates one initial condition in a smooth analytic [`Potential`] with the
//! Dormand–Prince 8(5,3) stepper of [`ode_solvers`], then exports the trajectory as
//! `orbit.png` (x–y top view) and `orbit.csv`.
//!
//! ## State and units
//!
//! The integrated state is `(x, y, z, vx, vy, vz)` in kpc and kpc/Gyr, time in Gyr.
//! Velocities are converted back to km/s in the returned [`OrbitSample`]s.
//!
//! ## Initial condition
//!
//! The particle starts at `(R, 0, 0)` with velocity `(0, v_t, 0)`. Unless overridden,
//! `v_t` is the circular velocity of the potential at `R`, giving a circular orbit.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gaia3d::orbit::{integrate_orbit, OrbitParams};
//! use gaia3d::orbit::potential::MilkyWayPotential;
//!
//! let params = OrbitParams::builder().radius(8.0).duration(1.0).samples(200).build().unwrap();
//! let orbit = integrate_orbit(&MilkyWayPotential::mw2014(), &params).unwrap();
//! println!("final position: ({}, {})", orbit[199].x, orbit[199].y);
//! ```
pub mod potential;
pub mod trajectory_plot;

use std::f64::consts::PI;
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use nalgebra::Vector3;
use ode_solvers::dop853::Dop853;
use ode_solvers::{System, Vector6};
use serde::{Deserialize, Serialize};

use crate::constants::{Gigayear, Kiloparsec, KmPerSec, KMS_TO_KPC_GYR};
use crate::gaia3d_errors::Gaia3dError;
use potential::Potential;
use trajectory_plot::{render_orbit_png, OrbitPlotStyle};

pub const DEFAULT_ORBIT_PNG: &str = "orbit.png";
pub const DEFAULT_ORBIT_CSV: &str = "orbit.csv";

type State = Vector6<f64>;

/// One output point of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitSample {
    pub t: Gigayear,
    pub x: Kiloparsec,
    pub y: Kiloparsec,
    pub z: Kiloparsec,
    pub vx: KmPerSec,
    pub vy: KmPerSec,
    pub vz: KmPerSec,
}

impl OrbitSample {
    fn from_state(t: Gigayear, y: &State) -> Self {
        OrbitSample {
            t,
            x: y[0],
            y: y[1],
            z: y[2],
            vx: y[3] / KMS_TO_KPC_GYR,
            vy: y[4] / KMS_TO_KPC_GYR,
            vz: y[5] / KMS_TO_KPC_GYR,
        }
    }
}

/// Initial condition and integrator settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitParams {
    pub radius: Kiloparsec,
    /// `None`: circular velocity of the potential at `radius`.
    pub tangential_velocity: Option<KmPerSec>,
    pub duration: Gigayear,
    pub samples: usize,
    pub rtol: f64,
    pub atol: f64,
}

impl Default for OrbitParams {
    fn default() -> Self {
        OrbitParams {
            radius: 8.0,
            tangential_velocity: None,
            duration: 10.0,
            samples: 1000,
            rtol: 1e-10,
            atol: 1e-10,
        }
    }
}

impl OrbitParams {
    pub fn builder() -> OrbitParamsBuilder {
        OrbitParamsBuilder::default()
    }
}

impl fmt::Display for OrbitParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R = {} kpc, ", self.radius)?;
        match self.tangential_velocity {
            Some(v) => write!(f, "v_t = {v} km/s, ")?,
            None => write!(f, "v_t = v_c, ")?,
        }
        write!(
            f,
            "{} Gyr, {} samples, rtol = {:e}, atol = {:e}",
            self.duration, self.samples, self.rtol, self.atol
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrbitParamsBuilder {
    params: OrbitParams,
}

impl OrbitParamsBuilder {
    pub fn radius(mut self, v: Kiloparsec) -> Self {
        self.params.radius = v;
        self
    }
    pub fn tangential_velocity(mut self, v: Option<KmPerSec>) -> Self {
        self.params.tangential_velocity = v;
        self
    }
    pub fn duration(mut self, v: Gigayear) -> Self {
        self.params.duration = v;
        self
    }
    pub fn samples(mut self, v: usize) -> Self {
        self.params.samples = v;
        self
    }
    pub fn tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.params.rtol = rtol;
        self.params.atol = atol;
        self
    }

    /// Validation rules
    /// -----------------
    /// * `radius > 0`, `duration > 0`, finite
    /// * `samples ≥ 2`
    /// * `rtol > 0`, `atol > 0`
    /// * tangential velocity finite when given
    pub fn build(self) -> Result<OrbitParams, Gaia3dError> {
        let p = &self.params;
        if !(p.radius.is_finite() && p.radius > 0.0) {
            return Err(Gaia3dError::InvalidParameter("radius must be > 0".into()));
        }
        if !(p.duration.is_finite() && p.duration > 0.0) {
            return Err(Gaia3dError::InvalidParameter("duration must be > 0".into()));
        }
        if p.samples < 2 {
            return Err(Gaia3dError::InvalidParameter(
                "at least two samples are required".into(),
            ));
        }
        if !(p.rtol > 0.0 && p.atol > 0.0) {
            return Err(Gaia3dError::InvalidParameter(
                "tolerances must be > 0".into(),
            ));
        }
        if p.tangential_velocity.is_some_and(|v| !v.is_finite()) {
            return Err(Gaia3dError::InvalidParameter(
                "tangential velocity must be finite".into(),
            ));
        }
        Ok(self.params)
    }
}

/// Equations of motion `ẋ = v`, `v̇ = a(x)`.
struct OrbitEquations<'a, P: Potential> {
    potential: &'a P,
}

impl<P: Potential> System<f64, State> for OrbitEquations<'_, P> {
    fn system(&self, _t: f64, y: &State, dy: &mut State) {
        let acc = self.potential.acceleration(&Vector3::new(y[0], y[1], y[2]));
        dy[0] = y[3];
        dy[1] = y[4];
        dy[2] = y[5];
        dy[3] = acc.x;
        dy[4] = acc.y;
        dy[5] = acc.z;
    }
}

/// Period of the circular orbit at radius `r`, in Gyr.
pub fn circular_period(potential: &impl Potential, r: Kiloparsec) -> Gigayear {
    2.0 * PI * r / potential.circular_velocity(r)
}

/// Integrate the orbit described by `params`.
///
/// Arguments
/// ---------
/// * `potential`: the force field
/// * `params`: initial condition, duration, sampling and tolerances
///
/// Return
/// ------
/// * `params.samples` evenly spaced samples from `t = 0` to `t = duration`
/// * [`Gaia3dError::IntegrationFailure`] when the stepper gives up
pub fn integrate_orbit(
    potential: &impl Potential,
    params: &OrbitParams,
) -> Result<Vec<OrbitSample>, Gaia3dError> {
    let vt = match params.tangential_velocity {
        Some(v) => v * KMS_TO_KPC_GYR,
        None => potential.circular_velocity(params.radius),
    };
    let y0 = State::new(params.radius, 0.0, 0.0, 0.0, vt, 0.0);
    let dt = params.duration / (params.samples - 1) as f64;

    // half a sample past the end so that rounding in the output clock keeps the last sample
    let mut stepper = Dop853::new(
        OrbitEquations { potential },
        0.0,
        params.duration + 0.5 * dt,
        dt,
        y0,
        params.rtol,
        params.atol,
    );
    let stats = stepper
        .integrate()
        .map_err(|e| Gaia3dError::IntegrationFailure(format!("{e:?}")))?;
    log::debug!(
        "Dop853: {} evaluations, {} accepted / {} rejected steps",
        stats.num_eval,
        stats.accepted_steps,
        stats.rejected_steps
    );

    let mut samples: Vec<OrbitSample> = Vec::with_capacity(params.samples);
    if stepper.x_out().first().map_or(true, |t0| t0.abs() > 0.5 * dt) {
        samples.push(OrbitSample::from_state(0.0, &y0));
    }
    samples.extend(
        stepper
            .x_out()
            .iter()
            .zip(stepper.y_out())
            .map(|(t, y)| OrbitSample::from_state(*t, y)),
    );
    samples.truncate(params.samples);

    if samples.len() != params.samples {
        return Err(Gaia3dError::IntegrationFailure(format!(
            "expected {} samples, integrator produced {}",
            params.samples,
            samples.len()
        )));
    }
    if let Some(bad) = samples.iter().find(|s| !(s.x.is_finite() && s.y.is_finite() && s.z.is_finite())) {
        return Err(Gaia3dError::IntegrationFailure(format!(
            "non-finite state at t = {} Gyr",
            bad.t
        )));
    }

    log::info!("Integrated orbit ({params}) into {} samples", samples.len());
    Ok(samples)
}

/// Serialize samples as CSV, header `t,x,y,z,vx,vy,vz`.
pub fn orbit_to_csv(samples: &[OrbitSample]) -> Result<Vec<u8>, Gaia3dError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for s in samples {
        writer.serialize(s)?;
    }
    writer
        .into_inner()
        .map_err(|e| Gaia3dError::IoError(e.into_error()))
}

/// Paths written by [`export_orbit`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitArtifacts {
    pub png: Utf8PathBuf,
    pub csv: Utf8PathBuf,
}

/// Render the plot and the CSV, then write both to `output_dir`.
pub fn export_orbit(
    samples: &[OrbitSample],
    output_dir: &Utf8Path,
    style: &OrbitPlotStyle,
) -> Result<OrbitArtifacts, Gaia3dError> {
    let png = render_orbit_png(samples, style)?;
    let csv = orbit_to_csv(samples)?;

    std::fs::create_dir_all(output_dir).map_err(|source| Gaia3dError::WriteFailure {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let artifacts = OrbitArtifacts {
        png: output_dir.join(DEFAULT_ORBIT_PNG),
        csv: output_dir.join(DEFAULT_ORBIT_CSV),
    };
    for (path, bytes) in [(&artifacts.png, &png), (&artifacts.csv, &csv)] {
        std::fs::write(path, bytes).map_err(|source| Gaia3dError::WriteFailure {
            path: path.clone(),
            source,
        })?;
        log::info!("Saved {path}");
    }
    Ok(artifacts)
}
