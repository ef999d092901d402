//! # Constants and type definitions for gaia3d
//!
//! This module centralizes the **physical constants**, **unit conversions**, and
//! **type aliases** shared by the catalog pipeline and the orbit integrator.
//!
//! ## Overview
//!
//! - Angle conversions (degrees ↔ radians)
//! - Velocity/distance conversions between observational units (mas, mas/yr, km/s)
//!   and galactic dynamical units (kpc, Gyr)
//! - Unit-carrying type aliases used across the crate

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Kiloparsec in kilometers (IAU 2015 parsec)
pub const KPC_KM: f64 = 3.085_677_581_491_367_3e16;

/// Julian gigayear in seconds
pub const GYR_S: f64 = 3.155_76e16;

/// km/s → kpc/Gyr
pub const KMS_TO_KPC_GYR: f64 = GYR_S / KPC_KM;

/// Transverse velocity of 1 mas/yr at 1 kpc, in km/s (AU/yr in km/s)
pub const K_PM: f64 = 4.740_470_463_533_348;

/// Parsec → kiloparsec
pub const PC_TO_KPC: f64 = 1e-3;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Angle in milliarcseconds
pub type MilliArcSec = f64;
/// Proper motion in milliarcseconds per year
pub type MasPerYear = f64;
/// Distance in kiloparsecs
pub type Kiloparsec = f64;
/// Velocity in kilometers per second
pub type KmPerSec = f64;
/// Time in gigayears
pub type Gigayear = f64;

/// Gaia DR3 source identifier
pub type SourceId = i64;
