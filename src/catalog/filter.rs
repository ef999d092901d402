//! # Row cleaning
//!
//! Turns [`RawCatalogRow`]s into [`StarRecord`]s. Rules are applied in order and the
//! first failing rule names the drop reason:
//!
//! 1. a missing identifier, position or proper motion → [`DropReason::MissingAstrometry`]
//! 2. a missing, non-finite or non-positive parallax → [`DropReason::NonPositiveParallax`]
//! 3. a parallax under `min_parallax_mas` → [`DropReason::ParallaxBelowThreshold`]
//!    (parallax inversion blows up for tiny parallaxes, so they never reach the transform)
//! 4. a missing radial velocity → [`DropReason::MissingRadialVelocity`], unless the policy
//!    is [`MissingVelocityPolicy::AssumeZero`]
//!
//! An empty output is an error ([`Gaia3dError::EmptyResultSet`]), never an empty success.
use std::fmt;

use super::{RawCatalogRow, StarRecord};
use crate::constants::MilliArcSec;
use crate::gaia3d_errors::Gaia3dError;

/// What to do with a row lacking a radial velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingVelocityPolicy {
    /// Drop the row.
    #[default]
    Drop,
    /// Keep the row with a radial velocity of 0 km/s.
    AssumeZero,
}

/// Cleaning parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    pub min_parallax_mas: MilliArcSec,
    pub missing_velocity: MissingVelocityPolicy,
}

impl Default for FilterParams {
    fn default() -> Self {
        FilterParams {
            // 100 kpc
            min_parallax_mas: 0.01,
            missing_velocity: MissingVelocityPolicy::Drop,
        }
    }
}

impl FilterParams {
    /// Validated constructor, `min_parallax_mas` must be finite and strictly positive.
    pub fn new(
        min_parallax_mas: MilliArcSec,
        missing_velocity: MissingVelocityPolicy,
    ) -> Result<Self, Gaia3dError> {
        if !(min_parallax_mas.is_finite() && min_parallax_mas > 0.0) {
            return Err(Gaia3dError::InvalidParameter(format!(
                "min_parallax_mas must be > 0, got {min_parallax_mas}"
            )));
        }
        Ok(FilterParams {
            min_parallax_mas,
            missing_velocity,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    MissingAstrometry,
    NonPositiveParallax,
    ParallaxBelowThreshold,
    MissingRadialVelocity,
}

/// Row counts of one cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub total: usize,
    pub kept: usize,
    pub missing_astrometry: usize,
    pub non_positive_parallax: usize,
    pub parallax_below_threshold: usize,
    pub missing_radial_velocity: usize,
}

impl FilterReport {
    fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::MissingAstrometry => self.missing_astrometry += 1,
            DropReason::NonPositiveParallax => self.non_positive_parallax += 1,
            DropReason::ParallaxBelowThreshold => self.parallax_below_threshold += 1,
            DropReason::MissingRadialVelocity => self.missing_radial_velocity += 1,
        }
    }

    pub fn dropped(&self) -> usize {
        self.total - self.kept
    }
}

impl fmt::Display for FilterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows, {} kept; dropped: {} missing astrometry, {} non-positive parallax, \
             {} parallax below threshold, {} missing radial velocity",
            self.total,
            self.kept,
            self.missing_astrometry,
            self.non_positive_parallax,
            self.parallax_below_threshold,
            self.missing_radial_velocity
        )
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// Check one row against the cleaning rules.
///
/// Return
/// ------
/// * the [`StarRecord`] if the row passes, otherwise the first [`DropReason`] hit
pub fn check_row(row: &RawCatalogRow, params: &FilterParams) -> Result<StarRecord, DropReason> {
    let (Some(source_id), Some(ra), Some(dec), Some(pmra), Some(pmdec)) = (
        row.source_id,
        finite(row.ra),
        finite(row.dec),
        finite(row.pmra),
        finite(row.pmdec),
    ) else {
        return Err(DropReason::MissingAstrometry);
    };

    let parallax = match finite(row.parallax) {
        Some(p) if p > 0.0 => p,
        _ => return Err(DropReason::NonPositiveParallax),
    };
    if parallax < params.min_parallax_mas {
        return Err(DropReason::ParallaxBelowThreshold);
    }

    let radial_velocity = match (finite(row.radial_velocity), params.missing_velocity) {
        (Some(rv), _) => rv,
        (None, MissingVelocityPolicy::AssumeZero) => 0.0,
        (None, MissingVelocityPolicy::Drop) => return Err(DropReason::MissingRadialVelocity),
    };

    Ok(StarRecord {
        source_id,
        ra,
        dec,
        parallax,
        pmra,
        pmdec,
        radial_velocity,
    })
}

/// Clean all rows, keeping the input order.
pub fn filter_rows(rows: &[RawCatalogRow], params: &FilterParams) -> (Vec<StarRecord>, FilterReport) {
    let mut report = FilterReport {
        total: rows.len(),
        ..Default::default()
    };

    let stars: Vec<StarRecord> = rows
        .iter()
        .filter_map(|row| match check_row(row, params) {
            Ok(star) => Some(star),
            Err(reason) => {
                log::debug!("dropping source {:?}: {reason:?}", row.source_id);
                report.record_drop(reason);
                None
            }
        })
        .collect();

    report.kept = stars.len();
    (stars, report)
}

/// Clean all rows and refuse an empty result.
///
/// Return
/// ------
/// * the cleaned stars, in input order
/// * [`Gaia3dError::EmptyResultSet`] with the counts if nothing survived
pub fn clean_catalog(
    rows: &[RawCatalogRow],
    params: &FilterParams,
) -> Result<Vec<StarRecord>, Gaia3dError> {
    let (stars, report) = filter_rows(rows, params);
    log::info!("Filtering: {report}");
    if stars.is_empty() {
        return Err(Gaia3dError::EmptyResultSet(report));
    }
    Ok(stars)
}

#[cfg(test)]
mod filter_test {
    use super::*;

    fn row(parallax: Option<f64>, rv: Option<f64>) -> RawCatalogRow {
        RawCatalogRow {
            source_id: Some(42),
            ra: Some(120.0),
            dec: Some(-30.0),
            parallax,
            pmra: Some(1.5),
            pmdec: Some(-2.5),
            radial_velocity: rv,
        }
    }

    #[test]
    fn test_negative_parallax_is_excluded() {
        let (stars, report) = filter_rows(&[row(Some(-1.0), Some(10.0))], &FilterParams::default());
        assert!(stars.is_empty());
        assert_eq!(report.non_positive_parallax, 1);
    }

    #[test]
    fn test_drop_reasons_in_order() {
        let params = FilterParams::default();
        let mut no_ra = row(Some(1.0), Some(1.0));
        no_ra.ra = None;
        // position is checked before parallax
        no_ra.parallax = Some(-3.0);
        assert_eq!(check_row(&no_ra, &params), Err(DropReason::MissingAstrometry));

        assert_eq!(
            check_row(&row(None, Some(1.0)), &params),
            Err(DropReason::NonPositiveParallax)
        );
        assert_eq!(
            check_row(&row(Some(f64::NAN), Some(1.0)), &params),
            Err(DropReason::NonPositiveParallax)
        );
        assert_eq!(
            check_row(&row(Some(0.001), Some(1.0)), &params),
            Err(DropReason::ParallaxBelowThreshold)
        );
        assert_eq!(
            check_row(&row(Some(1.0), None), &params),
            Err(DropReason::MissingRadialVelocity)
        );
    }

    #[test]
    fn test_assume_zero_radial_velocity() {
        let params = FilterParams::new(0.01, MissingVelocityPolicy::AssumeZero).unwrap();
        let star = check_row(&row(Some(2.0), None), &params).unwrap();
        assert_eq!(star.radial_velocity, 0.0);
        assert_eq!(star.parallax, 2.0);
        assert_eq!(star.source_id, 42);
    }

    #[test]
    fn test_five_rows_scenario() {
        let rows: Vec<RawCatalogRow> = [1.0, 0.5, -1.0, 2.0, 0.0]
            .iter()
            .map(|p| row(Some(*p), Some(20.0)))
            .collect();
        let (stars, report) = filter_rows(&rows, &FilterParams::default());
        let parallaxes: Vec<f64> = stars.iter().map(|s| s.parallax).collect();
        assert_eq!(parallaxes, vec![1.0, 0.5, 2.0]);
        assert_eq!(report.total, 5);
        assert_eq!(report.kept, 3);
        assert_eq!(report.non_positive_parallax, 2);
        assert_eq!(report.dropped(), 2);
    }

    #[test]
    fn test_clean_catalog_empty_result() {
        let rows = vec![row(Some(-1.0), Some(1.0)), row(Some(0.0), Some(1.0))];
        let err = clean_catalog(&rows, &FilterParams::default()).unwrap_err();
        assert_eq!(
            err,
            Gaia3dError::EmptyResultSet(FilterReport {
                total: 2,
                kept: 0,
                non_positive_parallax: 2,
                ..Default::default()
            })
        );
        assert!(matches!(
            clean_catalog(&[], &FilterParams::default()),
            Err(Gaia3dError::EmptyResultSet(_))
        ));
    }

    #[test]
    fn test_filter_params_validation() {
        assert!(FilterParams::new(0.0, MissingVelocityPolicy::Drop).is_err());
        assert!(FilterParams::new(-1.0, MissingVelocityPolicy::Drop).is_err());
        assert!(FilterParams::new(f64::INFINITY, MissingVelocityPolicy::Drop).is_err());
    }
}
