//! # Catalog rows and star records
//!
//! This module holds the data model of the **Query** and **Filter** stages:
//!
//! - [`RawCatalogRow`]: one CSV row as returned by the archive, every field optional.
//! - [`StarRecord`]: a cleaned row, every field present and physically usable.
//! - [`CatalogSource`]: the seam between the pipeline and where rows come from.
//!
//! Two sources are provided:
//!
//! * [`gaia_query::GaiaArchive`] – synchronous TAP query against the Gaia DR3 archive.
//! * [`CsvFileCatalog`] – a local CSV file in the same format, for offline runs and tests.
//!
//! ## CSV format
//!
//! ```text
//! source_id,ra,dec,parallax,pmra,pmdec,radial_velocity
//! 4295806720,44.996155,0.005615,6.59,-0.94,-5.51,
//! ```
//!
//! Empty cells are read as `None`. Extra columns are ignored, missing required
//! columns are a [`Gaia3dError::CatalogFormat`] error.
pub mod filter;
pub mod gaia_query;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::constants::{Degree, Kiloparsec, KmPerSec, MasPerYear, MilliArcSec, SourceId};
use crate::gaia3d_errors::Gaia3dError;
use gaia_query::QueryParams;

/// Columns requested from the archive, in query order.
pub const CATALOG_COLUMNS: [&str; 7] = [
    "source_id",
    "ra",
    "dec",
    "parallax",
    "pmra",
    "pmdec",
    "radial_velocity",
];

/// One row of the archive response, before any cleaning.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCatalogRow {
    pub source_id: Option<SourceId>,
    pub ra: Option<Degree>,
    pub dec: Option<Degree>,
    pub parallax: Option<MilliArcSec>,
    /// μα* = μα cos δ
    pub pmra: Option<MasPerYear>,
    pub pmdec: Option<MasPerYear>,
    pub radial_velocity: Option<KmPerSec>,
}

/// A cleaned catalog entry.
///
/// Invariant: every field is finite and `parallax > 0`
/// (see [`filter::check_row`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarRecord {
    pub source_id: SourceId,
    pub ra: Degree,
    pub dec: Degree,
    pub parallax: MilliArcSec,
    pub pmra: MasPerYear,
    pub pmdec: MasPerYear,
    pub radial_velocity: KmPerSec,
}

impl StarRecord {
    /// Distance from the naive parallax inversion: 1 mas ↔ 1 kpc.
    pub fn distance_kpc(&self) -> Kiloparsec {
        1.0 / self.parallax
    }
}

/// Anything able to produce raw catalog rows for a query.
///
/// Implementations must return at most `params.sample_size` rows.
pub trait CatalogSource {
    /// Fetch the rows matching `params`.
    ///
    /// Return
    /// ------
    /// * The raw rows, possibly fewer than requested
    /// * [`Gaia3dError::NetworkFailure`] / [`Gaia3dError::ServiceError`] when the source is unreachable,
    ///   [`Gaia3dError::CatalogFormat`] when the answer cannot be read
    fn fetch_rows(&self, params: &QueryParams) -> Result<Vec<RawCatalogRow>, Gaia3dError>;

    /// Short human readable description, used in logs.
    fn describe(&self) -> String;
}

/// Parse a catalog CSV body into raw rows.
///
/// Arguments
/// ---------
/// * `body`: the CSV text, header line included
///
/// Return
/// ------
/// * the rows in file order, or a [`Gaia3dError::CatalogFormat`] error if a required column
///   is missing or a cell is not a number
pub fn parse_catalog_csv(body: &str) -> Result<Vec<RawCatalogRow>, Gaia3dError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = csv_reader
        .headers()
        .map_err(|e| Gaia3dError::CatalogFormat(format!("unreadable header: {e}")))?
        .clone();

    let missing: Vec<&str> = CATALOG_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(Gaia3dError::CatalogFormat(format!(
            "missing column(s): {}",
            missing.join(", ")
        )));
    }

    csv_reader
        .deserialize::<RawCatalogRow>()
        .enumerate()
        .map(|(i, row)| {
            row.map_err(|e| Gaia3dError::CatalogFormat(format!("row {}: {e}", i + 1)))
        })
        .collect()
}

/// Catalog rows read from a local CSV file.
#[derive(Debug, Clone)]
pub struct CsvFileCatalog {
    path: Utf8PathBuf,
}

impl CsvFileCatalog {
    pub fn new(path: impl AsRef<Utf8Path>) -> Self {
        CsvFileCatalog {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CatalogSource for CsvFileCatalog {
    fn fetch_rows(&self, params: &QueryParams) -> Result<Vec<RawCatalogRow>, Gaia3dError> {
        let body = std::fs::read_to_string(&self.path).map_err(|source| {
            Gaia3dError::ReadFailure {
                path: self.path.clone(),
                source,
            }
        })?;
        let mut rows = parse_catalog_csv(&body)?;
        rows.truncate(params.sample_size);
        log::info!("Read {} stars from {}", rows.len(), self.path);
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("local CSV file {}", self.path)
    }
}

#[cfg(test)]
mod catalog_test {
    use super::*;

    #[test]
    fn test_parse_catalog_csv_with_empty_cells() {
        let body = "\
source_id,ra,dec,parallax,pmra,pmdec,radial_velocity
4295806720,44.996155,0.005615,6.59,-0.94,-5.51,
34361129088,45.004316,0.021605,3.10,12.05,-3.35,-14.2
";
        let rows = parse_catalog_csv(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].source_id, Some(4295806720));
        assert_eq!(rows[0].radial_velocity, None);
        assert_eq!(rows[1].radial_velocity, Some(-14.2));
        assert_eq!(rows[1].parallax, Some(3.10));
    }

    #[test]
    fn test_parse_catalog_csv_extra_columns_ignored() {
        let body = "\
source_id,ra,dec,parallax,pmra,pmdec,radial_velocity,phot_g_mean_mag
1,10.0,20.0,1.0,0.0,0.0,5.0,12.3
";
        let rows = parse_catalog_csv(body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ra, Some(10.0));
    }

    #[test]
    fn test_parse_catalog_csv_missing_column() {
        let body = "source_id,ra,dec,parallax\n1,10.0,20.0,1.0\n";
        let err = parse_catalog_csv(body).unwrap_err();
        assert_eq!(
            err,
            Gaia3dError::CatalogFormat("missing column(s): pmra, pmdec, radial_velocity".into())
        );
    }

    #[test]
    fn test_parse_catalog_csv_bad_number() {
        let body = "\
source_id,ra,dec,parallax,pmra,pmdec,radial_velocity
1,abc,20.0,1.0,0.0,0.0,5.0
";
        assert!(matches!(
            parse_catalog_csv(body),
            Err(Gaia3dError::CatalogFormat(_))
        ));
    }

    #[test]
    fn test_header_only_is_empty() {
        let body = "source_id,ra,dec,parallax,pmra,pmdec,radial_velocity\n";
        assert!(parse_catalog_csv(body).unwrap().is_empty());
    }

    #[test]
    fn test_distance_kpc() {
        let star = StarRecord {
            source_id: 1,
            ra: 0.0,
            dec: 0.0,
            parallax: 0.5,
            pmra: 0.0,
            pmdec: 0.0,
            radial_velocity: 0.0,
        };
        assert_eq!(star.distance_kpc(), 2.0);
    }
}
