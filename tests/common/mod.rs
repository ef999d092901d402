#![allow(dead_code)]

use camino::Utf8PathBuf;
use gaia3d::catalog::gaia_query::QueryParams;
use gaia3d::catalog::{CatalogSource, RawCatalogRow};
use gaia3d::gaia3d_errors::Gaia3dError;
use tempfile::TempDir;

/// In-memory catalog returning fixed rows.
pub struct FixtureCatalog {
    pub rows: Vec<RawCatalogRow>,
}

impl CatalogSource for FixtureCatalog {
    fn fetch_rows(&self, params: &QueryParams) -> Result<Vec<RawCatalogRow>, Gaia3dError> {
        Ok(self.rows.iter().take(params.sample_size).cloned().collect())
    }

    fn describe(&self) -> String {
        format!("fixture ({} rows)", self.rows.len())
    }
}

pub fn star_row(source_id: i64, parallax: f64) -> RawCatalogRow {
    RawCatalogRow {
        source_id: Some(source_id),
        ra: Some(45.0 + source_id as f64),
        dec: Some(-10.0 + source_id as f64),
        parallax: Some(parallax),
        pmra: Some(2.5),
        pmdec: Some(-4.0),
        radial_velocity: Some(15.0),
    }
}

/// Five rows with parallaxes `[1.0, 0.5, -1.0, 2.0, 0.0]`, ids 1 to 5.
pub fn five_rows() -> Vec<RawCatalogRow> {
    [1.0, 0.5, -1.0, 2.0, 0.0]
        .iter()
        .enumerate()
        .map(|(i, &p)| star_row(i as i64 + 1, p))
        .collect()
}

/// Temporary directory and the UTF-8 path of a not yet existing `out` directory inside it.
pub fn output_dir() -> (TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let out = Utf8PathBuf::from_path_buf(dir.path().join("out")).unwrap();
    (dir, out)
}
