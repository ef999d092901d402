//! # Query → Filter → Transform → Export
//!
//! [`run_pipeline`] chains the four stages of a run. The stages are strictly sequential and
//! each one fully completes before the next starts:
//!
//! 1. **Query**: fetch at most `sample_size` raw rows from a [`CatalogSource`].
//! 2. **Filter**: drop unusable rows ([`clean_catalog`]), an empty survivor set aborts the run.
//! 3. **Transform**: convert every survivor to the galactocentric frame.
//! 4. **Export**: render the PNG, JSON and HTML artifacts in memory, then write them.
//!
//! A failure in any stage stops the run before anything is written to disk.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gaia3d::catalog::CsvFileCatalog;
//! use gaia3d::export::ExportConfig;
//! use gaia3d::export::html_viewer::ViewerLibraries;
//! use gaia3d::pipeline::{run_pipeline, PipelineConfig};
//!
//! let config = PipelineConfig {
//!     export: ExportConfig::in_dir("out").with_libraries(ViewerLibraries::Cdn),
//!     ..Default::default()
//! };
//! let written = run_pipeline(&CsvFileCatalog::new("stars.csv"), &config, None).unwrap();
//! println!("{written}");
//! ```
use crate::catalog::filter::{clean_catalog, FilterParams};
use crate::catalog::gaia_query::QueryParams;
use crate::catalog::CatalogSource;
use crate::env_state::Gaia3dEnv;
use crate::export::{render_artifacts, ExportConfig, ExportedArtifacts};
use crate::galactocentric::{to_galactocentric, GalactocentricFrame};
use crate::gaia3d_errors::Gaia3dError;

/// Settings of every stage of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineConfig {
    pub query: QueryParams,
    pub filter: FilterParams,
    pub frame: GalactocentricFrame,
    pub export: ExportConfig,
}

/// Run the full pipeline against `source`.
///
/// Arguments
/// ---------
/// * `source`: where the raw rows come from (archive, local file, test fixture)
/// * `config`: per-stage settings
/// * `env`: network environment, only used by the export stage to download the viewer
///   libraries; `None` keeps the export offline
///
/// Return
/// ------
/// * the written artifact paths
/// * the first stage error otherwise; no file is written in that case
pub fn run_pipeline(
    source: &dyn CatalogSource,
    config: &PipelineConfig,
    env: Option<&Gaia3dEnv>,
) -> Result<ExportedArtifacts, Gaia3dError> {
    log::info!("Querying {} ({})", source.describe(), config.query);
    let rows = source.fetch_rows(&config.query)?;

    let stars = clean_catalog(&rows, &config.filter)?;
    let points = to_galactocentric(&stars, &config.frame);

    let rendered = render_artifacts(&points, &config.export, env)?;
    let written = rendered.write_all(&config.export)?;
    log::info!("Done: {written}");
    Ok(written)
}
