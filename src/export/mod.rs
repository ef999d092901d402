//! # Export stage
//!
//! Produces the three artifacts of a run from one in-memory point set:
//!
//! | file               | content                                          | module                 |
//! |--------------------|--------------------------------------------------|------------------------|
//! | `gaia_3d.png`      | static 3-D scatter                               | [`scatter_png`]        |
//! | `gaia_stars.json`  | JSON array of [`GalactocentricPoint`]            | [`json_dump`]          |
//! | `gaia_3d.html`     | three.js viewer embedding the same JSON string   | [`html_viewer`]        |
//!
//! Export is two-phase: [`render_artifacts`] builds every file content in memory, then
//! [`RenderedArtifacts::write_all`] writes them. Nothing is written when rendering fails.
pub mod html_viewer;
pub mod json_dump;
pub mod scatter_png;

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

use crate::catalog::filter::FilterReport;
use crate::env_state::Gaia3dEnv;
use crate::galactocentric::GalactocentricPoint;
use crate::gaia3d_errors::Gaia3dError;
use html_viewer::{render_viewer_html, resolve_libraries, ViewerLibraries, THREE_JS_URL};
use json_dump::serialize_points;
use scatter_png::{render_scatter_png, ScatterStyle};

pub const DEFAULT_PNG_FILE: &str = "gaia_3d.png";
pub const DEFAULT_JSON_FILE: &str = "gaia_stars.json";
pub const DEFAULT_HTML_FILE: &str = "gaia_3d.html";

/// Output locations and rendering options.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub output_dir: Utf8PathBuf,
    pub png_file: String,
    pub json_file: String,
    pub html_file: String,
    pub scatter: ScatterStyle,
    pub libraries: ViewerLibraries,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            output_dir: Utf8PathBuf::from("."),
            png_file: DEFAULT_PNG_FILE.to_string(),
            json_file: DEFAULT_JSON_FILE.to_string(),
            html_file: DEFAULT_HTML_FILE.to_string(),
            scatter: ScatterStyle::default(),
            libraries: ViewerLibraries::default(),
        }
    }
}

impl ExportConfig {
    pub fn in_dir(output_dir: impl AsRef<Utf8Path>) -> Self {
        ExportConfig {
            output_dir: output_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_libraries(mut self, libraries: ViewerLibraries) -> Self {
        self.libraries = libraries;
        self
    }

    pub fn png_path(&self) -> Utf8PathBuf {
        self.output_dir.join(&self.png_file)
    }

    pub fn json_path(&self) -> Utf8PathBuf {
        self.output_dir.join(&self.json_file)
    }

    pub fn html_path(&self) -> Utf8PathBuf {
        self.output_dir.join(&self.html_file)
    }
}

/// File contents of one run, not yet on disk.
#[derive(Debug, Clone)]
pub struct RenderedArtifacts {
    pub png: Vec<u8>,
    pub json: String,
    pub html: String,
    pub n_points: usize,
}

/// Paths written by one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedArtifacts {
    pub png: Utf8PathBuf,
    pub json: Utf8PathBuf,
    pub html: Utf8PathBuf,
    pub n_points: usize,
}

impl fmt::Display for ExportedArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} stars -> {}, {}, {}",
            self.n_points, self.png, self.json, self.html
        )
    }
}

fn write_file(path: &Utf8Path, contents: &[u8]) -> Result<(), Gaia3dError> {
    std::fs::write(path, contents).map_err(|source| Gaia3dError::WriteFailure {
        path: path.to_path_buf(),
        source,
    })
}

impl RenderedArtifacts {
    /// Write the three files, creating the output directory if needed.
    pub fn write_all(&self, config: &ExportConfig) -> Result<ExportedArtifacts, Gaia3dError> {
        std::fs::create_dir_all(&config.output_dir).map_err(|source| {
            Gaia3dError::WriteFailure {
                path: config.output_dir.clone(),
                source,
            }
        })?;

        let artifacts = ExportedArtifacts {
            png: config.png_path(),
            json: config.json_path(),
            html: config.html_path(),
            n_points: self.n_points,
        };

        write_file(&artifacts.json, self.json.as_bytes())?;
        log::info!("Saved star coordinates to {}", artifacts.json);
        write_file(&artifacts.html, self.html.as_bytes())?;
        log::info!("Saved HTML viewer to {}", artifacts.html);
        write_file(&artifacts.png, &self.png)?;
        log::info!("Saved plot to {}", artifacts.png);

        Ok(artifacts)
    }
}

/// Largest galactocentric radius of the cloud, in kpc.
pub fn max_radius(points: &[GalactocentricPoint]) -> f64 {
    points
        .iter()
        .map(GalactocentricPoint::radius)
        .fold(0.0, f64::max)
}

/// Render every artifact in memory.
///
/// Arguments
/// ---------
/// * `points`: the transformed stars, in processing order
/// * `config`: output options
/// * `env`: network environment used to download the viewer libraries, if configured so
///
/// Return
/// ------
/// * the rendered contents, or [`Gaia3dError::EmptyResultSet`] for an empty point set
pub fn render_artifacts(
    points: &[GalactocentricPoint],
    config: &ExportConfig,
    env: Option<&Gaia3dEnv>,
) -> Result<RenderedArtifacts, Gaia3dError> {
    if points.is_empty() {
        return Err(Gaia3dError::EmptyResultSet(FilterReport::default()));
    }

    let json = serialize_points(points)?;
    let libraries = resolve_libraries(&config.libraries, env)?;
    if libraries.is_inline() {
        log::info!("Viewer libraries inlined, the HTML viewer works offline");
    } else {
        log::info!("Viewer loads three.js from {THREE_JS_URL}, it needs network access");
    }
    let html = render_viewer_html(&json, max_radius(points), &libraries);
    let png = render_scatter_png(points, &config.scatter)?;

    Ok(RenderedArtifacts {
        png,
        json,
        html,
        n_points: points.len(),
    })
}
