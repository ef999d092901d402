//! Gaia DR3 galactocentric star map
//!
//! # Usage
//!
//! ```bash
//! # 1000 random stars with a radial velocity, written to the current directory
//! cargo run --release --bin gaia3d
//!
//! # offline: rows from a local CSV file, three.js referenced from the CDN
//! cargo run --release --bin gaia3d -- --input-csv stars.csv --libs cdn --output-dir out
//!
//! # open the viewer in the default browser once the files are written
//! cargo run --release --bin gaia3d -- --open
//! ```
use std::process::ExitCode;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use gaia3d::catalog::filter::{FilterParams, MissingVelocityPolicy};
use gaia3d::catalog::gaia_query::{GaiaArchive, QueryParams};
use gaia3d::catalog::{CatalogSource, CsvFileCatalog};
use gaia3d::env_state::Gaia3dEnv;
use gaia3d::export::html_viewer::ViewerLibraries;
use gaia3d::export::{ExportConfig, ExportedArtifacts};
use gaia3d::galactocentric::GalactocentricFrame;
use gaia3d::gaia3d_errors::Gaia3dError;
use gaia3d::logging::setup_logging;
use gaia3d::pipeline::{run_pipeline, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "gaia3d")]
#[command(about = "Fetch Gaia DR3 stars and render them in the galactocentric frame", long_about = None)]
struct Cli {
    /// Number of stars requested from the archive
    #[arg(long, default_value_t = 1000)]
    sample_size: usize,

    /// Skip the first K entries of the random permutation
    #[arg(long)]
    offset: Option<u64>,

    /// Minimum parallax (mas) kept by the filter
    #[arg(long, default_value_t = 0.01)]
    min_parallax: f64,

    /// Keep stars without radial velocity, with a radial velocity of 0 km/s
    #[arg(long)]
    keep_missing_rv: bool,

    /// Directory receiving gaia_3d.png, gaia_stars.json and gaia_3d.html
    #[arg(short, long, default_value = ".")]
    output_dir: Utf8PathBuf,

    /// Read rows from a local CSV file instead of querying the archive
    #[arg(long)]
    input_csv: Option<Utf8PathBuf>,

    /// three.js source: `download`, `cdn`, or a directory holding three.min.js and OrbitControls.js
    #[arg(long, default_value = "download")]
    libs: ViewerLibraries,

    /// Network timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Open the generated HTML viewer in the default browser
    #[arg(long)]
    open: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn run(cli: Cli) -> Result<ExportedArtifacts, Gaia3dError> {
    let timeout = Duration::from_secs(cli.timeout);
    let missing_velocity = if cli.keep_missing_rv {
        MissingVelocityPolicy::AssumeZero
    } else {
        MissingVelocityPolicy::Drop
    };

    let config = PipelineConfig {
        query: QueryParams::builder()
            .sample_size(cli.sample_size)
            .random_index_offset(cli.offset)
            .require_radial_velocity(!cli.keep_missing_rv)
            .timeout(timeout)
            .build()?,
        filter: FilterParams::new(cli.min_parallax, missing_velocity)?,
        frame: GalactocentricFrame::default(),
        export: ExportConfig::in_dir(&cli.output_dir).with_libraries(cli.libs),
    };

    let env = Gaia3dEnv::new(timeout)?;
    let source: Box<dyn CatalogSource + '_> = match cli.input_csv {
        Some(path) => Box::new(CsvFileCatalog::new(path)),
        None => Box::new(GaiaArchive::new(&env)),
    };

    run_pipeline(source.as_ref(), &config, Some(&env))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _logger = match setup_logging(&cli.log_level) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let open_viewer = cli.open;
    match run(cli) {
        Ok(written) => {
            println!("{written}");
            if open_viewer {
                log::info!("Opening {}", written.html);
                if let Err(e) = open::that(&written.html) {
                    log::warn!("Could not open {}: {e}", written.html);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod gaia3d_cli_test {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["gaia3d"]).unwrap();
        assert_eq!(cli.sample_size, 1000);
        assert_eq!(cli.libs, ViewerLibraries::Download);
        assert_eq!(cli.timeout, 60);
        assert!(!cli.open);
    }

    #[test]
    fn test_open_and_local_libraries() {
        let cli = Cli::try_parse_from(["gaia3d", "--open", "--libs", "vendor/three", "-o", "out"])
            .unwrap();
        assert!(cli.open);
        assert_eq!(cli.libs, ViewerLibraries::LocalDir("vendor/three".into()));
        assert_eq!(cli.output_dir, Utf8PathBuf::from("out"));
    }
}
