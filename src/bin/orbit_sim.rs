//! Circular orbit in MWPotential2014
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --bin orbit_sim -- --radius 8 --duration 10 --samples 1000
//! ```
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use gaia3d::gaia3d_errors::Gaia3dError;
use gaia3d::logging::setup_logging;
use gaia3d::orbit::potential::MilkyWayPotential;
use gaia3d::orbit::trajectory_plot::OrbitPlotStyle;
use gaia3d::orbit::{export_orbit, integrate_orbit, OrbitArtifacts, OrbitParams};

#[derive(Parser, Debug)]
#[command(name = "orbit_sim")]
#[command(about = "Integrate a test particle in a Milky Way potential and plot its orbit", long_about = None)]
struct Cli {
    /// Initial galactocentric radius (kpc)
    #[arg(long, default_value_t = 8.0)]
    radius: f64,

    /// Initial tangential velocity (km/s), circular velocity when omitted
    #[arg(long)]
    velocity: Option<f64>,

    /// Integration time (Gyr)
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// Number of output samples
    #[arg(long, default_value_t = 1000)]
    samples: usize,

    /// Directory receiving orbit.png and orbit.csv
    #[arg(short, long, default_value = ".")]
    output_dir: Utf8PathBuf,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn run(cli: &Cli) -> Result<OrbitArtifacts, Gaia3dError> {
    let params = OrbitParams::builder()
        .radius(cli.radius)
        .tangential_velocity(cli.velocity)
        .duration(cli.duration)
        .samples(cli.samples)
        .build()?;

    let orbit = integrate_orbit(&MilkyWayPotential::mw2014(), &params)?;
    export_orbit(&orbit, &cli.output_dir, &OrbitPlotStyle::default())
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

    match run(&cli) {
        Ok(written) => {
            println!("{} {}", written.png, written.csv);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
