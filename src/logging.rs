//! Logger setup shared by the binaries.
use flexi_logger::{Logger, LoggerHandle};

use crate::gaia3d_errors::Gaia3dError;

/// Start logging to stderr at `level` (a `log` spec such as `info` or `gaia3d=debug`).
///
/// `RUST_LOG`, when set, takes precedence. The returned handle must be kept alive for the
/// whole run.
pub fn setup_logging(level: &str) -> Result<LoggerHandle, Gaia3dError> {
    let handle = Logger::try_with_env_or_str(level)?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()?;
    Ok(handle)
}
