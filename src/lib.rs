pub mod catalog;
pub mod constants;
pub mod env_state;
pub mod export;
pub mod gaia3d_errors;
pub mod galactocentric;
pub mod logging;
pub mod orbit;
pub mod pipeline;
pub mod raster;
