pub mod ask;
pub mod chat;
pub mod config_cmd;
pub mod stream;

use std::path::Path;

use rustedrag_config::SolverConfig;

/// Load config from `path`, or from the default location when unset.
pub fn load_config(path: Option<&Path>) -> Result<SolverConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => SolverConfig::load_from(path),
        None => SolverConfig::load(),
    };
    config.map_err(|e| format!("Failed to load config: {e}").into())
}
