//! Configuration management for the farmstead system.
//!
//! This crate finds the `.farm/` directory, loads `.farm/config.yaml`
//! layered with `FARM_*` environment variables, and saves it back.

pub mod config;
pub mod farm_dir;

pub use config::{ConfigError, FarmConfig, load_config, save_config};
pub use farm_dir::{ensure_farm_dir, find_farm_dir, find_farm_dir_or_error};
