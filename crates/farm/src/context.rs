//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds what a command handler needs: the global
//! flags, the actor name for the activity log, and lazy access to the farm
//! directory, its config and its database.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use farm_config::farm_dir::FARM_DIR_NAME;
use farm_config::{FarmConfig, find_farm_dir_or_error, load_config};
use farm_storage::SqliteStore;

use crate::cli::GlobalArgs;

/// Actor used when the login name cannot be determined.
const FALLBACK_ACTOR: &str = "cli";

/// Runtime context passed to every command handler.
#[derive(Debug)]
pub struct RuntimeContext {
    /// `--dir`, as given.
    pub dir: Option<PathBuf>,

    /// Name recorded against every change made from the command line.
    pub actor: String,

    pub json: bool,
    pub verbose: bool,
    pub quiet: bool,
}

impl RuntimeContext {
    pub fn from_global_args(global: &GlobalArgs) -> Self {
        Self {
            dir: global.dir.as_ref().map(PathBuf::from),
            actor: resolve_actor(),
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        }
    }

    /// The `.farm/` directory to work in.
    ///
    /// `--dir` may name the `.farm/` directory itself or the directory that
    /// contains it. Without it, the working directory and its parents are
    /// searched.
    pub fn farm_dir(&self) -> Result<PathBuf> {
        match &self.dir {
            Some(dir) => {
                let farm_dir = farm_dir_under(dir);
                if !farm_dir.is_dir() {
                    anyhow::bail!(
                        "no farm found at {} (run `farm init` first)",
                        farm_dir.display()
                    );
                }
                Ok(farm_dir)
            }
            None => {
                let cwd = env::current_dir().context("failed to get current directory")?;
                Ok(find_farm_dir_or_error(&cwd)?)
            }
        }
    }

    /// Where `farm init` should create the farm.
    pub fn init_target(&self) -> Result<PathBuf> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => env::current_dir().context("failed to get current directory"),
        }
    }

    pub fn load_config(&self) -> Result<(PathBuf, FarmConfig)> {
        let farm_dir = self.farm_dir()?;
        let config = load_config(&farm_dir)
            .with_context(|| format!("failed to load config from {}", farm_dir.display()))?;
        Ok((farm_dir, config))
    }

    /// Opens the farm database, creating its schema if needed.
    pub fn open_store(&self) -> Result<(SqliteStore, FarmConfig)> {
        let (farm_dir, config) = self.load_config()?;
        let path = config.database_path(&farm_dir);
        let store = SqliteStore::open(&path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Ok((store, config))
    }
}

/// `dir` if it is already a `.farm` directory, otherwise `dir/.farm`.
pub fn farm_dir_under(dir: &Path) -> PathBuf {
    if dir.ends_with(FARM_DIR_NAME) {
        dir.to_path_buf()
    } else {
        dir.join(FARM_DIR_NAME)
    }
}

/// `$USER` (or `%USERNAME%`), falling back to `cli`.
fn resolve_actor() -> String {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .ok()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_ACTOR.to_owned())
}
