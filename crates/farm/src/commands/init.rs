//! `farm init` -- create a farm in the current (or `--dir`) directory.

use std::fs;

use anyhow::{Context, Result, bail};
use serde_json::json;
use tracing::info;

use farm_config::config::CONFIG_FILE_NAME;
use farm_config::{ensure_farm_dir, load_config, save_config};
use farm_storage::{SqliteStore, Storage};

use crate::cli::InitArgs;
use crate::context::{RuntimeContext, farm_dir_under};
use crate::output::output_json;

const GITIGNORE_CONTENT: &str = "# Farm database files
*.db
*.db-journal
*.db-wal
*.db-shm
";

pub fn run(ctx: &RuntimeContext, args: &InitArgs) -> Result<()> {
    let target = ctx.init_target()?;
    let farm_dir = farm_dir_under(&target);

    // An existing config.yaml is read and kept as is.
    let config = load_config(&farm_dir)
        .with_context(|| format!("failed to read config in {}", farm_dir.display()))?;
    let db_path = config.database_path(&farm_dir);

    if !args.force && db_path.exists() {
        bail!(
            "found existing database at {}\n\n\
             This farm is already initialized. Use --force to re-initialize \
             (existing records are kept).",
            db_path.display()
        );
    }

    let farm_dir = ensure_farm_dir(&target)
        .with_context(|| format!("failed to create {}", farm_dir.display()))?;

    if !farm_dir.join(CONFIG_FILE_NAME).exists() {
        save_config(&farm_dir, &config).context("failed to write config.yaml")?;
    }

    let gitignore_path = farm_dir.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(&gitignore_path, GITIGNORE_CONTENT).with_context(|| {
            format!("failed to create .gitignore: {}", gitignore_path.display())
        })?;
    }

    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("failed to create database at {}", db_path.display()))?;
    if let Some(name) = args.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        store.set_config("farm_name", name)?;
    }
    if let Some(currency) = args.currency.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        store.set_config("currency", &currency.to_uppercase())?;
    }
    info!(farm_dir = %farm_dir.display(), "initialized farm");

    if ctx.json {
        output_json(&json!({
            "farmDir": farm_dir.display().to_string(),
            "database": db_path.display().to_string(),
        }))?;
    } else if !ctx.quiet {
        println!();
        println!("farm initialized successfully!");
        println!();
        println!("  Directory: {}", farm_dir.display());
        println!("  Database:  {}", db_path.display());
        println!();
        println!("Run `farm user add <name> --role admin ...` to create the first account,");
        println!("then `farm serve` to start the API.");
        println!();
    }

    Ok(())
}
