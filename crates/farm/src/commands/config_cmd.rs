//! `farm config` -- show the effective configuration.
//!
//! Values come from `.farm/config.yaml` layered with `FARM_*` variables;
//! edit the file to change them.

use anyhow::{Context, Result};
use serde_json::json;

use crate::cli::{ConfigArgs, ConfigCommands};
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &ConfigArgs) -> Result<()> {
    let (farm_dir, config) = ctx.load_config()?;

    match &args.command {
        ConfigCommands::Show => {
            if ctx.json {
                output_json(&config)?;
            } else {
                let yaml = serde_yaml::to_string(&config).context("failed to render config")?;
                println!("# {}", farm_dir.display());
                print!("{yaml}");
            }
        }

        ConfigCommands::Get(get) => {
            let value = config.get_value(&get.key)?;
            if ctx.json {
                output_json(&json!({
                    "key": get.key,
                    "value": value,
                }))?;
            } else {
                println!("{value}");
            }
        }
    }

    Ok(())
}
