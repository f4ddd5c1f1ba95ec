//! `farm serve` -- run the HTTP API.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use farm_server::AppState;
use farm_storage::records::users::user_count;

use crate::cli::ServeArgs;
use crate::context::RuntimeContext;
use crate::logging;

pub fn run(ctx: &RuntimeContext, args: &ServeArgs) -> Result<()> {
    let (farm_dir, config) = ctx.load_config()?;
    logging::init(
        &logging::directive(Some(&config.logging.level), ctx.verbose, ctx.quiet),
        config.logging.format,
    );

    let (store, config) = ctx.open_store()?;
    if config.auth.required && user_count(&store)? == 0 {
        warn!("no users yet; the first POST /api/auth/register creates an admin");
    }

    let bind = args.bind.clone().unwrap_or_else(|| config.server.bind.clone());
    let state = AppState::new(Arc::new(store), config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime
        .block_on(farm_server::serve(state, &bind))
        .with_context(|| format!("server for {} failed on {bind}", farm_dir.display()))
}
