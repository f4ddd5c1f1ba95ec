//! `farm` -- farm management server and command-line tools.
//!
//! Parses CLI arguments with clap, resolves the runtime context, and
//! dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod logging;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use context::RuntimeContext;
use farm_config::config::LogFormat;

fn main() {
    let cli = Cli::parse();
    let ctx = RuntimeContext::from_global_args(&cli.global);

    // `serve` sets up logging itself once it has read the config.
    if !matches!(cli.command, Some(Commands::Serve(_))) {
        logging::init(
            &logging::directive(None, ctx.verbose, ctx.quiet),
            LogFormat::Pretty,
        );
    }

    let result = match cli.command {
        Some(Commands::Init(args)) => commands::init::run(&ctx, &args),
        Some(Commands::Serve(args)) => commands::serve::run(&ctx, &args),
        Some(Commands::User(args)) => commands::user::run(&ctx, &args),
        Some(Commands::Stats(args)) => commands::stats::run(&ctx, &args),
        Some(Commands::Search(args)) => commands::search::run(&ctx, &args),
        Some(Commands::Export(args)) => commands::export::run(&ctx, &args),
        Some(Commands::Import(args)) => commands::import::run(&ctx, &args),
        Some(Commands::NextNumber(args)) => commands::next_number::run(&ctx, &args),
        Some(Commands::Config(args)) => commands::config_cmd::run(&ctx, &args),
        Some(Commands::Completion(args)) => commands::completion::run(&ctx, &args),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        if cli.global.json {
            let err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{}", s);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}
