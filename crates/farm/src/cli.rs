//! Clap CLI definitions for the `farm` command.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use farm_core::collection::Collection;
use farm_core::enums::UserRole;
use farm_core::filter::DateRange;

/// farm -- farm records from the command line.
///
/// Runs the farmstead API server and manages the farm database directly:
/// users, summaries, search, import and export.
#[derive(Parser, Debug)]
#[command(name = "farm", about = "Farm management server and tools", version, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Farm directory, or the directory containing `.farm/` (default: search upwards).
    #[arg(long, global = true)]
    pub dir: Option<String>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a `.farm/` directory with a database and config.yaml.
    Init(InitArgs),

    /// Run the HTTP API.
    Serve(ServeArgs),

    /// Manage user accounts.
    User(UserArgs),

    /// Show the dashboard summaries.
    Stats(StatsArgs),

    /// Search egg production, sales, feed stock and tasks.
    Search(SearchArgs),

    /// Write a collection as CSV or JSON lines.
    Export(ExportArgs),

    /// Load records from a JSON lines file.
    Import(ImportArgs),

    /// Print the next batch, order or reference number.
    NextNumber(NextNumberArgs),

    /// Show configuration.
    Config(ConfigArgs),

    /// Generate shell completions.
    Completion(CompletionArgs),
}

// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Re-initialize even if a database already exists.
    #[arg(long)]
    pub force: bool,

    /// Farm name shown on the dashboard.
    #[arg(long)]
    pub name: Option<String>,

    /// Currency code shown on the dashboard.
    #[arg(long)]
    pub currency: Option<String>,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (default: server.bind from config).
    #[arg(long)]
    pub bind: Option<String>,
}

// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a user.
    Add(UserAddArgs),

    /// List users.
    List,

    /// Delete a user and end their sessions.
    #[command(alias = "rm")]
    Remove(UserRefArgs),

    /// Set a user's password.
    Passwd(PasswdArgs),

    /// Allow a deactivated user to sign in again.
    Enable(UserRefArgs),

    /// Stop a user from signing in.
    Disable(UserRefArgs),
}

#[derive(Args, Debug)]
pub struct UserAddArgs {
    pub username: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    #[arg(long, value_parser = parse_role, default_value = "worker")]
    pub role: UserRole,

    #[arg(long)]
    pub full_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct UserRefArgs {
    /// Username or user id.
    pub user: String,
}

#[derive(Args, Debug)]
pub struct PasswdArgs {
    /// Username or user id.
    pub user: String,

    #[arg(long)]
    pub password: String,
}

fn parse_role(s: &str) -> Result<UserRole, String> {
    let role = UserRole::from(s.trim().to_lowercase().as_str());
    if role.is_builtin() {
        Ok(role)
    } else {
        Err(format!("expected one of {}", UserRole::BUILTIN.join(", ")))
    }
}

// ---------------------------------------------------------------------------

#[derive(Args, Debug, Clone, Copy)]
pub struct RangeArgs {
    /// First day to include (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl RangeArgs {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.from, self.to)
    }
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    pub query: String,

    /// Maximum hits per collection.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Jsonl,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// egg-production, sales-orders, feed-stock, feed-usage, financial-records, tasks or users.
    pub collection: Collection,

    #[arg(long, value_enum, default_value = "csv")]
    pub format: ExportFormat,

    /// Write to a file instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    pub collection: Collection,

    /// JSON lines file, one record per line.
    pub file: String,

    /// Skip records whose id is already stored instead of failing.
    #[arg(long)]
    pub skip_existing: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    /// Egg production batch number.
    Batch,
    /// Sales order number.
    Order,
    /// Financial record reference number.
    Reference,
}

#[derive(Args, Debug)]
pub struct NextNumberArgs {
    #[arg(value_enum)]
    pub kind: SequenceKind,
}

// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration.
    Show,

    /// Print one value, e.g. `auth.session-ttl-hours`.
    Get(ConfigGetArgs),
}

#[derive(Args, Debug)]
pub struct ConfigGetArgs {
    pub key: String,
}

#[derive(Args, Debug)]
pub struct CompletionArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_export() {
        let cli = Cli::try_parse_from([
            "farm", "--json", "export", "sales", "--format", "jsonl", "-o", "out.jsonl",
        ])
        .unwrap();
        assert!(cli.global.json);
        match cli.command {
            Some(Commands::Export(args)) => {
                assert_eq!(args.collection, Collection::SalesOrders);
                assert_eq!(args.format, ExportFormat::Jsonl);
                assert_eq!(args.output.as_deref(), Some("out.jsonl"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(parse_role("Manager").is_ok());
        assert!(parse_role("owner").is_err());
    }
}
