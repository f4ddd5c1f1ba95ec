//! Command handlers, one module per subcommand.

pub mod completion;
pub mod config_cmd;
pub mod export;
pub mod import;
pub mod init;
pub mod next_number;
pub mod search;
pub mod serve;
pub mod stats;
pub mod user;
