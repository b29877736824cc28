use clap::{Args, Parser, Subcommand};

use crate::output::Output;

/// Server URL offered at the login prompt
pub const DEFAULT_SERVER_URL: &str = "https://themeerkat.app";

/// Meerkat CLI - upload and manage receipts
#[derive(Parser, Debug)]
#[command(name = "meerkat", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Server URL override (used by login)
    #[arg(long, global = true, env = "MEERKAT_SERVER")]
    pub server: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "MEERKAT_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Authenticate with Meerkat
    Login(LoginArgs),

    /// Clear stored credentials
    Logout,

    /// Upload receipt files
    Upload(UploadArgs),

    /// Show current authentication status
    Whoami,

    /// List and view receipts
    Receipts(ReceiptsArgs),

    /// View or edit CLI configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct LoginArgs {
    /// Email address
    #[arg(short, long)]
    pub email: Option<String>,

    /// Password
    #[arg(short, long)]
    pub password: Option<String>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct UploadArgs {
    /// Files to upload
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Wait for processing to complete
    #[arg(short, long)]
    pub wait: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
#[command(args_conflicts_with_subcommands = true)]
pub struct ReceiptsArgs {
    #[command(subcommand)]
    pub command: Option<ReceiptsCommand>,

    #[command(flatten)]
    pub list: ListArgs,
}

impl ReceiptsArgs {
    /// Resolve the default `list` subcommand
    pub fn into_command(self) -> ReceiptsCommand {
        self.command.unwrap_or(ReceiptsCommand::List(self.list))
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ReceiptsCommand {
    /// List recent receipts
    List(ListArgs),

    /// Show receipt detail
    Show {
        /// Receipt ID
        id: String,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ListArgs {
    /// Number of receipts to fetch
    #[arg(short, long, default_value_t = 50)]
    pub limit: u32,

    /// Offset for pagination
    #[arg(short, long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

impl ConfigArgs {
    /// Resolve the default `show` subcommand
    pub fn into_command(self) -> ConfigCommand {
        self.command.unwrap_or(ConfigCommand::Show)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        key: String,
        value: String,
    },
}

/// Global options threaded explicitly into every command handler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub json: bool,
    pub server: Option<String>,
    pub verbose: bool,
    pub color: bool,
}

impl GlobalOptions {
    pub fn output(&self) -> Output {
        Output::new(self.json, self.color)
    }
}

impl CliArgs {
    /// Load `.env` if present, then parse the command line
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }

    pub fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            json: self.json,
            server: self.server.clone().filter(|s| !s.trim().is_empty()),
            verbose: self.verbose,
            color: !self.no_color,
        }
    }

    /// Default tracing filter; `--verbose` raises it to debug
    pub fn log_filter(&self) -> String {
        if self.verbose {
            "meerkat_cli=debug,meerkat=debug".to_string()
        } else {
            self.log_level.to_lowercase()
        }
    }
}
