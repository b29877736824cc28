// Command handlers
//
// Every handler receives the explicit `CommandContext`; nothing reads global
// parser state.

pub mod config;
pub mod login;
pub mod logout;
pub mod receipts;
pub mod upload;
pub mod whoami;

use reqwest::Client;

use crate::config::{Command, GlobalOptions};
use crate::error::Result;
use crate::http_client::ApiClient;
use crate::output::Output;
use crate::store::Store;

/// Everything a command needs for one invocation
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub store: Store,
    pub client: Client,
    pub api: ApiClient,
    pub opts: GlobalOptions,
}

impl CommandContext {
    pub fn new(store: Store, client: Client, opts: GlobalOptions) -> Self {
        let api = ApiClient::new(store.clone(), client.clone());
        Self {
            store,
            client,
            api,
            opts,
        }
    }

    pub fn output(&self) -> Output {
        self.opts.output()
    }
}

/// Dispatch a parsed command
pub async fn run(command: Command, ctx: &CommandContext) -> Result<()> {
    match command {
        Command::Login(args) => login::run(ctx, args).await,
        Command::Logout => logout::run(ctx).await,
        Command::Upload(args) => upload::run(ctx, args).await,
        Command::Whoami => whoami::run(ctx).await,
        Command::Receipts(args) => receipts::run(ctx, args.into_command()).await,
        Command::Config(args) => config::run(ctx, args.into_command()).await,
    }
}
