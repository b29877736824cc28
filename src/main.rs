use meerkat_cli::commands::{self, CommandContext};
use meerkat_cli::config::CliArgs;
use meerkat_cli::error::{CliError, Result};
use meerkat_cli::http_client::build_http_client;
use meerkat_cli::store::Store;

#[tokio::main]
async fn main() {
    let args = CliArgs::load();

    // Logs go to stderr so stdout stays clean for --json
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let opts = args.global_options();
    let out = opts.output();

    if let Err(e) = run(args, opts).await {
        tracing::debug!(error = ?e, "Command failed");
        if out.is_json() {
            out.json(&e.to_json());
        } else {
            out.error(&e.to_string());
        }
        std::process::exit(e.exit_code());
    }
}

async fn run(args: CliArgs, opts: meerkat_cli::config::GlobalOptions) -> Result<()> {
    let store = Store::from_env().map_err(CliError::Internal)?;
    let client = build_http_client().map_err(CliError::Internal)?;
    tracing::debug!(dir = %store.dir().display(), "Using config directory");

    let ctx = CommandContext::new(store, client, opts);
    commands::run(args.command, &ctx).await
}
