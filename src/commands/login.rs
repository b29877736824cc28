use anyhow::Context;
use dialoguer::{Input, Password};

use super::CommandContext;
use crate::auth::{self, AuthProviderDefaults, LoginParams};
use crate::config::{LoginArgs, DEFAULT_SERVER_URL};
use crate::error::Result;

pub async fn run(ctx: &CommandContext, args: LoginArgs) -> Result<()> {
    let server_url = match &ctx.opts.server {
        Some(server) => server.clone(),
        None => Input::<String>::new()
            .with_prompt("Server URL")
            .default(DEFAULT_SERVER_URL.to_string())
            .interact_text()
            .context("Failed to read server URL")?,
    };

    let email = match args.email {
        Some(email) => email,
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .context("Failed to read email")?,
    };

    let password = match args.password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .context("Failed to read password")?,
    };

    let params = LoginParams {
        server_url,
        email: email.trim().to_string(),
        password,
        verbose: ctx.opts.verbose,
    };
    let fallback = AuthProviderDefaults::from_env();

    let out = ctx.output();
    let spinner = out.spinner("Logging in…");
    let result = auth::login(&ctx.client, &ctx.store, &params, fallback.as_ref()).await;
    spinner.stop();
    let outcome = result?;

    if out.is_json() {
        out.json(&outcome);
    } else {
        out.success(&format!("Logged in as {}", outcome.email));
    }
    Ok(())
}
