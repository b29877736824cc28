use std::collections::HashMap;

use super::CommandContext;
use crate::config::{ListArgs, ReceiptsCommand};
use crate::error::{CliError, Result};
use crate::http_client::ApiClient;
use crate::models::{Receipt, ReceiptsResponse, SupermarketsResponse, DEFAULT_CURRENCY};
use crate::output::format_currency;

const SUPERMARKETS_PATH: &str = "/api/v1/supermarkets?limit=100&offset=0";

/// Supermarket id -> name. Any failure yields an empty map.
pub async fn fetch_supermarket_map(api: &ApiClient, verbose: bool) -> HashMap<i64, String> {
    match api
        .get::<SupermarketsResponse>(SUPERMARKETS_PATH, verbose)
        .await
    {
        Ok(response) => response
            .items
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect(),
        Err(e) => {
            tracing::debug!(error = %e, "Supermarket lookup failed, showing ids");
            HashMap::new()
        }
    }
}

fn store_name(supermarkets: &HashMap<i64, String>, id: i64) -> String {
    supermarkets
        .get(&id)
        .cloned()
        .unwrap_or_else(|| id.to_string())
}

/// Receipt ids are opaque path segments
fn validate_receipt_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CliError::Validation(format!("Invalid receipt ID: {id}")))
    }
}

pub fn list_rows(
    receipts: &[Receipt],
    supermarkets: &HashMap<i64, String>,
    currency: &str,
) -> Vec<Vec<String>> {
    receipts
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                store_name(supermarkets, r.supermarket_id),
                r.date.clone(),
                format_currency(r.total, currency),
                r.products
                    .as_ref()
                    .map(|p| p.len().to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect()
}

pub fn product_rows(receipt: &Receipt, currency: &str) -> Vec<Vec<String>> {
    receipt
        .products
        .iter()
        .flatten()
        .map(|p| {
            vec![
                p.name.clone(),
                p.quantity.to_string(),
                format_currency(p.unit_price, currency),
                format_currency(p.price, currency),
            ]
        })
        .collect()
}

/// Store, date and total lines shown under the receipt header
pub fn detail_lines(
    receipt: &Receipt,
    supermarkets: &HashMap<i64, String>,
    currency: &str,
) -> Vec<String> {
    vec![
        format!("  Store: {}", store_name(supermarkets, receipt.supermarket_id)),
        format!("  Date: {}", receipt.date),
        format!("  Total: {}", format_currency(receipt.total, currency)),
    ]
}

pub async fn list(ctx: &CommandContext, args: &ListArgs) -> Result<()> {
    let verbose = ctx.opts.verbose;
    let path = format!(
        "/api/v1/receipts/recent?limit={}&offset={}",
        args.limit, args.offset
    );

    // Resolve the token up front so the concurrent calls share one refresh
    ctx.api.token_manager().get_valid_token().await?;

    let out = ctx.output();
    let spinner = out.spinner("Fetching receipts…");
    let (response, supermarkets, config) = tokio::join!(
        ctx.api.get::<ReceiptsResponse>(&path, verbose),
        fetch_supermarket_map(&ctx.api, verbose),
        ctx.store.load_config(),
    );
    spinner.stop();
    let response = response?;

    if out.is_json() {
        out.json(&response);
        return Ok(());
    }

    if response.items.is_empty() {
        out.line("No receipts found.");
        return Ok(());
    }

    let currency = config
        .as_ref()
        .map(|c| c.currency_or_default())
        .unwrap_or(DEFAULT_CURRENCY);
    let rows = list_rows(&response.items, &supermarkets, currency);
    out.table(&["ID", "Store", "Date", "Total", "Items"], &rows);
    out.success(&format!(
        "Showing {} of {} receipts",
        response.items.len(),
        response.total
    ));
    Ok(())
}

pub async fn show(ctx: &CommandContext, id: &str) -> Result<()> {
    validate_receipt_id(id)?;
    let verbose = ctx.opts.verbose;
    let path = format!("/api/v1/receipts/{id}");

    ctx.api.token_manager().get_valid_token().await?;

    let out = ctx.output();
    let spinner = out.spinner("Fetching receipt…");
    let (receipt, supermarkets, config) = tokio::join!(
        ctx.api.get::<Receipt>(&path, verbose),
        fetch_supermarket_map(&ctx.api, verbose),
        ctx.store.load_config(),
    );
    spinner.stop();
    let receipt = receipt?;

    if out.is_json() {
        out.json(&receipt);
        return Ok(());
    }

    let currency = config
        .as_ref()
        .map(|c| c.currency_or_default())
        .unwrap_or(DEFAULT_CURRENCY);

    out.success(&format!("Receipt #{}", receipt.id));
    for line in detail_lines(&receipt, &supermarkets, currency) {
        out.line(&line);
    }

    let rows = product_rows(&receipt, currency);
    if !rows.is_empty() {
        out.line("");
        out.table(&["Product", "Qty", "Unit Price", "Price"], &rows);
    }
    Ok(())
}

pub async fn run(ctx: &CommandContext, command: ReceiptsCommand) -> Result<()> {
    match command {
        ReceiptsCommand::List(args) => list(ctx, &args).await,
        ReceiptsCommand::Show { id } => show(ctx, &id).await,
    }
}
