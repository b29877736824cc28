use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use reqwest::multipart;
use tokio::time::Instant;

use super::CommandContext;
use crate::config::UploadArgs;
use crate::error::{CliError, Result};
use crate::http_client::{ApiClient, RequestOptions};
use crate::models::{InboxItem, UploadResponse};
use crate::output::format_currency;

pub const ALLOWED_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".webp", ".pdf"];
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const MAX_FILES: usize = 20;

const UPLOAD_PATH: &str = "/api/v1/inbox/upload";

/// Polling cadence for `--wait`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,

    /// Overall bound per item
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(120),
        }
    }
}

/// A validated file, read into memory
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Lowercased extension including the dot, or empty
fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

pub fn mime_for(extension: &str) -> &'static str {
    match extension {
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".webp" => "image/webp",
        ".pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Check count, extension, existence and size; fails on the first bad file.
pub async fn validate_files(files: &[String]) -> Result<Vec<UploadFile>> {
    if files.len() > MAX_FILES {
        return Err(CliError::Validation(format!(
            "Too many files: max {MAX_FILES}, got {}",
            files.len()
        )));
    }

    let mut validated = Vec::with_capacity(files.len());
    for file in files {
        let path = Path::new(file);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.clone());

        let extension = extension_of(path);
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(CliError::Validation(format!(
                "Unsupported file type \"{extension}\" for {name}. Allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| CliError::Validation(format!("File not found: {file}")))?;

        if metadata.len() > MAX_FILE_SIZE {
            return Err(CliError::Validation(format!(
                "File too large: {name} ({:.1}MB). Max: 10MB",
                metadata.len() as f64 / 1024.0 / 1024.0
            )));
        }

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {file}"))?;

        validated.push(UploadFile {
            name,
            mime: mime_for(&extension),
            bytes,
        });
    }

    Ok(validated)
}

/// One `files` part per file
pub fn build_form(files: Vec<UploadFile>) -> Result<multipart::Form> {
    let mut form = multipart::Form::new();
    for file in files {
        let part = multipart::Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(file.mime)?;
        form = form.part("files", part);
    }
    Ok(form)
}

pub async fn upload(api: &ApiClient, files: Vec<UploadFile>, verbose: bool) -> Result<UploadResponse> {
    let form = build_form(files)?;
    api.request(
        UPLOAD_PATH,
        RequestOptions::post_multipart(form).verbose(verbose),
    )
    .await
}

/// Poll one inbox item until it leaves `pending`/`processing`
pub async fn poll_for_completion(
    api: &ApiClient,
    item_id: &str,
    settings: PollSettings,
    verbose: bool,
) -> Result<InboxItem> {
    let path = format!("/api/v1/inbox/{item_id}");
    let start = Instant::now();

    while start.elapsed() < settings.timeout {
        let item: InboxItem = api.get(&path, verbose).await?;
        if !item.is_in_progress() {
            return Ok(item);
        }
        tracing::debug!(item = item_id, status = %item.status, "Still processing");
        tokio::time::sleep(settings.interval).await;
    }

    Err(CliError::Timeout(format!(
        "Timed out waiting for item {item_id} to complete"
    )))
}

/// Wait for every item in turn
pub async fn wait_for_items(
    api: &ApiClient,
    response: &UploadResponse,
    settings: PollSettings,
    verbose: bool,
) -> Result<Vec<InboxItem>> {
    let mut completed = Vec::with_capacity(response.items.len());
    for item in &response.items {
        completed.push(poll_for_completion(api, &item.id, settings, verbose).await?);
    }
    Ok(completed)
}

fn completed_rows(items: &[InboxItem]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|item| {
            let amount = match (item.total_amount, item.currency.as_deref()) {
                (Some(amount), Some(currency)) => format_currency(amount, currency),
                (Some(amount), None) => format!("{amount:.2}"),
                (None, _) => "-".to_string(),
            };
            vec![
                item.id.clone(),
                item.file_name.clone(),
                item.status.clone(),
                item.merchant_name.clone().unwrap_or_else(|| "-".to_string()),
                amount,
            ]
        })
        .collect()
}

pub async fn run(ctx: &CommandContext, args: UploadArgs) -> Result<()> {
    run_with(ctx, args, PollSettings::default()).await
}

pub async fn run_with(ctx: &CommandContext, args: UploadArgs, settings: PollSettings) -> Result<()> {
    let files = validate_files(&args.files).await?;
    let count = files.len();
    let verbose = ctx.opts.verbose;
    let out = ctx.output();

    let spinner = out.spinner(&format!("Uploading {count} file(s)…"));
    let result = upload(&ctx.api, files, verbose).await;
    spinner.stop();
    let response = result?;

    if args.wait && !response.items.is_empty() {
        let spinner = out.spinner("Waiting for processing…");
        let completed = wait_for_items(&ctx.api, &response, settings, verbose).await;
        spinner.stop();
        let completed = completed?;

        if out.is_json() {
            out.json(&completed);
        } else {
            out.table(
                &["ID", "File", "Status", "Merchant", "Amount"],
                &completed_rows(&completed),
            );
        }
    } else if out.is_json() {
        out.json(&response);
    } else {
        let rows: Vec<Vec<String>> = response
            .items
            .iter()
            .map(|item| vec![item.id.clone(), item.file_name.clone(), item.status.clone()])
            .collect();
        out.table(&["ID", "File", "Status"], &rows);
    }

    if !out.is_json() {
        out.success(&format!("Uploaded {count} file(s)"));
    }
    Ok(())
}
