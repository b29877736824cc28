use serde_json::json;

use super::CommandContext;
use crate::error::Result;

/// Delete stored credentials. The config record is kept.
pub async fn run(ctx: &CommandContext) -> Result<()> {
    ctx.store.delete_credentials().await?;

    let out = ctx.output();
    if out.is_json() {
        out.json(&json!({ "message": "Logged out" }));
    } else {
        out.success("Logged out successfully.");
    }
    Ok(())
}
