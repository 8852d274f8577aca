use anyhow::{anyhow, Context as _};
use serde_json::{json, Value};

use crate::cli::context::CliContext;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

/// Copy the raw bytes of a stored document to `file`
pub async fn export(path: &str, file: &str, token: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::load(token)?;
    let full_path = ctx.state.repo.path(path);

    let document = ctx
        .state
        .repo
        .store()
        .read(&ctx.token, &full_path)
        .await?
        .ok_or_else(|| anyhow!("Document not found: {}", full_path))?;

    std::fs::write(file, &document.bytes).with_context(|| format!("Failed to write {}", file))?;

    output_success(
        &output_format,
        &format!("Exported {} ({} bytes) to {}", full_path, document.bytes.len(), file),
        Some(json!({ "path": full_path, "revision": document.revision })),
    )
}

/// Replace a stored document with the JSON in `file`, unconditionally
pub async fn import(path: &str, file: &str, token: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::load(token)?;

    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file))?;
    let document: Value = serde_json::from_slice(&bytes).with_context(|| format!("{} is not valid JSON", file))?;

    ctx.state.repo.replace(&ctx.token, path, &document).await?;

    let full_path = ctx.state.repo.path(path);
    output_success(
        &output_format,
        &format!("Imported {} into {}", file, full_path),
        Some(json!({ "path": full_path })),
    )
}
