use anyhow::{bail, Context as _};
use serde_json::{json, Value};

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

pub async fn handle(url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let health_url = format!("{}/health", url.trim_end_matches('/'));
    let started = std::time::Instant::now();

    let response = reqwest::get(&health_url)
        .await
        .with_context(|| format!("Could not reach {}", health_url))?;
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if !status.is_success() {
        bail!("{} answered {}", health_url, status);
    }

    output_success(
        &output_format,
        &format!("{} is up ({} ms)", url, elapsed_ms),
        Some(json!({ "url": url, "latency_ms": elapsed_ms, "health": body })),
    )
}
