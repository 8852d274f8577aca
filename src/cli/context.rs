use anyhow::{anyhow, Context as _};

use crate::config::config;
use crate::state::AppState;

/// Store access for one CLI invocation
pub struct CliContext {
    pub state: AppState,
    pub token: String,
}

impl CliContext {
    /// Build from the process config; the token comes from `--token` or `$YANDEX_TOKEN`
    pub fn load(token: Option<String>) -> anyhow::Result<Self> {
        let token = token
            .or_else(|| std::env::var("YANDEX_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow!("No storage token. Pass --token or set YANDEX_TOKEN"))?;

        let state = AppState::from_config(config().clone()).context("Failed to initialize document store")?;

        Ok(Self { state, token })
    }
}
