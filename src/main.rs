use family_hub::config::config;
use family_hub::is_production;
use family_hub::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up YANDEX_TOKEN, SECURITY_SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!("Starting Family Hub in {:?} mode", config.environment);

    if config.security.session_secret.is_empty() {
        if is_production!() {
            anyhow::bail!("SECURITY_SESSION_SECRET must be set in production");
        }
        tracing::warn!("SECURITY_SESSION_SECRET is empty; family logins will be rejected");
    }

    let state = AppState::from_config(config.clone())?;
    family_hub::server::serve(state).await
}
