#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use family_hub::analytics::InMemoryAnalyticsStore;
use family_hub::auth::{hash_password, issue_session, Claims};
use family_hub::config::{AppConfig, StorageBackend};
use family_hub::models::family::FAMILY_PATH;
use family_hub::models::{FamilyDocument, FamilyMember, Role};
use family_hub::state::AppState;
use family_hub::storage::{join_path, MemoryStore};

pub const PROVIDER_TOKEN: &str = "test-provider-token";
pub const SESSION_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.storage.backend = StorageBackend::Memory;
    config.storage.root = "disk:/FamilyHub".to_string();
    config.api.enable_request_logging = false;
    config.security.session_secret = SESSION_SECRET.to_string();
    config
}

impl TestServer {
    /// Start an isolated server with its own in-memory store
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(mut config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        config.api.port = port;

        let store = Arc::new(MemoryStore::new());
        let analytics = Arc::new(InMemoryAnalyticsStore::new(config.analytics.max_events));
        let state = AppState::new(config.clone(), store.clone(), analytics);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, family_hub::server::app(state)).await;
        });

        let server = Self { port, base_url, store, config };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute store path of a document
    pub fn doc_path(&self, relative: &str) -> String {
        join_path(&self.config.storage.root, relative)
    }

    /// Parsed document straight from the store, bypassing the API
    pub fn stored(&self, relative: &str) -> Option<Value> {
        self.store
            .get(&self.doc_path(relative))
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
    }

    pub fn seed(&self, relative: &str, value: &Value) {
        let bytes = serde_json::to_vec_pretty(value).expect("serialize seed");
        self.store.put(&self.doc_path(relative), bytes);
    }

    /// Write a family.json holding the given members (password "secret")
    pub fn seed_members(&self, members: &[(&str, Role)]) -> Vec<FamilyMember> {
        let hash = hash_password("secret").expect("hash");
        let members: Vec<FamilyMember> = members
            .iter()
            .enumerate()
            .map(|(i, (username, role))| FamilyMember {
                id: format!("m{}", i + 1),
                username: username.to_string(),
                role: *role,
                password_hash: hash.clone(),
                ..Default::default()
            })
            .collect();

        let doc = FamilyDocument {
            members: members.clone(),
            ..Default::default()
        };
        self.seed(FAMILY_PATH, &serde_json::to_value(&doc).expect("family doc"));
        members
    }

    /// Signed X-Family-Token for a member, as /api/family/login would issue
    pub fn session_for(&self, member: &FamilyMember) -> String {
        issue_session(&Claims::for_member(member, 1), SESSION_SECRET).expect("issue session")
    }
}

/// Client request with the provider bearer token attached
pub fn authed(client: &reqwest::Client, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
    client.request(method, url).bearer_auth(PROVIDER_TOKEN)
}

/// Client request with both provider token and family session
pub fn family(client: &reqwest::Client, method: reqwest::Method, url: String, session: &str) -> reqwest::RequestBuilder {
    authed(client, method, url).header("X-Family-Token", session)
}

pub async fn body(resp: reqwest::Response) -> Result<Value> {
    Ok(resp.json::<Value>().await?)
}

pub fn event(title: &str, start: &str) -> Value {
    json!({ "title": title, "startDate": start })
}
