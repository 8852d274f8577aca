// analytics/mod.rs - Page view tracking behind an injectable store
//
// The in-memory store loses everything on restart; swap in a persistent
// `AnalyticsStore` where that matters.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsQuery {
    pub since: Option<DateTime<Utc>>,
    pub top: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageCount {
    pub path: String,
    pub views: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_views: usize,
    pub unique_sessions: usize,
    pub top_pages: Vec<PageCount>,
    /// `YYYY-MM-DD` -> views
    pub views_by_day: BTreeMap<String, usize>,
}

#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn append(&self, view: PageView);
    async fn query(&self, query: AnalyticsQuery) -> AnalyticsSummary;
}

/// Bounded ring of recent page views
pub struct InMemoryAnalyticsStore {
    views: RwLock<VecDeque<PageView>>,
    max_events: usize,
}

impl InMemoryAnalyticsStore {
    pub fn new(max_events: usize) -> Self {
        Self {
            views: RwLock::new(VecDeque::new()),
            max_events: max_events.max(1),
        }
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryAnalyticsStore {
    async fn append(&self, view: PageView) {
        let mut views = self.views.write().unwrap_or_else(|p| p.into_inner());
        if views.len() >= self.max_events {
            views.pop_front();
        }
        views.push_back(view);
    }

    async fn query(&self, query: AnalyticsQuery) -> AnalyticsSummary {
        let views = self.views.read().unwrap_or_else(|p| p.into_inner());
        summarize(views.iter(), &query)
    }
}

pub fn summarize<'a>(views: impl Iterator<Item = &'a PageView>, query: &AnalyticsQuery) -> AnalyticsSummary {
    let mut summary = AnalyticsSummary::default();
    let mut sessions = HashSet::new();
    let mut pages: HashMap<&str, usize> = HashMap::new();

    for view in views.filter(|v| query.since.map_or(true, |since| v.timestamp >= since)) {
        summary.total_views += 1;
        sessions.insert(view.session_id.as_str());
        *pages.entry(view.path.as_str()).or_insert(0) += 1;
        *summary
            .views_by_day
            .entry(view.timestamp.format("%Y-%m-%d").to_string())
            .or_insert(0) += 1;
    }

    let mut top: Vec<PageCount> = pages
        .into_iter()
        .map(|(path, views)| PageCount { path: path.to_string(), views })
        .collect();
    top.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.path.cmp(&b.path)));
    top.truncate(if query.top == 0 { 10 } else { query.top });

    summary.unique_sessions = sessions.len();
    summary.top_pages = top;
    summary
}
