use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::date_part;
use crate::error::ApiError;

/// Relative path of a member's calendar document
pub fn events_path(member: &str) -> String {
    format!("family/{}/calendar/events.json", member)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub category: String,
    pub priority: String,
    pub color: String,
    pub all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CalendarEvent {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::required_field("title"));
        }
        if self.start_date.trim().is_empty() {
            return Err(ApiError::required_field("startDate"));
        }
        if !self.end_date.is_empty() && date_part(&self.end_date) < date_part(&self.start_date) {
            return Err(ApiError::bad_request("endDate must not be before startDate"));
        }
        Ok(())
    }

    /// Fill presentation defaults the client left out
    pub fn normalize(&mut self) {
        if self.end_date.is_empty() {
            self.end_date = self.start_date.clone();
        }
        if self.category.is_empty() {
            self.category = "general".to_string();
        }
        if self.priority.is_empty() {
            self.priority = "medium".to_string();
        }
    }

    /// Whether the event touches the inclusive `[from, to]` day range
    pub fn overlaps(&self, from: Option<&str>, to: Option<&str>) -> bool {
        let start = date_part(&self.start_date);
        let end = if self.end_date.is_empty() { start } else { date_part(&self.end_date) };

        let after_from = from.map_or(true, |from| end >= date_part(from));
        let before_to = to.map_or(true, |to| start <= date_part(to));
        after_from && before_to
    }
}
