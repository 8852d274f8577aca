// models/mod.rs - Records stored as JSON documents
//
// Stored data is written by more than one client, so every record defaults
// missing fields and carries unknown ones through in `extra`.

pub mod calendar;
pub mod family;
pub mod finance;
pub mod project;
pub mod todo;

pub use calendar::CalendarEvent;
pub use family::{FamilyDocument, FamilyMember, FamilySettings, MemberInput, MemberView, Role};
pub use finance::{FinanceSummary, Transaction, TransactionKind};
pub use project::{Project, ProjectsDocument};
pub use todo::{TodoItem, TodoList};

/// Current time as the RFC 3339 string stored in `createdAt`/`updatedAt`
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// First ten characters of an ISO date or datetime (`YYYY-MM-DD`)
pub(crate) fn date_part(value: &str) -> &str {
    value.get(..10).unwrap_or(value)
}

macro_rules! impl_identified {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl crate::collection::Identified for $ty {
                fn id(&self) -> &str {
                    &self.id
                }
                fn set_id(&mut self, id: String) {
                    self.id = id;
                }
            }
        )+
    };
}

impl_identified!(CalendarEvent, Transaction, Project, FamilyMember, TodoList, TodoItem);

/// Server-managed fields of a stored record
pub trait Record: crate::collection::Identified + Clone + PartialEq {
    /// Set creation timestamps on a new record
    fn stamp_created(&mut self, now: &str);

    /// Copy fields a full-replace body must not change from the stored record
    fn carry_over(&mut self, stored: &Self);

    /// Mark as modified
    fn touch(&mut self, _now: &str) {}
}

impl Record for CalendarEvent {
    fn stamp_created(&mut self, now: &str) {
        self.created_at = Some(now.to_string());
        self.updated_at = Some(now.to_string());
    }

    fn carry_over(&mut self, stored: &Self) {
        self.created_at = stored.created_at.clone();
        self.updated_at = stored.updated_at.clone();
    }

    fn touch(&mut self, now: &str) {
        self.updated_at = Some(now.to_string());
    }
}

impl Record for Project {
    fn stamp_created(&mut self, now: &str) {
        self.created_at = Some(now.to_string());
        self.updated_at = Some(now.to_string());
    }

    fn carry_over(&mut self, stored: &Self) {
        self.created_at = stored.created_at.clone();
        self.updated_at = stored.updated_at.clone();
    }

    fn touch(&mut self, now: &str) {
        self.updated_at = Some(now.to_string());
    }
}

impl Record for Transaction {
    fn stamp_created(&mut self, now: &str) {
        self.created_at = Some(now.to_string());
        if self.date.is_empty() {
            self.date = date_part(now).to_string();
        }
    }

    fn carry_over(&mut self, stored: &Self) {
        self.created_at = stored.created_at.clone();
        if self.date.is_empty() {
            self.date = stored.date.clone();
        }
    }
}

impl Record for TodoList {
    fn stamp_created(&mut self, now: &str) {
        self.created_at = Some(now.to_string());
    }

    // Items are managed through their own endpoints
    fn carry_over(&mut self, stored: &Self) {
        self.created_at = stored.created_at.clone();
        self.items = stored.items.clone();
    }
}

impl Record for TodoItem {
    fn stamp_created(&mut self, now: &str) {
        self.created_at = Some(now.to_string());
    }

    fn carry_over(&mut self, stored: &Self) {
        self.created_at = stored.created_at.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_part() {
        assert_eq!(date_part("2025-01-01T10:00:00.000Z"), "2025-01-01");
        assert_eq!(date_part("2025-01-01"), "2025-01-01");
        assert_eq!(date_part("2025"), "2025");
    }
}
