use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

pub const FAMILY_PATH: &str = "family/family.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    #[default]
    Child,
}

/// `family/family.json` is wrapped in `{ members, settings }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FamilyDocument {
    pub members: Vec<FamilyMember>,
    pub settings: FamilySettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FamilyDocument {
    pub fn find_by_username(&self, username: &str) -> Option<&FamilyMember> {
        self.members.iter().find(|m| m.username.eq_ignore_ascii_case(username))
    }

    /// True when `username` is taken by a member other than `except_id`
    pub fn username_taken(&self, username: &str, except_id: Option<&str>) -> bool {
        self.members
            .iter()
            .any(|m| m.username.eq_ignore_ascii_case(username) && Some(m.id.as_str()) != except_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilySettings {
    pub name: String,
    pub currency: String,
    pub week_starts_on: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stored member record, including the password hash
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyMember {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role: Role,
    pub password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Member as returned by the API (no credentials)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&FamilyMember> for MemberView {
    fn from(member: &FamilyMember) -> Self {
        Self {
            id: member.id.clone(),
            username: member.username.clone(),
            display_name: member.display_name.clone(),
            role: member.role,
            created_at: member.created_at.clone(),
        }
    }
}

/// Usernames that collide with static routes under /api/family
const RESERVED_USERNAMES: &[&str] = &["members", "settings", "login"];

/// Member create/update payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberInput {
    pub username: String,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub role: Role,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MemberInput {
    pub fn validate(&self, require_password: bool) -> Result<(), ApiError> {
        if crate::storage::validate_segment(&self.username).is_err() {
            return Err(ApiError::bad_request(
                "username must be 1-64 characters of letters, digits, '-' or '_'",
            ));
        }
        if RESERVED_USERNAMES.iter().any(|r| r.eq_ignore_ascii_case(&self.username)) {
            return Err(ApiError::bad_request(format!("username '{}' is reserved", self.username)));
        }
        match self.password.as_deref() {
            Some(p) if p.len() < 4 => Err(ApiError::bad_request("password must be at least 4 characters")),
            None if require_password => Err(ApiError::required_field("password")),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_view_hides_password_hash() {
        let member = FamilyMember {
            id: "1".into(),
            username: "anna".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Parent,
            ..Default::default()
        };
        let view = serde_json::to_value(MemberView::from(&member)).unwrap();
        assert!(view.get("passwordHash").is_none());
        assert_eq!(view["role"], json!("parent"));

        let stored = serde_json::to_value(&member).unwrap();
        assert_eq!(stored["passwordHash"], json!("$argon2id$secret"));
    }

    #[test]
    fn test_username_lookup_is_case_insensitive() {
        let doc: FamilyDocument = serde_json::from_value(json!({
            "members": [{"id": "1", "username": "Anna"}, {"id": "2", "username": "bob"}],
            "settings": {"name": "Smiths", "theme": "dark"}
        }))
        .unwrap();

        assert_eq!(doc.find_by_username("anna").map(|m| m.id.as_str()), Some("1"));
        assert!(doc.username_taken("BOB", None));
        assert!(!doc.username_taken("bob", Some("2")));
        assert_eq!(doc.settings.extra["theme"], json!("dark"));
    }

    #[test]
    fn test_member_input_validation() {
        let input = MemberInput { username: "anna".into(), password: Some("pass".into()), ..Default::default() };
        assert!(input.validate(true).is_ok());

        let no_password = MemberInput { username: "anna".into(), ..Default::default() };
        assert!(no_password.validate(true).is_err());
        assert!(no_password.validate(false).is_ok());

        let bad_name = MemberInput { username: "../x".into(), password: Some("pass".into()), ..Default::default() };
        assert_eq!(bad_name.validate(true).unwrap_err().status_code(), 400);

        let reserved = MemberInput { username: "Settings".into(), password: Some("pass".into()), ..Default::default() };
        assert_eq!(reserved.validate(true).unwrap_err().status_code(), 400);
    }
}
