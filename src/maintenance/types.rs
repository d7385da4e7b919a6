//! Maintenance request records and inputs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RequestStatus {
    #[default]
    Pending,
    Completed,
}

/// Accepts `true`/`false` or the form's `"yes"`/`"no"`.
pub fn deserialize_permission<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct PermissionVisitor;

    impl Visitor<'_> for PermissionVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean or \"yes\"/\"no\"")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v.trim().to_ascii_lowercase().as_str() {
                "yes" | "true" => Ok(true),
                "no" | "false" | "" => Ok(false),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(PermissionVisitor)
}

fn default_permission() -> bool {
    true
}

/// The tenant's maintenance form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceSubmission {
    #[serde(default)]
    pub house_id: String,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Text for the free-form `other` category.
    #[serde(default)]
    pub other_category: Option<String>,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub preferred_date: Option<String>,
    #[serde(default)]
    pub preferred_time: Option<String>,
    #[serde(default = "default_permission", deserialize_with = "deserialize_permission")]
    pub entry_permission: bool,
    #[serde(default)]
    pub tenant_name: Option<String>,
    #[serde(default)]
    pub tenant_email: Option<String>,
    #[serde(default)]
    pub owner_email: Option<String>,
}

impl Default for MaintenanceSubmission {
    fn default() -> Self {
        Self {
            house_id: String::new(),
            categories: Vec::new(),
            other_category: None,
            issue: String::new(),
            urgency: None,
            preferred_date: None,
            preferred_time: None,
            entry_permission: true,
            tenant_name: None,
            tenant_email: None,
            owner_email: None,
        }
    }
}

/// Stored in `maintenanceRequests`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    pub house_id: String,
    pub categories: Vec<String>,
    pub issue: String,
    pub urgency: Urgency,
    pub status: RequestStatus,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub entry_permission: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub id: String,
    #[serde(flatten)]
    pub request: MaintenanceRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub request_id: String,
    pub owner_notified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseRequests {
    pub house_id: String,
    pub property_title: String,
    pub requests: Vec<RequestView>,
}

/// Body of the owner e-mail route. Field names follow the form payload,
/// including the two snake_case addresses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerEmailRequest {
    #[serde(default)]
    pub house_id: String,
    #[serde(default)]
    pub tenant_name: Option<String>,
    #[serde(default)]
    pub issue_category: String,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub urgency: String,
    #[serde(default)]
    pub preferred_date: Option<String>,
    #[serde(default)]
    pub preferred_time: Option<String>,
    #[serde(default, deserialize_with = "deserialize_permission")]
    pub entry_permission: bool,
    #[serde(default, rename = "tenant_email")]
    pub tenant_email: Option<String>,
    #[serde(default, rename = "owner_email")]
    pub owner_email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_permission_forms() {
        let yes: OwnerEmailRequest =
            serde_json::from_value(json!({"entryPermission": "yes"})).unwrap();
        assert!(yes.entry_permission);
        let no: OwnerEmailRequest = serde_json::from_value(json!({"entryPermission": "No"})).unwrap();
        assert!(!no.entry_permission);
        let flag: OwnerEmailRequest =
            serde_json::from_value(json!({"entryPermission": true})).unwrap();
        assert!(flag.entry_permission);
        assert!(serde_json::from_value::<OwnerEmailRequest>(json!({"entryPermission": "maybe"})).is_err());
    }

    #[test]
    fn test_submission_defaults() {
        let sub: MaintenanceSubmission =
            serde_json::from_value(json!({"houseId": "H1", "issue": "Leak", "categories": ["plumbing"]}))
                .unwrap();
        assert!(sub.entry_permission);
        assert_eq!(sub.urgency, None);
    }

    #[test]
    fn test_owner_email_field_names() {
        let req: OwnerEmailRequest = serde_json::from_value(json!({
            "houseId": "H1",
            "issueCategory": "plumbing",
            "tenant_email": "t@example.com",
            "owner_email": "o@example.com"
        }))
        .unwrap();
        assert_eq!(req.owner_email.as_deref(), Some("o@example.com"));
        assert_eq!(req.tenant_email.as_deref(), Some("t@example.com"));
        assert_eq!(req.issue_category, "plumbing");
    }

    #[test]
    fn test_urgency_parse() {
        assert_eq!(Urgency::parse(" High "), Some(Urgency::High));
        assert_eq!(Urgency::parse("urgent"), None);
    }
}
