//! Maintenance submission, listing and completion.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};

use crate::listings::service::find_by_house_id;
use crate::mail::{render_owner_notice, render_tenant_copy, EmailMessage, MailError, Mailer, OwnerNotice};
use crate::maintenance::types::{
    HouseRequests, MaintenanceRequest, MaintenanceSubmission, OwnerEmailRequest, RequestStatus,
    RequestView, SubmissionOutcome, Urgency,
};
use crate::maintenance::MaintenanceError;
use crate::store::{collections, field_str, to_document, DocumentStore, StoreError};

pub const MSG_REQUIRED: &str = "Please complete all required fields";
pub const MSG_OTHER_CATEGORY: &str = "Please specify the \"Other\" category";
pub const MSG_URGENCY: &str = "Please select a valid urgency level";
pub const MSG_PROPERTY_UNAVAILABLE: &str = "Property ID does not exist or is not available.";
pub const MSG_PROPERTY_UNKNOWN: &str = "Property ID does not exist in our system.";

const OTHER: &str = "other";
const TENANT_COPY_SUBJECT: &str = "Your maintenance request was sent to the owner";

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Replace the bare `other` category with `other: <text>`, keeping order.
pub fn expand_categories(categories: &[String], other: Option<&str>) -> Vec<String> {
    let selected: Vec<String> = categories
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty() && c != OTHER)
        .collect();
    match (categories.iter().any(|c| c.trim() == OTHER), other) {
        (true, Some(text)) => selected
            .into_iter()
            .chain(std::iter::once(format!("{OTHER}: {}", text.trim())))
            .collect(),
        _ => selected,
    }
}

/// Settings the service reads from the mail configuration.
#[derive(Debug, Clone)]
pub struct NotificationSettings {
    pub default_sender: String,
    pub owner_subject: String,
    pub send_tenant_copy: bool,
}

impl From<&crate::config::MailConfig> for NotificationSettings {
    fn from(config: &crate::config::MailConfig) -> Self {
        Self {
            default_sender: config.default_sender.clone(),
            owner_subject: config.owner_subject.clone(),
            send_tenant_copy: config.send_tenant_copy,
        }
    }
}

#[derive(Clone)]
pub struct MaintenanceService {
    store: Arc<dyn DocumentStore>,
    mailer: Arc<dyn Mailer>,
    settings: NotificationSettings,
}

impl MaintenanceService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        mailer: Arc<dyn Mailer>,
        settings: NotificationSettings,
    ) -> Self {
        Self {
            store,
            mailer,
            settings,
        }
    }

    /// Validate, store as `Pending` and notify the owner once.
    ///
    /// A failed notification does not undo the stored request.
    pub async fn submit_request(
        &self,
        submission: MaintenanceSubmission,
    ) -> Result<SubmissionOutcome, MaintenanceError> {
        let house_id = submission.house_id.trim();
        let issue = submission.issue.trim();
        let has_category = submission.categories.iter().any(|c| !c.trim().is_empty());
        if house_id.is_empty() || issue.is_empty() || !has_category {
            return Err(MaintenanceError::Invalid(MSG_REQUIRED));
        }

        let other = non_blank(submission.other_category.as_deref());
        if submission.categories.iter().any(|c| c.trim() == OTHER) && other.is_none() {
            return Err(MaintenanceError::Invalid(MSG_OTHER_CATEGORY));
        }

        let urgency = match non_blank(submission.urgency.as_deref()) {
            Some(u) => Urgency::parse(u).ok_or(MaintenanceError::Invalid(MSG_URGENCY))?,
            None => Urgency::default(),
        };

        let property = find_by_house_id(self.store.as_ref(), house_id)
            .await?
            .ok_or(MaintenanceError::PropertyNotFound(MSG_PROPERTY_UNAVAILABLE))?;

        let request = MaintenanceRequest {
            house_id: house_id.to_string(),
            categories: expand_categories(&submission.categories, other),
            issue: issue.to_string(),
            urgency,
            status: RequestStatus::Pending,
            preferred_date: non_blank(submission.preferred_date.as_deref()).map(String::from),
            preferred_time: non_blank(submission.preferred_time.as_deref()).map(String::from),
            entry_permission: submission.entry_permission,
            tenant_name: non_blank(submission.tenant_name.as_deref()).map(String::from),
            created_at: Utc::now(),
            completed_at: None,
        };
        let request_id = self
            .store
            .insert(collections::MAINTENANCE_REQUESTS, to_document(&request)?)
            .await?;
        tracing::info!(request_id = %request_id, house_id = %request.house_id, "Maintenance request stored");

        let owner_email = non_blank(submission.owner_email.as_deref())
            .map(String::from)
            .or_else(|| field_str(&property.data, "ownerEmail"))
            .unwrap_or_default();
        let notice = OwnerNotice {
            house_id: request.house_id.clone(),
            tenant_name: request.tenant_name.clone(),
            issue_category: request.categories.join(", "),
            issue: request.issue.clone(),
            urgency: request.urgency.as_str().to_string(),
            preferred_date: request.preferred_date.clone(),
            preferred_time: request.preferred_time.clone(),
            entry_permission: request.entry_permission,
        };
        let from = self.sender(submission.tenant_email.as_deref());

        let owner_notified = match self.notify_owner(&notice, &from, &owner_email).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    error = %e,
                    "Owner notification failed; request kept"
                );
                false
            }
        };

        Ok(SubmissionOutcome {
            request_id,
            owner_notified,
        })
    }

    /// Requests for one property, newest first.
    pub async fn requests_for_house(&self, house_id: &str) -> Result<HouseRequests, MaintenanceError> {
        let house_id = house_id.trim();
        let property = find_by_house_id(self.store.as_ref(), house_id)
            .await?
            .ok_or(MaintenanceError::PropertyNotFound(MSG_PROPERTY_UNKNOWN))?;

        let docs = self
            .store
            .find_eq(collections::MAINTENANCE_REQUESTS, "houseId", &Value::from(house_id), None)
            .await?;
        let mut requests = Vec::with_capacity(docs.len());
        for doc in docs {
            match doc.decode::<MaintenanceRequest>() {
                Ok(request) => requests.push(RequestView { id: doc.key, request }),
                Err(e) => tracing::warn!(request_id = %doc.key, error = %e, "Skipping malformed maintenance request"),
            }
        }
        requests.sort_by(|a, b| b.request.created_at.cmp(&a.request.created_at));

        Ok(HouseRequests {
            house_id: house_id.to_string(),
            property_title: field_str(&property.data, "title")
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Your Property".to_string()),
            requests,
        })
    }

    /// Status-only update. Concurrent updates are last-writer-wins.
    pub async fn mark_completed(&self, request_id: &str) -> Result<(), MaintenanceError> {
        let fields = json!({
            "status": RequestStatus::Completed,
            "completedAt": Utc::now(),
        });
        let fields = fields.as_object().cloned().unwrap_or_default();

        match self
            .store
            .update(collections::MAINTENANCE_REQUESTS, request_id, fields)
            .await
        {
            Ok(()) => {
                tracing::info!(request_id, "Maintenance request completed");
                Ok(())
            }
            Err(StoreError::NotFound { .. }) => Err(MaintenanceError::RequestNotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// The owner e-mail route: one owner message plus the optional tenant copy.
    pub async fn send_owner_email(&self, request: &OwnerEmailRequest) -> Result<(), MailError> {
        let notice = OwnerNotice {
            house_id: request.house_id.clone(),
            tenant_name: non_blank(request.tenant_name.as_deref()).map(String::from),
            issue_category: request.issue_category.clone(),
            issue: request.issue.clone(),
            urgency: request.urgency.clone(),
            preferred_date: non_blank(request.preferred_date.as_deref()).map(String::from),
            preferred_time: non_blank(request.preferred_time.as_deref()).map(String::from),
            entry_permission: request.entry_permission,
        };
        let from = self.sender(request.tenant_email.as_deref());
        let owner = request.owner_email.as_deref().unwrap_or_default();

        self.notify_owner(&notice, &from, owner).await?;

        if let Some(tenant) = non_blank(request.tenant_email.as_deref()) {
            if self.settings.send_tenant_copy {
                let copy = EmailMessage {
                    from: self.settings.default_sender.clone(),
                    to: tenant.to_string(),
                    subject: TENANT_COPY_SUBJECT.to_string(),
                    html: render_tenant_copy(&notice),
                };
                self.mailer.send(&copy).await?;
            }
        }
        Ok(())
    }

    fn sender(&self, tenant_email: Option<&str>) -> String {
        non_blank(tenant_email)
            .map(String::from)
            .unwrap_or_else(|| self.settings.default_sender.clone())
    }

    async fn notify_owner(&self, notice: &OwnerNotice, from: &str, to: &str) -> Result<(), MailError> {
        let message = EmailMessage {
            from: from.to_string(),
            to: to.trim().to_string(),
            subject: self.settings.owner_subject.clone(),
            html: render_owner_notice(notice),
        };
        self.mailer.send(&message).await
    }
}
