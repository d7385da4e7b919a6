//! Listing queries and submission.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::listings::submission::{
    generate_house_id, image_object_path, json_number, validate_submission, ListingLimits,
};
use crate::listings::types::{
    ImageUpload, ListingError, NewProperty, PropertyStatus, PropertySubmission, PropertyView,
};
use crate::store::{collections, to_document, BlobStore, DocumentStore, StoreResult, StoredDocument};

/// Look a property up by document key, then by its house ID.
pub async fn find_property(
    store: &dyn DocumentStore,
    key_or_id: &str,
) -> StoreResult<Option<StoredDocument>> {
    if let Some(data) = store.get(collections::PROPERTIES, key_or_id).await? {
        return Ok(Some(StoredDocument {
            key: key_or_id.to_string(),
            data,
        }));
    }
    find_by_house_id(store, key_or_id).await
}

/// Equality lookup on the `id` field, first match only.
pub async fn find_by_house_id(
    store: &dyn DocumentStore,
    house_id: &str,
) -> StoreResult<Option<StoredDocument>> {
    Ok(store
        .find_eq(
            collections::PROPERTIES,
            "id",
            &Value::String(house_id.to_string()),
            Some(1),
        )
        .await?
        .into_iter()
        .next())
}

#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    limits: ListingLimits,
}

impl ListingService {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>, limits: ListingLimits) -> Self {
        Self { store, blobs, limits }
    }

    /// All listings, or those whose status equals `status`. Newest first.
    pub async fn list_properties(
        &self,
        status: Option<PropertyStatus>,
    ) -> Result<Vec<PropertyView>, ListingError> {
        let docs = match status {
            Some(status) => {
                self.store
                    .find_eq(
                        collections::PROPERTIES,
                        "status",
                        &Value::String(status.as_str().to_string()),
                        None,
                    )
                    .await?
            }
            None => self.store.list(collections::PROPERTIES).await?,
        };

        let mut views: Vec<PropertyView> = docs.into_iter().map(PropertyView::from).collect();
        views.sort_by(|a, b| created_at(b).cmp(created_at(a)));
        Ok(views)
    }

    pub async fn get_property(&self, key: &str) -> Result<PropertyView, ListingError> {
        find_property(self.store.as_ref(), key)
            .await?
            .map(PropertyView::from)
            .ok_or(ListingError::NotFound)
    }

    pub async fn find_by_house_id(&self, house_id: &str) -> Result<Option<PropertyView>, ListingError> {
        Ok(find_by_house_id(self.store.as_ref(), house_id)
            .await?
            .map(PropertyView::from))
    }

    /// Validate, upload the image, then insert the listing.
    ///
    /// Nothing is uploaded or written when validation fails.
    pub async fn submit_property(
        &self,
        submission: PropertySubmission,
        image: Option<ImageUpload>,
    ) -> Result<PropertyView, ListingError> {
        let listing = validate_submission(&submission, image.as_ref(), &self.limits)?;
        let image = image.ok_or(ListingError::Invalid(crate::listings::submission::MSG_NO_IMAGE))?;

        let now = Utc::now();
        let path = image_object_path(now.timestamp_millis(), &image.file_name);
        let image_url = self
            .blobs
            .put(&path, &image.content_type, &image.bytes)
            .await
            .map_err(ListingError::Upload)?;

        let house_id = match submission.id.trim() {
            "" => generate_house_id(),
            supplied => supplied.to_string(),
        };
        let owner_email = Some(submission.owner_email.trim().to_string()).filter(|e| !e.is_empty());

        let record = NewProperty {
            id: house_id,
            title: submission.title.trim().to_string(),
            status: listing.status,
            price: json_number(listing.price),
            address: submission.address.trim().to_string(),
            city: submission.city.trim().to_string(),
            state: submission.state.trim().to_string(),
            zip_code: submission.zip_code.trim().to_string(),
            beds: json_number(listing.beds),
            baths: json_number(listing.baths),
            sqft: json_number(listing.sqft),
            description: submission.description,
            image: image_url,
            owner_email,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let data = to_document(&record)?;
        let key = self.store.insert(collections::PROPERTIES, data.clone()).await?;

        tracing::info!(key = %key, house_id = %record.id, status = %record.status, "Property listed");
        Ok(PropertyView { key, data })
    }
}

fn created_at(view: &PropertyView) -> &str {
    view.data
        .get("createdAt")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FsBlobStore, MemoryStore};

    fn service(dir: &std::path::Path) -> (ListingService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let blobs = Arc::new(FsBlobStore::new(dir, "/media"));
        (
            ListingService::new(store.clone(), blobs, ListingLimits::default()),
            store,
        )
    }

    fn submission() -> PropertySubmission {
        PropertySubmission {
            title: "Garden cottage".into(),
            status: "FOR RENT".into(),
            price: "1800".into(),
            address: "4 Mill Lane".into(),
            city: "Nashik".into(),
            state: "MH".into(),
            zip_code: "422001".into(),
            beds: "3".into(),
            baths: "2".into(),
            sqft: "1200".into(),
            description: "Quiet cottage with a large garden, new kitchen and covered parking.".into(),
            owner_email: "owner@example.com".into(),
            ..PropertySubmission::default()
        }
    }

    fn image() -> ImageUpload {
        ImageUpload {
            file_name: "cottage.png".into(),
            content_type: "image/png".into(),
            bytes: b"png".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_submit_uploads_and_inserts() {
        let dir = tempfile::tempdir().unwrap();
        let (listings, store) = service(dir.path());

        let view = listings.submit_property(submission(), Some(image())).await.unwrap();

        assert_eq!(view.data["status"], "FOR RENT");
        assert_eq!(view.data["beds"], 3);
        assert_eq!(view.data["ownerEmail"], "owner@example.com");
        let image_url = view.data["image"].as_str().unwrap();
        assert!(image_url.starts_with("/media/properties/"));
        assert!(image_url.ends_with("-cottage.png"));
        assert_eq!(view.data["id"].as_str().unwrap().len(), 8);
        assert_eq!(store.count(collections::PROPERTIES).await.unwrap(), 1);

        let rentals = listings.list_properties(Some(PropertyStatus::ForRent)).await.unwrap();
        assert_eq!(rentals.len(), 1);
        assert!(listings.list_properties(Some(PropertyStatus::Sold)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_submission_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (listings, store) = service(dir.path());
        let mut bad = submission();
        bad.title.clear();

        let err = listings.submit_property(bad, Some(image())).await.unwrap_err();
        assert_eq!(err.to_string(), "Property title is required");
        assert_eq!(store.count(collections::PROPERTIES).await.unwrap(), 0);
        assert!(!dir.path().join("properties").exists());
    }

    #[tokio::test]
    async fn test_get_by_key_or_house_id() {
        let dir = tempfile::tempdir().unwrap();
        let (listings, _) = service(dir.path());
        let mut s = submission();
        s.id = "ABC12345".into();
        let created = listings.submit_property(s, Some(image())).await.unwrap();

        assert_eq!(listings.get_property(&created.key).await.unwrap().key, created.key);
        assert_eq!(listings.get_property("ABC12345").await.unwrap().key, created.key);
        assert!(matches!(
            listings.get_property("missing").await,
            Err(ListingError::NotFound)
        ));
        assert!(listings.find_by_house_id("ABC12345").await.unwrap().is_some());
    }
}
