//! Listing records and submission input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{Document, StoreError, StoredDocument};

/// Lifecycle state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PropertyStatus {
    #[default]
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "FOR SALE")]
    ForSale,
    #[serde(rename = "SOLD")]
    Sold,
    #[serde(rename = "FOR RENT")]
    ForRent,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::ForSale => "FOR SALE",
            Self::Sold => "SOLD",
            Self::ForRent => "FOR RENT",
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyStatus {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(['_', '-'], " ").as_str() {
            "PENDING" => Ok(Self::Pending),
            "FOR SALE" => Ok(Self::ForSale),
            "SOLD" => Ok(Self::Sold),
            "FOR RENT" => Ok(Self::ForRent),
            _ => Err(ListingError::Invalid("Please select a valid property status")),
        }
    }
}

/// Text fields of the listing form, as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertySubmission {
    /// Optional house ID; generated when blank.
    pub id: String,
    pub title: String,
    pub status: String,
    pub price: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub beds: String,
    pub baths: String,
    pub sqft: String,
    pub description: String,
    pub owner_email: String,
}

/// The uploaded listing image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Document written to the `properties` collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub id: String,
    pub title: String,
    pub status: PropertyStatus,
    pub price: serde_json::Number,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub beds: serde_json::Number,
    pub baths: serde_json::Number,
    pub sqft: serde_json::Number,
    pub description: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    pub created_at: String,
}

/// A stored property as returned to clients: its key plus the raw fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyView {
    pub key: String,
    #[serde(flatten)]
    pub data: Document,
}

impl From<StoredDocument> for PropertyView {
    fn from(doc: StoredDocument) -> Self {
        Self {
            key: doc.key,
            data: doc.data,
        }
    }
}

#[derive(Debug, Error)]
pub enum ListingError {
    /// Validation failure with its user-facing message.
    #[error("{0}")]
    Invalid(&'static str),

    #[error("Property not found")]
    NotFound,

    #[error("Failed to upload image. Please try again.")]
    Upload(#[source] StoreError),

    #[error("Failed to add property. Please try again.")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!("FOR RENT".parse::<PropertyStatus>().unwrap(), PropertyStatus::ForRent);
        assert_eq!("for_sale".parse::<PropertyStatus>().unwrap(), PropertyStatus::ForSale);
        assert_eq!(" sold ".parse::<PropertyStatus>().unwrap(), PropertyStatus::Sold);
        assert!("LEASED".parse::<PropertyStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_with_spaces() {
        assert_eq!(
            serde_json::to_value(PropertyStatus::ForSale).unwrap(),
            serde_json::json!("FOR SALE")
        );
    }

    #[test]
    fn test_view_flattens_fields() {
        let data = serde_json::json!({"title": "Loft"}).as_object().cloned().unwrap();
        let view = PropertyView::from(StoredDocument { key: "abc".into(), data });
        assert_eq!(
            serde_json::to_value(view).unwrap(),
            serde_json::json!({"key": "abc", "title": "Loft"})
        );
    }
}
