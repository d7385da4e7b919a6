//! Listing form validation.
//!
//! Checks run in a fixed order and stop at the first failure so the form can
//! show one message at a time.

use rand::Rng;

use crate::config::ListingConfig;
use crate::listings::types::{ImageUpload, ListingError, PropertyStatus, PropertySubmission};

pub const MSG_NO_IMAGE: &str = "Please upload a property image";
pub const MSG_NOT_IMAGE: &str = "Please select an image file";
pub const MSG_IMAGE_TOO_LARGE: &str = "Image size should be less than 5MB";
pub const MSG_TITLE: &str = "Property title is required";
pub const MSG_PRICE: &str = "Please enter a valid price";
pub const MSG_ADDRESS: &str = "Complete address is required";
pub const MSG_BEDS: &str = "Please enter a valid number of bedrooms";
pub const MSG_BATHS: &str = "Please enter a valid number of bathrooms";
pub const MSG_SQFT: &str = "Please enter a valid square footage";
pub const MSG_DESCRIPTION: &str = "Please provide a detailed description (at least 50 characters)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingLimits {
    pub max_image_bytes: usize,
    pub min_description_chars: usize,
}

impl From<&ListingConfig> for ListingLimits {
    fn from(config: &ListingConfig) -> Self {
        Self {
            max_image_bytes: config.max_image_bytes,
            min_description_chars: config.min_description_chars,
        }
    }
}

impl Default for ListingLimits {
    fn default() -> Self {
        Self::from(&ListingConfig::default())
    }
}

/// Parsed numeric fields of an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedListing {
    pub status: PropertyStatus,
    pub price: f64,
    pub beds: f64,
    pub baths: f64,
    pub sqft: f64,
}

fn non_negative(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn validate_submission(
    submission: &PropertySubmission,
    image: Option<&ImageUpload>,
    limits: &ListingLimits,
) -> Result<ValidatedListing, ListingError> {
    let image = image.ok_or(ListingError::Invalid(MSG_NO_IMAGE))?;
    if !image.content_type.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(ListingError::Invalid(MSG_NOT_IMAGE));
    }
    if image.bytes.len() > limits.max_image_bytes {
        return Err(ListingError::Invalid(MSG_IMAGE_TOO_LARGE));
    }

    if blank(&submission.title) {
        return Err(ListingError::Invalid(MSG_TITLE));
    }
    let price = non_negative(&submission.price).ok_or(ListingError::Invalid(MSG_PRICE))?;

    let address_parts = [
        &submission.address,
        &submission.city,
        &submission.state,
        &submission.zip_code,
    ];
    if address_parts.iter().any(|part| blank(part)) {
        return Err(ListingError::Invalid(MSG_ADDRESS));
    }

    let beds = non_negative(&submission.beds).ok_or(ListingError::Invalid(MSG_BEDS))?;
    let baths = non_negative(&submission.baths).ok_or(ListingError::Invalid(MSG_BATHS))?;
    let sqft = non_negative(&submission.sqft).ok_or(ListingError::Invalid(MSG_SQFT))?;

    if blank(&submission.description)
        || submission.description.chars().count() < limits.min_description_chars
    {
        return Err(ListingError::Invalid(MSG_DESCRIPTION));
    }

    let status = if blank(&submission.status) {
        PropertyStatus::default()
    } else {
        submission.status.parse()?
    };

    Ok(ValidatedListing {
        status,
        price,
        beds,
        baths,
        sqft,
    })
}

/// Store whole numbers as JSON integers.
pub fn json_number(value: f64) -> serde_json::Number {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        serde_json::Number::from(value as i64)
    } else {
        serde_json::Number::from_f64(value).unwrap_or_else(|| serde_json::Number::from(0))
    }
}

/// Object path for an uploaded image: `properties/<millis>-<file name>`.
pub fn image_object_path(uploaded_at_millis: i64, file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let mut safe: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if safe.trim_matches('.').is_empty() {
        safe = "image".to_string();
    }
    format!("properties/{uploaded_at_millis}-{safe}")
}

/// Eight uppercase alphanumerics, the human-facing house ID.
pub fn generate_house_id() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> ImageUpload {
        ImageUpload {
            file_name: "front.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: vec![0u8; 1024],
        }
    }

    fn submission() -> PropertySubmission {
        PropertySubmission {
            title: "Sunny two bedroom flat".into(),
            price: "450000".into(),
            address: "12 Elm Street".into(),
            city: "Pune".into(),
            state: "MH".into(),
            zip_code: "411001".into(),
            beds: "2".into(),
            baths: "1.5".into(),
            sqft: "950".into(),
            description: "Bright corner flat with a balcony, close to schools and the metro.".into(),
            ..PropertySubmission::default()
        }
    }

    fn message(result: Result<ValidatedListing, ListingError>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_valid_submission_defaults_to_pending() {
        let listing = validate_submission(&submission(), Some(&image()), &ListingLimits::default()).unwrap();
        assert_eq!(listing.status, PropertyStatus::Pending);
        assert_eq!(listing.price, 450000.0);
        assert_eq!(listing.baths, 1.5);
    }

    #[test]
    fn test_image_checks_come_first() {
        let limits = ListingLimits::default();
        let empty = PropertySubmission::default();

        assert_eq!(message(validate_submission(&empty, None, &limits)), MSG_NO_IMAGE);

        let mut pdf = image();
        pdf.content_type = "application/pdf".into();
        assert_eq!(message(validate_submission(&empty, Some(&pdf), &limits)), MSG_NOT_IMAGE);

        let mut big = image();
        big.bytes = vec![0u8; 5 * 1024 * 1024 + 1];
        assert_eq!(message(validate_submission(&empty, Some(&big), &limits)), MSG_IMAGE_TOO_LARGE);
    }

    #[test]
    fn test_field_messages_in_order() {
        let limits = ListingLimits::default();
        let cases: Vec<(fn(&mut PropertySubmission), &str)> = vec![
            (|s| s.title = "   ".into(), MSG_TITLE),
            (|s| s.price = "abc".into(), MSG_PRICE),
            (|s| s.zip_code.clear(), MSG_ADDRESS),
            (|s| s.beds = "two".into(), MSG_BEDS),
            (|s| s.baths.clear(), MSG_BATHS),
            (|s| s.sqft = "-1".into(), MSG_SQFT),
            (|s| s.description = "Too short".into(), MSG_DESCRIPTION),
        ];

        for (mutate, expected) in cases {
            let mut s = submission();
            mutate(&mut s);
            assert_eq!(message(validate_submission(&s, Some(&image()), &limits)), expected);
        }
    }

    #[test]
    fn test_first_failure_wins() {
        let mut s = submission();
        s.price.clear();
        s.city.clear();
        let err = validate_submission(&s, Some(&image()), &ListingLimits::default());
        assert_eq!(message(err), MSG_PRICE);
    }

    #[test]
    fn test_object_path_strips_directories() {
        assert_eq!(image_object_path(1700000000000, "front door.jpg"), "properties/1700000000000-front_door.jpg");
        assert_eq!(image_object_path(1, "../../etc/passwd"), "properties/1-passwd");
        assert_eq!(image_object_path(1, ".."), "properties/1-image");
    }

    #[test]
    fn test_house_id_shape() {
        let id = generate_house_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_json_number() {
        assert_eq!(json_number(3.0).to_string(), "3");
        assert_eq!(json_number(1.5).to_string(), "1.5");
    }
}
