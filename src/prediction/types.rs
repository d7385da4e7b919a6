//! Prediction form and model features.

use serde::{Deserialize, Serialize};

use crate::prediction::PredictionError;

pub const MSG_ALL_FIELDS: &str = "Please fill in all fields";

/// The prediction form as submitted. Numeric fields arrive as text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PredictionForm {
    pub area: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub floors: Option<String>,
    pub year_built: Option<String>,
    pub location: Option<String>,
    pub condition: Option<String>,
    pub garage: Option<String>,
}

/// Feature object posted to the model server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Features {
    pub area: u64,
    pub bedrooms: u64,
    pub bathrooms: u64,
    pub floors: u64,
    pub year_built: u64,
    pub location: String,
    pub condition: String,
    pub garage: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    Model,
    Heuristic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub predicted_price: f64,
    pub source: PredictionSource,
}

fn required(value: &Option<String>) -> Result<&str, PredictionError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PredictionError::Invalid(MSG_ALL_FIELDS.to_string()))
}

fn digits(name: &str, value: &str) -> Result<u64, PredictionError> {
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(PredictionError::Invalid(format!("{name} must contain digits only")));
    }
    value
        .parse()
        .map_err(|_| PredictionError::Invalid(format!("{name} is too large")))
}

impl PredictionForm {
    /// All fields are required first, then numeric fields must be digits only.
    pub fn validate(&self) -> Result<Features, PredictionError> {
        let area = required(&self.area)?;
        let bedrooms = required(&self.bedrooms)?;
        let bathrooms = required(&self.bathrooms)?;
        let floors = required(&self.floors)?;
        let year_built = required(&self.year_built)?;
        let location = required(&self.location)?;
        let condition = required(&self.condition)?;
        let garage = required(&self.garage)?;

        Ok(Features {
            area: digits("Area", area)?,
            bedrooms: digits("Bedrooms", bedrooms)?,
            bathrooms: digits("Bathrooms", bathrooms)?,
            floors: digits("Floors", floors)?,
            year_built: digits("YearBuilt", year_built)?,
            location: location.to_string(),
            condition: condition.to_string(),
            garage: digits("Garage", garage)?,
        })
    }
}
