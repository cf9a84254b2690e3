//! Prediction submission and input preparation.
//!
//! Form values arrive as raw strings. They pass through the same
//! sanitize/validate pipeline the input form applies: numeric fields are
//! stripped to digits and dots as the user types, then everything is
//! checked at submit time and converted to the backend's wire order.

use crate::auth::Session;
use crate::config::{NetworkConfig, Settings};
use crate::error::{HeartviewError, Result};
use crate::records::de_string_or_number;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Strip everything but digits and dots from a numeric form field.
pub fn sanitize_numeric_input(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// Raw form values for one prediction, as typed by the user.
///
/// `sex` holds the selector value, "M" or "F"; every other field is the
/// text of a numeric input.
#[derive(Debug, Clone, Default)]
pub struct PredictionInput {
    pub age: String,
    pub sex: String,
    pub chest_pain: String,
    pub resting_bp: String,
    pub cholesterol: String,
    pub fasting_blood_sugar: String,
    pub resting_ecg: String,
    pub max_heart_rate: String,
    pub exercise_angina: String,
    pub st_depression: String,
    pub st_slope: String,
    pub vessel_count: String,
    pub thalassemia: String,
}

impl PredictionInput {
    /// Validate every field and convert to the backend wire order.
    ///
    /// Gender must be exactly "M" or "F"; every other field must be a
    /// non-empty decimal number. The error names the first offending
    /// wire field.
    pub fn validate(&self) -> Result<FeatureVector> {
        if self.sex != "M" && self.sex != "F" {
            return Err(invalid_field("feature2"));
        }
        Ok(FeatureVector {
            age: numeric_field("feature1", &self.age)?,
            sex: self.sex.clone(),
            chest_pain: numeric_field("feature3", &self.chest_pain)?,
            resting_bp: numeric_field("feature4", &self.resting_bp)?,
            cholesterol: numeric_field("feature5", &self.cholesterol)?,
            fasting_blood_sugar: numeric_field("feature6", &self.fasting_blood_sugar)?,
            resting_ecg: numeric_field("feature7", &self.resting_ecg)?,
            max_heart_rate: numeric_field("feature8", &self.max_heart_rate)?,
            exercise_angina: numeric_field("feature9", &self.exercise_angina)?,
            st_depression: numeric_field("feature10", &self.st_depression)?,
            st_slope: numeric_field("feature11", &self.st_slope)?,
            vessel_count: numeric_field("feature12", &self.vessel_count)?,
            thalassemia: numeric_field("feature13", &self.thalassemia)?,
        })
    }
}

fn numeric_field(field: &str, raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_field(field));
    }
    trimmed.parse::<f64>().map_err(|_| invalid_field(field))
}

fn invalid_field(field: &str) -> HeartviewError {
    HeartviewError::validation(
        field,
        "Please fill all fields with valid numbers and valid gender (M/F).",
    )
}

/// The 13 feature values in the backend's wire order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    #[serde(rename = "feature1")]
    pub age: f64,
    /// "M" or "F" on the wire; the backend encodes it before scoring.
    #[serde(rename = "feature2")]
    pub sex: String,
    #[serde(rename = "feature3")]
    pub chest_pain: f64,
    #[serde(rename = "feature4")]
    pub resting_bp: f64,
    #[serde(rename = "feature5")]
    pub cholesterol: f64,
    #[serde(rename = "feature6")]
    pub fasting_blood_sugar: f64,
    #[serde(rename = "feature7")]
    pub resting_ecg: f64,
    #[serde(rename = "feature8")]
    pub max_heart_rate: f64,
    #[serde(rename = "feature9")]
    pub exercise_angina: f64,
    #[serde(rename = "feature10")]
    pub st_depression: f64,
    #[serde(rename = "feature11")]
    pub st_slope: f64,
    #[serde(rename = "feature12")]
    pub vessel_count: f64,
    #[serde(rename = "feature13")]
    pub thalassemia: f64,
}

/// Backend response to a prediction request.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionOutcome {
    /// Id of the freshly stored history record.
    pub id: String,
    #[serde(deserialize_with = "de_string_or_number")]
    pub prediction: String,
}

impl PredictionOutcome {
    /// Human-readable reading of the classifier output.
    pub fn interpretation(&self) -> &'static str {
        match self.prediction.as_str() {
            "0" => "You do not have heart disease.",
            "1" => "You have heart disease. Please consult your doctor.",
            _ => "Prediction unavailable.",
        }
    }
}

/// Client for the backend's prediction endpoints.
pub struct PredictionClient {
    client: Client,
    api_base: String,
}

impl PredictionClient {
    /// Create a client for the configured backend.
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(NetworkConfig::REQUEST_TIMEOUT)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| HeartviewError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self {
            client,
            api_base: settings.api_base.clone(),
        })
    }

    /// Submit a feature vector for scoring.
    ///
    /// The backend stores the result in the account's history before
    /// responding, so a success here means a new record exists.
    pub async fn submit(
        &self,
        session: &Session,
        features: &FeatureVector,
    ) -> Result<PredictionOutcome> {
        let url = format!("{}/predict", self.api_base);
        let response = self
            .client
            .post(&url)
            .header("Authorization", session.bearer_header())
            .json(features)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(HeartviewError::SessionExpired);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HeartviewError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let outcome: PredictionOutcome =
            response.json().await.map_err(|e| HeartviewError::Json {
                message: format!("Failed to parse prediction response: {}", e),
                source: None,
            })?;
        info!("Prediction stored as record {}", outcome.id);
        Ok(outcome)
    }

    /// Check whether the backend knows an account for this email.
    ///
    /// Any non-success status reads as "not found".
    pub async fn check_user_exists(&self, email: &str) -> Result<bool> {
        let url = format!(
            "{}/check-user/{}",
            self.api_base,
            urlencoding::encode(email)
        );
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> PredictionInput {
        PredictionInput {
            age: "63".into(),
            sex: "M".into(),
            chest_pain: "3".into(),
            resting_bp: "145".into(),
            cholesterol: "233".into(),
            fasting_blood_sugar: "1".into(),
            resting_ecg: "0".into(),
            max_heart_rate: "150".into(),
            exercise_angina: "0".into(),
            st_depression: "2.3".into(),
            st_slope: "0".into(),
            vessel_count: "0".into(),
            thalassemia: "1".into(),
        }
    }

    #[test]
    fn test_sanitize_keeps_digits_and_dots() {
        assert_eq!(sanitize_numeric_input("145"), "145");
        assert_eq!(sanitize_numeric_input("2.3"), "2.3");
        assert_eq!(sanitize_numeric_input("12a/;0.5"), "120.5");
        assert_eq!(sanitize_numeric_input("abc"), "");
    }

    #[test]
    fn test_validate_converts_to_wire_order() {
        let features = sample_input().validate().unwrap();
        assert_eq!(features.age, 63.0);
        assert_eq!(features.sex, "M");
        assert_eq!(features.st_depression, 2.3);
    }

    #[test]
    fn test_validate_rejects_bad_gender() {
        let mut input = sample_input();
        input.sex = "male".into();
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("feature2"));
    }

    #[test]
    fn test_validate_rejects_empty_and_unparseable_fields() {
        let mut input = sample_input();
        input.cholesterol = "".into();
        assert!(input.validate().is_err());

        let mut input = sample_input();
        input.st_depression = "1.2.3".into();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_feature_vector_serializes_wire_names() {
        let features = sample_input().validate().unwrap();
        let json = serde_json::to_value(&features).unwrap();
        assert_eq!(json["feature1"], 63.0);
        assert_eq!(json["feature2"], "M");
        assert_eq!(json["feature10"], 2.3);
        assert!(json.get("age").is_none());
    }

    #[test]
    fn test_outcome_decodes_numeric_prediction() {
        let outcome: PredictionOutcome =
            serde_json::from_value(serde_json::json!({ "id": "rec-9", "prediction": 1 })).unwrap();
        assert_eq!(outcome.prediction, "1");
        assert_eq!(
            outcome.interpretation(),
            "You have heart disease. Please consult your doctor."
        );
    }

    #[test]
    fn test_interpretation_wording() {
        let negative = PredictionOutcome {
            id: "a".into(),
            prediction: "0".into(),
        };
        assert_eq!(negative.interpretation(), "You do not have heart disease.");

        let unknown = PredictionOutcome {
            id: "b".into(),
            prediction: "7".into(),
        };
        assert_eq!(unknown.interpretation(), "Prediction unavailable.");
    }
}
