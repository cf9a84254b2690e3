//! Prediction record model.
//!
//! Records are created by the prediction backend and are immutable from the
//! client's perspective: the client fetches them into an ordered in-memory
//! list, filters them, and deletes them by id. The wire shape uses the
//! backend's `feature1..feature13` field names; this module maps those onto
//! named clinical fields and owns the display rendering rules the search
//! logic compares against.

mod columns;

pub use columns::{Column, ColumnKind};

use serde::{Deserialize, Deserializer, Serialize};

/// One stored prediction event.
///
/// The 13 feature values follow the standard heart-disease dataset order:
/// age, sex (1 = male, 0 = female), chest pain type, resting blood
/// pressure, cholesterol, fasting blood sugar flag, resting ECG code,
/// maximum heart rate, exercise-induced angina flag, ST depression,
/// ST slope code, major vessel count, thalassemia code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Opaque backend identifier; not searchable.
    pub id: String,
    #[serde(rename = "feature1")]
    pub age: f64,
    #[serde(rename = "feature2")]
    pub sex: f64,
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
    /// Stringified binary classification: "0" = not detected.
    #[serde(deserialize_with = "de_string_or_number")]
    pub prediction: String,
}

/// Accept either a JSON string or a bare number for the prediction field.
///
/// The backend stores the classifier output as an integer, so fresh
/// records arrive as `"prediction": 1` while re-serialized ones carry
/// `"prediction": "1"`. Both normalize to the string form.
pub(crate) fn de_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Text(s) => s,
        StringOrNumber::Int(i) => i.to_string(),
        StringOrNumber::Float(f) => f.to_string(),
    })
}

impl PredictionRecord {
    /// Rendered sex value: encoded 1 displays as "male", anything else
    /// as "female".
    pub fn rendered_sex(&self) -> &'static str {
        if self.sex == 1.0 {
            "male"
        } else {
            "female"
        }
    }

    /// Rendered prediction value: "0" displays as "not detected", any
    /// other value as "detected".
    pub fn rendered_prediction(&self) -> &'static str {
        if self.prediction == "0" {
            "not detected"
        } else {
            "detected"
        }
    }
}

/// Lowercase display form of a numeric field value.
///
/// Matches the way the history table prints backend floats: whole values
/// lose their fractional zero (120.0 shows as "120", 1.5 stays "1.5").
pub(crate) fn render_number(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
pub(crate) fn sample_record() -> PredictionRecord {
    PredictionRecord {
        id: "rec-1".to_string(),
        age: 54.0,
        sex: 1.0,
        chest_pain: 0.0,
        resting_bp: 130.0,
        cholesterol: 200.0,
        fasting_blood_sugar: 0.0,
        resting_ecg: 1.0,
        max_heart_rate: 150.0,
        exercise_angina: 0.0,
        st_depression: 1.5,
        st_slope: 2.0,
        vessel_count: 0.0,
        thalassemia: 3.0,
        prediction: "0".to_string(),
    }
}
