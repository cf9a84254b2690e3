//! The display column table.
//!
//! Every searchable column is enumerated here with its table header label,
//! value accessor, display rendering, and comparator kind. The search
//! logic walks this table instead of reflecting over record fields, so the
//! record shape and the column mapping stay in one auditable place.

use super::{render_number, PredictionRecord};

/// A display column of the history table.
///
/// The opaque record id is not a column and is never searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Age,
    Gender,
    ChestPain,
    RestingBp,
    Cholesterol,
    FastingBloodSugar,
    RestingEcg,
    MaxHeartRate,
    ExerciseAngina,
    StDepression,
    StSlope,
    VesselCount,
    Thalassemia,
    Prediction,
}

/// How a column's values compare against a search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Plain numeric field; numeric-range terms apply.
    Numeric,
    /// Coded field rendered as a word (sex); text comparison only.
    Categorical,
    /// Classification result rendered as a phrase; text comparison only.
    Outcome,
}

impl Column {
    /// All columns in table order.
    pub const ALL: [Column; 14] = [
        Column::Age,
        Column::Gender,
        Column::ChestPain,
        Column::RestingBp,
        Column::Cholesterol,
        Column::FastingBloodSugar,
        Column::RestingEcg,
        Column::MaxHeartRate,
        Column::ExerciseAngina,
        Column::StDepression,
        Column::StSlope,
        Column::VesselCount,
        Column::Thalassemia,
        Column::Prediction,
    ];

    /// The table header label, exactly as the history view titles it.
    pub fn label(&self) -> &'static str {
        match self {
            Column::Age => "Age",
            Column::Gender => "Gender",
            Column::ChestPain => "CP",
            Column::RestingBp => "TrestBPS",
            Column::Cholesterol => "Chol",
            Column::FastingBloodSugar => "FBS",
            Column::RestingEcg => "RestECG",
            Column::MaxHeartRate => "Thalch",
            Column::ExerciseAngina => "Exang",
            Column::StDepression => "Oldpeak",
            Column::StSlope => "Slope",
            Column::VesselCount => "CA",
            Column::Thalassemia => "Thal",
            Column::Prediction => "Prediction",
        }
    }

    /// Map a header label back to its column, case-insensitively.
    ///
    /// Returns `None` for labels the table does not carry, including "id".
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        Column::ALL
            .iter()
            .copied()
            .find(|c| c.label().to_lowercase() == label)
    }

    /// Comparator kind for this column.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Gender => ColumnKind::Categorical,
            Column::Prediction => ColumnKind::Outcome,
            _ => ColumnKind::Numeric,
        }
    }

    /// The raw numeric value for genuinely numeric columns.
    ///
    /// `None` for the sex and prediction columns: range terms never apply
    /// to those even though sex carries a numeric code underneath.
    pub fn numeric_value(&self, record: &PredictionRecord) -> Option<f64> {
        match self {
            Column::Age => Some(record.age),
            Column::ChestPain => Some(record.chest_pain),
            Column::RestingBp => Some(record.resting_bp),
            Column::Cholesterol => Some(record.cholesterol),
            Column::FastingBloodSugar => Some(record.fasting_blood_sugar),
            Column::RestingEcg => Some(record.resting_ecg),
            Column::MaxHeartRate => Some(record.max_heart_rate),
            Column::ExerciseAngina => Some(record.exercise_angina),
            Column::StDepression => Some(record.st_depression),
            Column::StSlope => Some(record.st_slope),
            Column::VesselCount => Some(record.vessel_count),
            Column::Thalassemia => Some(record.thalassemia),
            Column::Gender | Column::Prediction => None,
        }
    }

    /// The lowercase display string comparisons run against.
    pub fn rendered_value(&self, record: &PredictionRecord) -> String {
        match self {
            Column::Gender => record.rendered_sex().to_string(),
            Column::Prediction => record.rendered_prediction().to_string(),
            _ => match self.numeric_value(record) {
                Some(v) => render_number(v),
                None => String::new(),
            },
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::sample_record;

    #[test]
    fn test_label_roundtrip() {
        for column in Column::ALL {
            let label = column.label();
            let parsed = Column::from_label(label).expect("label should parse");
            assert_eq!(column, parsed);
        }
    }

    #[test]
    fn test_from_label_is_case_insensitive() {
        assert_eq!(Column::from_label("trestbps"), Some(Column::RestingBp));
        assert_eq!(Column::from_label("PREDICTION"), Some(Column::Prediction));
        assert_eq!(Column::from_label(" chol "), Some(Column::Cholesterol));
    }

    #[test]
    fn test_from_label_rejects_unknown() {
        assert_eq!(Column::from_label("HeartRate"), None);
        assert_eq!(Column::from_label("id"), None);
        assert_eq!(Column::from_label(""), None);
    }

    #[test]
    fn test_kind_assignment() {
        assert_eq!(Column::Gender.kind(), ColumnKind::Categorical);
        assert_eq!(Column::Prediction.kind(), ColumnKind::Outcome);
        assert_eq!(Column::Cholesterol.kind(), ColumnKind::Numeric);
        assert_eq!(Column::StDepression.kind(), ColumnKind::Numeric);
    }

    #[test]
    fn test_numeric_value_excludes_coded_columns() {
        let record = sample_record();
        assert_eq!(Column::Cholesterol.numeric_value(&record), Some(200.0));
        assert_eq!(Column::Gender.numeric_value(&record), None);
        assert_eq!(Column::Prediction.numeric_value(&record), None);
    }

    #[test]
    fn test_rendered_values() {
        let record = sample_record();
        assert_eq!(Column::Gender.rendered_value(&record), "male");
        assert_eq!(Column::Prediction.rendered_value(&record), "not detected");
        assert_eq!(Column::Cholesterol.rendered_value(&record), "200");
        assert_eq!(Column::StDepression.rendered_value(&record), "1.5");
    }
}
