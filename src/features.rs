//! Feature encoding for the screening model.
//!
//! Converts a questionnaire response into the fixed-order numeric vector
//! the model was trained on. Position `i` of every vector always refers to
//! `FEATURE_NAMES[i]`.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Number of features the model consumes.
pub const FEATURE_COUNT: usize = 32;

/// Feature names in model input order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    // Demographics and lifestyle (10)
    "Age",
    "Gender",
    "Ethnicity",
    "EducationLevel",
    "BMI",
    "Smoking",
    "AlcoholConsumption",
    "PhysicalActivity",
    "DietQuality",
    "SleepQuality",
    // Medical history (6)
    "FamilyHistoryParkinsons",
    "TraumaticBrainInjury",
    "Hypertension",
    "Diabetes",
    "Depression",
    "Stroke",
    // Clinical measurements (6)
    "SystolicBP",
    "DiastolicBP",
    "CholesterolTotal",
    "CholesterolLDL",
    "CholesterolHDL",
    "CholesterolTriglycerides",
    // Assessments (3)
    "UPDRS",
    "MoCA",
    "FunctionalAssessment",
    // Symptoms (7)
    "Tremor",
    "Rigidity",
    "Bradykinesia",
    "PosturalInstability",
    "SpeechProblems",
    "SleepDisorders",
    "Constipation",
];

/// A single questionnaire response.
///
/// JSON keys match `FEATURE_NAMES`. Values are accepted the way the input
/// form produces them: numbers, numeric strings or booleans. Blank,
/// unparsable or absent numeric answers become NaN and encode as 0; absent
/// yes/no answers are `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Questionnaire {
    /// Age in years
    #[serde(rename = "Age", default = "missing", deserialize_with = "lenient_number")]
    pub age: f64,
    /// 0 = male, 1 = female
    #[serde(rename = "Gender", default = "missing", deserialize_with = "lenient_number")]
    pub gender: f64,
    /// 0 = Caucasian, 1 = African American, 2 = Asian, 3 = other
    #[serde(rename = "Ethnicity", default = "missing", deserialize_with = "lenient_number")]
    pub ethnicity: f64,
    /// 0 = none, 1 = high school, 2 = bachelor's, 3 = higher
    #[serde(rename = "EducationLevel", default = "missing", deserialize_with = "lenient_number")]
    pub education_level: f64,
    #[serde(rename = "BMI", default = "missing", deserialize_with = "lenient_number")]
    pub bmi: f64,
    #[serde(rename = "Smoking", default, deserialize_with = "flag")]
    pub smoking: bool,
    /// Units per week
    #[serde(rename = "AlcoholConsumption", default = "missing", deserialize_with = "lenient_number")]
    pub alcohol_consumption: f64,
    /// Hours per week
    #[serde(rename = "PhysicalActivity", default = "missing", deserialize_with = "lenient_number")]
    pub physical_activity: f64,
    /// Score 1-10
    #[serde(rename = "DietQuality", default = "missing", deserialize_with = "lenient_number")]
    pub diet_quality: f64,
    /// Score 1-10
    #[serde(rename = "SleepQuality", default = "missing", deserialize_with = "lenient_number")]
    pub sleep_quality: f64,

    #[serde(rename = "FamilyHistoryParkinsons", default, deserialize_with = "flag")]
    pub family_history_parkinsons: bool,
    #[serde(rename = "TraumaticBrainInjury", default, deserialize_with = "flag")]
    pub traumatic_brain_injury: bool,
    #[serde(rename = "Hypertension", default, deserialize_with = "flag")]
    pub hypertension: bool,
    #[serde(rename = "Diabetes", default, deserialize_with = "flag")]
    pub diabetes: bool,
    #[serde(rename = "Depression", default, deserialize_with = "flag")]
    pub depression: bool,
    #[serde(rename = "Stroke", default, deserialize_with = "flag")]
    pub stroke: bool,

    /// mmHg
    #[serde(rename = "SystolicBP", default = "missing", deserialize_with = "lenient_number")]
    pub systolic_bp: f64,
    /// mmHg
    #[serde(rename = "DiastolicBP", default = "missing", deserialize_with = "lenient_number")]
    pub diastolic_bp: f64,
    /// mg/dL
    #[serde(rename = "CholesterolTotal", default = "missing", deserialize_with = "lenient_number")]
    pub cholesterol_total: f64,
    #[serde(rename = "CholesterolLDL", default = "missing", deserialize_with = "lenient_number")]
    pub cholesterol_ldl: f64,
    #[serde(rename = "CholesterolHDL", default = "missing", deserialize_with = "lenient_number")]
    pub cholesterol_hdl: f64,
    #[serde(rename = "CholesterolTriglycerides", default = "missing", deserialize_with = "lenient_number")]
    pub cholesterol_triglycerides: f64,

    /// Unified Parkinson's Disease Rating Scale
    #[serde(rename = "UPDRS", default = "missing", deserialize_with = "lenient_number")]
    pub updrs: f64,
    /// Montreal Cognitive Assessment, 0-30
    #[serde(rename = "MoCA", default = "missing", deserialize_with = "lenient_number")]
    pub moca: f64,
    /// Score 0-10
    #[serde(rename = "FunctionalAssessment", default = "missing", deserialize_with = "lenient_number")]
    pub functional_assessment: f64,

    #[serde(rename = "Tremor", default, deserialize_with = "flag")]
    pub tremor: bool,
    #[serde(rename = "Rigidity", default, deserialize_with = "flag")]
    pub rigidity: bool,
    #[serde(rename = "Bradykinesia", default, deserialize_with = "flag")]
    pub bradykinesia: bool,
    #[serde(rename = "PosturalInstability", default, deserialize_with = "flag")]
    pub postural_instability: bool,
    #[serde(rename = "SpeechProblems", default, deserialize_with = "flag")]
    pub speech_problems: bool,
    #[serde(rename = "SleepDisorders", default, deserialize_with = "flag")]
    pub sleep_disorders: bool,
    #[serde(rename = "Constipation", default, deserialize_with = "flag")]
    pub constipation: bool,
}

/// Any JSON value the input form may send for a field.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl RawValue {
    fn into_f64(self) -> f64 {
        match self {
            RawValue::Bool(b) => bit(b),
            RawValue::Number(n) => n,
            RawValue::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
            RawValue::Other(_) => f64::NAN,
        }
    }
}

fn missing() -> f64 {
    f64::NAN
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawValue>::deserialize(deserializer)?.map_or(f64::NAN, RawValue::into_f64))
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_number(deserializer)?;
    if value == 1.0 {
        Ok(true)
    } else if value == 0.0 || value.is_nan() {
        Ok(false)
    } else {
        Err(serde::de::Error::custom(format!(
            "expected 0 or 1, got {}",
            value
        )))
    }
}

/// Encodes questionnaires into model input vectors.
pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Create a new feature encoder.
    pub fn new() -> Self {
        Self
    }

    /// Encode a questionnaire in `FEATURE_NAMES` order.
    ///
    /// Booleans become 0/1. Non-finite numbers are encoded as 0.
    pub fn encode(&self, q: &Questionnaire) -> Vec<f64> {
        let raw = [
            q.age,
            q.gender,
            q.ethnicity,
            q.education_level,
            q.bmi,
            bit(q.smoking),
            q.alcohol_consumption,
            q.physical_activity,
            q.diet_quality,
            q.sleep_quality,
            bit(q.family_history_parkinsons),
            bit(q.traumatic_brain_injury),
            bit(q.hypertension),
            bit(q.diabetes),
            bit(q.depression),
            bit(q.stroke),
            q.systolic_bp,
            q.diastolic_bp,
            q.cholesterol_total,
            q.cholesterol_ldl,
            q.cholesterol_hdl,
            q.cholesterol_triglycerides,
            q.updrs,
            q.moca,
            q.functional_assessment,
            bit(q.tremor),
            bit(q.rigidity),
            bit(q.bradykinesia),
            bit(q.postural_instability),
            bit(q.speech_problems),
            bit(q.sleep_disorders),
            bit(q.constipation),
        ];

        raw.into_iter()
            .map(|v| if v.is_finite() { v } else { 0.0 })
            .collect()
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Get feature names in model input order.
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn bit(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_questionnaire() -> Questionnaire {
        serde_json::from_value(serde_json::json!({
            "Age": 67, "Gender": 1, "Ethnicity": 0, "EducationLevel": 2,
            "BMI": 26.4, "Smoking": false, "AlcoholConsumption": 4.5,
            "PhysicalActivity": 3.0, "DietQuality": 6, "SleepQuality": 7,
            "FamilyHistoryParkinsons": 1, "TraumaticBrainInjury": 0,
            "Hypertension": true, "Diabetes": 0, "Depression": 0, "Stroke": 0,
            "SystolicBP": 135, "DiastolicBP": 88, "CholesterolTotal": 210,
            "CholesterolLDL": 130, "CholesterolHDL": 55,
            "CholesterolTriglycerides": 180, "UPDRS": 42, "MoCA": 24,
            "FunctionalAssessment": 6.5, "Tremor": 1, "Rigidity": 0,
            "Bradykinesia": 1, "PosturalInstability": 0, "SpeechProblems": 0,
            "SleepDisorders": 1, "Constipation": 0
        }))
        .expect("sample questionnaire should deserialize")
    }

    #[test]
    fn test_feature_encoding() {
        let encoder = FeatureEncoder::new();
        let features = encoder.encode(&sample_questionnaire());

        assert_eq!(features.len(), encoder.feature_count());
        assert_eq!(features[0], 67.0); // Age
        assert_eq!(features[4], 26.4); // BMI
        assert_eq!(features[10], 1.0); // FamilyHistoryParkinsons
        assert_eq!(features[12], 1.0); // Hypertension
        assert_eq!(features[22], 42.0); // UPDRS
        assert_eq!(features[31], 0.0); // Constipation
    }

    #[test]
    fn test_feature_count() {
        let encoder = FeatureEncoder::new();
        assert_eq!(encoder.feature_count(), 32);
        assert_eq!(encoder.feature_names().len(), 32);
        assert_eq!(encoder.feature_names()[16], "SystolicBP");
    }

    #[test]
    fn test_serialized_keys_match_feature_names() {
        let value = serde_json::to_value(sample_questionnaire()).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        let mut expected = FEATURE_NAMES.to_vec();
        let mut actual = keys.clone();
        expected.sort_unstable();
        actual.sort_unstable();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_non_finite_values_encode_as_zero() {
        let mut q = sample_questionnaire();
        q.bmi = f64::NAN;
        q.updrs = f64::INFINITY;
        let features = FeatureEncoder::new().encode(&q);
        assert_eq!(features[4], 0.0);
        assert_eq!(features[22], 0.0);
    }

    #[test]
    fn test_form_style_values_are_accepted() {
        let mut value = serde_json::to_value(sample_questionnaire()).unwrap();
        value["Age"] = serde_json::json!("67");
        value["Gender"] = serde_json::json!(1.0);
        value["MoCA"] = serde_json::json!(" 24.5 ");
        value["Tremor"] = serde_json::json!("1");
        value["Rigidity"] = serde_json::json!(1.0);

        let q: Questionnaire = serde_json::from_value(value).unwrap();
        let features = FeatureEncoder::new().encode(&q);

        assert_eq!(features[0], 67.0);
        assert_eq!(features[1], 1.0);
        assert_eq!(features[23], 24.5);
        assert!(q.tremor);
        assert!(q.rigidity);
    }

    #[test]
    fn test_absent_blank_and_unparsable_values_encode_as_zero() {
        let mut value = serde_json::to_value(sample_questionnaire()).unwrap();
        let fields = value.as_object_mut().unwrap();
        fields.remove("BMI");
        fields.remove("Stroke");
        fields.insert("UPDRS".to_string(), serde_json::json!(""));
        fields.insert("DietQuality".to_string(), serde_json::json!("n/a"));
        fields.insert("SleepQuality".to_string(), serde_json::Value::Null);

        let q: Questionnaire = serde_json::from_value(value).unwrap();
        assert!(q.bmi.is_nan());
        assert!(!q.stroke);

        let features = FeatureEncoder::new().encode(&q);
        assert_eq!(features[4], 0.0); // BMI
        assert_eq!(features[8], 0.0); // DietQuality
        assert_eq!(features[9], 0.0); // SleepQuality
        assert_eq!(features[15], 0.0); // Stroke
        assert_eq!(features[22], 0.0); // UPDRS
    }

    #[test]
    fn test_boolean_in_numeric_field_encodes_as_bit() {
        let mut value = serde_json::to_value(sample_questionnaire()).unwrap();
        value["Gender"] = serde_json::json!(true);
        let q: Questionnaire = serde_json::from_value(value).unwrap();
        assert_eq!(FeatureEncoder::new().encode(&q)[1], 1.0);
    }

    #[test]
    fn test_flag_rejects_other_numbers() {
        let mut value = serde_json::to_value(sample_questionnaire()).unwrap();
        value["Tremor"] = serde_json::json!(2);
        let result: Result<Questionnaire, _> = serde_json::from_value(value);
        assert!(result.is_err());
    }
}
