//! Parkinson's Screening Library
//!
//! Turns a 32-field clinical questionnaire into a risk score using a
//! pre-trained ONNX model executed in-process.

pub mod assessment;
pub mod config;
pub mod error;
pub mod features;
pub mod models;
pub mod normalizer;

pub use assessment::{Outcome, RiskAssessment};
pub use config::AppConfig;
pub use error::InferenceError;
pub use features::{FeatureEncoder, Questionnaire, FEATURE_COUNT, FEATURE_NAMES};
pub use models::inference::InferenceEngine;
pub use normalizer::NormalizationStatistics;
