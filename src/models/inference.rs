//! Prediction pipeline: validate, load, standardize, run, unwrap.

use crate::assessment::RiskAssessment;
use crate::config::AppConfig;
use crate::error::InferenceError;
use crate::features::{FeatureEncoder, Questionnaire, FEATURE_COUNT};
use crate::models::loader::{LoadStatus, ModelLoader};
use crate::models::ort_session::OrtSessionFactory;
use crate::models::session::{
    InputTensor, SessionFactory, DEFAULT_INPUT_NAME, DEFAULT_OUTPUT_NAME,
};
use crate::normalizer::NormalizationStatistics;
use std::time::{Duration, Instant};
use tracing::debug;

/// Screening inference engine.
///
/// Construct once and share by reference (or `Arc`) with every caller;
/// the underlying session is created on first use and reused afterwards.
pub struct InferenceEngine<F: SessionFactory = OrtSessionFactory> {
    loader: ModelLoader<F>,
    statistics: NormalizationStatistics,
    encoder: FeatureEncoder,
    inference_timeout: Option<Duration>,
    threshold: f64,
}

impl InferenceEngine<OrtSessionFactory> {
    /// Create an engine backed by ONNX Runtime from configuration.
    ///
    /// Nothing is loaded until `load` or the first `predict`.
    pub fn new(config: &AppConfig) -> Self {
        let factory =
            OrtSessionFactory::with_threads(&config.model.path, config.model.intra_threads);
        Self::with_factory(factory, NormalizationStatistics::default())
            .with_load_timeout(config.model.load_timeout())
            .with_inference_timeout(config.model.inference_timeout())
            .with_threshold(config.assessment.threshold)
    }
}

impl<F: SessionFactory> InferenceEngine<F> {
    /// Create an engine around any session backend.
    pub fn with_factory(factory: F, statistics: NormalizationStatistics) -> Self {
        Self {
            loader: ModelLoader::new(factory),
            statistics,
            encoder: FeatureEncoder::new(),
            inference_timeout: None,
            threshold: 0.5,
        }
    }

    pub fn with_load_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.loader = self.loader.with_timeout(timeout);
        self
    }

    pub fn with_inference_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.inference_timeout = timeout;
        self
    }

    /// Probability above which an assessment is positive.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn load_status(&self) -> LoadStatus {
        self.loader.status()
    }

    /// Warm the model up. Safe to call any number of times, or not at all.
    pub async fn load(&self) -> Result<(), InferenceError> {
        self.loader.ensure_loaded().await.map(|_| ())
    }

    /// Predict the positive-class probability for a raw 32-feature vector.
    ///
    /// The returned score is whatever the model's first output holds at
    /// index 0; no sigmoid is applied.
    pub async fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        if features.len() != FEATURE_COUNT {
            return Err(InferenceError::InputShape {
                expected: FEATURE_COUNT,
                actual: features.len(),
            });
        }

        let session = self.loader.ensure_loaded().await?;
        let standardized = self.statistics.standardize(features)?;

        let input_name = session
            .input_names()
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_INPUT_NAME.to_string());
        let output_name = session
            .output_names()
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_OUTPUT_NAME.to_string());

        let input = InputTensor::row(standardized.iter().map(|&v| v as f32).collect());

        let started = Instant::now();
        let run_output_name = output_name.clone();
        let run = tokio::task::spawn_blocking(move || {
            session.run(&input_name, input, &run_output_name)
        });

        let joined = match self.inference_timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                InferenceError::Timeout {
                    stage: "inference",
                    after_ms: limit.as_millis() as u64,
                }
            })?,
            None => run.await,
        };
        let output = joined
            .map_err(|e| InferenceError::InferenceExecution(format!("inference task failed: {}", e)))??;

        let score = output.first_scalar().ok_or_else(|| {
            InferenceError::InferenceExecution(format!("output '{}' is empty", output_name))
        })?;

        debug!(
            score,
            output = %output_name,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Prediction complete"
        );

        Ok(score)
    }

    /// Encode a questionnaire, predict, and classify the result.
    pub async fn assess(&self, questionnaire: &Questionnaire) -> Result<RiskAssessment, InferenceError> {
        let features = self.encoder.encode(questionnaire);
        let probability = self.predict(&features).await?;
        Ok(RiskAssessment::from_probability(probability, self.threshold))
    }
}
