//! Backend-neutral session abstraction.
//!
//! The loader and predictor only see these traits, so any execution
//! backend (or a test double) can sit behind them.

use crate::error::InferenceError;
use std::sync::Arc;

/// Input slot name used when a session reports none.
pub const DEFAULT_INPUT_NAME: &str = "input";

/// Output slot name used when a session reports none.
pub const DEFAULT_OUTPUT_NAME: &str = "output";

/// Dense `f32` input tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    pub shape: Vec<i64>,
    pub data: Vec<f32>,
}

impl InputTensor {
    /// Single-batch, single-row tensor of shape `[1, n]`.
    pub fn row(data: Vec<f32>) -> Self {
        Self {
            shape: vec![1, data.len() as i64],
            data,
        }
    }
}

/// Owned copy of one model output.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputTensor {
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Int64(Vec<i64>),
}

impl OutputTensor {
    /// Value at flat index 0, coerced to `f64`.
    pub fn first_scalar(&self) -> Option<f64> {
        match self {
            OutputTensor::Float32(data) => data.first().map(|&v| f64::from(v)),
            OutputTensor::Float64(data) => data.first().copied(),
            OutputTensor::Int64(data) => data.first().map(|&v| v as f64),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OutputTensor::Float32(data) => data.len(),
            OutputTensor::Float64(data) => data.len(),
            OutputTensor::Int64(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A loaded, ready-to-execute model.
pub trait ModelSession: Send + Sync {
    /// Input slot names in declaration order.
    fn input_names(&self) -> Vec<String>;

    /// Output slot names in declaration order.
    fn output_names(&self) -> Vec<String>;

    /// Run one forward pass, binding `input` to `input_name` and returning
    /// the output named `output_name`.
    fn run(
        &self,
        input_name: &str,
        input: InputTensor,
        output_name: &str,
    ) -> Result<OutputTensor, InferenceError>;
}

/// Creates sessions for the loader. Called at most once per load attempt.
pub trait SessionFactory: Send + Sync + 'static {
    fn create_session(&self) -> Result<Arc<dyn ModelSession>, InferenceError>;
}
