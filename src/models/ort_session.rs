//! ONNX Runtime backend

use crate::error::InferenceError;
use crate::models::session::{InputTensor, ModelSession, OutputTensor, SessionFactory};
use anyhow::Context;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::info;

/// Outcome of the process-wide runtime configuration.
static RUNTIME: OnceLock<Result<(), String>> = OnceLock::new();

/// Configure ONNX Runtime once per process. Later calls return the first outcome.
fn configure_runtime() -> Result<(), InferenceError> {
    RUNTIME
        .get_or_init(|| {
            let result = ort::init()
                .with_name("parkinsons-screening")
                .commit()
                .map(|_| ())
                .map_err(|e| e.to_string());
            if result.is_ok() {
                info!("ONNX Runtime initialized");
            }
            result
        })
        .clone()
        .map_err(|e| InferenceError::ModelLoad(format!("runtime initialization failed: {}", e)))
}

/// Builds ONNX Runtime sessions from a model file
#[derive(Debug, Clone)]
pub struct OrtSessionFactory {
    model_path: PathBuf,
    intra_threads: usize,
}

impl OrtSessionFactory {
    /// Factory with a single intra-op thread
    pub fn new<P: AsRef<Path>>(model_path: P) -> Self {
        Self::with_threads(model_path, 1)
    }

    pub fn with_threads<P: AsRef<Path>>(model_path: P, intra_threads: usize) -> Self {
        Self {
            model_path: model_path.as_ref().to_path_buf(),
            intra_threads: intra_threads.max(1),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn build_session(&self) -> anyhow::Result<Session> {
        let session = Session::builder()?
            .with_execution_providers([CPUExecutionProvider::default().build()])?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.intra_threads)?
            .commit_from_file(&self.model_path)
            .with_context(|| format!("Failed to load model from {:?}", self.model_path))?;
        Ok(session)
    }
}

impl SessionFactory for OrtSessionFactory {
    fn create_session(&self) -> Result<Arc<dyn ModelSession>, InferenceError> {
        let path = &self.model_path;

        if !path.exists() {
            return Err(InferenceError::ModelLoad(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        configure_runtime()?;

        info!(path = %path.display(), threads = self.intra_threads, "Loading ONNX model");

        let session = self.build_session().map_err(|e| {
            InferenceError::ModelLoad(format!("failed to load {}: {:#}", path.display(), e))
        })?;

        Ok(Arc::new(OrtModelSession::new(session)))
    }
}

/// A loaded ONNX Runtime session.
///
/// `Session::run` needs exclusive access, so concurrent predictions are
/// serialized on the mutex.
pub struct OrtModelSession {
    session: Mutex<Session>,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl OrtModelSession {
    fn new(session: Session) -> Self {
        let input_names = session.inputs.iter().map(|i| i.name.clone()).collect();
        let output_names = session.outputs.iter().map(|o| o.name.clone()).collect();
        Self {
            session: Mutex::new(session),
            input_names,
            output_names,
        }
    }
}

impl ModelSession for OrtModelSession {
    fn input_names(&self) -> Vec<String> {
        self.input_names.clone()
    }

    fn output_names(&self) -> Vec<String> {
        self.output_names.clone()
    }

    fn run(
        &self,
        input_name: &str,
        input: InputTensor,
        output_name: &str,
    ) -> Result<OutputTensor, InferenceError> {
        let tensor = Tensor::from_array((input.shape, input.data)).map_err(|e| {
            InferenceError::InferenceExecution(format!("failed to create input tensor: {}", e))
        })?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| InferenceError::InferenceExecution(format!("Lock error: {}", e)))?;

        let outputs = session
            .run(ort::inputs![input_name => tensor])
            .map_err(|e| InferenceError::InferenceExecution(e.to_string()))?;

        let output = outputs.get(output_name).ok_or_else(|| {
            InferenceError::InferenceExecution(format!("model produced no output '{}'", output_name))
        })?;

        // f32 is the documented contract; wider types are accepted for
        // differently-exported models.
        if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            return Ok(OutputTensor::Float32(data.to_vec()));
        }
        if let Ok((_, data)) = output.try_extract_tensor::<f64>() {
            return Ok(OutputTensor::Float64(data.to_vec()));
        }
        if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
            return Ok(OutputTensor::Int64(data.to_vec()));
        }

        Err(InferenceError::InferenceExecution(format!(
            "output '{}' is not a numeric tensor",
            output_name
        )))
    }
}
