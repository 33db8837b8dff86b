//! Test doubles for the session seam

use crate::error::InferenceError;
use crate::models::session::{InputTensor, ModelSession, OutputTensor, SessionFactory};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Session returning a fixed output and recording what it was fed.
pub struct StubSession {
    output: OutputTensor,
    input_names: Vec<String>,
    output_names: Vec<String>,
    runs: Arc<AtomicUsize>,
    last_call: Arc<Mutex<Option<(String, InputTensor, String)>>>,
    run_delay: Duration,
    run_error: Option<String>,
}

impl ModelSession for StubSession {
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
        self.runs.fetch_add(1, Ordering::SeqCst);
        if !self.run_delay.is_zero() {
            std::thread::sleep(self.run_delay);
        }
        if let Some(message) = &self.run_error {
            return Err(InferenceError::InferenceExecution(message.clone()));
        }
        if input.shape != vec![1, 32] {
            return Err(InferenceError::InferenceExecution(format!(
                "unexpected shape {:?}",
                input.shape
            )));
        }
        *self.last_call.lock().unwrap() =
            Some((input_name.to_string(), input, output_name.to_string()));
        Ok(self.output.clone())
    }
}

/// Factory that counts loads and can be scripted to fail or stall.
#[derive(Clone)]
pub struct StubFactory {
    pub loads: Arc<AtomicUsize>,
    pub runs: Arc<AtomicUsize>,
    pub last_call: Arc<Mutex<Option<(String, InputTensor, String)>>>,
    failures_remaining: Arc<AtomicUsize>,
    delay: Duration,
    run_delay: Duration,
    run_error: Option<String>,
    output: OutputTensor,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl StubFactory {
    pub fn new(output: OutputTensor) -> Self {
        Self {
            loads: Arc::new(AtomicUsize::new(0)),
            runs: Arc::new(AtomicUsize::new(0)),
            last_call: Arc::new(Mutex::new(None)),
            failures_remaining: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
            run_delay: Duration::ZERO,
            run_error: None,
            output,
            input_names: vec!["features".to_string()],
            output_names: vec!["probability".to_string()],
        }
    }

    /// Stall every load for `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Stall every forward pass for `delay`.
    pub fn with_run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = delay;
        self
    }

    /// Make every forward pass fail with `message`.
    pub fn failing_runs(mut self, message: &str) -> Self {
        self.run_error = Some(message.to_string());
        self
    }

    /// Fail the next `count` loads.
    pub fn failing(self, count: usize) -> Self {
        self.failures_remaining.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_names(mut self, inputs: &[&str], outputs: &[&str]) -> Self {
        self.input_names = inputs.iter().map(|s| s.to_string()).collect();
        self.output_names = outputs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn run_count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl SessionFactory for StubFactory {
    fn create_session(&self) -> Result<Arc<dyn ModelSession>, InferenceError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let should_fail = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(InferenceError::ModelLoad("stub load failure".to_string()));
        }

        Ok(Arc::new(StubSession {
            output: self.output.clone(),
            input_names: self.input_names.clone(),
            output_names: self.output_names.clone(),
            runs: Arc::clone(&self.runs),
            last_call: Arc::clone(&self.last_call),
            run_delay: self.run_delay,
            run_error: self.run_error.clone(),
        }))
    }
}
