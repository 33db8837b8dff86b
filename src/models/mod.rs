//! Model loading and inference components

pub mod inference;
pub mod loader;
pub mod ort_session;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use inference::InferenceEngine;
pub use loader::{LoadStatus, ModelLoader};
pub use ort_session::{OrtModelSession, OrtSessionFactory};
pub use session::{InputTensor, ModelSession, OutputTensor, SessionFactory};
