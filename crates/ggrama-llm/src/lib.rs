//! # ggrama model runtimes
//!
//! Implementations of [`ggrama_core::ConstrainedGenerator`]:
//!
//! - [`LlamaServerGenerator`]: an OpenAI-compatible llama-server over HTTP (default)
//! - `LlamaCppGenerator`: in-process llama.cpp, behind the `llama-cpp` feature
//!
//! [`BackendFactory`] picks one from the resolved configuration.

#![warn(clippy::all)]

pub mod factory;
pub mod server;

#[cfg(feature = "llama-cpp")]
pub mod llama_cpp;

pub use factory::BackendFactory;
pub use server::{ApiError, ApiResult, LlamaClient, LlamaServerGenerator, TextCompletionRequest};

#[cfg(feature = "llama-cpp")]
pub use llama_cpp::LlamaCppGenerator;
