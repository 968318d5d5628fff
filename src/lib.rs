pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod matrix;
pub mod scoring;
pub mod taxonomy;

pub use context::PipelineContext;
pub use error::{PipelineError, Result};
