// Engine library root: readers for the two demand exports, the normalizer
// that cleans them and the dashboard computations over the result.

pub mod config;
pub mod data;
pub mod error;
pub mod services;

pub use error::{EngineError, Result};
pub use services::normalizer::{load_and_normalize, Normalized, NormalizerOptions};
