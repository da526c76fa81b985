//! Preprocessing pipeline for dataset payloads
//!
//! Provides the fit-once transformation chain applied to a dataset's
//! declared columns:
//! - Categorical label encoding (with exposed forward/reverse maps)
//! - Categorical most-frequent imputation
//! - Continuous standardization
//! - Continuous mean imputation

mod encoder;
mod imputer;
mod scaler;
mod pipeline;

pub use encoder::LabelEncoder;
pub use imputer::{ImputeStrategy, Imputer};
pub use scaler::Scaler;
pub use pipeline::Preprocessor;
