//! Per-point matching pipeline.
//!
//! Wires the correlator, the normalizer, the peak evaluator and the
//! sub-pixel fitter together and applies the final displacement gate.

mod error;
mod pipeline;
mod result;

pub use error::Rejection;
pub use pipeline::ChipMatcher;
pub use result::ChipMatch;
