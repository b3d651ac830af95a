// Roundtable - multi-persona LLM debates
// Library exports

pub mod config;
pub mod debate;
pub mod errors;
pub mod generators;
pub mod providers;

pub use errors::{DebateError, DebateResult, ValidationWarning};
