//! Error taxonomy for the RNG facility
//!
//! A provider that fails to compile or load its shim is permanently unusable:
//! the first error is cached and replayed to every later caller, so every
//! variant here is `Clone`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the RNG provider and draw facade
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RngError {
    /// Staging the generated source or kernel header into the cache
    /// directory failed
    #[error("failed to stage shim sources at {}: {reason}", .path.display())]
    SourceWrite { path: PathBuf, reason: String },

    /// The external compiler could not be launched, exited non-zero, or
    /// exceeded the configured timeout
    #[error("shim compilation failed ({detail}); build output: {}", .log_path.display())]
    Compilation { log_path: PathBuf, detail: String },

    /// The artifact compiled but could not be mapped into the process
    #[error("compiled shim could not be loaded from {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    /// An entry point was missing from the loaded shim
    #[error("native entry point `{symbol}` could not be bound: {reason}")]
    NativeCall {
        symbol: &'static str,
        reason: String,
    },

    /// Draw bounds with `low > high`
    #[error("inverted range: low {low} must not exceed high {high}")]
    InvertedRange { low: f64, high: f64 },

    /// Distribution parameter outside its valid domain
    #[error("distribution parameter `{name}` is out of range: {value}")]
    ParameterOutOfRange { name: &'static str, value: f64 },
}

impl RngError {
    /// True for errors produced by the compile-and-load lifecycle, which are
    /// cached and replayed; validation errors are per-call.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RngError::SourceWrite { .. }
                | RngError::Compilation { .. }
                | RngError::Load { .. }
                | RngError::NativeCall { .. }
        )
    }
}
