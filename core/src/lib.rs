//! Drift Simulator RNG - seeded random draws across the kernel boundary
//!
//! The simulator compiles its particle-advection kernels to native code at
//! run time; host-side orchestration must draw from the *same* seeded stream
//! those kernels use. This crate provides that stream: it lazily compiles a
//! small C shim re-exporting the statistics kernel, loads it, and forwards
//! every draw through the resulting native entry points.
//!
//! # Architecture
//!
//! - **config**: cache directory, compiler driver and artifact policy
//! - **shim**: generated C source, artifact paths, compile-and-load factory
//! - **provider**: `KernelRng` lifecycle, seed state and draw facade
//! - **error**: failure taxonomy (stage, compile, load, bind, validate)
//!
//! # Critical Invariants
//!
//! 1. One compiled shim backs all draws for a provider's lifetime;
//!    compilation happens at most once and is never retried
//! 2. Same seed + same draw order => same sequence, on every platform
//! 3. FFI boundary is minimal and safe

// Module declarations
pub mod config;
pub mod error;
pub mod provider;
pub mod shim;

// Re-exports for convenience
pub use config::RngConfig;
pub use error::RngError;
pub use provider::KernelRng;
pub use shim::{
    binding::{LoadedShim, NativeBinding},
    compiler::{Compiler, GnuCompiler},
    compile_and_load, ShimArtifact,
};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn drift_simulator_rng_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::kernel_rng::PyKernelRng>()?;
    Ok(())
}
