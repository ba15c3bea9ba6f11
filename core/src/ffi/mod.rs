//! FFI (Foreign Function Interface) module
//!
//! PyO3 bindings exposing the RNG provider to host-side Python
//! orchestration, so Python code and compiled kernels draw from one stream.
//!
//! # Design Principles
//!
//! 1. **Minimal boundary**: Only expose what's needed
//! 2. **Simple types**: Primitives and tuples at the boundary
//! 3. **Validate inputs**: Draw arguments are checked before crossing into
//!    native code
//! 4. **Safe errors**: Every Rust error becomes a Python exception
//!    (ValueError for bad arguments, RuntimeError for toolchain failures)

pub mod kernel_rng;
