//! PyO3 wrapper for the RNG provider

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::error::RngError;
use crate::provider::KernelRng as RustKernelRng;

/// Python wrapper for the Rust RNG provider
///
/// # Example (from Python)
///
/// ```python
/// from drift_simulator_rng_rs import KernelRng
///
/// rng = KernelRng()
/// rng.seed(42)
/// x = rng.random()
/// rng.seed(42)
/// assert rng.random() == x
/// ```
#[pyclass(name = "KernelRng")]
pub struct PyKernelRng {
    inner: RustKernelRng,
}

fn to_py_err(e: RngError) -> PyErr {
    if e.is_fatal() {
        PyRuntimeError::new_err(e.to_string())
    } else {
        PyValueError::new_err(e.to_string())
    }
}

#[pymethods]
impl PyKernelRng {
    /// Create a provider. With `seed`, the value is recorded but the native
    /// side stays unseeded until the first draw or an explicit `seed()`
    /// call; compilation stays deferred either way.
    #[new]
    #[pyo3(signature = (seed=None))]
    fn new(seed: Option<i32>) -> PyResult<Self> {
        let inner = RustKernelRng::new();
        if let Some(seed) = seed {
            inner.reseed(seed, false).map_err(to_py_err)?;
        }
        Ok(Self { inner })
    }

    /// Set the seed; with `c_seed` (the default) the native generator is
    /// seeded immediately, compiling the shim if needed
    #[pyo3(signature = (seed, c_seed=true))]
    fn seed(&self, seed: i32, c_seed: bool) -> PyResult<()> {
        self.inner.reseed(seed, c_seed).map_err(to_py_err)
    }

    /// Current `(seed, seeded)` pair
    fn get_seed(&self) -> (i32, bool) {
        self.inner.get_seed()
    }

    /// Random float in `[0, 1)`
    fn random(&self) -> PyResult<f32> {
        self.inner.random().map_err(to_py_err)
    }

    /// Random float in `[low, high)`
    fn uniform(&self, low: f32, high: f32) -> PyResult<f32> {
        self.inner.uniform(low, high).map_err(to_py_err)
    }

    /// Random integer in `[low, high]`, inclusive
    fn randint(&self, low: i32, high: i32) -> PyResult<i32> {
        self.inner.randint(low, high).map_err(to_py_err)
    }

    /// Normal draw with mean `loc` and standard deviation `scale`
    fn normalvariate(&self, loc: f32, scale: f32) -> PyResult<f32> {
        self.inner.normalvariate(loc, scale).map_err(to_py_err)
    }

    /// Exponential draw with rate `lamb`
    fn expovariate(&self, lamb: f32) -> PyResult<f32> {
        self.inner.expovariate(lamb).map_err(to_py_err)
    }

    /// Force shim compilation and loading now instead of at the first draw
    fn ensure_loaded(&self) -> PyResult<()> {
        self.inner.ensure_loaded().map(|_| ()).map_err(to_py_err)
    }

    fn is_loaded(&self) -> bool {
        self.inner.is_loaded()
    }
}
