//! RNG provider: compile-once lifecycle, seed state and draw facade
//!
//! `KernelRng` is an explicit context object. Each instance owns its own
//! artifact paths, seed state and loaded shim; two instances in one process
//! are fully independent. All draws issued against one instance come from
//! the single native generator behind it, so host-side orchestration and
//! compiled kernels observe one seeded stream.
//!
//! # Critical invariants
//!
//! 1. Compilation happens at most once per instance; the first outcome
//!    (success or failure) is cached and replayed, never retried.
//! 2. `seeded` is true only after the native seed entry point has run with
//!    the current seed.
//! 3. The check-then-seed-then-draw sequence is serialized: two racing first
//!    draws cannot both seed, and draws never interleave inside the native
//!    generator.

use std::sync::{Arc, Mutex, OnceLock};

use rand::Rng as _;

use crate::config::RngConfig;
use crate::error::RngError;
use crate::shim::binding::NativeBinding;
use crate::shim::compiler::{Compiler, GnuCompiler};
use crate::shim::{compile_and_load, ShimArtifact};

/// Logical seed state, guarded by the provider's mutex
#[derive(Debug, Clone, Copy)]
struct SeedState {
    seed: i32,
    seeded: bool,
}

/// Seedable random-draw provider backed by a lazily compiled native shim
///
/// # Example
/// ```no_run
/// use drift_simulator_rng_rs::KernelRng;
///
/// let rng = KernelRng::new();
/// rng.reseed(42, true)?;
/// let x = rng.random()?;
/// rng.reseed(42, true)?;
/// assert_eq!(rng.random()?, x);
/// # Ok::<(), drift_simulator_rng_rs::RngError>(())
/// ```
pub struct KernelRng {
    config: RngConfig,
    artifact: ShimArtifact,
    compiler: Box<dyn Compiler>,
    shim: OnceLock<Result<Arc<dyn NativeBinding>, RngError>>,
    state: Mutex<SeedState>,
}

impl KernelRng {
    /// Create a provider with default configuration.
    ///
    /// The default seed comes from OS entropy; it is the only entropy this
    /// crate ever introduces. Draws are deterministic from whatever seed is
    /// in effect when the native side is first seeded.
    pub fn new() -> Self {
        Self::with_config(RngConfig::default())
    }

    pub fn with_config(config: RngConfig) -> Self {
        let compiler = Box::new(GnuCompiler::from_config(&config));
        Self::with_compiler(config, compiler)
    }

    /// Create a provider driving a custom [`Compiler`] collaborator
    pub fn with_compiler(config: RngConfig, compiler: Box<dyn Compiler>) -> Self {
        let artifact = ShimArtifact::new_in(&config.resolved_cache_dir());
        let seed = rand::thread_rng().gen_range(0..i32::MAX);
        Self {
            config,
            artifact,
            compiler,
            shim: OnceLock::new(),
            state: Mutex::new(SeedState {
                seed,
                seeded: false,
            }),
        }
    }

    /// Compile, load and bind the shim if that has not happened yet.
    ///
    /// Idempotent: every call after the first returns the cached outcome,
    /// including a cached failure. Concurrent callers block until the single
    /// in-flight compilation finishes.
    pub fn ensure_loaded(&self) -> Result<Arc<dyn NativeBinding>, RngError> {
        self.shim
            .get_or_init(|| {
                compile_and_load(&self.artifact, self.compiler.as_ref())
                    .map(|shim| Arc::new(shim) as Arc<dyn NativeBinding>)
            })
            .clone()
    }

    /// Current `(seed, seeded)` pair; pure read, no side effects
    pub fn get_seed(&self) -> (i32, bool) {
        let state = self.lock_state();
        (state.seed, state.seeded)
    }

    /// Record `seed` and, when `seed_native`, push it into the native
    /// generator (compiling the shim first if needed).
    ///
    /// With `seed_native = false` the native side is left unseeded: the
    /// recorded seed only takes effect when a draw forces seeding, and
    /// `get_seed` reports `seeded = false` until then.
    pub fn reseed(&self, seed: i32, seed_native: bool) -> Result<(), RngError> {
        let mut state = self.lock_state();
        state.seed = seed;
        if seed_native {
            let shim = self.ensure_loaded()?;
            shim.seed(seed);
            state.seeded = true;
        } else {
            state.seeded = false;
        }
        Ok(())
    }

    /// Random float in `[0, 1)`
    pub fn random(&self) -> Result<f32, RngError> {
        self.draw(|shim| shim.random())
    }

    /// Random float in `[low, high)`
    pub fn uniform(&self, low: f32, high: f32) -> Result<f32, RngError> {
        if low > high {
            return Err(RngError::InvertedRange {
                low: f64::from(low),
                high: f64::from(high),
            });
        }
        self.draw(|shim| shim.uniform(low, high))
    }

    /// Random integer in `[low, high]`, both ends inclusive
    pub fn randint(&self, low: i32, high: i32) -> Result<i32, RngError> {
        if low > high {
            return Err(RngError::InvertedRange {
                low: f64::from(low),
                high: f64::from(high),
            });
        }
        self.draw(|shim| shim.randint(low, high))
    }

    /// Random float from a normal distribution with mean `loc` and standard
    /// deviation `scale`
    pub fn normalvariate(&self, loc: f32, scale: f32) -> Result<f32, RngError> {
        if scale < 0.0 {
            return Err(RngError::ParameterOutOfRange {
                name: "scale",
                value: f64::from(scale),
            });
        }
        self.draw(|shim| shim.normalvariate(loc, scale))
    }

    /// Random float from an exponential distribution with rate `lambda`
    pub fn expovariate(&self, lambda: f32) -> Result<f32, RngError> {
        if lambda <= 0.0 {
            return Err(RngError::ParameterOutOfRange {
                name: "lambda",
                value: f64::from(lambda),
            });
        }
        self.draw(|shim| shim.expovariate(lambda))
    }

    /// Whether the shim is compiled, loaded and bound
    pub fn is_loaded(&self) -> bool {
        matches!(self.shim.get(), Some(Ok(_)))
    }

    /// On-disk paths backing this instance
    pub fn artifact(&self) -> &ShimArtifact {
        &self.artifact
    }

    pub fn config(&self) -> &RngConfig {
        &self.config
    }

    /// Drop the loaded shim and, unless `keep_artifacts` is set, remove the
    /// staged files. Removal is best effort; failures are logged, not
    /// surfaced.
    pub fn shutdown(self) {
        let KernelRng {
            config,
            artifact,
            shim,
            ..
        } = self;
        // The library must be unmapped before its file is unlinked
        drop(shim);
        if !config.keep_artifacts {
            artifact.remove();
        }
    }

    /// Seed the native generator if it has not been seeded yet, then issue
    /// one draw. The lock is held across the native call: the generator's
    /// hidden state must not see interleaved draws.
    fn draw<T>(&self, f: impl FnOnce(&dyn NativeBinding) -> T) -> Result<T, RngError> {
        let shim = self.ensure_loaded()?;
        let mut state = self.lock_state();
        if !state.seeded {
            tracing::debug!(seed = state.seed, "seeding native generator on first draw");
            shim.seed(state.seed);
            state.seeded = true;
        }
        Ok(f(shim.as_ref()))
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SeedState> {
        // A poisoned lock only means a panic mid-draw; the state itself is
        // always coherent
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for KernelRng {
    fn default() -> Self {
        Self::new()
    }
}
