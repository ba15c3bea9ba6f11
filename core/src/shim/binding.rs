//! Typed binding over the loaded shim
//!
//! The facade never touches `libloading` directly: it sees six typed entry
//! points behind [`NativeBinding`], and the loading mechanism stays swappable
//! behind [`LoadedShim::load`].

use std::os::raw::{c_float, c_int};
use std::path::Path;

use libloading::Library;

use crate::error::RngError;

type SeedFn = unsafe extern "C" fn(c_int);
type RandomFn = unsafe extern "C" fn() -> c_float;
type UniformFn = unsafe extern "C" fn(c_float, c_float) -> c_float;
type RandintFn = unsafe extern "C" fn(c_int, c_int) -> c_int;
type NormalFn = unsafe extern "C" fn(c_float, c_float) -> c_float;
type ExpoFn = unsafe extern "C" fn(c_float) -> c_float;

/// The six native entry points exported by the compiled shim.
///
/// The native generator carries hidden state, so callers must serialize
/// draws; [`KernelRng`](crate::provider::KernelRng) does this under its seed
/// mutex. Arguments cross the boundary at C `int` / `float` widths.
pub trait NativeBinding: Send + Sync {
    fn seed(&self, seed: i32);
    fn random(&self) -> f32;
    fn uniform(&self, low: f32, high: f32) -> f32;
    fn randint(&self, low: i32, high: i32) -> i32;
    fn normalvariate(&self, loc: f32, scale: f32) -> f32;
    fn expovariate(&self, lambda: f32) -> f32;
}

/// A shim mapped into the process with all entry points resolved.
///
/// Entry points are bound once at load; the `Library` handle is kept for the
/// lifetime of the struct so the function pointers stay valid.
#[derive(Debug)]
pub struct LoadedShim {
    seed_fn: SeedFn,
    random_fn: RandomFn,
    uniform_fn: UniformFn,
    randint_fn: RandintFn,
    normal_fn: NormalFn,
    expo_fn: ExpoFn,
    _library: Library,
}

impl LoadedShim {
    /// Map the compiled artifact and bind all six entry points
    pub fn load(lib_path: &Path) -> Result<Self, RngError> {
        // SAFETY: the artifact is the shim this provider just compiled; its
        // only initialization is static data.
        let library = unsafe { Library::new(lib_path) }.map_err(|e| RngError::Load {
            path: lib_path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let seed_fn = resolve::<SeedFn>(&library, "dk_seed")?;
        let random_fn = resolve::<RandomFn>(&library, "dk_random")?;
        let uniform_fn = resolve::<UniformFn>(&library, "dk_uniform")?;
        let randint_fn = resolve::<RandintFn>(&library, "dk_randint")?;
        let normal_fn = resolve::<NormalFn>(&library, "dk_normalvariate")?;
        let expo_fn = resolve::<ExpoFn>(&library, "dk_expovariate")?;

        Ok(Self {
            seed_fn,
            random_fn,
            uniform_fn,
            randint_fn,
            normal_fn,
            expo_fn,
            _library: library,
        })
    }
}

fn resolve<T: Copy>(library: &Library, symbol: &'static str) -> Result<T, RngError> {
    // SAFETY: the requested type is the signature of the corresponding
    // export in the generated shim source.
    match unsafe { library.get::<T>(symbol.as_bytes()) } {
        Ok(sym) => Ok(*sym),
        Err(e) => Err(RngError::NativeCall {
            symbol,
            reason: e.to_string(),
        }),
    }
}

impl NativeBinding for LoadedShim {
    fn seed(&self, seed: i32) {
        // SAFETY: pointer was resolved against the matching export; the
        // provider serializes access to the generator state.
        unsafe { (self.seed_fn)(seed) }
    }

    fn random(&self) -> f32 {
        // SAFETY: as above
        unsafe { (self.random_fn)() }
    }

    fn uniform(&self, low: f32, high: f32) -> f32 {
        // SAFETY: as above
        unsafe { (self.uniform_fn)(low, high) }
    }

    fn randint(&self, low: i32, high: i32) -> i32 {
        // SAFETY: as above
        unsafe { (self.randint_fn)(low, high) }
    }

    fn normalvariate(&self, loc: f32, scale: f32) -> f32 {
        // SAFETY: as above
        unsafe { (self.normal_fn)(loc, scale) }
    }

    fn expovariate(&self, lambda: f32) -> f32 {
        // SAFETY: as above
        unsafe { (self.expo_fn)(lambda) }
    }
}
