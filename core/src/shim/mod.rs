//! Generated bridge shim and its on-disk artifacts
//!
//! The shim is a fixed C source that re-exports the statistics kernel under
//! stable entry-point names (`dk_*`). It is compiled on first use, once per
//! provider instance, into a shared library that both this crate and the
//! compiled advection kernels draw from.
//!
//! Three files land in the cache directory per instance, all derived from one
//! freshly generated UUID so that concurrent simulation runs sharing a cache
//! directory never collide:
//!
//! - `drift_random_<uuid>.c` - generated shim source
//! - `drift_random_<uuid>.<dll>` - compiled shared library
//! - `drift_random_<uuid>.log` - compiler output
//!
//! The statistics kernel header itself is vendored in the crate and staged
//! next to the shim source.

pub mod binding;
pub mod compiler;

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::RngError;
use self::binding::LoadedShim;
use self::compiler::Compiler;

/// Vendored statistics kernel, staged into the cache directory at compile
/// time so the shim builds without any installed framework headers.
pub const KERNEL_HEADER: &str = include_str!("../../include/drift_kernel.h");

/// File name the kernel header is staged under (matches the `#include` in
/// the generated source)
pub const KERNEL_HEADER_FILE: &str = "drift_kernel.h";

const STMT_INCLUDE: &str = "#include \"drift_kernel.h\"\n";

const FN_SEED: &str = "
extern void dk_seed(int seed) {
  drift_kernel_seed(seed);
}
";

const FN_RANDOM: &str = "
extern float dk_random(void) {
  return drift_kernel_random();
}
";

const FN_UNIFORM: &str = "
extern float dk_uniform(float low, float high) {
  return drift_kernel_uniform(low, high);
}
";

const FN_RANDINT: &str = "
extern int dk_randint(int low, int high) {
  return drift_kernel_randint(low, high);
}
";

const FN_NORMALVARIATE: &str = "
extern float dk_normalvariate(float loc, float scale) {
  return drift_kernel_normalvariate(loc, scale);
}
";

const FN_EXPOVARIATE: &str = "
extern float dk_expovariate(float lambda) {
  return drift_kernel_expovariate(lambda);
}
";

/// Assemble the complete shim source text
pub fn shim_source() -> String {
    [
        STMT_INCLUDE,
        FN_SEED,
        FN_RANDOM,
        FN_UNIFORM,
        FN_RANDINT,
        FN_NORMALVARIATE,
        FN_EXPOVARIATE,
    ]
    .concat()
}

/// On-disk paths for one provider instance's shim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimArtifact {
    src_path: PathBuf,
    lib_path: PathBuf,
    log_path: PathBuf,
    header_path: PathBuf,
}

impl ShimArtifact {
    /// Derive a fresh set of artifact paths under `cache_dir`
    pub fn new_in(cache_dir: &Path) -> Self {
        let stem = format!("drift_random_{}", Uuid::new_v4());
        Self {
            src_path: cache_dir.join(format!("{stem}.c")),
            lib_path: cache_dir.join(format!("{stem}.{}", std::env::consts::DLL_EXTENSION)),
            log_path: cache_dir.join(format!("{stem}.log")),
            header_path: cache_dir.join(KERNEL_HEADER_FILE),
        }
    }

    pub fn src_path(&self) -> &Path {
        &self.src_path
    }

    pub fn lib_path(&self) -> &Path {
        &self.lib_path
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn header_path(&self) -> &Path {
        &self.header_path
    }

    /// Write the shim source and kernel header into the cache directory,
    /// creating it if needed
    pub fn stage(&self) -> Result<(), RngError> {
        let cache_dir = self.src_path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(cache_dir).map_err(|e| RngError::SourceWrite {
            path: cache_dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(&self.header_path, KERNEL_HEADER).map_err(|e| RngError::SourceWrite {
            path: self.header_path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&self.src_path, shim_source()).map_err(|e| RngError::SourceWrite {
            path: self.src_path.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// Best-effort removal of the staged files. The shared kernel header is
    /// left in place: other live providers in the same cache directory still
    /// reference it.
    pub fn remove(&self) {
        for path in [&self.src_path, &self.lib_path, &self.log_path] {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove shim artifact");
                }
            }
        }
    }
}

/// Stage, compile and load the shim, binding all entry points.
///
/// This is the single factory behind
/// [`KernelRng::ensure_loaded`](crate::provider::KernelRng::ensure_loaded);
/// the provider caches its result so compilation happens at most once per
/// instance.
pub fn compile_and_load(
    artifact: &ShimArtifact,
    compiler: &dyn Compiler,
) -> Result<LoadedShim, RngError> {
    artifact.stage()?;
    compiler.compile(&artifact.src_path, &artifact.lib_path, &artifact.log_path)?;
    tracing::info!(
        src = %artifact.src_path.display(),
        lib = %artifact.lib_path.display(),
        "compiled random ==> shim"
    );
    LoadedShim::load(&artifact.lib_path)
}
