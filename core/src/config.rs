//! Provider configuration
//!
//! Everything here has a working default: a fresh `RngConfig::default()` puts
//! artifacts in a shared cache directory under the system temp dir and drives
//! whatever `cc` the environment provides. Fields exist so embedding
//! frameworks can pin their own toolchain and cache layout.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable overriding the default cache directory
pub const CACHE_DIR_ENV: &str = "DRIFT_CACHE_DIR";

/// Environment variable naming the C compiler driver (same convention as make)
pub const COMPILER_ENV: &str = "CC";

/// Configuration for a [`KernelRng`](crate::provider::KernelRng) instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngConfig {
    /// Directory receiving the generated source, shared library and build
    /// log. `None` resolves to `$DRIFT_CACHE_DIR`, else `<tmp>/drift-cache`.
    pub cache_dir: Option<PathBuf>,

    /// Compiler driver. `None` resolves to `$CC`, else `cc`.
    pub compiler: Option<String>,

    /// Extra flags appended to the baseline compile command
    pub extra_cflags: Vec<String>,

    /// Upper bound on compile time. `None` (the default) blocks until the
    /// compiler exits.
    pub compile_timeout: Option<Duration>,

    /// Whether staged files stay on disk after `shutdown`. Defaults to true:
    /// the cache directory is treated as externally reaped.
    pub keep_artifacts: bool,
}

impl Default for RngConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            compiler: None,
            extra_cflags: Vec::new(),
            compile_timeout: None,
            keep_artifacts: true,
        }
    }
}

impl RngConfig {
    /// Cache directory after applying env-var and built-in fallbacks
    pub fn resolved_cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }
        if let Ok(dir) = env::var(CACHE_DIR_ENV) {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }
        env::temp_dir().join("drift-cache")
    }

    /// Compiler driver after applying env-var and built-in fallbacks
    pub fn resolved_compiler(&self) -> String {
        if let Some(cc) = &self.compiler {
            return cc.clone();
        }
        if let Ok(cc) = env::var(COMPILER_ENV) {
            if !cc.is_empty() {
                return cc;
            }
        }
        "cc".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_fields_win_over_fallbacks() {
        let config = RngConfig {
            cache_dir: Some(PathBuf::from("/var/cache/drift")),
            compiler: Some("clang".to_string()),
            ..RngConfig::default()
        };
        assert_eq!(config.resolved_cache_dir(), PathBuf::from("/var/cache/drift"));
        assert_eq!(config.resolved_compiler(), "clang");
    }

    #[test]
    fn test_default_cache_dir_lives_under_tmp() {
        let config = RngConfig::default();
        if env::var(CACHE_DIR_ENV).is_err() {
            assert!(config.resolved_cache_dir().starts_with(env::temp_dir()));
        }
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = RngConfig {
            cache_dir: Some(PathBuf::from("/scratch/rng")),
            compiler: Some("gcc".to_string()),
            extra_cflags: vec!["-g".to_string()],
            compile_timeout: Some(Duration::from_secs(30)),
            keep_artifacts: false,
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let back: RngConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.cache_dir, config.cache_dir);
        assert_eq!(back.compiler, config.compiler);
        assert_eq!(back.extra_cflags, config.extra_cflags);
        assert_eq!(back.compile_timeout, config.compile_timeout);
        assert!(!back.keep_artifacts);
    }
}
