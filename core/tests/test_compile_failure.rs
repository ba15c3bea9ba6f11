//! Failure-path tests: a provider whose shim cannot be built or loaded
//!
//! Critical invariants tested:
//! - Compilation is attempted exactly once; the first failure is cached and
//!   replayed to every later draw and reseed
//! - Failures are loud: draws return errors, never silent zeros
//! - Seed bookkeeping stays usable even when the toolchain is broken
//!
//! None of these tests needs a C compiler.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use drift_simulator_rng_rs::{Compiler, GnuCompiler, KernelRng, RngConfig, RngError};

// ============================================================================
// Test Helpers
// ============================================================================

fn config_in(dir: &Path) -> RngConfig {
    RngConfig {
        cache_dir: Some(dir.to_path_buf()),
        ..RngConfig::default()
    }
}

/// Always fails, counting attempts
struct FailingCompiler {
    calls: Arc<AtomicUsize>,
}

impl Compiler for FailingCompiler {
    fn compile(&self, _src: &Path, _out: &Path, log: &Path) -> Result<(), RngError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RngError::Compilation {
            log_path: log.to_path_buf(),
            detail: "stub failure".to_string(),
        })
    }
}

/// Succeeds but leaves a file no dynamic loader will accept
struct CorruptArtifactCompiler;

impl Compiler for CorruptArtifactCompiler {
    fn compile(&self, _src: &Path, out: &Path, _log: &Path) -> Result<(), RngError> {
        fs::write(out, b"this is not a shared object").map_err(|e| RngError::SourceWrite {
            path: out.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

// ============================================================================
// Compilation failures
// ============================================================================

#[test]
fn test_compilation_failure_reaches_the_draw_site() {
    let dir = tempfile::tempdir().expect("tempdir");
    let calls = Arc::new(AtomicUsize::new(0));
    let rng = KernelRng::with_compiler(
        config_in(dir.path()),
        Box::new(FailingCompiler {
            calls: Arc::clone(&calls),
        }),
    );

    let err = rng.random().expect_err("broken toolchain");
    assert!(matches!(err, RngError::Compilation { .. }), "got {err:?}");
}

#[test]
fn test_failure_is_cached_and_never_retried() {
    let dir = tempfile::tempdir().expect("tempdir");
    let calls = Arc::new(AtomicUsize::new(0));
    let rng = KernelRng::with_compiler(
        config_in(dir.path()),
        Box::new(FailingCompiler {
            calls: Arc::clone(&calls),
        }),
    );

    let first = rng.random().expect_err("broken toolchain");
    let second = rng.random().expect_err("broken toolchain");
    let third = rng.uniform(0.0, 1.0).expect_err("broken toolchain");

    assert_eq!(first, second);
    assert_eq!(first, third);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "no retry is permitted");
    assert!(!rng.is_loaded());
}

#[test]
fn test_native_reseed_fails_but_records_the_seed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let calls = Arc::new(AtomicUsize::new(0));
    let rng = KernelRng::with_compiler(
        config_in(dir.path()),
        Box::new(FailingCompiler {
            calls: Arc::clone(&calls),
        }),
    );

    let err = rng.reseed(1234, true).expect_err("broken toolchain");
    assert!(matches!(err, RngError::Compilation { .. }), "got {err:?}");

    // The logical seed is recorded; the native side is not seeded
    assert_eq!(rng.get_seed(), (1234, false));

    // Seed-only bookkeeping keeps working without the toolchain
    rng.reseed(5678, false).expect("no native work requested");
    assert_eq!(rng.get_seed(), (5678, false));
}

#[test]
fn test_unlaunchable_driver_surfaces_as_compilation_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = RngConfig {
        cache_dir: Some(dir.path().to_path_buf()),
        compiler: Some("drift-no-such-compiler".to_string()),
        ..RngConfig::default()
    };
    let rng = KernelRng::with_config(config);

    match rng.random().expect_err("driver does not exist") {
        RngError::Compilation { detail, .. } => {
            assert!(detail.contains("failed to launch"), "detail: {detail}")
        }
        other => panic!("expected Compilation error, got {other:?}"),
    }
}

#[test]
fn test_failing_driver_leaves_staged_sources_for_inspection() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = RngConfig {
        cache_dir: Some(dir.path().to_path_buf()),
        compiler: Some("drift-no-such-compiler".to_string()),
        ..RngConfig::default()
    };
    let rng = KernelRng::with_config(config);
    rng.ensure_loaded()
        .map(|_| ())
        .expect_err("driver does not exist");

    // Staging happens before the compiler runs, so the generated source and
    // kernel header are on disk for postmortems
    assert!(rng.artifact().src_path().exists());
    assert!(rng.artifact().header_path().exists());
}

// ============================================================================
// Load failures
// ============================================================================

#[test]
fn test_corrupt_artifact_surfaces_as_load_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rng = KernelRng::with_compiler(config_in(dir.path()), Box::new(CorruptArtifactCompiler));

    let first = rng.random().expect_err("artifact is not loadable");
    assert!(matches!(first, RngError::Load { .. }), "got {first:?}");

    // Cached like every other lifecycle failure
    let second = rng.expovariate(1.0).expect_err("artifact is not loadable");
    assert_eq!(first, second);
}

// ============================================================================
// GnuCompiler against a real broken build (no toolchain assumptions)
// ============================================================================

#[test]
fn test_gnu_compiler_reports_launch_failure_with_log_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src = dir.path().join("shim.c");
    let out = dir.path().join("shim.so");
    let log = dir.path().join("shim.log");
    fs::write(&src, "int x;\n").expect("write source");

    let compiler = GnuCompiler::new("drift-no-such-compiler");
    match compiler.compile(&src, &out, &log).expect_err("no driver") {
        RngError::Compilation { log_path, .. } => assert_eq!(log_path, log),
        other => panic!("expected Compilation error, got {other:?}"),
    }
    // The log carries the attempted command line even when launch failed
    let contents = fs::read_to_string(&log).expect("log exists");
    assert!(contents.contains("drift-no-such-compiler"));
}
