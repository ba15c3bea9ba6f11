//! External compiler collaborator
//!
//! The provider only needs `compile(src, out, log) -> success | failure`;
//! the trait seam keeps the toolchain swappable and lets tests substitute
//! counting or failing stubs.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::RngConfig;
use crate::error::RngError;

/// How much of the build log is echoed into the error detail
const LOG_TAIL_BYTES: usize = 400;

/// Poll interval while waiting on a time-limited compile
const WAIT_POLL: Duration = Duration::from_millis(50);

/// External compiler: turn one C source file into one shared library,
/// capturing build output to a log file
pub trait Compiler: Send + Sync {
    fn compile(&self, src: &Path, out: &Path, log: &Path) -> Result<(), RngError>;
}

/// Drives a cc-compatible compiler driver (`cc`, `gcc`, `clang`, ...)
#[derive(Debug, Clone)]
pub struct GnuCompiler {
    cc: String,
    extra_cflags: Vec<String>,
    timeout: Option<Duration>,
}

impl GnuCompiler {
    pub fn new(cc: impl Into<String>) -> Self {
        Self {
            cc: cc.into(),
            extra_cflags: Vec::new(),
            timeout: None,
        }
    }

    /// Resolve driver, flags and timeout from a provider config
    pub fn from_config(config: &RngConfig) -> Self {
        Self {
            cc: config.resolved_compiler(),
            extra_cflags: config.extra_cflags.clone(),
            timeout: config.compile_timeout,
        }
    }

    pub fn with_extra_cflags(mut self, flags: Vec<String>) -> Self {
        self.extra_cflags = flags;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, src: &Path, out: &Path) -> Command {
        let mut cmd = Command::new(&self.cc);
        cmd.arg("-shared")
            .arg("-fPIC")
            .arg("-O2")
            .arg("-std=gnu11");
        // The kernel header is staged next to the source
        if let Some(dir) = src.parent() {
            cmd.arg("-I").arg(dir);
        }
        cmd.args(&self.extra_cflags);
        cmd.arg(src).arg("-o").arg(out).arg("-lm");
        cmd
    }
}

impl Compiler for GnuCompiler {
    fn compile(&self, src: &Path, out: &Path, log: &Path) -> Result<(), RngError> {
        let mut cmd = self.command(src, out);

        let mut log_file = File::create(log).map_err(|e| RngError::SourceWrite {
            path: log.to_path_buf(),
            reason: e.to_string(),
        })?;
        writeln!(log_file, "{:?}", cmd).map_err(|e| RngError::SourceWrite {
            path: log.to_path_buf(),
            reason: e.to_string(),
        })?;

        let stdout = log_file.try_clone().map_err(|e| RngError::SourceWrite {
            path: log.to_path_buf(),
            reason: e.to_string(),
        })?;
        cmd.stdout(stdout).stderr(log_file);

        let mut child = cmd.spawn().map_err(|e| RngError::Compilation {
            log_path: log.to_path_buf(),
            detail: format!("failed to launch `{}`: {}", self.cc, e),
        })?;

        let status = match self.timeout {
            None => child.wait().map_err(|e| RngError::Compilation {
                log_path: log.to_path_buf(),
                detail: format!("failed to wait on `{}`: {}", self.cc, e),
            })?,
            Some(limit) => {
                let deadline = Instant::now() + limit;
                loop {
                    match child.try_wait() {
                        Ok(Some(status)) => break status,
                        Ok(None) if Instant::now() >= deadline => {
                            let _ = child.kill();
                            let _ = child.wait();
                            return Err(RngError::Compilation {
                                log_path: log.to_path_buf(),
                                detail: format!("timed out after {limit:?}"),
                            });
                        }
                        Ok(None) => thread::sleep(WAIT_POLL),
                        Err(e) => {
                            return Err(RngError::Compilation {
                                log_path: log.to_path_buf(),
                                detail: format!("failed to wait on `{}`: {}", self.cc, e),
                            })
                        }
                    }
                }
            }
        };

        if !status.success() {
            return Err(RngError::Compilation {
                log_path: log.to_path_buf(),
                detail: format!("{status}; {}", log_tail(log)),
            });
        }
        Ok(())
    }
}

/// Last few hundred bytes of the build log, flattened to one line
fn log_tail(log: &Path) -> String {
    match fs::read_to_string(log) {
        Ok(contents) => {
            let trimmed = contents.trim_end();
            let mut start = trimmed.len().saturating_sub(LOG_TAIL_BYTES);
            // Avoid splitting a UTF-8 sequence
            while !trimmed.is_char_boundary(start) {
                start += 1;
            }
            trimmed[start..].replace('\n', " | ")
        }
        Err(_) => "build log unavailable".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_shape() {
        let compiler = GnuCompiler::new("cc")
            .with_extra_cflags(vec!["-g".to_string()]);
        let cmd = compiler.command(Path::new("/cache/shim.c"), Path::new("/cache/shim.so"));
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(cmd.get_program(), "cc");
        assert!(args.contains(&"-shared".to_string()));
        assert!(args.contains(&"-fPIC".to_string()));
        assert!(args.contains(&"-g".to_string()));
        assert!(args.contains(&"-lm".to_string()));
        let include_pos = args.iter().position(|a| a == "-I").expect("-I flag");
        assert_eq!(args[include_pos + 1], "/cache");
    }

    #[test]
    fn test_unlaunchable_driver_reports_compilation_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let compiler = GnuCompiler::new("drift-no-such-compiler");
        let err = compiler
            .compile(
                &dir.path().join("shim.c"),
                &dir.path().join("shim.so"),
                &dir.path().join("shim.log"),
            )
            .expect_err("driver does not exist");
        match err {
            RngError::Compilation { detail, .. } => {
                assert!(detail.contains("failed to launch"), "detail: {detail}")
            }
            other => panic!("expected Compilation error, got {other:?}"),
        }
    }
}
