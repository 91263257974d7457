use crate::domain::{TcError, TcResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Environment variable naming the external program's absolute path.
pub const EXECUTABLE_ENV_VAR: &str = "THERMOCALC_EXECUTABLE";

/// Bare name resolved against `PATH` when nothing else is configured.
pub const DEFAULT_EXECUTABLE: &str = "thermo";

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.is_file()
        && std::fs::metadata(path)
            .map(|meta| meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

/// `which`-style lookup: a candidate with a directory component is checked
/// directly, a bare name is resolved against the process search path.
fn which(candidate: &str) -> Option<PathBuf> {
    let path = Path::new(candidate);
    if path.parent().is_some_and(|parent| !parent.as_os_str().is_empty()) {
        return is_executable_file(path).then(|| path.to_path_buf());
    }
    let search = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&search) {
        let joined = dir.join(candidate);
        if is_executable_file(&joined) {
            return Some(joined);
        }
    }
    None
}

/// Resolves the external executable: explicit path, else the
/// `THERMOCALC_EXECUTABLE` environment variable, else `thermo` on `PATH`.
/// A tier whose value is present but invalid is fatal; there is no
/// fallthrough to the next tier.
pub fn resolve_executable(explicit: Option<&Path>) -> TcResult<PathBuf> {
    if let Some(candidate) = explicit {
        return which(&candidate.to_string_lossy()).ok_or_else(|| {
            TcError::config(
                "CONFIG.EXECUTABLE",
                format!(
                    "specified executable '{}' does not appear to be valid",
                    candidate.display()
                ),
            )
        });
    }

    if let Ok(candidate) = std::env::var(EXECUTABLE_ENV_VAR) {
        return which(&candidate).ok_or_else(|| {
            TcError::config(
                "CONFIG.EXECUTABLE",
                format!(
                    "environment specified executable '{candidate}' does not appear to be valid",
                ),
            )
        });
    }

    which(DEFAULT_EXECUTABLE).ok_or_else(|| {
        TcError::config(
            "CONFIG.EXECUTABLE",
            format!(
                "unable to find '{DEFAULT_EXECUTABLE}' executable; ensure it is on your PATH, \
                 or set the {EXECUTABLE_ENV_VAR} environment variable, or pass an explicit path",
            ),
        )
    })
}

/// Captured byte streams of one external-program run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Seam for launching the external program, so tests can substitute a fake
/// that drops prebaked artifacts into the working directory.
pub trait ProgramRunner {
    fn run(&self, executable: &Path, cwd: &Path, stdin_bytes: &[u8]) -> TcResult<RunOutput>;
}

/// Blocking `std::process` runner: pipes for all three streams, the stdin
/// bytes written once and the handle closed so the program cannot wait on
/// another interactive prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProgramRunner for SystemRunner {
    fn run(&self, executable: &Path, cwd: &Path, stdin_bytes: &[u8]) -> TcResult<RunOutput> {
        let mut child = Command::new(executable)
            .current_dir(cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| {
                TcError::io_system(
                    "IO.SPAWN",
                    format!("failed to launch '{}': {source}", executable.display()),
                )
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(stdin_bytes).map_err(|source| {
                TcError::io_system("IO.STDIN", format!("failed to write program stdin: {source}"))
            })?;
        }

        let output = child.wait_with_output().map_err(|source| {
            TcError::io_system(
                "IO.WAIT",
                format!("failed waiting for '{}': {source}", executable.display()),
            )
        })?;

        Ok(RunOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
