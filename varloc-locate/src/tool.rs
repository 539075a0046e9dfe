//! Time-boxed invocations of an external command line tool.

use std::env;
use std::ffi::OsStr;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use varloc_core::errors::VariantError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

///
/// An external tool, by name on `PATH` or by explicit path.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    program: PathBuf,
}

impl ExternalTool {
    pub fn new<P: AsRef<Path>>(program: P) -> ExternalTool {
        ExternalTool {
            program: program.as_ref().to_path_buf(),
        }
    }

    pub fn name(&self) -> String {
        self.program.display().to_string()
    }

    ///
    /// Where the binary would be executed from, if it exists.
    ///
    /// A bare name is searched on `PATH`; anything with a directory component is
    /// taken as is.
    pub fn resolve(&self) -> Option<PathBuf> {
        if self.program.components().count() > 1 {
            return is_executable(&self.program).then(|| self.program.clone());
        }

        let path = env::var_os("PATH")?;
        env::split_paths(&path)
            .map(|dir| dir.join(&self.program))
            .find(|candidate| is_executable(candidate))
    }

    pub fn is_available(&self) -> bool {
        self.resolve().is_some()
    }

    ///
    /// Run the tool and return its standard output.
    ///
    /// # Arguments
    /// - args: command line arguments, passed without a shell
    /// - timeout: the child is killed once this has elapsed
    ///
    /// # Errors
    /// `ToolUnavailable` when it cannot be started, `ToolInvocationTimeout` when killed,
    /// `ToolFailed` on a non-zero exit.
    pub fn run<I, S>(&self, args: I, timeout: Duration) -> Result<String, VariantError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!("Running {:?}", command);

        let mut child = command.spawn().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                VariantError::ToolUnavailable(format!("{}: {}", self.name(), e))
            }
            _ => VariantError::Io(e),
        })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let waited = match wait_with_deadline(&mut child, timeout) {
            Ok(waited) => waited,
            Err(e) => {
                warn!("Lost track of {}, killing it: {}", self.name(), e);
                kill_and_reap(&mut child);
                return Err(VariantError::Io(e));
            }
        };

        let status = match waited {
            Some(status) => status,
            None => {
                warn!("{} timed out after {:?}, killing it", self.name(), timeout);
                kill_and_reap(&mut child);
                return Err(VariantError::ToolInvocationTimeout {
                    tool: self.name(),
                    seconds: timeout.as_secs(),
                });
            }
        };

        let stdout = join(stdout)?;
        let stderr = join(stderr)?;

        if !status.success() {
            return Err(VariantError::ToolFailed {
                tool: self.name(),
                status: status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        String::from_utf8(stdout).map_err(|e| {
            VariantError::MalformedRecord(format!("{} printed invalid UTF-8: {}", self.name(), e))
        })
    }
}

// The child may have exited in between, so a failed kill is not an error.
fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    if let Err(e) = child.wait() {
        warn!("Could not reap child {}: {}", child.id(), e);
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

type Drain = Option<thread::JoinHandle<io::Result<Vec<u8>>>>;

// Read a pipe to its end on its own thread so a chatty child never blocks on a full pipe.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            pipe.read_to_end(&mut buffer)?;
            Ok(buffer)
        })
    })
}

fn join(handle: Drain) -> Result<Vec<u8>, VariantError> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| VariantError::Io(io::Error::other("pipe reader panicked")))?
            .map_err(VariantError::Io),
        None => Ok(Vec::new()),
    }
}

fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> io::Result<Option<std::process::ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-tool");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[rstest]
    fn test_stdout_returned() {
        let tempdir = tempfile::tempdir().unwrap();
        let tool = ExternalTool::new(script(tempdir.path(), "echo \"$1|$2\""));

        assert!(tool.is_available());
        let out = tool.run(["view", "-r"], Duration::from_secs(5)).unwrap();
        assert_eq!(out, "view|-r\n");
    }

    #[rstest]
    fn test_failure_carries_status_and_stderr() {
        let tempdir = tempfile::tempdir().unwrap();
        let tool = ExternalTool::new(script(tempdir.path(), "echo broken >&2\nexit 3"));

        match tool.run(Vec::<String>::new(), Duration::from_secs(5)) {
            Err(VariantError::ToolFailed { status, stderr, .. }) => {
                assert_eq!(status, 3);
                assert_eq!(stderr, "broken");
            }
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }

    #[rstest]
    fn test_timeout_kills_child() {
        let tempdir = tempfile::tempdir().unwrap();
        let tool = ExternalTool::new(script(tempdir.path(), "exec sleep 5"));

        let started = Instant::now();
        let result = tool.run(Vec::<String>::new(), Duration::from_millis(200));

        assert!(matches!(
            result,
            Err(VariantError::ToolInvocationTimeout { .. })
        ));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[rstest]
    fn test_kill_and_reap_leaves_no_child() {
        let tempdir = tempfile::tempdir().unwrap();
        let mut child = Command::new(script(tempdir.path(), "exec sleep 5"))
            .stdout(Stdio::null())
            .spawn()
            .unwrap();

        kill_and_reap(&mut child);
        assert!(child.try_wait().unwrap().is_some());

        // reaping twice is harmless
        kill_and_reap(&mut child);
    }

    #[rstest]
    fn test_non_executable_file_is_unavailable() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = script(tempdir.path(), "echo hello");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let tool = ExternalTool::new(&path);
        assert!(!tool.is_available());
        assert_eq!(tool.resolve(), None);
    }

    #[rstest]
    fn test_missing_binary() {
        let tool = ExternalTool::new("/definitely/not/a/bcftools");

        assert!(!tool.is_available());
        assert!(matches!(
            tool.run(["view"], Duration::from_secs(1)),
            Err(VariantError::ToolUnavailable(_))
        ));
    }
}
