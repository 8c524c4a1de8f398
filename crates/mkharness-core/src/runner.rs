//! Build runner — assembles and executes one build-tool command line.
//!
//! The argument vector is always `[tool, (-f, build_file)?, target..., flag...]`
//! and the child runs with the sanitized working directory as its current
//! directory. Output is captured in full, never streamed.

use crate::config::BuildConfig;
use crate::error::{HarnessError, Result};
use crate::path::sanitize;
use crate::types::{BuildOutcome, BuildRequest};
use std::ffi::OsString;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How often the timeout loop polls the child for exit.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

// ---------------------------------------------------------------------------
// CommandLine
// ---------------------------------------------------------------------------

/// A fully resolved invocation: sanitized paths plus ordered tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub build_file: Option<PathBuf>,
    pub targets: Vec<String>,
    pub flags: Vec<String>,
    pub working_dir: PathBuf,
}

impl CommandLine {
    /// Arguments after the program name, in invocation order.
    pub fn args(&self) -> Vec<OsString> {
        let mut args = Vec::with_capacity(2 + self.targets.len() + self.flags.len());
        if let Some(build_file) = &self.build_file {
            args.push(OsString::from("-f"));
            args.push(build_file.clone().into_os_string());
        }
        args.extend(self.targets.iter().map(OsString::from));
        args.extend(self.flags.iter().map(OsString::from));
        args
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let argv: Vec<String> = std::iter::once(self.program.clone())
            .chain(self.args().iter().map(|a| a.to_string_lossy().into_owned()))
            .collect();
        f.write_str(&argv.join(" "))
    }
}

// ---------------------------------------------------------------------------
// BuildRunner
// ---------------------------------------------------------------------------

/// Drives an external `make`-style tool. One [`run`](Self::run) call spawns
/// exactly one child and blocks until it exits; there is no retry.
#[derive(Debug, Clone)]
pub struct BuildRunner {
    tool: String,
    timeout: Option<Duration>,
}

impl Default for BuildRunner {
    fn default() -> Self {
        Self::new("make")
    }
}

impl BuildRunner {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            timeout: None,
        }
    }

    pub fn from_config(cfg: &BuildConfig) -> Self {
        Self {
            tool: cfg.tool.clone(),
            timeout: cfg.timeout(),
        }
    }

    /// Kill the child and fail with [`HarnessError::Timeout`] if it runs
    /// longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Resolve `req` into the exact command line [`run`](Self::run) would
    /// execute, without spawning anything.
    pub fn command_line(&self, req: &BuildRequest) -> Result<CommandLine> {
        let working_dir = sanitize(&req.working_dir)?;
        let build_file = req.build_file.as_ref().map(sanitize).transpose()?;

        Ok(CommandLine {
            program: self.tool.clone(),
            build_file,
            targets: req.targets.as_ref().map(|t| t.tokens()).unwrap_or_default(),
            flags: req.flags.as_ref().map(|f| f.tokens()).unwrap_or_default(),
            working_dir,
        })
    }

    /// Run the build tool and capture `(exit code, stdout, stderr)`.
    ///
    /// A non-zero exit is returned as data. Failing to launch the tool is
    /// [`HarnessError::Spawn`].
    pub fn run(&self, req: &BuildRequest) -> Result<BuildOutcome> {
        let line = self.command_line(req)?;
        debug!(cwd = %line.working_dir.display(), argv = %line, "invoking build tool");

        let outcome = match self.timeout {
            None => {
                let output = line.command().output().map_err(|e| self.spawn_error(e))?;
                BuildOutcome {
                    exit_code: exit_code(output.status),
                    stdout: output.stdout,
                    stderr: output.stderr,
                }
            }
            Some(timeout) => {
                let mut cmd = line.command();
                // Own process group, so a timeout can take down recipe shells too.
                #[cfg(unix)]
                {
                    use std::os::unix::process::CommandExt;
                    cmd.process_group(0);
                }
                let child = cmd.spawn().map_err(|e| self.spawn_error(e))?;
                self.wait_with_timeout(child, timeout)?
            }
        };

        debug!(
            exit_code = outcome.exit_code,
            stdout_len = outcome.stdout.len(),
            stderr_len = outcome.stderr.len(),
            "build tool exited"
        );
        Ok(outcome)
    }

    fn spawn_error(&self, source: std::io::Error) -> HarnessError {
        HarnessError::Spawn {
            tool: self.tool.clone(),
            source,
        }
    }

    /// Both pipes are drained on their own threads while the child runs, so a
    /// chatty build cannot fill the pipe buffer and deadlock the wait.
    ///
    /// On expiry the whole process group is killed and the drain threads are
    /// left to finish on their own: a descendant that escaped the group may
    /// still hold the pipes open.
    fn wait_with_timeout(&self, mut child: Child, timeout: Duration) -> Result<BuildOutcome> {
        let start = Instant::now();
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);
        let collect = |handle: Option<thread::JoinHandle<Vec<u8>>>| {
            handle
                .map(|h| h.join().unwrap_or_default())
                .unwrap_or_default()
        };

        loop {
            let status = child
                .try_wait()
                .map_err(|e| HarnessError::io("failed to wait for build tool", e))?;

            if let Some(status) = status {
                return Ok(BuildOutcome {
                    exit_code: exit_code(status),
                    stdout: collect(stdout),
                    stderr: collect(stderr),
                });
            }

            if start.elapsed() > timeout {
                warn!(tool = %self.tool, ?timeout, "build tool timed out, killing it");
                kill_tree(&mut child);
                let _ = child.wait();
                drop((stdout, stderr));
                return Err(HarnessError::Timeout {
                    tool: self.tool.clone(),
                    timeout,
                });
            }

            thread::sleep(WAIT_POLL_INTERVAL);
        }
    }
}

/// Kill the child and, on Unix, every process in its group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;
        if let Err(e) = killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL) {
            debug!(error = %e, "killpg failed, killing the child alone");
        }
    }
    let _ = child.kill();
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

/// Exit code of the child; a signal-terminated child reports `-signal` on
/// Unix and `-1` elsewhere.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
