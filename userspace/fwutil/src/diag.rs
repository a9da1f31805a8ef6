// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CONTEXT: Process-wide diagnostics (debug / alert / fatal) for platform operations
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Stable (v1.0)
//! TEST_COVERAGE: 4 unit tests + fatal paths via tests/fwutil_host
//!
//! Diagnostics are best-effort text lines. `die` is the only unwind path for
//! unrecoverable platform conditions: the console sink exits the process with
//! status 1, the memory sink panics so host tests can observe the fatal path.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Severity attached to every diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Progress detail, prefixed with `[DEBUG]`.
    Debug,
    /// Operator-facing message, printed verbatim.
    Alert,
    /// Unrecoverable condition, prefixed with `[ERROR]`.
    Fatal,
}

impl Severity {
    fn prefix(self) -> &'static str {
        match self {
            Severity::Debug => "[DEBUG] ",
            Severity::Alert => "",
            Severity::Fatal => "[ERROR] ",
        }
    }

    /// Renders `message` the way it appears on the diagnostic stream.
    pub fn format_line(self, message: &str) -> String {
        format!("{}{}", self.prefix(), message)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Debug => "debug",
            Severity::Alert => "alert",
            Severity::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// Destination for diagnostic lines.
pub trait DiagnosticSink: Send + Sync {
    /// Writes one line. Failures to write are ignored.
    fn emit(&self, severity: Severity, message: &str);

    /// Ends the process after a fatal line has been emitted.
    fn terminate(&self, message: &str) -> !;
}

/// Writes to stderr and exits with status 1 on fatal conditions.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl DiagnosticSink for ConsoleSink {
    fn emit(&self, severity: Severity, message: &str) {
        // stderr is unbuffered; the lock keeps the line whole.
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{}", severity.format_line(message));
    }

    fn terminate(&self, _message: &str) -> ! {
        std::process::exit(1)
    }
}

/// In-memory sink for host tests.
///
/// Lines are recorded instead of printed and `terminate` panics with
/// `fatal: <message>` so the fatal path can be asserted with `#[should_panic]`.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(Severity, String)>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every recorded line.
    pub fn lines(&self) -> Vec<(Severity, String)> {
        self.lines.lock().clone()
    }

    /// Returns recorded messages of one severity.
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(sev, _)| *sev == severity)
            .map(|(_, msg)| msg.clone())
            .collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, severity: Severity, message: &str) {
        self.lines.lock().push((severity, message.to_string()));
    }

    fn terminate(&self, message: &str) -> ! {
        panic!("fatal: {message}")
    }
}

/// Cloneable handle over a shared sink.
#[derive(Clone)]
pub struct Diagnostics {
    sink: Arc<dyn DiagnosticSink>,
}

impl Diagnostics {
    /// Wraps an existing sink.
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }

    /// Handle writing to stderr.
    pub fn console() -> Self {
        Self::new(Arc::new(ConsoleSink))
    }

    /// Emits one pre-formatted line at `severity`.
    ///
    /// `Severity::Fatal` is recorded but does not terminate; use [`Diagnostics::die`].
    pub fn report(&self, severity: Severity, message: &str) {
        self.sink.emit(severity, message);
    }

    pub fn debug(&self, message: &str) {
        self.report(Severity::Debug, message);
    }

    pub fn alert(&self, message: &str) {
        self.report(Severity::Alert, message);
    }

    /// Emits a fatal line and terminates. Never returns.
    pub fn die(&self, message: &str) -> ! {
        self.sink.emit(Severity::Fatal, message);
        self.sink.terminate(message)
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::console()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics").finish_non_exhaustive()
    }
}
