// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CONTEXT: Firmware platform control facade for update and recovery logic
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Stable (v1.0)
//! TEST_COVERAGE: unit tests per module + host integration tests (via tests/fwutil_host)
//!   - property access, generic integer parsing, key table
//!   - one-stop / hardware / software write-protect derivation
//!   - reboot sequencing and fatal paths
//!   - process runner (capture, merge, timeout)
//!
//! PUBLIC API:
//!   - SystemUtility: platform facade (properties, counters, key versions,
//!     write-protect status, reboot, NV reset)
//!   - CommandRunner / ProcessRunner: external command execution
//!   - Diagnostics: debug / alert / die
//!   - PlatformConfig: TOML configuration
//!
//! DEPENDENCIES:
//!   - log: command tracing
//!   - parking_lot: in-memory diagnostic sink
//!   - serde + toml: configuration
//!   - thiserror: configuration errors
//!   - libc: sync(2) / reboot(2)

#![deny(unsafe_code)]

pub mod config;
mod counters;
pub mod diag;
pub mod exec;
mod keyver;
mod nvreset;
pub mod property;
pub mod reboot;
pub mod status;
pub mod system;

pub use config::{ConfigError, PlatformConfig, ToolPaths};
pub use diag::{ConsoleSink, DiagnosticSink, Diagnostics, MemorySink, Severity};
pub use exec::{find_in_path, CommandLine, CommandOutput, CommandRunner, ProcessRunner};
pub use property::{parse_int, PropertyAccessor, PropertyKey, PropertyKeys, ReadMode};
pub use reboot::{LinuxPower, PowerControl, RebootTiming};
pub use status::WriteProtectState;
pub use system::SystemUtility;
