// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CONTEXT: SystemUtility facade wiring properties, status, reboot and NV reset
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Stable (v1.0)
//! TEST_COVERAGE: tests/fwutil_host (platform_flow.rs, process_runner.rs)
//!
//! Operations are spread over per-concern modules (`counters`, `keyver`,
//! `status`, `nvreset`) as `impl SystemUtility` blocks.

use crate::config::{PlatformConfig, ToolPaths};
use crate::diag::Diagnostics;
use crate::exec::{find_in_path, CommandRunner, ProcessRunner};
use crate::property::{PropertyAccessor, PropertyKey, PropertyKeys, ReadMode};
use crate::reboot::{self, LinuxPower, PowerControl, RebootTiming};

/// Platform control surface used by update and recovery logic.
pub struct SystemUtility<R> {
    pub(crate) props: PropertyAccessor<R>,
    pub(crate) keys: PropertyKeys,
    pub(crate) tools: ToolPaths,
    power: Box<dyn PowerControl>,
    timing: RebootTiming,
}

impl SystemUtility<ProcessRunner> {
    /// Production wiring: child processes, Linux power control, stderr diagnostics.
    pub fn new(config: PlatformConfig) -> Self {
        let runner = match config.command_timeout {
            Some(limit) => ProcessRunner::with_timeout(limit),
            None => ProcessRunner::new(),
        };
        Self::with_parts(config, runner, Box::new(LinuxPower), Diagnostics::console())
    }
}

impl<R: CommandRunner> SystemUtility<R> {
    /// Wires caller-provided collaborators.
    pub fn with_parts(
        config: PlatformConfig,
        runner: R,
        power: Box<dyn PowerControl>,
        diag: Diagnostics,
    ) -> Self {
        let PlatformConfig { tools, keys, reboot: timing, .. } = config;
        let props = PropertyAccessor::new(runner, tools.property.clone(), diag);
        Self { props, keys, tools, power, timing }
    }

    pub fn properties(&self) -> &PropertyAccessor<R> {
        &self.props
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        self.props.diagnostics()
    }

    pub fn keys(&self) -> &PropertyKeys {
        &self.keys
    }

    /// Reads a property by its store key.
    pub fn get_property(&self, key: &str, mode: ReadMode) -> Option<String> {
        self.props.get(key, mode)
    }

    /// Writes a property by its store key.
    pub fn set_property(&self, key: &str, value: &str) -> bool {
        self.props.set(key, value)
    }

    pub(crate) fn key(&self, key: PropertyKey) -> &str {
        self.keys.name(key)
    }

    pub(crate) fn get_int(&self, key: PropertyKey) -> i32 {
        self.props.get_int(self.key(key))
    }

    pub(crate) fn set_int(&self, key: PropertyKey, value: i32) -> bool {
        self.props.set_int(self.key(key), value)
    }

    /// Flushes storage and restarts the system. Never returns.
    pub fn reboot(&self) -> ! {
        self.diagnostics().debug("Rebooting system");
        reboot::reboot(self.power.as_ref(), self.timing, self.diagnostics())
    }

    /// Configured tools that cannot be found on `PATH`.
    pub fn missing_tools(&self) -> Vec<String> {
        [&self.tools.property, &self.tools.write_protect, &self.tools.nvram]
            .into_iter()
            .filter(|tool| find_in_path(tool).is_none())
            .cloned()
            .collect()
    }
}
