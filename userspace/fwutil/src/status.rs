// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CONTEXT: Derived platform status (one-stop mode, hardware/software write protection)
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Stable (v1.0)
//! TEST_COVERAGE: 3 unit tests + tests/fwutil_host/tests/platform_flow.rs
//!
//! Every answer is recomputed from the store on each call.

use std::fmt;

use crate::exec::{CommandLine, CommandRunner};
use crate::property::{parse_int, PropertyKey, ReadMode};
use crate::system::SystemUtility;

/// VBSD_LF_USE_RO_NORMAL: RO firmware boots the normal path directly.
pub const ONE_STOP_FLAG: i32 = 0x08;

pub const WP_ENABLED_STATUS: &str = "WP: write protect is enabled.";
pub const WP_DISABLED_STATUS: &str = "WP: write protect is disabled.";

/// Write-protection state derived from one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteProtectState {
    Protected,
    Unprotected,
    /// The probe itself failed.
    Indeterminate,
}

impl WriteProtectState {
    /// Scans inspector output. The enabled phrase wins if both are present.
    pub fn from_status_text(text: &str) -> Option<Self> {
        if text.contains(WP_ENABLED_STATUS) {
            Some(Self::Protected)
        } else if text.contains(WP_DISABLED_STATUS) {
            Some(Self::Unprotected)
        } else {
            None
        }
    }

    pub fn is_protected(self) -> bool {
        self == Self::Protected
    }
}

impl fmt::Display for WriteProtectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Protected => "enabled",
            Self::Unprotected => "disabled",
            Self::Indeterminate => "unknown",
        };
        f.write_str(text)
    }
}

impl<R: CommandRunner> SystemUtility<R> {
    /// True if the system booted in one-stop ("RO-Normal") firmware.
    pub fn is_one_stop_mode(&self) -> bool {
        self.get_int(PropertyKey::VerifiedBootFlags) & ONE_STOP_FLAG != 0
    }

    /// Hardware write-protect switch.
    ///
    /// Not every board reports the current switch position, so the boot-time
    /// record is used when the current one is unreadable. Neither readable is
    /// fatal. Only the value `1` counts as protected.
    pub fn is_hardware_write_protected(&self) -> bool {
        let value = self
            .props
            .get(self.key(PropertyKey::CurrentWriteProtect), ReadMode::Optional)
            .or_else(|| self.props.get(self.key(PropertyKey::BootWriteProtect), ReadMode::Optional));
        match value {
            Some(text) => parse_int(&text).unwrap_or(0) == 1,
            None => self.diagnostics().die("Failed to determine hardware write protection status"),
        }
    }

    /// Software write-protect state of the flash on bus `target`.
    ///
    /// A failed probe is `Indeterminate`; output carrying neither status
    /// phrase is fatal.
    pub fn software_write_protect(&self, target: &str) -> WriteProtectState {
        let command = CommandLine::new(&self.tools.write_protect)
            .args(["--wp-status", "-p"])
            .arg(format!("internal:bus={target}"));
        let output = self.props.runner().run(&command);
        if !output.success {
            return WriteProtectState::Indeterminate;
        }
        match WriteProtectState::from_status_text(&output.stdout) {
            Some(state) => state,
            None => self
                .diagnostics()
                .die(&format!("Unknown write protection status: {}", output.stdout)),
        }
    }

    /// Software write-protect status on `target`; a failed probe reads as unprotected.
    pub fn is_software_write_protected(&self, target: &str) -> bool {
        self.software_write_protect(target).is_protected()
    }
}
