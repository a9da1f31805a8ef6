// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CONTEXT: Named platform properties backed by the firmware property tool
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Stable (v1.0)
//! TEST_COVERAGE: 7 unit tests + tests/fwutil_host
//!
//! Nothing is cached: every read and write round-trips to the store.

use serde::Deserialize;

use crate::diag::Diagnostics;
use crate::exec::{CommandLine, CommandOutput, CommandRunner};

/// Logical names of the properties this crate reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    StartupUpdateTries,
    CurrentWriteProtect,
    BootWriteProtect,
    NewFirmwareTries,
    VerifiedBootFlags,
    TpmFirmwareVersion,
    TpmKernelVersion,
}

impl PropertyKey {
    pub const ALL: [PropertyKey; 7] = [
        PropertyKey::StartupUpdateTries,
        PropertyKey::CurrentWriteProtect,
        PropertyKey::BootWriteProtect,
        PropertyKey::NewFirmwareTries,
        PropertyKey::VerifiedBootFlags,
        PropertyKey::TpmFirmwareVersion,
        PropertyKey::TpmKernelVersion,
    ];
}

/// Immutable table mapping logical keys to the store's key strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertyKeys {
    pub startup_update_tries: String,
    pub current_write_protect: String,
    pub boot_write_protect: String,
    pub new_firmware_tries: String,
    pub verified_boot_flags: String,
    pub tpm_firmware_version: String,
    pub tpm_kernel_version: String,
}

impl Default for PropertyKeys {
    fn default() -> Self {
        Self {
            startup_update_tries: "fwupdate_tries".into(),
            current_write_protect: "wpsw_cur".into(),
            boot_write_protect: "wpsw_boot".into(),
            new_firmware_tries: "fwb_tries".into(),
            verified_boot_flags: "vdat_flags".into(),
            tpm_firmware_version: "tpm_fwver".into(),
            tpm_kernel_version: "tpm_kernver".into(),
        }
    }
}

impl PropertyKeys {
    /// Backing key string for `key`.
    pub fn name(&self, key: PropertyKey) -> &str {
        match key {
            PropertyKey::StartupUpdateTries => &self.startup_update_tries,
            PropertyKey::CurrentWriteProtect => &self.current_write_protect,
            PropertyKey::BootWriteProtect => &self.boot_write_protect,
            PropertyKey::NewFirmwareTries => &self.new_firmware_tries,
            PropertyKey::VerifiedBootFlags => &self.verified_boot_flags,
            PropertyKey::TpmFirmwareVersion => &self.tpm_firmware_version,
            PropertyKey::TpmKernelVersion => &self.tpm_kernel_version,
        }
    }
}

/// What a failed read does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Terminate through [`Diagnostics::die`].
    #[default]
    Required,
    /// Return `None` and let the caller pick a default.
    Optional,
}

/// Reads and writes properties through the property tool.
#[derive(Debug)]
pub struct PropertyAccessor<R> {
    runner: R,
    tool: String,
    diag: Diagnostics,
}

impl<R: CommandRunner> PropertyAccessor<R> {
    pub fn new(runner: R, tool: impl Into<String>, diag: Diagnostics) -> Self {
        Self { runner, tool: tool.into(), diag }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    /// Reads `key` as raw text.
    pub fn get(&self, key: &str, mode: ReadMode) -> Option<String> {
        let output = self.read(key);
        if output.success {
            return Some(output.stdout);
        }
        match mode {
            ReadMode::Required => self.unreadable(key),
            ReadMode::Optional => None,
        }
    }

    /// Reads `key`, terminating if the store cannot answer.
    pub fn require(&self, key: &str) -> String {
        let output = self.read(key);
        if !output.success {
            self.unreadable(key);
        }
        output.stdout
    }

    /// Writes `key=value`. Failure is reported, never fatal.
    pub fn set(&self, key: &str, value: &str) -> bool {
        self.runner.run(&CommandLine::new(&self.tool).arg(format!("{key}={value}"))).success
    }

    fn read(&self, key: &str) -> CommandOutput {
        self.runner.run(&CommandLine::new(&self.tool).arg(key))
    }

    fn unreadable(&self, key: &str) -> ! {
        self.diag.die(&format!("Failed to get system property: {key}"))
    }

    /// Reads `key` as an integer, `0` when unreadable or unparseable.
    pub fn get_int(&self, key: &str) -> i32 {
        self.get(key, ReadMode::Optional).as_deref().and_then(parse_int).unwrap_or(0)
    }

    /// Writes `value` in decimal.
    pub fn set_int(&self, key: &str, value: i32) -> bool {
        self.set(key, &value.to_string())
    }
}

/// Parses the leading integer of `text` the way C's `%i` conversion does.
///
/// Leading whitespace and a sign are accepted; `0x`/`0X` selects hex, a leading
/// `0` octal, anything else decimal. Parsing stops at the first invalid digit.
/// The value is read as a 64-bit long (saturating) and then truncated to
/// `i32`, so `0xffffffff` reads as `-1` like it does on glibc.
/// Returns `None` when no digit is found.
pub fn parse_int(text: &str) -> Option<i32> {
    let s = text.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let bytes = s.as_bytes();
    let (radix, digits) = if bytes.len() >= 2
        && bytes[0] == b'0'
        && (bytes[1] == b'x' || bytes[1] == b'X')
        && bytes.get(2).is_some_and(u8::is_ascii_hexdigit)
    {
        (16, &s[2..])
    } else if bytes.first() == Some(&b'0') {
        (8, s)
    } else {
        (10, s)
    };

    let mut magnitude: u64 = 0;
    let mut overflow = false;
    let mut seen = false;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else { break };
        match magnitude.checked_mul(u64::from(radix)).and_then(|m| m.checked_add(u64::from(digit))) {
            Some(next) => magnitude = next,
            None => overflow = true,
        }
        seen = true;
    }
    if !seen {
        return None;
    }

    let long = match (negative, overflow) {
        (false, true) => i64::MAX,
        (true, true) => i64::MIN,
        (false, false) => i64::try_from(magnitude).unwrap_or(i64::MAX),
        (true, false) => 0i64.checked_sub_unsigned(magnitude).unwrap_or(i64::MIN),
    };
    // Truncation mirrors the C assignment of a long into an int.
    Some(long as i32)
}
