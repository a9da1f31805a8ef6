// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CONTEXT: Boot-try counters (startup update tries, new-firmware tries)
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Stable (v1.0)
//!
//! Reads default to 0 on failure. There is no read-modify-write atomicity;
//! callers incrementing a counter must serialize themselves.

use crate::exec::CommandRunner;
use crate::property::PropertyKey;
use crate::system::SystemUtility;

impl<R: CommandRunner> SystemUtility<R> {
    /// Sets the startup counter for firmware update tries.
    pub fn set_startup_update_tries(&self, tries: i32) -> bool {
        self.set_int(PropertyKey::StartupUpdateTries, tries)
    }

    pub fn startup_update_tries(&self) -> i32 {
        self.get_int(PropertyKey::StartupUpdateTries)
    }

    /// Sets the counter for trying new firmware (usually slot B).
    pub fn set_new_firmware_tries(&self, tries: i32) -> bool {
        self.set_int(PropertyKey::NewFirmwareTries, tries)
    }

    pub fn new_firmware_tries(&self) -> i32 {
        self.get_int(PropertyKey::NewFirmwareTries)
    }
}
