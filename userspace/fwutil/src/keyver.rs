// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CONTEXT: TPM anti-rollback key versions (read-only, firmware owned)

use crate::exec::CommandRunner;
use crate::property::PropertyKey;
use crate::system::SystemUtility;

impl<R: CommandRunner> SystemUtility<R> {
    /// Firmware key version stored in the TPM, 0 if unreadable.
    pub fn firmware_key_version(&self) -> i32 {
        self.get_int(PropertyKey::TpmFirmwareVersion)
    }

    /// Kernel key version stored in the TPM, 0 if unreadable.
    pub fn kernel_key_version(&self) -> i32 {
        self.get_int(PropertyKey::TpmKernelVersion)
    }
}
