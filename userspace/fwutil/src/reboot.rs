// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CONTEXT: Reboot sequencing (flush, settle, restart, grace, fatal)
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Stable (v1.0)
//! TEST_COVERAGE: tests/fwutil_host/tests/platform_flow.rs (recording power control)
//!
//! The sequence never returns. Either the OS restarts underneath us or the
//! grace window expires and the process dies.

use std::io;
use std::time::Duration;

use log::{info, warn};

use crate::diag::Diagnostics;

/// Delays around the restart request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebootTiming {
    /// Wait after `sync` so disk write caches can drain.
    pub settle: Duration,
    /// Wait after a restart request that returned control.
    pub grace: Duration,
}

impl Default for RebootTiming {
    fn default() -> Self {
        Self { settle: Duration::from_secs(3), grace: Duration::from_secs(60) }
    }
}

/// OS primitives used while rebooting.
pub trait PowerControl {
    /// Flushes filesystem buffers to durable storage. Blocks.
    fn sync(&self);

    /// Suspends the calling thread.
    fn sleep(&self, duration: Duration);

    /// Asks the kernel to restart. Returning at all means the restart has not
    /// happened yet (some fast-reboot kernels return `Ok`).
    fn restart(&self) -> io::Result<()>;
}

impl<T: PowerControl + ?Sized> PowerControl for Box<T> {
    fn sync(&self) {
        (**self).sync()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }

    fn restart(&self) -> io::Result<()> {
        (**self).restart()
    }
}

/// `sync(2)` and `reboot(2)` on Linux.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxPower;

impl PowerControl for LinuxPower {
    #[allow(unsafe_code)]
    fn sync(&self) {
        // SAFETY: sync(2) takes no arguments and cannot fail.
        unsafe {
            libc::sync();
        }
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    #[allow(unsafe_code)]
    fn restart(&self) -> io::Result<()> {
        // SAFETY: reboot(2) with RB_AUTOBOOT has no pointer arguments.
        let rc = unsafe { libc::reboot(libc::RB_AUTOBOOT) };
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn restart(&self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "reboot(2) is only wired on Linux"))
    }
}

/// Runs the reboot sequence against `power`.
pub fn reboot(power: &dyn PowerControl, timing: RebootTiming, diag: &Diagnostics) -> ! {
    info!("reboot: syncing filesystems");
    power.sync();
    power.sleep(timing.settle);

    info!("reboot: requesting restart");
    match power.restart() {
        Ok(()) => warn!("reboot: restart request returned; waiting {:?}", timing.grace),
        Err(err) => warn!("reboot: restart request failed ({err}); waiting {:?}", timing.grace),
    }
    power.sleep(timing.grace);

    diag.die("Failed to reboot")
}
