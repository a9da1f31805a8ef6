// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CONTEXT: Non-volatile (CMOS / NVRAM) data reset through the external tool

use log::debug;

use crate::exec::{CommandLine, CommandRunner};
use crate::system::SystemUtility;

impl<R: CommandRunner> SystemUtility<R> {
    /// Clears non-volatile system data. Output is logged, not interpreted.
    pub fn clear_non_volatile_data(&self) -> bool {
        let command = CommandLine::new(&self.tools.nvram).args(["nvram", "clear"]).merge_stderr();
        let output = self.props.runner().run(&command);
        debug!("nvram clear: {}", output.stdout.trim_end());
        output.success
    }
}
