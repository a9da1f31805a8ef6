// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CONTEXT: Integration tests for property access, status derivation, reboot and NV reset
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Stable
//! TEST_COVERAGE: 23 tests
//!
//! TEST_SCOPE:
//!   - Property reads (required / optional) and writes
//!   - Counter defaults and round trips
//!   - One-stop flag derivation
//!   - Hardware write-protect fallback chain
//!   - Software write-protect parsing and fail-open probe failure
//!   - Reboot ordering and fatal timeout
//!   - NV reset command shape

use std::time::Duration;

use fwutil::{ReadMode, Severity, WriteProtectState};
use fwutil_host::{utility, FakePlatform, PowerEvent, RecordingPower};
use proptest::prelude::*;

#[test]
fn optional_read_of_missing_key_returns_none() {
    let platform = FakePlatform::new();
    let (util, sink) = utility(&platform, RecordingPower::new());
    assert_eq!(util.get_property("fwb_tries", ReadMode::Optional), None);
    assert!(sink.lines().is_empty());
    assert_eq!(platform.history(), ["crossystem fwb_tries"]);
}

#[test]
#[should_panic(expected = "fatal: Failed to get system property: mainfw_act")]
fn required_read_of_missing_key_is_fatal() {
    let platform = FakePlatform::new();
    let (util, _sink) = utility(&platform, RecordingPower::new());
    util.get_property("mainfw_act", ReadMode::Required);
}

#[test]
fn require_returns_raw_text() {
    let platform = FakePlatform::new().with_property("mainfw_act", "A");
    let (util, _sink) = utility(&platform, RecordingPower::new());
    assert_eq!(util.properties().require("mainfw_act"), "A");
}

#[test]
fn set_property_uses_assignment_argument() {
    let platform = FakePlatform::new();
    let (util, _sink) = utility(&platform, RecordingPower::new());
    assert!(util.set_property("fwupdate_tries", "6"));
    let last = platform.last_command().expect("command issued");
    assert_eq!(last.program(), "crossystem");
    assert_eq!(last.arguments(), &["fwupdate_tries=6".to_string()]);
    assert_eq!(platform.property("fwupdate_tries").as_deref(), Some("6"));
}

#[test]
fn counters_default_to_zero_when_unreadable() {
    let platform = FakePlatform::new();
    let (util, sink) = utility(&platform, RecordingPower::new());
    assert_eq!(util.startup_update_tries(), 0);
    assert_eq!(util.new_firmware_tries(), 0);
    assert_eq!(util.firmware_key_version(), 0);
    assert_eq!(util.kernel_key_version(), 0);
    assert!(sink.messages(Severity::Fatal).is_empty());
}

#[test]
fn counters_default_to_zero_when_unparseable() {
    let platform = FakePlatform::new().with_property("fwb_tries", "(error)");
    let (util, _sink) = utility(&platform, RecordingPower::new());
    assert_eq!(util.new_firmware_tries(), 0);
}

#[test]
fn counter_round_trip() {
    let platform = FakePlatform::new();
    let (util, _sink) = utility(&platform, RecordingPower::new());
    assert!(util.set_startup_update_tries(6));
    assert!(util.set_new_firmware_tries(-1));
    assert_eq!(util.startup_update_tries(), 6);
    assert_eq!(util.new_firmware_tries(), -1);
    assert_eq!(platform.property("fwb_tries").as_deref(), Some("-1"));
}

#[test]
fn key_versions_accept_hex() {
    let platform = FakePlatform::new()
        .with_property("tpm_fwver", "0x00010002")
        .with_property("tpm_kernver", "0x10001");
    let (util, _sink) = utility(&platform, RecordingPower::new());
    assert_eq!(util.firmware_key_version(), 0x0001_0002);
    assert_eq!(util.kernel_key_version(), 0x1_0001);
}

#[test]
fn one_stop_mode_follows_flag_bit() {
    for (flags, expected) in [("0x0C", true), ("0x04", false), ("8", true), ("0", false)] {
        let platform = FakePlatform::new().with_property("vdat_flags", flags);
        let (util, _sink) = utility(&platform, RecordingPower::new());
        assert_eq!(util.is_one_stop_mode(), expected, "vdat_flags={flags}");
    }
}

#[test]
fn wide_flag_values_wrap_to_i32() {
    let platform = FakePlatform::new().with_property("vdat_flags", "0xffffffff");
    let (util, _sink) = utility(&platform, RecordingPower::new());
    assert!(util.is_one_stop_mode());

    let platform = FakePlatform::new().with_property("vdat_flags", "0x100000004");
    let (util, _sink) = utility(&platform, RecordingPower::new());
    assert!(!util.is_one_stop_mode());

    let platform = FakePlatform::new().with_property("tpm_fwver", "0xffffffff");
    let (util, _sink) = utility(&platform, RecordingPower::new());
    assert_eq!(util.firmware_key_version(), -1);
}

#[test]
fn one_stop_mode_false_when_flags_unreadable() {
    let platform = FakePlatform::new();
    let (util, _sink) = utility(&platform, RecordingPower::new());
    assert!(!util.is_one_stop_mode());
}

#[test]
fn hardware_wp_prefers_current_switch() {
    let platform =
        FakePlatform::new().with_property("wpsw_cur", "0").with_property("wpsw_boot", "1");
    let (util, _sink) = utility(&platform, RecordingPower::new());
    assert!(!util.is_hardware_write_protected());
    assert_eq!(platform.history(), ["crossystem wpsw_cur"]);
}

#[test]
fn hardware_wp_falls_back_to_boot_switch() {
    let platform = FakePlatform::new().with_property("wpsw_boot", "1");
    let (util, _sink) = utility(&platform, RecordingPower::new());
    assert!(util.is_hardware_write_protected());
    assert_eq!(platform.history(), ["crossystem wpsw_cur", "crossystem wpsw_boot"]);
}

#[test]
fn hardware_wp_only_one_counts() {
    for (value, expected) in [("1", true), ("0", false), ("2", false), ("junk", false)] {
        let platform = FakePlatform::new().with_property("wpsw_cur", value);
        let (util, _sink) = utility(&platform, RecordingPower::new());
        assert_eq!(util.is_hardware_write_protected(), expected, "wpsw_cur={value}");
    }
}

#[test]
#[should_panic(expected = "fatal: Failed to determine hardware write protection status")]
fn hardware_wp_unreadable_is_fatal() {
    let platform = FakePlatform::new();
    let (util, _sink) = utility(&platform, RecordingPower::new());
    util.is_hardware_write_protected();
}

#[test]
fn software_wp_enabled_and_disabled() {
    let enabled = FakePlatform::new()
        .with_wp_output(Some("WP: status: 0x80\nWP: write protect is enabled.\n"));
    let (util, _sink) = utility(&enabled, RecordingPower::new());
    assert!(util.is_software_write_protected("spi"));
    assert_eq!(enabled.history(), ["flashrom --wp-status -p internal:bus=spi"]);

    let disabled = FakePlatform::new().with_wp_output(Some("WP: write protect is disabled.\n"));
    let (util, _sink) = utility(&disabled, RecordingPower::new());
    assert!(!util.is_software_write_protected("lpc"));
    assert_eq!(util.software_write_protect("lpc"), WriteProtectState::Unprotected);
}

#[test]
fn software_wp_probe_failure_reads_unprotected() {
    let platform = FakePlatform::new().with_wp_output(None);
    let (util, sink) = utility(&platform, RecordingPower::new());
    assert_eq!(util.software_write_protect("spi"), WriteProtectState::Indeterminate);
    assert!(!util.is_software_write_protected("spi"));
    assert!(sink.lines().is_empty());
}

#[test]
#[should_panic(expected = "fatal: Unknown write protection status: WP: status: 0x00")]
fn software_wp_unrecognized_text_is_fatal() {
    let platform = FakePlatform::new().with_wp_output(Some("WP: status: 0x00"));
    let (util, _sink) = utility(&platform, RecordingPower::new());
    util.is_software_write_protected("spi");
}

#[test]
fn reboot_syncs_before_restart_and_waits_before_dying() {
    let platform = FakePlatform::new();
    let power = RecordingPower::new();
    let (util, sink) = utility(&platform, power.clone());

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| util.reboot()));
    assert!(outcome.is_err(), "reboot must not return");
    assert_eq!(
        power.events(),
        vec![
            PowerEvent::Sync,
            PowerEvent::Sleep(Duration::from_secs(3)),
            PowerEvent::Restart,
            PowerEvent::Sleep(Duration::from_secs(60)),
        ]
    );
    assert_eq!(sink.messages(Severity::Fatal), vec!["Failed to reboot".to_string()]);
}

#[test]
fn reboot_failure_still_observes_grace_window() {
    let platform = FakePlatform::new();
    let power = RecordingPower::failing_restart();
    let (util, _sink) = utility(&platform, power.clone());

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| util.reboot()));
    assert!(outcome.is_err());
    let events = power.events();
    assert_eq!(events.last(), Some(&PowerEvent::Sleep(Duration::from_secs(60))));
    assert_eq!(events.first(), Some(&PowerEvent::Sync));
}

#[test]
fn nvram_clear_merges_stderr_and_reports_status() {
    let platform = FakePlatform::new().with_nvram_ok(true);
    let (util, _sink) = utility(&platform, RecordingPower::new());
    assert!(util.clear_non_volatile_data());
    let last = platform.last_command().expect("command issued");
    assert!(last.merges_stderr());
    assert_eq!(last.to_string(), "mosys nvram clear 2>&1");

    let failing = FakePlatform::new().with_nvram_ok(false);
    let (util, _sink) = utility(&failing, RecordingPower::new());
    assert!(!util.clear_non_volatile_data());
}

#[test]
fn reads_are_not_cached() {
    let platform = FakePlatform::new().with_property("vdat_flags", "0");
    let (util, _sink) = utility(&platform, RecordingPower::new());
    assert!(!util.is_one_stop_mode());
    assert!(util.set_property("vdat_flags", "0x08"));
    assert!(util.is_one_stop_mode());
}

proptest! {
    #[test]
    fn one_stop_matches_bit_three(flags in any::<i32>()) {
        let platform = FakePlatform::new().with_property("vdat_flags", &flags.to_string());
        let (util, _sink) = utility(&platform, RecordingPower::new());
        prop_assert_eq!(util.is_one_stop_mode(), flags & 0x08 != 0);
    }
}
