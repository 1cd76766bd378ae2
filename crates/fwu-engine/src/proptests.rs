//! Property-based tests for fwu-engine.
//!
//! # Properties Tested
//!
//! - GUID isolation: a component for other hardware is always `NotFound`
//! - Version boundaries: downgrade, reinstall and upgrade decisions follow
//!   the format-aware ordering
//! - Determinism: fresh tasks built from the same inputs end in the same state
//! - Action table: downgrades never select an update action
//! - Ordering: sorted batches are non-decreasing in install order

#![cfg(test)]

use std::cmp::Ordering;

use fwu_version::{compare, VersionFormat};
use proptest::prelude::*;

use crate::action::ActionId;
use crate::component::{Component, Release};
use crate::device::Device;
use crate::error::ErrorKind;
use crate::flags::{DeviceFlags, InstallFlags, TrustFlags};
use crate::task::{sort_tasks, InstallTask};
use crate::trust::{NoTrustVerifier, StaticTrust};

// =============================================================================
// Generators
// =============================================================================

fn arb_install_flags() -> impl Strategy<Value = InstallFlags> {
    (0u32..32).prop_map(InstallFlags::from_bits_truncate)
}

fn arb_device_flags() -> impl Strategy<Value = DeviceFlags> {
    (0u32..64).prop_map(DeviceFlags::from_bits_truncate)
}

fn arb_triplet() -> impl Strategy<Value = String> {
    (0u32..5, 0u32..5, 0u32..5).prop_map(|(a, b, c)| format!("{}.{}.{}", a, b, c))
}

fn arb_guid() -> impl Strategy<Value = String> {
    "[0-9a-f]{8}-[0-9a-f]{4}"
}

// =============================================================================
// Helper Functions
// =============================================================================

fn updatable_device(guid: &str, version: &str) -> Device {
    Device::new("dev", "Device")
        .with_guid(guid)
        .with_flags(DeviceFlags::UPDATABLE)
        .with_version(version, VersionFormat::Triplet)
}

fn component_for(guid: &str, version: &str) -> Component {
    Component::new("com.example.fw")
        .with_flashed_guid(guid)
        .with_release(Release::new(version))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Components that provide none of the device's GUIDs are NotFound,
    /// whatever the device state and install flags.
    #[test]
    fn prop_guid_mismatch_not_found(
        device_guid in arb_guid(),
        component_guid in arb_guid(),
        device_flags in arb_device_flags(),
        flags in arb_install_flags(),
    ) {
        prop_assume!(!device_guid.eq_ignore_ascii_case(&component_guid));
        let device = updatable_device(&device_guid, "1.0.0").with_flags(device_flags);
        let component = component_for(&component_guid, "1.2.0");
        let mut task = InstallTask::new(&device, &component);
        let err = task.check_requirements(flags, &NoTrustVerifier).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::NotFound);
        prop_assert!(!task.is_validated());
    }

    /// With ALLOW_OLDER and ALLOW_REINSTALL every ordering is accepted and the
    /// downgrade state matches compare(current, release) > 0.
    #[test]
    fn prop_downgrade_matches_compare(current in arb_triplet(), release in arb_triplet()) {
        let device = updatable_device("guid", &current);
        let component = component_for("guid", &release);
        let mut task = InstallTask::new(&device, &component);
        let flags = InstallFlags::ALLOW_OLDER | InstallFlags::ALLOW_REINSTALL;
        task.check_requirements(flags, &NoTrustVerifier).unwrap();
        let ordering = compare(&current, &release, VersionFormat::Triplet);
        prop_assert_eq!(task.is_downgrade(), ordering == Ordering::Greater);
    }

    /// Without permissive flags: newer passes, equal is VersionSame,
    /// older is VersionNewer.
    #[test]
    fn prop_version_boundaries(current in arb_triplet(), release in arb_triplet()) {
        let device = updatable_device("guid", &current);
        let component = component_for("guid", &release);
        let mut task = InstallTask::new(&device, &component);
        let result = task.check_requirements(InstallFlags::empty(), &NoTrustVerifier);
        match compare(&current, &release, VersionFormat::Triplet) {
            Ordering::Less => prop_assert!(result.is_ok()),
            Ordering::Equal => prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::VersionSame),
            Ordering::Greater => prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::VersionNewer),
        }
    }

    /// Two fresh tasks from the same inputs reach the same outcome and state.
    #[test]
    fn prop_fresh_tasks_are_deterministic(
        current in arb_triplet(),
        release in arb_triplet(),
        device_flags in arb_device_flags(),
        flags in arb_install_flags(),
        trusted in any::<bool>(),
    ) {
        let device = updatable_device("guid", &current).with_flags(device_flags);
        let component = component_for("guid", &release);
        let verifier = StaticTrust(if trusted { TrustFlags::PAYLOAD } else { TrustFlags::empty() });

        let mut first = InstallTask::new(&device, &component);
        let mut second = InstallTask::new(&device, &component);
        let r1 = first.check_requirements(flags, &verifier);
        let r2 = second.check_requirements(flags, &verifier);

        prop_assert_eq!(r1, r2);
        prop_assert_eq!(first.is_downgrade(), second.is_downgrade());
        prop_assert_eq!(first.trust_flags(), second.trust_flags());
        prop_assert_eq!(first.is_validated(), second.is_validated());
    }

    /// Downgrades select a downgrade action regardless of trust.
    #[test]
    fn prop_downgrade_action(internal in any::<bool>(), trusted in any::<bool>()) {
        let action = ActionId::from_state(internal, true, trusted);
        prop_assert!(action.as_str().starts_with("downgrade-"));
        let expected = if internal { "downgrade-internal" } else { "downgrade-hotplug" };
        prop_assert_eq!(action.as_str(), expected);
    }

    /// Sorting a batch yields non-decreasing install order.
    #[test]
    fn prop_sort_is_ordered(orders in prop::collection::vec(-10i32..10, 0..12)) {
        let devices: Vec<Device> = orders
            .iter()
            .enumerate()
            .map(|(i, order)| Device::new(format!("dev{}", i), "Device").with_order(*order))
            .collect();
        let component = Component::new("com.example.fw");
        let mut tasks: Vec<InstallTask<'_>> =
            devices.iter().map(|d| InstallTask::new(d, &component)).collect();
        sort_tasks(&mut tasks);
        prop_assert!(tasks.windows(2).all(|w| w[0].device().order <= w[1].device().order));
        prop_assert_eq!(tasks.len(), orders.len());
    }
}
