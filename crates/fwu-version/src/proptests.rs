//! Property-based tests for fwu-version.
//!
//! # Properties Tested
//!
//! - Reflexivity: every version compares equal to itself under every format
//! - Antisymmetry: swapping operands reverses the ordering
//! - Transitivity: the ordering is consistent across mixed version shapes
//! - Packed integers and their dotted rendering compare equal
//! - Dotted numeric versions order like their integer tuples

#![cfg(test)]

use std::cmp::Ordering;

use proptest::prelude::*;

use crate::compare::compare;
use crate::format::{parse_from_format, version_from_u32, VersionFormat};

// =============================================================================
// Generators
// =============================================================================

fn arb_format() -> impl Strategy<Value = VersionFormat> {
    prop::sample::select(VersionFormat::ALL.to_vec())
}

/// Dotted versions with 1 to 4 numeric segments.
fn arb_dotted() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..1000, 1..=4)
}

fn render(parts: &[u32]) -> String {
    parts
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Arbitrary version-ish strings, including malformed ones.
fn arb_version_text() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_dotted().prop_map(|parts| render(&parts)),
        any::<u32>().prop_map(|v| v.to_string()),
        "[0-9a-z.\\-]{0,16}",
    ]
}

/// Versions close to each other, mixing suffixes and segment counts so that
/// triples often share prefixes.
fn arb_close_version() -> impl Strategy<Value = String> {
    let segment = (0u32..3, prop::sample::select(vec!["", "-rc", "a", "b"]))
        .prop_map(|(n, suffix)| format!("{}{}", n, suffix));
    prop::collection::vec(segment, 0..=4).prop_map(|parts| parts.join("."))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// compare(v, v, f) == Equal for every input and format.
    #[test]
    fn prop_compare_reflexive(v in arb_version_text(), fmt in arb_format()) {
        prop_assert_eq!(compare(&v, &v, fmt), Ordering::Equal);
    }

    /// compare(a, b) is the reverse of compare(b, a).
    #[test]
    fn prop_compare_antisymmetric(
        a in arb_version_text(),
        b in arb_version_text(),
        fmt in arb_format(),
    ) {
        prop_assert_eq!(compare(&a, &b, fmt), compare(&b, &a, fmt).reverse());
    }

    /// A packed integer compares equal to its own dotted rendering.
    #[test]
    fn prop_packed_matches_rendering(value in 1u32.., fmt in arb_format()) {
        prop_assume!(fmt.unpacks_integers());
        let rendered = version_from_u32(value, fmt);
        prop_assert_eq!(compare(&value.to_string(), &rendered, fmt), Ordering::Equal);
    }

    /// Dotted numeric versions of equal length order like integer tuples.
    #[test]
    fn prop_dotted_orders_like_tuples(
        a in prop::collection::vec(0u32..1000, 4),
        b in prop::collection::vec(0u32..1000, 4),
    ) {
        let ord = compare(&render(&a), &render(&b), VersionFormat::Quad);
        prop_assert_eq!(ord, a.cmp(&b));
    }

    /// Dotted strings are never rewritten, whatever the format.
    #[test]
    fn prop_dotted_passthrough(parts in prop::collection::vec(0u32..1000, 2..=4), fmt in arb_format()) {
        let v = render(&parts);
        prop_assert_eq!(parse_from_format(&v, fmt), v);
    }

    /// a <= b and b <= c imply a <= c, under every format.
    #[test]
    fn prop_compare_transitive(
        a in arb_close_version(),
        b in arb_close_version(),
        c in arb_close_version(),
        fmt in arb_format(),
    ) {
        let ab = compare(&a, &b, fmt);
        let bc = compare(&b, &c, fmt);
        let ac = compare(&a, &c, fmt);
        if ab != Ordering::Greater && bc != Ordering::Greater {
            prop_assert_ne!(ac, Ordering::Greater);
        }
        if ab == Ordering::Equal && bc == Ordering::Equal {
            prop_assert_eq!(ac, Ordering::Equal);
        }
    }
}
