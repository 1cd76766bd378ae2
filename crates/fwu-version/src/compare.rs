//! Format-aware version comparison.
//!
//! `Plain` versions are opaque and compared byte-wise. Every other format is
//! first normalized with [`parse_from_format`] and then compared segment by
//! segment: the leading decimal number of each dotted segment is compared
//! numerically, then whatever text follows it is compared lexically, so
//! `1.0.0-rc.1` sorts after `1.0.0` under every structured format.

use std::cmp::Ordering;

use crate::format::{parse_from_format, VersionFormat};

/// Compare two versions under `format`.
///
/// The ordering is total, transitive and never panics. An empty string has
/// no segments and sorts below everything else; a version that is a strict
/// prefix of another (`1.2` vs `1.2.0`) sorts lower.
pub fn compare(a: &str, b: &str, format: VersionFormat) -> Ordering {
    if format == VersionFormat::Plain {
        return a.cmp(b);
    }
    if a == b {
        return Ordering::Equal;
    }

    let a = parse_from_format(a, format);
    let b = parse_from_format(b, format);
    compare_segments(&a, &b)
}

/// C-style comparison returning -1, 0 or 1.
pub fn vercmp(a: &str, b: &str, format: VersionFormat) -> i32 {
    match compare(a, b, format) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

fn compare_segments(a: &str, b: &str) -> Ordering {
    let mut left = segments(a);
    let mut right = segments(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(sa), Some(sb)) => {
                let ord = sa.number.cmp(&sb.number).then_with(|| sa.suffix.cmp(sb.suffix));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

struct Segment<'a> {
    number: u64,
    suffix: &'a str,
}

fn segments(version: &str) -> impl Iterator<Item = Segment<'_>> {
    // "".split('.') yields one empty item; an empty version has no segments
    let parts = if version.is_empty() {
        None
    } else {
        Some(version.split('.'))
    };
    parts.into_iter().flatten().map(parse_segment)
}

fn parse_segment(segment: &str) -> Segment<'_> {
    let digits = segment
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    let number = segment[..digits].bytes().fold(0u64, |acc, b| {
        acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
    });
    Segment {
        number,
        suffix: &segment[digits..],
    }
}
