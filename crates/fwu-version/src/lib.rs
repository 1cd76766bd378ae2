//! # fwu-version
//!
//! Firmware version numbering formats.
//!
//! Devices report their firmware version either as a dotted string or as a
//! packed 32-bit integer whose layout depends on the vendor. This crate
//! handles:
//! - Naming the known numbering schemes ([`VersionFormat`])
//! - Rendering packed integers as dotted strings ([`version_from_u32`])
//! - Normalizing raw release versions ([`parse_from_format`])
//! - Format-aware ordering of two versions ([`compare`], [`vercmp`])
//!
//! Comparison is total: malformed input never panics or errors, it simply
//! sorts low.

pub mod compare;
pub mod error;
pub mod format;
#[cfg(test)]
mod proptests;

pub use compare::{compare, vercmp};
pub use error::VersionError;
pub use format::{parse_from_format, version_from_u32, VersionFormat};
