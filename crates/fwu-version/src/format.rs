//! Version numbering formats.
//!
//! A [`VersionFormat`] describes how a device encodes its firmware version.
//! Dotted strings are used as-is; bare integers are unpacked according to the
//! format's bit layout before any comparison takes place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// Version numbering scheme declared by a device or a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionFormat {
    /// Format is not known
    #[default]
    Unknown,
    /// Opaque string, compared byte-wise
    Plain,
    /// Single decimal number
    Number,
    /// AA.BB, 16 bits each
    Pair,
    /// AA.BB.CCDD, 8/8/16 bits
    Triplet,
    /// AA.BB.CC.DD, 8 bits each
    Quad,
    /// Four binary-coded-decimal bytes
    Bcd,
    /// Intel Management Engine (first generation)
    IntelMe,
    /// Intel Management Engine (second generation)
    IntelMe2,
    /// Legacy Microsoft Surface, 10/12/10 bits
    SurfaceLegacy,
    /// Microsoft Surface, 8/16/8 bits
    Surface,
    /// Dell BIOS, 8/8/8 bits of the low 24 bits
    DellBios,
    /// Zero-padded hexadecimal
    Hex,
}

impl VersionFormat {
    /// All known formats, in declaration order.
    pub const ALL: [VersionFormat; 13] = [
        Self::Unknown,
        Self::Plain,
        Self::Number,
        Self::Pair,
        Self::Triplet,
        Self::Quad,
        Self::Bcd,
        Self::IntelMe,
        Self::IntelMe2,
        Self::SurfaceLegacy,
        Self::Surface,
        Self::DellBios,
        Self::Hex,
    ];

    /// Canonical string form, e.g. `triplet` or `intel-me2`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Plain => "plain",
            Self::Number => "number",
            Self::Pair => "pair",
            Self::Triplet => "triplet",
            Self::Quad => "quad",
            Self::Bcd => "bcd",
            Self::IntelMe => "intel-me",
            Self::IntelMe2 => "intel-me2",
            Self::SurfaceLegacy => "surface-legacy",
            Self::Surface => "surface",
            Self::DellBios => "dell-bios",
            Self::Hex => "hex",
        }
    }

    /// Parse a format name, mapping anything unrecognized to `Unknown`.
    ///
    /// Release metadata may name formats this build does not know about;
    /// those can never match a device format, which is what `Unknown` gives.
    pub fn from_str_lossy(s: &str) -> Self {
        s.parse().unwrap_or(Self::Unknown)
    }

    /// Whether integers in this format are unpacked into dotted notation.
    pub fn unpacks_integers(&self) -> bool {
        !matches!(self, Self::Unknown | Self::Plain)
    }
}

impl fmt::Display for VersionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionFormat {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|fmt| fmt.as_str() == s)
            .ok_or_else(|| VersionError::UnknownFormat(s.to_string()))
    }
}

/// Render a packed 32-bit version according to `format`.
///
/// `Unknown`, `Plain` and `Number` render the plain decimal value.
pub fn version_from_u32(value: u32, format: VersionFormat) -> String {
    match format {
        VersionFormat::Quad => format!(
            "{}.{}.{}.{}",
            (value >> 24) & 0xff,
            (value >> 16) & 0xff,
            (value >> 8) & 0xff,
            value & 0xff
        ),
        VersionFormat::Triplet => format!(
            "{}.{}.{}",
            (value >> 24) & 0xff,
            (value >> 16) & 0xff,
            value & 0xffff
        ),
        VersionFormat::Pair => format!("{}.{}", (value >> 16) & 0xffff, value & 0xffff),
        VersionFormat::Bcd => format!(
            "{}.{}.{}.{}",
            bcd_to_decimal((value >> 24) as u8),
            bcd_to_decimal((value >> 16) as u8),
            bcd_to_decimal((value >> 8) as u8),
            bcd_to_decimal(value as u8)
        ),
        VersionFormat::IntelMe => format!(
            "{}.{}.{}.{}",
            ((value >> 29) & 0x07) + 0x0b,
            (value >> 24) & 0x1f,
            (value >> 16) & 0xff,
            value & 0xffff
        ),
        VersionFormat::IntelMe2 => format!(
            "{}.{}.{}.{}",
            (value >> 28) & 0x0f,
            (value >> 24) & 0x0f,
            (value >> 16) & 0xff,
            value & 0xffff
        ),
        VersionFormat::SurfaceLegacy => format!(
            "{}.{}.{}",
            (value >> 22) & 0x3ff,
            (value >> 10) & 0xfff,
            value & 0x3ff
        ),
        VersionFormat::Surface => format!(
            "{}.{}.{}",
            (value >> 24) & 0xff,
            (value >> 8) & 0xffff,
            value & 0xff
        ),
        VersionFormat::DellBios => format!(
            "{}.{}.{}",
            (value >> 16) & 0xff,
            (value >> 8) & 0xff,
            value & 0xff
        ),
        VersionFormat::Hex => format!("0x{:08x}", value),
        VersionFormat::Unknown | VersionFormat::Plain | VersionFormat::Number => {
            value.to_string()
        }
    }
}

fn bcd_to_decimal(byte: u8) -> u32 {
    u32::from(byte >> 4) * 10 + u32::from(byte & 0x0f)
}

/// Normalize a raw version string according to `format`.
///
/// Strings that are already dotted, or that are not a plain decimal or
/// `0x`-prefixed hexadecimal integer, are returned unchanged. So are zero and
/// values wider than 32 bits, which no packed layout can represent.
pub fn parse_from_format(raw: &str, format: VersionFormat) -> String {
    if raw.contains('.') || !format.unpacks_integers() {
        return raw.to_string();
    }

    let (digits, radix) = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (raw, 10),
    };

    match u64::from_str_radix(digits, radix) {
        Ok(0) | Err(_) => raw.to_string(),
        Ok(value) => match u32::try_from(value) {
            Ok(value) => version_from_u32(value, format),
            Err(_) => {
                tracing::debug!(raw, %format, "version does not fit in 32 bits, leaving as-is");
                raw.to_string()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_string_roundtrip() {
        for fmt in VersionFormat::ALL {
            assert_eq!(fmt.as_str().parse::<VersionFormat>().unwrap(), fmt);
        }
    }

    #[test]
    fn test_unknown_format_name() {
        assert!("semver".parse::<VersionFormat>().is_err());
        assert_eq!(VersionFormat::from_str_lossy("semver"), VersionFormat::Unknown);
        assert_eq!(VersionFormat::from_str_lossy("dell-bios"), VersionFormat::DellBios);
    }

    #[test]
    fn test_serde_uses_string_form() {
        let json = serde_json::to_string(&VersionFormat::IntelMe2).unwrap();
        assert_eq!(json, "\"intel-me2\"");
        let fmt: VersionFormat = serde_json::from_str("\"surface-legacy\"").unwrap();
        assert_eq!(fmt, VersionFormat::SurfaceLegacy);
    }

    #[test]
    fn test_version_from_u32_layouts() {
        assert_eq!(version_from_u32(0x01020304, VersionFormat::Quad), "1.2.3.4");
        assert_eq!(version_from_u32(0x01020304, VersionFormat::Triplet), "1.2.772");
        assert_eq!(version_from_u32(0x00010002, VersionFormat::Pair), "1.2");
        assert_eq!(version_from_u32(0x12345678, VersionFormat::Bcd), "12.34.56.78");
        assert_eq!(version_from_u32(0x00010203, VersionFormat::DellBios), "1.2.3");
        assert_eq!(version_from_u32(0x0a, VersionFormat::Hex), "0x0000000a");
        assert_eq!(version_from_u32(42, VersionFormat::Number), "42");
    }

    #[test]
    fn test_intel_me_layouts() {
        // 3 bits + 11, 5 bits, 8 bits, 16 bits
        let value = (1 << 29) | (2 << 24) | (3 << 16) | 4;
        assert_eq!(version_from_u32(value, VersionFormat::IntelMe), "12.2.3.4");
        let value = (11 << 28) | (2 << 24) | (3 << 16) | 4;
        assert_eq!(version_from_u32(value, VersionFormat::IntelMe2), "11.2.3.4");
    }

    #[test]
    fn test_surface_layouts() {
        let value = (1 << 22) | (2 << 10) | 3;
        assert_eq!(version_from_u32(value, VersionFormat::SurfaceLegacy), "1.2.3");
        let value = (1 << 24) | (2 << 8) | 3;
        assert_eq!(version_from_u32(value, VersionFormat::Surface), "1.2.3");
    }

    #[test]
    fn test_parse_from_format_passthrough() {
        assert_eq!(parse_from_format("1.2.3", VersionFormat::Quad), "1.2.3");
        assert_eq!(parse_from_format("12345", VersionFormat::Plain), "12345");
        assert_eq!(parse_from_format("12345", VersionFormat::Unknown), "12345");
        assert_eq!(parse_from_format("abc", VersionFormat::Triplet), "abc");
        assert_eq!(parse_from_format("0", VersionFormat::Triplet), "0");
        assert_eq!(parse_from_format("4294967296", VersionFormat::Quad), "4294967296");
    }

    #[test]
    fn test_parse_from_format_unpacks() {
        assert_eq!(parse_from_format("16909060", VersionFormat::Quad), "1.2.3.4");
        assert_eq!(parse_from_format("0x01020304", VersionFormat::Quad), "1.2.3.4");
        assert_eq!(parse_from_format("65538", VersionFormat::Pair), "1.2");
    }
}
