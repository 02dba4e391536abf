//! Color value parsing for theme documents.
//!
//! A color slot in a theme document holds one of three things:
//!
//! - RGB/RGBA hex: `#0A0E12` or `#0A0E12FF` (the `#` prefix and casing are
//!   tolerated on input; the canonical form is `#` plus uppercase digits)
//! - Flag-coded token: `05x00000000` (a two-digit mask, a literal `x`, and an
//!   eight-digit payload encoding bold/italic/transparency instructions)
//! - Null: "inherit the platform default"
//!
//! Flag-coded tokens are opaque to resolution: they are never rewritten, in
//! any mode. Their raw text is preserved verbatim.
//!
//! # Example
//!
//! ```rust
//! use themec_resolve::ColorValue;
//!
//! let hex = ColorValue::parse("0a0e12").unwrap();
//! assert_eq!(hex.to_string(), "0a0e12");
//! assert_eq!(hex, ColorValue::parse("#0A0E12").unwrap());
//!
//! let flag = ColorValue::parse("05x00000000").unwrap();
//! assert!(flag.is_flag());
//! ```

use std::fmt;

use serde::{Serialize, Serializer};

/// A hex color as read from a document or palette.
///
/// Keeps the raw text so untouched entries round-trip byte-for-byte, and
/// compares by canonical form so `"0a0e12"` equals `"#0A0E12"`.
#[derive(Debug, Clone)]
pub struct HexColor {
    raw: String,
}

impl HexColor {
    /// Parses a 6-or-8-digit hex color. The `#` prefix is optional.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if (digits.len() == 6 || digits.len() == 8)
            && digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            Some(HexColor { raw: s.to_string() })
        } else {
            None
        }
    }

    /// The text exactly as it appeared in the source.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Canonical form: `#` prefix plus uppercase digits.
    pub fn canonical(&self) -> String {
        let digits = self.raw.strip_prefix('#').unwrap_or(&self.raw);
        format!("#{}", digits.to_ascii_uppercase())
    }

    /// Whether the raw text is already in canonical form.
    pub fn is_canonical(&self) -> bool {
        self.raw == self.canonical()
    }
}

impl PartialEq for HexColor {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for HexColor {}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A flag-coded slot value: `MMxPPPPPPPP`.
///
/// The mask and payload are decoded for inspection, but the raw text is what
/// gets written back — a flag token survives resolution unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagToken {
    raw: String,
    mask: u8,
    payload: u32,
}

impl FlagToken {
    /// Parses a flag token: exactly two hex digits, `x`, eight hex digits.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 11 || bytes[2] != b'x' {
            return None;
        }
        // from_str_radix tolerates a leading sign, the grammar does not.
        if !bytes[0..2].iter().all(u8::is_ascii_hexdigit)
            || !bytes[3..11].iter().all(u8::is_ascii_hexdigit)
        {
            return None;
        }
        let mask = u8::from_str_radix(&s[0..2], 16).ok()?;
        let payload = u32::from_str_radix(&s[3..11], 16).ok()?;
        Some(FlagToken {
            raw: s.to_string(),
            mask,
            payload,
        })
    }

    /// The text exactly as it appeared in the source.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The two-digit flag mask.
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// The eight-digit payload.
    pub fn payload(&self) -> u32 {
        self.payload
    }
}

impl fmt::Display for FlagToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A single slot value in a theme entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorValue {
    /// A literal hex color.
    Hex(HexColor),
    /// A flag-coded instruction; passed through untouched by resolution.
    Flag(FlagToken),
    /// Null: inherit the platform default.
    Inherit,
}

impl ColorValue {
    /// Parses a slot string. Flag tokens are tried first since a bare hex
    /// color can never contain the `x` separator.
    ///
    /// Returns `None` for text that is neither a flag token nor valid hex —
    /// the caller treats the containing entry as malformed.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(flag) = FlagToken::parse(s) {
            return Some(ColorValue::Flag(flag));
        }
        HexColor::parse(s).map(ColorValue::Hex)
    }

    /// Builds a hex value from canonical text. Used for resolved palette
    /// colors, which are canonicalized at palette load.
    pub fn hex(canonical: impl Into<String>) -> Self {
        ColorValue::Hex(HexColor {
            raw: canonical.into(),
        })
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, ColorValue::Flag(_))
    }

    pub fn is_hex(&self) -> bool {
        matches!(self, ColorValue::Hex(_))
    }

    /// The hex color, if this value is one.
    pub fn as_hex(&self) -> Option<&HexColor> {
        match self {
            ColorValue::Hex(h) => Some(h),
            _ => None,
        }
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorValue::Hex(h) => h.fmt(f),
            ColorValue::Flag(t) => t.fmt(f),
            ColorValue::Inherit => f.write_str("null"),
        }
    }
}

impl Serialize for ColorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ColorValue::Inherit => serializer.serialize_none(),
            other => serializer.collect_str(other),
        }
    }
}

/// The two-slot value of one theme entry.
///
/// `slot0` is conventionally background-or-state and `slot1` is
/// foreground-or-text, but the interpretation is fixed per classification
/// key, not universal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSlot {
    pub slot0: ColorValue,
    pub slot1: ColorValue,
}

// Serializes as the `[slot0, slot1]` pair it came from.
impl Serialize for ColorSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeTuple;
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(&self.slot0)?;
        pair.serialize_element(&self.slot1)?;
        pair.end()
    }
}

impl ColorSlot {
    pub fn new(slot0: ColorValue, slot1: ColorValue) -> Self {
        ColorSlot { slot0, slot1 }
    }
}

impl fmt::Display for ColorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.slot0, self.slot1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_with_prefix() {
        let v = ColorValue::parse("#0A0E12").unwrap();
        assert!(v.is_hex());
        assert_eq!(v.to_string(), "#0A0E12");
    }

    #[test]
    fn test_parse_hex_without_prefix() {
        let v = ColorValue::parse("0a0e12").unwrap();
        assert_eq!(v.as_hex().unwrap().canonical(), "#0A0E12");
    }

    #[test]
    fn test_parse_hex_with_alpha() {
        let v = ColorValue::parse("#00D1FF80").unwrap();
        assert_eq!(v.as_hex().unwrap().canonical(), "#00D1FF80");
    }

    #[test]
    fn test_hex_equality_is_canonical() {
        assert_eq!(
            ColorValue::parse("0a0e12").unwrap(),
            ColorValue::parse("#0A0E12").unwrap()
        );
    }

    #[test]
    fn test_parse_invalid_hex() {
        assert!(ColorValue::parse("#0A0E").is_none());
        assert!(ColorValue::parse("#GGGGGG").is_none());
        assert!(ColorValue::parse("#0A0E120").is_none());
        assert!(ColorValue::parse("").is_none());
    }

    #[test]
    fn test_parse_flag_token() {
        let v = ColorValue::parse("05x00000000").unwrap();
        match &v {
            ColorValue::Flag(t) => {
                assert_eq!(t.mask(), 0x05);
                assert_eq!(t.payload(), 0);
                assert_eq!(t.raw(), "05x00000000");
            }
            _ => panic!("expected flag token"),
        }
    }

    #[test]
    fn test_parse_flag_token_mixed_case() {
        let v = ColorValue::parse("0Ax0000FFff").unwrap();
        match &v {
            ColorValue::Flag(t) => {
                assert_eq!(t.mask(), 0x0A);
                assert_eq!(t.payload(), 0x0000FFFF);
                // Raw text preserved, not re-rendered.
                assert_eq!(v.to_string(), "0Ax0000FFff");
            }
            _ => panic!("expected flag token"),
        }
    }

    #[test]
    fn test_parse_invalid_flag_token() {
        assert!(FlagToken::parse("5x00000000").is_none());
        assert!(FlagToken::parse("05x0000000").is_none());
        assert!(FlagToken::parse("05y00000000").is_none());
        assert!(FlagToken::parse("05x0000000g").is_none());
    }

    #[test]
    fn test_parse_flag_token_rejects_signed_digits() {
        // from_str_radix accepts "+5"; the token grammar is hex digits only.
        assert!(FlagToken::parse("+5x00000000").is_none());
        assert!(FlagToken::parse("05x+0000000").is_none());
        assert!(ColorValue::parse("+5x00000000").is_none());
    }

    #[test]
    fn test_canonical_detection() {
        assert!(HexColor::parse("#0A0E12").unwrap().is_canonical());
        assert!(!HexColor::parse("#0a0e12").unwrap().is_canonical());
        assert!(!HexColor::parse("0A0E12").unwrap().is_canonical());
    }

    #[test]
    fn test_slot_display() {
        let slot = ColorSlot::new(
            ColorValue::parse("05x00000000").unwrap(),
            ColorValue::Inherit,
        );
        assert_eq!(slot.to_string(), "[05x00000000, null]");
    }
}
