//! Palette store: ordered color name → hex mapping.
//!
//! The palette definition is a markdown table, one color per row:
//!
//! ```markdown
//! | Color Name    | Hex     | Theme Usage        |
//! |---------------|---------|--------------------|
//! | Deep Space    | #0A0E12 | editor background  |
//! | Electric Blue | #00D1FF | comments, accents  |
//! ```
//!
//! Rows whose second cell is not a `#`-prefixed hex color (the header and
//! separator rows, prose between tables) are skipped. Hex values are
//! canonicalized to uppercase at load. Duplicate names are a load error,
//! never a silent overwrite.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::color::HexColor;
use crate::error::{ResolveError, Result};

/// One named palette color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    pub name: String,
    pub hex: HexColor,
}

/// Immutable, ordered store of named colors. Loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    by_name: HashMap<String, usize>,
}

impl Palette {
    /// Parses a palette from markdown table text.
    pub fn from_markdown(text: &str) -> Result<Self> {
        let mut palette = Palette::default();
        for line in text.lines() {
            let line = line.trim();
            if !line.starts_with('|') {
                continue;
            }
            let mut cells = line.split('|').skip(1).map(str::trim);
            let (Some(name), Some(hex_cell)) = (cells.next(), cells.next()) else {
                continue;
            };
            if name.is_empty() || !hex_cell.starts_with('#') {
                continue;
            }
            let Some(hex) = HexColor::parse(hex_cell) else {
                continue;
            };
            palette.insert(name, hex)?;
        }
        Ok(palette)
    }

    /// Reads and parses a palette definition file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::from_markdown(&text).map_err(|e| e.with_path(path))
    }

    /// Builds a palette from `(name, hex)` pairs. Intended for tests and
    /// programmatic construction.
    pub fn from_entries<I, N, H>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, H)>,
        N: Into<String>,
        H: AsRef<str>,
    {
        let mut palette = Palette::default();
        for (name, hex) in entries {
            let name = name.into();
            let hex = HexColor::parse(hex.as_ref()).ok_or_else(|| {
                ResolveError::parse(format!("invalid hex color for palette entry '{}'", name))
            })?;
            palette.insert(&name, hex)?;
        }
        Ok(palette)
    }

    fn insert(&mut self, name: &str, hex: HexColor) -> Result<()> {
        if self.by_name.contains_key(name) {
            return Err(ResolveError::DuplicatePaletteName {
                name: name.to_string(),
            });
        }
        // Store the canonical form; palette hex is what resolution writes out.
        let canonical = HexColor::parse(&hex.canonical()).ok_or_else(|| {
            ResolveError::parse(format!("invalid hex color for palette entry '{}'", name))
        })?;
        self.by_name.insert(name.to_string(), self.entries.len());
        self.entries.push(PaletteEntry {
            name: name.to_string(),
            hex: canonical,
        });
        Ok(())
    }

    /// Looks up a color by name.
    pub fn get(&self, name: &str) -> Option<&HexColor> {
        self.by_name.get(name).map(|&i| &self.entries[i].hex)
    }

    /// Iterates entries in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &PaletteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PALETTE_MD: &str = "\
# Palette

| Color Name    | Hex       | Theme Usage       |
|---------------|-----------|-------------------|
| Deep Space    | #0a0e12   | editor background |
| Electric Blue | #00D1FF   | comments          |
| Ghost White   | #FFFFFF   | unused            |
";

    #[test]
    fn test_from_markdown_skips_non_color_rows() {
        let palette = Palette::from_markdown(PALETTE_MD).unwrap();
        assert_eq!(palette.len(), 3);
        assert!(palette.get("Color Name").is_none());
    }

    #[test]
    fn test_hex_canonicalized_at_load() {
        let palette = Palette::from_markdown(PALETTE_MD).unwrap();
        assert_eq!(palette.get("Deep Space").unwrap().raw(), "#0A0E12");
    }

    #[test]
    fn test_definition_order_preserved() {
        let palette = Palette::from_markdown(PALETTE_MD).unwrap();
        let names: Vec<&str> = palette.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Deep Space", "Electric Blue", "Ghost White"]);
    }

    #[test]
    fn test_unknown_name() {
        let palette = Palette::from_markdown(PALETTE_MD).unwrap();
        assert!(palette.get("Hot Pink").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let md = "\
| Deep Space | #0A0E12 |
| Deep Space | #111111 |
";
        let err = Palette::from_markdown(md).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::DuplicatePaletteName { ref name } if name == "Deep Space"
        ));
    }

    #[test]
    fn test_from_entries() {
        let palette =
            Palette::from_entries([("Deep Space", "#0A0E12"), ("Electric Blue", "#00D1FF")])
                .unwrap();
        assert_eq!(palette.get("Electric Blue").unwrap().raw(), "#00D1FF");
    }

    #[test]
    fn test_from_entries_invalid_hex() {
        let err = Palette::from_entries([("Bad", "#XYZ")]).unwrap_err();
        assert!(err.to_string().contains("Bad"));
    }

    #[test]
    fn test_rows_with_alpha() {
        let palette = Palette::from_markdown("| Veil | #00000080 | overlay |").unwrap();
        assert_eq!(palette.get("Veil").unwrap().raw(), "#00000080");
    }
}
