//! Theme document model.
//!
//! A theme document is YAML with top-level metadata and a `Sections` mapping:
//!
//! ```yaml
//! Name: Honeypunk
//! Identity: honeypunk.dark
//! Version: 1.4.0
//! GUID: 6f1c1c3e-1111-2222-3333-444455556666
//! BaseGUID: 00000000-0000-0000-0000-000000000000
//! Sections:
//!   Editor:
//!     GUID: aaaa-bbbb                 # passthrough, not a color entry
//!     editor.comment: ["#111827", "#94A3B8"]
//!     editor.selection: ["05x00000000", null]
//! ```
//!
//! Each color entry is a two-element list `[slot0, slot1]`. Values that are
//! neither hex, a flag token, nor null mark the entry as malformed: it is
//! preserved verbatim and reported, never rewritten. Everything that is not
//! a two-element list (section GUIDs, nested structures) passes through
//! untouched. Ordering is preserved end to end — section order, key order,
//! and the position of `Sections` among the metadata fields.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::color::{ColorSlot, ColorValue};
use crate::error::{ResolveError, Result};

/// Top-level metadata fields every theme document must carry. They are
/// validated at load and passed through unchanged.
pub const REQUIRED_METADATA: [&str; 5] = ["Name", "Identity", "Version", "GUID", "BaseGUID"];

/// The value of one section entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    /// A parsed two-slot color value; the only shape resolution touches.
    Slot(ColorSlot),
    /// A two-element list holding something unrecognizable. Preserved
    /// verbatim; surfaces as a warning in the report.
    Malformed(Value),
    /// Anything else (section GUIDs, odd shapes). Passed through silently.
    Other(Value),
}

/// One keyed entry inside a section.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: EntryValue,
}

/// The body of a named section: usually entries, occasionally something
/// else entirely, which passes through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    Entries(Vec<Entry>),
    Other(Value),
}

/// A named section of the theme document.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub body: SectionBody,
}

impl Section {
    /// Entries of this section, empty for passthrough bodies.
    pub fn entry_slice(&self) -> &[Entry] {
        match &self.body {
            SectionBody::Entries(entries) => entries,
            SectionBody::Other(_) => &[],
        }
    }

    /// Iterates entries, empty for passthrough bodies.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entry_slice().iter()
    }
}

/// In-memory theme document: metadata plus ordered sections.
///
/// The document exclusively owns its entries. The resolution engine reads
/// one document and produces a new one; it never edits in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeDocument {
    /// Top-level fields other than `Sections`, in document order.
    metadata: Mapping,
    /// How many metadata fields precede `Sections` in the source, so
    /// serialization keeps the original top-level layout.
    sections_pos: usize,
    sections: Vec<Section>,
}

impl ThemeDocument {
    /// Parses a theme document from YAML text.
    ///
    /// Fails with [`ResolveError::MissingRequiredMetadata`] before any other
    /// work if a required top-level field is absent.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let doc: Value =
            serde_yaml::from_str(text).map_err(|e| ResolveError::parse(e.to_string()))?;
        let Value::Mapping(map) = doc else {
            return Err(ResolveError::parse(
                "theme document must be a top-level mapping",
            ));
        };

        for field in REQUIRED_METADATA {
            if !map.contains_key(&Value::String(field.to_string())) {
                return Err(ResolveError::MissingRequiredMetadata {
                    field: field.to_string(),
                });
            }
        }

        let mut metadata = Mapping::new();
        let mut sections = Vec::new();
        let mut sections_pos = None;
        for (key, value) in map {
            if key.as_str() == Some("Sections") {
                sections_pos = Some(metadata.len());
                sections = parse_sections(value)?;
            } else {
                metadata.insert(key, value);
            }
        }

        Ok(ThemeDocument {
            sections_pos: sections_pos.unwrap_or(metadata.len()),
            metadata,
            sections,
        })
    }

    /// Reads and parses a theme document file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::from_yaml(&text).map_err(|e| e.with_path(path))
    }

    /// Serializes the document back to YAML, preserving order.
    pub fn to_yaml(&self) -> Result<String> {
        let mut map = Mapping::new();
        for (i, (key, value)) in self.metadata.iter().enumerate() {
            if i == self.sections_pos {
                map.insert(
                    Value::String("Sections".to_string()),
                    self.sections_value(),
                );
            }
            map.insert(key.clone(), value.clone());
        }
        if self.sections_pos >= self.metadata.len() {
            map.insert(
                Value::String("Sections".to_string()),
                self.sections_value(),
            );
        }
        serde_yaml::to_string(&map).map_err(|e| ResolveError::parse(e.to_string()))
    }

    fn sections_value(&self) -> Value {
        let mut out = Mapping::new();
        for section in &self.sections {
            let body = match &section.body {
                SectionBody::Other(value) => value.clone(),
                SectionBody::Entries(entries) => {
                    let mut m = Mapping::new();
                    for entry in entries {
                        m.insert(
                            Value::String(entry.key.clone()),
                            entry_to_value(&entry.value),
                        );
                    }
                    Value::Mapping(m)
                }
            };
            out.insert(Value::String(section.name.clone()), body);
        }
        Value::Mapping(out)
    }

    /// A top-level metadata field, if present.
    pub fn metadata(&self, field: &str) -> Option<&Value> {
        self.metadata.get(&Value::String(field.to_string()))
    }

    /// Sections in document order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub(crate) fn sections_mut(&mut self) -> &mut [Section] {
        &mut self.sections
    }

    /// Total number of parsed color-slot entries across all sections.
    pub fn slot_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| s.entries())
            .filter(|e| matches!(e.value, EntryValue::Slot(_)))
            .count()
    }
}

fn parse_sections(value: Value) -> Result<Vec<Section>> {
    let Value::Mapping(map) = value else {
        return Err(ResolveError::parse("'Sections' must be a mapping"));
    };
    let mut sections = Vec::with_capacity(map.len());
    for (key, body) in map {
        let Some(name) = key.as_str() else {
            return Err(ResolveError::parse(format!(
                "section name must be a string, got {:?}",
                key
            )));
        };
        let body = match body {
            Value::Mapping(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (entry_key, entry_value) in entries {
                    let Some(entry_key) = entry_key.as_str() else {
                        return Err(ResolveError::parse(format!(
                            "entry key in section '{}' must be a string",
                            name
                        )));
                    };
                    out.push(Entry {
                        key: entry_key.to_string(),
                        value: classify_entry(entry_value),
                    });
                }
                SectionBody::Entries(out)
            }
            other => SectionBody::Other(other),
        };
        sections.push(Section {
            name: name.to_string(),
            body,
        });
    }
    Ok(sections)
}

/// Sorts an entry value into slot / malformed / passthrough.
fn classify_entry(value: Value) -> EntryValue {
    let Value::Sequence(seq) = &value else {
        return EntryValue::Other(value);
    };
    if seq.len() != 2 {
        return EntryValue::Other(value);
    }
    match (slot_value(&seq[0]), slot_value(&seq[1])) {
        (Some(slot0), Some(slot1)) => EntryValue::Slot(ColorSlot::new(slot0, slot1)),
        _ => EntryValue::Malformed(value),
    }
}

fn slot_value(value: &Value) -> Option<ColorValue> {
    match value {
        Value::Null => Some(ColorValue::Inherit),
        Value::String(s) => ColorValue::parse(s),
        _ => None,
    }
}

fn entry_to_value(entry: &EntryValue) -> Value {
    match entry {
        EntryValue::Slot(slot) => Value::Sequence(vec![
            color_to_value(&slot.slot0),
            color_to_value(&slot.slot1),
        ]),
        EntryValue::Malformed(value) | EntryValue::Other(value) => value.clone(),
    }
}

fn color_to_value(color: &ColorValue) -> Value {
    match color {
        ColorValue::Hex(h) => Value::String(h.raw().to_string()),
        ColorValue::Flag(t) => Value::String(t.raw().to_string()),
        ColorValue::Inherit => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
Name: Honeypunk
Identity: honeypunk.dark
Version: 1.4.0
GUID: 6f1c1c3e-1111-2222-3333-444455556666
BaseGUID: 00000000-0000-0000-0000-000000000000
Sections:
  Editor:
    GUID: aaaa-bbbb
    editor.comment: [\"#111827\", \"#94A3B8\"]
    editor.selection: [\"05x00000000\", null]
    editor.broken: [\"not-a-color\", \"#94A3B8\"]
  Margins:
    margin.line-numbers: [null, \"#4B5563\"]
";

    #[test]
    fn test_parse_sections_in_order() {
        let doc = ThemeDocument::from_yaml(DOC).unwrap();
        let names: Vec<&str> = doc.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Editor", "Margins"]);
    }

    #[test]
    fn test_slot_entries_parsed() {
        let doc = ThemeDocument::from_yaml(DOC).unwrap();
        assert_eq!(doc.slot_count(), 3);
        let editor = &doc.sections()[0];
        let comment = editor
            .entries()
            .find(|e| e.key == "editor.comment")
            .unwrap();
        match &comment.value {
            EntryValue::Slot(slot) => {
                assert_eq!(slot.slot0, ColorValue::parse("#111827").unwrap());
                assert_eq!(slot.slot1, ColorValue::parse("#94A3B8").unwrap());
            }
            other => panic!("expected slot, got {:?}", other),
        }
    }

    #[test]
    fn test_guid_entry_passes_through() {
        let doc = ThemeDocument::from_yaml(DOC).unwrap();
        let editor = &doc.sections()[0];
        let guid = editor.entries().find(|e| e.key == "GUID").unwrap();
        assert!(matches!(guid.value, EntryValue::Other(_)));
    }

    #[test]
    fn test_malformed_entry_detected() {
        let doc = ThemeDocument::from_yaml(DOC).unwrap();
        let editor = &doc.sections()[0];
        let broken = editor.entries().find(|e| e.key == "editor.broken").unwrap();
        assert!(matches!(broken.value, EntryValue::Malformed(_)));
    }

    #[test]
    fn test_null_slot_is_inherit() {
        let doc = ThemeDocument::from_yaml(DOC).unwrap();
        let margins = &doc.sections()[1];
        let entry = margins.entries().next().unwrap();
        match &entry.value {
            EntryValue::Slot(slot) => assert_eq!(slot.slot0, ColorValue::Inherit),
            other => panic!("expected slot, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_metadata_is_fatal() {
        let err = ThemeDocument::from_yaml("Name: X\nSections: {}\n").unwrap_err();
        assert!(matches!(
            err,
            ResolveError::MissingRequiredMetadata { ref field } if field == "Identity"
        ));
    }

    #[test]
    fn test_metadata_passthrough() {
        let doc = ThemeDocument::from_yaml(DOC).unwrap();
        assert_eq!(
            doc.metadata("Name").and_then(Value::as_str),
            Some("Honeypunk")
        );
        assert_eq!(
            doc.metadata("Version").and_then(Value::as_str),
            Some("1.4.0")
        );
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let doc = ThemeDocument::from_yaml(DOC).unwrap();
        let yaml = doc.to_yaml().unwrap();
        let again = ThemeDocument::from_yaml(&yaml).unwrap();
        assert_eq!(doc, again);
    }

    #[test]
    fn test_round_trip_keeps_sections_position() {
        let doc = ThemeDocument::from_yaml(
            "Name: X\nIdentity: i\nSections: {}\nVersion: 1\nGUID: g\nBaseGUID: b\n",
        )
        .unwrap();
        let yaml = doc.to_yaml().unwrap();
        let sections_line = yaml.lines().position(|l| l.starts_with("Sections:"));
        let version_line = yaml.lines().position(|l| l.starts_with("Version:"));
        assert!(sections_line.unwrap() < version_line.unwrap());
    }

    #[test]
    fn test_non_mapping_section_passes_through() {
        let doc = ThemeDocument::from_yaml(
            "Name: X\nIdentity: i\nVersion: 1\nGUID: g\nBaseGUID: b\nSections:\n  Odd: plain\n",
        )
        .unwrap();
        assert!(matches!(
            doc.sections()[0].body,
            SectionBody::Other(Value::String(_))
        ));
    }

    #[test]
    fn test_missing_sections_key_means_empty() {
        let doc = ThemeDocument::from_yaml(
            "Name: X\nIdentity: i\nVersion: 1\nGUID: g\nBaseGUID: b\n",
        )
        .unwrap();
        assert!(doc.sections().is_empty());
        // Serialization appends an empty Sections mapping at the end.
        assert!(doc.to_yaml().unwrap().contains("Sections"));
    }

    #[test]
    fn test_version_metadata_may_be_non_string() {
        let doc = ThemeDocument::from_yaml(
            "Name: X\nIdentity: i\nVersion: 2\nGUID: g\nBaseGUID: b\nSections: {}\n",
        )
        .unwrap();
        assert_eq!(doc.metadata("Version").and_then(Value::as_u64), Some(2));
    }
}
