//! Resolution engine: applies palette and role assignments to a theme
//! document and produces the change report.
//!
//! The engine is handed immutable configuration (palette, role table,
//! classification index) at construction and never mutates it. A run reads
//! one document and resolves into a *new* document; nothing is written in
//! place, so a failure partway through (say, an unknown palette color) can
//! never leave a half-updated theme behind.
//!
//! # Modes
//!
//! - [`Mode::Semantic`] re-resolves every classified entry from its role:
//!   foreground from the role's foreground color, background from the role's
//!   background color if one is assigned.
//! - [`Mode::Normalize`] ignores the classification index entirely and
//!   performs a value-identity rewrite: slots whose hex matches a color in
//!   the previous palette snapshot are refreshed to that color's current
//!   hex. Without a snapshot it refreshes every hex slot to canonical form.
//!
//! In both modes, flag-coded slot values are never touched. The checks are
//! per slot: a flag in the background slot protects only the background
//! slot, and symmetrically for the foreground.
//!
//! # Example
//!
//! ```rust
//! use themec_resolve::{
//!     ClassificationIndex, Mode, Palette, Resolver, RoleTable, ThemeDocument,
//! };
//!
//! let palette = Palette::from_entries([
//!     ("Deep Space", "#0A0E12"),
//!     ("Electric Blue", "#00D1FF"),
//! ]).unwrap();
//! let roles = RoleTable::from_yaml("comments: {fg: Electric Blue, bg: Deep Space}").unwrap();
//! let index = ClassificationIndex::from_yaml("comments: [editor.comment]", &roles).unwrap();
//! let document = ThemeDocument::from_yaml(r##"
//! Name: Demo
//! Identity: demo
//! Version: 1
//! GUID: g
//! BaseGUID: b
//! Sections:
//!   Editor:
//!     editor.comment: ["#111827", "#94A3B8"]
//! "##).unwrap();
//!
//! let resolver = Resolver::new(&palette, &roles, &index);
//! let resolution = resolver.run(&document, Mode::Semantic, false).unwrap();
//! assert_eq!(resolution.report.changes.len(), 1);
//! ```

use std::collections::{HashMap, HashSet};

use crate::color::{ColorSlot, ColorValue, HexColor};
use crate::document::{Entry, EntryValue, SectionBody, ThemeDocument};
use crate::error::{ResolveError, Result};
use crate::index::ClassificationIndex;
use crate::palette::Palette;
use crate::report::{ChangeRecord, MalformedWarning, OverlapWarning, Report};
use crate::role::RoleTable;

/// Operating mode of a resolution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Refresh hex values without changing role assignments.
    Normalize,
    /// Fully re-resolve every classified entry from its role.
    Semantic,
}

/// Output of one run: the resolved document and its audit report.
///
/// With dry-run enabled the document is the input, unchanged; the report is
/// identical to what a real run would have applied.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub document: ThemeDocument,
    pub report: Report,
}

/// Per-role colors resolved against the palette up front, so an unknown
/// palette name aborts before any entry is rewritten.
struct RoleColors {
    foreground: HexColor,
    background: Option<HexColor>,
}

/// The resolution engine. Borrows its configuration; owns nothing mutable.
pub struct Resolver<'a> {
    palette: &'a Palette,
    roles: &'a RoleTable,
    index: &'a ClassificationIndex,
    previous_palette: Option<&'a Palette>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        palette: &'a Palette,
        roles: &'a RoleTable,
        index: &'a ClassificationIndex,
    ) -> Self {
        Resolver {
            palette,
            roles,
            index,
            previous_palette: None,
        }
    }

    /// Supplies the palette snapshot from before a hex edit. Normalize mode
    /// uses it to rewrite stale hex values to their color's current hex.
    pub fn with_previous_palette(mut self, previous: &'a Palette) -> Self {
        self.previous_palette = Some(previous);
        self
    }

    /// Runs one resolution pass over the document.
    ///
    /// Fatal errors ([`ResolveError::UnknownPaletteColor`]) abort the whole
    /// run; the caller sees no partially resolved document. Malformed
    /// entries are skipped and reported, never fatal.
    pub fn run(&self, document: &ThemeDocument, mode: Mode, dry_run: bool) -> Result<Resolution> {
        let mut resolved = document.clone();
        let mut report = Report::default();

        match mode {
            Mode::Semantic => self.run_semantic(&mut resolved, &mut report)?,
            Mode::Normalize => self.run_normalize(&mut resolved, &mut report)?,
        }

        report.unused_palette_colors = self.unused_palette_colors(&resolved);

        Ok(Resolution {
            document: if dry_run { document.clone() } else { resolved },
            report,
        })
    }

    fn run_semantic(&self, resolved: &mut ThemeDocument, report: &mut Report) -> Result<()> {
        let role_colors = self.resolve_role_colors()?;
        let mut overlap_seen: HashSet<String> = HashSet::new();

        for_each_entry(resolved, |section, entry| {
            let slot = match &entry.value {
                EntryValue::Slot(slot) => slot.clone(),
                EntryValue::Malformed(value) => {
                    report.malformed.push(malformed_warning(section, entry, value));
                    return Ok(());
                }
                EntryValue::Other(_) => return Ok(()),
            };
            let Some(key_match) = self.index.lookup(&entry.key) else {
                return Ok(());
            };
            if key_match.is_overlap() && overlap_seen.insert(entry.key.to_lowercase()) {
                report.overlap_warnings.push(OverlapWarning {
                    key: entry.key.clone(),
                    roles: key_match.prefix_roles.iter().map(|r| r.to_string()).collect(),
                });
            }

            // Index construction validated every grouping role, so the
            // colors are always present; the lookup stays fallible to keep
            // the invariant local.
            let Some(colors) = role_colors.get(key_match.role) else {
                return Err(ResolveError::UnknownRoleReference {
                    role: key_match.role.to_string(),
                });
            };

            let mut new_slot = slot.clone();
            // Flags always win, independently per slot.
            if !slot.slot1.is_flag() {
                new_slot.slot1 = ColorValue::Hex(colors.foreground.clone());
            }
            if let Some(bg) = &colors.background {
                if !slot.slot0.is_flag() {
                    new_slot.slot0 = ColorValue::Hex(bg.clone());
                }
            }

            if new_slot != slot {
                record_change(report, section, entry, &slot, new_slot.clone());
                entry.value = EntryValue::Slot(new_slot);
            }
            Ok(())
        })
    }

    fn run_normalize(&self, resolved: &mut ThemeDocument, report: &mut Report) -> Result<()> {
        // Rewrite map from the previous palette snapshot: old hex → name.
        let rewrites: Option<HashMap<String, &str>> = self.previous_palette.map(|prev| {
            prev.iter()
                .map(|e| (e.hex.canonical(), e.name.as_str()))
                .collect()
        });

        for_each_entry(resolved, |section, entry| {
            let slot = match &entry.value {
                EntryValue::Slot(slot) => slot.clone(),
                EntryValue::Malformed(value) => {
                    report.malformed.push(malformed_warning(section, entry, value));
                    return Ok(());
                }
                EntryValue::Other(_) => return Ok(()),
            };

            let mut new_slot = slot.clone();
            for value in [&mut new_slot.slot0, &mut new_slot.slot1] {
                let Some(hex) = value.as_hex() else {
                    continue; // flags and nulls are never touched
                };
                let replacement = match &rewrites {
                    Some(map) => match map.get(&hex.canonical()) {
                        Some(&name) => self
                            .palette
                            .get(name)
                            .ok_or_else(|| ResolveError::UnknownPaletteColor {
                                name: name.to_string(),
                                referenced_by: "previous palette snapshot".to_string(),
                            })?
                            .clone(),
                        None => continue,
                    },
                    // No snapshot: plain formatting refresh to canonical.
                    None => match HexColor::parse(&hex.canonical()) {
                        Some(canonical) => canonical,
                        None => continue,
                    },
                };
                if hex.raw() != replacement.raw() {
                    *value = ColorValue::Hex(replacement);
                }
            }

            // Normalize compares raw text: refreshing "#0a0e12" to
            // "#0A0E12" is a change even though the values are color-equal.
            if !slot_raw_eq(&new_slot, &slot) {
                record_change(report, section, entry, &slot, new_slot.clone());
                entry.value = EntryValue::Slot(new_slot);
            }
            Ok(())
        })
    }

    /// Resolves every role's palette names, failing fast on the first
    /// unknown color so no entry gets rewritten.
    fn resolve_role_colors(&self) -> Result<HashMap<String, RoleColors>> {
        let mut colors = HashMap::with_capacity(self.roles.len());
        for role in self.roles.iter() {
            let foreground = self
                .palette
                .get(&role.foreground)
                .ok_or_else(|| ResolveError::UnknownPaletteColor {
                    name: role.foreground.clone(),
                    referenced_by: format!("role '{}'", role.name),
                })?
                .clone();
            let background = match role.background.name() {
                Some(name) => Some(
                    self.palette
                        .get(name)
                        .ok_or_else(|| ResolveError::UnknownPaletteColor {
                            name: name.to_string(),
                            referenced_by: format!("role '{}'", role.name),
                        })?
                        .clone(),
                ),
                None => None,
            };
            colors.insert(
                role.name.clone(),
                RoleColors {
                    foreground,
                    background,
                },
            );
        }
        Ok(colors)
    }

    /// Palette names whose hex occurs in no slot of the resolved document.
    fn unused_palette_colors(&self, document: &ThemeDocument) -> Vec<String> {
        let mut used: HashSet<String> = HashSet::new();
        for section in document.sections() {
            for entry in section.entries() {
                if let EntryValue::Slot(slot) = &entry.value {
                    for value in [&slot.slot0, &slot.slot1] {
                        if let Some(hex) = value.as_hex() {
                            used.insert(hex.canonical());
                        }
                    }
                }
            }
        }
        self.palette
            .iter()
            .filter(|e| !used.contains(&e.hex.canonical()))
            .map(|e| e.name.clone())
            .collect()
    }
}

/// Walks every entry of every section in document order.
fn for_each_entry<F>(document: &mut ThemeDocument, mut f: F) -> Result<()>
where
    F: FnMut(&str, &mut Entry) -> Result<()>,
{
    for section in document.sections_mut() {
        let name = section.name.clone();
        if let SectionBody::Entries(entries) = &mut section.body {
            for entry in entries {
                f(&name, entry)?;
            }
        }
    }
    Ok(())
}

fn record_change(
    report: &mut Report,
    section: &str,
    entry: &Entry,
    previous: &ColorSlot,
    new: ColorSlot,
) {
    let touched_background = !raw_eq(&previous.slot0, &new.slot0);
    let touched_foreground = !raw_eq(&previous.slot1, &new.slot1);
    report.changes.push(ChangeRecord {
        section: section.to_string(),
        key: entry.key.clone(),
        previous: previous.clone(),
        new,
        touched_foreground,
        touched_background,
    });
}

fn malformed_warning(section: &str, entry: &Entry, value: &serde_yaml::Value) -> MalformedWarning {
    MalformedWarning {
        section: section.to_string(),
        key: entry.key.clone(),
        value: serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Raw-text equality: distinguishes `#0a0e12` from `#0A0E12`, which
/// value-level [`PartialEq`] deliberately does not.
fn raw_eq(a: &ColorValue, b: &ColorValue) -> bool {
    match (a, b) {
        (ColorValue::Hex(x), ColorValue::Hex(y)) => x.raw() == y.raw(),
        _ => a == b,
    }
}

fn slot_raw_eq(a: &ColorSlot, b: &ColorSlot) -> bool {
    raw_eq(&a.slot0, &b.slot0) && raw_eq(&a.slot1, &b.slot1)
}
