//! Change report produced by a resolution run.
//!
//! Everything here is `Serialize` so the CLI can emit the report as JSON in
//! addition to styled text.

use serde::Serialize;

use crate::color::ColorSlot;

/// One modified entry: where, what it was, what it became.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    pub section: String,
    pub key: String,
    pub previous: ColorSlot,
    pub new: ColorSlot,
    /// Whether the foreground slot (slot1) was rewritten.
    pub touched_foreground: bool,
    /// Whether the background slot (slot0) was rewritten.
    pub touched_background: bool,
}

/// A classification key claimed by prefix rules of two or more roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapWarning {
    pub key: String,
    /// The claiming roles, in rule-definition order. The first-resolved
    /// (longest-prefix) role is the one that won.
    pub roles: Vec<String>,
}

/// An entry whose value is neither hex, a flag token, nor null. The entry
/// was preserved verbatim and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedWarning {
    pub section: String,
    pub key: String,
    /// The offending value, rendered as YAML.
    pub value: String,
}

/// Full audit output of one resolution run.
///
/// `changes` follows document traversal order (section order, then key
/// order), so identical inputs always produce an identical report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub changes: Vec<ChangeRecord>,
    /// Palette names whose hex appears in no resolved slot, in palette
    /// definition order.
    pub unused_palette_colors: Vec<String>,
    pub overlap_warnings: Vec<OverlapWarning>,
    pub malformed: Vec<MalformedWarning>,
}

impl Report {
    /// Whether the run changed anything.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Whether the run produced warnings of any kind.
    pub fn has_warnings(&self) -> bool {
        !self.overlap_warnings.is_empty() || !self.malformed.is_empty()
    }
}
