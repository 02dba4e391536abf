//! # themec-resolve — semantic palette resolution for theme documents
//!
//! `themec-resolve` is the resolution engine behind the `themec` theme
//! compiler. It maps semantic roles ("comments", "functions") onto concrete
//! color slots across the classification keys of an editor theme document,
//! preserving flag-coded slot values and producing an auditable change
//! report.
//!
//! ## Core Concepts
//!
//! - [`Palette`]: ordered `name → hex` color store, loaded from a markdown
//!   palette table
//! - [`RoleTable`]: semantic role → foreground/background palette names
//! - [`ClassificationIndex`]: reverse `key → role` lookup built from the
//!   grouping definition, validated at construction
//! - [`ThemeDocument`]: the theme file as ordered sections of two-slot
//!   color entries, metadata passed through untouched
//! - [`Resolver`]: one [`run`](Resolver::run) resolves a document in
//!   [`Mode::Semantic`] or [`Mode::Normalize`], dry-run capable, and yields
//!   a [`Resolution`] (new document + [`Report`])
//!
//! ## Quick Start
//!
//! ```rust
//! use themec_resolve::{
//!     ClassificationIndex, Mode, Palette, Resolver, RoleTable, ThemeDocument,
//! };
//!
//! let palette = Palette::from_markdown(
//!     "| Deep Space    | #0A0E12 | background |\n\
//!      | Electric Blue | #00D1FF | comments   |",
//! )?;
//! let roles = RoleTable::from_yaml("comments: {fg: Electric Blue, bg: Deep Space}")?;
//! let index = ClassificationIndex::from_yaml("comments: [editor.comment]", &roles)?;
//!
//! let document = ThemeDocument::from_yaml(r##"
//! Name: Demo
//! Identity: demo.dark
//! Version: 1
//! GUID: 1111
//! BaseGUID: 0000
//! Sections:
//!   Editor:
//!     editor.comment: ["#111827", "#94A3B8"]
//! "##)?;
//!
//! let resolution = Resolver::new(&palette, &roles, &index)
//!     .run(&document, Mode::Semantic, false)?;
//!
//! assert_eq!(resolution.report.changes.len(), 1);
//! println!("{}", resolution.document.to_yaml()?);
//! # Ok::<(), themec_resolve::ResolveError>(())
//! ```
//!
//! ## Guarantees
//!
//! - Flag-coded slot values (`05x00000000` and friends) are never rewritten,
//!   in any mode, per slot.
//! - Fatal errors abort the whole run before anything is rewritten; the
//!   engine resolves into a fresh document and never edits the input.
//! - Reports are deterministic: document traversal order for changes,
//!   palette definition order for unused colors.

mod color;
mod document;
mod engine;
mod error;
mod index;
mod palette;
mod report;
mod role;

pub use color::{ColorSlot, ColorValue, FlagToken, HexColor};
pub use document::{
    Entry, EntryValue, Section, SectionBody, ThemeDocument, REQUIRED_METADATA,
};
pub use engine::{Mode, Resolution, Resolver};
pub use error::{ResolveError, Result};
pub use index::{ClassificationIndex, KeyMatch};
pub use palette::{Palette, PaletteEntry};
pub use report::{ChangeRecord, MalformedWarning, OverlapWarning, Report};
pub use role::{BackgroundSpec, Role, RoleTable};
