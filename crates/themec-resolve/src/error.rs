//! Error types for theme resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading definitions or resolving a theme.
///
/// Every variant is fatal: a failed load aborts before indexing, and a failed
/// resolution aborts the whole run with no partial mutation. Malformed color
/// values in individual entries are *not* errors — they are recovered locally
/// and surface as warnings in the [`Report`](crate::Report).
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A classification key is listed under more than one role.
    #[error("classification key '{key}' is assigned to both role '{first}' and role '{second}'")]
    DuplicateKeyAssignment {
        key: String,
        first: String,
        second: String,
    },

    /// A grouping references a role absent from the role table.
    #[error("grouping references unknown role '{role}'")]
    UnknownRoleReference { role: String },

    /// A role or normalize rewrite references a palette color that does not exist.
    #[error("{referenced_by} references unknown palette color '{name}'")]
    UnknownPaletteColor { name: String, referenced_by: String },

    /// The same color name appears twice in the palette definition.
    #[error("palette defines color '{name}' more than once")]
    DuplicatePaletteName { name: String },

    /// The theme document lacks a required top-level metadata field.
    #[error("theme document is missing required metadata field '{field}'")]
    MissingRequiredMetadata { field: String },

    /// A definition file could not be parsed.
    #[error("failed to parse {}: {message}", path_or_input(.path))]
    Parse {
        path: Option<PathBuf>,
        message: String,
    },

    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolveError {
    /// Builds a [`ResolveError::Parse`] with no source path.
    pub fn parse(message: impl Into<String>) -> Self {
        ResolveError::Parse {
            path: None,
            message: message.into(),
        }
    }

    /// Attaches a source path to a [`ResolveError::Parse`], leaving other
    /// variants untouched.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            ResolveError::Parse { message, .. } => ResolveError::Parse {
                path: Some(path.into()),
                message,
            },
            other => other,
        }
    }
}

fn path_or_input(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "input".to_string(),
    }
}

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_display() {
        let err = ResolveError::DuplicateKeyAssignment {
            key: "editor.keyword".to_string(),
            first: "functions".to_string(),
            second: "control_keywords".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("editor.keyword"));
        assert!(msg.contains("functions"));
        assert!(msg.contains("control_keywords"));
    }

    #[test]
    fn test_parse_error_with_path() {
        let err = ResolveError::parse("bad yaml").with_path("tools/roles.yaml");
        let msg = err.to_string();
        assert!(msg.contains("tools/roles.yaml"));
        assert!(msg.contains("bad yaml"));
    }

    #[test]
    fn test_parse_error_without_path() {
        let err = ResolveError::parse("bad yaml");
        assert!(err.to_string().contains("input"));
    }
}
