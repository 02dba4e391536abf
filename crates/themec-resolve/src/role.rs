//! Role table: semantic role → palette color assignment.
//!
//! The role definition is a YAML mapping. Each role is either a bare string
//! (foreground color name, shorthand) or a mapping:
//!
//! ```yaml
//! comments:
//!   fg: Electric Blue
//!   bg: Deep Space
//! functions: Solar Gold          # shorthand: foreground only
//! strings:
//!   foreground: Moss Green
//!   background: inherit          # explicit "do not touch background"
//! ```
//!
//! `foreground`/`fg` and `background`/`bg` are interchangeable. A malformed
//! role spec is a parse error naming the role, not a skipped entry.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{ResolveError, Result};

/// The background assignment of a role.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackgroundSpec {
    /// No background given; the slot is left alone.
    #[default]
    Unset,
    /// Explicit `inherit` sentinel; same effect as [`Unset`](Self::Unset),
    /// stated deliberately in the definition.
    Inherit,
    /// A palette color name to apply.
    Named(String),
}

impl BackgroundSpec {
    /// The palette color name, if one is assigned.
    pub fn name(&self) -> Option<&str> {
        match self {
            BackgroundSpec::Named(name) => Some(name),
            _ => None,
        }
    }
}

/// One semantic role and its color assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    /// Palette color name for the foreground slot.
    pub foreground: String,
    pub background: BackgroundSpec,
}

/// Immutable, ordered table of roles. Loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    roles: Vec<Role>,
    by_name: HashMap<String, usize>,
}

impl RoleTable {
    /// Parses a role table from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let doc: serde_yaml::Value = serde_yaml::from_str(text)
            .map_err(|e| ResolveError::parse(e.to_string()))?;
        let serde_yaml::Value::Mapping(map) = doc else {
            return Err(ResolveError::parse(
                "role definition must be a top-level mapping",
            ));
        };

        let mut table = RoleTable::default();
        for (key, spec) in &map {
            let Some(name) = key.as_str() else {
                return Err(ResolveError::parse(format!(
                    "role name must be a string, got {:?}",
                    key
                )));
            };
            let role = parse_role(name, spec)?;
            table.insert(role)?;
        }
        Ok(table)
    }

    /// Reads and parses a role definition file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::from_yaml(&text).map_err(|e| e.with_path(path))
    }

    fn insert(&mut self, role: Role) -> Result<()> {
        if self.by_name.contains_key(&role.name) {
            return Err(ResolveError::parse(format!(
                "role '{}' is defined more than once",
                role.name
            )));
        }
        self.by_name.insert(role.name.clone(), self.roles.len());
        self.roles.push(role);
        Ok(())
    }

    /// Looks up a role by name.
    pub fn get(&self, name: &str) -> Option<&Role> {
        self.by_name.get(name).map(|&i| &self.roles[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Iterates roles in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

fn parse_role(name: &str, spec: &serde_yaml::Value) -> Result<Role> {
    match spec {
        // Shorthand: bare string is the foreground color name.
        serde_yaml::Value::String(fg) => Ok(Role {
            name: name.to_string(),
            foreground: fg.clone(),
            background: BackgroundSpec::Unset,
        }),
        serde_yaml::Value::Mapping(map) => {
            let mut foreground = None;
            let mut background = BackgroundSpec::Unset;
            for (k, v) in map {
                let Some(field) = k.as_str() else {
                    return Err(ResolveError::parse(format!(
                        "role '{}' has a non-string field name",
                        name
                    )));
                };
                match field {
                    "foreground" | "fg" => {
                        foreground = Some(value_as_string(name, field, v)?);
                    }
                    "background" | "bg" => {
                        background = match v {
                            serde_yaml::Value::Null => BackgroundSpec::Unset,
                            _ => {
                                let s = value_as_string(name, field, v)?;
                                if s == "inherit" {
                                    BackgroundSpec::Inherit
                                } else {
                                    BackgroundSpec::Named(s)
                                }
                            }
                        };
                    }
                    other => {
                        return Err(ResolveError::parse(format!(
                            "role '{}' has unknown field '{}'",
                            name, other
                        )));
                    }
                }
            }
            let foreground = foreground.ok_or_else(|| {
                ResolveError::parse(format!("role '{}' has no foreground color", name))
            })?;
            Ok(Role {
                name: name.to_string(),
                foreground,
                background,
            })
        }
        other => Err(ResolveError::parse(format!(
            "role '{}' must be a color name or a mapping, got {:?}",
            name, other
        ))),
    }
}

fn value_as_string(role: &str, field: &str, value: &serde_yaml::Value) -> Result<String> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        ResolveError::parse(format!(
            "role '{}' field '{}' must be a string",
            role, field
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand_role() {
        let table = RoleTable::from_yaml("functions: Solar Gold\n").unwrap();
        let role = table.get("functions").unwrap();
        assert_eq!(role.foreground, "Solar Gold");
        assert_eq!(role.background, BackgroundSpec::Unset);
    }

    #[test]
    fn test_full_role() {
        let table = RoleTable::from_yaml(
            "comments:\n  fg: Electric Blue\n  bg: Deep Space\n",
        )
        .unwrap();
        let role = table.get("comments").unwrap();
        assert_eq!(role.foreground, "Electric Blue");
        assert_eq!(role.background, BackgroundSpec::Named("Deep Space".into()));
    }

    #[test]
    fn test_long_field_names() {
        let table = RoleTable::from_yaml(
            "strings:\n  foreground: Moss Green\n  background: inherit\n",
        )
        .unwrap();
        let role = table.get("strings").unwrap();
        assert_eq!(role.foreground, "Moss Green");
        assert_eq!(role.background, BackgroundSpec::Inherit);
    }

    #[test]
    fn test_inherit_sentinel_has_no_name() {
        assert_eq!(BackgroundSpec::Inherit.name(), None);
        assert_eq!(BackgroundSpec::Unset.name(), None);
        assert_eq!(
            BackgroundSpec::Named("Deep Space".into()).name(),
            Some("Deep Space")
        );
    }

    #[test]
    fn test_missing_foreground_is_error() {
        let err = RoleTable::from_yaml("comments:\n  bg: Deep Space\n").unwrap_err();
        assert!(err.to_string().contains("comments"));
        assert!(err.to_string().contains("foreground"));
    }

    #[test]
    fn test_unknown_field_is_error() {
        let err = RoleTable::from_yaml("comments:\n  fg: X\n  shade: Y\n").unwrap_err();
        assert!(err.to_string().contains("shade"));
    }

    #[test]
    fn test_non_mapping_spec_is_error() {
        let err = RoleTable::from_yaml("comments: [a, b]\n").unwrap_err();
        assert!(err.to_string().contains("comments"));
    }

    #[test]
    fn test_duplicate_role_is_error() {
        // YAML itself may or may not reject duplicate keys; defining the same
        // role twice through the API must.
        let mut table = RoleTable::default();
        let role = Role {
            name: "comments".into(),
            foreground: "X".into(),
            background: BackgroundSpec::Unset,
        };
        table.insert(role.clone()).unwrap();
        assert!(table.insert(role).is_err());
    }

    #[test]
    fn test_definition_order() {
        let table = RoleTable::from_yaml("b: X\na: Y\n").unwrap();
        let names: Vec<&str> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
