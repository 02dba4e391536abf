//! Classification index: reverse `key → role` lookup.
//!
//! Built from the grouping definition, a YAML mapping of role name to the
//! classification keys it governs:
//!
//! ```yaml
//! comments:
//!   - editor.comment
//!   - editor.comment.*      # prefix rule: the whole comment family
//! functions:
//!   - editor.function
//! ```
//!
//! Keys match case-insensitively. A key ending in `*` is a prefix rule.
//! Construction validates structure up front: the same key (or the same
//! prefix pattern) listed under two roles is a fatal configuration error,
//! and every grouping role must exist in the role table. Prefix rules of
//! different roles may overlap on concrete keys; that is reported as a
//! warning at lookup, not an error.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{ResolveError, Result};
use crate::role::RoleTable;

#[derive(Debug, Clone)]
struct PrefixRule {
    /// Lowercased prefix, e.g. `editor.comment.`.
    prefix: String,
    role: String,
}

/// Result of looking up one classification key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMatch<'a> {
    /// The governing role: exact assignment if present, otherwise the
    /// longest matching prefix rule.
    pub role: &'a str,
    /// All distinct roles whose prefix rules match this key, in rule order.
    /// More than one entry means the grouping is ambiguous for this key.
    pub prefix_roles: Vec<&'a str>,
}

impl KeyMatch<'_> {
    /// Whether two or more roles claim this key through prefix rules.
    pub fn is_overlap(&self) -> bool {
        self.prefix_roles.len() > 1
    }
}

/// Reverse index from classification key to governing role.
///
/// Pure data built once per run; lookup never mutates.
#[derive(Debug, Clone, Default)]
pub struct ClassificationIndex {
    /// Lowercased exact key → role name.
    exact: HashMap<String, String>,
    /// Prefix rules in definition order.
    prefixes: Vec<PrefixRule>,
}

impl ClassificationIndex {
    /// Parses a grouping definition and builds the index, validating every
    /// referenced role against the role table.
    pub fn from_yaml(text: &str, roles: &RoleTable) -> Result<Self> {
        let doc: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| ResolveError::parse(e.to_string()))?;
        let serde_yaml::Value::Mapping(map) = doc else {
            return Err(ResolveError::parse(
                "grouping definition must be a top-level mapping",
            ));
        };

        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for (key, value) in &map {
            let Some(role) = key.as_str() else {
                return Err(ResolveError::parse(format!(
                    "grouping role name must be a string, got {:?}",
                    key
                )));
            };
            let serde_yaml::Value::Sequence(seq) = value else {
                return Err(ResolveError::parse(format!(
                    "grouping for role '{}' must be a list of keys",
                    role
                )));
            };
            let mut keys = Vec::with_capacity(seq.len());
            for item in seq {
                let Some(k) = item.as_str() else {
                    return Err(ResolveError::parse(format!(
                        "grouping for role '{}' contains a non-string key",
                        role
                    )));
                };
                keys.push(k.to_string());
            }
            groups.push((role.to_string(), keys));
        }
        Self::from_groups(groups, roles)
    }

    /// Reads and parses a grouping definition file.
    pub fn from_path(path: impl AsRef<Path>, roles: &RoleTable) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::from_yaml(&text, roles).map_err(|e| e.with_path(path))
    }

    /// Builds the index from `(role, keys)` groups.
    pub fn from_groups<I, R, K>(groups: I, roles: &RoleTable) -> Result<Self>
    where
        I: IntoIterator<Item = (R, Vec<K>)>,
        R: Into<String>,
        K: Into<String>,
    {
        let mut index = ClassificationIndex::default();
        let mut patterns: HashMap<String, String> = HashMap::new();

        for (role, keys) in groups {
            let role = role.into();
            if !roles.contains(&role) {
                return Err(ResolveError::UnknownRoleReference { role });
            }
            for key in keys {
                let key = key.into();
                let lower = key.to_lowercase();

                // The same spelled-out key or pattern under two roles is a
                // configuration error, never last-write-wins.
                if let Some(first) = patterns.get(&lower) {
                    if first != &role {
                        return Err(ResolveError::DuplicateKeyAssignment {
                            key,
                            first: first.clone(),
                            second: role,
                        });
                    }
                    continue;
                }
                patterns.insert(lower.clone(), role.clone());

                if let Some(prefix) = lower.strip_suffix('*') {
                    index.prefixes.push(PrefixRule {
                        prefix: prefix.to_string(),
                        role: role.clone(),
                    });
                } else {
                    index.exact.insert(lower, role.clone());
                }
            }
        }
        Ok(index)
    }

    /// Resolves a classification key to its governing role.
    ///
    /// Exact assignments win over prefix rules; among matching prefix rules
    /// the longest prefix wins, ties broken by definition order.
    pub fn lookup(&self, key: &str) -> Option<KeyMatch<'_>> {
        let lower = key.to_lowercase();
        if let Some(role) = self.exact.get(&lower) {
            return Some(KeyMatch {
                role,
                prefix_roles: Vec::new(),
            });
        }

        let mut winner: Option<&PrefixRule> = None;
        let mut prefix_roles: Vec<&str> = Vec::new();
        for rule in &self.prefixes {
            if !lower.starts_with(&rule.prefix) {
                continue;
            }
            if !prefix_roles.contains(&rule.role.as_str()) {
                prefix_roles.push(&rule.role);
            }
            match winner {
                Some(best) if best.prefix.len() >= rule.prefix.len() => {}
                _ => winner = Some(rule),
            }
        }
        winner.map(|rule| KeyMatch {
            role: &rule.role,
            prefix_roles,
        })
    }

    /// Number of exact key assignments.
    pub fn exact_len(&self) -> usize {
        self.exact.len()
    }

    /// Number of prefix rules.
    pub fn prefix_len(&self) -> usize {
        self.prefixes.len()
    }
}
