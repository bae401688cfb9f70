// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Label selector parsing and matching.
//!
//! Nodegate decides whether a daemon is expected on a node by matching a
//! label selector against the node's labels. Selectors come from two places:
//!
//! - the `nodeSelector` list in the config file, written as Kubernetes
//!   selector expressions (`role=worker`, `zone in (a,b)`, `!gpu`, ...)
//! - a daemonset pod template's `nodeSelector` map, converted into a set of
//!   equality requirements
//!
//! A [`Selector`] is a conjunction of requirements; the empty selector
//! matches every node.

use crate::errors::Error;
use std::collections::BTreeMap;

/// Operator of a single selector requirement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operator {
    /// `key = value` / `key == value`
    Equals,
    /// `key != value`; also satisfied when the key is absent
    NotEquals,
    /// `key in (v1, v2)`
    In,
    /// `key notin (v1, v2)`; also satisfied when the key is absent
    NotIn,
    /// `key` - the key must be present, any value
    Exists,
    /// `!key` - the key must be absent
    DoesNotExist,
}

/// One `key <op> values` requirement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requirement {
    key: String,
    operator: Operator,
    values: Vec<String>,
}

impl Requirement {
    /// Check this requirement against a label map.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let value = labels.get(&self.key);
        match self.operator {
            Operator::Equals | Operator::In => {
                value.is_some_and(|v| self.values.iter().any(|want| want == v))
            }
            // Absent keys satisfy negative requirements
            Operator::NotEquals | Operator::NotIn => {
                value.is_none_or(|v| !self.values.iter().any(|want| want == v))
            }
            Operator::Exists => value.is_some(),
            Operator::DoesNotExist => value.is_none(),
        }
    }
}

/// A conjunction of [`Requirement`]s. Empty selectors match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    requirements: Vec<Requirement>,
}

impl Selector {
    /// The selector that matches every label set.
    #[must_use]
    pub fn everything() -> Self {
        Selector::default()
    }

    /// Parse a selector expression string.
    ///
    /// Supports the standard Kubernetes syntax: `=`, `==`, `!=`, `in`,
    /// `notin`, bare-key existence, `!key` non-existence, and comma-joined
    /// conjunctions within one string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for empty keys, unbalanced parentheses or
    /// set operators without a value list.
    pub fn parse(expr: &str) -> Result<Self, Error> {
        let mut requirements = Vec::new();
        for part in split_requirements(expr)? {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            requirements.push(parse_requirement(part)?);
        }
        Ok(Selector { requirements })
    }

    /// Build an equality selector from a pod template's `nodeSelector` map.
    #[must_use]
    pub fn from_node_selector(node_selector: &BTreeMap<String, String>) -> Self {
        let requirements = node_selector
            .iter()
            .map(|(key, value)| Requirement {
                key: key.clone(),
                operator: Operator::Equals,
                values: vec![value.clone()],
            })
            .collect();
        Selector { requirements }
    }

    /// Merge another selector's requirements into this one (conjunction).
    #[must_use]
    pub fn and(mut self, other: Selector) -> Self {
        self.requirements.extend(other.requirements);
        self
    }

    /// True when every requirement matches the given labels.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|req| req.matches(labels))
    }

    /// Number of requirements carried by this selector.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    /// True when this selector matches everything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

/// Split a selector expression on top-level commas, leaving the value lists
/// of `in`/`notin` requirements intact.
fn split_requirements(expr: &str) -> Result<Vec<String>, Error> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0u32;
    for ch in expr.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::Config(format!("unbalanced ')' in selector {expr:?}")))?;
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    if depth != 0 {
        return Err(Error::Config(format!("unbalanced '(' in selector {expr:?}")));
    }
    parts.push(current);
    Ok(parts)
}

fn parse_requirement(part: &str) -> Result<Requirement, Error> {
    // Order matters: `!=` before `=`, `notin` before `in`
    if let Some((key, value)) = part.split_once("!=") {
        return equality(key, value, Operator::NotEquals, part);
    }
    if let Some((key, value)) = part.split_once("==") {
        return equality(key, value, Operator::Equals, part);
    }
    if let Some((key, rest)) = split_set_operator(part, " notin ") {
        return set_requirement(key, rest, Operator::NotIn, part);
    }
    if let Some((key, rest)) = split_set_operator(part, " in ") {
        return set_requirement(key, rest, Operator::In, part);
    }
    if let Some((key, value)) = part.split_once('=') {
        return equality(key, value, Operator::Equals, part);
    }
    if let Some(key) = part.strip_prefix('!') {
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::Config(format!("empty key in selector {part:?}")));
        }
        return Ok(Requirement {
            key: key.to_string(),
            operator: Operator::DoesNotExist,
            values: Vec::new(),
        });
    }
    let key = part.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return Err(Error::Config(format!("invalid selector requirement {part:?}")));
    }
    Ok(Requirement {
        key: key.to_string(),
        operator: Operator::Exists,
        values: Vec::new(),
    })
}

fn split_set_operator<'a>(part: &'a str, op: &str) -> Option<(&'a str, &'a str)> {
    part.find(op)
        .map(|idx| (&part[..idx], &part[idx + op.len()..]))
}

fn equality(
    key: &str,
    value: &str,
    operator: Operator,
    part: &str,
) -> Result<Requirement, Error> {
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::Config(format!("empty key in selector {part:?}")));
    }
    Ok(Requirement {
        key: key.to_string(),
        operator,
        values: vec![value.trim().to_string()],
    })
}

fn set_requirement(
    key: &str,
    rest: &str,
    operator: Operator,
    part: &str,
) -> Result<Requirement, Error> {
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::Config(format!("empty key in selector {part:?}")));
    }
    let rest = rest.trim();
    let inner = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| {
            Error::Config(format!("set requirement needs a (..) value list: {part:?}"))
        })?;
    let values: Vec<String> = inner
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        return Err(Error::Config(format!("empty value list in selector {part:?}")));
    }
    Ok(Requirement {
        key: key.to_string(),
        operator,
        values,
    })
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod selector_tests;
