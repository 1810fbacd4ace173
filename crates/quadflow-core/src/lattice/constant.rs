use super::DataflowObject;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Undef is top, Nac (not a constant) is bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstState {
    Undef,
    Const(i32),
    Nac,
}

impl ConstState {
    pub fn meet(self, other: ConstState) -> ConstState {
        match (self, other) {
            (ConstState::Undef, x) | (x, ConstState::Undef) => x,
            (ConstState::Nac, _) | (_, ConstState::Nac) => ConstState::Nac,
            (ConstState::Const(a), ConstState::Const(b)) if a == b => ConstState::Const(a),
            _ => ConstState::Nac,
        }
    }

    pub fn as_const(self) -> Option<i32> {
        match self {
            ConstState::Const(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ConstState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstState::Undef => f.write_str("undef"),
            ConstState::Const(value) => write!(f, "{}", value),
            ConstState::Nac => f.write_str("NAC"),
        }
    }
}

/// Register name to constant state, met pointwise. Undef entries are never stored, so
/// a missing name reads as undef and two tables with the same non-undef entries are
/// equal and render the same. The universe is only consulted by `set_to_bottom`.
#[derive(Debug, Clone, Default)]
pub struct ConstantTable {
    universe: Arc<BTreeSet<String>>,
    entries: BTreeMap<String, ConstState>,
}

impl ConstantTable {
    /// All-undef table over `names`.
    pub fn undefined<'a>(names: impl IntoIterator<Item = &'a String>) -> Self {
        Self {
            universe: Arc::new(names.into_iter().cloned().collect()),
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> ConstState {
        self.entries.get(name).copied().unwrap_or(ConstState::Undef)
    }

    pub fn set(&mut self, name: &str, state: ConstState) {
        if state == ConstState::Undef {
            self.entries.remove(name);
        } else {
            self.entries.insert(name.to_string(), state);
        }
    }

    /// Names that are not undef, with their states.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ConstState)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn universe(&self) -> &BTreeSet<String> {
        &self.universe
    }

    /// Number of names that are not undef.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for ConstantTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for ConstantTable {}

impl DataflowObject for ConstantTable {
    fn set_to_top(&mut self) {
        self.entries.clear();
    }

    fn set_to_bottom(&mut self) -> Result<()> {
        let names: Vec<String> = self
            .universe
            .iter()
            .chain(self.entries.keys())
            .cloned()
            .collect();
        for name in names {
            self.entries.insert(name, ConstState::Nac);
        }
        Ok(())
    }

    fn meet_with(&mut self, other: &Self) {
        for (name, state) in &other.entries {
            let merged = self.get(name).meet(*state);
            self.set(name, merged);
        }
    }
}

impl fmt::Display for ConstantTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(name, state)| format!("{}={}", name, state))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
