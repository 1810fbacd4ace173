use super::DataflowObject;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeetOp {
    Union,
    Intersection,
}

/// A set of register names drawn from a per-graph universe.
///
/// Under `Union` top is the empty set and bottom the universe; `Intersection` flips
/// both. Equality and rendering only look at the members.
#[derive(Debug, Clone)]
pub struct RegisterSet {
    names: BTreeSet<String>,
    universe: Arc<BTreeSet<String>>,
    meet: MeetOp,
}

impl RegisterSet {
    pub fn empty(universe: Arc<BTreeSet<String>>, meet: MeetOp) -> Self {
        Self {
            names: BTreeSet::new(),
            universe,
            meet,
        }
    }

    pub fn full(universe: Arc<BTreeSet<String>>, meet: MeetOp) -> Self {
        Self {
            names: universe.as_ref().clone(),
            universe,
            meet,
        }
    }

    pub fn top(universe: Arc<BTreeSet<String>>, meet: MeetOp) -> Self {
        match meet {
            MeetOp::Union => Self::empty(universe, meet),
            MeetOp::Intersection => Self::full(universe, meet),
        }
    }

    pub fn meet_op(&self) -> MeetOp {
        self.meet
    }

    pub fn universe(&self) -> &BTreeSet<String> {
        &self.universe
    }

    pub fn insert(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            return false;
        }
        self.names.insert(name.to_string())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }
}

impl PartialEq for RegisterSet {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl Eq for RegisterSet {}

impl DataflowObject for RegisterSet {
    fn set_to_top(&mut self) {
        match self.meet {
            MeetOp::Union => self.names.clear(),
            MeetOp::Intersection => self.names = self.universe.as_ref().clone(),
        }
    }

    fn set_to_bottom(&mut self) -> Result<()> {
        match self.meet {
            MeetOp::Union => self.names = self.universe.as_ref().clone(),
            MeetOp::Intersection => self.names.clear(),
        }
        Ok(())
    }

    fn meet_with(&mut self, other: &Self) {
        match self.meet {
            MeetOp::Union => self.names.extend(other.names.iter().cloned()),
            MeetOp::Intersection => self.names.retain(|n| other.names.contains(n)),
        }
    }
}

impl fmt::Display for RegisterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        write!(f, "[{}]", names.join(", "))
    }
}
