use super::DataflowObject;
use crate::quad::QuadId;
use crate::{FlowError, Result};
use std::collections::BTreeSet;
use std::fmt;

/// Definition sites, met by union.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefSet {
    sites: BTreeSet<QuadId>,
}

impl DefSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: QuadId) -> bool {
        self.sites.insert(id)
    }

    pub fn kill(&mut self, sites: &BTreeSet<QuadId>) {
        self.sites.retain(|id| !sites.contains(id));
    }

    pub fn contains(&self, id: QuadId) -> bool {
        self.sites.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = QuadId> + '_ {
        self.sites.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl FromIterator<QuadId> for DefSet {
    fn from_iter<I: IntoIterator<Item = QuadId>>(iter: I) -> Self {
        Self {
            sites: iter.into_iter().collect(),
        }
    }
}

impl DataflowObject for DefSet {
    fn set_to_top(&mut self) {
        self.sites.clear();
    }

    fn set_to_bottom(&mut self) -> Result<()> {
        Err(FlowError::UnsupportedLatticeOp {
            op: "set_to_bottom",
            lattice: "DefSet",
        })
    }

    fn meet_with(&mut self, other: &Self) {
        self.sites.extend(other.sites.iter().copied());
    }
}

impl fmt::Display for DefSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.sites.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", ids.join(", "))
    }
}
