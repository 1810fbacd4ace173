use crate::quad::QuadId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeReport {
    pub id: QuadId,
    #[serde(rename = "in")]
    pub input: String,
    #[serde(rename = "out")]
    pub output: String,
}

/// Rendered fixpoint of one analysis over one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowReport {
    pub analysis: String,
    pub method: String,
    pub entry: String,
    pub nodes: Vec<NodeReport>,
    pub exit: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<QuadId>,
}

impl FlowReport {
    pub fn node(&self, id: QuadId) -> Option<&NodeReport> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
