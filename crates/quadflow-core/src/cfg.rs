use crate::quad::{Quad, QuadId, Register};
use crate::{FlowError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl BlockId {
    pub const ENTRY: BlockId = BlockId(0);
    pub const EXIT: BlockId = BlockId(1);

    pub fn is_pseudo(self) -> bool {
        self == Self::ENTRY || self == Self::EXIT
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BlockId::ENTRY => f.write_str("entry"),
            BlockId::EXIT => f.write_str("exit"),
            BlockId(n) => write!(f, "bb{}", n),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub quads: Vec<Quad>,
    pub successors: Vec<BlockId>,
    pub fallthrough: Option<BlockId>,
}

impl BasicBlock {
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            quads: Vec::new(),
            successors: Vec::new(),
            fallthrough: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn first_quad(&self) -> Option<&Quad> {
        self.quads.first()
    }

    pub fn last_quad(&self) -> Option<&Quad> {
        self.quads.last()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    pub param_count: usize,
    pub is_static: bool,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>, param_count: usize) -> Self {
        Self {
            name: name.into(),
            param_count,
            is_static: false,
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// `R0..R(n-1)`. For instance methods `R0` is the receiver.
    pub fn param_registers(&self) -> impl Iterator<Item = Register> {
        (0..self.param_count).map(Register::param)
    }
}

/// Quad-level neighbours of every quad. `None` stands for the ENTRY (in predecessor
/// lists) or EXIT (in successor lists) pseudo block.
#[derive(Debug, Clone, Default)]
pub struct QuadEdges {
    order: Vec<QuadId>,
    predecessors: HashMap<QuadId, Vec<Option<QuadId>>>,
    successors: HashMap<QuadId, Vec<Option<QuadId>>>,
}

impl QuadEdges {
    pub fn order(&self) -> &[QuadId] {
        &self.order
    }

    pub fn predecessors(&self, id: QuadId) -> &[Option<QuadId>] {
        self.predecessors.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn successors(&self, id: QuadId) -> &[Option<QuadId>] {
        self.successors.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Quads reachable directly from ENTRY, in quad order.
    pub fn entry_quads(&self) -> Vec<QuadId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.predecessors(*id).contains(&None))
            .collect()
    }

    /// Quads flowing directly into EXIT, in quad order.
    pub fn exit_quads(&self) -> Vec<QuadId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.successors(*id).contains(&None))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlFlowGraph {
    method: MethodInfo,
    blocks: IndexMap<BlockId, BasicBlock>,
    next_block: u32,
}

impl ControlFlowGraph {
    pub fn new(method: MethodInfo) -> Self {
        let mut blocks = IndexMap::new();
        blocks.insert(BlockId::ENTRY, BasicBlock::new(BlockId::ENTRY));
        blocks.insert(BlockId::EXIT, BasicBlock::new(BlockId::EXIT));
        Self {
            method,
            blocks,
            next_block: 2,
        }
    }

    /// ENTRY -> bb2 -> EXIT with every quad in bb2.
    pub fn straight_line(method: MethodInfo, quads: Vec<Quad>) -> Result<Self> {
        let mut cfg = Self::new(method);
        let body = cfg.add_block();
        cfg.add_edge(BlockId::ENTRY, body)?;
        cfg.add_edge(body, BlockId::EXIT)?;
        for quad in quads {
            cfg.push_quad(body, quad)?;
        }
        Ok(cfg)
    }

    pub fn method(&self) -> &MethodInfo {
        &self.method
    }

    pub fn add_block(&mut self) -> BlockId {
        while self.blocks.contains_key(&BlockId(self.next_block)) {
            self.next_block += 1;
        }
        let id = BlockId(self.next_block);
        self.next_block += 1;
        self.blocks.insert(id, BasicBlock::new(id));
        id
    }

    pub fn insert_block(&mut self, id: BlockId) -> Result<()> {
        if self.blocks.contains_key(&id) {
            return Err(FlowError::MalformedGraph(format!("duplicate block {}", id)));
        }
        self.blocks.insert(id, BasicBlock::new(id));
        Ok(())
    }

    pub fn contains_block(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(&id)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.values()
    }

    /// The first edge added from a block becomes its fallthrough.
    pub fn add_edge(&mut self, from: BlockId, to: BlockId) -> Result<()> {
        if from == BlockId::EXIT {
            return Err(FlowError::MalformedGraph("edge out of exit".to_string()));
        }
        if to == BlockId::ENTRY {
            return Err(FlowError::MalformedGraph("edge into entry".to_string()));
        }
        if !self.blocks.contains_key(&to) {
            return Err(FlowError::UnknownBlock(to));
        }
        let block = self
            .blocks
            .get_mut(&from)
            .ok_or(FlowError::UnknownBlock(from))?;
        if !block.successors.contains(&to) {
            block.successors.push(to);
        }
        if block.fallthrough.is_none() {
            block.fallthrough = Some(to);
        }
        Ok(())
    }

    pub fn push_quad(&mut self, block: BlockId, quad: Quad) -> Result<()> {
        if block.is_pseudo() {
            return Err(FlowError::MalformedGraph(format!(
                "quad {} placed in pseudo block {}",
                quad.id, block
            )));
        }
        if self.quad(quad.id).is_some() {
            return Err(FlowError::MalformedGraph(format!(
                "duplicate quad id {}",
                quad.id
            )));
        }
        self.blocks
            .get_mut(&block)
            .ok_or(FlowError::UnknownBlock(block))?
            .quads
            .push(quad);
        Ok(())
    }

    pub fn successors(&self, id: BlockId) -> &[BlockId] {
        self.blocks
            .get(&id)
            .map(|b| b.successors.as_slice())
            .unwrap_or(&[])
    }

    pub fn fallthrough_successor(&self, id: BlockId) -> Option<BlockId> {
        self.blocks.get(&id).and_then(|b| b.fallthrough)
    }

    pub fn predecessors(&self, id: BlockId) -> Vec<BlockId> {
        self.blocks
            .values()
            .filter(|b| b.successors.contains(&id))
            .map(|b| b.id)
            .collect()
    }

    pub fn quads(&self) -> impl Iterator<Item = &Quad> {
        self.blocks.values().flat_map(|b| b.quads.iter())
    }

    pub fn quad_order(&self) -> Vec<QuadId> {
        self.quads().map(|q| q.id).collect()
    }

    pub fn quad(&self, id: QuadId) -> Option<&Quad> {
        self.quads().find(|q| q.id == id)
    }

    pub fn quad_count(&self) -> usize {
        self.blocks.values().map(|b| b.quads.len()).sum()
    }

    pub fn max_quad_id(&self) -> Option<QuadId> {
        self.quads().map(|q| q.id).max()
    }

    /// Parameter registers plus every register any quad defines or uses.
    pub fn register_universe(&self) -> BTreeSet<String> {
        let mut universe: BTreeSet<String> = self
            .method
            .param_registers()
            .map(|r| r.0)
            .collect();
        for quad in self.quads() {
            for reg in quad.defined_registers() {
                universe.insert(reg.name().to_string());
            }
            for reg in quad.used_registers() {
                universe.insert(reg.name().to_string());
            }
        }
        universe
    }

    pub fn quad_edges(&self) -> QuadEdges {
        let mut block_preds: HashMap<BlockId, Vec<BlockId>> = HashMap::new();
        for block in self.blocks.values() {
            for succ in &block.successors {
                block_preds.entry(*succ).or_default().push(block.id);
            }
        }

        let mut edges = QuadEdges::default();
        for block in self.blocks.values() {
            let Some(first) = block.first_quad() else {
                continue;
            };

            let mut incoming = Vec::new();
            self.collect_incoming(block.id, &block_preds, &mut HashSet::new(), &mut incoming);
            edges.predecessors.insert(first.id, incoming);

            let mut outgoing = Vec::new();
            self.collect_outgoing(block.id, &mut HashSet::new(), &mut outgoing);
            if let Some(last) = block.last_quad() {
                edges.successors.insert(last.id, outgoing);
            }

            for pair in block.quads.windows(2) {
                edges.successors.insert(pair[0].id, vec![Some(pair[1].id)]);
                edges.predecessors.insert(pair[1].id, vec![Some(pair[0].id)]);
            }
            edges.order.extend(block.quads.iter().map(|q| q.id));
        }
        edges
    }

    fn collect_incoming(
        &self,
        block: BlockId,
        block_preds: &HashMap<BlockId, Vec<BlockId>>,
        visited: &mut HashSet<BlockId>,
        out: &mut Vec<Option<QuadId>>,
    ) {
        for pred in block_preds.get(&block).into_iter().flatten() {
            let neighbor = if *pred == BlockId::ENTRY {
                Some(None)
            } else {
                self.blocks
                    .get(pred)
                    .and_then(|b| b.last_quad())
                    .map(|q| Some(q.id))
            };
            match neighbor {
                Some(n) => {
                    if !out.contains(&n) {
                        out.push(n);
                    }
                }
                None => {
                    if visited.insert(*pred) {
                        self.collect_incoming(*pred, block_preds, visited, out);
                    }
                }
            }
        }
    }

    /// A block without successors falls off the end of the method into EXIT.
    fn collect_outgoing(
        &self,
        block: BlockId,
        visited: &mut HashSet<BlockId>,
        out: &mut Vec<Option<QuadId>>,
    ) {
        let succs = self.successors(block);
        if succs.is_empty() && !out.contains(&None) {
            out.push(None);
        }
        for succ in succs {
            let neighbor = if *succ == BlockId::EXIT {
                Some(None)
            } else {
                self.blocks
                    .get(succ)
                    .and_then(|b| b.first_quad())
                    .map(|q| Some(q.id))
            };
            match neighbor {
                Some(n) => {
                    if !out.contains(&n) {
                        out.push(n);
                    }
                }
                None => {
                    if visited.insert(*succ) {
                        self.collect_outgoing(*succ, visited, out);
                    }
                }
            }
        }
    }

    /// Drops every listed quad in one pass and returns how many were found.
    pub fn remove_quads(&mut self, ids: &[QuadId]) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let doomed: HashSet<QuadId> = ids.iter().copied().collect();
        let mut removed = 0;
        for block in self.blocks.values_mut() {
            let before = block.quads.len();
            block.quads.retain(|q| !doomed.contains(&q.id));
            removed += before - block.quads.len();
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quad::Operand;

    fn diamond() -> ControlFlowGraph {
        let mut cfg = ControlFlowGraph::new(MethodInfo::new("diamond", 1).with_static(true));
        let head = cfg.add_block();
        let left = cfg.add_block();
        let right = cfg.add_block();
        let join = cfg.add_block();
        cfg.add_edge(BlockId::ENTRY, head).unwrap();
        cfg.add_edge(head, left).unwrap();
        cfg.add_edge(head, right).unwrap();
        cfg.add_edge(left, join).unwrap();
        cfg.add_edge(right, join).unwrap();
        cfg.add_edge(join, BlockId::EXIT).unwrap();
        cfg.push_quad(head, Quad::mov(1, "R1", Operand::IConst(1))).unwrap();
        cfg.push_quad(left, Quad::mov(2, "R2", Operand::IConst(2))).unwrap();
        cfg.push_quad(join, Quad::ret(4, Some(Operand::reg("R2")))).unwrap();
        cfg
    }

    #[test]
    fn test_empty_blocks_are_skipped() {
        let cfg = diamond();
        let edges = cfg.quad_edges();
        assert_eq!(edges.order(), &[QuadId(1), QuadId(2), QuadId(4)]);
        assert_eq!(edges.predecessors(QuadId(4)), &[Some(QuadId(2)), Some(QuadId(1))]);
        assert_eq!(edges.successors(QuadId(1)), &[Some(QuadId(2)), Some(QuadId(4))]);
        assert_eq!(edges.predecessors(QuadId(1)), &[None]);
        assert_eq!(edges.successors(QuadId(4)), &[None]);
        assert_eq!(edges.entry_quads(), vec![QuadId(1)]);
        assert_eq!(edges.exit_quads(), vec![QuadId(4)]);
    }

    #[test]
    fn test_duplicate_quad_rejected() {
        let mut cfg = diamond();
        let err = cfg.push_quad(BlockId(2), Quad::mov(1, "R3", Operand::Null));
        assert!(matches!(err, Err(FlowError::MalformedGraph(_))));
    }

    #[test]
    fn test_remove_quads() {
        let mut cfg = diamond();
        assert_eq!(cfg.remove_quads(&[QuadId(2), QuadId(99)]), 1);
        assert_eq!(cfg.quad_order(), vec![QuadId(1), QuadId(4)]);
        assert_eq!(cfg.max_quad_id(), Some(QuadId(4)));
    }

    #[test]
    fn test_universe_includes_params() {
        let cfg = diamond();
        let universe: Vec<String> = cfg.register_universe().into_iter().collect();
        assert_eq!(universe, vec!["R0", "R1", "R2"]);
    }

    #[test]
    fn test_fallthrough_is_first_edge() {
        let cfg = diamond();
        assert_eq!(cfg.fallthrough_successor(BlockId(2)), Some(BlockId(3)));
        assert_eq!(cfg.predecessors(BlockId(5)), vec![BlockId(3), BlockId(4)]);
    }
}
