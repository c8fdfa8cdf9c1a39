//! BFG/CFG domain model (spec §3.1, §4.D).

use serde::{Deserialize, Serialize};

pub type BlockId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Entry,
    Exit,
    Statement,
    Branch,
    Loop,
    LoopExit,
    LoopContinue,
    Return,
    Yield,
    Raise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CFGEdgeType {
    Unconditional,
    True,
    False,
    LoopBack,
    Exception,
    Return,
}

/// A statement reference is the byte range of the tree-sitter node it was
/// derived from; the SSA layer never needs more than that to attribute a
/// read/write to a block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementRef {
    pub start_byte: usize,
    pub end_byte: usize,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub kind: BlockKind,
    pub statements: Vec<StatementRef>,
}

impl BasicBlock {
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            statements: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CFGEdge {
    pub source: BlockId,
    pub target: BlockId,
    pub edge_type: CFGEdgeType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCFG {
    pub function_id: String,
    pub entry: BlockId,
    pub exit: BlockId,
    pub blocks: Vec<BasicBlock>,
    pub edges: Vec<CFGEdge>,
    pub is_generator: bool,
    /// Byte-range -> variable names written in that block, populated while
    /// walking statements; consumed directly by SSA construction.
    pub writes: Vec<(BlockId, String)>,
    pub reads: Vec<(BlockId, String)>,
}

impl FunctionCFG {
    pub fn predecessors(&self, block: BlockId) -> Vec<BlockId> {
        self.edges
            .iter()
            .filter(|e| e.target == block)
            .map(|e| e.source)
            .collect()
    }

    pub fn successors(&self, block: BlockId) -> Vec<BlockId> {
        self.edges
            .iter()
            .filter(|e| e.source == block)
            .map(|e| e.target)
            .collect()
    }

    /// Invariant (§4.D): every block other than ENTRY has >=1 predecessor;
    /// every block other than EXIT has >=1 successor.
    pub fn check_well_formed(&self) -> bool {
        self.blocks.iter().all(|b| {
            let has_pred = b.id == self.entry || !self.predecessors(b.id).is_empty();
            let has_succ = b.id == self.exit || !self.successors(b.id).is_empty();
            has_pred && has_succ
        })
    }
}
