//! Dominator tree and dominance frontier computation over a [`FunctionCFG`].

use std::collections::{HashMap, HashSet};

use petgraph::algo::dominators::{self, Dominators};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::features::flow_graph::{BlockId, FunctionCFG};

pub struct DominanceInfo {
    graph: DiGraph<BlockId, ()>,
    index_of: HashMap<BlockId, NodeIndex>,
    dominators: Dominators<NodeIndex>,
    pub frontier: HashMap<BlockId, HashSet<BlockId>>,
}

impl DominanceInfo {
    pub fn compute(cfg: &FunctionCFG) -> Self {
        let mut graph = DiGraph::new();
        let mut index_of = HashMap::new();
        for block in &cfg.blocks {
            index_of.insert(block.id, graph.add_node(block.id));
        }
        for edge in &cfg.edges {
            graph.add_edge(index_of[&edge.source], index_of[&edge.target], ());
        }

        let root = index_of[&cfg.entry];
        let dominators = dominators::simple_fast(&graph, root);

        let mut frontier: HashMap<BlockId, HashSet<BlockId>> =
            cfg.blocks.iter().map(|b| (b.id, HashSet::new())).collect();

        for block in &cfg.blocks {
            let preds = cfg.predecessors(block.id);
            if preds.len() < 2 {
                continue;
            }
            let Some(idom_b) = dominators.immediate_dominator(index_of[&block.id]) else {
                continue;
            };
            for pred in preds {
                let mut runner = index_of[&pred];
                while runner != idom_b {
                    let runner_block = graph[runner];
                    frontier.entry(runner_block).or_default().insert(block.id);
                    match dominators.immediate_dominator(runner) {
                        Some(next) if next != runner => runner = next,
                        _ => break,
                    }
                }
            }
        }

        Self {
            graph,
            index_of,
            dominators,
            frontier,
        }
    }

    pub fn immediate_dominator(&self, block: BlockId) -> Option<BlockId> {
        let idx = *self.index_of.get(&block)?;
        let dom_idx = self.dominators.immediate_dominator(idx)?;
        Some(self.graph[dom_idx])
    }

    pub fn is_reachable(&self, block: BlockId) -> bool {
        self.index_of
            .get(&block)
            .is_some_and(|idx| self.dominators.immediate_dominator(*idx).is_some() || *idx == self.dominators.root())
    }

    /// Children of `block` in the dominator tree, in block-id order (stable
    /// and deterministic for renaming's DFS).
    pub fn dominator_children(&self, block: BlockId) -> Vec<BlockId> {
        let mut children: Vec<BlockId> = self
            .index_of
            .keys()
            .filter(|&&b| b != block && self.immediate_dominator(b) == Some(block))
            .copied()
            .collect();
        children.sort_unstable();
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::flow_graph::{BasicBlock, BlockKind, CFGEdge, CFGEdgeType};

    fn diamond_cfg() -> FunctionCFG {
        FunctionCFG {
            function_id: "f".into(),
            entry: 0,
            exit: 3,
            blocks: vec![
                BasicBlock::new(0, BlockKind::Entry),
                BasicBlock::new(1, BlockKind::Statement),
                BasicBlock::new(2, BlockKind::Statement),
                BasicBlock::new(3, BlockKind::Exit),
            ],
            edges: vec![
                CFGEdge { source: 0, target: 1, edge_type: CFGEdgeType::True },
                CFGEdge { source: 0, target: 2, edge_type: CFGEdgeType::False },
                CFGEdge { source: 1, target: 3, edge_type: CFGEdgeType::Unconditional },
                CFGEdge { source: 2, target: 3, edge_type: CFGEdgeType::Unconditional },
            ],
            is_generator: false,
            writes: Vec::new(),
            reads: Vec::new(),
        }
    }

    #[test]
    fn join_block_is_in_frontier_of_both_branches() {
        let cfg = diamond_cfg();
        let info = DominanceInfo::compute(&cfg);
        assert!(info.frontier[&1].contains(&3));
        assert!(info.frontier[&2].contains(&3));
    }

    #[test]
    fn entry_dominates_everything() {
        let cfg = diamond_cfg();
        let info = DominanceInfo::compute(&cfg);
        assert_eq!(info.immediate_dominator(1), Some(0));
        assert_eq!(info.immediate_dominator(3), Some(0));
    }
}
