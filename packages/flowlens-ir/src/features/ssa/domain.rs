//! SSA domain model (spec §3.1, §4.D).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::features::flow_graph::BlockId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SSAVariable {
    pub name: String,
    pub version: u32,
}

impl SSAVariable {
    pub fn qualified(&self) -> String {
        format!("{}#{}", self.name, self.version)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhiNode {
    pub block: BlockId,
    pub variable: String,
    pub result: SSAVariable,
    /// One operand per predecessor block, in `predecessors()` order.
    pub operands: Vec<(BlockId, SSAVariable)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SSAFunction {
    pub function_id: String,
    pub phi_nodes: Vec<PhiNode>,
    /// Per block, the SSA variable each original write resolved to, in
    /// program order.
    pub definitions: BTreeMap<BlockId, Vec<SSAVariable>>,
    /// Per block, the SSA variable each original read resolved to, in
    /// program order. Unresolved reads (no dominating definition, e.g. a
    /// function parameter) get version 0.
    pub uses: BTreeMap<BlockId, Vec<SSAVariable>>,
    /// Set when the source CFG failed `check_well_formed`; phi placement and
    /// renaming still ran on a best-effort basis but results may be
    /// incomplete for unreachable blocks.
    pub partial: bool,
}
