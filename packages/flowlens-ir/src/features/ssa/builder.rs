//! Phi placement and renaming (§4.D): the classic Cytron et al. algorithm,
//! run per-function over the CFG produced by [`crate::features::flow_graph`].

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::features::flow_graph::{BlockId, FunctionCFG};

use super::dominance::DominanceInfo;
use super::domain::{PhiNode, SSAFunction, SSAVariable};

pub fn build_ssa(cfg: &FunctionCFG) -> SSAFunction {
    let well_formed = cfg.check_well_formed();
    let info = DominanceInfo::compute(cfg);

    let mut writes_by_block: HashMap<BlockId, Vec<String>> = HashMap::new();
    let mut all_vars: HashSet<String> = HashSet::new();
    for (block, name) in &cfg.writes {
        writes_by_block.entry(*block).or_default().push(name.clone());
        all_vars.insert(name.clone());
    }

    let phi_sites = place_phi_nodes(&info, &writes_by_block, &all_vars);
    let mut renamer = Renamer::new(cfg, &info, &writes_by_block, &phi_sites);
    renamer.visit(cfg.entry);

    let phi_nodes = phi_sites
        .into_iter()
        .map(|(block, variable)| {
            let result = renamer
                .phi_results
                .get(&(block, variable.clone()))
                .cloned()
                .unwrap_or(SSAVariable { name: variable.clone(), version: 0 });
            let operands = cfg
                .predecessors(block)
                .into_iter()
                .map(|pred| {
                    let value = renamer
                        .phi_operands
                        .get(&(block, variable.clone()))
                        .and_then(|m| m.get(&pred))
                        .cloned()
                        .unwrap_or(SSAVariable { name: variable.clone(), version: 0 });
                    (pred, value)
                })
                .collect();
            PhiNode { block, variable, result, operands }
        })
        .collect();

    SSAFunction {
        function_id: cfg.function_id.clone(),
        phi_nodes,
        definitions: renamer.definitions,
        uses: renamer.uses,
        partial: !well_formed,
    }
}

/// Standard iterative worklist placement: a variable defined in block `b`
/// needs a phi at every block in `b`'s dominance frontier, and a phi is
/// itself a definition so it can trigger further placement.
fn place_phi_nodes(
    info: &DominanceInfo,
    writes_by_block: &HashMap<BlockId, Vec<String>>,
    all_vars: &HashSet<String>,
) -> Vec<(BlockId, String)> {
    let mut has_phi: HashSet<(BlockId, String)> = HashSet::new();
    let mut placed: Vec<(BlockId, String)> = Vec::new();

    for var in all_vars {
        let mut worklist: Vec<BlockId> = writes_by_block
            .iter()
            .filter(|(_, names)| names.contains(var))
            .map(|(block, _)| *block)
            .collect();
        let mut processed: HashSet<BlockId> = worklist.iter().copied().collect();

        while let Some(block) = worklist.pop() {
            let Some(frontier) = info.frontier.get(&block) else {
                continue;
            };
            for &target in frontier {
                let key = (target, var.clone());
                if !has_phi.insert(key.clone()) {
                    continue;
                }
                placed.push(key);
                if processed.insert(target) {
                    worklist.push(target);
                }
            }
        }
    }

    placed.sort();
    placed
}

/// Dominator-tree DFS renaming pass, following Cytron et al.: entering a
/// block pushes fresh versions for its phi results and writes, fills the
/// phi operand this block contributes in each CFG successor, recurses into
/// dominator children, then pops on the way back out so sibling subtrees
/// never see each other's versions.
struct Renamer<'a> {
    cfg: &'a FunctionCFG,
    info: &'a DominanceInfo,
    writes_by_block: &'a HashMap<BlockId, Vec<String>>,
    reads_by_block: HashMap<BlockId, Vec<String>>,
    phi_sites_by_block: HashMap<BlockId, Vec<String>>,
    counters: HashMap<String, u32>,
    stacks: HashMap<String, Vec<SSAVariable>>,
    definitions: BTreeMap<BlockId, Vec<SSAVariable>>,
    uses: BTreeMap<BlockId, Vec<SSAVariable>>,
    phi_results: HashMap<(BlockId, String), SSAVariable>,
    phi_operands: HashMap<(BlockId, String), HashMap<BlockId, SSAVariable>>,
}

impl<'a> Renamer<'a> {
    fn new(
        cfg: &'a FunctionCFG,
        info: &'a DominanceInfo,
        writes_by_block: &'a HashMap<BlockId, Vec<String>>,
        phi_sites: &[(BlockId, String)],
    ) -> Self {
        let mut reads_by_block: HashMap<BlockId, Vec<String>> = HashMap::new();
        for (block, name) in &cfg.reads {
            reads_by_block.entry(*block).or_default().push(name.clone());
        }
        let mut phi_sites_by_block: HashMap<BlockId, Vec<String>> = HashMap::new();
        for (block, var) in phi_sites {
            phi_sites_by_block.entry(*block).or_default().push(var.clone());
        }
        Self {
            cfg,
            info,
            writes_by_block,
            reads_by_block,
            phi_sites_by_block,
            counters: HashMap::new(),
            stacks: HashMap::new(),
            definitions: BTreeMap::new(),
            uses: BTreeMap::new(),
            phi_results: HashMap::new(),
            phi_operands: HashMap::new(),
        }
    }

    fn fresh(&mut self, name: &str) -> SSAVariable {
        let version = self.counters.entry(name.to_string()).or_insert(0);
        *version += 1;
        let var = SSAVariable { name: name.to_string(), version: *version };
        self.stacks.entry(name.to_string()).or_default().push(var.clone());
        var
    }

    fn current(&self, name: &str) -> SSAVariable {
        self.stacks
            .get(name)
            .and_then(|s| s.last())
            .cloned()
            .unwrap_or(SSAVariable { name: name.to_string(), version: 0 })
    }

    fn visit(&mut self, block: BlockId) {
        let mut pushed: Vec<String> = Vec::new();

        if let Some(vars) = self.phi_sites_by_block.get(&block).cloned() {
            for name in vars {
                let var = self.fresh(&name);
                pushed.push(name.clone());
                self.phi_results.insert((block, name), var.clone());
                self.definitions.entry(block).or_default().push(var);
            }
        }

        if let Some(reads) = self.reads_by_block.get(&block).cloned() {
            for name in reads {
                let current = self.current(&name);
                self.uses.entry(block).or_default().push(current);
            }
        }

        if let Some(names) = self.writes_by_block.get(&block).cloned() {
            for name in names {
                let var = self.fresh(&name);
                pushed.push(name.clone());
                self.definitions.entry(block).or_default().push(var);
            }
        }

        for successor in self.cfg.successors(block) {
            if let Some(vars) = self.phi_sites_by_block.get(&successor).cloned() {
                for name in vars {
                    let value = self.current(&name);
                    self.phi_operands
                        .entry((successor, name))
                        .or_default()
                        .insert(block, value);
                }
            }
        }

        for child in self.info.dominator_children(block) {
            self.visit(child);
        }

        for name in pushed {
            if let Some(stack) = self.stacks.get_mut(&name) {
                stack.pop();
            }
        }
    }
}
