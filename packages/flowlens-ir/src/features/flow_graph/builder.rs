//! BFG/CFG construction from a function body (§4.D).
//!
//! Generators and async functions get a YIELD block per suspension point;
//! a dispatcher pattern joins every resumption point back at ENTRY so that
//! variables live across yields still get correct phi placement in SSA.

use tree_sitter::Node as TsNode;

use super::domain::{BasicBlock, BlockId, BlockKind, CFGEdge, CFGEdgeType, FunctionCFG, StatementRef};

pub struct CFGBuilder<'a> {
    source: &'a str,
    cfg: FunctionCFG,
}

impl<'a> CFGBuilder<'a> {
    pub fn build(function_id: &str, body: TsNode, source: &'a str) -> FunctionCFG {
        let mut builder = Self {
            source,
            cfg: FunctionCFG {
                function_id: function_id.to_string(),
                entry: 0,
                exit: 1,
                blocks: vec![
                    BasicBlock::new(0, BlockKind::Entry),
                    BasicBlock::new(1, BlockKind::Exit),
                ],
                edges: Vec::new(),
                is_generator: contains_yield(&body),
                writes: Vec::new(),
                reads: Vec::new(),
            },
        };
        let start = builder.new_block(BlockKind::Statement);
        builder.connect(builder.cfg.entry, start, CFGEdgeType::Unconditional);
        let open = builder.walk_statements(body, vec![start]);
        for block in open {
            builder.connect(block, builder.cfg.exit, CFGEdgeType::Unconditional);
        }
        builder.cfg
    }

    fn new_block(&mut self, kind: BlockKind) -> BlockId {
        let id = self.cfg.blocks.len();
        self.cfg.blocks.push(BasicBlock::new(id, kind));
        id
    }

    fn connect(&mut self, source: BlockId, target: BlockId, edge_type: CFGEdgeType) {
        self.cfg.edges.push(CFGEdge { source, target, edge_type });
    }

    fn push_statement(&mut self, block: BlockId, node: &TsNode) {
        self.record_reads_writes(block, node);
        if let Some(b) = self.cfg.blocks.get_mut(block) {
            b.statements.push(StatementRef {
                start_byte: node.start_byte(),
                end_byte: node.end_byte(),
                text: text(node, self.source),
            });
        }
    }

    fn record_reads_writes(&mut self, block: BlockId, node: &TsNode) {
        if node.kind() == "assignment" {
            if let Some(left) = node.child_by_field_name("left") {
                if left.kind() == "identifier" {
                    self.cfg.writes.push((block, text(&left, self.source)));
                }
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "identifier" {
                self.cfg.reads.push((block, text(&child, self.source)));
            } else {
                self.record_reads_writes(block, &child);
            }
        }
    }

    /// Walks a sequence of sibling statements starting from `open` (the set
    /// of blocks that currently fall through); returns the new open set.
    fn walk_statements(&mut self, node: TsNode, open: Vec<BlockId>) -> Vec<BlockId> {
        let mut current = open;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            current = self.walk_statement(child, current);
            if current.is_empty() {
                // Everything terminated (return/raise on every path); later
                // siblings are dead code from the CFG's point of view, but
                // we still record them as statements for diagnostics.
            }
        }
        current
    }

    fn walk_statement(&mut self, node: TsNode, open: Vec<BlockId>) -> Vec<BlockId> {
        if open.is_empty() {
            return open;
        }
        match node.kind() {
            "if_statement" => self.walk_if(node, open),
            "for_statement" | "while_statement" => self.walk_loop(node, open),
            "return_statement" => {
                let block = self.new_block(BlockKind::Return);
                for o in &open {
                    self.connect(*o, block, CFGEdgeType::Unconditional);
                }
                self.push_statement(block, &node);
                self.connect(block, self.cfg.exit, CFGEdgeType::Return);
                Vec::new()
            }
            "raise_statement" => {
                let block = self.new_block(BlockKind::Raise);
                for o in &open {
                    self.connect(*o, block, CFGEdgeType::Unconditional);
                }
                self.push_statement(block, &node);
                self.connect(block, self.cfg.exit, CFGEdgeType::Exception);
                Vec::new()
            }
            "expression_statement" if contains_yield(&node) => {
                let block = self.new_block(BlockKind::Yield);
                for o in &open {
                    self.connect(*o, block, CFGEdgeType::Unconditional);
                }
                self.push_statement(block, &node);
                // dispatcher pattern: every resumption point re-enters via
                // ENTRY so SSA can place phi-nodes for live-across-yield vars.
                self.connect(self.cfg.entry, block, CFGEdgeType::Unconditional);
                vec![block]
            }
            "try_statement" => self.walk_try(node, open),
            _ => {
                for o in &open {
                    self.push_statement(*o, &node);
                }
                open
            }
        }
    }

    fn walk_if(&mut self, node: TsNode, open: Vec<BlockId>) -> Vec<BlockId> {
        let branch = self.new_block(BlockKind::Branch);
        for o in &open {
            self.connect(*o, branch, CFGEdgeType::Unconditional);
        }
        if let Some(cond) = node.child_by_field_name("condition") {
            self.push_statement(branch, &cond);
        }

        let mut joined = Vec::new();
        if let Some(consequence) = node.child_by_field_name("consequence") {
            let then_start = self.new_block(BlockKind::Statement);
            self.connect(branch, then_start, CFGEdgeType::True);
            let then_open = self.walk_statements(consequence, vec![then_start]);
            joined.extend(then_open);
        }

        let mut had_else = false;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "elif_clause" => {
                    if let Some(cond) = child.child_by_field_name("condition") {
                        let elif_branch = self.new_block(BlockKind::Branch);
                        self.connect(branch, elif_branch, CFGEdgeType::False);
                        self.push_statement(elif_branch, &cond);
                        if let Some(body) = child.child_by_field_name("consequence") {
                            let elif_start = self.new_block(BlockKind::Statement);
                            self.connect(elif_branch, elif_start, CFGEdgeType::True);
                            joined.extend(self.walk_statements(body, vec![elif_start]));
                        }
                    }
                }
                "else_clause" => {
                    had_else = true;
                    if let Some(body) = child.child_by_field_name("body") {
                        let else_start = self.new_block(BlockKind::Statement);
                        self.connect(branch, else_start, CFGEdgeType::False);
                        joined.extend(self.walk_statements(body, vec![else_start]));
                    }
                }
                _ => {}
            }
        }
        if !had_else {
            joined.push(branch);
        }
        joined
    }

    fn walk_loop(&mut self, node: TsNode, open: Vec<BlockId>) -> Vec<BlockId> {
        let header = self.new_block(BlockKind::Loop);
        for o in &open {
            self.connect(*o, header, CFGEdgeType::Unconditional);
        }
        if let Some(cond) = node.child_by_field_name("condition") {
            self.push_statement(header, &cond);
        }
        if let Some(left) = node.child_by_field_name("left") {
            self.push_statement(header, &left);
        }

        let body_open = if let Some(body) = node.child_by_field_name("body") {
            let body_start = self.new_block(BlockKind::Statement);
            self.connect(header, body_start, CFGEdgeType::True);
            self.walk_statements(body, vec![body_start])
        } else {
            Vec::new()
        };
        for b in &body_open {
            self.connect(*b, header, CFGEdgeType::LoopBack);
        }

        let exit = self.new_block(BlockKind::LoopExit);
        self.connect(header, exit, CFGEdgeType::False);
        vec![exit]
    }

    fn walk_try(&mut self, node: TsNode, open: Vec<BlockId>) -> Vec<BlockId> {
        let mut joined = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "block" => {
                    joined.extend(self.walk_statements(child, open.clone()));
                }
                "except_clause" => {
                    let handler = self.new_block(BlockKind::Statement);
                    for o in &open {
                        self.connect(*o, handler, CFGEdgeType::Exception);
                    }
                    joined.extend(self.walk_statements(child, vec![handler]));
                }
                _ => {}
            }
        }
        joined
    }
}

fn contains_yield(node: &TsNode) -> bool {
    if node.kind() == "yield" {
        return true;
    }
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| contains_yield(&c))
}

fn text(node: &TsNode, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::parsing::LanguageParser;
    use crate::shared::Language;

    fn build_function_cfg(source: &str) -> FunctionCFG {
        let parsed = LanguageParser::parse_as(Language::Python, source).unwrap();
        let root = parsed.root();
        let func = find_function(root).unwrap();
        let body = func.child_by_field_name("body").unwrap();
        CFGBuilder::build("f", body, source)
    }

    fn find_function<'a>(node: tree_sitter::Node<'a>) -> Option<tree_sitter::Node<'a>> {
        if node.kind() == "function_definition" {
            return Some(node);
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if let Some(f) = find_function(child) {
                return Some(f);
            }
        }
        None
    }

    #[test]
    fn straight_line_function_is_well_formed() {
        let cfg = build_function_cfg("def f(x):\n    y = x\n    return y\n");
        assert!(cfg.check_well_formed());
    }

    #[test]
    fn if_else_joins_back_without_else_branch() {
        let cfg = build_function_cfg("def f(x):\n    if x:\n        y = 1\n    return x\n");
        assert!(cfg.check_well_formed());
    }

    #[test]
    fn if_else_both_branches_return_has_no_open_tail() {
        let cfg = build_function_cfg(
            "def f(x):\n    if x:\n        return 1\n    else:\n        return 2\n",
        );
        assert!(cfg.check_well_formed());
    }

    #[test]
    fn loop_back_edge_is_present() {
        let cfg = build_function_cfg("def f(xs):\n    for x in xs:\n        y = x\n    return 0\n");
        assert!(cfg
            .edges
            .iter()
            .any(|e| matches!(e.edge_type, crate::features::flow_graph::domain::CFGEdgeType::LoopBack)));
    }

    #[test]
    fn generator_function_is_detected_and_yield_block_dispatched() {
        let cfg = build_function_cfg("def f(xs):\n    for x in xs:\n        yield x\n");
        assert!(cfg.is_generator);
        assert!(cfg
            .blocks
            .iter()
            .any(|b| matches!(b.kind, BlockKind::Yield)));
    }
}
