use crate::error::TreeError;
use crate::grammar::Grammar;
use crate::iter::{Leaves, Preorder};
use crate::symbol::{NonTerminalId, Symbol};
use slotmap::{new_key_type, SlotMap};
use std::fmt::Write;
use std::rc::Rc;

/// An immutable derivation fragment.
///
/// Fragments are shared: a snippet built by concatenation holds its
/// components by reference count rather than copying them.
#[derive(Debug, PartialEq, Eq)]
pub struct Node {
    root: Symbol,
    codon: Option<u32>,
    children: Vec<Rc<Node>>,
}

impl Node {
    pub fn leaf(text: Rc<str>) -> Rc<Self> {
        Rc::new(Self {
            root: Symbol::Terminal(text),
            codon: None,
            children: Vec::new(),
        })
    }

    pub fn branch(
        non_terminal: NonTerminalId,
        codon: u32,
        children: Vec<Rc<Node>>,
    ) -> Rc<Self> {
        debug_assert!(!children.is_empty(), "an expansion needs children");
        Rc::new(Self {
            root: Symbol::NonTerminal(non_terminal),
            codon: Some(codon),
            children,
        })
    }

    pub fn root(&self) -> &Symbol {
        &self.root
    }

    pub fn codon(&self) -> Option<u32> {
        self.codon
    }

    pub fn children(&self) -> &[Rc<Node>] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn leaves(&self) -> Leaves<'_> {
        Leaves::new(self)
    }

    /// The phenotype text of this fragment.
    pub fn render(&self) -> String {
        self.leaves().collect()
    }
}

new_key_type! {
    /// Handle to a node of a [`DerivationTree`].
    pub struct NodeId;
}

/// A node of a materialized tree. `parent` is an index back-reference used
/// for traversal and validation; the tree's arena owns every node.
#[derive(Debug, Clone)]
pub struct TreeNode {
    symbol: Symbol,
    codon: Option<u32>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl TreeNode {
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn codon(&self) -> Option<u32> {
        self.codon
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// A complete derivation tree, one arena-allocated node per derivation step.
#[derive(Debug, Clone)]
pub struct DerivationTree {
    nodes: SlotMap<NodeId, TreeNode>,
    root: NodeId,
}

impl DerivationTree {
    /// Copies a shared fragment into a tree with its own nodes and parent links.
    pub fn from_node(fragment: &Node) -> Self {
        let mut nodes: SlotMap<NodeId, TreeNode> = SlotMap::with_key();
        let root = nodes.insert(TreeNode {
            symbol: fragment.root.clone(),
            codon: fragment.codon,
            children: Vec::with_capacity(fragment.children.len()),
            parent: None,
        });

        let mut stack: Vec<(&Node, NodeId)> = vec![(fragment, root)];
        while let Some((source, id)) = stack.pop() {
            for child in &source.children {
                let child_id = nodes.insert(TreeNode {
                    symbol: child.root.clone(),
                    codon: child.codon,
                    children: Vec::with_capacity(child.children.len()),
                    parent: Some(id),
                });
                nodes[id].children.push(child_id);
                stack.push((child, child_id));
            }
        }

        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn preorder(&self) -> Preorder<'_> {
        Preorder::new(self)
    }

    pub fn phenotype(&self) -> String {
        self.preorder()
            .filter_map(|id| self.nodes[id].symbol.as_terminal())
            .collect()
    }

    /// Codons in the order a decoder consumes them.
    pub fn genome(&self) -> Vec<u32> {
        self.preorder()
            .filter_map(|id| self.nodes[id].codon)
            .collect()
    }

    pub fn used_codons(&self) -> usize {
        self.nodes.values().filter(|node| node.codon.is_some()).count()
    }

    /// Number of node levels on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(self.nodes[id].children.iter().map(|&c| (c, depth + 1)));
        }
        deepest
    }

    /// Checks every expansion against the grammar: the codon must select the
    /// choice whose symbols are exactly the children's roots, and every child
    /// must point back at its parent.
    pub fn validate(&self, grammar: &Grammar) -> Result<(), TreeError> {
        for id in self.preorder() {
            let node = &self.nodes[id];
            let Symbol::NonTerminal(non_terminal) = node.symbol else {
                continue;
            };
            let name = || grammar.name(non_terminal).to_string();

            if node.children.is_empty() {
                return Err(TreeError::Unexpanded {
                    non_terminal: name(),
                });
            }
            let codon = node.codon.ok_or_else(|| TreeError::MissingCodon {
                non_terminal: name(),
            })?;

            let (_, choice) = grammar.select_choice(non_terminal, codon);
            let roots: Vec<Symbol> = node
                .children
                .iter()
                .map(|&child| self.nodes[child].symbol.clone())
                .collect();
            if choice.symbols() != roots.as_slice() {
                return Err(TreeError::CodonMismatch {
                    non_terminal: name(),
                    codon,
                    expected: grammar.display_symbols(choice.symbols()),
                    actual: grammar.display_symbols(&roots),
                });
            }

            if node
                .children
                .iter()
                .any(|&child| self.nodes[child].parent != Some(id))
            {
                return Err(TreeError::BrokenParent {
                    non_terminal: name(),
                });
            }
        }
        Ok(())
    }

    /// Indented outline of the tree, one node per line.
    pub fn pretty(&self, grammar: &Grammar) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, indent)) = stack.pop() {
            let node = &self.nodes[id];
            let _ = match &node.symbol {
                Symbol::NonTerminal(nt) => writeln!(
                    out,
                    "{:indent$}{} [{}]",
                    "",
                    grammar.name(*nt),
                    node.codon.unwrap_or_default(),
                    indent = indent * 2
                ),
                Symbol::Terminal(text) => {
                    writeln!(out, "{:indent$}{:?}", "", text, indent = indent * 2)
                }
            };
            stack.extend(node.children.iter().rev().map(|&c| (c, indent + 1)));
        }
        out
    }
}
