use crate::tree::{DerivationTree, Node, NodeId};

/// Iterator over the terminal leaves of a fragment, left to right.
///
/// Keeps an explicit stack of pending nodes so deep trees cannot overflow
/// the call stack.
pub struct Leaves<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Leaves<'a> {
    pub(crate) fn new(root: &'a Node) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if node.is_leaf() {
                if let Some(text) = node.root().as_terminal() {
                    return Some(text);
                }
                continue;
            }
            // Reverse so the leftmost child is popped first.
            self.stack
                .extend(node.children().iter().rev().map(|child| child.as_ref()));
        }
        None
    }
}

/// Depth-first, left-to-right walk over a materialized tree.
///
/// This is the order in which a decoder consumes codons.
pub struct Preorder<'a> {
    tree: &'a DerivationTree,
    stack: Vec<NodeId>,
}

impl<'a> Preorder<'a> {
    pub(crate) fn new(tree: &'a DerivationTree) -> Self {
        Self {
            tree,
            stack: vec![tree.root()],
        }
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.node(id).children().iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::symbol::{NonTerminalId, Symbol};
    use crate::tree::{DerivationTree, Node};
    use std::rc::Rc;

    fn sample() -> Rc<Node> {
        // <s> -> <a> "+" <a>, <a> -> "x"
        let a = |text: &str| Node::branch(NonTerminalId(1), 2, vec![Node::leaf(Rc::from(text))]);
        Node::branch(
            NonTerminalId(0),
            1,
            vec![a("x"), Node::leaf(Rc::from("+")), a("y")],
        )
    }

    #[test]
    fn test_leaves_in_order() {
        let root = sample();
        let leaves: Vec<&str> = root.leaves().collect();
        assert_eq!(leaves, vec!["x", "+", "y"]);
    }

    #[test]
    fn test_preorder_visits_parents_first() {
        let tree = DerivationTree::from_node(&sample());
        let roots: Vec<Symbol> = tree
            .preorder()
            .map(|id| tree.node(id).symbol().clone())
            .collect();
        assert_eq!(roots.len(), 6);
        assert_eq!(roots[0], Symbol::NonTerminal(NonTerminalId(0)));
        assert_eq!(roots[1], Symbol::NonTerminal(NonTerminalId(1)));
        assert_eq!(roots[2], Symbol::terminal("x"));
        assert_eq!(roots[3], Symbol::terminal("+"));
        assert_eq!(roots[5], Symbol::terminal("y"));
    }
}
