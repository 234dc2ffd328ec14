//! Slot filling for climb and concatenation templates.
//!
//! A template is a production choice with one slot already taken by an
//! anchor snippet. [`fill_template`] completes the remaining slots outward
//! from the anchor, alternating left and right, and returns every complete
//! assignment it finds. Terminal slots must match the target text next to
//! the growing boundary. Non-terminal slots take any snippet the
//! [`SnippetSource`] offers at that boundary, and each candidate opens a new
//! branch of the search.

use crate::store::Span;
use crate::symbol::{NonTerminalId, Symbol};
use crate::tree::Node;
use std::rc::Rc;

/// Where the matcher looks for non-terminal slot fillers.
pub trait SnippetSource {
    /// `(end, tree)` of each snippet rooted at `non_terminal` that begins at `start`.
    fn starting_at(&self, start: usize, non_terminal: NonTerminalId) -> Vec<(usize, Rc<Node>)>;

    /// `(start, tree)` of each snippet rooted at `non_terminal` that ends at `end`.
    fn ending_at(&self, end: usize, non_terminal: NonTerminalId) -> Vec<(usize, Rc<Node>)>;
}

/// One complete assignment of a template's slots.
#[derive(Debug, Clone)]
pub struct Fill {
    pub span: Span,
    /// One node per template symbol, in template order.
    pub children: Vec<Rc<Node>>,
}

struct Partial {
    step: usize,
    left: usize,
    right: usize,
    children: Vec<Option<Rc<Node>>>,
}

/// Fills `symbols` around the anchor sitting at position `loc`.
///
/// Search is depth-first over an explicit stack. Candidates are explored in
/// the order the source returns them, so with `limit` set the result is the
/// first `limit` fills in that order.
pub fn fill_template<S: SnippetSource + ?Sized>(
    target: &str,
    symbols: &[Symbol],
    loc: usize,
    anchor_span: Span,
    anchor: &Rc<Node>,
    source: &S,
    limit: Option<usize>,
) -> Vec<Fill> {
    debug_assert!(loc < symbols.len());
    let mut fills = Vec::new();
    if crosses_boundary(target, symbols, loc, anchor_span) {
        return fills;
    }

    let order = fill_order(loc, symbols.len());
    let mut children = vec![None; symbols.len()];
    children[loc] = Some(Rc::clone(anchor));
    let mut stack = vec![Partial {
        step: 0,
        left: anchor_span.start,
        right: anchor_span.end,
        children,
    }];

    while let Some(partial) = stack.pop() {
        let Some(&position) = order.get(partial.step) else {
            fills.push(Fill {
                span: Span::new(partial.left, partial.right),
                children: partial.children.into_iter().flatten().collect(),
            });
            if limit.is_some_and(|n| fills.len() >= n) {
                break;
            }
            continue;
        };

        let leftward = position < loc;
        let mut next: Vec<(usize, usize, Rc<Node>)> = Vec::new();
        match &symbols[position] {
            Symbol::Terminal(text) => {
                if leftward {
                    if target[..partial.left].ends_with(&**text) {
                        next.push((partial.left - text.len(), partial.right, Node::leaf(text.clone())));
                    }
                } else if target[partial.right..].starts_with(&**text) {
                    next.push((partial.left, partial.right + text.len(), Node::leaf(text.clone())));
                }
            }
            Symbol::NonTerminal(nt) => {
                if leftward {
                    for (start, tree) in source.ending_at(partial.left, *nt) {
                        next.push((start, partial.right, tree));
                    }
                } else {
                    for (end, tree) in source.starting_at(partial.right, *nt) {
                        next.push((partial.left, end, tree));
                    }
                }
            }
        }

        // Reversed so the first candidate is popped first.
        for (left, right, node) in next.into_iter().rev() {
            let mut children = partial.children.clone();
            children[position] = Some(node);
            stack.push(Partial {
                step: partial.step + 1,
                left,
                right,
                children,
            });
        }
    }

    fills
}

/// Slot positions other than `loc`, alternating outward: loc-1, loc+1, loc-2, ...
fn fill_order(loc: usize, len: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(len.saturating_sub(1));
    let (mut left, mut right) = (loc, loc + 1);
    while left > 0 || right < len {
        if left > 0 {
            left -= 1;
            order.push(left);
        }
        if right < len {
            order.push(right);
            right += 1;
        }
    }
    order
}

/// True when the anchor already touches an end of the target that some
/// slot would have to extend past. Snippets never span empty text, so any
/// non-terminal slot needs at least one byte.
fn crosses_boundary(target: &str, symbols: &[Symbol], loc: usize, span: Span) -> bool {
    let needs_text = |slots: &[Symbol]| {
        slots
            .iter()
            .any(|s| s.as_terminal().map_or(true, |text| !text.is_empty()))
    };
    (span.start == 0 && needs_text(&symbols[..loc]))
        || (span.end == target.len() && needs_text(&symbols[loc + 1..]))
}
