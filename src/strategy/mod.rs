//! Growth strategies.
//!
//! Both strategies grow the same [`SnippetStore`] with the same template
//! matcher. They differ in which snippets the matcher may use to fill
//! non-terminal slots and in how often they sweep the store.

mod fixed_point;
mod lookahead;

pub use fixed_point::FixedPoint;
pub use lookahead::Lookahead;

use crate::config::StrategyKind;
use crate::error::CodonError;
use crate::grammar::Grammar;
use crate::matcher::{fill_template, SnippetSource};
use crate::store::{SnippetKey, SnippetStore, Span};
use crate::symbol::NonTerminalId;
use crate::tree::Node;
use std::rc::Rc;

/// One way of growing a seeded store towards a full parse.
pub trait AssemblyStrategy {
    fn name(&self) -> &'static str;

    /// Runs one growth pass, stamping new snippets with `pass`.
    /// Returns the number of snippets added.
    fn grow(
        &self,
        grammar: &Grammar,
        target: &str,
        store: &mut SnippetStore,
        pass: usize,
    ) -> Result<usize, CodonError>;

    /// A strategy that finishes in one sweep is never run a second time.
    fn single_pass(&self) -> bool {
        false
    }
}

impl StrategyKind {
    pub fn strategy(self) -> &'static dyn AssemblyStrategy {
        match self {
            StrategyKind::FixedPoint => &FixedPoint,
            StrategyKind::Lookahead => &Lookahead,
        }
    }
}

/// A parent snippet proposed by a template application.
pub(crate) struct Candidate {
    pub key: SnippetKey,
    pub tree: Rc<Node>,
}

/// Applies every climb and concatenation template that `non_terminal`
/// can fill, with the anchor snippet in each possible slot.
pub(crate) fn expand<S: SnippetSource + ?Sized>(
    grammar: &Grammar,
    target: &str,
    anchor_span: Span,
    anchor: &Rc<Node>,
    non_terminal: NonTerminalId,
    source: &S,
    limit: Option<usize>,
) -> Result<Vec<Candidate>, CodonError> {
    let mut candidates = Vec::new();
    for template in grammar.templates().all(non_terminal) {
        let codon = grammar.codon_for(template.owner, &template.symbols)?;
        for loc in template.positions_of(non_terminal) {
            let fills = fill_template(target, &template.symbols, loc, anchor_span, anchor, source, limit);
            candidates.extend(fills.into_iter().map(|fill| Candidate {
                key: SnippetKey {
                    span: fill.span,
                    non_terminal: template.owner,
                },
                tree: Node::branch(template.owner, codon, fill.children),
            }));
        }
    }
    Ok(candidates)
}
