use super::{expand, AssemblyStrategy};
use crate::error::CodonError;
use crate::grammar::Grammar;
use crate::matcher::SnippetSource;
use crate::store::SnippetStore;
use crate::symbol::NonTerminalId;
use crate::tree::Node;
use std::rc::Rc;

/// Exhaustive growth. Every pass applies every template to every snippet
/// that existed when the pass began, trying all slot fillers; the engine
/// repeats passes until one adds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPoint;

/// The store as it stood before `pass` began.
struct Snapshot<'a> {
    store: &'a SnippetStore,
    pass: usize,
}

impl SnippetSource for Snapshot<'_> {
    fn starting_at(&self, start: usize, non_terminal: NonTerminalId) -> Vec<(usize, Rc<Node>)> {
        self.store
            .starting_at(start, non_terminal, self.pass)
            .map(|s| (s.span().end, s.tree().clone()))
            .collect()
    }

    fn ending_at(&self, end: usize, non_terminal: NonTerminalId) -> Vec<(usize, Rc<Node>)> {
        self.store
            .ending_at(end, non_terminal, self.pass)
            .map(|s| (s.span().start, s.tree().clone()))
            .collect()
    }
}

impl AssemblyStrategy for FixedPoint {
    fn name(&self) -> &'static str {
        "fixed-point"
    }

    fn grow(
        &self,
        grammar: &Grammar,
        target: &str,
        store: &mut SnippetStore,
        pass: usize,
    ) -> Result<usize, CodonError> {
        let mut added = 0;
        for id in store.ids_before(pass) {
            let candidates = {
                let snippet = store.snippet(id);
                let snapshot = Snapshot { store: &*store, pass };
                expand(
                    grammar,
                    target,
                    snippet.span(),
                    snippet.tree(),
                    snippet.non_terminal(),
                    &snapshot,
                    None,
                )?
            };
            for candidate in candidates {
                if store.insert(candidate.key, candidate.tree, pass).is_some() {
                    added += 1;
                }
            }
        }
        Ok(added)
    }
}
