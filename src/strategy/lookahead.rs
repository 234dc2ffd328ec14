use super::{expand, AssemblyStrategy};
use crate::error::CodonError;
use crate::grammar::Grammar;
use crate::matcher::SnippetSource;
use crate::store::{SnippetKey, SnippetStore};
use crate::symbol::NonTerminalId;
use crate::tree::Node;
use std::rc::Rc;

/// Single sweep over an ordered worklist.
///
/// The worklist starts as the store in key order. Each entry is reduced by
/// every template it fits, filling the other slots only from terminals and
/// from entries earlier in the worklist, and keeping the first fill found
/// per template slot. Parents go into the worklist right after the entry
/// that produced them, so they are reduced before the sweep moves on.
///
/// Cheap, and incomplete: when a slot has several fillers only the first
/// complete fill is kept, and if its key is already taken the others are
/// never tried.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lookahead;

struct Entry {
    key: SnippetKey,
    tree: Rc<Node>,
}

/// The worklist entries before the one being reduced.
struct Prior<'a>(&'a [Entry]);

impl SnippetSource for Prior<'_> {
    fn starting_at(&self, start: usize, non_terminal: NonTerminalId) -> Vec<(usize, Rc<Node>)> {
        self.0
            .iter()
            .filter(|e| e.key.span.start == start && e.key.non_terminal == non_terminal)
            .map(|e| (e.key.span.end, e.tree.clone()))
            .collect()
    }

    fn ending_at(&self, end: usize, non_terminal: NonTerminalId) -> Vec<(usize, Rc<Node>)> {
        self.0
            .iter()
            .filter(|e| e.key.span.end == end && e.key.non_terminal == non_terminal)
            .map(|e| (e.key.span.start, e.tree.clone()))
            .collect()
    }
}

impl AssemblyStrategy for Lookahead {
    fn name(&self) -> &'static str {
        "lookahead"
    }

    fn grow(
        &self,
        grammar: &Grammar,
        target: &str,
        store: &mut SnippetStore,
        pass: usize,
    ) -> Result<usize, CodonError> {
        let mut worklist: Vec<Entry> = store
            .iter()
            .map(|s| Entry {
                key: s.key(),
                tree: s.tree().clone(),
            })
            .collect();

        let mut added = 0;
        let mut index = 0;
        while index < worklist.len() {
            let (prior, rest) = worklist.split_at(index);
            let entry = &rest[0];
            let candidates = expand(
                grammar,
                target,
                entry.key.span,
                &entry.tree,
                entry.key.non_terminal,
                &Prior(prior),
                Some(1),
            )?;

            let mut insert_at = index + 1;
            for candidate in candidates {
                if store.insert(candidate.key, candidate.tree.clone(), pass).is_some() {
                    worklist.insert(
                        insert_at,
                        Entry {
                            key: candidate.key,
                            tree: candidate.tree,
                        },
                    );
                    insert_at += 1;
                    added += 1;
                }
            }
            index += 1;
        }
        Ok(added)
    }

    fn single_pass(&self) -> bool {
        true
    }
}
