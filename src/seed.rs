use crate::error::CodonError;
use crate::grammar::Grammar;
use crate::store::{SnippetKey, SnippetStore};
use crate::symbol::Symbol;
use crate::tree::Node;
use log::debug;
use std::rc::Rc;

/// Builds the initial store: one leaf snippet per terminal occurrence and
/// per rule owning that terminal as a whole choice.
///
/// Terminals are visited in lexicographic order. Each one is scanned greedily
/// for non-overlapping occurrences, so `"aa"` in `"aaa"` is only found at 0.
/// Empty terminals are never seeded.
pub fn seed(grammar: &Grammar, target: &str) -> Result<SnippetStore, CodonError> {
    let mut store = SnippetStore::new();

    for (text, owners) in grammar.terminal_owners() {
        if text.is_empty() {
            continue;
        }

        let symbol = Symbol::terminal(text);
        let mut codons = Vec::with_capacity(owners.len());
        for &owner in owners {
            codons.push((owner, grammar.codon_for(owner, std::slice::from_ref(&symbol))?));
        }

        let leaf = Node::leaf(Rc::from(text));
        let mut found = 0;
        for (start, _) in target.match_indices(text) {
            found += 1;
            for &(owner, codon) in &codons {
                let key = SnippetKey::new(start, start + text.len(), owner);
                store.insert(key, Node::branch(owner, codon, vec![leaf.clone()]), 0);
            }
        }
        if found > 0 {
            debug!("terminal {:?}: {} occurrences, {} owners", text, found, owners.len());
        }
    }

    debug!("seeded {} snippets", store.len());
    Ok(store)
}
