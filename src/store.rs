use crate::grammar::Grammar;
use crate::symbol::{NonTerminalId, Symbol};
use crate::tree::Node;
use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use log::trace;
use slotmap::{new_key_type, SlotMap};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Half-open interval `[start, end)` of byte offsets into the target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start after end");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `other` lies inside this span and is not equal to it.
    pub fn strictly_contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end && self != other
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Identity of a snippet: at most one is retained per key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnippetKey {
    pub span: Span,
    pub non_terminal: NonTerminalId,
}

impl SnippetKey {
    pub fn new(start: usize, end: usize, non_terminal: NonTerminalId) -> Self {
        Self {
            span: Span::new(start, end),
            non_terminal,
        }
    }
}

new_key_type! {
    pub struct SnippetId;
}

/// A derivation fragment known to render exactly `target[span]`.
#[derive(Debug, Clone)]
pub struct Snippet {
    key: SnippetKey,
    tree: Rc<Node>,
    pass: usize,
}

impl Snippet {
    pub fn key(&self) -> SnippetKey {
        self.key
    }

    pub fn span(&self) -> Span {
        self.key.span
    }

    pub fn non_terminal(&self) -> NonTerminalId {
        self.key.non_terminal
    }

    pub fn tree(&self) -> &Rc<Node> {
        &self.tree
    }

    /// Growth pass that created the snippet; seeds belong to pass 0.
    pub fn pass(&self) -> usize {
        self.pass
    }
}

/// Working set of one assembly run.
///
/// Snippets are never mutated once inserted. Lookups by boundary position
/// take a pass number and only return snippets created before that pass,
/// which gives every growth pass a stable view of the store.
#[derive(Debug, Default)]
pub struct SnippetStore {
    snippets: SlotMap<SnippetId, Snippet>,
    by_key: BTreeMap<SnippetKey, SnippetId>,
    starting_at: HashMap<(usize, NonTerminalId), Vec<SnippetId>>,
    ending_at: HashMap<(usize, NonTerminalId), Vec<SnippetId>>,
    /// Keys removed by pruning. They stay occupied so growth cannot
    /// rediscover them.
    retired: HashSet<SnippetKey>,
}

impl SnippetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a snippet unless its key is already taken. The first snippet
    /// found for a key wins.
    pub fn insert(&mut self, key: SnippetKey, tree: Rc<Node>, pass: usize) -> Option<SnippetId> {
        debug_assert_eq!(tree.root(), &Symbol::NonTerminal(key.non_terminal));
        if self.by_key.contains_key(&key) || self.retired.contains(&key) {
            return None;
        }

        let id = self.snippets.insert(Snippet { key, tree, pass });
        self.by_key.insert(key, id);
        self.starting_at
            .entry((key.span.start, key.non_terminal))
            .or_default()
            .push(id);
        self.ending_at
            .entry((key.span.end, key.non_terminal))
            .or_default()
            .push(id);
        trace!("inserted {} {} in pass {}", key.span, key.non_terminal, pass);
        Some(id)
    }

    pub fn get(&self, key: &SnippetKey) -> Option<&Snippet> {
        self.by_key.get(key).map(|&id| &self.snippets[id])
    }

    pub fn snippet(&self, id: SnippetId) -> &Snippet {
        &self.snippets[id]
    }

    pub fn contains(&self, key: &SnippetKey) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    /// Snippets in key order: by start, then end, then non-terminal.
    pub fn iter(&self) -> impl Iterator<Item = &Snippet> + '_ {
        self.by_key.values().map(|&id| &self.snippets[id])
    }

    /// Ids of snippets created before `pass`, in key order.
    pub(crate) fn ids_before(&self, pass: usize) -> Vec<SnippetId> {
        self.by_key
            .values()
            .copied()
            .filter(|&id| self.snippets[id].pass < pass)
            .collect()
    }

    /// Snippets rooted at `non_terminal` starting at `start`, created before `pass`.
    pub fn starting_at(
        &self,
        start: usize,
        non_terminal: NonTerminalId,
        pass: usize,
    ) -> impl Iterator<Item = &Snippet> + '_ {
        self.lookup(&self.starting_at, start, non_terminal, pass)
    }

    /// Snippets rooted at `non_terminal` ending at `end`, created before `pass`.
    pub fn ending_at(
        &self,
        end: usize,
        non_terminal: NonTerminalId,
        pass: usize,
    ) -> impl Iterator<Item = &Snippet> + '_ {
        self.lookup(&self.ending_at, end, non_terminal, pass)
    }

    fn lookup<'a>(
        &'a self,
        index: &'a HashMap<(usize, NonTerminalId), Vec<SnippetId>>,
        position: usize,
        non_terminal: NonTerminalId,
        pass: usize,
    ) -> impl Iterator<Item = &'a Snippet> + 'a {
        index
            .get(&(position, non_terminal))
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(move |&id| &self.snippets[id])
            .filter(move |snippet| snippet.pass < pass)
    }

    /// The snippet covering the most text. Ties go to the lowest start, then
    /// to the non-terminal whose name sorts first.
    pub fn largest(&self, grammar: &Grammar) -> Option<&Snippet> {
        self.snippets.values().min_by(|a, b| extraction_order(grammar, a, b))
    }

    /// Removes every snippet whose span lies strictly inside another
    /// snippet's span. Returns the number removed.
    ///
    /// Must only run between passes.
    pub fn prune_subsumed(&mut self) -> usize {
        // Sorted by start, widest first, every container of a span comes
        // before it.
        let mut spans: Vec<Span> = self.by_key.keys().map(|key| key.span).collect();
        spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        spans.dedup();

        let mut subsumed: HashSet<Span> = HashSet::new();
        let mut reach: Option<usize> = None;
        for span in spans {
            match reach {
                Some(end) if span.end <= end => {
                    subsumed.insert(span);
                }
                _ => reach = Some(span.end),
            }
        }

        let doomed: Vec<SnippetId> = self
            .by_key
            .iter()
            .filter(|(key, _)| subsumed.contains(&key.span))
            .map(|(_, &id)| id)
            .collect();

        for &id in &doomed {
            if let Some(snippet) = self.snippets.remove(id) {
                let key = snippet.key;
                self.by_key.remove(&key);
                self.retired.insert(key);
                for index in [&mut self.starting_at, &mut self.ending_at] {
                    for ids in index.values_mut() {
                        ids.retain(|&other| other != id);
                    }
                }
            }
        }
        self.starting_at.retain(|_, ids| !ids.is_empty());
        self.ending_at.retain(|_, ids| !ids.is_empty());
        doomed.len()
    }
}

fn extraction_order(grammar: &Grammar, a: &Snippet, b: &Snippet) -> Ordering {
    b.span()
        .len()
        .cmp(&a.span().len())
        .then(a.span().start.cmp(&b.span().start))
        .then_with(|| grammar.name(a.non_terminal()).cmp(grammar.name(b.non_terminal())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_snippet(grammar: &Grammar, nt: &str, text: &str) -> (NonTerminalId, Rc<Node>) {
        let id = grammar.non_terminal(nt).unwrap();
        let codon = grammar.codon_for(id, &[Symbol::terminal(text)]).unwrap();
        (id, Node::branch(id, codon, vec![Node::leaf(Rc::from(text))]))
    }

    #[test]
    fn test_first_found_wins() {
        let grammar: Grammar = "<a> ::= x | y\n".parse().unwrap();
        let (a, x) = leaf_snippet(&grammar, "<a>", "x");
        let (_, y) = leaf_snippet(&grammar, "<a>", "y");
        let mut store = SnippetStore::new();

        let key = SnippetKey::new(0, 1, a);
        assert!(store.insert(key, x, 0).is_some());
        assert!(store.insert(key, y, 1).is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&key).unwrap().tree().render(), "x");
        assert_eq!(store.get(&key).unwrap().pass(), 0);
    }

    #[test]
    fn test_lookups_respect_pass() {
        let grammar: Grammar = "<a> ::= x\n".parse().unwrap();
        let (a, x) = leaf_snippet(&grammar, "<a>", "x");
        let mut store = SnippetStore::new();
        store.insert(SnippetKey::new(0, 1, a), x.clone(), 0);
        store.insert(SnippetKey::new(1, 2, a), x, 2);

        assert_eq!(store.starting_at(0, a, 1).count(), 1);
        assert_eq!(store.starting_at(1, a, 1).count(), 0);
        assert_eq!(store.starting_at(1, a, 3).count(), 1);
        assert_eq!(store.ending_at(2, a, 3).count(), 1);
        assert_eq!(store.ending_at(1, a, 0).count(), 0);
        assert_eq!(store.ids_before(1).len(), 1);
    }

    #[test]
    fn test_largest_tie_break() {
        let grammar: Grammar = "<b> ::= x\n<a> ::= x\n".parse().unwrap();
        let (b, xb) = leaf_snippet(&grammar, "<b>", "x");
        let (a, xa) = leaf_snippet(&grammar, "<a>", "x");
        let mut store = SnippetStore::new();

        // Both span length 1: lowest start wins first.
        store.insert(SnippetKey::new(2, 3, a), xa.clone(), 0);
        store.insert(SnippetKey::new(1, 2, b), xb.clone(), 0);
        assert_eq!(store.largest(&grammar).unwrap().key(), SnippetKey::new(1, 2, b));

        // Same span: "<a>" sorts before "<b>" although <b> has the lower id.
        store.insert(SnippetKey::new(1, 2, a), xa, 0);
        assert_eq!(store.largest(&grammar).unwrap().key(), SnippetKey::new(1, 2, a));
    }

    #[test]
    fn test_iter_in_key_order() {
        let grammar: Grammar = "<a> ::= x\n".parse().unwrap();
        let (a, x) = leaf_snippet(&grammar, "<a>", "x");
        let mut store = SnippetStore::new();
        for start in [3, 0, 2, 1] {
            store.insert(SnippetKey::new(start, start + 1, a), x.clone(), 0);
        }
        let starts: Vec<usize> = store.iter().map(|s| s.span().start).collect();
        assert_eq!(starts, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_prune_subsumed_retires_keys() {
        let grammar: Grammar = "<a> ::= x\n".parse().unwrap();
        let (a, x) = leaf_snippet(&grammar, "<a>", "x");
        let mut store = SnippetStore::new();
        store.insert(SnippetKey::new(0, 3, a), x.clone(), 1);
        store.insert(SnippetKey::new(0, 1, a), x.clone(), 0);
        store.insert(SnippetKey::new(1, 2, a), x.clone(), 0);
        store.insert(SnippetKey::new(3, 4, a), x.clone(), 0);

        assert!(Span::new(0, 3).strictly_contains(&Span::new(1, 2)));
        assert_eq!(store.prune_subsumed(), 2);
        let keys: Vec<SnippetKey> = store.iter().map(Snippet::key).collect();
        assert_eq!(keys, vec![SnippetKey::new(0, 3, a), SnippetKey::new(3, 4, a)]);
        assert_eq!(store.starting_at(1, a, 5).count(), 0);

        // A retired key cannot come back.
        assert!(store.insert(SnippetKey::new(0, 1, a), x, 2).is_none());
        assert!(!store.contains(&SnippetKey::new(0, 1, a)));
    }

    #[test]
    fn test_prune_keeps_equal_spans() {
        let grammar: Grammar = "<a> ::= <b>\n<b> ::= x\n".parse().unwrap();
        let (b, x) = leaf_snippet(&grammar, "<b>", "x");
        let a = grammar.non_terminal("<a>").unwrap();
        let codon = grammar.codon_for(a, &[Symbol::NonTerminal(b)]).unwrap();
        let mut store = SnippetStore::new();
        store.insert(SnippetKey::new(0, 1, b), x.clone(), 0);
        store.insert(SnippetKey::new(0, 1, a), Node::branch(a, codon, vec![x]), 1);
        assert_eq!(store.prune_subsumed(), 0);
        assert_eq!(store.len(), 2);
    }
}
