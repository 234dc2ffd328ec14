use crate::config::{Acceptance, AssemblyConfig};
use crate::error::{AssemblyError, AssemblyResult, CodonError};
use crate::grammar::Grammar;
use crate::seed::seed;
use crate::store::{SnippetKey, SnippetStore};
use crate::strategy::AssemblyStrategy;
use crate::symbol::NonTerminalId;
use crate::tree::DerivationTree;
use log::{debug, info};
use std::time::Instant;

/// Why growth stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthStatus {
    /// The snippet under this key renders the whole target.
    Solved(SnippetKey),
    /// A pass added nothing, or a single-pass strategy finished.
    Converged,
    /// The pass or time cap was reached first.
    Exhausted,
    /// The cancellation flag was raised.
    Cancelled,
}

/// The store at the end of a run, and how the run ended.
#[derive(Debug)]
pub struct Growth {
    pub store: SnippetStore,
    pub passes: usize,
    pub status: GrowthStatus,
}

/// A derivation of the target, with the genome a decoder needs to rebuild it.
#[derive(Debug, Clone)]
pub struct Solution {
    pub tree: DerivationTree,
    pub phenotype: String,
    pub genome: Vec<u32>,
    pub root: NonTerminalId,
    pub passes: usize,
    /// Snippets in the store when the solution was found.
    pub snippet_count: usize,
}

impl Solution {
    pub fn used_codons(&self) -> usize {
        self.genome.len()
    }
}

/// Builds derivation trees for target strings under one grammar.
///
/// # Example
///
/// ```
/// use reverse_ge_rs::{Assembler, Grammar};
///
/// let grammar: Grammar = "<e> ::= <e>+<v> | <v>\n<v> ::= x | y\n".parse().unwrap();
/// let solution = Assembler::new(&grammar).assemble("x+y+x").unwrap();
///
/// assert_eq!(solution.phenotype, "x+y+x");
/// assert_eq!(solution.genome, vec![2, 2, 3, 2, 3, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct Assembler<'g> {
    grammar: &'g Grammar,
    config: AssemblyConfig,
}

impl<'g> Assembler<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            config: AssemblyConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AssemblyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Seeds a store for `target` and grows it with the configured strategy.
    pub fn grow(&self, target: &str) -> Result<Growth, CodonError> {
        self.grow_with(self.config.strategy.strategy(), target)
    }

    pub fn grow_with(&self, strategy: &dyn AssemblyStrategy, target: &str) -> Result<Growth, CodonError> {
        info!("target {:?}, strategy {}", target, strategy.name());
        let started = Instant::now();
        let mut store = seed(self.grammar, target)?;
        let mut passes = 0;
        let mut added = 0;

        let status = loop {
            if let Some(key) = self.accepted(&store, target) {
                break GrowthStatus::Solved(key);
            }
            if passes > 0 && (added == 0 || strategy.single_pass()) {
                break GrowthStatus::Converged;
            }
            if self.config.is_cancelled() {
                break GrowthStatus::Cancelled;
            }
            let out_of_passes = self.config.max_passes.is_some_and(|max| passes >= max);
            let out_of_time = self
                .config
                .time_limit
                .is_some_and(|limit| started.elapsed() >= limit);
            if out_of_passes || out_of_time {
                break GrowthStatus::Exhausted;
            }

            passes += 1;
            let before = store.len();
            added = strategy.grow(self.grammar, target, &mut store, passes)?;
            debug!("pass {}: {} -> {}", passes, before, store.len());

            if self.config.prune_subsumed {
                let pruned = store.prune_subsumed();
                if pruned > 0 {
                    debug!("pass {}: pruned {} subsumed snippets", passes, pruned);
                }
            }
        };

        Ok(Growth {
            store,
            passes,
            status,
        })
    }

    /// Finds a derivation of `target` and checks that it decodes back to it.
    pub fn assemble(&self, target: &str) -> AssemblyResult<Solution> {
        self.assemble_with(self.config.strategy.strategy(), target)
    }

    pub fn assemble_with(&self, strategy: &dyn AssemblyStrategy, target: &str) -> AssemblyResult<Solution> {
        let growth = self.grow_with(strategy, target)?;
        let passes = growth.passes;

        let key = match growth.status {
            GrowthStatus::Solved(key) => key,
            GrowthStatus::Converged => {
                let largest = growth.store.largest(self.grammar).map(|s| s.tree().render());
                info!("no parse found; largest snippet {:?}", largest);
                return Err(AssemblyError::NoSolutionFound { largest });
            }
            GrowthStatus::Exhausted => return Err(AssemblyError::SearchExhausted { passes }),
            GrowthStatus::Cancelled => return Err(AssemblyError::Cancelled { passes }),
        };

        let Some(snippet) = growth.store.get(&key) else {
            unreachable!("solved key {key:?} is not in the store");
        };
        let tree = DerivationTree::from_node(snippet.tree());
        tree.validate(self.grammar)?;

        let phenotype = tree.phenotype();
        if phenotype != target {
            return Err(AssemblyError::PhenotypeMismatch {
                expected: target.to_string(),
                actual: phenotype,
            });
        }

        let genome = tree.genome();
        info!(
            "solved {} in {} passes: {} snippets, {} codons",
            self.grammar.name(key.non_terminal),
            passes,
            growth.store.len(),
            genome.len()
        );
        Ok(Solution {
            tree,
            phenotype,
            genome,
            root: key.non_terminal,
            passes,
            snippet_count: growth.store.len(),
        })
    }

    fn accepted(&self, store: &SnippetStore, target: &str) -> Option<SnippetKey> {
        if target.is_empty() {
            return None;
        }
        match self.config.acceptance {
            Acceptance::StartSymbol => {
                let key = SnippetKey::new(0, target.len(), self.grammar.start_symbol());
                store.contains(&key).then_some(key)
            }
            Acceptance::AnyNonTerminal => {
                let largest = store.largest(self.grammar)?;
                (largest.tree().render() == target).then(|| largest.key())
            }
        }
    }
}
