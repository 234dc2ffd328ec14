use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Options consulted while loading a grammar.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Column count of the dataset, substituted for `GE_RANGE:dataset_n_vars`.
    pub dataset_n_vars: Option<usize>,
}

impl ParseOptions {
    pub fn with_dataset_n_vars(mut self, n_vars: usize) -> Self {
        self.dataset_n_vars = Some(n_vars);
        self
    }
}

/// Which growth strategy an [`Assembler`](crate::Assembler) runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    /// Climb and concatenate until no pass adds a snippet.
    #[default]
    FixedPoint,
    /// One ordered sweep, extending only through terminals and earlier entries.
    Lookahead,
}

/// What counts as a complete parse of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Acceptance {
    /// A full-coverage snippet rooted at the grammar's start symbol.
    #[default]
    StartSymbol,
    /// The largest snippet, whatever its root, if it renders the whole target.
    AnyNonTerminal,
}

/// Knobs for one assembly run.
#[derive(Debug, Clone, Default)]
pub struct AssemblyConfig {
    pub strategy: StrategyKind,
    pub acceptance: Acceptance,
    /// Stop with `SearchExhausted` after this many growth passes.
    pub max_passes: Option<usize>,
    /// Stop with `SearchExhausted` once this much wall-clock time has passed.
    pub time_limit: Option<Duration>,
    /// Drop snippets strictly inside another snippet's span between passes.
    pub prune_subsumed: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl AssemblyConfig {
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_acceptance(mut self, acceptance: Acceptance) -> Self {
        self.acceptance = acceptance;
        self
    }

    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = Some(passes);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_prune_subsumed(mut self, prune: bool) -> Self {
        self.prune_subsumed = prune;
        self
    }

    /// Registers a flag that aborts the run at the next pass boundary once set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
