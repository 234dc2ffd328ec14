use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a grammar. All of them are fatal: no
/// assembly run can start from a grammar that failed to load.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("cannot read grammar file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("grammar source contains no rules")]
    EmptyGrammar,
    #[error("lhs should be unique: {0} is defined more than once")]
    DuplicateRule(String),
    #[error("bad use of GE_RANGE: {0}")]
    BadRange(String),
    #[error("{0} needs a dataset variable count, none was supplied")]
    UnresolvedRange(String),
    #[error("rule {rule} references undefined non-terminal {symbol}")]
    UndefinedNonTerminal { rule: String, symbol: String },
    #[error("rule {0} has no production choices")]
    EmptyRule(String),
    #[error("non-terminals can never reach a terminal: {}", .0.join(", "))]
    NoTerminalPath(Vec<String>),
}

/// The requested production is not one of the non-terminal's choices.
///
/// Always an inconsistency between the grammar and the tree being built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodonError {
    #[error("specified choice {choice} is not a valid choice for {non_terminal}")]
    ChoiceNotFound {
        non_terminal: String,
        choice: String,
    },
}

/// A derivation tree that a decoder would not map back to itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {non_terminal} has children but no codon")]
    MissingCodon { non_terminal: String },
    #[error("non-terminal {non_terminal} was never expanded")]
    Unexpanded { non_terminal: String },
    #[error("codon {codon} at {non_terminal} selects [{expected}] but children are [{actual}]")]
    CodonMismatch {
        non_terminal: String,
        codon: u32,
        expected: String,
        actual: String,
    },
    #[error("a child of {non_terminal} does not point back to it")]
    BrokenParent { non_terminal: String },
}

/// Outcomes of an assembly run other than success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Codon(#[from] CodonError),

    #[error("assembled tree is invalid: {0}")]
    InvalidTree(#[from] TreeError),

    #[error("solution renders {actual:?}, expected {expected:?}")]
    PhenotypeMismatch { expected: String, actual: String },

    /// Growth converged without any snippet covering the whole target.
    /// `largest` is the rendering of the biggest snippet found, if any.
    #[error("target string couldn't be parsed using the given grammar")]
    NoSolutionFound { largest: Option<String> },

    /// The configured pass or time cap was hit before a fixed point.
    #[error("search exhausted after {passes} passes without reaching a fixed point")]
    SearchExhausted { passes: usize },

    #[error("assembly cancelled after {passes} passes")]
    Cancelled { passes: usize },
}

pub type GrammarResult<T> = Result<T, GrammarError>;
pub type AssemblyResult<T> = Result<T, AssemblyError>;
