//! # Reverse GE - Genome Reconstruction from Phenotypes
//!
//! Grammatical Evolution maps a genome of integer codons to a program by
//! expanding non-terminals of a BNF grammar, choosing the production
//! `codon % choice_count` at each step. This crate runs that mapping
//! backwards: given a grammar and a target string, it assembles a derivation
//! tree for the string and the genome a standard decoder turns back into it.
//!
//! Assembly works bottom-up on *snippets*, derivation fragments that render
//! an exact substring of the target:
//! 1. **Seeding**: every occurrence of a terminal that some rule produces on
//!    its own becomes a snippet for that rule
//! 2. **Growth**: production choices are used as templates; a snippet fills
//!    one slot, and neighbouring text and snippets fill the rest
//! 3. **Extraction**: a snippet covering the whole target is materialized
//!    into a [`DerivationTree`], validated, and read out as a genome
//!
//! ## Example
//!
//! ```
//! use reverse_ge_rs::{Assembler, Grammar};
//!
//! let grammar: Grammar = "<e> ::= (<e><o><e>) | <v>\n<o> ::= + | *\n<v> ::= x | y\n"
//!     .parse()
//!     .unwrap();
//!
//! let solution = Assembler::new(&grammar).assemble("(x*(y+x))").unwrap();
//! assert_eq!(solution.phenotype, "(x*(y+x))");
//! assert!(solution.genome.iter().all(|&c| c < grammar.codon_size()));
//! ```
//!
//! ## Strategies
//!
//! - [`FixedPoint`] (default) repeats passes until nothing new is found
//! - [`Lookahead`] makes one ordered sweep and may miss parses

mod bnf;
mod codon;
mod config;
mod engine;
mod error;
mod grammar;
mod iter;
mod matcher;
mod seed;
mod store;
mod strategy;
mod symbol;
mod templates;
mod tree;

#[cfg(test)]
mod tests;

pub use config::{Acceptance, AssemblyConfig, ParseOptions, StrategyKind};
pub use engine::{Assembler, Growth, GrowthStatus, Solution};
pub use error::{AssemblyError, AssemblyResult, CodonError, GrammarError, GrammarResult, TreeError};
pub use grammar::{Grammar, Rule};
pub use iter::{Leaves, Preorder};
pub use matcher::{fill_template, Fill, SnippetSource};
pub use seed::seed;
pub use store::{Snippet, SnippetId, SnippetKey, SnippetStore, Span};
pub use strategy::{AssemblyStrategy, FixedPoint, Lookahead};
pub use symbol::{Choice, NonTerminalId, Symbol};
pub use templates::{Template, TemplateIndex, TemplateKind};
pub use tree::{DerivationTree, Node, NodeId, TreeNode};
