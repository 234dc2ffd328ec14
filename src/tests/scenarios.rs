use super::support::{decode, grammar, EXPR};
use crate::config::{Acceptance, AssemblyConfig, ParseOptions, StrategyKind};
use crate::engine::{Assembler, GrowthStatus};
use crate::error::AssemblyError;
use crate::grammar::Grammar;
use crate::store::SnippetKey;
use crate::strategy::{FixedPoint, Lookahead};
use crate::symbol::Symbol;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

fn grammar_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("grammars").join(name)
}

#[test]
fn test_climb_through_unit_production() {
    let g = grammar("<a> ::= <b>\n<b> ::= x | y\n");
    let a = g.start_symbol();
    let b = g.non_terminal("<b>").unwrap();

    let growth = Assembler::new(&g).grow("x").unwrap();
    assert_eq!(growth.status, GrowthStatus::Solved(SnippetKey::new(0, 1, a)));
    let climbed = growth.store.get(&SnippetKey::new(0, 1, a)).unwrap();
    assert_eq!(climbed.tree().children().len(), 1);
    assert_eq!(climbed.tree().children()[0].root(), &Symbol::NonTerminal(b));

    let solution = Assembler::new(&g).assemble("x").unwrap();
    assert_eq!(solution.genome, vec![1, 2]);
    assert_eq!(solution.tree.depth(), 3);
}

#[test]
fn test_concatenation() {
    let g = grammar("<S> ::= <A><B>\n<A> ::= a\n<B> ::= b\n");
    let solution = Assembler::new(&g).assemble("ab").unwrap();
    assert_eq!(solution.root, g.start_symbol());
    assert_eq!(solution.phenotype, "ab");
    assert_eq!(solution.genome, vec![1, 1, 1]);
    assert_eq!(solution.tree.len(), 5);
}

#[test]
fn test_boundary_rejection() {
    let g = grammar("<S> ::= x<A>\n<A> ::= y | x\n");
    let s = g.start_symbol();

    let growth = Assembler::new(&g).grow("yx").unwrap();
    assert_eq!(growth.status, GrowthStatus::Converged);
    assert!(growth.store.iter().all(|snippet| snippet.non_terminal() != s));

    let err = Assembler::new(&g).assemble("yx").unwrap_err();
    assert_eq!(
        err,
        AssemblyError::NoSolutionFound {
            largest: Some("y".to_string())
        }
    );
}

#[test]
fn test_unknown_text_fails_cleanly() {
    let g = grammar(EXPR);
    let err = Assembler::new(&g).assemble("(x+z)").unwrap_err();
    assert!(matches!(err, AssemblyError::NoSolutionFound { .. }));
}

#[test]
fn test_nested_expression() {
    let g = grammar(EXPR);
    let target = "((x+1)*(y-x))";
    let solution = Assembler::new(&g).assemble(target).unwrap();

    assert_eq!(solution.phenotype, target);
    assert_eq!(solution.tree.validate(&g), Ok(()));
    assert_eq!(decode(&g, g.start_symbol(), &solution.genome).as_deref(), Some(target));
    assert_eq!(solution.used_codons(), solution.tree.used_codons());
    assert!(solution.snippet_count > 0);
    assert!(solution.passes >= 3);
}

#[test]
fn test_start_symbol_acceptance() {
    let g = grammar("<s> ::= <a>!\n<a> ::= x\n");
    let a = g.non_terminal("<a>").unwrap();

    let err = Assembler::new(&g).assemble("x").unwrap_err();
    assert_eq!(
        err,
        AssemblyError::NoSolutionFound {
            largest: Some("x".to_string())
        }
    );

    let loose = AssemblyConfig::default().with_acceptance(Acceptance::AnyNonTerminal);
    let solution = Assembler::new(&g).with_config(loose).assemble("x").unwrap();
    assert_eq!(solution.root, a);
    assert_eq!(solution.genome, vec![1]);
    assert_eq!(decode(&g, a, &solution.genome).as_deref(), Some("x"));
}

#[test]
fn test_lookahead_strategy() {
    let g = grammar(EXPR);
    let config = AssemblyConfig::default().with_strategy(StrategyKind::Lookahead);
    let assembler = Assembler::new(&g).with_config(config);

    let solution = assembler.assemble("(x*(y+1))").unwrap();
    assert_eq!(solution.passes, 1);
    assert_eq!(decode(&g, g.start_symbol(), &solution.genome).as_deref(), Some("(x*(y+1))"));

    let growth = assembler.grow("x+").unwrap();
    assert_eq!(growth.status, GrowthStatus::Converged);
    assert_eq!(growth.passes, 1);
}

#[test]
fn test_strategies_agree_on_simple_targets() {
    let g = grammar(EXPR);
    let assembler = Assembler::new(&g);
    for target in ["x", "(x+y)", "((1-x)*y)"] {
        let full = assembler.assemble_with(&FixedPoint, target).unwrap();
        let quick = assembler.assemble_with(&Lookahead, target).unwrap();
        assert_eq!(full.phenotype, quick.phenotype);
    }
}

#[test]
fn test_prune_subsumed() {
    let g = grammar("<s> ::= <a><b>\n<a> ::= x\n<b> ::= y\n");
    let config = AssemblyConfig::default().with_prune_subsumed(true);
    let assembler = Assembler::new(&g).with_config(config);

    let growth = assembler.grow("xy").unwrap();
    assert_eq!(growth.store.len(), 1);

    let solution = assembler.assemble("xy").unwrap();
    assert_eq!(solution.genome, vec![1, 1, 1]);
    assert_eq!(solution.snippet_count, 1);
}

#[test]
fn test_max_passes() {
    let g = grammar(EXPR);
    let config = AssemblyConfig::default().with_max_passes(1);
    let err = Assembler::new(&g)
        .with_config(config)
        .assemble("((x+y)*x)")
        .unwrap_err();
    assert_eq!(err, AssemblyError::SearchExhausted { passes: 1 });
}

#[test]
fn test_time_limit() {
    let g = grammar(EXPR);
    let config = AssemblyConfig::default().with_time_limit(Duration::ZERO);
    let growth = Assembler::new(&g).with_config(config).grow("(x+y)").unwrap();
    assert_eq!(growth.status, GrowthStatus::Exhausted);
    assert_eq!(growth.passes, 0);
}

#[test]
fn test_cancellation() {
    let g = grammar(EXPR);
    let flag = Arc::new(AtomicBool::new(true));
    let config = AssemblyConfig::default().with_cancel_flag(flag);
    let err = Assembler::new(&g)
        .with_config(config)
        .assemble("(x+y)")
        .unwrap_err();
    assert_eq!(err, AssemblyError::Cancelled { passes: 0 });
}

#[test]
fn test_dataset_range() {
    let source = "<var> ::= x[<idx>]\n<idx> ::= GE_RANGE:dataset_n_vars\n";
    let options = ParseOptions::default().with_dataset_n_vars(12);
    let g = Grammar::parse(source, &options).unwrap();

    let solution = Assembler::new(&g).assemble("x[11]").unwrap();
    assert_eq!(solution.phenotype, "x[11]");
    // <var> is a unit rule; <idx> has twelve choices and "11" is the last.
    assert_eq!(solution.genome, vec![1, 23]);
}

#[test]
fn test_sample_grammars() {
    let cases = [
        ("arithmetic.bnf", "(x0+sin(x1))*2.5"),
        ("boolean.bnf", "and(or(a,not(b)),c)"),
    ];
    for (file, target) in cases {
        let g = Grammar::from_file(grammar_file(file), &ParseOptions::default()).unwrap();
        let solution = Assembler::new(&g).assemble(target).unwrap();
        assert_eq!(
            decode(&g, g.start_symbol(), &solution.genome).as_deref(),
            Some(target),
            "{file}"
        );
    }
}
