use crate::grammar::Grammar;
use crate::symbol::{NonTerminalId, Symbol};

pub const EXPR: &str = "<e> ::= (<e><o><e>) | <v>\n<o> ::= + | - | *\n<v> ::= x | y | 1\n";

/// Ambiguous: no brackets, so most targets have several derivations.
pub const FLAT_EXPR: &str = "<e> ::= <e><o><e> | <v>\n<o> ::= + | *\n<v> ::= x | y\n";

pub fn grammar(source: &str) -> Grammar {
    source.parse().expect("test grammar should parse")
}

/// Standard depth-first, leftmost-first genome mapper without wrapping.
///
/// Returns `None` unless the genome is consumed exactly: running out of
/// codons or leaving some unread both count as failure.
pub fn decode(grammar: &Grammar, root: NonTerminalId, genome: &[u32]) -> Option<String> {
    let mut phenotype = String::new();
    let mut codons = genome.iter();
    let mut stack = vec![Symbol::NonTerminal(root)];

    while let Some(symbol) = stack.pop() {
        match symbol {
            Symbol::Terminal(text) => phenotype.push_str(&text),
            Symbol::NonTerminal(nt) => {
                let &codon = codons.next()?;
                let (_, choice) = grammar.select_choice(nt, codon);
                stack.extend(choice.symbols().iter().rev().cloned());
            }
        }
    }

    codons.next().is_none().then_some(phenotype)
}

/// Decodes as much of `genome` as is needed, ignoring any unread tail.
pub fn decode_prefix(grammar: &Grammar, genome: &[u32]) -> Option<(String, usize)> {
    let mut phenotype = String::new();
    let mut used = 0;
    let mut stack = vec![Symbol::NonTerminal(grammar.start_symbol())];

    while let Some(symbol) = stack.pop() {
        match symbol {
            Symbol::Terminal(text) => phenotype.push_str(&text),
            Symbol::NonTerminal(nt) => {
                let &codon = genome.get(used)?;
                used += 1;
                let (_, choice) = grammar.select_choice(nt, codon);
                stack.extend(choice.symbols().iter().rev().cloned());
            }
        }
    }

    Some((phenotype, used))
}

#[test]
fn test_decoder_matches_hand_derivation() {
    let g = grammar(EXPR);
    // <e> -> (<e><o><e>), <e> -> <v> -> x, <o> -> +, <e> -> <v> -> y
    let genome = [2, 3, 3, 3, 3, 4];
    assert_eq!(decode(&g, g.start_symbol(), &genome).as_deref(), Some("(x+y)"));
    assert_eq!(decode(&g, g.start_symbol(), &genome[..5]), None);
    assert_eq!(decode_prefix(&g, &[3, 5, 9, 9]), Some(("1".to_string(), 2)));
}
