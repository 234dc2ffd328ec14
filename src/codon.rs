use crate::error::CodonError;
use crate::grammar::Grammar;
use crate::symbol::{Choice, NonTerminalId, Symbol};

impl Grammar {
    /// Returns a codon that makes a decoder pick `symbols` when expanding
    /// `non_terminal`.
    ///
    /// The decoder selects `codon % choice_count`, so the codon for choice
    /// `i` is `choice_count + i`: never zero, always below `codon_size`.
    pub fn codon_for(&self, non_terminal: NonTerminalId, symbols: &[Symbol]) -> Result<u32, CodonError> {
        let rule = self.rule(non_terminal);
        let index = rule
            .choices()
            .iter()
            .position(|choice| choice.symbols() == symbols)
            .ok_or_else(|| CodonError::ChoiceNotFound {
                non_terminal: rule.name().to_string(),
                choice: self.display_symbols(symbols),
            })?;
        Ok(self.codon_for_index(non_terminal, index))
    }

    pub fn codon_for_index(&self, non_terminal: NonTerminalId, index: usize) -> u32 {
        let count = self.rule(non_terminal).choice_count();
        debug_assert!(index < count, "choice index out of range");
        let codon = (count + index) as u32;
        debug_assert!(codon < self.codon_size());
        codon
    }

    /// The choice a decoder would make for `codon` at `non_terminal`.
    pub fn select_choice(&self, non_terminal: NonTerminalId, codon: u32) -> (usize, &Choice) {
        let choices = self.rule(non_terminal).choices();
        let index = codon as usize % choices.len();
        (index, &choices[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codon_selects_choice() {
        let grammar: Grammar = "<e> ::= (<e><o><e>) | <v>\n<o> ::= + | - | *\n<v> ::= x\n"
            .parse()
            .unwrap();
        let o = grammar.non_terminal("<o>").unwrap();

        for (i, choice) in grammar.rule(o).choices().iter().enumerate() {
            let codon = grammar.codon_for(o, choice.symbols()).unwrap();
            assert_eq!(codon, 3 + i as u32);
            assert!(codon < grammar.codon_size());
            assert_eq!(grammar.select_choice(o, codon).0, i);
        }
    }

    #[test]
    fn test_unit_rule_codon_is_nonzero() {
        let grammar: Grammar = "<a> ::= <b>\n<b> ::= x | y\n".parse().unwrap();
        let a = grammar.start_symbol();
        let b = grammar.non_terminal("<b>").unwrap();
        assert_eq!(grammar.codon_for(a, &[Symbol::NonTerminal(b)]).unwrap(), 1);
    }

    #[test]
    fn test_unknown_choice() {
        let grammar: Grammar = "<a> ::= x | y\n".parse().unwrap();
        let err = grammar
            .codon_for(grammar.start_symbol(), &[Symbol::terminal("z")])
            .unwrap_err();
        assert_eq!(
            err,
            CodonError::ChoiceNotFound {
                non_terminal: "<a>".to_string(),
                choice: "\"z\"".to_string(),
            }
        );
    }
}
