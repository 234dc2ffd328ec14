use std::fmt;
use std::rc::Rc;

/// Index of a non-terminal (rule) inside its [`Grammar`](crate::Grammar).
///
/// Ids are assigned in order of first definition, so id 0 is the start rule.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonTerminalId(pub(crate) u32);

impl NonTerminalId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NonTerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A grammar symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Literal text copied verbatim into the phenotype.
    Terminal(Rc<str>),

    /// A reference to a rule.
    NonTerminal(NonTerminalId),
}

impl Symbol {
    pub fn terminal(text: &str) -> Self {
        Symbol::Terminal(Rc::from(text))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn as_terminal(&self) -> Option<&str> {
        match self {
            Symbol::Terminal(text) => Some(text),
            Symbol::NonTerminal(_) => None,
        }
    }

    pub fn as_non_terminal(&self) -> Option<NonTerminalId> {
        match self {
            Symbol::NonTerminal(id) => Some(*id),
            Symbol::Terminal(_) => None,
        }
    }
}

/// One right-hand-side alternative of a rule, with the facts the grammar
/// analysis derives for it.
#[derive(Debug, Clone)]
pub struct Choice {
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) has_nonterminal_children: bool,
    pub(crate) is_recursive: bool,
    pub(crate) max_path_to_terminal: u32,
}

impl Choice {
    pub(crate) fn new(symbols: Vec<Symbol>) -> Self {
        let has_nonterminal_children = symbols.iter().any(|s| !s.is_terminal());
        Self {
            symbols,
            has_nonterminal_children,
            is_recursive: false,
            max_path_to_terminal: 0,
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn has_nonterminal_children(&self) -> bool {
        self.has_nonterminal_children
    }

    /// True if expanding this choice can eventually re-enter its own rule.
    pub fn is_recursive(&self) -> bool {
        self.is_recursive
    }

    /// Largest minimum-steps-to-terminal over the choice's non-terminals.
    pub fn max_path_to_terminal(&self) -> u32 {
        self.max_path_to_terminal
    }

    /// Number of non-terminal symbols in the choice.
    pub fn arity(&self) -> usize {
        self.symbols.iter().filter(|s| !s.is_terminal()).count()
    }

    /// The text of the choice when it is exactly one terminal.
    pub fn single_terminal(&self) -> Option<&str> {
        match self.symbols.as_slice() {
            [Symbol::Terminal(text)] => Some(text),
            _ => None,
        }
    }
}
