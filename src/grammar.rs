use crate::bnf::{parse_bnf, RawSymbol};
use crate::config::ParseOptions;
use crate::error::{GrammarError, GrammarResult};
use crate::symbol::{Choice, NonTerminalId, Symbol};
use crate::templates::TemplateIndex;
use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use log::warn;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

/// A production rule: one non-terminal and its ordered choices.
#[derive(Debug, Clone)]
pub struct Rule {
    pub(crate) name: String,
    pub(crate) choices: Vec<Choice>,
    pub(crate) is_recursive: bool,
    pub(crate) min_steps: u32,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn choice_count(&self) -> usize {
        self.choices.len()
    }

    /// A single-choice rule still consumes a codon when decoded.
    pub fn is_unit(&self) -> bool {
        self.choices.len() == 1
    }

    pub fn is_recursive(&self) -> bool {
        self.is_recursive
    }

    /// Fewest derivation steps needed to reach a string of terminals.
    pub fn min_steps(&self) -> u32 {
        self.min_steps
    }
}

/// A context-free grammar loaded from BNF, with the indices the assembly
/// engine consults.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<Rule>,
    ids: HashMap<String, NonTerminalId>,
    /// Terminal text to the rules having a choice made of exactly that terminal.
    /// Ordered by text so seeding is reproducible.
    terminal_owners: BTreeMap<Rc<str>, Vec<NonTerminalId>>,
    codon_size: u32,
    templates: TemplateIndex,
}

impl Grammar {
    /// Parses BNF source. The first rule defined is the start symbol.
    pub fn parse(source: &str, options: &ParseOptions) -> GrammarResult<Self> {
        let raw = parse_bnf(source, options)?;
        if raw.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }

        let ids: HashMap<String, NonTerminalId> = raw
            .iter()
            .enumerate()
            .map(|(i, rule)| (rule.name.clone(), NonTerminalId(i as u32)))
            .collect();

        let mut rules = Vec::with_capacity(raw.len());
        for rule in raw {
            if rule.choices.is_empty() {
                return Err(GrammarError::EmptyRule(rule.name));
            }

            let mut choices = Vec::with_capacity(rule.choices.len());
            for raw_choice in rule.choices {
                let mut symbols = Vec::with_capacity(raw_choice.len());
                for symbol in raw_choice {
                    symbols.push(match symbol {
                        RawSymbol::Terminal(text) => Symbol::Terminal(Rc::from(text)),
                        RawSymbol::NonTerminal(name) => match ids.get(&name) {
                            Some(&id) => Symbol::NonTerminal(id),
                            None => {
                                return Err(GrammarError::UndefinedNonTerminal {
                                    rule: rule.name,
                                    symbol: name,
                                })
                            }
                        },
                    });
                }
                choices.push(Choice::new(symbols));
            }

            if choices.len() == 1 {
                warn!(
                    "grammar contains unit production for rule {}; unit productions consume codons",
                    rule.name
                );
            }

            rules.push(Rule {
                name: rule.name,
                choices,
                is_recursive: false,
                min_steps: 0,
            });
        }

        set_min_steps(&mut rules)?;
        set_recursion(&mut rules);

        let mut terminal_owners: BTreeMap<Rc<str>, Vec<NonTerminalId>> = BTreeMap::new();
        for (i, rule) in rules.iter().enumerate() {
            for choice in &rule.choices {
                if let [Symbol::Terminal(text)] = choice.symbols() {
                    let owners = terminal_owners.entry(text.clone()).or_default();
                    let id = NonTerminalId(i as u32);
                    if !owners.contains(&id) {
                        owners.push(id);
                    }
                }
            }
        }

        let max_choices = rules.iter().map(Rule::choice_count).max().unwrap_or(1);
        let templates = TemplateIndex::build(&rules);

        Ok(Self {
            rules,
            ids,
            terminal_owners,
            codon_size: 2 * max_choices as u32,
            templates,
        })
    }

    pub fn from_file(path: impl AsRef<Path>, options: &ParseOptions) -> GrammarResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| GrammarError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source, options)
    }

    pub fn start_symbol(&self) -> NonTerminalId {
        NonTerminalId(0)
    }

    /// Exclusive upper bound of every codon this grammar hands out.
    pub fn codon_size(&self) -> u32 {
        self.codon_size
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, id: NonTerminalId) -> &Rule {
        &self.rules[id.index()]
    }

    pub fn name(&self, id: NonTerminalId) -> &str {
        &self.rules[id.index()].name
    }

    /// Looks up a non-terminal by its bracketed name, e.g. `"<expr>"`.
    pub fn non_terminal(&self, name: &str) -> Option<NonTerminalId> {
        self.ids.get(name).copied()
    }

    pub fn terminal_owners(&self) -> impl Iterator<Item = (&str, &[NonTerminalId])> {
        self.terminal_owners
            .iter()
            .map(|(text, owners)| (text.as_ref(), owners.as_slice()))
    }

    pub fn owners_of(&self, terminal: &str) -> &[NonTerminalId] {
        self.terminal_owners
            .get(terminal)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn templates(&self) -> &TemplateIndex {
        &self.templates
    }

    /// Renders a symbol sequence in BNF notation, for messages.
    pub fn display_symbols(&self, symbols: &[Symbol]) -> String {
        symbols
            .iter()
            .map(|symbol| match symbol {
                Symbol::Terminal(text) => format!("{text:?}"),
                Symbol::NonTerminal(id) => self.name(*id).to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromStr for Grammar {
    type Err = GrammarError;

    fn from_str(source: &str) -> GrammarResult<Self> {
        Self::parse(source, &ParseOptions::default())
    }
}

/// Layered fixed point: a rule expands at layer k once one of its choices
/// uses only terminals and rules expanded before layer k.
fn set_min_steps(rules: &mut [Rule]) -> GrammarResult<()> {
    let mut steps: Vec<Option<u32>> = vec![None; rules.len()];

    loop {
        let layer = steps.clone();
        let mut progressed = false;

        for (i, rule) in rules.iter().enumerate() {
            if layer[i].is_some() {
                continue;
            }
            let best = rule
                .choices
                .iter()
                .filter_map(|choice| choice_depth(choice, &layer))
                .min();
            if let Some(depth) = best {
                steps[i] = Some(depth);
                progressed = true;
            }
        }

        if !progressed {
            break;
        }
    }

    let stuck: Vec<String> = rules
        .iter()
        .zip(&steps)
        .filter(|(_, s)| s.is_none())
        .map(|(rule, _)| rule.name.clone())
        .collect();
    if !stuck.is_empty() {
        return Err(GrammarError::NoTerminalPath(stuck));
    }

    let steps: Vec<u32> = steps.into_iter().flatten().collect();
    for (rule, &min_steps) in rules.iter_mut().zip(&steps) {
        rule.min_steps = min_steps;
        for choice in &mut rule.choices {
            choice.max_path_to_terminal = choice
                .symbols
                .iter()
                .filter_map(Symbol::as_non_terminal)
                .map(|id| steps[id.index()])
                .max()
                .unwrap_or(0);
        }
    }
    Ok(())
}

fn choice_depth(choice: &Choice, steps: &[Option<u32>]) -> Option<u32> {
    let mut deepest = 0;
    for id in choice.symbols.iter().filter_map(Symbol::as_non_terminal) {
        deepest = deepest.max(steps[id.index()]?);
    }
    Some(deepest + 1)
}

/// Marks rules that can reach themselves, and choices through which that
/// happens. Reachable sets are found by depth-first search and memoized.
fn set_recursion(rules: &mut [Rule]) {
    let reach: Vec<HashSet<usize>> = (0..rules.len())
        .map(|i| reachable_from(rules, i))
        .collect();

    for (i, rule) in rules.iter_mut().enumerate() {
        rule.is_recursive = reach[i].contains(&i);
        for choice in &mut rule.choices {
            choice.is_recursive = choice
                .symbols
                .iter()
                .filter_map(Symbol::as_non_terminal)
                .any(|id| id.index() == i || reach[id.index()].contains(&i));
        }
    }
}

fn reachable_from(rules: &[Rule], from: usize) -> HashSet<usize> {
    let mut seen = HashSet::new();
    let mut stack = vec![from];

    while let Some(current) = stack.pop() {
        for choice in &rules[current].choices {
            for id in choice.symbols.iter().filter_map(Symbol::as_non_terminal) {
                if seen.insert(id.index()) {
                    stack.push(id.index());
                }
            }
        }
    }
    seen
}
