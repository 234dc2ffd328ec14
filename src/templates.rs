use crate::grammar::Rule;
use crate::symbol::{NonTerminalId, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Two or more non-terminal slots: merges adjacent snippets.
    Concat,
    /// Exactly one non-terminal slot: promotes a snippet to a new root.
    Climb,
}

/// A production choice viewed as a pattern to assemble snippets into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub owner: NonTerminalId,
    pub kind: TemplateKind,
    pub symbols: Vec<Symbol>,
}

impl Template {
    /// Positions at which `non_terminal` occurs in the pattern.
    pub fn positions_of(&self, non_terminal: NonTerminalId) -> impl Iterator<Item = usize> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.as_non_terminal() == Some(non_terminal))
            .map(|(i, _)| i)
    }
}

/// Templates keyed by each non-terminal they contain.
#[derive(Debug, Clone, Default)]
pub struct TemplateIndex {
    concat: Vec<Vec<Template>>,
    climb: Vec<Vec<Template>>,
}

impl TemplateIndex {
    pub(crate) fn build(rules: &[Rule]) -> Self {
        let mut concat: Vec<Vec<Template>> = vec![Vec::new(); rules.len()];
        let mut climb: Vec<Vec<Template>> = vec![Vec::new(); rules.len()];

        for (i, rule) in rules.iter().enumerate() {
            let owner = NonTerminalId(i as u32);
            for choice in rule.choices() {
                let slots: Vec<NonTerminalId> = choice
                    .symbols()
                    .iter()
                    .filter_map(Symbol::as_non_terminal)
                    .collect();

                let kind = match slots.len() {
                    0 => continue,
                    1 => TemplateKind::Climb,
                    _ => TemplateKind::Concat,
                };
                let template = Template {
                    owner,
                    kind,
                    symbols: choice.symbols().to_vec(),
                };
                let index = match kind {
                    TemplateKind::Climb => &mut climb,
                    TemplateKind::Concat => &mut concat,
                };

                for slot in slots {
                    let entry = &mut index[slot.index()];
                    if !entry.contains(&template) {
                        entry.push(template.clone());
                    }
                }
            }
        }

        Self { concat, climb }
    }

    pub fn concat(&self, non_terminal: NonTerminalId) -> &[Template] {
        self.concat
            .get(non_terminal.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn climb(&self, non_terminal: NonTerminalId) -> &[Template] {
        self.climb
            .get(non_terminal.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every template the non-terminal can fill a slot of, climbs first.
    pub fn all(&self, non_terminal: NonTerminalId) -> impl Iterator<Item = &Template> {
        self.climb(non_terminal)
            .iter()
            .chain(self.concat(non_terminal))
    }
}
