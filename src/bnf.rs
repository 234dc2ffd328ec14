//! Tokenizer for the BNF grammar dialect.
//!
//! Produces rules with symbol names still as text; [`Grammar`](crate::Grammar)
//! resolves them into ids and runs the analyses.

use crate::config::ParseOptions;
use crate::error::{GrammarError, GrammarResult};
use ahash::AHashSet as HashSet;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Quoted runs are matched first so a `#` inside quotes is kept.
static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"'[^'\r\n]*'|"[^"\r\n]*"|#[^\r\n]*"#).expect("comment pattern"));

static RULE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(<[^<>\s]+>)\s*::=").expect("rule header pattern"));

/// One production choice: bare text and quoted runs, never an unquoted `|`.
static PRODUCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s*((?:[^'"|]+|'.*?'|".*?")+)"#).expect("production pattern")
});

static PRODUCTION_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#" *([\r\n]+) *|([^'"<\r\n]+)|'(.*?)'|"(.*?)"|(?P<subrule><[^<>|\s]+>)|(<)"#)
        .expect("production parts pattern")
});

static GE_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^GE_RANGE:(?P<range>\w*)").expect("range pattern"));

const DATASET_N_VARS: &str = "dataset_n_vars";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawSymbol {
    Terminal(String),
    NonTerminal(String),
}

#[derive(Debug, Clone)]
pub(crate) struct RawRule {
    pub name: String,
    pub choices: Vec<Vec<RawSymbol>>,
}

/// Splits grammar source into rules, in definition order.
pub(crate) fn parse_bnf(source: &str, options: &ParseOptions) -> GrammarResult<Vec<RawRule>> {
    let content = strip_comments(source);
    let headers: Vec<_> = RULE_HEADER.captures_iter(&content).collect();

    let mut seen = HashSet::new();
    let mut rules = Vec::with_capacity(headers.len());

    for (i, header) in headers.iter().enumerate() {
        let whole = header.get(0).expect("match has group 0");
        let name = header[1].to_string();
        let body_end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(content.len(), |m| m.start());
        let body = &content[whole.end()..body_end];

        if !seen.insert(name.clone()) {
            return Err(GrammarError::DuplicateRule(name));
        }

        let mut choices = Vec::new();
        for production in PRODUCTION.captures_iter(body) {
            let text = production[1].trim();
            if text.is_empty() {
                continue;
            }

            if let Some(range) = GE_RANGE.captures(text) {
                let n = resolve_range(&range[0], &range["range"], options)?;
                choices.extend((0..n).map(|i| vec![RawSymbol::Terminal(i.to_string())]));
                continue;
            }

            choices.push(split_parts(text));
        }

        rules.push(RawRule { name, choices });
    }

    Ok(rules)
}

fn strip_comments(source: &str) -> String {
    COMMENT
        .replace_all(source, |caps: &Captures<'_>| {
            if caps[0].starts_with('#') {
                String::new()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn resolve_range(directive: &str, range: &str, options: &ParseOptions) -> GrammarResult<usize> {
    if range == DATASET_N_VARS {
        return options
            .dataset_n_vars
            .ok_or_else(|| GrammarError::UnresolvedRange(directive.to_string()));
    }
    range
        .parse()
        .map_err(|_| GrammarError::BadRange(directive.to_string()))
}

/// Adjacent text parts merge into a single terminal; `<name>` ends the run.
fn split_parts(text: &str) -> Vec<RawSymbol> {
    let mut symbols = Vec::new();
    let mut terminal = String::new();

    for part in PRODUCTION_PARTS.captures_iter(text) {
        if let Some(subrule) = part.name("subrule") {
            if !terminal.is_empty() {
                symbols.push(RawSymbol::Terminal(std::mem::take(&mut terminal)));
            }
            symbols.push(RawSymbol::NonTerminal(subrule.as_str().to_string()));
        } else {
            for group in part.iter().skip(1).flatten() {
                terminal.push_str(&unescape(group.as_str()));
            }
        }
    }

    if !terminal.is_empty() {
        symbols.push(RawSymbol::Terminal(terminal));
    }
    symbols
}

fn unescape(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
