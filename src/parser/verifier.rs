use std::collections::{HashMap, HashSet, VecDeque};

use super::Rule;
use crate::error_handling::{Error, ErrorType, Location};

// Things that load fine but are probably not what the author meant
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum WarningType {
    // A bare word no rule defines; it will be emitted verbatim
    #[error("`{0}` is not defined and will be generated as text")]
    UndefinedSymbol(String),
    // No derivation from the start symbol ever reaches this rule
    #[error("`{0}` is unreachable from the start symbol")]
    Unreachable(String),
}

impl ErrorType for WarningType {}

pub type Warning = Error<WarningType>;

fn undefined_symbols(rules: &[Rule], defined: &HashMap<&str, &Rule>) -> Vec<Warning> {
    // Every bare word on a right-hand side that no line defines
    rules
        .iter()
        .flat_map(|rule| {
            rule.bare_words
                .iter()
                .filter(|word| !defined.contains_key(word.as_str()))
                .map(|word| Warning {
                    location: rule.location.clone(),
                    error: WarningType::UndefinedSymbol(word.clone()),
                })
        })
        .collect()
}

fn unreachable_rules(rules: &[Rule], defined: &HashMap<&str, &Rule>) -> Vec<Warning> {
    let Some(start) = rules.first() else {
        return Vec::new();
    };

    let mut reached = HashSet::from([start.symbol.as_str()]);
    let mut queue = VecDeque::from([start]);
    while let Some(rule) = queue.pop_front() {
        for alternative in &rule.rewrite {
            for token in alternative {
                if let Some(&next) = defined.get(token.symbol()) {
                    if reached.insert(next.symbol.as_str()) {
                        queue.push_back(next);
                    }
                }
            }
        }
    }

    rules
        .iter()
        .filter(|rule| !reached.contains(rule.symbol.as_str()))
        .map(|rule| Warning {
            location: rule.location.clone(),
            error: WarningType::Unreachable(rule.symbol.clone()),
        })
        .collect()
}

pub(super) fn find_warnings(rules: &[Rule]) -> Vec<Warning> {
    let defined: HashMap<&str, &Rule> = rules.iter().map(|rule| (rule.symbol.as_str(), rule)).collect();

    let mut warnings = undefined_symbols(rules, &defined);
    warnings.extend(unreachable_rules(rules, &defined));
    warnings
}
