/*
    Minimum expansion cost of every symbol and alternative in a grammar.
    The expander falls back to the cheapest alternatives once the depth bound
    is exceeded, which is what makes recursive grammars terminate.
*/

use std::collections::HashMap;
use std::fmt::Display;

use super::{Alternative, Grammar};

/// Number of expansion steps needed to reach an all-terminal derivation.
/// `Infinite` orders above every finite cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cost {
    Finite(u32),
    Infinite,
}

impl Cost {
    pub fn is_finite(self) -> bool {
        matches!(self, Cost::Finite(_))
    }

    fn step(self) -> Cost {
        match self {
            Cost::Finite(n) => Cost::Finite(n.saturating_add(1)),
            Cost::Infinite => Cost::Infinite,
        }
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cost::Finite(n) => write!(f, "{}", n),
            Cost::Infinite => write!(f, "inf"),
        }
    }
}

/// Per-symbol costs of each alternative, indexed by the alternative's
/// position in the symbol's rewrite.
#[derive(Clone, Debug, PartialEq)]
pub struct CostTable {
    symbols: HashMap<String, Cost>,
    alternatives: HashMap<String, Vec<Cost>>,
}

impl CostTable {
    pub fn compute(grammar: &Grammar) -> CostTable {
        let symbols = resolve_symbols(grammar);
        let alternatives = grammar
            .rules
            .iter()
            .map(|(symbol, rewrite)| {
                let costs = rewrite
                    .iter()
                    .map(|alternative| alternative_cost(&symbols, alternative))
                    .collect();
                (symbol.clone(), costs)
            })
            .collect();

        CostTable { symbols, alternatives }
    }

    /// Cost of a symbol; terminals cost nothing.
    pub fn symbol_cost(&self, symbol: &str) -> Cost {
        self.symbols.get(symbol).copied().unwrap_or(Cost::Finite(0))
    }

    pub fn alternative_costs(&self, symbol: &str) -> &[Cost] {
        self.alternatives.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn min_cost(&self, symbol: &str) -> Option<Cost> {
        self.alternative_costs(symbol).iter().copied().min()
    }

    /// Positions of the minimal-cost alternatives of `symbol`, in grammar
    /// order.
    pub fn cheapest(&self, symbol: &str) -> Vec<usize> {
        let costs = self.alternative_costs(symbol);
        let Some(min) = costs.iter().copied().min() else {
            return Vec::new();
        };
        costs
            .iter()
            .enumerate()
            .filter(|&(_, &cost)| cost == min)
            .map(|(index, _)| index)
            .collect()
    }
}

// Least fixed point of `cost(s) = min over alternatives of 1 + max(cost(t))`.
// Every symbol starts at `Infinite` and only gets cheaper, so the values do
// not depend on visiting order and the loop ends after at most one pass per
// symbol plus one.
fn resolve_symbols(grammar: &Grammar) -> HashMap<String, Cost> {
    let mut costs: HashMap<String, Cost> = grammar
        .rules
        .iter()
        .map(|(symbol, rewrite)| {
            let initial = if rewrite.is_empty() { Cost::Finite(0) } else { Cost::Infinite };
            (symbol.clone(), initial)
        })
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for (symbol, rewrite) in &grammar.rules {
            let Some(best) = rewrite.iter().map(|alternative| alternative_cost(&costs, alternative)).min() else {
                continue;
            };
            if let Some(current) = costs.get_mut(symbol.as_str()) {
                if best < *current {
                    *current = best;
                    changed = true;
                }
            }
        }
    }

    costs
}

// Tokens missing from `costs` are terminals and cost nothing.
fn alternative_cost(costs: &HashMap<String, Cost>, alternative: &Alternative) -> Cost {
    alternative
        .iter()
        .filter_map(|token| costs.get(token.symbol()).copied())
        .max()
        .unwrap_or(Cost::Finite(0))
        .step()
}
