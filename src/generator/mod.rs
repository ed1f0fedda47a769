/*
    This module generates sentences
*/

mod scope;
mod tree;

use rand::RngCore;
use thiserror::Error;
use tracing::{debug, trace};

pub use scope::Scope;
pub use tree::Tree;

use crate::choice::{ChoiceSequence, Selector, UniformSelector, DEFAULT_CHOICE_RANGE};
use crate::grammar::cost::{Cost, CostTable};
use crate::grammar::{Alternative, Grammar, Token};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    // A replayed choice sequence ran out of decisions
    #[error("Choice sequence exhausted after {position} decisions")]
    Exhausted { position: usize },
    // Past the depth bound, the symbol has no alternative of finite cost
    #[error("Symbol `{symbol}` has no terminating expansion")]
    NonTerminating { symbol: String },
    // A choice was requested among zero candidates
    #[error("Nothing to choose from")]
    EmptyChoice,
}

pub type GenResult<T> = Result<T, GenerateError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Depth past which only the cheapest alternatives are considered.
    pub max_depth: usize,
    /// Recorded choices are drawn from `0..choice_range`.
    pub choice_range: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            max_depth: 10,
            choice_range: DEFAULT_CHOICE_RANGE,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_choice_range(mut self, range: u32) -> Self {
        self.choice_range = range;
        self
    }
}

/// State threaded through one generation: the selection policy and the
/// semantic scope. Hooks receive it by `&mut`; nothing outlives the run.
pub struct Session<'s> {
    selector: &'s mut dyn Selector,
    pub scope: Scope,
}

impl<'s> Session<'s> {
    pub fn new(selector: &'s mut dyn Selector) -> Self {
        Session {
            selector,
            scope: Scope::new(),
        }
    }

    /// Picks one of `items` through the session's selection policy.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> GenResult<&'a T> {
        let index = self.selector.next_index(items.len())?;
        Ok(&items[index])
    }
}

/// The result of a recorded generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub output: String,
    pub choices: Vec<u32>,
}

/// Expands symbols of one grammar into derivation trees.
///
/// Costs are computed once on construction and shared by every run.
pub struct Expander<'g> {
    grammar: &'g Grammar,
    costs: CostTable,
    config: GeneratorConfig,
}

impl<'g> Expander<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_config(grammar, GeneratorConfig::default())
    }

    pub fn with_config(grammar: &'g Grammar, config: GeneratorConfig) -> Self {
        Expander {
            grammar,
            costs: CostTable::compute(grammar),
            config,
        }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn costs(&self) -> &CostTable {
        &self.costs
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn expand(&self, session: &mut Session<'_>, symbol: &str, depth: usize) -> GenResult<Tree> {
        let Some(rewrite) = self.grammar.rewrite(symbol) else {
            return Ok(Tree::leaf(symbol));
        };

        let alternative = if depth > self.config.max_depth {
            if self.costs.min_cost(symbol) == Some(Cost::Infinite) {
                return Err(GenerateError::NonTerminating {
                    symbol: symbol.to_string(),
                });
            }
            let cheapest = self.costs.cheapest(symbol);
            trace!(symbol, depth, candidates = cheapest.len(), "past depth bound");
            let index = *session.choose(&cheapest)?;
            &rewrite[index]
        } else {
            session.choose(rewrite)?
        };

        let children = self.expand_alternative(session, alternative, depth + 1)?;
        Ok(Tree::node(symbol, children))
    }

    fn expand_alternative(&self, session: &mut Session<'_>, alternative: &Alternative, depth: usize) -> GenResult<Vec<Tree>> {
        alternative
            .iter()
            .map(|token| self.expand_token(session, token, depth))
            .collect()
    }

    fn expand_token(&self, session: &mut Session<'_>, token: &Token, depth: usize) -> GenResult<Tree> {
        let symbol = token.symbol();
        let Some(hooks) = token.hooks() else {
            return self.expand(session, symbol, depth);
        };

        let tree = match &hooks.pre {
            Some(pre) => pre(session, symbol, &mut |s| self.expand(s, symbol, depth))?,
            None => self.expand(session, symbol, depth)?,
        };
        match &hooks.post {
            Some(post) => post(session, tree),
            None => Ok(tree),
        }
    }

    /// Expands `start` in a fresh session driven by `selector`.
    pub fn derive(&self, start: &str, selector: &mut dyn Selector) -> GenResult<Tree> {
        let mut session = Session::new(selector);
        self.expand(&mut session, start, 0)
    }

    /// Generates a sentence and records every decision made on the way.
    pub fn generate(&self, start: &str, rng: &mut dyn RngCore) -> GenResult<Generation> {
        let mut choices = ChoiceSequence::record_in_range(rng, self.config.choice_range);
        let output = self.derive(start, &mut choices)?.render();
        let choices = choices.into_values();
        debug!(start, choices = choices.len(), length = output.len(), "generated");
        Ok(Generation { output, choices })
    }

    /// Drives a generation from a recorded trace.
    pub fn replay(&self, start: &str, choices: &[u32]) -> GenResult<String> {
        let mut sequence = ChoiceSequence::replay(choices.to_vec());
        Ok(self.derive(start, &mut sequence)?.render())
    }

    /// Generates with plain uniform choices; nothing is recorded.
    pub fn fuzz(&self, start: &str, rng: &mut dyn RngCore) -> GenResult<String> {
        let mut selector = UniformSelector::new(rng);
        Ok(self.derive(start, &mut selector)?.render())
    }
}

/// Generates one sentence from `start`, returning it with its trace.
pub fn generate(grammar: &Grammar, start: &str, max_depth: usize, rng: &mut dyn RngCore) -> GenResult<Generation> {
    Expander::with_config(grammar, GeneratorConfig::new().with_max_depth(max_depth)).generate(start, rng)
}
