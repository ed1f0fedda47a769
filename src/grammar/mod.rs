/*
    This module is for storing and manipulating grammars
*/

pub mod cost;

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::generator::{GenResult, Session, Tree};

/// Performs the ordinary expansion of the token a `pre` hook wraps.
pub type Thunk<'t> = &'t mut dyn FnMut(&mut Session<'_>) -> GenResult<Tree>;

/// Runs around the expansion of a token. Receives the session, the token's
/// symbol and the thunk; may call the thunk at most once, or substitute a
/// tree of its own.
pub type PreHook = Arc<dyn Fn(&mut Session<'_>, &str, Thunk<'_>) -> GenResult<Tree> + Send + Sync>;

/// Runs on the expanded tree before it is attached to its parent.
pub type PostHook = Arc<dyn Fn(&mut Session<'_>, Tree) -> GenResult<Tree> + Send + Sync>;

#[derive(Clone, Default)]
pub struct Hooks {
    pub pre: Option<PreHook>,
    pub post: Option<PostHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pre<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Session<'_>, &str, Thunk<'_>) -> GenResult<Tree> + Send + Sync + 'static,
    {
        self.pre = Some(Arc::new(hook));
        self
    }

    pub fn post<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Session<'_>, Tree) -> GenResult<Tree> + Send + Sync + 'static,
    {
        self.post = Some(Arc::new(hook));
        self
    }
}

impl Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("pre", &self.pre.is_some())
            .field("post", &self.post.is_some())
            .finish()
    }
}

// Hooks compare by identity: two grammars are equal only if they share the
// same closures.
impl PartialEq for Hooks {
    fn eq(&self, other: &Self) -> bool {
        fn same<T: ?Sized>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
        }
        same(&self.pre, &other.pre) && same(&self.post, &other.post)
    }
}

// The base unit in a grammar rule. Whether the text names a nonterminal is
// decided by the grammar: anything that is not a key expands to itself.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Plain(String),
    Hooked(String, Hooks),
}

impl Token {
    pub fn plain(text: impl Into<String>) -> Self {
        Token::Plain(text.into())
    }

    pub fn hooked(text: impl Into<String>, hooks: Hooks) -> Self {
        Token::Hooked(text.into(), hooks)
    }

    pub fn symbol(&self) -> &str {
        match self {
            Token::Plain(s) | Token::Hooked(s, _) => s,
        }
    }

    pub fn hooks(&self) -> Option<&Hooks> {
        match self {
            Token::Plain(_) => None,
            Token::Hooked(_, hooks) => Some(hooks),
        }
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Token::plain(text)
    }
}

// The tokens in a single alternative
pub type Alternative = Vec<Token>;

// The alternatives of a rewrite rule
pub type Rewrite = Vec<Alternative>;

#[derive(Clone, Debug, PartialEq)]
pub struct Grammar {
    pub start_symbol: String,
    pub rules: HashMap<String, Rewrite>,
}

impl Grammar {
    pub fn new(start_symbol: impl Into<String>) -> Self {
        Grammar {
            start_symbol: start_symbol.into(),
            rules: HashMap::new(),
        }
    }

    /// Adds (or replaces) the rewrite for `symbol`.
    pub fn rule(mut self, symbol: impl Into<String>, rewrite: Rewrite) -> Self {
        self.rules.insert(symbol.into(), rewrite);
        self
    }

    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.rules.contains_key(symbol)
    }

    pub fn rewrite(&self, symbol: &str) -> Option<&Rewrite> {
        self.rules.get(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

/// Builds an alternative of plain tokens.
pub fn alt(tokens: &[&str]) -> Alternative {
    tokens.iter().map(|&t| Token::plain(t)).collect()
}
