/*
    Grammar-driven sentence generation with replayable choices, and delta
    debugging over the recorded choices
*/

pub mod choice;
pub mod error_handling;
pub mod generator;
pub mod grammar;
pub mod grammars;
pub mod parser;
pub mod shrink;

pub use choice::{ChoiceSequence, Selector, UniformSelector};
pub use generator::{generate, Expander, GenResult, GenerateError, Generation, GeneratorConfig, Session, Tree};
pub use grammar::{Grammar, Hooks, Token};
pub use shrink::{ddmin, shrink_to_fixpoint, Shrinker};
