/*
    Built-in grammars and predicates used by the command line tool
*/

mod assignments;

pub use assignments::{assignments, UNDEFINED_VARIABLE};

/// True when the sentence contains `((` with a `))` somewhere after it.
pub fn has_nested_parens(sentence: &str) -> bool {
    sentence
        .find("((")
        .is_some_and(|open| sentence[open + 2..].contains("))"))
}
