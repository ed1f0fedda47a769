/*
    This module parses BNF grammar files
*/

mod lexer;
mod verifier;

use std::collections::HashSet;
use std::fs::File;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::{debug, warn};

use crate::error_handling::*;
use crate::grammar::{self, Alternative, Grammar, Rewrite};
use lexer::*;
use verifier::find_warnings;

#[derive(Debug, thiserror::Error)]
pub enum CompileErrorType {
    // A line which should contain a rule does not
    #[error("Expected `=` after symbol")]
    MissingEquals,
    // A rule has multiple equals signs
    #[error("Unexpected `=` encountered")]
    UnexpectedEquals,
    // The user starts a rule line with something other than a symbol
    #[error("Tried to define something other than a symbol")]
    MissingNonterminal,
    // There is an unclosed quote
    #[error("Unmatched quotes")]
    UnmatchedQuote,
    // A backslash in a literal is followed by something we don't know
    #[error("Unknown escape `\\{0}`")]
    UnknownEscape(char),
    // The same symbol is defined on two lines
    #[error("`{0}` is already defined")]
    DuplicateDefinition(String),
    // Quoted text spells a rule name, so it could never be generated as text
    #[error("Quoted text `{0}` names a rule")]
    LiteralNamesRule(String),
    // Somehow a full rewrite was parsed as a base alternative
    // This is a problem with the parser, not the grammar
    #[error("Rewrite was not fully split (this is a problem with the parser, not the grammar)")]
    UnsplitRewrite,
    // A blank line got too deep into the parser
    // This is a problem with the parser, not the grammar
    #[error("Blank line encountered in rule parser (this is a problem with the parser, not the grammar)")]
    UnexpectedBlankLine,
    // There was an issue with reading a file
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
}

impl ErrorType for CompileErrorType {}

impl PartialEq for CompileErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CompileErrorType::FileError(a), CompileErrorType::FileError(b)) => a.kind() == b.kind(),
            (CompileErrorType::UnknownEscape(a), CompileErrorType::UnknownEscape(b)) => a == b,
            (CompileErrorType::DuplicateDefinition(a), CompileErrorType::DuplicateDefinition(b)) => a == b,
            (CompileErrorType::LiteralNamesRule(a), CompileErrorType::LiteralNamesRule(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

pub type CompileError = Error<CompileErrorType>;
pub type CompileErrors = Errors<CompileErrorType>;

fn io_error(error: std::io::Error, file: PathBuf) -> CompileError {
    CompileError {
        location: Location::whole_file(file),
        error: CompileErrorType::FileError(error),
    }
}

pub type Result<T> = std::result::Result<T, CompileErrorType>;
pub type LineResult<T> = std::result::Result<T, CompileError>;
pub type FileResult<T> = std::result::Result<T, CompileErrors>;

#[derive(PartialEq, Debug)]
struct Rule {
    symbol: String,
    rewrite: Rewrite,
    // Bare words on the right-hand side, for the undefined-symbol warnings
    bare_words: Vec<String>,
    // Quoted texts on the right-hand side
    literals: Vec<String>,
    location: Location,
}

fn parse_alternative(tokens: &[Token]) -> Result<Alternative> {
    tokens
        .iter()
        .map(|t| match t {
            Token::Equals => Err(CompileErrorType::UnexpectedEquals),
            Token::Or => Err(CompileErrorType::UnsplitRewrite),
            Token::Symbol(s) | Token::Literal(s) => Ok(grammar::Token::plain(s.as_str())),
        })
        .collect()
}

fn parse_rewrite(tokens: &[Token]) -> Result<Rewrite> {
    tokens.split(|t| *t == Token::Or).map(parse_alternative).collect()
}

fn parse_line(tokens: &[Token], location: Location) -> Result<Rule> {
    let symbol = match tokens.first() {
        Some(Token::Symbol(s)) => Ok(s.clone()),
        Some(_) => Err(CompileErrorType::MissingNonterminal),
        None => Err(CompileErrorType::UnexpectedBlankLine),
    }?;

    if tokens.get(1) != Some(&Token::Equals) {
        return Err(CompileErrorType::MissingEquals);
    }

    let rewrite = parse_rewrite(&tokens[2..])?;
    let bare_words = tokens[2..]
        .iter()
        .filter_map(|t| match t {
            Token::Symbol(s) => Some(s.clone()),
            _ => None,
        })
        .unique()
        .collect();
    let literals = tokens[2..]
        .iter()
        .filter_map(|t| match t {
            Token::Literal(s) => Some(s.clone()),
            _ => None,
        })
        .unique()
        .collect();

    Ok(Rule {
        symbol,
        rewrite,
        bare_words,
        literals,
        location,
    })
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<Rule> {
    lexer::lex_line(line)
        .and_then(|lexed_line| parse_line(&lexed_line, location.clone()))
        .map_err(|error| CompileError { location, error })
}

fn is_rule_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with(';')
}

// Rejects symbols defined on more than one line
fn check_duplicates(rules: &[Rule]) -> FileResult<()> {
    let mut seen = HashSet::with_capacity(rules.len());
    let errors = rules
        .iter()
        .filter(|rule| !seen.insert(rule.symbol.as_str()))
        .map(|rule| CompileError {
            location: rule.location.clone(),
            error: CompileErrorType::DuplicateDefinition(rule.symbol.clone()),
        })
        .collect_vec();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// Grammar tokens carry no terminal marker: text equal to a rule name expands
// as that rule. Quoted text must stay text, so such a collision is rejected.
fn check_literals(rules: &[Rule]) -> FileResult<()> {
    let defined: HashSet<&str> = rules.iter().map(|rule| rule.symbol.as_str()).collect();
    let errors = rules
        .iter()
        .flat_map(|rule| rule.literals.iter().map(move |literal| (rule, literal)))
        .filter(|(_, literal)| defined.contains(literal.as_str()))
        .map(|(rule, literal)| CompileError {
            location: rule.location.clone(),
            error: CompileErrorType::LiteralNamesRule(literal.clone()),
        })
        .collect_vec();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn grammar_from_rules(rule_list: Vec<Rule>) -> FileResult<Grammar> {
    check_duplicates(&rule_list)?;
    check_literals(&rule_list)?;

    for warning in find_warnings(&rule_list) {
        warn!(location = %warning.location, "{}", warning.error);
    }

    let start_symbol = rule_list.first().map(|rule| rule.symbol.clone()).unwrap_or_default();
    let grammar = rule_list
        .into_iter()
        .fold(Grammar::new(start_symbol), |grammar, rule| grammar.rule(rule.symbol, rule.rewrite));

    debug!(start = %grammar.start_symbol, rules = grammar.rules.len(), "parsed grammar");
    Ok(grammar)
}

/// Parses grammar text. `path` is only used in diagnostics.
pub fn parse_str(text: &str, path: &Path) -> FileResult<Grammar> {
    let numbered = text.lines().enumerate().map(|(num, line)| (num + 1, Ok(line.to_string())));
    parse_lines(numbered, path)
}

pub fn parse_file(path: &Path) -> FileResult<Grammar> {
    let file = File::open(path).map_err(|e| vec![io_error(e, path.to_path_buf())])?;
    let numbered = std::io::BufReader::new(file)
        .lines()
        .enumerate()
        .map(|(num, line)| (num + 1, line.map_err(|e| io_error(e, path.to_path_buf()))));
    parse_lines(numbered, path)
}

fn parse_lines(lines: impl Iterator<Item = (usize, LineResult<String>)>, path: &Path) -> FileResult<Grammar> {
    let (rules, errors): (Vec<_>, Vec<_>) = lines
        .filter(|(_, line)| line.as_ref().map_or(true, |l| is_rule_line(l)))
        .map(|(num, line_res)| line_res.and_then(|line| parse_lex_line(&line, Location::new(path.to_path_buf(), num))))
        .partition_result();

    if !errors.is_empty() {
        return Err(errors);
    }

    grammar_from_rules(rules)
}
