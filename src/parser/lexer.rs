use itertools::{Itertools, PeekingNext};

use super::{CompileErrorType, Result};

#[derive(PartialEq, Debug)]
pub enum Token {
    Equals,
    Or,
    // A bare word: names a rule when the grammar defines it
    Symbol(String),
    // Quoted text with escapes resolved
    Literal(String),
}

fn unescape(c: char) -> Result<char> {
    match c {
        'n' => Ok('\n'),
        't' => Ok('\t'),
        '"' => Ok('"'),
        '\\' => Ok('\\'),
        other => Err(CompileErrorType::UnknownEscape(other)),
    }
}

pub fn lex_literal(line: &mut impl Iterator<Item = char>) -> Result<Token> {
    line.next(); // Consume open quote
    let mut text = String::new();
    loop {
        match line.next() {
            Some('"') => return Ok(Token::Literal(text)),
            Some('\\') => {
                let escaped = line.next().ok_or(CompileErrorType::UnmatchedQuote)?;
                text.push(unescape(escaped)?);
            }
            Some(c) => text.push(c),
            None => return Err(CompileErrorType::UnmatchedQuote),
        }
    }
}

pub fn lex_symbol(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    Ok(Token::Symbol(line.peeking_take_while(|c| !c.is_whitespace()).collect()))
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    let mut line_chars = line.chars().peekable();

    while let Some(c) = line_chars.peek() {
        if *c == '=' {
            line_chars.next();
            tokens.push(Token::Equals);
        } else if *c == '|' {
            line_chars.next();
            tokens.push(Token::Or);
        } else if *c == '"' {
            tokens.push(lex_literal(&mut line_chars)?);
        } else if !c.is_whitespace() {
            tokens.push(lex_symbol(&mut line_chars)?);
        } else {
            line_chars.next();
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;

    #[test]
    fn lex_normal_literal() {
        let lines = vec![
            "\"alpha\" <bravo> <charlie>",
            "\" = \"",
            "\"(\"\")\"",
        ];
        // (result from the function, rest of the iterator)
        let answers = vec![
            (Token::Literal("alpha".to_string()), " <bravo> <charlie>"),
            (Token::Literal(" = ".to_string()), ""),
            (Token::Literal("(".to_string()), "\")\""),
        ];

        for (line, (answer_token, answer_rest)) in zip(lines, answers) {
            let mut chars = line.chars();
            assert_eq!(lex_literal(&mut chars).unwrap(), answer_token);
            assert_eq!(chars.collect::<String>(), answer_rest);
        }
    }

    #[test]
    fn lex_escaped_literal() {
        let mut chars = r#"";\n" rest"#.chars();
        assert_eq!(lex_literal(&mut chars).unwrap(), Token::Literal(";\n".to_string()));

        let mut chars = r#""say \"hi\"\\""#.chars();
        assert_eq!(lex_literal(&mut chars).unwrap(), Token::Literal("say \"hi\"\\".to_string()));

        let mut chars = r#""\q""#.chars();
        assert_eq!(lex_literal(&mut chars).unwrap_err(), CompileErrorType::UnknownEscape('q'));
    }

    #[test]
    fn lex_mismatched_literal() {
        let lines = vec!["\"welcome", "\"alpha bravo charlie", "\"trailing\\"];

        for line in lines {
            let mut chars = line.chars();
            assert_eq!(lex_literal(&mut chars).unwrap_err(), CompileErrorType::UnmatchedQuote);
        }
    }

    #[test]
    fn lex_normal_symbol() {
        let lines = vec!["<alpha> <bravo>", "<delta>", "january february"];
        // (result from the function, rest of the iterator)
        let answers = vec![
            (Token::Symbol("<alpha>".to_string()), " <bravo>"),
            (Token::Symbol("<delta>".to_string()), ""),
            (Token::Symbol("january".to_string()), " february"),
        ];

        for (line, (answer_token, answer_rest)) in zip(lines, answers) {
            let mut chars = line.chars().peekable();
            assert_eq!(lex_symbol(&mut chars).unwrap(), answer_token);
            assert_eq!(chars.collect::<String>(), answer_rest);
        }
    }

    #[test]
    fn lex_normal_line() {
        let lines = vec![
            "<expr> = <expr> \" + \" <expr> | \"(\" <expr> \")\"",
            "<digit> = \"0\" | \"1\" | \"\"",
        ];
        let answers = vec![
            vec![
                Token::Symbol("<expr>".to_string()),
                Token::Equals,
                Token::Symbol("<expr>".to_string()),
                Token::Literal(" + ".to_string()),
                Token::Symbol("<expr>".to_string()),
                Token::Or,
                Token::Literal("(".to_string()),
                Token::Symbol("<expr>".to_string()),
                Token::Literal(")".to_string()),
            ],
            vec![
                Token::Symbol("<digit>".to_string()),
                Token::Equals,
                Token::Literal("0".to_string()),
                Token::Or,
                Token::Literal("1".to_string()),
                Token::Or,
                Token::Literal("".to_string()),
            ],
        ];

        for (line, answer) in zip(lines, answers) {
            assert_eq!(lex_line(line).unwrap(), answer)
        }
    }
}
