/*
    Assignment statements such as `b = (a + 1);`. A statement may only read
    variables assigned by earlier statements: the assigned name goes to the
    pending scope and is committed by the statement terminator.
*/

use crate::generator::{GenResult, Session, Tree};
use crate::grammar::{alt, Alternative, Grammar, Hooks, Thunk, Token};

/// Read in place of a variable when none has been committed yet.
pub const UNDEFINED_VARIABLE: &str = "00";

// Registers the freshly generated name as pending.
fn defining_var(session: &mut Session<'_>, tree: Tree) -> GenResult<Tree> {
    session.scope.define(tree.render());
    Ok(tree)
}

// Reads a committed name instead of generating a new one.
fn defined_var(session: &mut Session<'_>, _symbol: &str, _thunk: Thunk<'_>) -> GenResult<Tree> {
    let visible = session.scope.visible().to_vec();
    if visible.is_empty() {
        return Ok(Tree::leaf(UNDEFINED_VARIABLE));
    }
    Ok(Tree::leaf(session.choose(&visible)?.as_str()))
}

fn sync(session: &mut Session<'_>, tree: Tree) -> GenResult<Tree> {
    session.scope.commit();
    Ok(tree)
}

pub fn assignments() -> Grammar {
    let terminator = || Token::hooked(";\n", Hooks::new().post(sync));

    let expr: Vec<Alternative> = vec![
        alt(&["<expr>", " + ", "<expr>"]),
        alt(&["<expr>", " - ", "<expr>"]),
        alt(&["(", "<expr>", ")"]),
        vec![Token::hooked("<var>", Hooks::new().pre(defined_var))],
        alt(&["<digit>"]),
    ];

    Grammar::new("<start>")
        .rule("<start>", vec![alt(&["<assignments>"])])
        .rule(
            "<assignments>",
            vec![
                vec![Token::plain("<assign>"), terminator()],
                vec![Token::plain("<assign>"), terminator(), Token::plain("<assignments>")],
            ],
        )
        .rule(
            "<assign>",
            vec![vec![
                Token::hooked("<var>", Hooks::new().post(defining_var)),
                Token::plain(" = "),
                Token::plain("<expr>"),
            ]],
        )
        .rule("<expr>", expr)
        .rule("<digit>", vec![alt(&["0"]), alt(&["1"])])
        .rule("<var>", ('a'..='z').map(|c| vec![Token::plain(c.to_string())]).collect())
}
