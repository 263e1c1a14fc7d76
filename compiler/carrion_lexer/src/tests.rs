//! Lexer tests: token kinds, indentation structure, positions.

use crate::lex;
use carrion_ir::TokenKind;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

#[test]
fn flat_assignment() {
    assert_eq!(
        kinds("x = 42"),
        vec![
            TokenKind::Ident("x".into()),
            TokenKind::Assign,
            TokenKind::Int(42),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn block_produces_indent_dedent() {
    let got = kinds("spell f():\n    return 1\n");
    assert_eq!(
        got,
        vec![
            TokenKind::Spell,
            TokenKind::Ident("f".into()),
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Return,
            TokenKind::Int(1),
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn nested_blocks_close_together() {
    let src = "grim A:\n    spell m():\n        return 1\n";
    let got = kinds(src);
    let dedents = got
        .iter()
        .filter(|k| matches!(k, TokenKind::Dedent))
        .count();
    assert_eq!(dedents, 2);
    assert_eq!(got.last(), Some(&TokenKind::Eof));
}

#[test]
fn blank_and_comment_lines_keep_depth() {
    let src = "spell f():\n    a = 1\n\n    # note\n    b = 2\n";
    let got = kinds(src);
    let indents = got
        .iter()
        .filter(|k| matches!(k, TokenKind::Indent))
        .count();
    let dedents = got
        .iter()
        .filter(|k| matches!(k, TokenKind::Dedent))
        .count();
    assert_eq!(indents, 1);
    assert_eq!(dedents, 1);
}

#[test]
fn string_literal_is_cooked() {
    let got = kinds(r#"s = "a\nb""#);
    assert!(got.contains(&TokenKind::Str("a\nb".into())));
}

#[test]
fn docstring_spans_lines() {
    let src = "spell f():\n    \"\"\"first\n    second\"\"\"\n    return 1\n";
    let toks = lex(src);
    let doc = toks
        .iter()
        .find(|t| matches!(t.kind, TokenKind::DocString(_)))
        .expect("docstring token");
    match &doc.kind {
        TokenKind::DocString(body) => assert!(body.contains("first")),
        _ => unreachable!(),
    }
    // The token after the docstring still gets a correct line number.
    let ret = toks
        .iter()
        .find(|t| matches!(t.kind, TokenKind::Return))
        .expect("return token");
    assert_eq!(ret.line, 3);
    assert_eq!(ret.column, 4);
}

#[test]
fn operators_and_compound_assign() {
    let got = kinds("a += b * 2 <= c");
    assert!(got.contains(&TokenKind::PlusAssign));
    assert!(got.contains(&TokenKind::Star));
    assert!(got.contains(&TokenKind::LtEq));
}

#[test]
fn invalid_character_yields_error_token() {
    let got = kinds("x = @");
    assert!(got.contains(&TokenKind::Error));
    assert_eq!(got.last(), Some(&TokenKind::Eof));
}

#[test]
fn positions_are_zero_based() {
    let toks = lex("a = 1\nbb = 2\n");
    let bb = toks
        .iter()
        .find(|t| t.kind == TokenKind::Ident("bb".into()))
        .unwrap();
    assert_eq!(bb.line, 1);
    assert_eq!(bb.column, 0);
    assert_eq!(bb.span.len(), 2);
}

#[test]
fn empty_source_is_just_eof() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
}

#[test]
fn brackets_join_lines() {
    let src = "x = [\n    1,\n    2\n]\n";
    let got = kinds(src);
    // No Indent/Dedent inside the bracketed literal, single trailing Newline.
    assert!(!got.contains(&TokenKind::Indent));
    assert!(!got.contains(&TokenKind::Dedent));
    let newlines = got
        .iter()
        .filter(|k| matches!(k, TokenKind::Newline))
        .count();
    assert_eq!(newlines, 1);
}

#[test]
fn keywords_are_recognized() {
    for (src, kind) in [
        ("grim", TokenKind::Grim),
        ("otherwise", TokenKind::Otherwise),
        ("ensnare", TokenKind::Ensnare),
        ("autoclose", TokenKind::Autoclose),
        ("arcanespell", TokenKind::Arcanespell),
        ("True", TokenKind::True),
        ("None", TokenKind::NoneKw),
    ] {
        assert_eq!(kinds(src)[0], kind, "keyword {src}");
    }
    // Not a keyword: prefixed identifier.
    assert_eq!(
        kinds("spellbook")[0],
        TokenKind::Ident("spellbook".into())
    );
}
