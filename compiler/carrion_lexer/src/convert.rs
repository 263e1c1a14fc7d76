//! Raw-token to `TokenKind` conversion: keyword recognition and literal
//! cooking.

use crate::raw::RawToken;
use carrion_ir::TokenKind;

pub(crate) fn convert(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        RawToken::Int => slice
            .parse::<i64>()
            .map(TokenKind::Int)
            .unwrap_or(TokenKind::Error),
        RawToken::Float => slice
            .parse::<f64>()
            .map(TokenKind::Float)
            .unwrap_or(TokenKind::Error),
        RawToken::Str => TokenKind::Str(cook_string(&slice[1..slice.len() - 1])),
        RawToken::DocString => {
            let body = slice
                .strip_prefix("\"\"\"")
                .unwrap_or(slice)
                .strip_suffix("\"\"\"")
                .unwrap_or_else(|| slice.strip_prefix("\"\"\"").unwrap_or(slice));
            TokenKind::DocString(body.to_string())
        }
        RawToken::Ident => keyword(slice).unwrap_or_else(|| TokenKind::Ident(slice.to_string())),
        RawToken::Eq => TokenKind::Eq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::PlusAssign => TokenKind::PlusAssign,
        RawToken::MinusAssign => TokenKind::MinusAssign,
        RawToken::StarAssign => TokenKind::StarAssign,
        RawToken::SlashAssign => TokenKind::SlashAssign,
        RawToken::Assign => TokenKind::Assign,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::NewlineIndent => unreachable!("handled by the lexer state machine"),
    }
}

fn keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        "spell" => Spell,
        "grim" => Grim,
        "init" => Init,
        "self" => SelfKw,
        "if" => If,
        "otherwise" => Otherwise,
        "else" => Else,
        "for" => For,
        "in" => In,
        "while" => While,
        "return" => Return,
        "attempt" => Attempt,
        "ensnare" => Ensnare,
        "resolve" => Resolve,
        "raise" => Raise,
        "import" => Import,
        "as" => As,
        "match" => Match,
        "case" => Case,
        "stop" => Stop,
        "skip" => Skip,
        "ignore" => Ignore,
        "True" => True,
        "False" => False,
        "None" => NoneKw,
        "and" => And,
        "or" => Or,
        "not" => Not,
        "main" => Main,
        "global" => Global,
        "autoclose" => Autoclose,
        "arcane" => Arcane,
        "arcanespell" => Arcanespell,
        "super" => Super,
        "check" => Check,
        _ => return None,
    })
}

/// Resolve escape sequences in a string literal body. Unknown escapes are
/// preserved literally.
fn cook_string(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('0') => out.push('\0'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::cook_string;

    #[test]
    fn known_escapes_resolve() {
        assert_eq!(cook_string(r"a\nb\tc"), "a\nb\tc");
        assert_eq!(cook_string(r#"\"quoted\""#), "\"quoted\"");
    }

    #[test]
    fn unknown_escapes_survive() {
        assert_eq!(cook_string(r"\q"), r"\q");
    }
}
