//! Pratt expression parser.

use crate::Parser;
use carrion_ir::ast::*;
use carrion_ir::{Span, TokenKind};

/// Binding powers, loosest to tightest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Or,
    And,
    Comparison,
    Sum,
    Product,
    Prefix,
}

fn infix_precedence(kind: &TokenKind) -> Option<(Precedence, &'static str)> {
    use TokenKind::*;
    Some(match kind {
        Or => (Precedence::Or, "or"),
        And => (Precedence::And, "and"),
        Eq => (Precedence::Comparison, "=="),
        NotEq => (Precedence::Comparison, "!="),
        Lt => (Precedence::Comparison, "<"),
        Gt => (Precedence::Comparison, ">"),
        LtEq => (Precedence::Comparison, "<="),
        GtEq => (Precedence::Comparison, ">="),
        Plus => (Precedence::Sum, "+"),
        Minus => (Precedence::Sum, "-"),
        Star => (Precedence::Product, "*"),
        Slash => (Precedence::Product, "/"),
        Percent => (Precedence::Product, "%"),
        _ => return None,
    })
}

/// Precedence of an operator spelling, shared with the formatter's
/// parenthesization decisions.
pub fn operator_precedence(op: &str) -> u8 {
    match op {
        "or" => 1,
        "and" => 2,
        "==" | "!=" | "<" | ">" | "<=" | ">=" => 3,
        "+" | "-" => 4,
        "*" | "/" | "%" => 5,
        _ => 6,
    }
}

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, ()> {
        self.parse_precedence(Precedence::Lowest)
    }

    fn parse_precedence(&mut self, min: Precedence) -> Result<Expression, ()> {
        let mut left = self.parse_prefix()?;

        loop {
            let Some((prec, op)) = infix_precedence(self.peek()) else {
                break;
            };
            if prec <= min {
                break;
            }
            self.bump();
            let right = self.parse_precedence(prec)?;
            let span = left.span().merge(right.span());
            left = Expression::Infix(InfixExpression {
                left: Box::new(left),
                operator: op.to_string(),
                right: Box::new(right),
                span,
            });
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expression, ()> {
        match self.peek() {
            TokenKind::Minus => self.parse_prefix_op("-"),
            TokenKind::Not => self.parse_prefix_op("not"),
            _ => self.parse_postfix(),
        }
    }

    fn parse_prefix_op(&mut self, op: &str) -> Result<Expression, ()> {
        let start = self.bump().span;
        let operand = self.parse_precedence(Precedence::Prefix)?;
        let span = start.merge(operand.span());
        Ok(Expression::Prefix(PrefixExpression {
            operator: op.to_string(),
            operand: Box::new(operand),
            span,
        }))
    }

    fn parse_postfix(&mut self) -> Result<Expression, ()> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                TokenKind::LParen => {
                    let args = self.parse_call_args()?;
                    let span = expr.span().merge(self.prev_span());
                    expr = Expression::Call(CallExpression {
                        callee: Box::new(expr),
                        args,
                        span,
                    });
                }
                TokenKind::Dot => {
                    self.bump();
                    let (property, property_span) = self.expect_property()?;
                    let span = expr.span().merge(property_span);
                    expr = Expression::Dot(DotExpression {
                        object: Box::new(expr),
                        property,
                        property_span,
                        span,
                    });
                }
                TokenKind::LBracket => {
                    expr = self.parse_index_or_slice(expr)?;
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expression>, ()> {
        self.bump(); // (
        let mut args = Vec::new();
        if self.peek() == &TokenKind::RParen {
            self.bump();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            match self.peek() {
                TokenKind::Comma => {
                    self.bump();
                }
                TokenKind::RParen => {
                    self.bump();
                    break;
                }
                other => {
                    let msg = format!("expected , or ) in call, found {}", other.describe());
                    self.error(msg, self.current_span());
                    return Err(());
                }
            }
        }
        Ok(args)
    }

    /// `[index]`, `[start:end]`, `[:end]`, `[start:]`.
    fn parse_index_or_slice(&mut self, object: Expression) -> Result<Expression, ()> {
        self.bump(); // [
        let start_expr = if self.peek() == &TokenKind::Colon {
            None
        } else {
            Some(self.parse_expression()?)
        };

        if self.peek() == &TokenKind::Colon {
            self.bump();
            let end_expr = if self.peek() == &TokenKind::RBracket {
                None
            } else {
                Some(self.parse_expression()?)
            };
            let close = self.expect_token(&TokenKind::RBracket)?;
            let span = object.span().merge(close);
            return Ok(Expression::Slice(SliceExpression {
                object: Box::new(object),
                start: start_expr.map(Box::new),
                end: end_expr.map(Box::new),
                span,
            }));
        }

        let Some(index) = start_expr else {
            self.error("expected index expression", self.current_span());
            return Err(());
        };
        let close = self.expect_token(&TokenKind::RBracket)?;
        let span = object.span().merge(close);
        Ok(Expression::Index(IndexExpression {
            object: Box::new(object),
            index: Box::new(index),
            span,
        }))
    }

    fn parse_primary(&mut self) -> Result<Expression, ()> {
        let tok = self.bump();
        let span = tok.span;
        Ok(match tok.kind {
            TokenKind::Int(value) => Expression::IntegerLit(IntegerLit { value, span }),
            TokenKind::Float(value) => Expression::FloatLit(FloatLit { value, span }),
            TokenKind::Str(value) => Expression::StringLit(StringLit { value, span }),
            TokenKind::DocString(value) => Expression::StringLit(StringLit { value, span }),
            TokenKind::True => Expression::BoolLit(BoolLit { value: true, span }),
            TokenKind::False => Expression::BoolLit(BoolLit { value: false, span }),
            TokenKind::NoneKw => Expression::NoneLit(span),
            TokenKind::Ident(name) => Expression::Identifier(Identifier { name, span }),
            TokenKind::SelfKw => Expression::Identifier(Identifier {
                name: "self".to_string(),
                span,
            }),
            TokenKind::Super => Expression::Identifier(Identifier {
                name: "super".to_string(),
                span,
            }),
            TokenKind::LParen => return self.parse_paren(span),
            TokenKind::LBracket => return self.parse_array(span),
            TokenKind::LBrace => return self.parse_hash(span),
            other => {
                let msg = format!("expected expression, found {}", other.describe());
                self.error(msg, span);
                return Err(());
            }
        })
    }

    /// `(expr)` grouping or `(a, b, ...)` tuple.
    fn parse_paren(&mut self, open: Span) -> Result<Expression, ()> {
        if self.peek() == &TokenKind::RParen {
            let close = self.bump().span;
            return Ok(Expression::TupleLit(TupleLit {
                elements: Vec::new(),
                span: open.merge(close),
            }));
        }
        let first = self.parse_expression()?;
        if self.peek() != &TokenKind::Comma {
            // Grouping parens are not kept in the tree; the formatter
            // re-derives them from precedence.
            self.expect_token(&TokenKind::RParen)?;
            return Ok(first);
        }

        let mut elements = vec![first];
        while self.peek() == &TokenKind::Comma {
            self.bump();
            if self.peek() == &TokenKind::RParen {
                break;
            }
            elements.push(self.parse_expression()?);
        }
        let close = self.expect_token(&TokenKind::RParen)?;
        Ok(Expression::TupleLit(TupleLit {
            elements,
            span: open.merge(close),
        }))
    }

    fn parse_array(&mut self, open: Span) -> Result<Expression, ()> {
        let mut elements = Vec::new();
        if self.peek() == &TokenKind::RBracket {
            let close = self.bump().span;
            return Ok(Expression::ArrayLit(ArrayLit {
                elements,
                span: open.merge(close),
            }));
        }
        loop {
            elements.push(self.parse_expression()?);
            match self.peek() {
                TokenKind::Comma => {
                    self.bump();
                    if self.peek() == &TokenKind::RBracket {
                        break;
                    }
                }
                TokenKind::RBracket => break,
                other => {
                    let msg = format!("expected , or ] in array, found {}", other.describe());
                    self.error(msg, self.current_span());
                    return Err(());
                }
            }
        }
        let close = self.expect_token(&TokenKind::RBracket)?;
        Ok(Expression::ArrayLit(ArrayLit {
            elements,
            span: open.merge(close),
        }))
    }

    fn parse_hash(&mut self, open: Span) -> Result<Expression, ()> {
        let mut pairs = Vec::new();
        if self.peek() == &TokenKind::RBrace {
            let close = self.bump().span;
            return Ok(Expression::HashLit(HashLit {
                pairs,
                span: open.merge(close),
            }));
        }
        loop {
            let key = self.parse_expression()?;
            self.expect_token(&TokenKind::Colon)?;
            let value = self.parse_expression()?;
            pairs.push((key, value));
            match self.peek() {
                TokenKind::Comma => {
                    self.bump();
                    if self.peek() == &TokenKind::RBrace {
                        break;
                    }
                }
                TokenKind::RBrace => break,
                other => {
                    let msg = format!("expected , or }} in hash, found {}", other.describe());
                    self.error(msg, self.current_span());
                    return Err(());
                }
            }
        }
        let close = self.expect_token(&TokenKind::RBrace)?;
        Ok(Expression::HashLit(HashLit {
            pairs,
            span: open.merge(close),
        }))
    }

    /// Property names after `.` are identifiers, but `init` is also legal
    /// (`super.init`).
    fn expect_property(&mut self) -> Result<(String, Span), ()> {
        match self.peek() {
            TokenKind::Ident(_) => {
                let tok = self.bump();
                let TokenKind::Ident(name) = tok.kind else {
                    unreachable!()
                };
                Ok((name, tok.span))
            }
            TokenKind::Init => {
                let tok = self.bump();
                Ok(("init".to_string(), tok.span))
            }
            other => {
                let msg = format!("expected property name, found {}", other.describe());
                self.error(msg, self.current_span());
                Err(())
            }
        }
    }

    fn expect_token(&mut self, kind: &TokenKind) -> Result<Span, ()> {
        if self.peek() == kind {
            Ok(self.bump().span)
        } else {
            let msg = format!(
                "expected {}, found {}",
                kind.describe(),
                self.peek().describe()
            );
            self.error(msg, self.current_span());
            Err(())
        }
    }

}
