//! Recursive-descent parser producing the AST described in `ast.rs`.

use crate::dsl::ast::{BinOp, Expr, FlagOp, ShapeExpr, ShapeKind, Target, Term};
use crate::dsl::lexer::{lex, SpannedToken, Token};
use crate::error::{Error, Pos, Result};

pub fn parse(src: &str) -> Result<Term> {
    let tokens = lex(src)?;
    let mut parser = Parser { tokens, pos: 0 };
    let term = parser.parse_terms_until_eof()?;
    Ok(term)
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn peek_pos(&self) -> Pos {
        self.tokens[self.pos].pos
    }

    fn advance(&mut self) -> SpannedToken {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<SpannedToken> {
        if self.peek() == expected {
            Ok(self.advance())
        } else {
            Err(Error::parse(
                self.peek_pos(),
                format!("expected {expected:?}, found {:?}", self.peek()),
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<(String, Pos)> {
        let pos = self.peek_pos();
        match self.peek().clone() {
            Token::Ident(name) => {
                self.advance();
                Ok((name, pos))
            }
            other => Err(Error::parse(pos, format!("expected identifier, found {other:?}"))),
        }
    }

    /// Top-level: a semicolon-separated `terms` sequence, with an optional
    /// trailing semicolon, ending at EOF.
    fn parse_terms_until_eof(&mut self) -> Result<Term> {
        let mut terms = Vec::new();
        while *self.peek() != Token::Eof {
            terms.push(self.parse_term()?);
            if *self.peek() == Token::Semicolon {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&Token::Eof)?;
        Ok(Term::Terms(terms))
    }

    /// A brace-wrapped `{ terms }`, or a single bare term (used as the body
    /// of `duration`/`for`).
    fn parse_block(&mut self) -> Result<Term> {
        if *self.peek() == Token::LBrace {
            self.advance();
            let mut terms = Vec::new();
            while *self.peek() != Token::RBrace {
                terms.push(self.parse_term()?);
                if *self.peek() == Token::Semicolon {
                    self.advance();
                } else {
                    break;
                }
            }
            self.expect(&Token::RBrace)?;
            Ok(Term::Terms(terms))
        } else {
            self.parse_term()
        }
    }

    fn parse_term(&mut self) -> Result<Term> {
        match self.peek().clone() {
            Token::Appear | Token::Disappear | Token::Consider | Token::Ignore => {
                self.parse_flag()
            }
            Token::Move => self.parse_move(),
            Token::Duration => self.parse_duration(),
            Token::For => self.parse_for(),
            Token::Ident(_) => self.parse_array_decl_or_shape_init(),
            other => Err(Error::parse(self.peek_pos(), format!("unexpected token {other:?}"))),
        }
    }

    fn parse_flag(&mut self) -> Result<Term> {
        let pos = self.peek_pos();
        let op = match self.advance().token {
            Token::Appear => FlagOp::Appear,
            Token::Disappear => FlagOp::Disappear,
            Token::Consider => FlagOp::Consider,
            Token::Ignore => FlagOp::Ignore,
            _ => unreachable!(),
        };
        let target = self.parse_target()?;
        Ok(Term::Flag { op, target, pos })
    }

    fn parse_move(&mut self) -> Result<Term> {
        let pos = self.peek_pos();
        self.expect(&Token::Move)?;
        let target = self.parse_target()?;
        self.expect(&Token::By)?;
        let dx = self.parse_expr()?;
        self.expect(&Token::Comma)?;
        let dy = self.parse_expr()?;
        Ok(Term::Move { target, dx, dy, pos })
    }

    fn parse_duration(&mut self) -> Result<Term> {
        let pos = self.peek_pos();
        self.expect(&Token::Duration)?;
        let t = self.parse_expr()?;
        let body = Box::new(self.parse_block()?);
        Ok(Term::Duration { t, body, pos })
    }

    fn parse_for(&mut self) -> Result<Term> {
        let pos = self.peek_pos();
        self.expect(&Token::For)?;
        self.expect(&Token::LParen)?;
        let (var, _) = self.expect_ident()?;
        self.expect(&Token::Eq)?;
        let lo = self.parse_expr()?;
        self.expect(&Token::Arrow)?;
        let hi = self.parse_expr()?;
        self.expect(&Token::RParen)?;
        let body = Box::new(self.parse_block()?);
        Ok(Term::For { var, lo, hi, body, pos })
    }

    /// `NAME = Array(...)` or `NAME[i]… := shape_expr [, "fill"]`.
    fn parse_array_decl_or_shape_init(&mut self) -> Result<Term> {
        let (name, pos) = self.expect_ident()?;
        match self.peek() {
            Token::Eq => {
                self.advance();
                let (dims, kind) = self.parse_array_dims()?;
                Ok(Term::ArrayDecl { name, dims, kind, pos })
            }
            Token::LBracket | Token::Assign => {
                let indices = self.parse_index_brackets()?;
                let target = Target { name, indices, pos };
                self.expect(&Token::Assign)?;
                let shape = self.parse_shape_expr()?;
                let fill = if *self.peek() == Token::Comma {
                    self.advance();
                    match self.advance().token {
                        Token::StringLit(s) => Some(s),
                        other => {
                            return Err(Error::parse(
                                pos,
                                format!("expected a quoted fill color, found {other:?}"),
                            ))
                        }
                    }
                } else {
                    None
                };
                Ok(Term::ShapeInit { target, shape, fill, pos })
            }
            other => Err(Error::parse(pos, format!("unexpected token after identifier: {other:?}"))),
        }
    }

    /// `Array(N, Array(N, …, KIND))`, returning the flattened dimension
    /// list and the innermost kind.
    fn parse_array_dims(&mut self) -> Result<(Vec<Expr>, ShapeKind)> {
        self.expect(&Token::Array)?;
        self.expect(&Token::LParen)?;
        let dim = self.parse_expr()?;
        self.expect(&Token::Comma)?;
        let (mut rest, kind) = if *self.peek() == Token::Array {
            self.parse_array_dims()?
        } else {
            let kind = match self.advance().token {
                Token::Rect => ShapeKind::Rect,
                Token::Circle => ShapeKind::Circle,
                other => {
                    return Err(Error::parse(
                        self.peek_pos(),
                        format!("expected Rect or Circle, found {other:?}"),
                    ))
                }
            };
            (Vec::new(), kind)
        };
        // Every level owns exactly one closing paren, whether its second
        // argument was a leaf KIND or a nested Array(...) (which already
        // consumed its own).
        self.expect(&Token::RParen)?;
        let mut dims = vec![dim];
        dims.append(&mut rest);
        Ok((dims, kind))
    }

    fn parse_index_brackets(&mut self) -> Result<Vec<Expr>> {
        let mut indices = Vec::new();
        while *self.peek() == Token::LBracket {
            self.advance();
            indices.push(self.parse_expr()?);
            self.expect(&Token::RBracket)?;
        }
        Ok(indices)
    }

    fn parse_target(&mut self) -> Result<Target> {
        let (name, pos) = self.expect_ident()?;
        let indices = self.parse_index_brackets()?;
        Ok(Target { name, indices, pos })
    }

    fn parse_shape_expr(&mut self) -> Result<ShapeExpr> {
        let pos = self.peek_pos();
        let kind = match self.advance().token {
            Token::Rect => ShapeKind::Rect,
            Token::Circle => ShapeKind::Circle,
            other => return Err(Error::parse(pos, format!("expected Rect or Circle, found {other:?}"))),
        };
        self.expect(&Token::LParen)?;
        let mut args = vec![self.parse_expr()?];
        while *self.peek() == Token::Comma {
            self.advance();
            args.push(self.parse_expr()?);
        }
        self.expect(&Token::RParen)?;
        Ok(ShapeExpr { kind, args, pos })
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_sum()
    }

    fn parse_sum(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_prod()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            let pos = self.peek_pos();
            self.advance();
            let rhs = self.parse_prod()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs), pos);
        }
        Ok(lhs)
    }

    fn parse_prod(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_atom()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => break,
            };
            let pos = self.peek_pos();
            self.advance();
            let rhs = self.parse_atom()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs), pos);
        }
        Ok(lhs)
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        let pos = self.peek_pos();
        match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Num(n, pos))
            }
            Token::Ident(name) => {
                self.advance();
                Ok(Expr::Var(name, pos))
            }
            Token::Max => {
                self.advance();
                self.expect(&Token::LParen)?;
                let mut items = vec![self.parse_expr()?];
                while *self.peek() == Token::Comma {
                    self.advance();
                    items.push(self.parse_expr()?);
                }
                self.expect(&Token::RParen)?;
                Ok(Expr::Max(items, pos))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            other => Err(Error::parse(pos, format!("unexpected token in expression: {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_decl() {
        let term = parse("A = Array(2, Rect);").unwrap();
        match term {
            Term::Terms(items) => match &items[0] {
                Term::ArrayDecl { name, dims, kind, .. } => {
                    assert_eq!(name, "A");
                    assert_eq!(dims.len(), 1);
                    assert_eq!(*kind, ShapeKind::Rect);
                }
                other => panic!("unexpected term: {other:?}"),
            },
            other => panic!("unexpected top level: {other:?}"),
        }
    }

    #[test]
    fn parses_nested_array_decl() {
        let term = parse("A = Array(2, Array(3, Circle));").unwrap();
        if let Term::Terms(items) = term {
            if let Term::ArrayDecl { dims, kind, .. } = &items[0] {
                assert_eq!(dims.len(), 2);
                assert_eq!(*kind, ShapeKind::Circle);
                return;
            }
        }
        panic!("expected nested array decl");
    }

    #[test]
    fn parses_shape_init_with_fill() {
        let term = parse(r#"A[1] := Rect(0, 0, 10, 10), "336699";"#).unwrap();
        if let Term::Terms(items) = term {
            if let Term::ShapeInit { fill, target, .. } = &items[0] {
                assert_eq!(fill.as_deref(), Some("336699"));
                assert_eq!(target.indices.len(), 1);
                return;
            }
        }
        panic!("expected shape init");
    }

    #[test]
    fn parses_for_and_duration() {
        let src = "for (i = 1 -> 3) { duration 1 { move A[i] by 1, 0 } }";
        let term = parse(src).unwrap();
        if let Term::Terms(items) = term {
            assert!(matches!(items[0], Term::For { .. }));
            return;
        }
        panic!("expected for loop");
    }

    #[test]
    fn rejects_malformed_program() {
        assert!(parse("A = Array(2,").is_err());
    }
}
