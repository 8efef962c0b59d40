use crate::ast::{BinaryOp, Expr, LiteralKind, UnaryOp};
use crate::error::Error;
use crate::lexer::{Lexer, Token};

/// Deepest run of parentheses, calls and unary operators the parser descends into.
pub const MAX_NESTING: usize = 128;

/// Tallest tree the parser builds, counting operator chains. Evaluation and
/// drop both recurse over the tree.
pub const MAX_HEIGHT: usize = 1024;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Token,
    look_pos: usize,
    // Open parentheses, calls and unary operators around the current token.
    depth: usize,
    // Height of the subtree most recently returned by a parse_* method.
    height: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self, Error> {
        let mut lexer = Lexer::new(input);
        let lookahead = lexer.next_token()?;
        let look_pos = lexer.last_start();
        Ok(Self { lexer, lookahead, look_pos, depth: 0, height: 0 })
    }

    fn bump(&mut self) -> Result<(), Error> {
        self.lookahead = self.lexer.next_token()?;
        self.look_pos = self.lexer.last_start();
        Ok(())
    }

    fn err_here<T>(&self, msg: &str) -> Result<T, Error> {
        Err(Error::syntax(msg, self.look_pos))
    }

    fn descend(&mut self) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return self.err_here("expression nested too deeply");
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    /// Height of a new node over children of height `child`.
    fn grow(&self, child: usize) -> Result<usize, Error> {
        if child >= MAX_HEIGHT {
            return self.err_here("expression nested too deeply");
        }
        Ok(child + 1)
    }

    /// Parses a single complete expression; trailing tokens are rejected.
    pub fn parse(&mut self) -> Result<Expr, Error> {
        let expr = self.parse_expr()?;
        match self.lookahead {
            Token::Eof => Ok(expr),
            _ => self.err_here("Unexpected token after end of expression"),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, Error> {
        self.parse_or()
    }

    /// One left-associative precedence level: `next (op next)*`.
    fn binary_chain(
        &mut self,
        next: fn(&mut Self) -> Result<Expr, Error>,
        op_for: fn(&Token) -> Option<BinaryOp>,
    ) -> Result<Expr, Error> {
        let mut node = next(self)?;
        let mut height = self.height;
        while let Some(op) = op_for(&self.lookahead) {
            self.bump()?;
            let rhs = next(self)?;
            height = self.grow(height.max(self.height))?;
            node = Expr::Binary(Box::new(node), op, Box::new(rhs));
        }
        self.height = height;
        Ok(node)
    }

    fn parse_or(&mut self) -> Result<Expr, Error> {
        self.binary_chain(Self::parse_and, |t| match t {
            Token::OrOr => Some(BinaryOp::Or),
            _ => None,
        })
    }

    fn parse_and(&mut self) -> Result<Expr, Error> {
        self.binary_chain(Self::parse_comparison, |t| match t {
            Token::AndAnd => Some(BinaryOp::And),
            _ => None,
        })
    }

    fn parse_comparison(&mut self) -> Result<Expr, Error> {
        self.binary_chain(Self::parse_additive, |t| match t {
            Token::EqEq => Some(BinaryOp::Eq),
            Token::NotEq => Some(BinaryOp::Ne),
            Token::Greater => Some(BinaryOp::Gt),
            Token::Less => Some(BinaryOp::Lt),
            Token::Ge => Some(BinaryOp::Ge),
            Token::Le => Some(BinaryOp::Le),
            _ => None,
        })
    }

    fn parse_additive(&mut self) -> Result<Expr, Error> {
        self.binary_chain(Self::parse_multiplicative, |t| match t {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, Error> {
        self.binary_chain(Self::parse_unary, |t| match t {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            Token::Percent => Some(BinaryOp::Rem),
            _ => None,
        })
    }

    fn parse_unary(&mut self) -> Result<Expr, Error> {
        let op = match self.lookahead {
            Token::Bang => UnaryOp::Not,
            Token::Minus => UnaryOp::Minus,
            Token::Plus => UnaryOp::Plus,
            _ => return self.parse_primary(),
        };
        self.bump()?;
        self.descend()?;
        let operand = self.parse_unary()?;
        self.ascend();
        self.height = self.grow(self.height)?;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn parse_primary(&mut self) -> Result<Expr, Error> {
        let (kind, raw) = match self.lookahead.clone() {
            Token::Int(raw) => (LiteralKind::Int, raw),
            Token::Float(raw) => (LiteralKind::Float, raw),
            Token::String(raw) => (LiteralKind::String, raw),
            Token::Char(raw) => (LiteralKind::Char, raw),
            Token::LParen => {
                self.bump()?;
                self.descend()?;
                let inner = self.parse_expr()?;
                let Token::RParen = self.lookahead else {
                    return self.err_here("Expected ')'");
                };
                self.bump()?;
                self.ascend();
                self.height = self.grow(self.height)?;
                return Ok(Expr::Paren(Box::new(inner)));
            }
            Token::Identifier(name) => {
                self.bump()?;
                let Token::LParen = self.lookahead else {
                    self.height = 1;
                    return Ok(Expr::Ident(name));
                };
                self.bump()?;
                self.descend()?;
                let args = self.parse_args()?;
                self.ascend();
                self.height = self.grow(self.height)?;
                return Ok(Expr::Call { name, args });
            }
            Token::Eof => return self.err_here("Unexpected end of expression"),
            other => {
                return Err(Error::syntax(format!("Unexpected token: {:?}", other), self.look_pos))
            }
        };
        self.bump()?;
        self.height = 1;
        Ok(Expr::Literal { kind, raw })
    }

    /// Argument list after the opening '('; consumes the closing ')'.
    /// Leaves the tallest argument's height in `self.height`.
    fn parse_args(&mut self) -> Result<Vec<Expr>, Error> {
        let mut args = Vec::new();
        let mut tallest = 0;
        loop {
            if let Token::RParen = self.lookahead {
                break;
            }
            args.push(self.parse_expr()?);
            tallest = tallest.max(self.height);
            match self.lookahead {
                Token::Comma => self.bump()?,
                Token::RParen => break,
                _ => return self.err_here("Expected ',' or ')' in argument list"),
            }
        }
        self.bump()?; // ')'
        self.height = tallest;
        Ok(args)
    }
}
