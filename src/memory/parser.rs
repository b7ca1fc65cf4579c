// SQL parser - SELECT statements for the in-memory executor

use super::lexer::Lexer;
use super::token::Token;
use crate::expression::{ArithmeticOp, CompareOp, LogicalOp};
use crate::value::Value;
use anyhow::{bail, Result};

/// Reference to a bound parameter
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceholderRef {
    /// `?`, numbered by position of appearance from zero
    Positional(usize),
    /// `$n`, one-based
    Numbered(usize),
    /// `@name`
    Named(String),
}

/// Expression tree of a WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    Column(String),
    Literal(Value),
    Placeholder(PlaceholderRef),
    Compare {
        op: CompareOp,
        left: Box<SqlExpr>,
        right: Box<SqlExpr>,
    },
    Arithmetic {
        op: ArithmeticOp,
        left: Box<SqlExpr>,
        right: Box<SqlExpr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<SqlExpr>,
        right: Box<SqlExpr>,
    },
    Not(Box<SqlExpr>),
    Negate(Box<SqlExpr>),
    IsNull {
        expr: Box<SqlExpr>,
        negated: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    Columns(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub projection: Projection,
    pub table: String,
    pub filter: Option<SqlExpr>,
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    positional_count: usize,
}

impl Parser {
    pub fn new(sql: &str) -> Result<Self> {
        let tokens = Lexer::new(sql).tokenize()?;
        Ok(Parser {
            tokens,
            position: 0,
            positional_count: 0,
        })
    }

    /// Parse a single SELECT statement
    pub fn parse(&mut self) -> Result<SelectStatement> {
        self.expect_token(Token::Select)?;
        let projection = self.parse_projection()?;

        self.expect_token(Token::From)?;
        let table = self.expect_identifier()?;

        let filter = if self.match_token(&Token::Where) {
            self.advance();
            Some(self.parse_expression()?)
        } else {
            None
        };

        if self.match_token(&Token::Semicolon) {
            self.advance();
        }
        if !self.match_token(&Token::Eof) {
            bail!("Unexpected token after statement: {:?}", self.current_token());
        }

        Ok(SelectStatement {
            projection,
            table,
            filter,
        })
    }

    /// Number of `?` placeholders seen so far
    pub fn positional_count(&self) -> usize {
        self.positional_count
    }

    fn parse_projection(&mut self) -> Result<Projection> {
        if self.match_token(&Token::Star) {
            self.advance();
            return Ok(Projection::All);
        }

        let mut columns = vec![self.expect_identifier()?];
        while self.match_token(&Token::Comma) {
            self.advance();
            columns.push(self.expect_identifier()?);
        }
        Ok(Projection::Columns(columns))
    }

    fn parse_expression(&mut self) -> Result<SqlExpr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<SqlExpr> {
        let mut left = self.parse_and()?;

        while self.match_token(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = SqlExpr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> Result<SqlExpr> {
        let mut left = self.parse_not()?;

        while self.match_token(&Token::And) {
            self.advance();
            let right = self.parse_not()?;
            left = SqlExpr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_not(&mut self) -> Result<SqlExpr> {
        if self.match_token(&Token::Not) {
            self.advance();
            let operand = self.parse_not()?;
            Ok(SqlExpr::Not(Box::new(operand)))
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> Result<SqlExpr> {
        let left = self.parse_addition()?;

        if self.match_token(&Token::Is) {
            self.advance();
            let negated = if self.match_token(&Token::Not) {
                self.advance();
                true
            } else {
                false
            };
            self.expect_token(Token::Null)?;
            return Ok(SqlExpr::IsNull {
                expr: Box::new(left),
                negated,
            });
        }

        let op = match self.current_token() {
            Token::Equal => CompareOp::Eq,
            Token::NotEqual => CompareOp::Ne,
            Token::Less => CompareOp::Lt,
            Token::LessEqual => CompareOp::Le,
            Token::Greater => CompareOp::Gt,
            Token::GreaterEqual => CompareOp::Ge,
            _ => return Ok(left),
        };
        self.advance();

        let right = self.parse_addition()?;
        Ok(SqlExpr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_addition(&mut self) -> Result<SqlExpr> {
        let mut left = self.parse_multiplication()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => ArithmeticOp::Add,
                Token::Minus => ArithmeticOp::Sub,
                _ => break,
            };
            self.advance();

            let right = self.parse_multiplication()?;
            left = SqlExpr::Arithmetic {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplication(&mut self) -> Result<SqlExpr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => ArithmeticOp::Mul,
                Token::Slash => ArithmeticOp::Div,
                Token::Percent => ArithmeticOp::Mod,
                _ => break,
            };
            self.advance();

            let right = self.parse_unary()?;
            left = SqlExpr::Arithmetic {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<SqlExpr> {
        if self.match_token(&Token::Minus) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(SqlExpr::Negate(Box::new(operand)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<SqlExpr> {
        let token = self.current_token();
        self.advance();

        match token {
            Token::Number(n) => match n.parse::<i32>() {
                Ok(i) => Ok(SqlExpr::Literal(Value::Int32(i))),
                Err(_) => bail!("Invalid integer literal: {}", n),
            },
            Token::String(s) => Ok(SqlExpr::Literal(Value::String(s))),
            Token::True => Ok(SqlExpr::Literal(Value::Boolean(true))),
            Token::False => Ok(SqlExpr::Literal(Value::Boolean(false))),
            Token::Null => Ok(SqlExpr::Literal(Value::Null)),
            Token::Identifier(name) => Ok(SqlExpr::Column(name)),
            Token::Positional => {
                let index = self.positional_count;
                self.positional_count += 1;
                Ok(SqlExpr::Placeholder(PlaceholderRef::Positional(index)))
            }
            Token::Numbered(n) => Ok(SqlExpr::Placeholder(PlaceholderRef::Numbered(n))),
            Token::Named(name) => Ok(SqlExpr::Placeholder(PlaceholderRef::Named(name))),
            Token::LeftParen => {
                let expr = self.parse_expression()?;
                self.expect_token(Token::RightParen)?;
                Ok(expr)
            }
            other => bail!("Unexpected token: {:?}", other),
        }
    }

    // Helper methods

    fn current_token(&self) -> Token {
        self.tokens
            .get(self.position)
            .cloned()
            .unwrap_or(Token::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn match_token(&self, token: &Token) -> bool {
        self.current_token() == *token
    }

    fn expect_token(&mut self, token: Token) -> Result<()> {
        if self.current_token() == token {
            self.advance();
            Ok(())
        } else {
            bail!("Expected {:?}, found {:?}", token, self.current_token())
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.current_token() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other => bail!("Expected identifier, found {:?}", other),
        }
    }
}
