// SQL lexer - tokenizes statements sent to the in-memory executor

use super::token::Token;
use anyhow::{bail, Result};

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let Some(ch) = self.current_char() else {
            return Ok(Token::Eof);
        };

        let token = match ch {
            '+' => self.single(Token::Plus),
            '-' => {
                if self.peek() == Some('-') {
                    self.skip_comment();
                    return self.next_token();
                }
                self.single(Token::Minus)
            }
            '*' => self.single(Token::Star),
            '/' => self.single(Token::Slash),
            '%' => self.single(Token::Percent),
            '=' => self.single(Token::Equal),
            '<' => {
                self.advance();
                match self.current_char() {
                    Some('=') => self.single(Token::LessEqual),
                    Some('>') => self.single(Token::NotEqual),
                    _ => Token::Less,
                }
            }
            '>' => {
                self.advance();
                match self.current_char() {
                    Some('=') => self.single(Token::GreaterEqual),
                    _ => Token::Greater,
                }
            }
            '!' if self.peek() == Some('=') => {
                self.advance();
                self.single(Token::NotEqual)
            }
            '(' => self.single(Token::LeftParen),
            ')' => self.single(Token::RightParen),
            ',' => self.single(Token::Comma),
            ';' => self.single(Token::Semicolon),
            '?' => self.single(Token::Positional),
            '$' => self.read_numbered_placeholder()?,
            '@' => self.read_named_placeholder()?,
            '\'' => self.read_string()?,
            '"' => self.read_quoted_identifier()?,
            c if c.is_alphabetic() || c == '_' => self.read_identifier(),
            c if c.is_ascii_digit() => self.read_number(),
            c => bail!("Unexpected character '{}' at position {}", c, self.position),
        };

        Ok(token)
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current_char(), Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }

    /// Skip single-line comments starting with --
    fn skip_comment(&mut self) {
        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    fn read_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(ch) = self.current_char() {
            if !accept(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
        text
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let identifier = self.read_while(|ch| ch.is_alphanumeric() || ch == '_');
        Token::keyword_from_str(&identifier).unwrap_or(Token::Identifier(identifier))
    }

    fn read_number(&mut self) -> Token {
        Token::Number(self.read_while(|ch| ch.is_ascii_digit()))
    }

    fn read_numbered_placeholder(&mut self) -> Result<Token> {
        self.advance(); // Skip '$'
        let digits = self.read_while(|ch| ch.is_ascii_digit());
        match digits.parse::<usize>() {
            Ok(index) if index > 0 => Ok(Token::Numbered(index)),
            _ => bail!("Invalid numbered placeholder '${}'", digits),
        }
    }

    fn read_named_placeholder(&mut self) -> Result<Token> {
        self.advance(); // Skip '@'
        let name = self.read_while(|ch| ch.is_alphanumeric() || ch == '_');
        if name.is_empty() {
            bail!("Empty placeholder name at position {}", self.position);
        }
        Ok(Token::Named(name))
    }

    /// Read a quoted identifier (e.g., "table name")
    fn read_quoted_identifier(&mut self) -> Result<Token> {
        self.advance(); // Skip opening quote
        let identifier = self.read_while(|ch| ch != '"');
        if self.current_char() != Some('"') {
            bail!("Unterminated quoted identifier");
        }
        self.advance();
        Ok(Token::Identifier(identifier))
    }

    /// Read a string literal, '' escapes a quote
    fn read_string(&mut self) -> Result<Token> {
        self.advance(); // Skip opening quote
        let mut string = String::new();

        loop {
            match self.current_char() {
                Some('\'') if self.peek() == Some('\'') => {
                    string.push('\'');
                    self.advance();
                    self.advance();
                }
                Some('\'') => {
                    self.advance();
                    return Ok(Token::String(string));
                }
                Some(ch) => {
                    string.push(ch);
                    self.advance();
                }
                None => bail!("Unterminated string literal"),
            }
        }
    }

    /// Tokenize the entire input, ending with `Token::Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(tokens)
    }
}
