use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use lazy_static::lazy_static;
use crate::{println_debug, util};


lazy_static! {
    static ref KEYWORDS: HashSet<&'static str> = [
        "function", "var", "let", "const",
        "true", "false", "this",
        "if", "else", "while", "for", "return",
        "undefined", "null",
        "break", "continue",
        "class",
    ].into_iter().collect();

    static ref SYMBOLS: HashSet<char> = [
        '{', '}', '(', ')', '[', ']',
        '.', ',', ';',
        '+', '-', '*', '/', '%',
        '&', '|', '!',
        '<', '>', '=',
    ].into_iter().collect();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenType {
    Identifier,
    Keyword,
    RealNumber,
    IntegerNumber,
    StringLiteral,
    CharLiteral,
    Symbol,
    None,
    Error,
    EndOfFile,
    EndOfLine,
}

impl TokenType {
    /// Short name used in token dumps and variable tables.
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::Identifier => "ID",
            TokenType::Keyword => "KEYWORD",
            TokenType::RealNumber => "REAL",
            TokenType::IntegerNumber => "INT",
            TokenType::StringLiteral => "STRING",
            TokenType::CharLiteral => "CHAR",
            TokenType::Symbol => "SYMBOL",
            TokenType::None => "NONE",
            TokenType::Error => "ERROR",
            TokenType::EndOfFile => "END_OF_FILE",
            TokenType::EndOfLine => "END_OF_LINE",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    token_type: TokenType,
    source: String,
    row: usize,
}

impl Token {
    pub fn new(token_type: TokenType, source: String, row: usize) -> Token {
        Token { token_type, source, row }
    }

    pub fn token_type(&self) -> TokenType { self.token_type }
    pub fn source(&self) -> &str { &self.source }
    pub fn row(&self) -> usize { self.row }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.token_type == TokenType::Symbol && self.source == symbol
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.token_type == TokenType::Keyword && self.source == keyword
    }

    pub fn is_end(&self) -> bool {
        matches!(self.token_type, TokenType::EndOfFile | TokenType::EndOfLine)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = self.token_type.name();

        match self.token_type {
            TokenType::StringLiteral | TokenType::Symbol => write!(f, "<{}, \"{}\", {}>", name, self.source, self.row),
            TokenType::CharLiteral => write!(f, "<{}, '{}', {}>", name, self.source, self.row),
            _ => write!(f, "<{}, {}, {}>", name, self.source, self.row),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    UnexpectedCharacter {
        row: usize,
        character: char,
    },
    UnterminatedString {
        row: usize,
    },
    InvalidCharLiteral {
        row: usize,
        text: String,
    },
    Io(String),
}

impl Display for LexerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LexerError::UnexpectedCharacter { row, character } => write!(f, "[row {}] Unexpected character '{}'", row, character),
            LexerError::UnterminatedString { row } => write!(f, "[row {}] Unterminated string", row),
            LexerError::InvalidCharLiteral { row, text } => write!(f, "[row {}] Too many characters in char literal '{}'", row, text),
            LexerError::Io(message) => write!(f, "Failed to read source: {}", message),
        }
    }
}

type LexerResult<T> = Result<T, LexerError>;

enum Input {
    /// Source read line by line on demand.
    Reader(Box<dyn BufRead>),
    /// A single in-memory line (REPL input).
    Line,
}

pub struct Lexer {
    input: Input,

    buffer: Vec<char>,
    position: usize,
    row: usize,

    debug: bool,
}

impl Lexer {
    pub fn open(path: &Path) -> std::io::Result<Lexer> {
        let file = File::open(path)?;
        Ok(Lexer::from_reader(BufReader::new(file)))
    }

    pub fn from_reader(reader: impl BufRead + 'static) -> Lexer {
        Lexer {
            input: Input::Reader(Box::new(reader)),
            buffer: Vec::new(),
            position: 0,
            row: 0,
            debug: false,
        }
    }

    pub fn from_line(line: &str) -> Lexer {
        let mut buffer: Vec<char> = line.chars().collect();
        buffer.push('\n');

        Lexer {
            input: Input::Line,
            buffer,
            position: 0,
            row: 1,
            debug: false,
        }
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn next_token(&mut self) -> LexerResult<Token> {
        let token = self.scan_token()?;
        println_debug!(self.debug, "{}", token);
        Ok(token)
    }

    /// Scans until the end sentinel, which is included as the last element.
    pub fn tokenize(&mut self) -> LexerResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let end = token.is_end();
            tokens.push(token);

            if end {
                return Ok(tokens);
            }
        }
    }

    fn scan_token(&mut self) -> LexerResult<Token> {
        self.skip_whitespace()?;
        let row = self.row;

        let c = match self.consume()? {
            Some(c) => c,
            None => return Ok(self.end_token()),
        };

        match c {
            c if util::is_alphabetic(c) => self.scan_identifier(c, row),
            c if util::is_numeric(c) => self.scan_number(c, row),
            '"' => self.scan_string(row),
            '\'' => self.scan_char(row),
            c if SYMBOLS.contains(&c) => self.scan_symbol(c, row),
            c => self.report(LexerError::UnexpectedCharacter { row, character: c }, c.to_string(), row),
        }
    }

    fn scan_identifier(&mut self, first: char, row: usize) -> LexerResult<Token> {
        let mut name = String::from(first);

        while let Some(c) = self.peek()? {
            if !util::is_alphanumeric(c) {
                break;
            }

            name.push(c);
            self.consume()?;
        }

        let token_type = if KEYWORDS.contains(name.as_str()) { TokenType::Keyword } else { TokenType::Identifier };
        Ok(Token::new(token_type, name, row))
    }

    fn scan_number(&mut self, first: char, row: usize) -> LexerResult<Token> {
        let mut number = String::from(first);
        let mut real = false;

        while let Some(c) = self.peek()? {
            if util::is_numeric(c) {
                number.push(c);
            } else if c == '.' && !real {
                number.push(c);
                real = true;
            } else {
                break;
            }

            self.consume()?;
        }

        Ok(Token::new(if real { TokenType::RealNumber } else { TokenType::IntegerNumber }, number, row))
    }

    fn scan_string(&mut self, row: usize) -> LexerResult<Token> {
        let mut value = String::new();

        loop {
            match self.consume()? {
                None => return Err(LexerError::UnterminatedString { row }),
                Some('"') => break,
                Some('\\') => match self.consume()? {
                    Some(c) => value.push(c),
                    None => return Err(LexerError::UnterminatedString { row }),
                },
                Some(c) => value.push(c),
            }
        }

        Ok(Token::new(TokenType::StringLiteral, value, row))
    }

    fn scan_char(&mut self, row: usize) -> LexerResult<Token> {
        let mut raw = Vec::new();
        let mut closed = false;

        // A char literal never spans lines
        while let Some(c) = self.peek()? {
            if c == '\n' {
                break;
            }

            self.consume()?;

            match c {
                '\'' => {
                    closed = true;
                    break;
                },
                '\\' => {
                    raw.push(c);

                    if let Some(escaped) = self.peek()? {
                        if escaped != '\n' {
                            self.consume()?;
                            raw.push(escaped);
                        }
                    }
                },
                _ => raw.push(c),
            }
        }

        let value = match raw.as_slice() {
            ['\\', escaped] => Some(*escaped),
            [c] if *c != '\\' => Some(*c),
            _ => None,
        };

        let text: String = raw.into_iter().collect();

        match value {
            Some(c) if closed => Ok(Token::new(TokenType::CharLiteral, c.to_string(), row)),
            _ => self.report(LexerError::InvalidCharLiteral { row, text: text.clone() }, text, row),
        }
    }

    fn scan_symbol(&mut self, c: char, row: usize) -> LexerResult<Token> {
        let mut symbol = String::from(c);

        let follower = match c {
            '=' | '>' | '<' | '!' => Some('='),
            '&' => Some('&'),
            '|' => Some('|'),
            _ => None,
        };

        if let Some(follower) = follower {
            if self.expect(follower)? {
                symbol.push(follower);
            }
        }

        Ok(Token::new(TokenType::Symbol, symbol, row))
    }

    /// Fatal in debug mode; otherwise prints the error and yields an `Error` token.
    fn report(&self, error: LexerError, text: String, row: usize) -> LexerResult<Token> {
        if self.debug {
            return Err(error);
        }

        eprintln!("Error: {}", error);
        Ok(Token::new(TokenType::Error, text, row))
    }

    fn end_token(&self) -> Token {
        let token_type = match self.input {
            Input::Reader(_) => TokenType::EndOfFile,
            Input::Line => TokenType::EndOfLine,
        };

        Token::new(token_type, String::new(), self.row)
    }

    fn consume(&mut self) -> LexerResult<Option<char>> {
        let c = self.peek()?;

        if let Some(c) = c {
            self.position += 1;

            // Rows of file input are counted per loaded line instead
            if c == '\n' && matches!(self.input, Input::Line) && self.position < self.buffer.len() {
                self.row += 1;
            }
        }

        Ok(c)
    }

    fn peek(&mut self) -> LexerResult<Option<char>> {
        if self.position >= self.buffer.len() && !self.load_line()? {
            return Ok(None);
        }

        Ok(self.buffer.get(self.position).copied())
    }

    fn load_line(&mut self) -> LexerResult<bool> {
        let reader = match &mut self.input {
            Input::Reader(reader) => reader,
            Input::Line => return Ok(false),
        };

        let mut line = String::new();

        match reader.read_line(&mut line) {
            Ok(0) => Ok(false),
            Ok(_) => {
                if !line.ends_with('\n') {
                    line.push('\n');
                }

                self.buffer = line.chars().collect();
                self.position = 0;
                self.row += 1;
                Ok(true)
            },
            Err(err) => Err(LexerError::Io(err.to_string())),
        }
    }

    fn expect(&mut self, expected: char) -> LexerResult<bool> {
        if self.peek()? == Some(expected) {
            self.consume().map(|_| true)
        } else {
            Ok(false)
        }
    }

    fn skip_whitespace(&mut self) -> LexerResult<()> {
        while let Some(c) = self.peek()? {
            if !c.is_whitespace() {
                break;
            }

            self.consume()?;
        }

        Ok(())
    }
}
