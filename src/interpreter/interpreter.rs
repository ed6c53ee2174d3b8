use std::fmt::{Display, Formatter};
use std::io::{BufRead, Write};
use std::path::Path;
use crate::println_debug;
use crate::interpreter::ast::Block;
use crate::interpreter::environment;
use crate::interpreter::evaluator::{Evaluator, RuntimeError};
use crate::interpreter::lexer::Lexer;
use crate::interpreter::parser::{ParseError, Parser};
use crate::interpreter::value::Value;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Parse(ParseError),
    Runtime(RuntimeError),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Parse(err) => write!(f, "{}", err),
            Error::Runtime(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        Error::Runtime(err)
    }
}

/// Lexer, parser and evaluator behind the `run(file)` / `run(line)` entry points.
///
/// Global state (variables, functions, arrays) persists across runs, so a
/// REPL session feeds consecutive lines to the same interpreter.
pub struct Interpreter {
    evaluator: Evaluator,
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter { evaluator: Evaluator::new() }
    }

    pub fn with_io(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Interpreter {
        Interpreter { evaluator: Evaluator::with_io(input, output) }
    }

    /// Enables verbose tracing and makes lexer errors fatal.
    pub fn set_debug(&mut self, debug: bool) {
        self.evaluator.set_debug(debug);
    }

    pub fn debug(&self) -> bool {
        self.evaluator.debug()
    }

    pub fn run_file(&mut self, path: &Path) -> Result<Value, Error> {
        let lexer = Lexer::open(path)?;
        let program = self.parse(lexer, Parser::parse_program)?;

        Ok(self.evaluator.run(&program)?)
    }

    pub fn run_reader(&mut self, reader: impl BufRead + 'static) -> Result<Value, Error> {
        let program = self.parse(Lexer::from_reader(reader), Parser::parse_program)?;
        Ok(self.evaluator.run(&program)?)
    }

    pub fn run_line(&mut self, line: &str) -> Result<Value, Error> {
        let statements = self.parse(Lexer::from_line(line), Parser::parse_input)?;
        Ok(self.evaluator.run(&statements)?)
    }

    fn parse(&self, lexer: Lexer, rule: fn(&mut Parser) -> Result<Block, ParseError>) -> Result<Block, ParseError> {
        let mut parser = Parser::new(lexer);
        parser.set_debug(self.debug());

        let block = rule(&mut parser)?;

        for stmt in &block {
            println_debug!(self.debug(), "{:?}", stmt);
        }

        Ok(block)
    }

    /// Reads a line from the same stream `input()` reads from.
    pub fn read_line(&mut self) -> std::io::Result<Option<String>> {
        self.evaluator.read_line()
    }

    pub fn output(&mut self) -> &mut dyn Write {
        self.evaluator.output()
    }

    pub fn format_globals(&self) -> String {
        environment::format_scope(self.evaluator.scopes().globals())
    }

    /// Every active scope as a table, innermost first.
    pub fn format_scopes(&self) -> String {
        self.evaluator.scopes().innermost_first()
            .map(environment::format_scope)
            .collect::<Vec<String>>()
            .join("\n")
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
