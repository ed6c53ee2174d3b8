pub mod lexer;
pub mod ast;
pub mod parser;
pub mod value;
pub mod environment;
pub mod evaluator;
#[allow(clippy::module_inception)]
pub mod interpreter;
pub mod repl;
