pub mod util;
pub mod interpreter;

use std::io::Write;
use std::path::PathBuf;
use clap::Parser as ClapParser;
use crate::interpreter::interpreter::{Error, Interpreter};
use crate::interpreter::repl::Repl;

#[derive(ClapParser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Config {
    #[clap(help = "Script to run; starts the REPL when omitted")]
    pub input: Option<PathBuf>,

    #[clap(short, long, help = "Trace tokens and scopes, and treat lexer errors as fatal")]
    pub debug: bool,
}

/// Runs a script and prints the global variable table, or starts the REPL.
pub fn run(config: Config) -> Result<(), Error> {
    let mut interpreter = Interpreter::new();
    interpreter.set_debug(config.debug);

    match config.input {
        Some(path) => {
            interpreter.run_file(&path)?;

            let globals = interpreter.format_globals();
            let output = interpreter.output();
            output.write_all(globals.as_bytes())?;
            output.flush()?;
            Ok(())
        },
        None => Repl::new(interpreter).run(),
    }
}
