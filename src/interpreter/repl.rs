use std::io::Write;
use crate::interpreter::interpreter::{Error, Interpreter};

#[cfg(test)]
mod tests;

const PROMPT: &str = "> ";
const CONTINUATION_PROMPT: &str = "... ";

const HELP: &str = "\
.help     Print this list of commands
.exit     Leave the REPL
.show     Print all variable scopes, innermost first
.debug    Enable debug mode for this session
";

enum Command {
    Help,
    Exit,
    Show,
    Debug,
}

impl Command {
    fn parse(line: &str) -> Option<Command> {
        match line {
            ".help" => Some(Command::Help),
            ".exit" => Some(Command::Exit),
            ".show" => Some(Command::Show),
            ".debug" => Some(Command::Debug),
            _ => None,
        }
    }
}

pub struct Repl {
    interpreter: Interpreter,
}

impl Repl {
    pub fn new(interpreter: Interpreter) -> Repl {
        Repl { interpreter }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Reads and evaluates input until `.exit` or end of input.
    pub fn run(&mut self) -> Result<(), Error> {
        loop {
            let line = match self.read_line(PROMPT)? {
                Some(line) => line,
                None => return Ok(()),
            };

            let trimmed = line.trim();

            match Command::parse(trimmed) {
                Some(Command::Exit) => return Ok(()),
                Some(Command::Help) => self.write(HELP)?,
                Some(Command::Show) => {
                    let scopes = self.interpreter.format_scopes();
                    self.write(&scopes)?;
                },
                Some(Command::Debug) => {
                    self.interpreter.set_debug(true);
                    self.write("Debug mode enabled\n")?;
                },
                None if trimmed.is_empty() => {},
                None => {
                    let source = self.accumulate(line)?;
                    let value = self.interpreter.run_line(&source)?.to_string();

                    let result = if value.is_empty() { "undefined" } else { value.as_str() };
                    self.write(&format!("{}\n", result))?;
                },
            }
        }
    }

    /// Joins continuation lines while a block opened by a line ending in `{`
    /// is still unbalanced.
    fn accumulate(&mut self, first: String) -> Result<String, Error> {
        if !first.trim_end().ends_with('{') {
            return Ok(first);
        }

        let mut depth = brace_balance(&first);
        let mut source = first;

        while depth > 0 {
            let line = match self.read_line(CONTINUATION_PROMPT)? {
                Some(line) => line,
                None => break,
            };

            depth += brace_balance(&line);
            source.push('\n');
            source.push_str(&line);
        }

        Ok(source)
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, Error> {
        self.write(prompt)?;
        Ok(self.interpreter.read_line()?)
    }

    fn write(&mut self, text: &str) -> Result<(), Error> {
        let output = self.interpreter.output();
        output.write_all(text.as_bytes())?;
        output.flush()?;
        Ok(())
    }
}

/// Opened minus closed braces, ignoring those inside string and char literals.
fn brace_balance(line: &str) -> i32 {
    let mut balance = 0;
    let mut quote = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(_), '\\') => {
                chars.next();
            },
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {},
            (None, '"' | '\'') => quote = Some(c),
            (None, '{') => balance += 1,
            (None, '}') => balance -= 1,
            (None, _) => {},
        }
    }

    balance
}
