use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;
use super::*;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn session(input: &str) -> (Repl, SharedBuffer, Result<(), Error>) {
    let output = SharedBuffer::default();
    let interpreter = Interpreter::with_io(Box::new(Cursor::new(input.to_owned())), Box::new(output.clone()));

    let mut repl = Repl::new(interpreter);
    let result = repl.run();
    (repl, output, result)
}

#[test]
fn evaluates_lines_and_prints_results() {
    let (_, output, result) = session(".help\n1+1\n.exit\noutput(99)\n");

    assert!(result.is_ok());
    assert_eq!(output.contents(), format!("> {}> 2\n> ", HELP));
}

#[test]
fn empty_result_prints_undefined() {
    let (_, output, result) = session("output(1)\n");

    assert!(result.is_ok());
    assert_eq!(output.contents(), "> 1\nundefined\n> ");
}

#[test]
fn empty_lines_are_skipped() {
    let (_, output, _) = session("\n   \n.exit\n");

    assert_eq!(output.contents(), "> > > ");
}

#[test]
fn accumulates_function_body() {
    let (_, output, result) = session("function add(a, b) {\n  return a + b\n}\nadd(2, 3)\n");

    assert!(result.is_ok());
    assert_eq!(output.contents(), "> ... ... undefined\n> 5\n> ");
}

#[test]
fn accumulates_nested_blocks() {
    let input = "var n = 0; while (n < 2) {\n  if (n == 0) {\n    var seen = 1\n  }\n  n = n + 1\n}\nn\n";
    let (_, output, result) = session(input);

    assert!(result.is_ok());
    assert_eq!(output.contents(), "> ... ... ... ... ... 2\n> 2\n> ");
}

#[test]
fn show_is_repeatable() {
    let (_, output, _) = session("var x = 1\n.show\n.show\n");
    let contents = output.contents();
    let parts: Vec<&str> = contents.split("> ").collect();

    assert_eq!(parts.len(), 5);
    assert_eq!(parts[1], "1\n");
    assert_eq!(parts[2], parts[3]);
    assert!(parts[2].contains("INT"));
}

#[test]
fn debug_command_enables_debug_mode() {
    let (repl, output, _) = session(".debug\n");

    assert!(repl.interpreter().debug());
    assert!(output.contents().contains("Debug mode enabled"));
}

#[test]
fn input_reads_from_the_session_stream() {
    let (_, output, _) = session("var name = input()\nworld\nname\n");

    assert_eq!(output.contents(), "> world\n> world\n> ");
}

#[test]
fn fatal_errors_end_the_session() {
    let (_, _, result) = session("var = 1\n.exit\n");
    assert!(matches!(result, Err(Error::Parse(_))));

    let (_, _, result) = session("var a = [1]\na[4]\n");
    assert!(matches!(result, Err(Error::Runtime(_))));

    let (_, _, result) = session("function f() {\n");
    assert!(matches!(result, Err(Error::Parse(_))));
}

#[test]
fn brace_balance_ignores_literals() {
    assert_eq!(brace_balance("if (x) {"), 1);
    assert_eq!(brace_balance("}"), -1);
    assert_eq!(brace_balance("s = \"{\" + '}' {"), 1);
    assert_eq!(brace_balance("s = \"\\\"{\""), 0);
}
