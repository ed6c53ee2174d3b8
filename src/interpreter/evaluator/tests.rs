use std::cell::RefCell;
use std::io::{Cursor, Write};
use crate::interpreter::lexer::{Lexer, TokenType};
use crate::interpreter::parser::Parser;
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

struct Harness {
    evaluator: Evaluator,
    output: SharedBuffer,
}

impl Harness {
    fn new() -> Harness {
        Harness::with_input("")
    }

    fn with_input(input: &'static str) -> Harness {
        let output = SharedBuffer::default();
        let evaluator = Evaluator::with_io(Box::new(Cursor::new(input)), Box::new(output.clone()));

        Harness { evaluator, output }
    }

    fn run(&mut self, line: &str) -> EvalResult<Value> {
        let block = Parser::new(Lexer::from_line(line)).parse_input().expect("line should parse");
        self.evaluator.run(&block)
    }

    fn eval(&mut self, line: &str) -> String {
        self.run(line).expect("line should evaluate").to_string()
    }

    fn program(&mut self, source: &'static str) -> EvalResult<Value> {
        let block = Parser::new(Lexer::from_reader(Cursor::new(source))).parse_program().expect("program should parse");
        self.evaluator.run(&block)
    }
}

#[test]
fn literals_round_trip() {
    let mut harness = Harness::new();

    assert_eq!(harness.eval("var x = 42; x"), "42");
    assert_eq!(harness.eval("var x = 2.5; x"), "2.5");
    assert_eq!(harness.eval("var x = \"hello world\"; x"), "hello world");
    assert_eq!(harness.eval("var x = 'c'; x"), "c");
    assert_eq!(harness.eval("var x = true; x"), "true");
    assert_eq!(harness.eval("var x = false; x"), "false");
}

#[test]
fn arithmetic() {
    let mut harness = Harness::new();
    harness.eval("var a = 2; var b = 3");

    assert_eq!(harness.eval("a + b"), "5");
    assert_eq!(harness.eval("a * b"), "6");
    assert_eq!(harness.eval("a - b"), "-1");
    assert_eq!(harness.eval("6 / a"), "3");
    assert_eq!(harness.eval("7 / a"), "3.5");
    assert_eq!(harness.eval("1.5 + a"), "3.5");
    assert_eq!(harness.eval("-a * (b + 1)"), "-8");
    assert_eq!(harness.eval("2 + 3 * 4"), "14");
}

#[test]
fn string_concatenation() {
    let mut harness = Harness::new();

    assert_eq!(harness.eval("var s = \"ab\"; s + \"cd\""), "abcd");
    assert_eq!(harness.eval("var n = 1; var s2 = \"\" + n; s2"), "1");
    assert_eq!(harness.eval("\"n = \" + 2.5"), "n = 2.5");
}

#[test]
fn string_variable_plus_number_is_numeric() {
    let mut harness = Harness::new();

    assert_eq!(harness.eval("var t = \"5\"; t + 1"), "6");
    assert_eq!(harness.eval("var w = \"word\"; w + 1"), "2");
}

#[test]
fn comparisons() {
    let mut harness = Harness::new();

    assert_eq!(harness.eval("3 > 2"), "true");
    assert_eq!(harness.eval("3 <= 2"), "false");
    assert_eq!(harness.eval("2 == 2.0"), "true");
    assert_eq!(harness.eval("1 != 2"), "true");
    assert_eq!(harness.eval("false == 0"), "true");
}

#[test]
fn logical_operators_evaluate_both_sides() {
    let mut harness = Harness::new();
    harness.eval("function side() { output(\"called\") return 1 }");

    assert_eq!(harness.eval("0 && side()"), "false");
    assert_eq!(harness.eval("1 || side()"), "true");
    assert_eq!(harness.output.contents(), "called\ncalled\n");
}

#[test]
fn loop_scope_is_discarded() {
    let mut harness = Harness::new();

    harness.eval("var n = 2; while (n > 0) { var inner = n; n = n - 1 }");
    assert_eq!(harness.eval("n"), "0");
    assert_eq!(harness.eval("inner"), "");
    assert_eq!(harness.evaluator.scopes().depth(), 1);
}

#[test]
fn if_does_not_open_a_scope() {
    let mut harness = Harness::new();

    harness.eval("if (1) { var visible = 7 }");
    assert_eq!(harness.eval("visible"), "7");
}

#[test]
fn else_branch_and_string_truthiness() {
    let mut harness = Harness::new();

    harness.eval("if (\"0\") { var x = 1 } else { var x = 2 }");
    assert_eq!(harness.eval("x"), "2");
    assert_eq!(harness.eval("if (\"\") { var y = 1 }"), "");
}

#[test]
fn real_zero_is_truthy() {
    let mut harness = Harness::new();

    assert_eq!(harness.eval("var z = 1.5 - 1.5; z"), "0.0");
    harness.eval("if (z) { var r = \"taken\" } else { var r = \"skipped\" }");
    assert_eq!(harness.eval("r"), "taken");
    assert_eq!(harness.eval("z && 1"), "false");
}

#[test]
fn for_loop() {
    let mut harness = Harness::new();

    harness.eval("var sum = 0; for (let i = 0; i < 5; i = i + 1) { sum = sum + i }");
    assert_eq!(harness.eval("sum"), "10");
    assert_eq!(harness.eval("i"), "");
}

#[test]
fn function_calls() {
    let mut harness = Harness::new();
    harness.eval("function add(x, y) { return x + y; }");

    assert_eq!(harness.eval("add(2, 3)"), "5");
    assert_eq!(harness.eval("add(2, 3, 4)"), "5");
    assert!(harness.run("add(2)").is_ok());
}

#[test]
fn return_exits_early() {
    let mut harness = Harness::new();

    harness.program("function fact(n) {\n  if (n <= 1) { return 1 }\n  return n * fact(n - 1)\n}").unwrap();
    assert_eq!(harness.eval("fact(5)"), "120");
}

#[test]
fn return_unwinds_loops() {
    let mut harness = Harness::new();

    harness.eval("function first(limit) { var i = 0; while (1) { if (i == limit) { return i } i = i + 1 } }");
    assert_eq!(harness.eval("first(3)"), "3");
    assert_eq!(harness.evaluator.scopes().depth(), 1);
}

#[test]
fn top_level_return_stops_program() {
    let mut harness = Harness::new();

    let value = harness.program("var a = 1\nreturn a\na = 5").unwrap();
    assert_eq!(value, Value::Int(1));
    assert_eq!(harness.eval("a"), "1");
}

#[test]
fn callee_sees_caller_variables() {
    let mut harness = Harness::new();

    harness.eval("function peek() { return local }");
    harness.eval("function outer() { var local = 9; return peek() }");
    assert_eq!(harness.eval("outer()"), "9");
}

#[test]
fn first_function_definition_wins() {
    let mut harness = Harness::new();

    harness.eval("function f() { return 1 }");
    harness.eval("function f() { return 2 }");
    assert_eq!(harness.eval("f()"), "1");
}

#[test]
fn undefined_names_fall_back() {
    let mut harness = Harness::new();

    assert_eq!(harness.run("missing").unwrap(), Value::Undefined);
    assert_eq!(harness.run("nothing()").unwrap(), Value::Undefined);

    harness.eval("function set() { created = 3 }");
    harness.eval("set()");
    assert_eq!(harness.evaluator.scopes().globals()["created"].value, Value::Int(3));
}

#[test]
fn arrays() {
    let mut harness = Harness::new();
    harness.eval("var arr = [1, 2, 3]");

    assert_eq!(harness.eval("arr[1]"), "2");
    assert_eq!(harness.eval("arr[\"2\"]"), "3");
    assert_eq!(harness.eval("arr[\"x\"]"), "1");

    harness.eval("arr[0] = 10");
    assert_eq!(harness.eval("arr[0]"), "10");
}

#[test]
fn array_index_out_of_range() {
    let mut harness = Harness::new();
    harness.eval("var arr = [1, 2, 3]");

    assert!(matches!(harness.run("arr[9]"), Err(RuntimeError::IndexOutOfRange { index: 9, .. })));
    assert!(matches!(harness.run("arr[-1]"), Err(RuntimeError::IndexOutOfRange { index: -1, .. })));
    assert!(matches!(harness.run("arr[3] = 0"), Err(RuntimeError::IndexOutOfRange { index: 3, .. })));
}

#[test]
fn arrays_are_shared_by_reference() {
    let mut harness = Harness::new();

    harness.eval("var arr = [1, 2]; var alias = arr");
    harness.eval("function zero(a) { a[0] = 0 }");
    harness.eval("zero(alias)");
    assert_eq!(harness.eval("arr[0]"), "0");
}

#[test]
fn indexing_a_scalar_is_an_error() {
    let mut harness = Harness::new();
    harness.eval("var x = 1");

    assert!(matches!(harness.run("x[0]"), Err(RuntimeError::NotAnArray { .. })));
}

#[test]
fn scopes_are_popped_after_errors() {
    let mut harness = Harness::new();
    harness.eval("function bad() { var arr = [1]; return arr[5] }");

    assert!(harness.run("bad()").is_err());
    assert_eq!(harness.evaluator.scopes().depth(), 1);
}

#[test]
fn input_and_output() {
    let mut harness = Harness::with_input("hello\r\nworld\n");

    assert_eq!(harness.eval("var line = input(); line"), "hello");
    assert_eq!(harness.eval("input()"), "world");
    assert_eq!(harness.run("input()").unwrap(), Value::Undefined);

    harness.eval("output(line + 1)");
    harness.eval("output(\"a\" + line)");
    assert_eq!(harness.output.contents(), "2\nahello\n");
}

#[test]
fn unknown_operator_is_fatal() {
    let mut harness = Harness::new();
    let operator = Token::new(TokenType::Symbol, String::from("%"), 1);
    let expr = Expr::BinaryOperator {
        left: Box::new(Expr::IntLiteral(Token::new(TokenType::IntegerNumber, String::from("5"), 1))),
        operator: operator.clone(),
        right: Box::new(Expr::IntLiteral(Token::new(TokenType::IntegerNumber, String::from("2"), 1))),
    };

    assert_eq!(harness.evaluator.run(&vec![Stmt::Expression(expr)]), Err(RuntimeError::UnknownOperator { operator }));
}
