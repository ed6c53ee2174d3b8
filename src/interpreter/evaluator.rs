use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::io::{BufRead, BufReader, Write};
use std::rc::Rc;
use crate::{log_warning, println_debug};
use crate::interpreter::ast::{Block, Expr, FunctionDecl, Stmt};
use crate::interpreter::environment::{ArrayStore, FunctionTable, ScopeStack, Variable};
use crate::interpreter::lexer::Token;
use crate::interpreter::value::{ArrayId, Value};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    UnknownOperator {
        operator: Token,
    },
    IndexOutOfRange {
        name: Token,
        index: i64,
    },
    NotAnArray {
        name: Token,
    },
    Io(String),
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::UnknownOperator { operator } =>
                write!(f, "[row {}] Unknown binary operator '{}'", operator.row(), operator.source()),
            RuntimeError::IndexOutOfRange { name, index } =>
                write!(f, "[row {}] Index {} is out of range for array '{}'", name.row(), index, name.source()),
            RuntimeError::NotAnArray { name } =>
                write!(f, "[row {}] '{}' is not an array", name.row(), name.source()),
            RuntimeError::Io(message) => write!(f, "I/O error: {}", message),
        }
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        RuntimeError::Io(err.to_string())
    }
}

type EvalResult<T> = Result<T, RuntimeError>;

/// How a statement finished: normally, or by `return` unwinding to the caller.
#[derive(Debug, Clone, PartialEq)]
enum Completion {
    Normal(Value),
    Return(Value),
}

impl Completion {
    fn into_value(self) -> Value {
        match self {
            Completion::Normal(value) | Completion::Return(value) => value,
        }
    }
}

pub struct Evaluator {
    scopes: ScopeStack,
    functions: FunctionTable,
    arrays: ArrayStore,

    input: Box<dyn BufRead>,
    output: Box<dyn Write>,

    debug: bool,
}

impl Evaluator {
    pub fn new() -> Evaluator {
        Evaluator::with_io(Box::new(BufReader::new(std::io::stdin())), Box::new(std::io::stdout()))
    }

    pub fn with_io(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Evaluator {
        Evaluator {
            scopes: ScopeStack::new(),
            functions: FunctionTable::default(),
            arrays: ArrayStore::default(),
            input, output,
            debug: false,
        }
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    pub fn output(&mut self) -> &mut dyn Write {
        self.output.as_mut()
    }

    /// Reads one line from the input stream without its line terminator.
    /// Returns `None` at end of input.
    pub fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();

        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(|c: char| c == '\n' || c == '\r').len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Runs a statement sequence in the current scope and returns the value
    /// of the last statement executed.
    pub fn run(&mut self, block: &Block) -> EvalResult<Value> {
        Ok(self.execute_block(block)?.into_value())
    }

    fn execute_block(&mut self, block: &Block) -> EvalResult<Completion> {
        let mut last = Value::Undefined;

        for stmt in block {
            match self.execute_stmt(stmt)? {
                Completion::Normal(value) => last = value,
                completion @ Completion::Return(_) => return Ok(completion),
            }
        }

        Ok(Completion::Normal(last))
    }

    /// Runs `f` inside a fresh scope that is popped on every exit path.
    fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> EvalResult<T>) -> EvalResult<T> {
        self.scopes.push_scope();
        println_debug!(self.debug, "push scope (depth {})", self.scopes.depth());

        let result = f(self);

        self.scopes.pop_scope();
        println_debug!(self.debug, "pop scope (depth {})", self.scopes.depth());
        result
    }

    fn execute_stmt(&mut self, stmt: &Stmt) -> EvalResult<Completion> {
        match stmt {
            Stmt::VarDeclare { name, expr, .. } => {
                let value = self.evaluate(expr)?;

                if self.scopes.declare(name.source(), Variable::new(value.clone())) {
                    log_warning!(self.debug, name.row(), "Variable '{}' is already declared in this scope", name.source());
                }

                Ok(Completion::Normal(value))
            },
            Stmt::VarAssign { name, index: None, expr } => {
                let value = self.evaluate(expr)?;

                if !self.scopes.assign(name.source(), value.clone()) {
                    log_warning!(self.debug, name.row(), "Assignment to undefined variable '{}'", name.source());
                    self.scopes.declare_global(name.source(), Variable::new(value.clone()));
                }

                Ok(Completion::Normal(value))
            },
            Stmt::VarAssign { name, index: Some(index), expr } => {
                let index = self.evaluate(index)?.to_index();
                let value = self.evaluate(expr)?;
                let id = self.array_of(name)?;

                match self.arrays.get_mut(id, index) {
                    Some(slot) => *slot = value.clone(),
                    None => return Err(RuntimeError::IndexOutOfRange { name: name.clone(), index }),
                }

                Ok(Completion::Normal(value))
            },
            Stmt::If { condition, then, otherwise, .. } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute_block(then)
                } else if let Some(otherwise) = otherwise {
                    self.execute_block(otherwise)
                } else {
                    Ok(Completion::Normal(Value::Undefined))
                }
            },
            Stmt::While { condition, body, .. } => self.with_scope(|this| {
                let mut last = Value::Undefined;

                while this.evaluate(condition)?.is_truthy() {
                    match this.execute_block(body)? {
                        Completion::Normal(value) => last = value,
                        completion => return Ok(completion),
                    }
                }

                Ok(Completion::Normal(last))
            }),
            Stmt::For { init, condition, update, body, .. } => self.with_scope(|this| {
                let mut last = Value::Undefined;
                this.execute_stmt(init)?;

                while this.evaluate(condition)?.is_truthy() {
                    match this.execute_block(body)? {
                        Completion::Normal(value) => last = value,
                        completion => return Ok(completion),
                    }

                    this.execute_stmt(update)?;
                }

                Ok(Completion::Normal(last))
            }),
            Stmt::FunctionDeclare(function) => {
                if !self.functions.register(Rc::clone(function)) {
                    log_warning!(self.debug, function.name.row(), "Function '{}' is already defined", function.name.source());
                }

                Ok(Completion::Normal(Value::Undefined))
            },
            Stmt::Return { expr, .. } => Ok(Completion::Return(self.evaluate(expr)?)),
            Stmt::Expression(expr) => Ok(Completion::Normal(self.evaluate(expr)?)),
        }
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::IntLiteral(token) => Ok(token.source().parse::<i64>().map(Value::Int)
                .unwrap_or_else(|_| Value::Real(token.source().parse().unwrap_or(f64::INFINITY)))),
            Expr::RealLiteral(token) => Ok(Value::Real(token.source().parse().unwrap_or(0.0))),
            Expr::StringLiteral(token) => Ok(Value::Str(token.source().to_owned())),
            Expr::CharLiteral(token) => Ok(Value::Char(token.source().to_owned())),
            Expr::BoolLiteral(token) => Ok(Value::Bool(token.source() == "true")),

            Expr::Var(name) => match self.scopes.lookup(name.source()) {
                Some(variable) => Ok(variable.value.clone()),
                None => {
                    log_warning!(self.debug, name.row(), "Variable '{}' is not defined", name.source());
                    Ok(Value::Undefined)
                },
            },
            Expr::Negative { expr, .. } => Ok(self.evaluate(expr)?.to_number().neg().into()),
            Expr::BinaryOperator { left, operator, right } => self.evaluate_binary(left, operator, right),
            Expr::FunctionCall { name, args } => self.call_function(name, args),
            Expr::ArrayAccess { name, index } => {
                let id = self.array_of(name)?;
                let index = self.evaluate(index)?.to_index();

                self.arrays.get(id, index).cloned()
                    .ok_or_else(|| RuntimeError::IndexOutOfRange { name: name.clone(), index })
            },
            Expr::ArrayDeclare { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());

                for element in elements {
                    values.push(self.evaluate(element)?);
                }

                Ok(Value::Array(self.arrays.allocate(values)))
            },
        }
    }

    /// Both operands are always evaluated; `&&` and `||` do not short-circuit.
    fn evaluate_binary(&mut self, left_expr: &Expr, operator: &Token, right_expr: &Expr) -> EvalResult<Value> {
        let left = self.evaluate(left_expr)?;
        let right = self.evaluate(right_expr)?;

        // `"ab" + 1` and `s + "cd"` concatenate, `s + 1` adds
        if operator.source() == "+"
            && (matches!(left_expr, Expr::StringLiteral(_)) || (left.is_string() && right.is_string())) {
            return Ok(Value::Str(format!("{}{}", left, right)));
        }

        let (left, right) = (left.to_number(), right.to_number());
        let ordering = left.compare(right);

        Ok(match operator.source() {
            "+" => left.add(right).into(),
            "-" => left.sub(right).into(),
            "*" => left.mul(right).into(),
            "/" => left.div(right).into(),

            "<" => Value::Bool(ordering == Some(Ordering::Less)),
            "<=" => Value::Bool(matches!(ordering, Some(Ordering::Less | Ordering::Equal))),
            ">" => Value::Bool(ordering == Some(Ordering::Greater)),
            ">=" => Value::Bool(matches!(ordering, Some(Ordering::Greater | Ordering::Equal))),
            "==" => Value::Bool(ordering == Some(Ordering::Equal)),
            "!=" => Value::Bool(ordering != Some(Ordering::Equal)),

            "&&" => Value::Bool(!left.is_zero() && !right.is_zero()),
            "||" => Value::Bool(!left.is_zero() || !right.is_zero()),

            _ => return Err(RuntimeError::UnknownOperator { operator: operator.clone() }),
        })
    }

    fn call_function(&mut self, name: &Token, args: &[Expr]) -> EvalResult<Value> {
        match name.source() {
            "input" => return Ok(self.read_line()?.map(Value::Str).unwrap_or(Value::Undefined)),
            "output" => {
                let value = match args.first() {
                    Some(arg) => self.evaluate(arg)?,
                    None => Value::Undefined,
                };

                writeln!(self.output, "{}", value)?;
                self.output.flush()?;
                return Ok(Value::Undefined);
            },
            _ => {},
        }

        let function = match self.functions.get(name.source()) {
            Some(function) => function,
            None => {
                log_warning!(self.debug, name.row(), "Function '{}' is not defined", name.source());
                return Ok(Value::Undefined);
            },
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate(arg)?);
        }

        self.invoke(&function, values)
    }

    /// Binds parameters pairwise; surplus parameters stay unbound and surplus
    /// arguments are dropped.
    fn invoke(&mut self, function: &FunctionDecl, args: Vec<Value>) -> EvalResult<Value> {
        self.with_scope(|this| {
            for (param, value) in function.params.iter().zip(args) {
                this.scopes.declare(param.source(), Variable::new(value));
            }

            Ok(this.execute_block(&function.body)?.into_value())
        })
    }

    fn array_of(&self, name: &Token) -> EvalResult<ArrayId> {
        match self.scopes.lookup(name.source()) {
            Some(Variable { value: Value::Array(id), .. }) => Ok(*id),
            Some(_) => Err(RuntimeError::NotAnArray { name: name.clone() }),
            None => {
                log_warning!(self.debug, name.row(), "Variable '{}' is not defined", name.source());
                Err(RuntimeError::NotAnArray { name: name.clone() })
            },
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
