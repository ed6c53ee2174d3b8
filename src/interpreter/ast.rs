use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use crate::interpreter::lexer::Token;

pub type Block = Vec<Stmt>;

#[derive(Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Block,
}

#[derive(Clone, PartialEq)]
pub enum Stmt {
    VarDeclare {
        keyword: Token,
        name: Token,
        expr: Expr,
    },
    VarAssign {
        name: Token,
        index: Option<Expr>,
        expr: Expr,
    },
    If {
        token: Token,
        condition: Expr,
        then: Block,
        otherwise: Option<Block>,
    },
    While {
        token: Token,
        condition: Expr,
        body: Block,
    },
    For {
        token: Token,
        init: Box<Stmt>,
        condition: Expr,
        update: Box<Stmt>,
        body: Block,
    },
    FunctionDeclare(Rc<FunctionDecl>),
    Return {
        token: Token,
        expr: Expr,
    },
    /// A call, bare identifier or any other expression used as a statement.
    Expression(Expr),
}

#[derive(Clone, PartialEq)]
pub enum Expr {
    IntLiteral(Token),
    RealLiteral(Token),
    StringLiteral(Token),
    CharLiteral(Token),
    BoolLiteral(Token),

    Var(Token),
    Negative {
        token: Token,
        expr: Box<Expr>,
    },
    BinaryOperator {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    FunctionCall {
        name: Token,
        args: Vec<Expr>,
    },
    ArrayAccess {
        name: Token,
        index: Box<Expr>,
    },
    ArrayDeclare {
        token: Token,
        elements: Vec<Expr>,
    },
}

impl Expr {
    /// The token the expression starts at, for diagnostics.
    pub fn token(&self) -> &Token {
        match self {
            Expr::IntLiteral(token) | Expr::RealLiteral(token) | Expr::StringLiteral(token)
            | Expr::CharLiteral(token) | Expr::BoolLiteral(token) | Expr::Var(token) => token,
            Expr::Negative { token, .. } => token,
            Expr::BinaryOperator { left, .. } => left.token(),
            Expr::FunctionCall { name, .. } => name,
            Expr::ArrayAccess { name, .. } => name,
            Expr::ArrayDeclare { token, .. } => token,
        }
    }
}

fn join<T: Debug>(items: &[T], separator: &str) -> String {
    items.iter().map(|item| format!("{:?}", item)).collect::<Vec<String>>().join(separator)
}

impl Debug for FunctionDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "function {}({}) {{ {} }}", self.name.source(),
               self.params.iter().map(|param| param.source().to_owned()).collect::<Vec<String>>().join(", "),
               join(&self.body, " "))
    }
}

impl Debug for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stmt::VarDeclare { keyword, name, expr } => write!(f, "{} {} = {:?};", keyword.source(), name.source(), expr),
            Stmt::VarAssign { name, index: Some(index), expr } => write!(f, "{}[{:?}] = {:?};", name.source(), index, expr),
            Stmt::VarAssign { name, index: None, expr } => write!(f, "{} = {:?};", name.source(), expr),
            Stmt::If { condition, then, otherwise, .. } => {
                write!(f, "if ({:?}) {{ {} }}", condition, join(then, " "))?;

                if let Some(otherwise) = otherwise {
                    write!(f, " else {{ {} }}", join(otherwise, " "))?;
                }

                Ok(())
            },
            Stmt::While { condition, body, .. } => write!(f, "while ({:?}) {{ {} }}", condition, join(body, " ")),
            Stmt::For { init, condition, update, body, .. } =>
                write!(f, "for ({:?} {:?}; {:?}) {{ {} }}", init, condition, update, join(body, " ")),
            Stmt::FunctionDeclare(function) => write!(f, "{:?}", function),
            Stmt::Return { expr, .. } => write!(f, "return {:?};", expr),
            Stmt::Expression(expr) => write!(f, "{:?};", expr),
        }
    }
}

impl Debug for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::StringLiteral(token) => write!(f, "\"{}\"", token.source()),
            Expr::CharLiteral(token) => write!(f, "'{}'", token.source()),
            Expr::IntLiteral(token) | Expr::RealLiteral(token)
            | Expr::BoolLiteral(token) | Expr::Var(token) => write!(f, "{}", token.source()),
            Expr::Negative { expr, .. } => write!(f, "-{:?}", expr),
            Expr::BinaryOperator { left, operator, right } => write!(f, "({:?} {} {:?})", left, operator.source(), right),
            Expr::FunctionCall { name, args } => write!(f, "{}({})", name.source(), join(args, ", ")),
            Expr::ArrayAccess { name, index } => write!(f, "{}[{:?}]", name.source(), index),
            Expr::ArrayDeclare { elements, .. } => write!(f, "[{}]", join(elements, ", ")),
        }
    }
}
