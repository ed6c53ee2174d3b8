use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use crate::interpreter::lexer::TokenType;

/// Handle into the evaluator's array store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrayId(pub usize);

impl Display for ArrayId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "array@{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Result of statements without a value and of undefined reads.
    Undefined,
    Int(i64),
    Real(f64),
    Bool(bool),
    Char(String),
    Str(String),
    Array(ArrayId),
}

impl Value {
    /// Decided on the rendered text: `0`, `false` and the empty string are
    /// false, everything else is true. A real zero renders as `0.0` and is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined => false,
            Value::Int(i) => *i != 0,
            Value::Real(_) => !matches!(self.to_string().as_str(), "0" | "false" | ""),
            Value::Bool(b) => *b,
            Value::Char(s) | Value::Str(s) => !(s.is_empty() || s == "0" || s == "false"),
            Value::Array(_) => true,
        }
    }

    /// Numeric view used by arithmetic and comparison.
    ///
    /// Text that does not parse as a number becomes `0` if it reads `false`
    /// and `1` otherwise, which also covers undefined values and arrays.
    pub fn to_number(&self) -> Number {
        match self {
            Value::Int(i) => Number::Int(*i),
            Value::Real(r) => Number::Real(*r),
            Value::Bool(b) => Number::Int(*b as i64),
            Value::Char(s) | Value::Str(s) => Number::parse(s).unwrap_or(Number::Int(if s == "false" { 0 } else { 1 })),
            Value::Undefined | Value::Array(_) => Number::Int(1),
        }
    }

    /// Integer view used for array indices. Malformed indices become 0.
    pub fn to_index(&self) -> i64 {
        match self {
            Value::Int(i) => *i,
            Value::Real(r) => *r as i64,
            Value::Bool(b) => *b as i64,
            Value::Char(s) | Value::Str(s) => match Number::parse(s) {
                Some(Number::Int(i)) => i,
                Some(Number::Real(r)) => r as i64,
                None => 0,
            },
            Value::Undefined | Value::Array(_) => 0,
        }
    }

    /// The literal token kind a value of this variant is written with.
    pub fn token_type(&self) -> TokenType {
        match self {
            Value::Undefined => TokenType::None,
            Value::Int(_) => TokenType::IntegerNumber,
            Value::Real(_) => TokenType::RealNumber,
            Value::Bool(_) => TokenType::Keyword,
            Value::Char(_) => TokenType::CharLiteral,
            Value::Str(_) => TokenType::StringLiteral,
            Value::Array(_) => TokenType::Identifier,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::Str(_))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Undefined => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{:?}", r),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(s) | Value::Str(s) => f.write_str(s),
            Value::Array(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Real(f64),
}

impl Number {
    pub fn parse(text: &str) -> Option<Number> {
        let text = text.trim();

        text.parse::<i64>().map(Number::Int).ok()
            .or_else(|| text.parse::<f64>().map(Number::Real).ok())
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Real(r) => r,
        }
    }

    pub fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }

    /// Integer arithmetic when both sides are integers and the result is exact.
    fn combine(self, other: Number, int_op: fn(i64, i64) -> Option<i64>, real_op: fn(f64, f64) -> f64) -> Number {
        if let (Number::Int(a), Number::Int(b)) = (self, other) {
            if let Some(result) = int_op(a, b) {
                return Number::Int(result);
            }
        }

        Number::Real(real_op(self.as_f64(), other.as_f64()))
    }

    pub fn add(self, other: Number) -> Number {
        self.combine(other, i64::checked_add, |a, b| a + b)
    }

    pub fn sub(self, other: Number) -> Number {
        self.combine(other, i64::checked_sub, |a, b| a - b)
    }

    pub fn mul(self, other: Number) -> Number {
        self.combine(other, i64::checked_mul, |a, b| a * b)
    }

    pub fn div(self, other: Number) -> Number {
        self.combine(other, |a, b| match a.checked_rem(b) {
            Some(0) => a.checked_div(b),
            _ => None,
        }, |a, b| a / b)
    }

    pub fn neg(self) -> Number {
        match self {
            Number::Int(i) => i.checked_neg().map(Number::Int).unwrap_or(Number::Real(-(i as f64))),
            Number::Real(r) => Number::Real(-r),
        }
    }

    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Int(i) => Value::Int(i),
            Number::Real(r) => Value::Real(r),
        }
    }
}
