use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use lazy_static::lazy_static;
use crate::println_debug;
use crate::interpreter::ast::{Block, Expr, FunctionDecl, Stmt};
use crate::interpreter::lexer::{Lexer, LexerError, Token, TokenType};


lazy_static! {
    static ref RELATIONAL_OPERATORS: HashSet<&'static str> = [
        "<=", ">=", "==", "<", ">", "!=", "&&", "||",
    ].into_iter().collect();

    /// Operators that may follow a call and continue an expression.
    static ref CONTINUATION_OPERATORS: HashSet<&'static str> = [
        "+", "-", "*", "/",
        "<=", ">=", "==", "<", ">", "!=", "&&", "||",
    ].into_iter().collect();

    static ref STATEMENT_KEYWORDS: HashSet<&'static str> = [
        "var", "let", "const", "function", "if", "while", "return", "for",
    ].into_iter().collect();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Lexer(LexerError),
    UnexpectedToken {
        message: String,
        token: Token,
    },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Lexer(err) => write!(f, "{}", err),
            ParseError::UnexpectedToken { message, token } => write!(f, "[row {}] {} | token: {}", token.row(), message, token),
        }
    }
}

impl From<LexerError> for ParseError {
    fn from(err: LexerError) -> Self {
        ParseError::Lexer(err)
    }
}

type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser over a rewindable token cursor.
///
/// Every token read from the lexer is kept, so the cursor can be moved back
/// any number of positions to re-examine input under a different rule.
pub struct Parser {
    lexer: Lexer,
    tokens: Vec<Token>,
    position: usize,

    debug: bool,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Parser {
        Parser {
            lexer,
            tokens: Vec::new(),
            position: 0,
            debug: false,
        }
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        self.lexer.set_debug(debug);
    }

    /// Parses a whole file-backed program.
    pub fn parse_program(&mut self) -> ParseResult<Block> {
        let statements = self.parse_statement_list()?;

        let token = self.get_token()?;
        if token.token_type() != TokenType::EndOfFile {
            return Self::error("No statement starts with this token", token);
        }

        Ok(statements)
    }

    /// Parses one line (or an accumulated multi-line block) of REPL input.
    pub fn parse_input(&mut self) -> ParseResult<Block> {
        let mut statements = Vec::new();

        loop {
            let token = self.peek_token()?;

            if token.is_end() {
                break;
            } else if Self::starts_statement(&token) {
                statements.push(self.parse_statement()?);
            } else {
                statements.push(self.parse_expression_statement()?);
            }
        }

        Ok(statements)
    }

    // Statement parsing

    fn starts_statement(token: &Token) -> bool {
        match token.token_type() {
            TokenType::Identifier => true,
            TokenType::Keyword => STATEMENT_KEYWORDS.contains(token.source()),
            _ => false,
        }
    }

    fn parse_statement_list(&mut self) -> ParseResult<Block> {
        let mut statements = Vec::new();

        while Self::starts_statement(&self.peek_token()?) {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let token = self.get_token()?;
        self.restore_token();

        match token.token_type() {
            TokenType::Identifier => self.parse_identifier_statement(),
            TokenType::Keyword => match token.source() {
                "var" | "let" | "const" => self.parse_declare_statement(),
                "if" => self.parse_if_statement(),
                "while" => self.parse_while_statement(),
                "for" => self.parse_for_statement(),
                "return" => self.parse_return_statement(),
                "function" => self.parse_function_declaration(),
                _ => Self::error("No statement starts with this keyword", token),
            },
            _ => Self::error("No statement starts with this token", token),
        }
    }

    fn parse_declare_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.get_token()?;
        if !(keyword.is_keyword("var") || keyword.is_keyword("let") || keyword.is_keyword("const")) {
            return Self::error("Expected 'var', 'let' or 'const'", keyword);
        }

        let name = self.expect_identifier("Expected variable name after declaration keyword")?;
        self.expect_symbol("=", "Expected '=' after variable name")?;
        let expr = self.parse_expression()?;
        self.skip_semicolon()?;

        Ok(Stmt::VarDeclare { keyword, name, expr })
    }

    /// Disambiguates assignment, call and bare expression statements.
    fn parse_identifier_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.mark();

        self.get_token()?;
        let next = self.get_token()?;

        if next.is_symbol("=") {
            self.reset(start);
            return self.parse_assign_statement();
        } else if next.is_symbol("(") {
            self.reset(start);
            return self.parse_call_statement();
        } else if next.is_symbol("[") {
            self.parse_expression()?;

            if self.get_token()?.is_symbol("]") && self.get_token()?.is_symbol("=") {
                self.reset(start);
                return self.parse_assign_statement();
            }
        }

        self.reset(start);
        self.parse_expression_statement()
    }

    fn parse_assign_statement(&mut self) -> ParseResult<Stmt> {
        let name = self.expect_identifier("Expected variable name")?;

        let index = if self.matches_symbol("[")? {
            let index = self.parse_expression()?;
            self.expect_symbol("]", "Expected ']' after index expression")?;
            Some(index)
        } else {
            None
        };

        self.expect_symbol("=", "Expected '=' in assignment")?;
        let expr = self.parse_expression()?;
        self.skip_semicolon()?;

        Ok(Stmt::VarAssign { name, index, expr })
    }

    fn parse_call_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.mark();

        let name = self.expect_identifier("Expected function name")?;
        self.expect_symbol("(", "Expected '(' after function name")?;
        let args = self.parse_argument_list()?;

        let next = self.peek_token()?;
        if next.token_type() == TokenType::Symbol && CONTINUATION_OPERATORS.contains(next.source()) {
            // The call is only the left operand of a larger expression
            self.reset(start);
            return self.parse_expression_statement();
        }

        self.skip_semicolon()?;
        Ok(Stmt::Expression(Expr::FunctionCall { name, args }))
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.parse_expression()?;
        self.skip_semicolon()?;

        Ok(Stmt::Expression(expr))
    }

    fn parse_if_statement(&mut self) -> ParseResult<Stmt> {
        let token = self.get_token()?;
        self.expect_symbol("(", "Expected '(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect_symbol(")", "Expected ')' after 'if' condition")?;

        let then = self.parse_block()?;

        let otherwise = if self.peek_token()?.is_keyword("else") {
            self.get_token()?;

            if self.peek_token()?.is_keyword("if") {
                Some(vec![self.parse_if_statement()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        self.skip_semicolon()?;

        Ok(Stmt::If { token, condition, then, otherwise })
    }

    fn parse_while_statement(&mut self) -> ParseResult<Stmt> {
        let token = self.get_token()?;
        self.expect_symbol("(", "Expected '(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect_symbol(")", "Expected ')' after 'while' condition")?;

        let body = self.parse_block()?;
        self.skip_semicolon()?;
        Ok(Stmt::While { token, condition, body })
    }

    fn parse_for_statement(&mut self) -> ParseResult<Stmt> {
        let token = self.get_token()?;
        self.expect_symbol("(", "Expected '(' after 'for'")?;

        let init = if self.peek_token()?.token_type() == TokenType::Identifier {
            self.parse_assign_statement()?
        } else {
            self.parse_declare_statement()?
        };

        let condition = self.parse_expression()?;
        self.expect_symbol(";", "Expected ';' after 'for' condition")?;
        let update = self.parse_assign_statement()?;
        self.expect_symbol(")", "Expected ')' after 'for' clauses")?;

        let body = self.parse_block()?;
        self.skip_semicolon()?;
        Ok(Stmt::For { token, init: Box::new(init), condition, update: Box::new(update), body })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Stmt> {
        let token = self.get_token()?;
        let expr = self.parse_expression()?;
        self.skip_semicolon()?;

        Ok(Stmt::Return { token, expr })
    }

    fn parse_function_declaration(&mut self) -> ParseResult<Stmt> {
        self.get_token()?;
        let name = self.expect_identifier("Expected function name after 'function'")?;
        self.expect_symbol("(", "Expected '(' after function name")?;
        let params = self.parse_parameter_list()?;
        let body = self.parse_block()?;
        self.skip_semicolon()?;

        Ok(Stmt::FunctionDeclare(Rc::new(FunctionDecl { name, params, body })))
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        self.expect_symbol("{", "Expected '{'")?;
        let statements = self.parse_statement_list()?;
        self.expect_symbol("}", "Expected '}' after statements")?;

        Ok(statements)
    }

    /// Parameters after the opening '(' up to and including ')'.
    fn parse_parameter_list(&mut self) -> ParseResult<Vec<Token>> {
        let mut params = Vec::new();

        if self.matches_symbol(")")? {
            return Ok(params);
        }

        loop {
            params.push(self.expect_identifier("Expected parameter name")?);

            let token = self.get_token()?;
            if token.is_symbol(")") {
                return Ok(params);
            } else if !token.is_symbol(",") {
                return Self::error("Expected ',' or ')' after parameter", token);
            }
        }
    }

    /// Arguments after the opening '(' up to and including ')'.
    fn parse_argument_list(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();

        if self.matches_symbol(")")? {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);

            let token = self.get_token()?;
            if token.is_symbol(")") {
                return Ok(args);
            } else if !token.is_symbol(",") {
                return Self::error("Expected ',' or ')' after argument", token);
            }
        }
    }

    // Expression parsing

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        let token = self.get_token()?;

        if token.is_symbol("[") {
            return self.parse_array_literal(token);
        }

        self.restore_token();
        let left = self.parse_additive()?;

        let operator = self.get_token()?;
        if operator.token_type() == TokenType::Symbol && RELATIONAL_OPERATORS.contains(operator.source()) {
            let right = self.parse_additive()?;
            return Ok(Expr::BinaryOperator { left: Box::new(left), operator, right: Box::new(right) });
        }

        self.restore_token();
        Ok(left)
    }

    fn parse_array_literal(&mut self, token: Token) -> ParseResult<Expr> {
        let mut elements = Vec::new();

        if self.matches_symbol("]")? {
            return Ok(Expr::ArrayDeclare { token, elements });
        }

        loop {
            elements.push(self.parse_factor()?);

            let next = self.get_token()?;
            if next.is_symbol("]") {
                return Ok(Expr::ArrayDeclare { token, elements });
            } else if !next.is_symbol(",") {
                return Self::error("Expected ',' or ']' after array element", next);
            }
        }
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_term()?;

        loop {
            let operator = self.get_token()?;

            if !(operator.is_symbol("+") || operator.is_symbol("-")) {
                self.restore_token();
                return Ok(expr);
            }

            let right = self.parse_term()?;
            expr = Expr::BinaryOperator { left: Box::new(expr), operator, right: Box::new(right) };
        }
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_factor()?;

        loop {
            let operator = self.get_token()?;

            if !(operator.is_symbol("*") || operator.is_symbol("/")) {
                self.restore_token();
                return Ok(expr);
            }

            let right = self.parse_factor()?;
            expr = Expr::BinaryOperator { left: Box::new(expr), operator, right: Box::new(right) };
        }
    }

    fn parse_factor(&mut self) -> ParseResult<Expr> {
        let token = self.get_token()?;

        if token.is_symbol("-") {
            let expr = self.parse_positive_factor()?;
            return Ok(Expr::Negative { token, expr: Box::new(expr) });
        }

        self.restore_token();
        self.parse_positive_factor()
    }

    fn parse_positive_factor(&mut self) -> ParseResult<Expr> {
        let token = self.get_token()?;

        match token.token_type() {
            TokenType::IntegerNumber => Ok(Expr::IntLiteral(token)),
            TokenType::RealNumber => Ok(Expr::RealLiteral(token)),
            TokenType::StringLiteral => Ok(Expr::StringLiteral(token)),
            TokenType::CharLiteral => Ok(Expr::CharLiteral(token)),
            TokenType::Keyword if token.source() == "true" || token.source() == "false" => Ok(Expr::BoolLiteral(token)),
            TokenType::Symbol if token.source() == "(" => {
                let expr = self.parse_expression()?;
                self.expect_symbol(")", "Expected ')' after expression")?;
                Ok(expr)
            },
            TokenType::Identifier => {
                let next = self.get_token()?;

                if next.is_symbol("(") {
                    let args = self.parse_argument_list()?;
                    Ok(Expr::FunctionCall { name: token, args })
                } else if next.is_symbol("[") {
                    let index = self.parse_expression()?;
                    self.expect_symbol("]", "Expected ']' after index expression")?;
                    Ok(Expr::ArrayAccess { name: token, index: Box::new(index) })
                } else {
                    self.restore_token();
                    Ok(Expr::Var(token))
                }
            },
            _ => Self::error("Expected expression", token),
        }
    }

    // Token cursor

    fn get_token(&mut self) -> ParseResult<Token> {
        if self.position == self.tokens.len() {
            let token = self.lexer.next_token()?;
            self.tokens.push(token);
        }

        let token = self.tokens[self.position].clone();
        self.position += 1;
        Ok(token)
    }

    /// Steps the cursor back so the next `get_token` replays the last token.
    fn restore_token(&mut self) {
        if self.position > 0 {
            self.position -= 1;
            println_debug!(self.debug, "restore {}", self.tokens[self.position]);
        }
    }

    fn peek_token(&mut self) -> ParseResult<Token> {
        let token = self.get_token()?;
        self.position -= 1;
        Ok(token)
    }

    fn mark(&self) -> usize {
        self.position
    }

    fn reset(&mut self, mark: usize) {
        println_debug!(self.debug, "rewind {} token(s)", self.position - mark);
        self.position = mark;
    }

    fn expect_symbol(&mut self, symbol: &str, message: &str) -> ParseResult<Token> {
        let token = self.get_token()?;

        if token.is_symbol(symbol) {
            Ok(token)
        } else {
            Self::error(message, token)
        }
    }

    fn expect_identifier(&mut self, message: &str) -> ParseResult<Token> {
        let token = self.get_token()?;

        if token.token_type() == TokenType::Identifier {
            Ok(token)
        } else {
            Self::error(message, token)
        }
    }

    fn matches_symbol(&mut self, symbol: &str) -> ParseResult<bool> {
        if self.peek_token()?.is_symbol(symbol) {
            self.get_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Statement terminators are optional.
    #[inline]
    fn skip_semicolon(&mut self) -> ParseResult<()> {
        self.matches_symbol(";").map(|_| ())
    }

    fn error<T>(message: &str, token: Token) -> ParseResult<T> {
        Err(ParseError::UnexpectedToken { message: message.to_owned(), token })
    }
}
