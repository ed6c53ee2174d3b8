use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::rc::Rc;
use crate::interpreter::ast::FunctionDecl;
use crate::interpreter::lexer::TokenType;
use crate::interpreter::value::{ArrayId, Value};
use crate::util;

#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub token_type: TokenType,
    pub value: Value,
}

impl Variable {
    pub fn new(value: Value) -> Variable {
        Variable { token_type: value.token_type(), value }
    }
}

pub type Scope = HashMap<String, Variable>;

/// Lexical scopes, innermost last. The global scope at index 0 is never popped.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> ScopeStack {
        ScopeStack { scopes: vec![Scope::new()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Inserts into the innermost scope. Returns `true` if the name was
    /// already declared there and got shadowed.
    pub fn declare(&mut self, name: &str, variable: Variable) -> bool {
        let innermost = self.scopes.len() - 1;
        self.scopes[innermost].insert(name.to_owned(), variable).is_some()
    }

    pub fn declare_global(&mut self, name: &str, variable: Variable) {
        self.scopes[0].insert(name.to_owned(), variable);
    }

    /// Updates the innermost scope declaring `name`. Returns `false` if none does.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(variable) = scope.get_mut(name) {
                variable.value = value;
                return true;
            }
        }

        false
    }

    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn globals(&self) -> &Scope {
        &self.scopes[0]
    }

    pub fn innermost_first(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter().rev()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a scope as a name/type/value table, sorted by name.
pub fn format_scope(scope: &Scope) -> String {
    let mut names: Vec<&String> = scope.keys().collect();
    names.sort();

    let rows: Vec<[String; 3]> = names.into_iter().map(|name| {
        let variable = &scope[name];
        [name.clone(), variable.token_type.name().to_owned(), variable.value.to_string()]
    }).collect();

    util::format_table(["name", "type", "value"], &rows)
}

/// Flat global registry of declared functions.
#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: HashMap<String, Rc<FunctionDecl>>,
}

impl FunctionTable {
    /// The first declaration of a name wins. Returns `false` on redeclaration.
    pub fn register(&mut self, function: Rc<FunctionDecl>) -> bool {
        match self.functions.entry(function.name.source().to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(function);
                true
            },
        }
    }

    pub fn get(&self, name: &str) -> Option<Rc<FunctionDecl>> {
        self.functions.get(name).map(Rc::clone)
    }
}

/// Backing storage for array values. Entries live as long as the store.
#[derive(Debug, Default)]
pub struct ArrayStore {
    arrays: HashMap<ArrayId, Vec<Value>>,
    next_id: usize,
}

impl ArrayStore {
    pub fn allocate(&mut self, elements: Vec<Value>) -> ArrayId {
        let id = ArrayId(self.next_id);
        self.next_id += 1;
        self.arrays.insert(id, elements);
        id
    }

    pub fn get(&self, id: ArrayId, index: i64) -> Option<&Value> {
        let index = usize::try_from(index).ok()?;
        self.arrays.get(&id)?.get(index)
    }

    pub fn get_mut(&mut self, id: ArrayId, index: i64) -> Option<&mut Value> {
        let index = usize::try_from(index).ok()?;
        self.arrays.get_mut(&id)?.get_mut(index)
    }
}
