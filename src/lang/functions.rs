use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::lang::ast::{Block, Identifier};

/// A user defined function, registered when its `ফাংশন` statement runs
#[derive(Debug, PartialEq)]
pub struct Function {
    pub name: Identifier,
    pub params: Vec<Identifier>,
    pub body: Block,
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.params.iter().map(|p| p.0.as_str()).collect();
        write!(f, "{}({})", self.name, params.join(", "))
    }
}

/// Global function table
///
/// Unlike variables, definitions are never scoped or rolled back: once defined, a function is
/// callable from anywhere for the rest of the run.
#[derive(Default)]
pub struct Functions {
    inner: BTreeMap<Identifier, Rc<Function>>,
}

impl Functions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `func`, replacing any earlier definition with the same name
    pub fn define(&mut self, func: Function) {
        self.inner.insert(func.name.clone(), Rc::new(func));
    }

    pub fn get(&self, name: &Identifier) -> Option<Rc<Function>> {
        self.inner.get(name).cloned()
    }
}

#[test]
fn test_redefine_overwrites() {
    use crate::lang::ast::{BuiltinStatement, Constant, Expression, PrimaryExpression, Statement};

    let print = |i| {
        vec![Statement::BuiltinStatement(BuiltinStatement::Print(
            Expression::PrimaryExpression(PrimaryExpression::Constant(Constant::Integer(i))),
        ))]
    };
    let name = Identifier("f".to_string());

    let mut functions = Functions::new();
    assert!(functions.get(&name).is_none());

    functions.define(Function {
        name: name.clone(),
        params: vec![Identifier("a".to_string())],
        body: print(1),
    });
    functions.define(Function {
        name: name.clone(),
        params: vec![],
        body: print(2),
    });

    let func = functions.get(&name).expect("function missing");
    assert!(func.params.is_empty());
    assert_eq!(func.body, print(2));
    assert_eq!(func.to_string(), "f()");
}
