use std::io::{self, Write};

use log::{debug, trace};

use super::value::Value;
use crate::lang::ast::*;
use crate::lang::error::RuntimeError;
use crate::lang::functions::{Function, Functions};
use crate::lang::variables::{Frame, Variables};

/// Calls nested deeper than this fail with `RuntimeError::StackOverflow`
///
/// Low enough to stay inside a default 2 MiB thread stack. Hosts that want deeper recursion run
/// the evaluator on a thread sized with `stack_size()`.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Largest call depth `stack_size()` will reserve room for
pub const MAX_DEPTH_LIMIT: usize = 10_000;

/// Host stack reserved per nested call, including blocks and expressions nested inside it
const STACK_PER_CALL: usize = 32 * 1024;

/// Host stack for parsing and the top level of a program
const BASE_STACK: usize = 16 * 1024 * 1024;

/// Thread stack size that lets calls nest `max_depth` deep without exhausting the host stack
pub fn stack_size(max_depth: usize) -> usize {
    BASE_STACK + max_depth.min(MAX_DEPTH_LIMIT) * STACK_PER_CALL
}

/// Everything a finished run produced
#[derive(Debug, PartialEq)]
pub struct Outcome {
    /// One entry per executed `দেখাও`, in order
    pub effects: Vec<Value>,
    /// Value of a top level `রিটার্ন`, if the program stopped at one
    pub value: Option<Value>,
}

/// Internal control flow
///
/// We don't want to expose internal details (like control flow) to anyone outside this module
enum InternalEvalResult {
    Ok,
    Return(Value),
}

pub struct Eval<'a> {
    sink: &'a mut dyn Write,
    interactive: bool,
    variables: Variables<Value>,
    functions: Functions,
    effects: Vec<Value>,
    max_depth: usize,
}

impl<'a> Eval<'a> {
    fn eval_primary_expr(&mut self, expr: &PrimaryExpression) -> Result<Value, RuntimeError> {
        let val = match expr {
            PrimaryExpression::Identifier(ident) => self
                .variables
                .get(ident)
                .ok_or_else(|| RuntimeError::UndefinedVariable {
                    name: ident.to_string(),
                })?
                .clone(),
            PrimaryExpression::Constant(c) => match c {
                Constant::Integer(i) => Value::Integer(*i),
            },
            PrimaryExpression::Str(s) => Value::String(s.clone()),
            PrimaryExpression::Paren(expr) => self.eval_expr(expr)?,
        };

        Ok(val)
    }

    fn eval_binop_expr(&mut self, binop: &BinaryExpression) -> Result<Value, RuntimeError> {
        let (lhs, rhs) = match binop {
            BinaryExpression::Plus(lhs, rhs)
            | BinaryExpression::Minus(lhs, rhs)
            | BinaryExpression::Multiply(lhs, rhs)
            | BinaryExpression::Divide(lhs, rhs)
            | BinaryExpression::Modulo(lhs, rhs)
            | BinaryExpression::FloorDivide(lhs, rhs) => (lhs, rhs),
        };

        // Left operand is always evaluated first
        let lhs_val = self.eval_expr(lhs)?;
        let rhs_val = self.eval_expr(rhs)?;

        match binop {
            BinaryExpression::Plus(..) => lhs_val.plus(&rhs_val),
            BinaryExpression::Minus(..) => lhs_val.minus(&rhs_val),
            BinaryExpression::Multiply(..) => lhs_val.multiply(&rhs_val),
            BinaryExpression::Divide(..) => lhs_val.divide(&rhs_val),
            BinaryExpression::Modulo(..) => lhs_val.modulo(&rhs_val),
            BinaryExpression::FloorDivide(..) => lhs_val.floor_divide(&rhs_val),
        }
    }

    /// Call a user defined function
    ///
    /// Arguments are evaluated in the caller's frame. The body then runs in a fresh frame that
    /// holds nothing but the parameters, and the caller's frame is back in place once the call
    /// finishes, whether it returned, fell off the end, or failed.
    fn eval_function(&mut self, name: &Identifier, args: &[Expression]) -> Result<Value, RuntimeError> {
        let mut arg_vals = Vec::with_capacity(args.len());
        for arg in args {
            arg_vals.push(self.eval_expr(arg)?);
        }

        let func = self
            .functions
            .get(name)
            .ok_or_else(|| RuntimeError::UndefinedFunction {
                name: name.to_string(),
            })?;

        if func.params.len() != arg_vals.len() {
            return Err(RuntimeError::ArityMismatch {
                name: name.to_string(),
                expected: func.params.len(),
                found: arg_vals.len(),
            });
        }

        if self.variables.depth() >= self.max_depth {
            return Err(RuntimeError::StackOverflow {
                depth: self.max_depth,
            });
        }

        debug!("call {} at depth {}", func, self.variables.depth() + 1);
        let frame: Frame<Value> = func.params.iter().cloned().zip(arg_vals).collect();
        self.variables.push_frame(frame);
        let ret = self.eval_stmts(&func.body);
        self.variables.pop_frame();

        match ret? {
            InternalEvalResult::Return(val) => Ok(val),
            InternalEvalResult::Ok => Ok(Value::None),
        }
    }

    fn eval_expr(&mut self, expr: &Expression) -> Result<Value, RuntimeError> {
        match expr {
            Expression::PrimaryExpression(p) => self.eval_primary_expr(p),
            Expression::FunctionCall(name, args) => self.eval_function(name, args),
            Expression::BinaryExpression(b) => self.eval_binop_expr(b),
        }
    }

    fn eval_condition(&mut self, cond: &Condition) -> Result<bool, RuntimeError> {
        let lhs = self.eval_expr(&cond.lhs)?;
        let rhs = self.eval_expr(&cond.rhs)?;

        lhs.compare(cond.op, &rhs)
    }

    fn eval_builtin(&mut self, builtin: &BuiltinStatement) -> Result<InternalEvalResult, RuntimeError> {
        match builtin {
            BuiltinStatement::Print(expr) => {
                let val = self.eval_expr(expr)?;
                writeln!(self.sink, "{}", val)?;
                self.effects.push(val);

                Ok(InternalEvalResult::Ok)
            }
        }
    }

    fn eval_if(
        &mut self,
        cond: &Condition,
        true_body: &[Statement],
        false_body: Option<&[Statement]>,
    ) -> Result<InternalEvalResult, RuntimeError> {
        if self.eval_condition(cond)? {
            self.eval_stmts(true_body)
        } else if let Some(stmts) = false_body {
            self.eval_stmts(stmts)
        } else {
            Ok(InternalEvalResult::Ok)
        }
    }

    fn eval_while(&mut self, cond: &Condition, stmts: &[Statement]) -> Result<InternalEvalResult, RuntimeError> {
        while self.eval_condition(cond)? {
            match self.eval_stmts(stmts)? {
                InternalEvalResult::Ok => (),
                r @ InternalEvalResult::Return(_) => return Ok(r),
            };
        }

        Ok(InternalEvalResult::Ok)
    }

    fn eval_statement(&mut self, stmt: &Statement) -> Result<InternalEvalResult, RuntimeError> {
        trace!("eval {:?}", stmt);

        match stmt {
            Statement::AssignStatement(ident, rhs) => {
                let rhs_val = self.eval_expr(rhs)?;
                self.variables.insert(ident.clone(), rhs_val);

                Ok(InternalEvalResult::Ok)
            }
            Statement::BlockStatement(block) => match block {
                BlockStatement::If(cond, true_body, false_body) => {
                    self.eval_if(cond, true_body, false_body.as_deref())
                }
                BlockStatement::While(cond, stmts) => self.eval_while(cond, stmts),
                BlockStatement::Function(name, params, body) => {
                    let func = Function {
                        name: name.clone(),
                        params: params.clone(),
                        body: body.clone(),
                    };
                    debug!("define {}", func);
                    self.functions.define(func);

                    Ok(InternalEvalResult::Ok)
                }
            },
            Statement::JumpStatement(jump) => match jump {
                JumpStatement::Return(expr) => Ok(InternalEvalResult::Return(self.eval_expr(expr)?)),
            },
            Statement::BuiltinStatement(builtin) => self.eval_builtin(builtin),
            Statement::CallStatement(name, args) => {
                let val = self.eval_function(name, args)?;

                if self.interactive && !val.is_none() {
                    writeln!(self.sink, "{}", val)?;
                }

                Ok(InternalEvalResult::Ok)
            }
        }
    }

    /// Run `stmts` in order, stopping early at a `রিটার্ন`
    fn eval_stmts(&mut self, stmts: &[Statement]) -> Result<InternalEvalResult, RuntimeError> {
        for stmt in stmts {
            match self.eval_statement(stmt)? {
                InternalEvalResult::Ok => (),
                r @ InternalEvalResult::Return(_) => return Ok(r),
            };
        }

        Ok(InternalEvalResult::Ok)
    }

    /// Create a new `Eval` instance
    ///
    /// `sink` is where output should be written. eg. result of `দেখাও` statements
    ///
    /// `interactive` sets whether or not call statements should print their result (useful
    /// when human is at a REPL)
    pub fn new(sink: &'a mut dyn Write, interactive: bool) -> Self {
        Self {
            sink,
            interactive,
            variables: Variables::new(),
            functions: Functions::new(),
            effects: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Run `program` against this instance's variables and functions
    ///
    /// State carries over between calls, which is what a REPL wants. Use a fresh `Eval` (or
    /// `run()`) to execute a program from a clean slate. Returns the value of a top level
    /// `রিটার্ন` if execution stopped at one.
    pub fn run(&mut self, program: &Program) -> Result<Option<Value>, RuntimeError> {
        match self.eval_stmts(&program.0)? {
            InternalEvalResult::Ok => Ok(None),
            InternalEvalResult::Return(val) => Ok(Some(val)),
        }
    }

    /// Values printed so far, in order
    pub fn effects(&self) -> &[Value] {
        &self.effects
    }

    pub fn into_effects(self) -> Vec<Value> {
        self.effects
    }
}

/// Execute `program` from an empty environment, discarding the textual output
pub fn run(program: &Program) -> Result<Outcome, RuntimeError> {
    let mut sink = io::sink();
    let mut eval = Eval::new(&mut sink, false);
    let value = eval.run(program)?;

    Ok(Outcome {
        effects: eval.into_effects(),
        value,
    })
}

#[cfg(test)]
fn eval_output(input: &str, interactive: bool) -> (Result<Option<Value>, RuntimeError>, String) {
    use crate::lang::parse::parse;

    let mut output = Vec::new();
    let res = {
        let mut eval = Eval::new(&mut output, interactive);
        eval.run(&parse(input).expect("Failed to parse"))
    };

    (res, String::from_utf8(output).expect("Output not utf-8"))
}

#[test]
fn test_expression() {
    let tests = vec![
        ("দেখাও(5 + 5)", "10\n"),
        ("দেখাও(100 -3)", "97\n"),
        ("দেখাও(100* 3)", "300\n"),
        ("দেখাও(99 / 3)", "33.0\n"),
        ("দেখাও(100 / 8)", "12.5\n"),
        ("দেখাও(100 // 3)", "33\n"),
        ("দেখাও(100 % 3)", "1\n"),
        ("দেখাও(2 + 3 * 4)", "14\n"),
        ("দেখাও((2 + 3) * 4)", "20\n"),
        ("দেখাও([2 + 3] * 4)", "20\n"),
        ("দেখাও(10 - 4 - 3)", "3\n"),
        ("দেখাও(1 / 2 + 1)", "1.5\n"),
        (r#"দেখাও("ab" + "cd")"#, "abcd\n"),
        (r#"দেখাও("হ্যালো")"#, "হ্যালো\n"),
    ];

    for (input, expected) in tests {
        let (res, output) = eval_output(input, false);
        assert_eq!(res, Ok(None));
        assert_eq!(output, expected);
    }
}

#[test]
fn test_expression_errors() {
    let tests = vec![
        ("দেখাও(x)", RuntimeError::UndefinedVariable { name: "x".to_string() }),
        ("x = 1 / 0", RuntimeError::DivisionByZero),
        ("x = -1 % 0", RuntimeError::DivisionByZero),
        ("x = 0 // 0", RuntimeError::DivisionByZero),
        (
            r#"x = "a" * 2"#,
            RuntimeError::TypeMismatch {
                op: "*",
                lhs: "string",
                rhs: "integer",
            },
        ),
        ("x = f(1)", RuntimeError::UndefinedFunction { name: "f".to_string() }),
    ];

    for (input, expected) in tests {
        let (res, output) = eval_output(input, false);
        assert_eq!(res, Err(expected));
        assert_eq!(output, "");
    }
}

#[test]
fn test_if() {
    let tests = vec![
        (r#"x = 3 যদি(x সমান 3) { দেখাও("yep") }"#, "yep\n"),
        (r#"x = 3 যদি(x == 4) { দেখাও("nope") }"#, ""),
        (
            r#"x = 3 যদি(x ছোট 3) { দেখাও("nope") } অন্যথায় { দেখাও("yep") }"#,
            "yep\n",
        ),
        (
            r#"x = 3 যদি(x > 3) { দেখাও("nope") } অন্যথায় { দেখাও("yep") যদি(x < 4) { x = 4 } } দেখাও(x)"#,
            "yep\n4\n",
        ),
        (r#"যদি("b" বড় "a") { দেখাও(1) }"#, "1\n"),
    ];

    for (input, expected) in tests {
        let (res, output) = eval_output(input, false);
        assert_eq!(res, Ok(None));
        assert_eq!(output, expected);
    }
}

#[test]
fn test_loop() {
    let tests = vec![
        ("x = 0 যতক্ষণ(x < 5) { দেখাও(x) x = x + 1 }", "0\n1\n2\n3\n4\n"),
        ("x = 9 যতক্ষণ(x < 5) { দেখাও(x) }", ""),
        (
            "i = 0 s = 0 যতক্ষণ(i < 4) { j = 0 যতক্ষণ(j < i) { s = s + j j = j + 1 } i = i + 1 } দেখাও(s)",
            "4\n",
        ),
    ];

    for (input, expected) in tests {
        let (res, output) = eval_output(input, false);
        assert_eq!(res, Ok(None));
        assert_eq!(output, expected);
    }
}

#[test]
fn test_function() {
    let tests = vec![
        (
            "ফাংশন যোগ(x, y) { রিটার্ন(x + y) } z = যোগ(10, 20) দেখাও(z)",
            "30\n",
        ),
        // Falling off the end of a body evaluates to None
        ("ফাংশন f() { a = 1 } দেখাও(f())", "None\n"),
        // Statements after a return never run
        ("ফাংশন f() { রিটার্ন 1 দেখাও(2) } দেখাও(f())", "1\n"),
        // A return inside a loop leaves the whole function
        (
            "ফাংশন f(n) { i = 0 যতক্ষণ(i < 100) { যদি(i সমান n) { রিটার্ন i * 10 } i = i + 1 } রিটার্ন -1 } দেখাও(f(3))",
            "30\n",
        ),
        (
            "ফাংশন fact(n) { যদি(n < 2) { রিটার্ন 1 } রিটার্ন n * fact(n - 1) } দেখাও(fact(10))",
            "3628800\n",
        ),
        // Later definitions replace earlier ones
        ("ফাংশন f() { রিটার্ন 1 } ফাংশন f() { রিটার্ন 2 } দেখাও(f())", "2\n"),
        // Call statements discard the result
        ("ফাংশন f() { দেখাও(7) রিটার্ন 1 } f()", "7\n"),
        // Functions defined inside a call are still global
        (
            "ফাংশন outer() { ফাংশন inner() { রিটার্ন 5 } } outer() দেখাও(inner())",
            "5\n",
        ),
    ];

    for (input, expected) in tests {
        let (res, output) = eval_output(input, false);
        assert_eq!(res, Ok(None));
        assert_eq!(output, expected);
    }
}

#[test]
fn test_function_scoping() {
    let tests = vec![
        // Parameters do not leak, and callee assignments do not reach the caller
        (
            "x = 1 ফাংশন f(x) { x = x + 100 y = 5 রিটার্ন x } দেখাও(f(2)) দেখাও(x)",
            "102\n1\n",
        ),
        // Arguments are evaluated in the caller's frame
        ("a = 4 ফাংশন sq(n) { রিটার্ন n * n } দেখাও(sq(a + 1))", "25\n"),
    ];

    for (input, expected) in tests {
        let (res, output) = eval_output(input, false);
        assert_eq!(res, Ok(None));
        assert_eq!(output, expected);
    }

    // A callee cannot see the caller's variables
    let (res, output) = eval_output("secret = 1 ফাংশন peek() { রিটার্ন secret } দেখাও(peek())", false);
    assert_eq!(
        res,
        Err(RuntimeError::UndefinedVariable {
            name: "secret".to_string()
        })
    );
    assert_eq!(output, "");
}

#[test]
fn test_function_errors() {
    let (res, _) = eval_output("ফাংশন f(a, b) { রিটার্ন a } দেখাও(f(1))", false);
    assert_eq!(
        res,
        Err(RuntimeError::ArityMismatch {
            name: "f".to_string(),
            expected: 2,
            found: 1,
        })
    );

    let (res, _) = eval_output("g(1, 2)", false);
    assert_eq!(res, Err(RuntimeError::UndefinedFunction { name: "g".to_string() }));
}

#[test]
fn test_stack_overflow() {
    use crate::lang::parse::parse;

    let program = parse("ফাংশন f(n) { রিটার্ন f(n + 1) } দেখাও(f(0))").expect("Failed to parse");
    let mut output = Vec::new();
    let mut eval = Eval::new(&mut output, false).with_max_depth(16);

    assert_eq!(eval.run(&program), Err(RuntimeError::StackOverflow { depth: 16 }));

    // The failed call unwound every frame, so the top level is usable again
    let program = parse("x = 1 দেখাও(x)").expect("Failed to parse");
    assert_eq!(eval.run(&program), Ok(None));
    assert_eq!(eval.effects(), &[Value::Integer(1)]);
}

#[test]
fn test_top_level_return() {
    let (res, output) = eval_output("দেখাও(1) রিটার্ন 2 + 3 দেখাও(4)", false);
    assert_eq!(res, Ok(Some(Value::Integer(5))));
    assert_eq!(output, "1\n");
}

#[test]
fn test_partial_output_on_error() {
    let (res, output) = eval_output("দেখাও(1) দেখাও(2) দেখাও(3 // 0) দেখাও(4)", false);
    assert_eq!(res, Err(RuntimeError::DivisionByZero));
    assert_eq!(output, "1\n2\n");
}

#[test]
fn test_interactive() {
    let (res, output) = eval_output("ফাংশন f() { রিটার্ন 2 + 3 } f()", true);
    assert_eq!(res, Ok(None));
    assert_eq!(output, "5\n");

    let (res, output) = eval_output("ফাংশন f() { a = 1 } f()", true);
    assert_eq!(res, Ok(None));
    assert_eq!(output, "");
}

#[test]
fn test_run() {
    use crate::lang::parse::parse;

    let program = parse("x = 0 যতক্ষণ(x < 3) { দেখাও(x * 2) x = x + 1 } রিটার্ন x").expect("Failed to parse");
    assert_eq!(
        run(&program),
        Ok(Outcome {
            effects: vec![Value::Integer(0), Value::Integer(2), Value::Integer(4)],
            value: Some(Value::Integer(3)),
        })
    );
}
