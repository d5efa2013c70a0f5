use std::io::Write;

use log::info;

use crate::lang::error::Error;
use crate::lang::eval::{self, Eval, Outcome, Value};
use crate::lang::parse::parse;

/// Parser and evaluator glued together for a host that feeds in source text
///
/// Variables and functions persist from one `eval()` to the next.
pub struct Runtime<'a> {
    eval: Eval<'a>,
}

impl<'a> Runtime<'a> {
    /// Create a new `Runtime` instance
    ///
    /// `sink` is where output should be written. eg. result of `দেখাও` statements
    ///
    /// `interactive` sets whether or not call statements should print their result (useful
    /// when human is at a REPL)
    pub fn new(sink: &'a mut dyn Write, interactive: bool) -> Self {
        Self {
            eval: Eval::new(sink, interactive),
        }
    }

    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self {
            eval: self.eval.with_max_depth(max_depth),
        }
    }

    /// Parse and run `cmd`
    ///
    /// Nothing runs if `cmd` fails to parse. Returns the value of a top level `রিটার্ন`, if any.
    pub fn eval(&mut self, cmd: &str) -> Result<Option<Value>, Error> {
        let program = parse(cmd)?;
        info!("parsed {} statements", program.0.len());

        Ok(self.eval.run(&program)?)
    }
}

/// Parse `source` and run it from a clean environment
pub fn execute(source: &str) -> Result<Outcome, Error> {
    let program = parse(source)?;

    Ok(eval::run(&program)?)
}

#[test]
fn test_state_persists() {
    let mut output = Vec::new();
    {
        let mut runtime = Runtime::new(&mut output, true);
        assert_eq!(runtime.eval("ফাংশন দ্বিগুণ(n) { রিটার্ন n * 2 }"), Ok(None));
        assert_eq!(runtime.eval("x = দ্বিগুণ(21)"), Ok(None));
        assert_eq!(runtime.eval("দেখাও(x)"), Ok(None));
        assert_eq!(runtime.eval("দ্বিগুণ(x)"), Ok(None));
        assert_eq!(runtime.eval("রিটার্ন x"), Ok(Some(Value::Integer(42))));
    }

    assert_eq!(String::from_utf8(output).expect("Output not utf-8"), "42\n84\n");
}

#[test]
fn test_errors() {
    use crate::lang::error::RuntimeError;

    let mut output = Vec::new();
    let mut runtime = Runtime::new(&mut output, false);

    assert!(matches!(runtime.eval("দেখাও(1"), Err(Error::Parse(_))));
    assert_eq!(
        runtime.eval("দেখাও(y)"),
        Err(Error::Runtime(RuntimeError::UndefinedVariable {
            name: "y".to_string()
        }))
    );
}

#[test]
fn test_parse_error_runs_nothing() {
    match execute("দেখাও(1) দেখাও(") {
        Err(Error::Parse(_)) => (),
        r => panic!("expected parse error, got {:?}", r),
    }
}

#[test]
fn test_execute() {
    let outcome = execute("দেখাও(\"a\") দেখাও(2)").expect("Failed to execute");
    assert_eq!(
        outcome.effects,
        vec![Value::String("a".to_string()), Value::Integer(2)]
    );
    assert_eq!(outcome.value, None);
}
