use std::thread;

use bhasha::lang::error::{Error, RuntimeError};
use bhasha::lang::eval::{run, stack_size, Outcome, Value};
use bhasha::lang::parse::parse;
use bhasha::lang::runtime::{execute, Runtime};

fn effects(source: &str) -> Vec<Value> {
    execute(source).expect("program should run").effects
}

fn runtime_error(source: &str) -> RuntimeError {
    match execute(source) {
        Err(Error::Runtime(e)) => e,
        r => panic!("expected runtime error, got {:?}", r),
    }
}

#[test]
fn function_call_returns_sum() {
    let source = r#"
    ফাংশন যোগ(x, y) {
        রিটার্ন(x + y)
    }
    z = যোগ(10, 20)
    দেখাও(z)
    "#;

    assert_eq!(effects(source), vec![Value::Integer(30)]);
}

#[test]
fn if_else_takes_true_branch() {
    let source = r#"
    x = 15
    y = 10
    যদি(x > y) {
        দেখাও("bigger")
    } অন্যথায় {
        দেখাও("smaller")
    }
    "#;

    assert_eq!(effects(source), vec![Value::String("bigger".to_string())]);
}

#[test]
fn while_loop_counts_to_five() {
    let source = r#"
    x = 0
    যতক্ষণ(x < 5) {
        দেখাও(x)
        x = x + 1
    }
    "#;

    let expected: Vec<Value> = (0..5).map(Value::Integer).collect();
    assert_eq!(effects(source), expected);
}

#[test]
fn undefined_variable_prints_nothing() {
    let program = parse("দেখাও(x)").expect("should parse");
    let mut output = Vec::new();
    let res = {
        let mut eval = bhasha::lang::eval::Eval::new(&mut output, false);
        let res = eval.run(&program);
        assert!(eval.effects().is_empty());
        res
    };

    assert_eq!(
        res,
        Err(RuntimeError::UndefinedVariable {
            name: "x".to_string()
        })
    );
    assert!(output.is_empty());
}

#[test]
fn floor_division_by_zero() {
    assert_eq!(runtime_error("z = 10 // 0"), RuntimeError::DivisionByZero);
}

#[test]
fn division_by_zero_regardless_of_dividend() {
    for dividend in &["0", "7", "-7", "\"s\" + \"t\""] {
        for op in &["/", "%", "//"] {
            let source = format!("z = [{}] {} 0", dividend, op);
            let err = runtime_error(&source);
            // A string dividend is a type error before it is a zero division
            if dividend.starts_with('"') {
                assert!(matches!(err, RuntimeError::TypeMismatch { .. }), "{}", source);
            } else {
                assert_eq!(err, RuntimeError::DivisionByZero, "{}", source);
            }
        }
    }
}

#[test]
fn addition_is_commutative_and_associative() {
    let values = [-3, 0, 4, 1000];
    for a in &values {
        for b in &values {
            for c in &values {
                let source = format!(
                    "দেখাও({a} + {b}) দেখাও({b} + {a}) দেখাও(({a} + {b}) + {c}) দেখাও({a} + ({b} + {c}))",
                    a = a,
                    b = b,
                    c = c
                );
                let out = effects(&source);
                assert_eq!(out[0], out[1]);
                assert_eq!(out[2], out[3]);
            }
        }
    }
}

#[test]
fn false_condition_skips_loop_body() {
    assert!(effects("x = 5 যতক্ষণ(x < 5) { দেখাও(x) }").is_empty());
}

#[test]
fn parameters_do_not_leak() {
    let source = r#"
    n = "caller"
    ফাংশন f(n) {
        n = n + 1
        রিটার্ন n
    }
    দেখাও(f(1))
    দেখাও(n)
    "#;

    assert_eq!(
        effects(source),
        vec![Value::Integer(2), Value::String("caller".to_string())]
    );
}

#[test]
fn nested_call_mutations_are_invisible() {
    let source = r#"
    ফাংশন inner(v) {
        v = 99
        রিটার্ন v
    }
    ফাংশন outer(v) {
        w = inner(v)
        রিটার্ন v + w
    }
    v = 1
    দেখাও(outer(v))
    দেখাও(v)
    "#;

    assert_eq!(effects(source), vec![Value::Integer(100), Value::Integer(1)]);
}

#[test]
fn recursion() {
    let source = r#"
    ফাংশন ফিবো(n) {
        যদি(n ছোট 2) {
            রিটার্ন n
        }
        রিটার্ন ফিবো(n - 1) + ফিবো(n - 2)
    }
    দেখাও(ফিবো(15))
    "#;

    assert_eq!(effects(source), vec![Value::Integer(610)]);
}

#[test]
fn unbounded_recursion_is_an_error() {
    let err = runtime_error("ফাংশন f() { রিটার্ন f() } f()");
    assert!(matches!(err, RuntimeError::StackOverflow { .. }));
}

#[test]
fn deep_recursion_on_a_sized_stack() {
    let max_depth = 1000;
    let worker = thread::Builder::new()
        .stack_size(stack_size(max_depth))
        .spawn(move || {
            let source = r#"
            ফাংশন গণনা(n) {
                যদি(n সমান 0) {
                    রিটার্ন 0
                }
                রিটার্ন 1 + গণনা(n - 1)
            }
            দেখাও(গণনা(900))
            দেখাও(গণনা(1000))
            "#;

            let mut output = Vec::new();
            let res = Runtime::new(&mut output, false)
                .with_max_depth(max_depth)
                .eval(source);
            (res, String::from_utf8(output).expect("Output not utf-8"))
        })
        .expect("Failed to spawn worker");

    let (res, output) = worker.join().expect("worker panicked");
    assert_eq!(output, "900\n");
    assert_eq!(
        res,
        Err(Error::Runtime(RuntimeError::StackOverflow { depth: 1000 }))
    );
}

#[test]
fn arity_mismatch() {
    assert_eq!(
        runtime_error("ফাংশন f(a) { রিটার্ন a } f(1, 2)"),
        RuntimeError::ArityMismatch {
            name: "f".to_string(),
            expected: 1,
            found: 2,
        }
    );
}

#[test]
fn mixed_numbers() {
    let source = r#"
    দেখাও(7 / 2)
    দেখাও(7 // 2)
    দেখাও(-7 % 3)
    দেখাও(1 / 4 * 4)
    যদি(2 সমান 4 / 2) { দেখাও("equal") }
    "#;

    assert_eq!(
        effects(source),
        vec![
            Value::Float(3.5),
            Value::Integer(3),
            Value::Integer(2),
            Value::Float(1.0),
            Value::String("equal".to_string()),
        ]
    );
}

#[test]
fn top_level_return_stops_program() {
    let program = parse("দেখাও(1) রিটার্ন \"done\" দেখাও(2)").expect("should parse");
    assert_eq!(
        run(&program),
        Ok(Outcome {
            effects: vec![Value::Integer(1)],
            value: Some(Value::String("done".to_string())),
        })
    );
}

#[test]
fn parse_errors_never_run() {
    for source in &["দেখাও(1) যদি(x) { দেখাও(2) }", "ফাংশন f() { }", "", "x = \"open"] {
        assert!(matches!(execute(source), Err(Error::Parse(_))), "{}", source);
    }
}

#[test]
fn parse_is_deterministic() {
    let source = "ফাংশন f(a, b) { রিটার্ন [a % b] // 2 } দেখাও(f(9, 5) - 1)";
    assert_eq!(parse(source), parse(source));
}
