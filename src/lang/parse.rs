//! This module implements the grammar of the language.
//!
//! The grammar is defined as a PEG (https://en.wikipedia.org/wiki/Parsing_expression_grammar)
//! and by definition unambiguous. If you're not familiar with PEGs, you can think of it
//! as a formalization for the very pragmatic recursive descent parser.
//!
//! Developer notes:
//!
//! * A PEG is order sensitive. Keywords are tried before identifiers, and `//` is tried before
//!   `/`, otherwise the parser takes the shorter token and gets confused by what follows.
//!
//! * Keywords are Bengali words. Identifiers may mix Latin and Bengali letters, so a keyword is
//!   only a keyword when the next character cannot continue an identifier (`যদিও` is a variable,
//!   `যদি` is not). Keywords are reserved and never parse as identifiers.
//!
//! * `ড়` and `য়` show up both precomposed (one code point) and as a base letter followed by the
//!   nukta sign. Both spellings are accepted wherever a keyword contains them.
//!
//! * Operator precedence uses a "precedence ladder": the additive rule sits above the
//!   multiplicative rule so `*`, `/`, `%` and `//` bind before `+` and `-`. Both levels fold left.
//!
//! * Once a statement's leading keyword (or the `=` of an assignment) has matched, the rest of the
//!   statement is marked with `expect()`. Ordered choice stops backtracking there, so an error
//!   points at the offending token instead of the start of the statement.
//!
//! * Grammar rules recurse once per nesting level. Brackets nested deeper than `MAX_NESTING` are
//!   rejected before parsing starts.
//!

use std::collections::VecDeque;
use std::iter::FromIterator;
use std::str::FromStr;

use lazy_static::lazy_static;
use pom::parser::{call, end, is_a, list, none_of, one_of, sym, tag, Parser};
use pom::Error as PomError;

use crate::lang::ast::*;
use crate::lang::error::ParseError;

pub const PRINT: &str = "দেখাও";
pub const IF: &str = "যদি";
pub const ELSE: &str = concat!("অন্যথা", "\u{9af}\u{9bc}");
pub const ELSE_PRECOMPOSED: &str = concat!("অন্যথা", "\u{9df}");
pub const WHILE: &str = "যতক্ষণ";
pub const FUNCTION: &str = "ফাংশন";
pub const RETURN: &str = "রিটার্ন";
pub const LESS: &str = "ছোট";
pub const GREATER: &str = concat!("ব", "\u{9a1}\u{9bc}");
pub const GREATER_PRECOMPOSED: &str = concat!("ব", "\u{9dc}");
pub const EQUAL: &str = "সমান";

/// Deepest allowed nesting of `(`, `[` and `{`, counted together
pub const MAX_NESTING: usize = 64;

lazy_static! {
    pub static ref KEYWORDS: Vec<&'static str> = vec![
        PRINT,
        IF,
        ELSE,
        ELSE_PRECOMPOSED,
        WHILE,
        FUNCTION,
        RETURN,
        LESS,
        GREATER,
        GREATER_PRECOMPOSED,
        EQUAL,
    ];
}

fn is_bengali(c: char) -> bool {
    ('\u{980}'..='\u{9fe}').contains(&c)
}

fn is_bengali_digit(c: char) -> bool {
    ('\u{9e6}'..='\u{9ef}').contains(&c)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || (is_bengali(c) && !is_bengali_digit(c))
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || is_bengali(c)
}

fn space<'a>() -> Parser<'a, char, ()> {
    one_of(" \t\r\n").repeat(0..).discard()
}

/// Match `word` only when it is not the prefix of a longer identifier
fn keyword<'a>(word: &'static str) -> Parser<'a, char, ()> {
    (tag(word) - !is_a(is_ident_char)).discard()
}

/// Like `opt()`, but a failure past a commit point is still an error
fn committed_opt<'a, O: 'a>(parser: Parser<'a, char, O>) -> Parser<'a, char, Option<O>> {
    Parser::new(move |input: &'a [char], start: usize| {
        match parser.parse_at(input, start) {
            Ok((out, pos)) => Ok((Some(out), pos)),
            Err(e @ PomError::Expect { .. }) => Err(e),
            Err(_) => Ok((None, start)),
        }
    })
}

fn string<'a>() -> Parser<'a, char, Expression> {
    // No escapes: a string runs until the next double quote
    let string = sym('"') * none_of("\"").repeat(0..) - sym('"');

    string
        .map(String::from_iter)
        .map(|s| Expression::PrimaryExpression(PrimaryExpression::Str(s)))
}

fn constant<'a>() -> Parser<'a, char, Expression> {
    let integer = is_a(|c: char| c.is_ascii_digit()).repeat(1..);
    let number = (sym('-').opt() + integer)
        .collect()
        .map(String::from_iter)
        .convert(|s| i64::from_str(&s));

    number.map(|i| Expression::PrimaryExpression(PrimaryExpression::Constant(Constant::Integer(i))))
}

fn ident<'a>() -> Parser<'a, char, Identifier> {
    (is_a(is_ident_start) + is_a(is_ident_char).repeat(0..))
        .collect()
        .map(String::from_iter)
        .convert(|s| {
            if KEYWORDS.iter().any(|k| *k == s) {
                Err(format!("'{}' is a reserved keyword", s))
            } else {
                Ok(Identifier(s))
            }
        })
}

fn arg_list<'a>() -> Parser<'a, char, Vec<Expression>> {
    sym('(') * list(call(expr), space() * sym(',')) - space() - sym(')')
}

fn function_call<'a>() -> Parser<'a, char, (Identifier, Vec<Expression>)> {
    ident() - space() + arg_list()
}

fn primary_expr<'a>() -> Parser<'a, char, Expression> {
    let paren = (sym('(') * call(expr) - space() - sym(')'))
        .map(|e| Expression::PrimaryExpression(PrimaryExpression::Paren(Box::new(e))));
    // `[x]` is just another way of writing `(x)`
    let bracket = (sym('[') * call(expr) - space() - sym(']'))
        .map(|e| Expression::PrimaryExpression(PrimaryExpression::Paren(Box::new(e))));
    let call_expr = function_call().map(|(name, args)| Expression::FunctionCall(name, args));
    let variable =
        ident().map(|i| Expression::PrimaryExpression(PrimaryExpression::Identifier(i)));

    // NB: a call must be tried before a bare variable, which would otherwise stop at the name
    constant() | string() | call_expr | variable | paren | bracket
}

fn mult_expr<'a>() -> Parser<'a, char, Expression> {
    // NB: `//` must be before `/` otherwise `/` will be parsed
    let ops = tag("//") | tag("/") | tag("%") | tag("*");
    let mult_div_mod =
        call(primary_expr) + (space() * ops - space() + call(primary_expr)).repeat(0..);

    mult_div_mod.map(|(lhs, rest)| {
        let binop_create_fn = |op: &str, lhs, rhs| match op {
            "*" => BinaryExpression::Multiply(Box::new(lhs), Box::new(rhs)),
            "/" => BinaryExpression::Divide(Box::new(lhs), Box::new(rhs)),
            "%" => BinaryExpression::Modulo(Box::new(lhs), Box::new(rhs)),
            _ => BinaryExpression::FloorDivide(Box::new(lhs), Box::new(rhs)),
        };

        left_fold(binop_create_fn, lhs, rest)
    })
}

fn add_expr<'a>() -> Parser<'a, char, Expression> {
    let ops = tag("+") | tag("-");
    let plus_minus = call(mult_expr) + (space() * ops - space() + call(mult_expr)).repeat(0..);

    plus_minus.map(|(lhs, rest)| {
        let binop_create_fn = |op: &str, lhs, rhs| match op {
            "+" => BinaryExpression::Plus(Box::new(lhs), Box::new(rhs)),
            _ => BinaryExpression::Minus(Box::new(lhs), Box::new(rhs)),
        };

        left_fold(binop_create_fn, lhs, rest)
    })
}

/// Left fold a series of binary expressions
///
/// Left fold creates left-to-right associativity, ie:
///     1 + 2 + 3 + 4 => ((1 + 2) + 3) + 4
fn left_fold<F>(binop_create_fn: F, lhs: Expression, rest: Vec<(&str, Expression)>) -> Expression
where
    F: Fn(&str, Expression, Expression) -> BinaryExpression,
{
    let mut deque: VecDeque<(&str, Expression)> = rest.into();

    let mut expr = lhs;
    while let Some((op, e)) = deque.pop_front() {
        expr = Expression::BinaryExpression(binop_create_fn(op, expr, e));
    }

    expr
}

/// Parse an expression
///
/// Consumes leading whitespace
fn expr<'a>() -> Parser<'a, char, Expression> {
    space() * add_expr()
}

fn comparison<'a>() -> Parser<'a, char, Comparison> {
    // NB: `==` is tried before the single character operators
    tag("==").map(|_| Comparison::Equal)
        | sym('<').map(|_| Comparison::LessThan)
        | sym('>').map(|_| Comparison::GreaterThan)
        | keyword(LESS).map(|_| Comparison::LessThan)
        | (keyword(GREATER) | keyword(GREATER_PRECOMPOSED)).map(|_| Comparison::GreaterThan)
        | keyword(EQUAL).map(|_| Comparison::Equal)
}

fn condition<'a>() -> Parser<'a, char, Condition> {
    let cond = expr() - space() + comparison() + expr();
    cond.map(|((lhs, op), rhs)| Condition { lhs, op, rhs })
}

/// `( condition )`, the guard of an `if` or `while`
fn guard<'a>() -> Parser<'a, char, Condition> {
    space() * sym('(') * condition() - space() - sym(')')
}

/// Parse a brace delimited block holding at least one statement
///
/// Consumes leading whitespace
fn block<'a>() -> Parser<'a, char, Block> {
    space() * sym('{') * call(stmts) - space() - sym('}')
}

fn if_else_stmt<'a>() -> Parser<'a, char, Statement> {
    let if_stmt = keyword(IF) * (guard() + block()).expect("'(condition) { block }' after যদি");
    let else_stmt = space()
        * (keyword(ELSE) | keyword(ELSE_PRECOMPOSED))
        * block().expect("'{ block }' after অন্যথায়");
    (if_stmt + committed_opt(else_stmt)).map(|((cond, true_body), false_body)| {
        Statement::BlockStatement(BlockStatement::If(cond, true_body, false_body))
    })
}

fn block_stmt<'a>() -> Parser<'a, char, Statement> {
    let while_stmt = (keyword(WHILE) * (guard() + block()).expect("'(condition) { block }' after যতক্ষণ"))
        .map(|(cond, body)| Statement::BlockStatement(BlockStatement::While(cond, body)));
    let params = sym('(') * list(space() * ident(), space() * sym(',')) - space() - sym(')');
    let definition = space() * ident() - space() + params + block();
    let function_def = (keyword(FUNCTION) * definition.expect("'name(params) { block }' after ফাংশন"))
        .map(|((name, params), body)| {
            Statement::BlockStatement(BlockStatement::Function(name, params, body))
        });

    if_else_stmt() | while_stmt | function_def
}

fn jump_stmt<'a>() -> Parser<'a, char, Statement> {
    (keyword(RETURN) * expr().expect("an expression after রিটার্ন")).map(|e| Statement::JumpStatement(JumpStatement::Return(e)))
}

fn builtin_stmt<'a>() -> Parser<'a, char, Statement> {
    let print_args = space() * sym('(') * expr() - space() - sym(')');
    let print_stmt = keyword(PRINT) * print_args.expect("'(expression)' after দেখাও");
    print_stmt.map(|e| Statement::BuiltinStatement(BuiltinStatement::Print(e)))
}

fn assign_stmt<'a>() -> Parser<'a, char, Statement> {
    let assignment = ident() - space() - sym('=') + expr().expect("an expression after '='");
    assignment.map(|(lhs, rhs)| Statement::AssignStatement(lhs, rhs))
}

fn call_stmt<'a>() -> Parser<'a, char, Statement> {
    function_call().map(|(name, args)| Statement::CallStatement(name, args))
}

/// Parse a statement and an optional trailing `;`
///
/// Consumes leading whitespace
fn stmt<'a>() -> Parser<'a, char, Statement> {
    // NB: keywords must come first otherwise they may be parsed as identifiers
    let stmt = builtin_stmt() | block_stmt() | jump_stmt() | assign_stmt() | call_stmt();

    space() * stmt - (space() * sym(';')).opt()
}

/// Parse one or more statements
///
/// Consumes leading whitespace. Unlike `repeat(1..)`, a committed failure in any statement is
/// passed up rather than ending the sequence.
fn stmts<'a>() -> Parser<'a, char, Vec<Statement>> {
    Parser::new(|input: &'a [char], start: usize| {
        let stmt = stmt();
        let mut stmts = Vec::new();
        let mut pos = start;

        loop {
            match stmt.parse_at(input, pos) {
                Ok((s, next)) => {
                    stmts.push(s);
                    pos = next;
                }
                Err(e @ PomError::Expect { .. }) => return Err(e),
                Err(e) if stmts.is_empty() => return Err(e),
                Err(_) => break,
            }
        }

        Ok((stmts, pos))
    })
}

/// Reject brackets nested deeper than `MAX_NESTING`
///
/// Brackets inside string literals don't count. Unbalanced brackets are left for the grammar to
/// report.
fn check_nesting(input: &[char]) -> Result<(), ParseError> {
    let mut depth = 0usize;
    let mut in_string = false;

    for (pos, c) in input.iter().enumerate() {
        match c {
            '"' => in_string = !in_string,
            '(' | '[' | '{' if !in_string => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(ParseError::new(
                        format!("brackets nested deeper than {} levels", MAX_NESTING),
                        pos,
                    ));
                }
            }
            ')' | ']' | '}' if !in_string => depth = depth.saturating_sub(1),
            _ => (),
        }
    }

    Ok(())
}

/// Parse a whole program
///
/// Errors carry the character offset of the furthest token the grammar could not accept.
pub fn parse(input: &str) -> Result<Program, ParseError> {
    let input: Vec<char> = input.chars().collect();
    check_nesting(&input)?;

    let stmt = stmt();
    let trailer = space() * end();
    let mut stmts = Vec::new();
    let mut pos = 0;

    loop {
        match stmt.parse_at(&input, pos) {
            Ok((s, next)) => {
                stmts.push(s);
                pos = next;
            }
            Err(_) if !stmts.is_empty() && trailer.parse_at(&input, pos).is_ok() => break,
            Err(e) => return Err(ParseError::from_pom(e, &input, "Expect a statement")),
        }
    }

    Ok(Program(stmts))
}

#[cfg(test)]
fn int(i: i64) -> Expression {
    Expression::PrimaryExpression(PrimaryExpression::Constant(Constant::Integer(i)))
}

#[cfg(test)]
fn var(name: &str) -> Expression {
    Expression::PrimaryExpression(PrimaryExpression::Identifier(Identifier(name.to_string())))
}

#[cfg(test)]
fn binop(f: fn(Box<Expression>, Box<Expression>) -> BinaryExpression, lhs: Expression, rhs: Expression) -> Expression {
    Expression::BinaryExpression(f(Box::new(lhs), Box::new(rhs)))
}

#[test]
fn test_keyword() {
    {
        let data = vec![(PRINT, "দেখাও("), (RETURN, "রিটার্ন x"), (EQUAL, "সমান"), (LESS, "ছোট 5")];

        for (word, input) in data {
            let input: Vec<char> = input.chars().collect();
            assert!(keyword(word).parse(&input).is_ok(), "{}", word);
        }
    }
    {
        let data = vec![(IF, "যদিও"), (PRINT, "দেখাওx"), (WHILE, "যতক্ষণ_1"), (RETURN, "রিটা")];

        for (word, input) in data {
            let input: Vec<char> = input.chars().collect();
            assert!(keyword(word).parse(&input).is_err(), "{}", word);
        }
    }
}

#[test]
fn test_string() {
    {
        let data = vec![
            (r#""hello world""#, "hello world"),
            (r#""   hello world " "#, "   hello world "),
            (r#""x বড় y থেকে""#, "x বড় y থেকে"),
            (r#""back\slash""#, "back\\slash"),
            (r#""""#, ""),
        ];

        for (input, expected) in data {
            let input: Vec<char> = input.chars().collect();
            assert_eq!(
                string().parse(&input),
                Ok(Expression::PrimaryExpression(PrimaryExpression::Str(
                    expected.to_string()
                )))
            );
        }
    }
    {
        let data = vec![r#"hello world""#, r#""hello world"#, r#"23423s"#];

        for input in data {
            let input: Vec<char> = input.chars().collect();
            assert!(string().parse(&input).is_err());
        }
    }
}

#[test]
fn test_constant() {
    {
        let data = vec![("0", 0), ("-0", 0), ("2342", 2342), ("-2342", -2342), ("007", 7)];

        for (input, expected) in data {
            let input: Vec<char> = input.chars().collect();
            assert_eq!(constant().parse(&input), Ok(int(expected)));
        }
    }
    {
        let data = vec!["abc", "-----", "+234", "99999999999999999999"];

        for input in data {
            let input: Vec<char> = input.chars().collect();
            assert!(constant().parse(&input).is_err());
        }
    }
}

#[test]
fn test_ident() {
    {
        let data = vec!["asdf", "_var1", "যোগ", "ফল২", "x_ফল", "যদিও", "ক১a"];

        for input in data {
            let chars: Vec<char> = input.chars().collect();
            assert_eq!(ident().parse(&chars), Ok(Identifier(input.to_string())));
        }
    }
    {
        let data = vec!["1abc", "২ফল", "$var", "যদি", "রিটার্ন", "দেখাও", ELSE, ELSE_PRECOMPOSED];

        for input in data {
            let chars: Vec<char> = input.chars().collect();
            assert!((ident() - end()).parse(&chars).is_err());
        }
    }
}

#[test]
fn test_primary_expr() {
    {
        let data = vec![
            ("asdf", var("asdf")),
            ("42", int(42)),
            (
                "(42)",
                Expression::PrimaryExpression(PrimaryExpression::Paren(Box::new(int(42)))),
            ),
            (
                "[42]",
                Expression::PrimaryExpression(PrimaryExpression::Paren(Box::new(int(42)))),
            ),
            (
                r#"("var3")"#,
                Expression::PrimaryExpression(PrimaryExpression::Paren(Box::new(
                    Expression::PrimaryExpression(PrimaryExpression::Str("var3".to_string())),
                ))),
            ),
            (
                "যোগ(1, x)",
                Expression::FunctionCall(Identifier("যোগ".to_string()), vec![int(1), var("x")]),
            ),
            ("f()", Expression::FunctionCall(Identifier("f".to_string()), vec![])),
        ];

        for (input, expected) in data {
            let input: Vec<char> = input.chars().collect();
            assert_eq!(primary_expr().parse(&input), Ok(expected));
        }
    }
    {
        let data = vec!["$var1", "❤", "?", "=", "[1, 2]", "f(1,)"];

        for input in data {
            let input: Vec<char> = input.chars().collect();
            assert!((expr() - end()).parse(&input).is_err());
        }
    }
}

#[test]
fn test_binop_expr() {
    let data = vec![
        (
            "1 + 2 * 3",
            binop(
                BinaryExpression::Plus,
                int(1),
                binop(BinaryExpression::Multiply, int(2), int(3)),
            ),
        ),
        (
            "1 - 2 - 3",
            binop(
                BinaryExpression::Minus,
                binop(BinaryExpression::Minus, int(1), int(2)),
                int(3),
            ),
        ),
        (
            "8 // 3 / 2 % 5",
            binop(
                BinaryExpression::Modulo,
                binop(
                    BinaryExpression::Divide,
                    binop(BinaryExpression::FloorDivide, int(8), int(3)),
                    int(2),
                ),
                int(5),
            ),
        ),
        (
            "(1 + 2) * x",
            binop(
                BinaryExpression::Multiply,
                Expression::PrimaryExpression(PrimaryExpression::Paren(Box::new(binop(
                    BinaryExpression::Plus,
                    int(1),
                    int(2),
                )))),
                var("x"),
            ),
        ),
        (
            "x-1",
            binop(BinaryExpression::Minus, var("x"), int(1)),
        ),
    ];

    for (input, expected) in data {
        let input: Vec<char> = input.chars().collect();
        assert_eq!(expr().parse(&input), Ok(expected));
    }
}

#[test]
fn test_writespace_ignored_expr() {
    let data = vec![
        ("1+2*3", "1 + 2 * 3"),
        ("  x   //   [ 2 ]", "x // [2]"),
        (" f  ( 123   )", "f(123)"),
        (r#"f(  "string"  ,   342   , x + y)"#, r#"f("string", 342, x + y)"#),
    ];

    for (input, baseline) in data {
        let input: Vec<char> = input.chars().collect();
        let baseline: Vec<char> = baseline.chars().collect();
        assert_eq!(expr().parse(&input), expr().parse(&baseline));
    }
}

#[test]
fn test_condition() {
    let data = vec![
        ("x < 5", Comparison::LessThan),
        ("x ছোট 5", Comparison::LessThan),
        ("x > 5", Comparison::GreaterThan),
        ("x বড় 5", Comparison::GreaterThan),
        ("x \u{9ac}\u{9dc} 5", Comparison::GreaterThan),
        ("x সমান 5", Comparison::Equal),
        ("x == 5", Comparison::Equal),
    ];

    for (input, op) in data {
        let input: Vec<char> = input.chars().collect();
        assert_eq!(
            condition().parse(&input),
            Ok(Condition {
                lhs: var("x"),
                op,
                rhs: int(5),
            })
        );
    }
}

#[test]
fn test_block_stmt() {
    let print = |e| Statement::BuiltinStatement(BuiltinStatement::Print(e));
    let x_lt_5 = Condition {
        lhs: var("x"),
        op: Comparison::LessThan,
        rhs: int(5),
    };
    {
        let data = vec![
            (
                "যতক্ষণ(x < 5) { দেখাও(x) }",
                Statement::BlockStatement(BlockStatement::While(x_lt_5.clone(), vec![print(var("x"))])),
            ),
            (
                "যদি (x < 5) { দেখাও(1) }",
                Statement::BlockStatement(BlockStatement::If(x_lt_5.clone(), vec![print(int(1))], None)),
            ),
            (
                "যদি(x < 5) { দেখাও(1) } অন্যথায় { দেখাও(2) }",
                Statement::BlockStatement(BlockStatement::If(
                    x_lt_5.clone(),
                    vec![print(int(1))],
                    Some(vec![print(int(2))]),
                )),
            ),
            (
                "যদি(x < 5) { যদি(x < 5) { দেখাও(1) } } অন্যথায় { দেখাও(2) }",
                Statement::BlockStatement(BlockStatement::If(
                    x_lt_5.clone(),
                    vec![Statement::BlockStatement(BlockStatement::If(
                        x_lt_5.clone(),
                        vec![print(int(1))],
                        None,
                    ))],
                    Some(vec![print(int(2))]),
                )),
            ),
            (
                "ফাংশন যোগ(x, y) { রিটার্ন(x + y) }",
                Statement::BlockStatement(BlockStatement::Function(
                    Identifier("যোগ".to_string()),
                    vec![Identifier("x".to_string()), Identifier("y".to_string())],
                    vec![Statement::JumpStatement(JumpStatement::Return(
                        Expression::PrimaryExpression(PrimaryExpression::Paren(Box::new(binop(
                            BinaryExpression::Plus,
                            var("x"),
                            var("y"),
                        )))),
                    ))],
                )),
            ),
            (
                "ফাংশন f() { দেখাও(1) }",
                Statement::BlockStatement(BlockStatement::Function(
                    Identifier("f".to_string()),
                    vec![],
                    vec![print(int(1))],
                )),
            ),
        ];

        for (input, expected) in data {
            let input: Vec<char> = input.chars().collect();
            assert_eq!(stmt().parse(&input), Ok(expected));
        }
    }
    {
        let data = vec![
            "যতক্ষণ(x < 5) দেখাও(x)",
            "যতক্ষণ(x < 5) { দেখাও(x)",
            "যতক্ষণ(x < 5) { }",
            "যতক্ষণ(x) { দেখাও(x) }",
            "যতক্ষণ x < 5 { দেখাও(x) }",
            "যদি(x <= 5) { দেখাও(x) }",
            "যদি(x < 5) { দেখাও(x) } অন্যথায় দেখাও(x)",
            "ফাংশন f(1) { দেখাও(1) }",
            "ফাংশন f(x, ) { দেখাও(1) }",
            "ফাংশন f(x) { }",
        ];

        for input in data {
            let input: Vec<char> = input.chars().collect();
            assert!((stmt() - space() - end()).parse(&input).is_err());
        }
    }
}

#[test]
fn test_assign_stmt() {
    {
        let data = vec![
            (
                "x = y",
                Statement::AssignStatement(Identifier("x".to_string()), var("y")),
            ),
            (
                "ফল = 1 + 2;",
                Statement::AssignStatement(
                    Identifier("ফল".to_string()),
                    binop(BinaryExpression::Plus, int(1), int(2)),
                ),
            ),
        ];

        for (input, expected) in data {
            let input: Vec<char> = input.chars().collect();
            assert_eq!(stmt().parse(&input), Ok(expected));
        }
    }
    {
        let data = vec!["x = y = z", "1 = x", "যদি = 3", "x ="];

        for input in data {
            let input: Vec<char> = input.chars().collect();
            assert!((stmt() - space() - end()).parse(&input).is_err());
        }
    }
}

#[test]
fn test_program() {
    {
        let data = vec![(
            "x = 3; যদি(x সমান 3) { x = 5 }\nযোগ(x)\nরিটার্ন x",
            vec![
                Statement::AssignStatement(Identifier("x".to_string()), int(3)),
                Statement::BlockStatement(BlockStatement::If(
                    Condition {
                        lhs: var("x"),
                        op: Comparison::Equal,
                        rhs: int(3),
                    },
                    vec![Statement::AssignStatement(Identifier("x".to_string()), int(5))],
                    None,
                )),
                Statement::CallStatement(Identifier("যোগ".to_string()), vec![var("x")]),
                Statement::JumpStatement(JumpStatement::Return(var("x"))),
            ],
        )];

        for (input, expected) in data {
            assert_eq!(parse(input), Ok(Program(expected)));
        }
    }
    {
        let data = vec![
            "",
            "   \n",
            "দেখাও(1",
            "দেখাও 1",
            "1 + 2",
            "x = 10 ^ 2",
            "দেখাও(\"unterminated)",
            "}",
        ];

        for input in data {
            assert!(parse(input).is_err());
        }
    }
}

#[test]
fn test_parse_error_position() {
    let data = vec![
        ("x = 1\ny = $", 10, "Expect an expression after '=', found '$'"),
        ("দেখাও(-x)", 6, "Expect '(expression)' after দেখাও, found '-'"),
        ("x = 1 দেখাও(- 1)", 12, "Expect '(expression)' after দেখাও, found '-'"),
        ("দেখাও(1", 7, "Expect '(expression)' after দেখাও, found end of input"),
        ("x = 1\n}", 6, "Expect a statement, found '}'"),
        ("", 0, "Expect a statement, found end of input"),
        ("রিটার্ন", 7, "Expect an expression after রিটার্ন, found end of input"),
        (
            "যতক্ষণ(x < 5) { y = ? }",
            20,
            "Expect an expression after '=', found '?'",
        ),
    ];

    for (input, position, message) in data {
        let err = parse(input).expect_err("parse should fail");
        assert_eq!(err.position, position, "{}", input);
        assert_eq!(err.message, message, "{}", input);
    }
}

#[test]
fn test_nesting_limit() {
    let nested = |depth| format!("দেখাও({}1{})", "(".repeat(depth), ")".repeat(depth));

    assert!(parse(&nested(MAX_NESTING - 1)).is_ok());

    let err = parse(&nested(2000)).expect_err("parse should fail");
    assert_eq!(err.position, 5 + MAX_NESTING);

    let blocks = format!(
        "{}দেখাও(1){}",
        "যদি(1 < 2) { ".repeat(MAX_NESTING + 1),
        " }".repeat(MAX_NESTING + 1)
    );
    assert!(parse(&blocks).is_err());

    // Brackets inside strings are just text
    let text = format!("দেখাও(\"{}\")", "(".repeat(2000));
    assert!(parse(&text).is_ok());
}

#[test]
fn test_parse_deterministic() {
    let src = "ফাংশন f(a) { রিটার্ন(a * 2) }\nx = f(3) + [4 // 2]\nদেখাও(x)";
    assert_eq!(parse(src), parse(src));
}
