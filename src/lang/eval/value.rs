use std::cmp::Ordering;
use std::fmt;

use crate::lang::ast::Comparison;
use crate::lang::error::RuntimeError;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer literals and integer-only arithmetic. Overflow is a runtime error, never a wrap.
    Integer(i64),
    /// Produced by `/`, or by arithmetic that mixes in another float
    Float(f64),
    String(String),
    /// What a call evaluates to when its body finishes without `রিটার্ন`
    None,
}

/// Both operands of a numeric operation, promoted to a common representation
enum Numbers {
    Integers(i64, i64),
    Floats(f64, f64),
}

impl Numbers {
    fn rhs_is_zero(&self) -> bool {
        match self {
            Numbers::Integers(_, r) => *r == 0,
            Numbers::Floats(_, r) => *r == 0.0,
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::None => "none",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    fn numbers(op: &'static str, lhs: &Value, rhs: &Value) -> Result<Numbers, RuntimeError> {
        match (lhs, rhs) {
            (Value::Integer(l), Value::Integer(r)) => Ok(Numbers::Integers(*l, *r)),
            (Value::Integer(l), Value::Float(r)) => Ok(Numbers::Floats(*l as f64, *r)),
            (Value::Float(l), Value::Integer(r)) => Ok(Numbers::Floats(*l, *r as f64)),
            (Value::Float(l), Value::Float(r)) => Ok(Numbers::Floats(*l, *r)),
            (l, r) => Err(RuntimeError::TypeMismatch {
                op,
                lhs: l.type_name(),
                rhs: r.type_name(),
            }),
        }
    }

    /// `+`: numeric sum, or concatenation of two strings
    pub fn plus(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        if let (Value::String(l), Value::String(r)) = (self, rhs) {
            return Ok(Value::String(format!("{}{}", l, r)));
        }

        match Value::numbers("+", self, rhs)? {
            Numbers::Integers(l, r) => l
                .checked_add(r)
                .map(Value::Integer)
                .ok_or(RuntimeError::Overflow { op: "+", lhs: l, rhs: r }),
            Numbers::Floats(l, r) => Ok(Value::Float(l + r)),
        }
    }

    pub fn minus(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        match Value::numbers("-", self, rhs)? {
            Numbers::Integers(l, r) => l
                .checked_sub(r)
                .map(Value::Integer)
                .ok_or(RuntimeError::Overflow { op: "-", lhs: l, rhs: r }),
            Numbers::Floats(l, r) => Ok(Value::Float(l - r)),
        }
    }

    pub fn multiply(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        match Value::numbers("*", self, rhs)? {
            Numbers::Integers(l, r) => l
                .checked_mul(r)
                .map(Value::Integer)
                .ok_or(RuntimeError::Overflow { op: "*", lhs: l, rhs: r }),
            Numbers::Floats(l, r) => Ok(Value::Float(l * r)),
        }
    }

    /// `/` always produces a float, even for two integers that divide evenly
    pub fn divide(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        let nums = Value::numbers("/", self, rhs)?;
        if nums.rhs_is_zero() {
            return Err(RuntimeError::DivisionByZero);
        }

        match nums {
            Numbers::Integers(l, r) => Ok(Value::Float(l as f64 / r as f64)),
            Numbers::Floats(l, r) => Ok(Value::Float(l / r)),
        }
    }

    /// `%` with the sign of the divisor, ie. `-7 % 3 == 2` and `7 % -3 == -2`
    pub fn modulo(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        let nums = Value::numbers("%", self, rhs)?;
        if nums.rhs_is_zero() {
            return Err(RuntimeError::DivisionByZero);
        }

        match nums {
            Numbers::Integers(l, r) => {
                // `i64::MIN % -1` overflows in hardware but is 0 mathematically
                let rem = l.checked_rem(r).unwrap_or(0);
                if rem != 0 && (rem < 0) != (r < 0) {
                    Ok(Value::Integer(rem + r))
                } else {
                    Ok(Value::Integer(rem))
                }
            }
            Numbers::Floats(l, r) => {
                let rem = l % r;
                if rem != 0.0 && (rem < 0.0) != (r < 0.0) {
                    Ok(Value::Float(rem + r))
                } else {
                    Ok(Value::Float(rem))
                }
            }
        }
    }

    /// `//` rounds towards negative infinity
    pub fn floor_divide(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        let nums = Value::numbers("//", self, rhs)?;
        if nums.rhs_is_zero() {
            return Err(RuntimeError::DivisionByZero);
        }

        match nums {
            Numbers::Integers(l, r) => {
                let overflow = RuntimeError::Overflow { op: "//", lhs: l, rhs: r };
                let quot = l.checked_div(r).ok_or_else(|| overflow.clone())?;
                if l % r != 0 && (l < 0) != (r < 0) {
                    quot.checked_sub(1).map(Value::Integer).ok_or(overflow)
                } else {
                    Ok(Value::Integer(quot))
                }
            }
            Numbers::Floats(l, r) => Ok(Value::Float((l / r).floor())),
        }
    }

    /// Evaluate `self <op> rhs` for a condition guard
    pub fn compare(&self, op: Comparison, rhs: &Value) -> Result<bool, RuntimeError> {
        let ordering = match op {
            Comparison::Equal => return Ok(self.loosely_equals(rhs)),
            Comparison::LessThan => self.ordering("<", rhs)?,
            Comparison::GreaterThan => self.ordering(">", rhs)?,
        };

        Ok(match op {
            Comparison::LessThan => ordering == Some(Ordering::Less),
            _ => ordering == Some(Ordering::Greater),
        })
    }

    fn ordering(&self, op: &'static str, rhs: &Value) -> Result<Option<Ordering>, RuntimeError> {
        if let (Value::String(l), Value::String(r)) = (self, rhs) {
            return Ok(Some(l.cmp(r)));
        }

        Ok(match Value::numbers(op, self, rhs)? {
            Numbers::Integers(l, r) => Some(l.cmp(&r)),
            Numbers::Floats(l, r) => l.partial_cmp(&r),
        })
    }

    /// Numbers compare by value across integer and float. Mismatched kinds are never equal.
    fn loosely_equals(&self, rhs: &Value) -> bool {
        match (self, rhs) {
            (Value::Integer(l), Value::Float(r)) | (Value::Float(r), Value::Integer(l)) => {
                *l as f64 == *r
            }
            (l, r) => l == r,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::String(s) => write!(f, "{}", s),
            Value::None => write!(f, "None"),
        }
    }
}

/// Shortest text that reads back as `x`
///
/// Whole numbers keep a fractional part (`5.0`). Exponents below -4 or from 16 up switch to
/// scientific notation with a signed, two digit exponent (`1e+16`, `1.5e-05`).
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{:e}", x);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if !(-4..16).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    } else {
        let fixed = x.to_string();
        if fixed.contains('.') {
            fixed
        } else {
            format!("{}.0", fixed)
        }
    }
}

#[test]
fn test_display() {
    let data = vec![
        (Value::Integer(-42), "-42"),
        (Value::Float(5.0), "5.0"),
        (Value::Float(0.5), "0.5"),
        (Value::Float(10.0 / 3.0), "3.3333333333333335"),
        (Value::Float(-0.0), "-0.0"),
        (Value::Float(0.0001), "0.0001"),
        (Value::Float(0.00001), "1e-05"),
        (Value::Float(1.5e-7), "1.5e-07"),
        (Value::Float(1e15), "1000000000000000.0"),
        (Value::Float(1e16), "1e+16"),
        (Value::Float(123456789012345680.0), "1.2345678901234568e+17"),
        (Value::Float(2.5e300), "2.5e+300"),
        (Value::Float(f64::INFINITY), "inf"),
        (Value::String("x বড় y থেকে".to_string()), "x বড় y থেকে"),
        (Value::None, "None"),
    ];

    for (value, expected) in data {
        assert_eq!(value.to_string(), expected);
    }
}

#[test]
fn test_arithmetic() {
    let i = Value::Integer;
    let f = Value::Float;
    let data: Vec<(Result<Value, RuntimeError>, Value)> = vec![
        (i(2).plus(&i(3)), i(5)),
        (i(2).plus(&f(0.5)), f(2.5)),
        (
            Value::String("ab".to_string()).plus(&Value::String("cd".to_string())),
            Value::String("abcd".to_string()),
        ),
        (i(2).minus(&i(5)), i(-3)),
        (i(4).multiply(&f(0.25)), f(1.0)),
        (i(10).divide(&i(2)), f(5.0)),
        (i(7).divide(&i(2)), f(3.5)),
        (i(7).modulo(&i(3)), i(1)),
        (i(-7).modulo(&i(3)), i(2)),
        (i(7).modulo(&i(-3)), i(-2)),
        (f(-7.5).modulo(&i(2)), f(0.5)),
        (i(i64::MIN).modulo(&i(-1)), i(0)),
        (i(i64::MIN).modulo(&i(3)), i(1)),
        (i(7).floor_divide(&i(2)), i(3)),
        (i(-7).floor_divide(&i(2)), i(-4)),
        (i(7).floor_divide(&i(-2)), i(-4)),
        (i(-8).floor_divide(&i(2)), i(-4)),
        (f(7.0).floor_divide(&i(2)), f(3.0)),
    ];

    for (result, expected) in data {
        assert_eq!(result, Ok(expected));
    }
}

#[test]
fn test_arithmetic_errors() {
    let i = Value::Integer;
    let s = || Value::String("s".to_string());
    let data: Vec<(Result<Value, RuntimeError>, RuntimeError)> = vec![
        (i(1).divide(&i(0)), RuntimeError::DivisionByZero),
        (i(-1).divide(&Value::Float(0.0)), RuntimeError::DivisionByZero),
        (i(0).modulo(&i(0)), RuntimeError::DivisionByZero),
        (i(-5).floor_divide(&i(0)), RuntimeError::DivisionByZero),
        (
            s().minus(&s()),
            RuntimeError::TypeMismatch {
                op: "-",
                lhs: "string",
                rhs: "string",
            },
        ),
        (
            s().plus(&i(1)),
            RuntimeError::TypeMismatch {
                op: "+",
                lhs: "string",
                rhs: "integer",
            },
        ),
        (
            i(i64::MAX).plus(&i(1)),
            RuntimeError::Overflow {
                op: "+",
                lhs: i64::MAX,
                rhs: 1,
            },
        ),
        (
            i(i64::MIN).floor_divide(&i(-1)),
            RuntimeError::Overflow {
                op: "//",
                lhs: i64::MIN,
                rhs: -1,
            },
        ),
    ];

    for (result, expected) in data {
        assert_eq!(result, Err(expected));
    }
}

#[test]
fn test_compare() {
    let i = Value::Integer;
    let s = |v: &str| Value::String(v.to_string());

    assert_eq!(i(1).compare(Comparison::LessThan, &i(2)), Ok(true));
    assert_eq!(i(2).compare(Comparison::LessThan, &i(2)), Ok(false));
    assert_eq!(Value::Float(2.5).compare(Comparison::GreaterThan, &i(2)), Ok(true));
    assert_eq!(s("a").compare(Comparison::LessThan, &s("b")), Ok(true));
    assert_eq!(i(2).compare(Comparison::Equal, &Value::Float(2.0)), Ok(true));
    assert_eq!(i(2).compare(Comparison::Equal, &s("2")), Ok(false));
    assert_eq!(Value::None.compare(Comparison::Equal, &Value::None), Ok(true));
    assert!(i(1).compare(Comparison::LessThan, &s("2")).is_err());
}
