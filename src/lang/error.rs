use thiserror::Error;

/// Malformed source text. Parsing stops at the first one of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Parse error at offset {position}: {message}")]
pub struct ParseError {
    pub message: String,
    /// Offset in characters (not bytes) into the source text
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }

    /// Convert a `pom` failure over `input`, pointing at the furthest position it reached
    ///
    /// `fallback` names what was expected when no committed rule failed.
    pub fn from_pom(err: pom::Error, input: &[char], fallback: &str) -> Self {
        let mut expected: Option<String> = None;
        let mut position = 0;
        let mut cur = Some(&err);

        while let Some(e) = cur {
            cur = match e {
                pom::Error::Incomplete => {
                    position = input.len();
                    None
                }
                pom::Error::Mismatch { position: p, .. }
                | pom::Error::Conversion { position: p, .. } => {
                    position = position.max(*p);
                    None
                }
                pom::Error::Expect {
                    message,
                    position: p,
                    inner,
                } => {
                    expected = Some(message.clone());
                    position = position.max(*p);
                    Some(&**inner)
                }
                pom::Error::Custom {
                    message,
                    position: p,
                    inner,
                } => {
                    expected = Some(message.clone());
                    position = position.max(*p);
                    inner.as_deref()
                }
            };
        }

        let found = match input.get(position) {
            Some(c) => format!("'{}'", c),
            None => "end of input".to_string(),
        };
        let expected = expected.unwrap_or_else(|| fallback.to_string());

        ParseError::new(format!("{}, found {}", expected, found), position)
    }
}

/// Anything that halts a running program
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Unknown variable: {name}")]
    UndefinedVariable { name: String },
    #[error("Unknown function: {name}")]
    UndefinedFunction { name: String },
    #[error("Divide by zero")]
    DivisionByZero,
    #[error("Function '{name}' expects {expected} arguments, got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Call depth exceeded {depth} (unbounded recursion?)")]
    StackOverflow { depth: usize },
    #[error("Cannot apply '{op}' to {lhs} and {rhs}")]
    TypeMismatch {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("{lhs} {op} {rhs} overflows")]
    Overflow {
        op: &'static str,
        lhs: i64,
        rhs: i64,
    },
    #[error("Failed to write output: {0}")]
    Output(String),
}

impl From<std::io::Error> for RuntimeError {
    fn from(e: std::io::Error) -> Self {
        RuntimeError::Output(e.to_string())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
