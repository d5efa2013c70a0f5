use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum BinaryExpression {
    /// `+`
    Plus(Box<Expression>, Box<Expression>),
    /// `-`
    Minus(Box<Expression>, Box<Expression>),
    /// `*`
    Multiply(Box<Expression>, Box<Expression>),
    /// `/`
    Divide(Box<Expression>, Box<Expression>),
    /// `%`
    Modulo(Box<Expression>, Box<Expression>),
    /// `//`
    FloorDivide(Box<Expression>, Box<Expression>),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Constant {
    Integer(i64),
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct Identifier(pub String);

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum PrimaryExpression {
    Identifier(Identifier),
    Constant(Constant),
    Str(String),
    /// `( expr )` or `[ expr ]`
    Paren(Box<Expression>),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    PrimaryExpression(PrimaryExpression),
    /// (function, arguments)
    FunctionCall(Identifier, Vec<Expression>),
    BinaryExpression(BinaryExpression),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Comparison {
    /// `ছোট` or `<`
    LessThan,
    /// `বড়` or `>`
    GreaterThan,
    /// `সমান` or `==`
    Equal,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::LessThan => write!(f, "<"),
            Comparison::GreaterThan => write!(f, ">"),
            Comparison::Equal => write!(f, "=="),
        }
    }
}

/// Only usable as the guard of an `if` or `while`; never a value of its own
#[derive(Debug, PartialEq, Clone)]
pub struct Condition {
    pub lhs: Expression,
    pub op: Comparison,
    pub rhs: Expression,
}

/// Statements between `{` and `}`. The parser never produces an empty block.
pub type Block = Vec<Statement>;

#[derive(Debug, PartialEq, Clone)]
pub enum BlockStatement {
    /// (condition, true_body, false_body)
    If(Condition, Block, Option<Block>),
    /// (condition, stmts)
    While(Condition, Block),
    /// (name, parameters, body)
    Function(Identifier, Vec<Identifier>, Block),
}

#[derive(Debug, PartialEq, Clone)]
pub enum JumpStatement {
    Return(Expression),
}

#[derive(Debug, PartialEq, Clone)]
pub enum BuiltinStatement {
    Print(Expression),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    AssignStatement(Identifier, Expression),
    BlockStatement(BlockStatement),
    JumpStatement(JumpStatement),
    BuiltinStatement(BuiltinStatement),
    /// (function, arguments), result discarded
    CallStatement(Identifier, Vec<Expression>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Program(pub Vec<Statement>);
