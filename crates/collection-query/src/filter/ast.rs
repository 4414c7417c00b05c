//! Abstract Syntax Tree (AST) for filter expressions.

use std::cmp::Ordering;
use std::fmt;

/// A parsed filter.
///
/// An empty filter string parses to [`Filter::MatchAll`], which matches
/// every object without consulting its schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches everything (the filter text was empty).
    MatchAll,

    /// A boolean expression over the object's fields.
    Expr(Expr),
}

impl Filter {
    /// Returns the expression, or `None` for [`Filter::MatchAll`].
    pub fn expr(&self) -> Option<&Expr> {
        match self {
            Filter::MatchAll => None,
            Filter::Expr(expr) => Some(expr),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::MatchAll => Ok(()),
            Filter::Expr(expr) => fmt::Display::fmt(expr, f),
        }
    }
}

/// A filter expression node.
///
/// The tree is immutable once parsed and may be evaluated against any number
/// of objects.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `field op literal`.
    Comparison {
        /// The filter-facing field name.
        field: String,
        /// The comparison operator.
        op: Operator,
        /// The right-hand literal.
        literal: Literal,
    },

    /// `left and right` or `left or right`.
    Logical {
        /// Which connective joins the operands.
        op: LogicalOp,
        /// Left operand, evaluated first.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },

    /// `not operand`.
    Not(Box<Expr>),
}

impl Expr {
    /// Creates a comparison node.
    pub fn comparison(field: impl Into<String>, op: Operator, literal: Literal) -> Self {
        Expr::Comparison {
            field: field.into(),
            op,
            literal,
        }
    }

    /// Creates an AND node from two expressions.
    ///
    /// # Example
    ///
    /// ```
    /// use collection_query_rs::filter::{Expr, Literal, Operator};
    ///
    /// let expr = Expr::and(
    ///     Expr::comparison("str", Operator::Eq, Literal::String("a".into())),
    ///     Expr::comparison("int", Operator::Gt, Literal::Number(1.0)),
    /// );
    /// assert_eq!(expr.to_string(), "str == 'a' and int > 1");
    /// ```
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::Logical {
            op: LogicalOp::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates an OR node from two expressions.
    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Logical {
            op: LogicalOp::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates a NOT node.
    pub fn negate(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    /// Binding strength used when rendering; higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            Expr::Logical {
                op: LogicalOp::Or, ..
            } => 1,
            Expr::Logical {
                op: LogicalOp::And,
                ..
            } => 2,
            Expr::Not(_) => 3,
            Expr::Comparison { .. } => 4,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Comparison { field, op, literal } => write!(f, "{} {} {}", field, op, literal),
            Expr::Logical { op, left, right } => {
                let precedence = self.precedence();
                left.fmt_operand(f, precedence)?;
                write!(f, " {} ", op)?;
                // Both connectives are left-associative, so a right operand of
                // equal precedence needs parentheses to keep its shape.
                right.fmt_operand(f, precedence + 1)
            }
            Expr::Not(inner) => {
                f.write_str("not ")?;
                inner.fmt_operand(f, 3)
            }
        }
    }
}

/// Boolean connective of a [`Expr::Logical`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// `and`
    And,
    /// `or`
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
        })
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `~` (regex match)
    Match,
    /// `!~` (regex non-match)
    NotMatch,
}

impl Operator {
    /// Returns true for `==` and `!=`.
    pub fn is_equality(self) -> bool {
        matches!(self, Operator::Eq | Operator::Ne)
    }

    /// Returns true for `>`, `>=`, `<` and `<=`.
    pub fn is_ordering(self) -> bool {
        matches!(self, Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le)
    }

    /// Returns true for `~` and `!~`.
    pub fn is_regex(self) -> bool {
        matches!(self, Operator::Match | Operator::NotMatch)
    }

    /// Applies an equality or ordering operator to the result of comparing
    /// the field value with the literal.
    ///
    /// Regex operators never hold here; the evaluator handles them separately.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ne => ordering != Ordering::Equal,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Ge => ordering != Ordering::Less,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Le => ordering != Ordering::Greater,
            Operator::Match | Operator::NotMatch => false,
        }
    }

    /// Like [`Operator::holds`], for values without a total order.
    ///
    /// Unordered values (NaN) are only ever unequal.
    pub fn holds_partial(self, ordering: Option<Ordering>) -> bool {
        match ordering {
            Some(ordering) => self.holds(ordering),
            None => self == Operator::Ne,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Match => "~",
            Operator::NotMatch => "!~",
        })
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `'text'`
    String(String),
    /// `12`, `-3.5`
    Number(f64),
    /// `true` or `false`
    Bool(bool),
    /// `null`
    Null,
}

impl Literal {
    /// Returns the literal's kind, used by the compatibility table.
    pub fn kind(&self) -> LiteralKind {
        match self {
            Literal::String(_) => LiteralKind::String,
            Literal::Number(_) => LiteralKind::Number,
            Literal::Bool(_) => LiteralKind::Bool,
            Literal::Null => LiteralKind::Null,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Null => f.write_str("null"),
        }
    }
}

/// The kind of a [`Literal`], without its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    /// A string literal.
    String,
    /// A numeric literal.
    Number,
    /// `true` or `false`.
    Bool,
    /// `null`.
    Null,
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LiteralKind::String => "string",
            LiteralKind::Number => "number",
            LiteralKind::Bool => "bool",
            LiteralKind::Null => "null",
        })
    }
}
