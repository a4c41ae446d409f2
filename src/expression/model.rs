//! Expression model for the access-path planner.
//!
//! Filter and index-key expressions form a tagged variant tree. Every node
//! carries a scalar value type. The planner never mutates an expression in
//! place: normalization (operator reversal, prefix-LIKE bound synthesis)
//! always produces fresh nodes that clone the original operands, so a
//! statement's expression tree can be shared by any number of access paths.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// SQL scalar types carried by every expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Decimal,
    Timestamp,
    Varchar,
    Varbinary,
    Boolean,
}

impl ValueType {
    /// Returns the type name for explain output
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::TinyInt => "tinyint",
            ValueType::SmallInt => "smallint",
            ValueType::Integer => "integer",
            ValueType::BigInt => "bigint",
            ValueType::Float => "float",
            ValueType::Decimal => "decimal",
            ValueType::Timestamp => "timestamp",
            ValueType::Varchar => "varchar",
            ValueType::Varbinary => "varbinary",
            ValueType::Boolean => "boolean",
        }
    }

    /// Exact-representability test between scalar types.
    ///
    /// An index whose key type cannot exactly represent every value of the
    /// comparison operand's type would have to cast lossily at scan time, so
    /// the matcher refuses it. The relation is reflexive, admits integer
    /// widening, lets `Float` hold 32-bit-and-narrower integers, and lets
    /// `Decimal` hold every integer width. Nothing else qualifies.
    pub fn can_exactly_represent(&self, other: ValueType) -> bool {
        if *self == other {
            return true;
        }
        match self {
            ValueType::SmallInt => matches!(other, ValueType::TinyInt),
            ValueType::Integer => matches!(other, ValueType::TinyInt | ValueType::SmallInt),
            ValueType::BigInt => matches!(
                other,
                ValueType::TinyInt | ValueType::SmallInt | ValueType::Integer
            ),
            ValueType::Float => matches!(
                other,
                ValueType::TinyInt | ValueType::SmallInt | ValueType::Integer
            ),
            ValueType::Decimal => matches!(
                other,
                ValueType::TinyInt | ValueType::SmallInt | ValueType::Integer | ValueType::BigInt
            ),
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Comparison operators resolvable by an index scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
}

impl ComparisonOp {
    /// The operator that expresses the same constraint with the operands
    /// swapped: GT and LT exchange, GTE and LTE exchange, EQ and LIKE are
    /// their own reverses.
    pub fn reverse(self) -> Self {
        match self {
            ComparisonOp::Eq => ComparisonOp::Eq,
            ComparisonOp::Gt => ComparisonOp::Lt,
            ComparisonOp::Gte => ComparisonOp::Lte,
            ComparisonOp::Lt => ComparisonOp::Gt,
            ComparisonOp::Lte => ComparisonOp::Gte,
            ComparisonOp::Like => ComparisonOp::Like,
        }
    }

    /// Returns the SQL spelling for explain output
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Like => "LIKE",
        }
    }
}

/// The operator name used for n-ary conjunctions built by [`Expr::conjoin`].
pub const AND_OPERATOR: &str = "and";

/// A filter or index-key expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// A column reference: `table.column`.
    TupleValue {
        table: String,
        column_index: usize,
        column_name: String,
        value_type: ValueType,
    },
    /// A literal constant.
    Constant { value: Value, value_type: ValueType },
    /// A statement parameter (`?`), optionally remembering the constant the
    /// parameterizer substituted it for.
    Parameter {
        index: usize,
        value_type: ValueType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        original: Option<Box<Expr>>,
    },
    /// A binary comparison.
    Comparison {
        op: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Arithmetic, function application, conjunction: everything else.
    Operator {
        name: String,
        value_type: ValueType,
        operands: Vec<Expr>,
    },
}

impl Expr {
    /// Creates a column reference
    pub fn tuple_value(
        table: impl Into<String>,
        column_index: usize,
        column_name: impl Into<String>,
        value_type: ValueType,
    ) -> Self {
        Expr::TupleValue {
            table: table.into(),
            column_index,
            column_name: column_name.into(),
            value_type,
        }
    }

    /// Creates a constant
    pub fn constant(value: Value, value_type: ValueType) -> Self {
        Expr::Constant { value, value_type }
    }

    /// Creates a bare parameter with no recorded original constant
    pub fn parameter(index: usize, value_type: ValueType) -> Self {
        Expr::Parameter {
            index,
            value_type,
            original: None,
        }
    }

    /// Creates a parameter that was substituted for a user-written constant.
    /// The parameter takes the constant's value type.
    pub fn parameter_for_constant(index: usize, original: Expr) -> Self {
        Expr::Parameter {
            index,
            value_type: original.value_type(),
            original: Some(Box::new(original)),
        }
    }

    /// Creates a comparison
    pub fn comparison(op: ComparisonOp, left: Expr, right: Expr) -> Self {
        Expr::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates a general operator node
    pub fn operator(
        name: impl Into<String>,
        value_type: ValueType,
        operands: Vec<Expr>,
    ) -> Self {
        Expr::Operator {
            name: name.into(),
            value_type,
            operands,
        }
    }

    /// The scalar type this expression evaluates to. Comparisons are
    /// predicates and evaluate to `Boolean`.
    pub fn value_type(&self) -> ValueType {
        match self {
            Expr::TupleValue { value_type, .. }
            | Expr::Constant { value_type, .. }
            | Expr::Parameter { value_type, .. }
            | Expr::Operator { value_type, .. } => *value_type,
            Expr::Comparison { .. } => ValueType::Boolean,
        }
    }

    /// The comparison operator, when this is a comparison node
    pub fn comparison_op(&self) -> Option<ComparisonOp> {
        match self {
            Expr::Comparison { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// Left operand of a comparison
    pub fn left(&self) -> Option<&Expr> {
        match self {
            Expr::Comparison { left, .. } => Some(left),
            _ => None,
        }
    }

    /// Right operand of a comparison
    pub fn right(&self) -> Option<&Expr> {
        match self {
            Expr::Comparison { right, .. } => Some(right),
            _ => None,
        }
    }

    /// A fresh comparison with the reversed operator and swapped operands.
    /// The operands are cloned, not taken; the original node is untouched.
    pub fn reverse_comparison(&self) -> Option<Expr> {
        match self {
            Expr::Comparison { op, left, right } => Some(Expr::Comparison {
                op: op.reverse(),
                left: right.clone(),
                right: left.clone(),
            }),
            _ => None,
        }
    }

    /// The n-ary AND over the given conjuncts: `None` when there are none,
    /// the sole conjunct unchanged when there is one, an `and` operator node
    /// otherwise.
    pub fn conjoin(exprs: Vec<Expr>) -> Option<Expr> {
        match exprs.len() {
            0 => None,
            1 => exprs.into_iter().next(),
            _ => Some(Expr::Operator {
                name: AND_OPERATOR.to_string(),
                value_type: ValueType::Boolean,
                operands: exprs,
            }),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::TupleValue {
                table, column_name, ..
            } => write!(f, "{}.{}", table, column_name),
            Expr::Constant { value, .. } => write!(f, "{}", value),
            Expr::Parameter { index, .. } => write!(f, "?{}", index),
            Expr::Comparison { op, left, right } => {
                write!(f, "{} {} {}", left, op.as_str(), right)
            }
            Expr::Operator { name, operands, .. } if name == AND_OPERATOR => {
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, " AND ")?;
                    }
                    write!(f, "({})", operand)?;
                }
                Ok(())
            }
            Expr::Operator { name, operands, .. } => {
                write!(f, "{}(", name)?;
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", operand)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_comparator_reverse_table() {
        assert_eq!(ComparisonOp::Eq.reverse(), ComparisonOp::Eq);
        assert_eq!(ComparisonOp::Gt.reverse(), ComparisonOp::Lt);
        assert_eq!(ComparisonOp::Gte.reverse(), ComparisonOp::Lte);
        assert_eq!(ComparisonOp::Lt.reverse(), ComparisonOp::Gt);
        assert_eq!(ComparisonOp::Lte.reverse(), ComparisonOp::Gte);
        assert_eq!(ComparisonOp::Like.reverse(), ComparisonOp::Like);
    }

    #[test]
    fn test_reverse_is_involutive() {
        for op in [
            ComparisonOp::Eq,
            ComparisonOp::Gt,
            ComparisonOp::Gte,
            ComparisonOp::Lt,
            ComparisonOp::Lte,
            ComparisonOp::Like,
        ] {
            assert_eq!(op.reverse().reverse(), op);
        }
    }

    #[test]
    fn test_exact_representability() {
        assert!(ValueType::BigInt.can_exactly_represent(ValueType::Integer));
        assert!(ValueType::BigInt.can_exactly_represent(ValueType::TinyInt));
        assert!(ValueType::Decimal.can_exactly_represent(ValueType::BigInt));
        assert!(ValueType::Float.can_exactly_represent(ValueType::Integer));

        // No lossy casts.
        assert!(!ValueType::Integer.can_exactly_represent(ValueType::BigInt));
        assert!(!ValueType::Float.can_exactly_represent(ValueType::BigInt));
        assert!(!ValueType::BigInt.can_exactly_represent(ValueType::Float));
        assert!(!ValueType::Varchar.can_exactly_represent(ValueType::Integer));
    }

    #[test]
    fn test_reverse_comparison_swaps_operands() {
        let col = Expr::tuple_value("t", 0, "a", ValueType::Integer);
        let five = Expr::constant(json!(5), ValueType::Integer);
        let filter = Expr::comparison(ComparisonOp::Lt, five.clone(), col.clone());

        let reversed = filter.reverse_comparison().unwrap();
        assert_eq!(reversed.comparison_op(), Some(ComparisonOp::Gt));
        assert_eq!(reversed.left(), Some(&col));
        assert_eq!(reversed.right(), Some(&five));

        // The original is untouched.
        assert_eq!(filter.comparison_op(), Some(ComparisonOp::Lt));
    }

    #[test]
    fn test_conjoin_shapes() {
        let a = Expr::comparison(
            ComparisonOp::Eq,
            Expr::tuple_value("t", 0, "a", ValueType::Integer),
            Expr::constant(json!(1), ValueType::Integer),
        );
        let b = Expr::comparison(
            ComparisonOp::Gt,
            Expr::tuple_value("t", 1, "b", ValueType::Integer),
            Expr::constant(json!(2), ValueType::Integer),
        );

        assert_eq!(Expr::conjoin(vec![]), None);
        assert_eq!(Expr::conjoin(vec![a.clone()]), Some(a.clone()));

        let both = Expr::conjoin(vec![a.clone(), b.clone()]).unwrap();
        match both {
            Expr::Operator { name, operands, .. } => {
                assert_eq!(name, AND_OPERATOR);
                assert_eq!(operands, vec![a, b]);
            }
            other => panic!("expected operator node, got {:?}", other),
        }
    }

    #[test]
    fn test_expression_serde_round_trip() {
        let expr = Expr::comparison(
            ComparisonOp::Eq,
            Expr::operator(
                "substr",
                ValueType::Varchar,
                vec![
                    Expr::tuple_value("docs", 0, "doc", ValueType::Varchar),
                    Expr::constant(json!(1), ValueType::Integer),
                    Expr::constant(json!(1), ValueType::Integer),
                ],
            ),
            Expr::constant(json!("x"), ValueType::Varchar),
        );

        let payload = serde_json::to_string(&expr).unwrap();
        let back: Expr = serde_json::from_str(&payload).unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn test_display_renders_sql_shapes() {
        let filter = Expr::comparison(
            ComparisonOp::Gte,
            Expr::tuple_value("t", 0, "a", ValueType::Integer),
            Expr::constant(json!(5), ValueType::Integer),
        );
        assert_eq!(filter.to_string(), "t.a >= 5");

        let conj = Expr::conjoin(vec![filter.clone(), filter]).unwrap();
        assert_eq!(conj.to_string(), "(t.a >= 5) AND (t.a >= 5)");
    }
}
