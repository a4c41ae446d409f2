//! Prefix-pattern LIKE support.
//!
//! A LIKE filter whose pattern is a literal prefix followed by a single
//! trailing `%` constrains a scannable index exactly as the half-open range
//! `[prefix, next(prefix))`, where `next` is the shortest string sorting
//! immediately after every string that starts with the prefix. The planner
//! synthesizes a GTE lower bound and an LT upper bound from the one filter.

use serde_json::Value;

use super::model::{ComparisonOp, Expr, ValueType};

/// True when `pattern` is a prefix pattern: a non-empty literal followed by
/// a single trailing `%`, with no `_` anywhere.
pub fn is_prefix_pattern(pattern: &str) -> bool {
    if pattern.contains('_') {
        return false;
    }
    match pattern.strip_suffix('%') {
        Some(prefix) => !prefix.is_empty() && !prefix.contains('%'),
        None => false,
    }
}

/// The smallest valid char above `c`, skipping the surrogate gap.
fn next_char(c: char) -> Option<char> {
    let mut code = c as u32 + 1;
    while code <= char::MAX as u32 {
        if let Some(next) = char::from_u32(code) {
            return Some(next);
        }
        code += 1;
    }
    None
}

/// The shortest string sorting immediately after every string with the
/// given prefix: bump the last char, carrying over chars already at the
/// maximum. `None` when the whole prefix is at the maximum, in which case
/// no string sorts above the prefix region and the lower bound alone is
/// exact.
fn next_prefix(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        if let Some(bumped) = next_char(last) {
            chars.push(bumped);
            return Some(chars.into_iter().collect());
        }
    }
    None
}

impl Expr {
    /// True for a VARCHAR constant whose value is a prefix pattern.
    pub fn is_prefix_pattern_constant(&self) -> bool {
        match self {
            Expr::Constant {
                value: Value::String(pattern),
                value_type: ValueType::Varchar,
            } => is_prefix_pattern(pattern),
            _ => false,
        }
    }

    /// The prefix-pattern string of a LIKE comparison's right-hand side,
    /// reading through a parameter to its recorded original constant.
    fn prefix_like_pattern(&self) -> Option<&str> {
        let rhs = self.right()?;
        let constant = match rhs {
            Expr::Parameter {
                original: Some(original),
                ..
            } => original.as_ref(),
            other => other,
        };
        match constant {
            Expr::Constant {
                value: Value::String(pattern),
                value_type: ValueType::Varchar,
            } if is_prefix_pattern(pattern) => Some(pattern),
            _ => None,
        }
    }

    /// The GTE lower bound synthesized from a prefix-LIKE comparison:
    /// `left >= 'prefix'`. Fresh nodes; the original filter is untouched.
    pub fn gte_filter_from_prefix_like(&self) -> Option<Expr> {
        if self.comparison_op() != Some(ComparisonOp::Like) {
            return None;
        }
        let pattern = self.prefix_like_pattern()?;
        let prefix = &pattern[..pattern.len() - 1];
        Some(Expr::comparison(
            ComparisonOp::Gte,
            self.left()?.clone(),
            Expr::constant(Value::String(prefix.to_string()), ValueType::Varchar),
        ))
    }

    /// The LT upper bound synthesized from a prefix-LIKE comparison:
    /// `left < next('prefix')`. `None` when no string sorts above the
    /// prefix region.
    pub fn lt_filter_from_prefix_like(&self) -> Option<Expr> {
        if self.comparison_op() != Some(ComparisonOp::Like) {
            return None;
        }
        let pattern = self.prefix_like_pattern()?;
        let bound = next_prefix(&pattern[..pattern.len() - 1])?;
        Some(Expr::comparison(
            ComparisonOp::Lt,
            self.left()?.clone(),
            Expr::constant(Value::String(bound), ValueType::Varchar),
        ))
    }
}
