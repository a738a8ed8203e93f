//! Mutation operator catalog.
//!
//! Each operator is one variant of a closed enum: a pure `matches`/`transform`
//! pair over a fixed token window. Operators are independent; when several
//! match the same position the scanner emits one Mutable per pair.

use serde::{Deserialize, Serialize};

use crate::lexer::TokenWindow;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    ArithmeticSwap,
    ComparisonBoundary,
    ComparisonNegate,
    LogicalSwap,
    BooleanLiteralFlip,
    NegationRemoval,
}

/// Every operator the scanner consults, in catalog order.
pub const CATALOG: &[OperatorKind] = &[
    OperatorKind::ArithmeticSwap,
    OperatorKind::ComparisonBoundary,
    OperatorKind::ComparisonNegate,
    OperatorKind::LogicalSwap,
    OperatorKind::BooleanLiteralFlip,
    OperatorKind::NegationRemoval,
];

/// Node kinds that host a binary operator token in the supported grammars.
const BINARY_PARENTS: &[&str] = &[
    "binary_operator",
    "binary_expression",
    "comparison_operator",
    "boolean_operator",
];

const UNARY_PARENTS: &[&str] = &["unary_expression", "unary_operator", "not_operator"];

impl OperatorKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperatorKind::ArithmeticSwap => "arith_swap",
            OperatorKind::ComparisonBoundary => "cmp_boundary",
            OperatorKind::ComparisonNegate => "cmp_negate",
            OperatorKind::LogicalSwap => "logic_swap",
            OperatorKind::BooleanLiteralFlip => "bool_flip",
            OperatorKind::NegationRemoval => "negate_remove",
        }
    }

    /// True when this operator applies to the window's center token.
    pub fn matches(&self, window: &TokenWindow) -> bool {
        self.transform(window).is_some()
    }

    /// Replacement text for the center token, leaving every other position
    /// unchanged. `None` when the operator does not apply.
    pub fn transform(&self, window: &TokenWindow) -> Option<String> {
        let token = window.current();
        match self {
            OperatorKind::ArithmeticSwap => {
                if !BINARY_PARENTS.contains(&token.parent_kind) {
                    return None;
                }
                // `+` on a string literal is concatenation, not arithmetic.
                if token.text == "+"
                    && window.prev().is_some_and(|p| p.kind.contains("string"))
                {
                    return None;
                }
                let swapped = match token.text.as_str() {
                    "+" => "-",
                    "-" => "+",
                    "*" => "/",
                    "/" => "*",
                    "%" => "*",
                    "//" => "/",
                    "**" => "*",
                    _ => return None,
                };
                Some(swapped.to_string())
            }
            OperatorKind::ComparisonBoundary => {
                if !BINARY_PARENTS.contains(&token.parent_kind) {
                    return None;
                }
                let swapped = match token.text.as_str() {
                    "<" => "<=",
                    "<=" => "<",
                    ">" => ">=",
                    ">=" => ">",
                    _ => return None,
                };
                Some(swapped.to_string())
            }
            OperatorKind::ComparisonNegate => {
                if !BINARY_PARENTS.contains(&token.parent_kind) {
                    return None;
                }
                let negated = match token.text.as_str() {
                    "<" => ">=",
                    "<=" => ">",
                    ">" => "<=",
                    ">=" => "<",
                    "==" => "!=",
                    "!=" => "==",
                    _ => return None,
                };
                Some(negated.to_string())
            }
            OperatorKind::LogicalSwap => {
                if !BINARY_PARENTS.contains(&token.parent_kind) {
                    return None;
                }
                let swapped = match token.text.as_str() {
                    "&&" => "||",
                    "||" => "&&",
                    "and" => "or",
                    "or" => "and",
                    _ => return None,
                };
                Some(swapped.to_string())
            }
            OperatorKind::BooleanLiteralFlip => {
                let flipped = match (token.kind, token.text.as_str()) {
                    ("true", "true") => "false",
                    ("false", "false") => "true",
                    ("true", "True") => "False",
                    ("false", "False") => "True",
                    _ => return None,
                };
                Some(flipped.to_string())
            }
            OperatorKind::NegationRemoval => {
                if !UNARY_PARENTS.contains(&token.parent_kind) {
                    return None;
                }
                match token.text.as_str() {
                    "!" | "not" => Some(String::new()),
                    _ => None,
                }
            }
        }
    }
}

/// All operators applying to the window, in catalog order.
pub fn applicable_operators(window: &TokenWindow) -> Vec<OperatorKind> {
    CATALOG
        .iter()
        .copied()
        .filter(|op| op.matches(window))
        .collect()
}
