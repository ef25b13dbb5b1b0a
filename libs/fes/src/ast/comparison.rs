//! Comparison operators (`PropertyIs*`)

use super::expressions::Expression;
use super::{Node, Operator};
use crate::compiler::Compiler;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::namespaces::FES20;
use crate::parser::Parser;
use crate::predicate::{CompareOp, Predicate};
use crate::registry::RegistryBuilder;

const BINARY_TAGS: [(&str, CompareOp); 6] = [
    ("PropertyIsEqualTo", CompareOp::Equal),
    ("PropertyIsNotEqualTo", CompareOp::NotEqual),
    ("PropertyIsLessThan", CompareOp::LessThan),
    ("PropertyIsGreaterThan", CompareOp::GreaterThan),
    ("PropertyIsLessThanOrEqualTo", CompareOp::LessThanOrEqual),
    ("PropertyIsGreaterThanOrEqualTo", CompareOp::GreaterThanOrEqual),
];

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    let builder = BINARY_TAGS.iter().fold(builder, |builder, (tag, _)| {
        builder.register(FES20, tag, BinaryComparison::from_element)
    });
    builder
        .register(FES20, "PropertyIsLike", PropertyIsLike::from_element)
        .register(FES20, "PropertyIsNull", PropertyIsNull::from_element)
        .register(FES20, "PropertyIsNil", PropertyIsNil::from_element)
        .register(FES20, "PropertyIsBetween", PropertyIsBetween::from_element)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonOperator {
    Binary(BinaryComparison),
    Like(PropertyIsLike),
    Null(PropertyIsNull),
    Nil(PropertyIsNil),
    Between(PropertyIsBetween),
}

impl ComparisonOperator {
    pub fn build_predicate(&self, ctx: &Compiler<'_>) -> Result<Predicate> {
        match self {
            Self::Binary(op) => op.build_predicate(ctx),
            Self::Like(op) => op.build_predicate(ctx),
            Self::Null(op) => op.build_predicate(ctx),
            Self::Nil(op) => op.build_predicate(ctx),
            Self::Between(op) => op.build_predicate(ctx),
        }
    }
}

fn node(op: ComparisonOperator) -> Node {
    Node::Operator(Operator::Comparison(op))
}

/// `matchAction`: how multi-valued properties are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchAction {
    #[default]
    Any,
    All,
    One,
}

impl MatchAction {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "Any" => Ok(Self::Any),
            "All" => Ok(Self::All),
            "One" => Ok(Self::One),
            _ => Err(Error::MalformedValue {
                value: raw.to_string(),
                expected: "Any, All or One",
            }),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::All => "All",
            Self::One => "One",
        }
    }
}

/// xs:boolean attribute with a default.
fn bool_attribute(element: &Element, name: &str, default: bool) -> Result<bool> {
    match element.attribute(name) {
        None => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(Error::MalformedValue {
            value: other.to_string(),
            expected: "true or false",
        }),
    }
}

fn expression_children(
    element: &Element,
    parser: &Parser<'_>,
    count: usize,
) -> Result<Vec<Expression>> {
    let children = element.children();
    if children.len() != count {
        return Err(Error::malformed(
            element.local_name(),
            format!("expected {} expression(s), found {}", count, children.len()),
        ));
    }
    children
        .iter()
        .map(|child| parser.parse_expression(child))
        .collect()
}

/// `PropertyIsEqualTo`, `PropertyIsLessThan`, ...
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryComparison {
    pub op: CompareOp,
    pub lhs: Expression,
    pub rhs: Expression,
    pub match_case: bool,
    pub match_action: MatchAction,
}

impl BinaryComparison {
    pub fn from_element(element: &Element, parser: &Parser<'_>) -> Result<Node> {
        let op = BINARY_TAGS
            .iter()
            .find(|(tag, _)| *tag == element.local_name())
            .map(|(_, op)| *op)
            .ok_or_else(|| Error::UnknownOperator(element.name().to_string()))?;

        let match_case = bool_attribute(element, "matchCase", true)?;
        let match_action = match element.attribute("matchAction") {
            Some(raw) => MatchAction::parse(raw)?,
            None => MatchAction::default(),
        };

        let mut operands = expression_children(element, parser, 2)?;
        let rhs = operands.remove(1);
        let lhs = operands.remove(0);

        Ok(node(ComparisonOperator::Binary(Self {
            op,
            lhs,
            rhs,
            match_case,
            match_action,
        })))
    }

    pub fn build_predicate(&self, ctx: &Compiler<'_>) -> Result<Predicate> {
        if self.match_action != MatchAction::Any {
            return Err(Error::Unsupported(format!(
                "matchAction=\"{}\"",
                self.match_action.as_str()
            )));
        }

        Ok(Predicate::Compare {
            lhs: self.lhs.build_operand(ctx)?,
            op: self.op,
            rhs: self.rhs.build_operand(ctx)?,
            match_case: self.match_case,
        })
    }
}

/// `PropertyIsLike` with its own wildcard characters
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyIsLike {
    pub expression: Expression,
    pub pattern: String,
    pub wild_card: char,
    pub single_char: char,
    pub escape_char: char,
    pub match_case: bool,
}

fn single_char_attribute(element: &Element, name: &str) -> Result<char> {
    let raw = element.require_attribute(name)?;
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::MalformedValue {
            value: raw.to_string(),
            expected: "a single character",
        }),
    }
}

impl PropertyIsLike {
    pub fn from_element(element: &Element, parser: &Parser<'_>) -> Result<Node> {
        let wild_card = single_char_attribute(element, "wildCard")?;
        let single_char = single_char_attribute(element, "singleChar")?;
        let escape_char = single_char_attribute(element, "escapeChar")?;
        let match_case = bool_attribute(element, "matchCase", true)?;

        let mut operands = expression_children(element, parser, 2)?;
        let pattern = match operands.remove(1) {
            Expression::Literal(lit) => match lit.raw() {
                Some(raw) => raw.to_string(),
                None => {
                    return Err(Error::malformed(
                        element.local_name(),
                        "pattern must be a text literal",
                    ))
                }
            },
            _ => {
                return Err(Error::malformed(
                    element.local_name(),
                    "pattern must be a literal",
                ))
            }
        };

        Ok(node(ComparisonOperator::Like(Self {
            expression: operands.remove(0),
            pattern,
            wild_card,
            single_char,
            escape_char,
            match_case,
        })))
    }

    /// Rewrite the pattern into SQL `LIKE` syntax (`%`, `_`, `\` escapes).
    pub fn like_pattern(&self) -> Result<String> {
        let mut out = String::with_capacity(self.pattern.len() + 4);
        let mut escaping = false;

        for c in self.pattern.chars() {
            if escaping {
                push_literal(&mut out, c);
                escaping = false;
            } else if c == self.escape_char {
                escaping = true;
            } else if c == self.wild_card {
                out.push('%');
            } else if c == self.single_char {
                out.push('_');
            } else {
                push_literal(&mut out, c);
            }
        }

        if escaping {
            return Err(Error::MalformedValue {
                value: self.pattern.clone(),
                expected: "a pattern that does not end with the escape character",
            });
        }
        Ok(out)
    }

    pub fn build_predicate(&self, ctx: &Compiler<'_>) -> Result<Predicate> {
        Ok(Predicate::Like {
            lhs: self.expression.build_operand(ctx)?,
            pattern: self.like_pattern()?,
            match_case: self.match_case,
        })
    }
}

fn push_literal(out: &mut String, c: char) {
    if matches!(c, '%' | '_' | '\\') {
        out.push('\\');
    }
    out.push(c);
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyIsNull {
    pub expression: Expression,
}

impl PropertyIsNull {
    pub fn from_element(element: &Element, parser: &Parser<'_>) -> Result<Node> {
        let mut operands = expression_children(element, parser, 1)?;
        Ok(node(ComparisonOperator::Null(Self {
            expression: operands.remove(0),
        })))
    }

    pub fn build_predicate(&self, ctx: &Compiler<'_>) -> Result<Predicate> {
        Ok(Predicate::IsNull {
            lhs: self.expression.build_operand(ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyIsNil {
    pub expression: Expression,
    pub nil_reason: Option<String>,
}

impl PropertyIsNil {
    pub fn from_element(element: &Element, parser: &Parser<'_>) -> Result<Node> {
        let mut operands = expression_children(element, parser, 1)?;
        Ok(node(ComparisonOperator::Nil(Self {
            expression: operands.remove(0),
            nil_reason: element.attribute("nilReason").map(str::to_string),
        })))
    }

    pub fn build_predicate(&self, ctx: &Compiler<'_>) -> Result<Predicate> {
        Ok(Predicate::IsNil {
            lhs: self.expression.build_operand(ctx)?,
            nil_reason: self.nil_reason.clone(),
        })
    }
}

/// `PropertyIsBetween` with `LowerBoundary` / `UpperBoundary` children
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyIsBetween {
    pub expression: Expression,
    pub lower: Expression,
    pub upper: Expression,
}

fn boundary(element: &Element, parser: &Parser<'_>, tag: &str) -> Result<Expression> {
    if !element.is(FES20, tag) {
        return Err(Error::malformed(
            "PropertyIsBetween",
            format!("expected <{}>, found <{}>", tag, element.local_name()),
        ));
    }
    let mut operands = expression_children(element, parser, 1)?;
    Ok(operands.remove(0))
}

impl PropertyIsBetween {
    pub fn from_element(element: &Element, parser: &Parser<'_>) -> Result<Node> {
        let [expression, lower, upper] = element.children() else {
            return Err(Error::malformed(
                element.local_name(),
                "expected an expression, LowerBoundary and UpperBoundary",
            ));
        };

        Ok(node(ComparisonOperator::Between(Self {
            expression: parser.parse_expression(expression)?,
            lower: boundary(lower, parser, "LowerBoundary")?,
            upper: boundary(upper, parser, "UpperBoundary")?,
        })))
    }

    pub fn build_predicate(&self, ctx: &Compiler<'_>) -> Result<Predicate> {
        Ok(Predicate::Between {
            lhs: self.expression.build_operand(ctx)?,
            lower: self.lower.build_operand(ctx)?,
            upper: self.upper.build_operand(ctx)?,
        })
    }
}
