//! Logical operators: `And`, `Or`, `Not`

use super::{Node, Operator};
use crate::compiler::Compiler;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::namespaces::FES20;
use crate::parser::Parser;
use crate::predicate::Predicate;
use crate::registry::RegistryBuilder;

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register(FES20, "And", LogicalOperator::from_element)
        .register(FES20, "Or", LogicalOperator::from_element)
        .register(FES20, "Not", LogicalOperator::from_element)
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogicalOperator {
    And(Vec<Operator>),
    Or(Vec<Operator>),
    Not(Box<Operator>),
}

impl LogicalOperator {
    pub fn from_element(element: &Element, parser: &Parser<'_>) -> Result<Node> {
        let operands = element
            .children()
            .iter()
            .map(|child| parser.parse_operator(child))
            .collect::<Result<Vec<_>>>()?;

        let op = match element.local_name() {
            "And" | "Or" if operands.len() < 2 => {
                return Err(Error::malformed(
                    element.local_name(),
                    format!("expected at least 2 operands, found {}", operands.len()),
                ))
            }
            "And" => Self::And(operands),
            "Or" => Self::Or(operands),
            "Not" => match <[Operator; 1]>::try_from(operands) {
                Ok([operand]) => Self::Not(Box::new(operand)),
                Err(operands) => {
                    return Err(Error::malformed(
                        "Not",
                        format!("expected exactly 1 operand, found {}", operands.len()),
                    ))
                }
            },
            _ => return Err(Error::UnknownOperator(element.name().to_string())),
        };

        Ok(Node::Operator(Operator::Logical(op)))
    }

    pub fn build_predicate(&self, ctx: &Compiler<'_>) -> Result<Predicate> {
        match self {
            Self::And(operands) => Ok(Predicate::And {
                predicates: compile_all(operands, ctx)?,
            }),
            Self::Or(operands) => Ok(Predicate::Or {
                predicates: compile_all(operands, ctx)?,
            }),
            Self::Not(operand) => Ok(Predicate::negate(ctx.compile_operator(operand)?)),
        }
    }
}

fn compile_all(operands: &[Operator], ctx: &Compiler<'_>) -> Result<Vec<Predicate>> {
    operands.iter().map(|op| ctx.compile_operator(op)).collect()
}
