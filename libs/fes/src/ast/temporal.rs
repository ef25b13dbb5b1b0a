//! Temporal operators
//!
//! These are recognized so that a filter using them fails with a clear
//! "unsupported" error rather than as an unknown tag. Their time operands
//! (`gml:TimeInstant`, `gml:TimePeriod`) are not decoded.

use super::expressions::{Expression, ValueReference};
use super::{Node, Operator};
use crate::element::Element;
use crate::error::{Error, Result};
use crate::namespaces::FES20;
use crate::parser::Parser;
use crate::predicate::Predicate;
use crate::registry::RegistryBuilder;

const TAGS: [&str; 14] = [
    "After",
    "Before",
    "Begins",
    "BegunBy",
    "TContains",
    "During",
    "EndedBy",
    "Ends",
    "TEquals",
    "Meets",
    "MetBy",
    "TOverlaps",
    "OverlappedBy",
    "AnyInteracts",
];

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    TAGS.iter().fold(builder, |builder, tag| {
        builder.register(FES20, tag, TemporalOperator::from_element)
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemporalOperator {
    operator: &'static str,
    reference: Option<ValueReference>,
}

impl TemporalOperator {
    pub fn from_element(element: &Element, parser: &Parser<'_>) -> Result<Node> {
        let operator = TAGS
            .iter()
            .copied()
            .find(|tag| *tag == element.local_name())
            .ok_or_else(|| Error::UnknownOperator(element.name().to_string()))?;

        if element.children().len() != 2 {
            return Err(Error::malformed(
                operator,
                format!("expected 2 operands, found {}", element.children().len()),
            ));
        }

        let first = &element.children()[0];
        let reference = if first.is(FES20, "ValueReference") {
            match parser.parse_expression(first)? {
                Expression::ValueReference(r) => Some(r),
                _ => None,
            }
        } else {
            None
        };

        Ok(Node::Operator(Operator::Temporal(Self {
            operator,
            reference,
        })))
    }

    pub fn operator(&self) -> &'static str {
        self.operator
    }

    pub fn reference(&self) -> Option<&ValueReference> {
        self.reference.as_ref()
    }

    pub fn build_predicate(&self) -> Result<Predicate> {
        Err(Error::Unsupported(format!(
            "temporal operator <fes:{}>",
            self.operator
        )))
    }
}
