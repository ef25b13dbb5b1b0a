//! Filter parser - converts an XML element tree into the AST
//!
//! Dispatch is purely table-driven: the element's `(namespace, local name)`
//! is looked up in the [`Registry`] and the registered constructor builds the
//! node, calling back into the parser for its children. Unknown tags are an
//! error; nothing is skipped.

use crate::ast::{Expression, Filter, IdOperator, Identifier, Node, Operator};
use crate::element::Element;
use crate::error::{Error, Result};
use crate::namespaces::{FES20, OGC};
use crate::registry::Registry;
use std::cell::Cell;

pub(crate) const MAX_NESTING_DEPTH: usize = 64;

/// Parser bound to a registry
pub struct Parser<'r> {
    registry: &'r Registry,
    depth: Cell<usize>,
}

impl<'r> Parser<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            depth: Cell::new(0),
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Parse any registered element into a node.
    pub fn parse(&self, element: &Element) -> Result<Node> {
        let constructor = self
            .registry
            .get(element.name())
            .ok_or_else(|| Error::UnknownOperator(element.name().to_string()))?;

        let depth = self.depth.get();
        if depth >= MAX_NESTING_DEPTH {
            return Err(Error::malformed(
                element.local_name(),
                format!("filter nesting exceeds {} levels", MAX_NESTING_DEPTH),
            ));
        }

        tracing::trace!(tag = %element.name(), depth, "Parsing filter element");
        self.depth.set(depth + 1);
        let result = constructor(element, self);
        self.depth.set(depth);
        result
    }

    /// Parse an element that must be a boolean operator.
    pub fn parse_operator(&self, element: &Element) -> Result<Operator> {
        match self.parse(element)? {
            Node::Operator(op) => Ok(op),
            other => Err(wrong_kind(element, "an operator", &other)),
        }
    }

    /// Parse an element that must be a value expression.
    pub fn parse_expression(&self, element: &Element) -> Result<Expression> {
        match self.parse(element)? {
            Node::Expression(expr) => Ok(expr),
            other => Err(wrong_kind(element, "an expression", &other)),
        }
    }

    pub fn parse_identifier(&self, element: &Element) -> Result<Identifier> {
        match self.parse(element)? {
            Node::Identifier(id) => Ok(id),
            other => Err(wrong_kind(element, "an identifier", &other)),
        }
    }

    /// Parse a `<fes:Filter>` (or legacy `<ogc:Filter>`) root.
    ///
    /// The root holds either exactly one operator, or one or more identifiers
    /// which together form an [`IdOperator`].
    pub fn parse_filter(&self, element: &Element) -> Result<Filter> {
        if !element.is(FES20, "Filter") && !element.is(OGC, "Filter") {
            return Err(Error::UnknownOperator(element.name().to_string()));
        }

        let mut nodes = element
            .children()
            .iter()
            .map(|child| self.parse(child))
            .collect::<Result<Vec<_>>>()?;

        if nodes.is_empty() {
            return Err(Error::malformed("Filter", "filter is empty"));
        }

        if nodes.iter().all(|n| matches!(n, Node::Identifier(_))) {
            let ids = nodes
                .into_iter()
                .filter_map(|n| match n {
                    Node::Identifier(id) => Some(id),
                    _ => None,
                })
                .collect();
            return Ok(Filter {
                predicate: Operator::Id(IdOperator::new(ids)),
            });
        }

        if nodes.len() != 1 {
            return Err(Error::malformed(
                "Filter",
                "a filter holds exactly one operator, or only identifiers",
            ));
        }

        match nodes.remove(0) {
            Node::Operator(predicate) => Ok(Filter { predicate }),
            other => Err(wrong_kind(&element.children()[0], "an operator", &other)),
        }
    }
}

fn wrong_kind(element: &Element, expected: &str, found: &Node) -> Error {
    Error::malformed(
        element.local_name(),
        format!("expected {}, found {}", expected, found.kind()),
    )
}

/// Parse a filter document with the global registry.
pub fn parse_filter_str(xml: &str) -> Result<Filter> {
    let element = Element::parse(xml)?;
    Parser::new(Registry::global()).parse_filter(&element)
}
