//! Spatial operators and their GML geometry operands
//!
//! `gml:Envelope` is decoded into corner coordinates because backends treat
//! bounding boxes specially. Every other GML geometry is kept as serialized
//! GML and handed to the backend as-is.

use super::expressions::{Expression, LiteralValue, ValueReference};
use super::{Node, Operator};
use crate::compiler::Compiler;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::namespaces::{is_gml, FES20};
use crate::parser::Parser;
use crate::predicate::{Distance, Envelope, Geometry, Predicate, SpatialOp};
use crate::registry::RegistryBuilder;

const BINARY_TAGS: [(&str, SpatialOp); 8] = [
    ("Equals", SpatialOp::Equals),
    ("Disjoint", SpatialOp::Disjoint),
    ("Touches", SpatialOp::Touches),
    ("Within", SpatialOp::Within),
    ("Overlaps", SpatialOp::Overlaps),
    ("Crosses", SpatialOp::Crosses),
    ("Intersects", SpatialOp::Intersects),
    ("Contains", SpatialOp::Contains),
];

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    let builder = BINARY_TAGS.iter().fold(builder, |builder, (tag, _)| {
        builder.register(FES20, tag, SpatialOperator::binary_from_element)
    });
    builder
        .register(FES20, "BBOX", SpatialOperator::bbox_from_element)
        .register(FES20, "DWithin", SpatialOperator::distance_from_element)
        .register(FES20, "Beyond", SpatialOperator::distance_from_element)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpatialOperator {
    /// `BBOX`; without a property reference the default geometry is used.
    BBox {
        reference: Option<ValueReference>,
        envelope: Envelope,
    },
    Binary {
        op: SpatialOp,
        reference: ValueReference,
        geometry: Geometry,
    },
    /// `DWithin` / `Beyond`
    Distance {
        op: SpatialOp,
        reference: ValueReference,
        geometry: Geometry,
        distance: Distance,
    },
}

fn node(op: SpatialOperator) -> Node {
    Node::Operator(Operator::Spatial(op))
}

fn property_reference(
    element: &Element,
    parser: &Parser<'_>,
    child: &Element,
) -> Result<ValueReference> {
    match parser.parse_expression(child)? {
        Expression::ValueReference(r) => Ok(r),
        _ => Err(Error::malformed(
            element.local_name(),
            "first operand must be a ValueReference",
        )),
    }
}

/// Geometry operand: a GML element, or a Literal wrapping one.
fn geometry_operand(element: &Element, parser: &Parser<'_>, child: &Element) -> Result<Geometry> {
    if is_gml(child.namespace()) {
        return parse_geometry(child);
    }
    match parser.parse_expression(child)? {
        Expression::Literal(lit) => match lit.value() {
            LiteralValue::Geometry(g) => Ok(g.clone()),
            LiteralValue::Scalar(_) => Err(Error::malformed(
                element.local_name(),
                "literal operand must contain a GML geometry",
            )),
        },
        _ => Err(Error::Unsupported(format!(
            "<fes:{}> between two property references or function results",
            element.local_name()
        ))),
    }
}

impl SpatialOperator {
    pub fn bbox_from_element(element: &Element, parser: &Parser<'_>) -> Result<Node> {
        let (reference, geometry_el) = match element.children() {
            [geometry] => (None, geometry),
            [reference, geometry] => (
                Some(property_reference(element, parser, reference)?),
                geometry,
            ),
            _ => {
                return Err(Error::malformed(
                    element.local_name(),
                    "expected an optional ValueReference and an envelope",
                ))
            }
        };

        let envelope = match geometry_operand(element, parser, geometry_el)? {
            Geometry::Envelope(envelope) => envelope,
            Geometry::Gml { .. } => {
                return Err(Error::malformed(
                    element.local_name(),
                    "BBOX requires a gml:Envelope",
                ))
            }
        };

        Ok(node(Self::BBox {
            reference,
            envelope,
        }))
    }

    pub fn binary_from_element(element: &Element, parser: &Parser<'_>) -> Result<Node> {
        let op = BINARY_TAGS
            .iter()
            .find(|(tag, _)| *tag == element.local_name())
            .map(|(_, op)| *op)
            .ok_or_else(|| Error::UnknownOperator(element.name().to_string()))?;

        let [reference, geometry] = element.children() else {
            return Err(Error::malformed(
                element.local_name(),
                "expected a ValueReference and a geometry",
            ));
        };

        Ok(node(Self::Binary {
            op,
            reference: property_reference(element, parser, reference)?,
            geometry: geometry_operand(element, parser, geometry)?,
        }))
    }

    pub fn distance_from_element(element: &Element, parser: &Parser<'_>) -> Result<Node> {
        let op = match element.local_name() {
            "DWithin" => SpatialOp::DWithin,
            "Beyond" => SpatialOp::Beyond,
            _ => return Err(Error::UnknownOperator(element.name().to_string())),
        };

        let [reference, geometry, distance] = element.children() else {
            return Err(Error::malformed(
                element.local_name(),
                "expected a ValueReference, a geometry and a Distance",
            ));
        };

        Ok(node(Self::Distance {
            op,
            reference: property_reference(element, parser, reference)?,
            geometry: geometry_operand(element, parser, geometry)?,
            distance: parse_distance(distance)?,
        }))
    }

    pub fn build_predicate(&self, ctx: &Compiler<'_>) -> Result<Predicate> {
        match self {
            Self::BBox {
                reference,
                envelope,
            } => {
                let field = match reference {
                    Some(r) => ctx.mapping().resolve(r)?,
                    None => ctx.mapping().default_geometry()?,
                };
                Ok(Predicate::Spatial {
                    field: field.to_string(),
                    op: SpatialOp::BBox,
                    geometry: Geometry::Envelope(envelope.clone()),
                    distance: None,
                })
            }
            Self::Binary {
                op,
                reference,
                geometry,
            } => Ok(Predicate::Spatial {
                field: ctx.mapping().resolve(reference)?.to_string(),
                op: *op,
                geometry: geometry.clone(),
                distance: None,
            }),
            Self::Distance {
                op,
                reference,
                geometry,
                distance,
            } => Ok(Predicate::Spatial {
                field: ctx.mapping().resolve(reference)?.to_string(),
                op: *op,
                geometry: geometry.clone(),
                distance: Some(distance.clone()),
            }),
        }
    }
}

fn parse_distance(element: &Element) -> Result<Distance> {
    if !element.is(FES20, "Distance") {
        return Err(Error::malformed(
            element.local_name(),
            "expected <fes:Distance>",
        ));
    }
    let uom = element.require_attribute("uom")?.to_string();
    let raw = element.text().unwrap_or("");
    let value = raw
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| Error::MalformedValue {
            value: raw.to_string(),
            expected: "a non-negative distance",
        })?;
    Ok(Distance { value, uom })
}

fn parse_coordinates(element: &Element) -> Result<Vec<f64>> {
    let raw = element.text().unwrap_or("");
    let coords = raw
        .split_whitespace()
        .map(|c| c.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<_>>>()
        .filter(|c| c.len() >= 2)
        .ok_or_else(|| Error::MalformedValue {
            value: raw.to_string(),
            expected: "a coordinate tuple",
        })?;
    Ok(coords)
}

fn parse_envelope(element: &Element) -> Result<Envelope> {
    let corner = |name: &str| {
        element
            .children()
            .iter()
            .find(|c| is_gml(c.namespace()) && c.local_name() == name)
            .ok_or_else(|| Error::malformed("Envelope", format!("missing gml:{}", name)))
            .and_then(parse_coordinates)
    };

    let lower = corner("lowerCorner")?;
    let upper = corner("upperCorner")?;
    if lower.len() != upper.len() {
        return Err(Error::malformed(
            "Envelope",
            "lowerCorner and upperCorner differ in dimension",
        ));
    }

    Ok(Envelope {
        lower,
        upper,
        srs_name: element.attribute("srsName").map(str::to_string),
    })
}

/// Decode a GML geometry element.
pub(crate) fn parse_geometry(element: &Element) -> Result<Geometry> {
    if !is_gml(element.namespace()) {
        return Err(Error::malformed(
            element.local_name(),
            "expected a GML geometry",
        ));
    }

    if element.local_name() == "Envelope" {
        return parse_envelope(element).map(Geometry::Envelope);
    }

    Ok(Geometry::Gml {
        srs_name: element.attribute("srsName").map(str::to_string),
        xml: element.to_xml()?,
    })
}
