//! Backend-agnostic predicate tree
//!
//! This is the output of compilation. It names backend fields (never XML
//! property paths) and carries typed values, so a query executor can render it
//! to SQL, an ORM filter, or evaluate it in memory without knowing anything
//! about Filter Encoding.

use crate::value::Value;
use serde::Serialize;

/// Boolean query condition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Matches everything (`true`) or nothing (`false`).
    Constant { value: bool },

    And { predicates: Vec<Predicate> },

    Or { predicates: Vec<Predicate> },

    Not { predicate: Box<Predicate> },

    Compare {
        lhs: Operand,
        op: CompareOp,
        rhs: Operand,
        match_case: bool,
    },

    /// `pattern` uses SQL `LIKE` syntax: `%` any run, `_` one character, `\` escapes.
    Like {
        lhs: Operand,
        pattern: String,
        match_case: bool,
    },

    IsNull { lhs: Operand },

    IsNil {
        lhs: Operand,
        nil_reason: Option<String>,
    },

    /// Inclusive on both ends.
    Between {
        lhs: Operand,
        lower: Operand,
        upper: Operand,
    },

    Spatial {
        field: String,
        op: SpatialOp,
        geometry: Geometry,
        distance: Option<Distance>,
    },
}

impl Predicate {
    pub fn constant(value: bool) -> Self {
        Self::Constant { value }
    }

    pub fn equals(field: impl Into<String>, value: Value) -> Self {
        Self::Compare {
            lhs: Operand::Field(field.into()),
            op: CompareOp::Equal,
            rhs: Operand::Value(value),
            match_case: true,
        }
    }

    pub fn negate(predicate: Predicate) -> Self {
        Self::Not {
            predicate: Box::new(predicate),
        }
    }

    /// Disjunction that collapses a single member into itself.
    pub fn any_of(mut predicates: Vec<Predicate>) -> Self {
        match predicates.len() {
            0 => Self::constant(false),
            1 => predicates.remove(0),
            _ => Self::Or { predicates },
        }
    }
}

/// Value-producing side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Operand {
    Field(String),
    Value(Value),
    Function { name: String, args: Vec<Operand> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialOp {
    BBox,
    Equals,
    Disjoint,
    Touches,
    Within,
    Overlaps,
    Crosses,
    Intersects,
    Contains,
    DWithin,
    Beyond,
}

/// Geometry operand of a spatial predicate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    Envelope(Envelope),
    /// Any other GML geometry, passed through as serialized GML.
    Gml {
        srs_name: Option<String>,
        xml: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub srs_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distance {
    pub value: f64,
    pub uom: String,
}
