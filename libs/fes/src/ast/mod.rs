//! Filter Encoding abstract syntax tree
//!
//! Every node is immutable once built and exclusively owned by its parent.
//! The node set is closed: the registry maps tags onto constructors that
//! produce one of the variants below, and the compiler matches on them
//! exhaustively.
//!
//! # Node kinds
//!
//! - [`Operator`]: boolean-valued (`And`, `PropertyIsEqualTo`, `BBOX`, ...)
//! - [`Expression`]: value-valued (`ValueReference`, `Literal`, `Function`)
//! - [`Identifier`]: `ResourceId` / legacy `FeatureId`, only valid directly
//!   below the `Filter` root where they form an [`IdOperator`]

pub mod comparison;
pub mod expressions;
pub mod identifiers;
pub mod logical;
pub mod spatial;
pub mod temporal;

pub use comparison::ComparisonOperator;
pub use expressions::{Expression, Function, Literal, ValueReference};
pub use identifiers::{
    FeatureId, IdOperator, Identifier, ResourceId, VersionAction, VersionSpec,
};
pub use logical::LogicalOperator;
pub use spatial::SpatialOperator;
pub use temporal::TemporalOperator;

/// Any node produced by a registered constructor
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Operator(Operator),
    Expression(Expression),
    Identifier(Identifier),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Operator(_) => "operator",
            Self::Expression(_) => "expression",
            Self::Identifier(_) => "identifier",
        }
    }
}

/// Boolean-valued filter node
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Logical(LogicalOperator),
    Comparison(ComparisonOperator),
    Spatial(SpatialOperator),
    Temporal(TemporalOperator),
    Id(IdOperator),
}

/// The `<fes:Filter>` root
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub predicate: Operator,
}
