//! Filter Encoding 2.0 engine - XML filters to backend-agnostic predicates
//!
//! This crate implements the query-building core of an OGC Filter Encoding
//! (FES) 2.0 service, as used by WFS `GetFeature` requests:
//!
//! ```text
//! XML text / Element tree
//!      |
//!   Parser (registry lookup per tag) -> AST (Filter)
//!      |
//!   Compiler (FieldMapping) -> Predicate
//!      |
//!   external query executor
//! ```
//!
//! # Example
//!
//! ```rust
//! use meridian_fes::{compile, parse_filter_str, FieldMapping, Predicate};
//!
//! let filter = parse_filter_str(
//!     r#"<fes:Filter xmlns:fes="http://www.opengis.net/fes/2.0">
//!          <fes:ResourceId rid="Roads.7"/>
//!        </fes:Filter>"#,
//! )?;
//! let predicate = compile(&filter, &FieldMapping::new("Roads"))?;
//! assert!(matches!(predicate, Predicate::Compare { .. }));
//! # Ok::<(), meridian_fes::Error>(())
//! ```

pub mod ast;
pub mod compiler;
pub mod element;
pub mod error;
pub mod functions;
pub mod namespaces;
pub mod parser;
pub mod predicate;
pub mod registry;
mod temporal_parse;
pub mod value;

// Re-export main types
pub use ast::{Filter, Node, Operator};
pub use compiler::{compile, CompileOptions, Compiler, FieldMapping};
pub use element::{Element, QName};
pub use error::{Error, Result};
pub use parser::{parse_filter_str, Parser};
pub use predicate::{CompareOp, Geometry, Operand, Predicate, SpatialOp};
pub use registry::{Registry, RegistryBuilder};
pub use temporal_parse::parse_timestamp;
pub use value::{auto_cast, Value};
