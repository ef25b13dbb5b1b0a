//! Query compiler: AST → backend-agnostic [`Predicate`]
//!
//! Compilation is a pure walk over an immutable tree. It consults the
//! [`FieldMapping`] to turn property paths into backend fields and never
//! performs I/O. Any error aborts the whole compilation; there are no
//! partial results.

use crate::ast::expressions::ValueReference;
use crate::ast::{Filter, Operator};
use crate::error::{Error, Result};
use crate::predicate::Predicate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_primary_key() -> String {
    "id".to_string()
}

/// Mapping of one feature type onto backend fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Feature type name as used in identifiers (`Roads` in `Roads.7`)
    pub type_name: String,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    /// Field used by a `BBOX` without a property reference
    #[serde(default)]
    pub geometry_field: Option<String>,
    /// Property path → backend field. Keys may be written as in the filter
    /// (`app:name`), in Clark notation (`{http://...}name`) or unprefixed.
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

impl FieldMapping {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            primary_key: default_primary_key(),
            geometry_field: None,
            fields: HashMap::new(),
        }
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    pub fn with_geometry_field(mut self, field: impl Into<String>) -> Self {
        self.geometry_field = Some(field.into());
        self
    }

    pub fn with_field(mut self, property: impl Into<String>, field: impl Into<String>) -> Self {
        self.fields.insert(property.into(), field.into());
        self
    }

    /// Resolve a property reference. Tried in order: the path as written,
    /// the path qualified with its resolved namespace, the path with
    /// namespace prefixes stripped.
    pub fn resolve(&self, reference: &ValueReference) -> Result<&str> {
        self.fields
            .get(reference.xpath())
            .or_else(|| {
                reference
                    .qualified_path()
                    .and_then(|path| self.fields.get(&path))
            })
            .or_else(|| self.fields.get(reference.local_path()))
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownField(reference.xpath().to_string()))
    }

    pub fn default_geometry(&self) -> Result<&str> {
        self.geometry_field.as_deref().ok_or_else(|| {
            Error::UnknownField(format!("default geometry of '{}'", self.type_name))
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct CompileOptions {
    /// If `true`, identifiers addressing another feature type are an error
    /// instead of being skipped.
    pub strict_type_names: bool,
}

/// Compilation context for one feature type
pub struct Compiler<'m> {
    mapping: &'m FieldMapping,
    options: CompileOptions,
}

impl<'m> Compiler<'m> {
    pub fn new(mapping: &'m FieldMapping) -> Self {
        Self {
            mapping,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn mapping(&self) -> &'m FieldMapping {
        self.mapping
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn compile(&self, filter: &Filter) -> Result<Predicate> {
        tracing::debug!(feature_type = %self.mapping.type_name, "Compiling filter");
        self.compile_operator(&filter.predicate)
    }

    pub fn compile_operator(&self, operator: &Operator) -> Result<Predicate> {
        match operator {
            Operator::Logical(op) => op.build_predicate(self),
            Operator::Comparison(op) => op.build_predicate(self),
            Operator::Spatial(op) => op.build_predicate(self),
            Operator::Temporal(op) => op.build_predicate(),
            Operator::Id(op) => op.build_predicate(self),
        }
    }
}

/// Compile a filter against a field mapping with default options.
pub fn compile(filter: &Filter, mapping: &FieldMapping) -> Result<Predicate> {
    Compiler::new(mapping).compile(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_exact_path() {
        let mapping = FieldMapping::new("Roads")
            .with_field("app:name", "exact_name")
            .with_field("name", "local_name");

        assert_eq!(
            mapping.resolve(&ValueReference::new("app:name")).unwrap(),
            "exact_name"
        );
        assert_eq!(
            mapping.resolve(&ValueReference::new("other:name")).unwrap(),
            "local_name"
        );
        assert_eq!(
            mapping.resolve(&ValueReference::new("width")),
            Err(Error::UnknownField("width".to_string()))
        );
    }

    #[test]
    fn test_mapping_from_json_defaults() {
        let mapping: FieldMapping =
            serde_json::from_str(r#"{"type_name": "Roads", "fields": {"name": "road_name"}}"#)
                .unwrap();
        assert_eq!(mapping.primary_key, "id");
        assert_eq!(mapping.geometry_field, None);
        assert_eq!(mapping.fields.get("name").map(String::as_str), Some("road_name"));
    }
}
