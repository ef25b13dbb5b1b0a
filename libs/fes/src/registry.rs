//! Tag registry: qualified element name → node constructor
//!
//! A [`Registry`] is built once through [`RegistryBuilder`] and is read-only
//! afterwards, so it can be shared between threads without locking.
//! [`Registry::global`] holds the standard FES 2.0 table.

use crate::ast::{self, Node};
use crate::element::{Element, QName};
use crate::error::Result;
use crate::parser::Parser;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Builds an AST node from an element, parsing children through the parser.
pub type Constructor = fn(&Element, &Parser<'_>) -> Result<Node>;

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::fes20);

#[derive(Default)]
pub struct RegistryBuilder {
    constructors: HashMap<QName, Constructor>,
}

impl RegistryBuilder {
    /// Register (or replace) the constructor for `{namespace}local`.
    pub fn register(mut self, namespace: &str, local: &str, constructor: Constructor) -> Self {
        self.constructors
            .insert(QName::ns(namespace, local), constructor);
        self
    }

    /// Add every standard Filter Encoding 2.0 node (and the legacy `ogc:FeatureId`).
    pub fn with_fes20(self) -> Self {
        let builder = ast::logical::register(self);
        let builder = ast::comparison::register(builder);
        let builder = ast::spatial::register(builder);
        let builder = ast::temporal::register(builder);
        let builder = ast::expressions::register(builder);
        ast::identifiers::register(builder)
    }

    pub fn build(self) -> Registry {
        Registry {
            constructors: self.constructors,
        }
    }
}

pub struct Registry {
    constructors: HashMap<QName, Constructor>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<String> = self.constructors.keys().map(QName::to_string).collect();
        tags.sort();
        f.debug_struct("Registry").field("tags", &tags).finish()
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Standard Filter Encoding 2.0 table.
    pub fn fes20() -> Self {
        Self::builder().with_fes20().build()
    }

    /// Process-wide standard table, built on first use.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, name: &QName) -> Option<Constructor> {
        self.constructors.get(name).copied()
    }

    pub fn contains(&self, namespace: &str, local: &str) -> bool {
        self.constructors
            .contains_key(&QName::ns(namespace, local))
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}
