//! Identifier nodes: `<fes:ResourceId>` and the legacy `<ogc:FeatureId>`
//!
//! An identifier selects a feature by its literal id rather than by attribute
//! values. The raw id has the form `TypeName.key`; it is split once from the
//! right when the node is built, so a malformed id never makes it into the
//! tree.
//!
//! FES 2.0 also lets a `ResourceId` address feature *versions* (`version`,
//! `startTime`, `endTime`). Those qualifiers are parsed and kept, but
//! compiling them is not supported and always fails loudly.

use super::{Node, Operator};
use crate::compiler::Compiler;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::namespaces::{FES20, OGC};
use crate::parser::Parser;
use crate::predicate::Predicate;
use crate::registry::RegistryBuilder;
use crate::temporal_parse::parse_timestamp;
use crate::value::{auto_cast, Value};
use chrono::{DateTime, FixedOffset};
use std::fmt;
use std::str::FromStr;

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register(FES20, "ResourceId", ResourceId::from_element)
        .register(OGC, "FeatureId", FeatureId::from_element)
}

/// Symbolic version selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionAction {
    First,
    Last,
    All,
    Next,
    Previous,
}

impl VersionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "FIRST",
            Self::Last => "LAST",
            Self::All => "ALL",
            Self::Next => "NEXT",
            Self::Previous => "PREVIOUS",
        }
    }
}

impl FromStr for VersionAction {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "FIRST" => Ok(Self::First),
            "LAST" => Ok(Self::Last),
            "ALL" => Ok(Self::All),
            "NEXT" => Ok(Self::Next),
            "PREVIOUS" => Ok(Self::Previous),
            _ => Err(()),
        }
    }
}

/// Value of the `version` attribute
#[derive(Debug, Clone, PartialEq)]
pub enum VersionSpec {
    Number(u64),
    Timestamp(DateTime<FixedOffset>),
    Action(VersionAction),
}

impl VersionSpec {
    /// Interpret a raw `version` attribute.
    ///
    /// The value goes through [`auto_cast`] first, so the priority is:
    /// 1. integer (must be >= 1)
    /// 2. action token (`FIRST`, `LAST`, `ALL`, `NEXT`, `PREVIOUS`, case-sensitive)
    /// 3. ISO-8601 timestamp
    ///
    /// Tokens and integers cannot overlap, but the order is part of the
    /// contract. Anything else is rejected instead of being kept as a string.
    pub fn parse(raw: &str) -> Result<Self> {
        const EXPECTED: &str = "version number, timestamp or FIRST|LAST|ALL|NEXT|PREVIOUS";
        let malformed = |expected: &'static str| Error::MalformedValue {
            value: raw.to_string(),
            expected,
        };

        match auto_cast(raw) {
            Value::Integer(n) if n >= 1 => Ok(Self::Number(n as u64)),
            Value::Integer(_) => Err(malformed("a positive version number")),
            Value::String(s) => {
                if let Ok(action) = s.parse::<VersionAction>() {
                    return Ok(Self::Action(action));
                }
                parse_timestamp(&s)
                    .map(Self::Timestamp)
                    .map_err(|_| malformed(EXPECTED))
            }
            _ => Err(malformed(EXPECTED)),
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Timestamp(ts) => f.write_str(&ts.to_rfc3339()),
            Self::Action(a) => f.write_str(a.as_str()),
        }
    }
}

/// Split `TypeName.key` once from the right.
fn split_rid(element: &str, raw: &str) -> Result<(String, String)> {
    match raw.rsplit_once('.') {
        Some((type_name, id)) if !type_name.is_empty() && !id.is_empty() => {
            Ok((type_name.to_string(), id.to_string()))
        }
        Some(_) => Err(Error::malformed(
            element,
            format!("identifier '{}' has an empty type name or key", raw),
        )),
        None => Err(Error::malformed(
            element,
            format!("identifier '{}' is not of the form 'TypeName.key'", raw),
        )),
    }
}

/// Treats empty attribute values as absent.
fn optional_attribute<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element.attribute(name).filter(|v| !v.is_empty())
}

/// The `<fes:ResourceId>` element
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceId {
    rid: String,
    type_name: String,
    id: String,
    version: Option<VersionSpec>,
    start_time: Option<DateTime<FixedOffset>>,
    end_time: Option<DateTime<FixedOffset>>,
}

impl ResourceId {
    pub fn new(rid: impl Into<String>) -> Result<Self> {
        let rid = rid.into();
        let (type_name, id) = split_rid("ResourceId", &rid)?;
        Ok(Self {
            rid,
            type_name,
            id,
            version: None,
            start_time: None,
            end_time: None,
        })
    }

    pub fn with_version(mut self, version: VersionSpec) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_start_time(mut self, start_time: DateTime<FixedOffset>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_end_time(mut self, end_time: DateTime<FixedOffset>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn from_element(element: &Element, _parser: &Parser<'_>) -> Result<Node> {
        let mut node = Self::new(element.require_attribute("rid")?)?;

        if let Some(version) = optional_attribute(element, "version") {
            node.version = Some(VersionSpec::parse(version)?);
        }
        if let Some(start) = optional_attribute(element, "startTime") {
            node.start_time = Some(parse_timestamp(start)?);
        }
        if let Some(end) = optional_attribute(element, "endTime") {
            node.end_time = Some(parse_timestamp(end)?);
        }

        Ok(Node::Identifier(Identifier::ResourceId(node)))
    }

    pub fn rid(&self) -> &str {
        &self.rid
    }

    /// Feature type this identifier addresses.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Primary key part of the identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> Option<&VersionSpec> {
        self.version.as_ref()
    }

    pub fn start_time(&self) -> Option<&DateTime<FixedOffset>> {
        self.start_time.as_ref()
    }

    pub fn end_time(&self) -> Option<&DateTime<FixedOffset>> {
        self.end_time.as_ref()
    }

    pub fn is_versioned(&self) -> bool {
        !self.versioning_attributes().is_empty()
    }

    fn versioning_attributes(&self) -> Vec<&'static str> {
        let mut set = Vec::new();
        if self.version.is_some() {
            set.push("version");
        }
        if self.start_time.is_some() {
            set.push("startTime");
        }
        if self.end_time.is_some() {
            set.push("endTime");
        }
        set
    }

    /// Primary-key equality. The type name is not part of the predicate;
    /// the enclosing [`IdOperator`] checks it against the queried type.
    pub fn build_predicate(&self, ctx: &Compiler<'_>) -> Result<Predicate> {
        let versioning = self.versioning_attributes();
        if !versioning.is_empty() {
            return Err(Error::Unsupported(format!(
                "<fes:ResourceId> {} attribute(s) on '{}'",
                versioning.join("/"),
                self.rid
            )));
        }

        Ok(Predicate::equals(
            ctx.mapping().primary_key.as_str(),
            Value::string(self.id.as_str()),
        ))
    }
}

/// The FES 1.1 `<ogc:FeatureId fid="...">` element
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureId {
    fid: String,
    type_name: String,
    id: String,
}

impl FeatureId {
    pub fn new(fid: impl Into<String>) -> Result<Self> {
        let fid = fid.into();
        let (type_name, id) = split_rid("FeatureId", &fid)?;
        Ok(Self { fid, type_name, id })
    }

    pub fn from_element(element: &Element, _parser: &Parser<'_>) -> Result<Node> {
        let node = Self::new(element.require_attribute("fid")?)?;
        Ok(Node::Identifier(Identifier::FeatureId(node)))
    }

    pub fn fid(&self) -> &str {
        &self.fid
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn build_predicate(&self, ctx: &Compiler<'_>) -> Result<Predicate> {
        Ok(Predicate::equals(
            ctx.mapping().primary_key.as_str(),
            Value::string(self.id.as_str()),
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    ResourceId(ResourceId),
    FeatureId(FeatureId),
}

impl Identifier {
    pub fn type_name(&self) -> &str {
        match self {
            Self::ResourceId(rid) => rid.type_name(),
            Self::FeatureId(fid) => fid.type_name(),
        }
    }

    /// Local name of the element this identifier was written as.
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::ResourceId(_) => "ResourceId",
            Self::FeatureId(_) => "FeatureId",
        }
    }

    pub fn raw_id(&self) -> &str {
        match self {
            Self::ResourceId(rid) => rid.rid(),
            Self::FeatureId(fid) => fid.fid(),
        }
    }

    pub fn build_predicate(&self, ctx: &Compiler<'_>) -> Result<Predicate> {
        match self {
            Self::ResourceId(rid) => rid.build_predicate(ctx),
            Self::FeatureId(fid) => fid.build_predicate(ctx),
        }
    }
}

/// A list of identifiers directly below the `Filter` root
#[derive(Debug, Clone, PartialEq)]
pub struct IdOperator {
    ids: Vec<Identifier>,
}

impl IdOperator {
    pub fn new(ids: Vec<Identifier>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &[Identifier] {
        &self.ids
    }

    /// Distinct type names, in document order.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for id in &self.ids {
            if !names.contains(&id.type_name()) {
                names.push(id.type_name());
            }
        }
        names
    }

    /// OR of the identifiers that address the queried feature type.
    ///
    /// Identifiers for other types are skipped, unless the compiler runs with
    /// `strict_type_names`, in which case they are an error. No matching
    /// identifier means no feature matches.
    pub fn build_predicate(&self, ctx: &Compiler<'_>) -> Result<Predicate> {
        let type_name = ctx.mapping().type_name.as_str();
        let mut predicates = Vec::with_capacity(self.ids.len());

        for id in &self.ids {
            if id.type_name() != type_name {
                if ctx.options().strict_type_names {
                    return Err(Error::malformed(
                        id.element_name(),
                        format!(
                            "identifier '{}' does not belong to feature type '{}'",
                            id.raw_id(),
                            type_name
                        ),
                    ));
                }
                tracing::debug!(
                    rid = id.raw_id(),
                    feature_type = type_name,
                    "Skipping identifier for another feature type"
                );
                continue;
            }
            predicates.push(id.build_predicate(ctx)?);
        }

        Ok(Predicate::any_of(predicates))
    }
}

impl From<IdOperator> for Operator {
    fn from(op: IdOperator) -> Self {
        Operator::Id(op)
    }
}
