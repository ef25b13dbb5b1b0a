//! Value expressions: `ValueReference`, `Literal`, `Function`

use super::spatial::parse_geometry;
use super::Node;
use crate::compiler::Compiler;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::functions;
use crate::namespaces::{is_gml, FES20};
use crate::parser::Parser;
use crate::predicate::{Geometry, Operand};
use crate::registry::RegistryBuilder;
use crate::value::{auto_cast, Value};

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register(FES20, "ValueReference", ValueReference::from_element)
        .register(FES20, "Literal", Literal::from_element)
        .register(FES20, "Function", Function::from_element)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    ValueReference(ValueReference),
    Literal(Literal),
    Function(Function),
}

impl Expression {
    pub fn as_value_reference(&self) -> Option<&ValueReference> {
        match self {
            Self::ValueReference(r) => Some(r),
            _ => None,
        }
    }

    pub fn build_operand(&self, ctx: &Compiler<'_>) -> Result<Operand> {
        match self {
            Self::ValueReference(r) => r.build_operand(ctx),
            Self::Literal(l) => l.build_operand(),
            Self::Function(f) => f.build_operand(ctx),
        }
    }
}

/// `<fes:ValueReference>`: a property path such as `app:name` or `address/street`
#[derive(Debug, Clone, PartialEq)]
pub struct ValueReference {
    xpath: String,
    /// Path with namespace prefixes removed from every step
    local_path: String,
    /// Namespace of the first step's prefix, when it could be resolved
    namespace: Option<String>,
}

impl ValueReference {
    pub fn new(xpath: impl Into<String>) -> Self {
        let xpath = xpath.into();
        let local_path = xpath
            .split('/')
            .map(|step| step.rsplit_once(':').map_or(step, |(_, local)| local))
            .collect::<Vec<_>>()
            .join("/");
        Self {
            xpath,
            local_path,
            namespace: None,
        }
    }

    pub fn from_element(element: &Element, _parser: &Parser<'_>) -> Result<Node> {
        let xpath = element
            .text()
            .ok_or_else(|| Error::malformed(element.local_name(), "empty property reference"))?;

        let mut node = Self::new(xpath);
        if let Some((prefix, _)) = xpath.split('/').next().and_then(|s| s.split_once(':')) {
            node.namespace = element.resolve_prefix(Some(prefix)).map(str::to_string);
        }
        Ok(Node::Expression(Expression::ValueReference(node)))
    }

    pub fn xpath(&self) -> &str {
        &self.xpath
    }

    pub fn local_path(&self) -> &str {
        &self.local_path
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Local path in Clark notation (`{uri}name/street`), when the first
    /// step's prefix was resolved.
    pub fn qualified_path(&self) -> Option<String> {
        self.namespace
            .as_ref()
            .map(|ns| format!("{{{}}}{}", ns, self.local_path))
    }

    pub fn build_operand(&self, ctx: &Compiler<'_>) -> Result<Operand> {
        Ok(Operand::Field(ctx.mapping().resolve(self)?.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Scalar(Value),
    Geometry(Geometry),
}

/// `<fes:Literal>`: text (auto-cast) or a single GML geometry child
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    value: LiteralValue,
    /// Text as written, before casting
    raw: Option<String>,
}

impl Literal {
    pub fn new(value: Value) -> Self {
        Self {
            raw: Some(value.to_string()),
            value: LiteralValue::Scalar(value),
        }
    }

    pub fn from_element(element: &Element, _parser: &Parser<'_>) -> Result<Node> {
        let value = match element.children() {
            [] => LiteralValue::Scalar(auto_cast(element.text().unwrap_or(""))),
            [child] if is_gml(child.namespace()) => LiteralValue::Geometry(parse_geometry(child)?),
            _ => {
                return Err(Error::malformed(
                    element.local_name(),
                    "a literal holds text or a single GML geometry",
                ))
            }
        };
        let raw = match value {
            LiteralValue::Scalar(_) => Some(element.text().unwrap_or("").to_string()),
            LiteralValue::Geometry(_) => None,
        };
        Ok(Node::Expression(Expression::Literal(Self { value, raw })))
    }

    pub fn value(&self) -> &LiteralValue {
        &self.value
    }

    /// Uncast text of a scalar literal.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match &self.value {
            LiteralValue::Scalar(v) => Some(v),
            LiteralValue::Geometry(_) => None,
        }
    }

    pub fn build_operand(&self) -> Result<Operand> {
        match &self.value {
            LiteralValue::Scalar(v) => Ok(Operand::Value(v.clone())),
            LiteralValue::Geometry(_) => Err(Error::malformed(
                "Literal",
                "geometry literal used where a scalar value is expected",
            )),
        }
    }
}

/// `<fes:Function name="...">` with expression arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    name: String,
    args: Vec<Expression>,
}

impl Function {
    pub fn from_element(element: &Element, parser: &Parser<'_>) -> Result<Node> {
        let name = element.require_attribute("name")?.to_string();
        let args = element
            .children()
            .iter()
            .map(|child| parser.parse_expression(child))
            .collect::<Result<Vec<_>>>()?;
        Ok(Node::Expression(Expression::Function(Self { name, args })))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Expression] {
        &self.args
    }

    pub fn build_operand(&self, ctx: &Compiler<'_>) -> Result<Operand> {
        let meta =
            functions::lookup(&self.name).ok_or_else(|| Error::UnknownFunction(self.name.clone()))?;

        if !meta.accepts(self.args.len()) {
            return Err(Error::malformed(
                "Function",
                format!(
                    "{}() takes {} argument(s), got {}",
                    self.name,
                    match meta.max_args {
                        Some(max) if max == meta.min_args => max.to_string(),
                        Some(max) => format!("{} to {}", meta.min_args, max),
                        None => format!("at least {}", meta.min_args),
                    },
                    self.args.len()
                ),
            ));
        }

        let args = self
            .args
            .iter()
            .map(|arg| arg.build_operand(ctx))
            .collect::<Result<Vec<_>>>()?;

        Ok(Operand::Function {
            name: meta.backend_name.to_string(),
            args,
        })
    }
}
