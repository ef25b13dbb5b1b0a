//! Function registry for `<fes:Function>` calls
//!
//! Maps Filter Encoding function names onto the neutral names used in
//! compiled predicates, with arity bounds. Uses a compile-time perfect hash
//! map (phf), so lookups never allocate.

use phf::phf_map;

/// Function metadata
#[derive(Debug, Clone, Copy)]
pub struct FunctionMetadata {
    pub name: &'static str,
    /// Name emitted in `Operand::Function`
    pub backend_name: &'static str,
    pub min_args: usize,
    pub max_args: Option<usize>, // None = unbounded
}

static FUNCTIONS_BY_NAME: phf::Map<&'static str, FunctionMetadata> = phf_map! {
    // String functions
    "strToLowerCase" => FunctionMetadata { name: "strToLowerCase", backend_name: "lower", min_args: 1, max_args: Some(1) },
    "strToUpperCase" => FunctionMetadata { name: "strToUpperCase", backend_name: "upper", min_args: 1, max_args: Some(1) },
    "strLength" => FunctionMetadata { name: "strLength", backend_name: "length", min_args: 1, max_args: Some(1) },
    "strTrim" => FunctionMetadata { name: "strTrim", backend_name: "trim", min_args: 1, max_args: Some(1) },
    "strConcat" => FunctionMetadata { name: "strConcat", backend_name: "concat", min_args: 2, max_args: None },
    "strSubstring" => FunctionMetadata { name: "strSubstring", backend_name: "substring", min_args: 3, max_args: Some(3) },
    "strIndexOf" => FunctionMetadata { name: "strIndexOf", backend_name: "position", min_args: 2, max_args: Some(2) },
    "strReplace" => FunctionMetadata { name: "strReplace", backend_name: "replace", min_args: 3, max_args: Some(3) },

    // Math functions
    "abs" => FunctionMetadata { name: "abs", backend_name: "abs", min_args: 1, max_args: Some(1) },
    "ceil" => FunctionMetadata { name: "ceil", backend_name: "ceil", min_args: 1, max_args: Some(1) },
    "floor" => FunctionMetadata { name: "floor", backend_name: "floor", min_args: 1, max_args: Some(1) },
    "round" => FunctionMetadata { name: "round", backend_name: "round", min_args: 1, max_args: Some(2) },
    "sqrt" => FunctionMetadata { name: "sqrt", backend_name: "sqrt", min_args: 1, max_args: Some(1) },

    // Geometry functions
    "area" => FunctionMetadata { name: "area", backend_name: "area", min_args: 1, max_args: Some(1) },
    "geomLength" => FunctionMetadata { name: "geomLength", backend_name: "st_length", min_args: 1, max_args: Some(1) },
    "isValid" => FunctionMetadata { name: "isValid", backend_name: "st_isvalid", min_args: 1, max_args: Some(1) },
};

/// Look up a function by its Filter Encoding name (case-sensitive).
pub fn lookup(name: &str) -> Option<&'static FunctionMetadata> {
    FUNCTIONS_BY_NAME.get(name)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    FUNCTIONS_BY_NAME.keys().copied()
}

impl FunctionMetadata {
    pub fn accepts(&self, arg_count: usize) -> bool {
        arg_count >= self.min_args && self.max_args.map_or(true, |max| arg_count <= max)
    }
}
