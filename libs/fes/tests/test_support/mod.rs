#![allow(dead_code)]

use meridian_fes::{
    parse_filter_str, CompileOptions, Compiler, Error, FieldMapping, Filter, Predicate,
};

pub const FES: &str = "http://www.opengis.net/fes/2.0";
pub const GML: &str = "http://www.opengis.net/gml/3.2";

/// Wrap filter content in a `<fes:Filter>` root declaring the usual prefixes.
pub fn filter_xml(body: &str) -> String {
    format!(
        r#"<fes:Filter xmlns:fes="{}" xmlns:gml="{}" xmlns:ogc="http://www.opengis.net/ogc" xmlns:app="http://example.com/app">{}</fes:Filter>"#,
        FES, GML, body
    )
}

pub fn parse(body: &str) -> Result<Filter, Error> {
    parse_filter_str(&filter_xml(body))
}

/// Mapping for the `Roads` feature type used throughout the tests.
pub fn roads_mapping() -> FieldMapping {
    serde_json::from_str(include_str!("../data/roads_mapping.json"))
        .expect("roads_mapping.json is valid")
}

pub fn compile(body: &str) -> Result<Predicate, Error> {
    compile_with(body, CompileOptions::default())
}

pub fn compile_strict(body: &str) -> Result<Predicate, Error> {
    compile_with(
        body,
        CompileOptions {
            strict_type_names: true,
        },
    )
}

fn compile_with(body: &str, options: CompileOptions) -> Result<Predicate, Error> {
    let filter = parse(body)?;
    let mapping = roads_mapping();
    Compiler::new(&mapping).with_options(options).compile(&filter)
}

pub fn value_ref(path: &str) -> String {
    format!("<fes:ValueReference>{}</fes:ValueReference>", path)
}

pub fn literal(text: &str) -> String {
    format!("<fes:Literal>{}</fes:Literal>", text)
}
