//! Unit tests for registry dispatch and filter parsing

use meridian_fes::ast::{ComparisonOperator, Operator, ResourceId};
use meridian_fes::namespaces::FES20;
use meridian_fes::{parse_filter_str, Element, Error, Parser, Registry, RegistryBuilder};

mod test_support;

#[test]
fn test_unregistered_tag() {
    let body = format!(
        "<fes:PropertyIsSimilarTo>{}</fes:PropertyIsSimilarTo>",
        test_support::value_ref("lanes")
    );
    assert_eq!(
        test_support::parse(&body),
        Err(Error::UnknownOperator(format!(
            "{{{}}}PropertyIsSimilarTo",
            FES20
        )))
    );
}

#[test]
fn test_tag_in_wrong_namespace() {
    // right local name, wrong namespace
    let xml = r#"<fes:Filter xmlns:fes="http://www.opengis.net/fes/2.0" xmlns:x="urn:x"><x:PropertyIsNull><fes:ValueReference>a</fes:ValueReference></x:PropertyIsNull></fes:Filter>"#;
    assert_eq!(
        parse_filter_str(xml),
        Err(Error::UnknownOperator("{urn:x}PropertyIsNull".to_string()))
    );

    // no namespace at all
    let bare = "<Filter><PropertyIsNull><ValueReference>a</ValueReference></PropertyIsNull></Filter>";
    assert_eq!(
        parse_filter_str(bare),
        Err(Error::UnknownOperator("Filter".to_string()))
    );
}

#[test]
fn test_resource_id_requires_fes_namespace() {
    let xml = r#"<fes:Filter xmlns:fes="http://www.opengis.net/fes/2.0"><ResourceId rid="Roads.1"/></fes:Filter>"#;
    assert_eq!(
        parse_filter_str(xml),
        Err(Error::UnknownOperator("ResourceId".to_string()))
    );
}

#[test]
fn test_legacy_filter_root() {
    let xml = r#"<ogc:Filter xmlns:ogc="http://www.opengis.net/ogc"><ogc:FeatureId fid="Roads.1"/></ogc:Filter>"#;
    let filter = parse_filter_str(xml).unwrap();
    assert!(matches!(filter.predicate, Operator::Id(_)));
}

#[test]
fn test_empty_filter() {
    assert!(matches!(
        test_support::parse(""),
        Err(Error::MalformedFilter { .. })
    ));
}

#[test]
fn test_two_operators_at_root() {
    let null = format!(
        "<fes:PropertyIsNull>{}</fes:PropertyIsNull>",
        test_support::value_ref("lanes")
    );
    let body = format!("{}{}", null, null);
    assert!(matches!(
        test_support::parse(&body),
        Err(Error::MalformedFilter { .. })
    ));
}

#[test]
fn test_expression_at_root() {
    match test_support::parse(&test_support::literal("1")) {
        Err(Error::MalformedFilter { message, .. }) => {
            assert!(message.contains("expected an operator"), "{}", message)
        }
        other => panic!("expected MalformedFilter, got {:?}", other),
    }
}

#[test]
fn test_invalid_xml() {
    assert!(matches!(
        parse_filter_str("<fes:Filter"),
        Err(Error::Xml(_))
    ));
}

#[test]
fn test_value_reference_namespace() {
    let body = format!(
        "<fes:PropertyIsNull>{}</fes:PropertyIsNull>",
        test_support::value_ref("app:name/app:first")
    );
    let filter = test_support::parse(&body).unwrap();

    let Operator::Comparison(ComparisonOperator::Null(null)) = &filter.predicate else {
        panic!("expected PropertyIsNull, got {:?}", filter.predicate);
    };
    let reference = null.expression.as_value_reference().unwrap();
    assert_eq!(reference.xpath(), "app:name/app:first");
    assert_eq!(reference.local_path(), "name/first");
    assert_eq!(reference.namespace(), Some("http://example.com/app"));
}

#[test]
fn test_empty_value_reference() {
    let body = "<fes:PropertyIsNull><fes:ValueReference/></fes:PropertyIsNull>";
    assert!(matches!(
        test_support::parse(body),
        Err(Error::MalformedFilter { .. })
    ));
}

#[test]
fn test_custom_registry_limits_vocabulary() {
    let registry = RegistryBuilder::default()
        .register(FES20, "ResourceId", ResourceId::from_element)
        .build();
    assert_eq!(registry.len(), 1);
    let parser = Parser::new(&registry);

    let ids = Element::parse(&test_support::filter_xml(
        r#"<fes:ResourceId rid="Roads.1"/>"#,
    ))
    .unwrap();
    assert!(parser.parse_filter(&ids).is_ok());

    let comparison = Element::parse(&test_support::filter_xml(&format!(
        "<fes:PropertyIsNull>{}</fes:PropertyIsNull>",
        test_support::value_ref("lanes")
    )))
    .unwrap();
    assert!(matches!(
        parser.parse_filter(&comparison),
        Err(Error::UnknownOperator(_))
    ));
}

#[test]
fn test_global_registry_vocabulary() {
    let registry = Registry::global();
    for tag in [
        "And",
        "Or",
        "Not",
        "PropertyIsEqualTo",
        "PropertyIsLike",
        "PropertyIsBetween",
        "BBOX",
        "DWithin",
        "During",
        "ResourceId",
        "ValueReference",
        "Literal",
        "Function",
    ] {
        assert!(registry.contains(FES20, tag), "missing {}", tag);
    }
    assert!(!registry.contains(FES20, "FeatureId"));
    assert!(registry.contains("http://www.opengis.net/ogc", "FeatureId"));
}

#[test]
fn test_parsing_is_deterministic() {
    let body = format!(
        "<fes:And>{}{}</fes:And>",
        format_args!(
            "<fes:PropertyIsNull>{}</fes:PropertyIsNull>",
            test_support::value_ref("lanes")
        ),
        format_args!(
            "<fes:PropertyIsNotEqualTo>{}{}</fes:PropertyIsNotEqualTo>",
            test_support::value_ref("width"),
            test_support::literal("2.5")
        )
    );
    assert_eq!(
        test_support::parse(&body).unwrap(),
        test_support::parse(&body).unwrap()
    );
}

#[test]
fn test_deeply_nested_document_is_rejected() {
    let leaf = format!(
        "<fes:PropertyIsNull>{}</fes:PropertyIsNull>",
        test_support::value_ref("lanes")
    );
    let body = format!(
        "{}{}{}",
        "<fes:Not>".repeat(10_000),
        leaf,
        "</fes:Not>".repeat(10_000)
    );

    match test_support::parse(&body) {
        Err(Error::MalformedFilter { message, .. }) => {
            assert!(message.contains("nesting"), "{}", message)
        }
        other => panic!("expected nesting error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_operator_nesting_limit_applies_below_document_limit() {
    let leaf = format!(
        "<fes:PropertyIsNull>{}</fes:PropertyIsNull>",
        test_support::value_ref("lanes")
    );
    let body = format!("{}{}{}", "<fes:Not>".repeat(100), leaf, "</fes:Not>".repeat(100));

    match test_support::parse(&body) {
        Err(Error::MalformedFilter { element, message }) => {
            assert_eq!(element, "Not");
            assert!(message.contains("filter nesting exceeds 64"), "{}", message);
        }
        other => panic!("expected nesting error, got {:?}", other.map(|_| ())),
    }
}
