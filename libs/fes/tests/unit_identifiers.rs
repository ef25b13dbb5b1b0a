//! Unit tests for ResourceId / FeatureId resolution

use meridian_fes::ast::{Identifier, Operator, ResourceId, VersionAction, VersionSpec};
use meridian_fes::{Error, Predicate, Value};

mod test_support;

fn pk_equals(id: &str) -> Predicate {
    Predicate::equals("road_id", Value::string(id))
}

#[test]
fn test_resource_id_compiles_to_primary_key_equality() {
    let predicate = test_support::compile(r#"<fes:ResourceId rid="Roads.123"/>"#).unwrap();
    assert_eq!(predicate, pk_equals("123"));
}

#[test]
fn test_key_is_not_auto_cast() {
    // Keys stay strings so that "007" keeps its leading zeros
    let predicate = test_support::compile(r#"<fes:ResourceId rid="Roads.007"/>"#).unwrap();
    assert_eq!(predicate, pk_equals("007"));
}

#[test]
fn test_rid_splits_on_last_dot() {
    let rid = ResourceId::new("app.Roads.42").unwrap();
    assert_eq!(rid.type_name(), "app.Roads");
    assert_eq!(rid.id(), "42");
    assert_eq!(rid.rid(), "app.Roads.42");
    assert!(!rid.is_versioned());
}

#[test]
fn test_rid_without_separator_is_malformed() {
    for body in [
        r#"<fes:ResourceId rid="Roads123"/>"#,
        r#"<fes:ResourceId rid=".123"/>"#,
        r#"<fes:ResourceId rid="Roads."/>"#,
    ] {
        match test_support::parse(body) {
            Err(Error::MalformedFilter { element, .. }) => assert_eq!(element, "ResourceId"),
            other => panic!("expected MalformedFilter for {}, got {:?}", body, other),
        }
    }
}

#[test]
fn test_missing_rid_attribute() {
    assert_eq!(
        test_support::parse("<fes:ResourceId/>"),
        Err(Error::MissingAttribute {
            element: "ResourceId".to_string(),
            attribute: "rid".to_string(),
        })
    );
}

#[test]
fn test_version_forms() {
    let cases = [
        ("3", VersionSpec::Number(3)),
        ("LAST", VersionSpec::Action(VersionAction::Last)),
        ("PREVIOUS", VersionSpec::Action(VersionAction::Previous)),
    ];
    for (raw, expected) in cases {
        assert_eq!(VersionSpec::parse(raw).unwrap(), expected);
    }

    match VersionSpec::parse("2024-03-01T12:00:00Z").unwrap() {
        VersionSpec::Timestamp(ts) => assert_eq!(ts.to_rfc3339(), "2024-03-01T12:00:00+00:00"),
        other => panic!("expected timestamp, got {:?}", other),
    }
}

#[test]
fn test_invalid_versions() {
    for raw in ["0", "-1", "last", "latest", "1.5", "2024-03-01"] {
        assert!(
            matches!(VersionSpec::parse(raw), Err(Error::MalformedValue { .. })),
            "version '{}' should be rejected",
            raw
        );
    }
}

#[test]
fn test_versioned_resource_id_parses_but_does_not_compile() {
    let body = r#"<fes:ResourceId rid="Roads.1" version="2"/>"#;

    let filter = test_support::parse(body).unwrap();
    match &filter.predicate {
        Operator::Id(op) => match &op.ids()[0] {
            Identifier::ResourceId(rid) => {
                assert_eq!(rid.version(), Some(&VersionSpec::Number(2)));
                assert!(rid.is_versioned());
            }
            other => panic!("expected ResourceId, got {:?}", other),
        },
        other => panic!("expected Id operator, got {:?}", other),
    }

    match test_support::compile(body) {
        Err(Error::Unsupported(message)) => {
            assert!(message.contains("version"));
            assert!(message.contains("Roads.1"));
        }
        other => panic!("expected Unsupported, got {:?}", other),
    }
}

#[test]
fn test_time_range_is_unsupported() {
    let body = r#"<fes:ResourceId rid="Roads.1" startTime="2024-01-01T00:00:00Z" endTime="2024-02-01T00:00:00+01:00"/>"#;
    match test_support::compile(body) {
        Err(Error::Unsupported(message)) => {
            assert!(message.contains("startTime/endTime"), "{}", message)
        }
        other => panic!("expected Unsupported, got {:?}", other),
    }
}

#[test]
fn test_bad_start_time_fails_at_parse() {
    let body = r#"<fes:ResourceId rid="Roads.1" startTime="yesterday"/>"#;
    assert!(matches!(
        test_support::parse(body),
        Err(Error::MalformedValue { .. })
    ));
}

#[test]
fn test_empty_version_attributes_are_ignored() {
    let body = r#"<fes:ResourceId rid="Roads.5" version="" startTime=""/>"#;
    assert_eq!(test_support::compile(body).unwrap(), pk_equals("5"));
}

#[test]
fn test_multiple_ids_are_or_ed() {
    let body = r#"<fes:ResourceId rid="Roads.1"/><fes:ResourceId rid="Roads.2"/>"#;
    assert_eq!(
        test_support::compile(body).unwrap(),
        Predicate::Or {
            predicates: vec![pk_equals("1"), pk_equals("2")],
        }
    );
}

#[test]
fn test_ids_of_other_types_are_skipped() {
    let body = r#"<fes:ResourceId rid="Rivers.9"/><fes:ResourceId rid="Roads.2"/>"#;
    assert_eq!(test_support::compile(body).unwrap(), pk_equals("2"));

    let only_other = r#"<fes:ResourceId rid="Rivers.9"/>"#;
    assert_eq!(
        test_support::compile(only_other).unwrap(),
        Predicate::constant(false)
    );
}

#[test]
fn test_strict_type_names_reject_other_types() {
    let body = r#"<fes:ResourceId rid="Roads.2"/><fes:ResourceId rid="Rivers.9"/>"#;
    match test_support::compile_strict(body) {
        Err(Error::MalformedFilter { message, .. }) => assert!(message.contains("Rivers.9")),
        other => panic!("expected MalformedFilter, got {:?}", other),
    }
}

#[test]
fn test_strict_type_names_report_feature_id_element() {
    let body = r#"<ogc:FeatureId fid="Roads.2"/><ogc:FeatureId fid="Rivers.9"/>"#;
    match test_support::compile_strict(body) {
        Err(Error::MalformedFilter { element, message }) => {
            assert_eq!(element, "FeatureId");
            assert!(message.contains("Rivers.9"), "{}", message);
        }
        other => panic!("expected MalformedFilter, got {:?}", other),
    }
}

#[test]
fn test_legacy_feature_id() {
    let body = r#"<ogc:FeatureId fid="Roads.9"/>"#;
    assert_eq!(test_support::compile(body).unwrap(), pk_equals("9"));

    assert_eq!(
        test_support::parse("<ogc:FeatureId/>"),
        Err(Error::MissingAttribute {
            element: "FeatureId".to_string(),
            attribute: "fid".to_string(),
        })
    );
}

#[test]
fn test_type_names_in_document_order() {
    let body = r#"<fes:ResourceId rid="Roads.1"/><fes:ResourceId rid="Rivers.2"/><ogc:FeatureId fid="Roads.3"/>"#;
    match test_support::parse(body).unwrap().predicate {
        Operator::Id(op) => assert_eq!(op.type_names(), vec!["Roads", "Rivers"]),
        other => panic!("expected Id operator, got {:?}", other),
    }
}

#[test]
fn test_identifier_mixed_with_operator_is_malformed() {
    let body = format!(
        r#"<fes:ResourceId rid="Roads.1"/><fes:PropertyIsNull>{}</fes:PropertyIsNull>"#,
        test_support::value_ref("lanes")
    );
    assert!(matches!(
        test_support::parse(&body),
        Err(Error::MalformedFilter { .. })
    ));
}

#[test]
fn test_compilation_is_deterministic() {
    let body = r#"<fes:ResourceId rid="Roads.1"/><fes:ResourceId rid="Roads.2"/>"#;
    let filter = test_support::parse(body).unwrap();
    let mapping = test_support::roads_mapping();

    let first = meridian_fes::compile(&filter, &mapping).unwrap();
    let second = meridian_fes::compile(&filter, &mapping).unwrap();
    assert_eq!(first, second);
}
