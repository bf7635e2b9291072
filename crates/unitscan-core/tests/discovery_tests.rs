/// Integration tests for the discovery facade
///
/// These tests exercise derivation, annotation and gating behavior over
/// multi-unit fixtures. Result order is not part of the contract, so
/// comparisons go through sorted name lists or sets.
use std::collections::BTreeSet;
use unitscan_core::{
    CacheEntry, CancellationToken, CrossUnitSetting, DiscoveryConfig, DiscoveryError,
    TypeDescriptor, TypeDiscovery, UnitId,
};
use unitscan_test_helpers::{init_tracing, layered_fixture, shapes_fixture};

fn sorted_names(entry: &CacheEntry) -> Vec<String> {
    let mut names: Vec<String> = entry
        .iter()
        .map(|ty| ty.qualified_name().to_string())
        .collect();
    names.sort();
    names
}

fn name_set(entry: &CacheEntry) -> BTreeSet<String> {
    entry
        .iter()
        .map(|ty| ty.qualified_name().to_string())
        .collect()
}

fn disabled() -> DiscoveryConfig {
    DiscoveryConfig::default().with_cross_unit_discovery(CrossUnitSetting::Disabled)
}

#[test]
fn test_derived_types_exclude_abstract_and_base() {
    init_tracing();
    let fixture = shapes_fixture();
    let discovery = TypeDiscovery::with_default_config(fixture.program);

    let derived = discovery
        .find_derived_types(&fixture.root, &fixture.shape, &CancellationToken::none())
        .unwrap();

    insta::assert_snapshot!(sorted_names(&derived).join(", "), @"Geometry.Circle, Geometry.Square");
    assert!(!name_set(&derived).contains(fixture.polygon.qualified_name()));
    assert!(!name_set(&derived).contains(fixture.shape.qualified_name()));
}

#[test]
fn test_derived_types_match_rebuilt_base_instance() {
    let fixture = shapes_fixture();
    let discovery = TypeDiscovery::with_default_config(fixture.program);
    let shape_next_pass = TypeDescriptor::builder(&fixture.root, "Geometry", "Shape").build();

    let derived = discovery
        .find_derived_types(&fixture.root, &shape_next_pass, &CancellationToken::none())
        .unwrap();

    assert_eq!(
        sorted_names(&derived),
        vec!["Geometry.Circle", "Geometry.Square"]
    );
}

#[test]
fn test_same_name_in_other_unit_is_not_the_base() {
    let fixture = shapes_fixture();
    let discovery = TypeDiscovery::with_default_config(fixture.program);
    let impostor = TypeDescriptor::builder(&UnitId::new("Other", "1.0.0"), "Geometry", "Shape")
        .build();

    let derived = discovery
        .find_derived_types(&fixture.root, &impostor, &CancellationToken::none())
        .unwrap();

    assert!(derived.is_empty());
}

#[test]
fn test_unopted_dependency_never_contributes() {
    let fixture = shapes_fixture();
    let discovery = TypeDiscovery::with_default_config(fixture.program);
    let cancel = CancellationToken::none();

    let all = discovery.find_all_types(&fixture.root, &cancel).unwrap();
    assert!(all.iter().all(|ty| ty.unit() != &fixture.vendor));
    assert!(!name_set(&all).contains(fixture.triangle.qualified_name()));

    let derived = discovery
        .find_derived_types(&fixture.root, &fixture.shape, &cancel)
        .unwrap();
    assert!(derived.iter().all(|ty| ty.unit() != &fixture.vendor));
}

#[test]
fn test_layered_all_types_cross_opted_in_units() {
    let fixture = layered_fixture();
    let discovery = TypeDiscovery::with_default_config(fixture.program);

    let all = discovery
        .find_all_types(&fixture.app, &CancellationToken::none())
        .unwrap();

    assert_eq!(
        name_set(&all),
        [
            "App.HomeController",
            "App.Data.OrderRepository",
            "Services.Mailer",
            "Services.Mailer.Options",
            "Services.Data.UserRepository",
            "Core.ServiceAttribute",
            "Core.IRepository",
            "Core.RepositoryBase",
            "Core.SystemClock",
        ]
        .into_iter()
        .map(String::from)
        .collect::<BTreeSet<_>>()
    );
    assert!(all.iter().all(|ty| ty.unit() != &fixture.closed));
    assert_eq!(all.len(), name_set(&all).len(), "no duplicates");
}

#[test]
fn test_layered_derived_through_abstract_base() {
    let fixture = layered_fixture();
    let discovery = TypeDiscovery::with_default_config(fixture.program);

    let repositories = discovery
        .find_derived_types(&fixture.app, &fixture.repository, &CancellationToken::none())
        .unwrap();

    assert_eq!(
        sorted_names(&repositories),
        vec!["App.Data.OrderRepository", "Services.Data.UserRepository"]
    );
}

#[test]
fn test_exact_annotation_lookup() {
    let fixture = layered_fixture();
    let discovery = TypeDiscovery::with_default_config(fixture.program);

    let annotated = discovery
        .find_types_with_annotation(
            &fixture.app,
            &fixture.service_attribute,
            &CancellationToken::none(),
        )
        .unwrap();

    assert_eq!(
        sorted_names(&annotated),
        vec![
            "App.HomeController",
            "Core.SystemClock",
            "Services.Data.UserRepository",
            "Services.Mailer.Options",
        ]
    );
}

#[test]
fn test_annotation_name_is_suffix_and_case_tolerant() {
    let fixture = layered_fixture();
    let discovery = TypeDiscovery::with_default_config(fixture.program);
    let cancel = CancellationToken::none();

    let expected = vec![
        "App.HomeController",
        "Core.SystemClock",
        "Services.Data.UserRepository",
        "Services.Mailer",
        "Services.Mailer.Options",
    ];
    for name in ["Service", "service", "SERVICE"] {
        let found = discovery
            .find_types_with_annotation_name(&fixture.app, name, &cancel)
            .unwrap();
        assert_eq!(sorted_names(&found), expected, "lookup by {name:?}");
    }

    let exact_suffix = discovery
        .find_types_with_annotation_name(&fixture.app, "ServiceAttribute", &cancel)
        .unwrap();
    assert!(!name_set(&exact_suffix).contains("Services.Mailer"));
}

#[test]
fn test_dotted_annotation_name_matches_nothing() {
    let fixture = layered_fixture();
    let discovery = TypeDiscovery::with_default_config(fixture.program);
    let cancel = CancellationToken::none();

    for name in ["Core.Service", "Core.ServiceAttribute"] {
        let found = discovery
            .find_types_with_annotation_name(&fixture.app, name, &cancel)
            .unwrap();
        assert!(found.is_empty(), "{name:?} matched {:?}", found.qualified_names());
    }
}

#[test]
fn test_annotation_name_folds_non_ascii_case() {
    let root = UnitId::new("Intl", "1.0.0");
    let program = unitscan_core::Program::new().with_unit(
        unitscan_core::Unit::builder(root.clone())
            .with_type(
                TypeDescriptor::builder(&root, "Intl", "Greeter")
                    .annotated(unitscan_core::Annotation::new("Intl.ÜberAttribute"))
                    .build(),
            )
            .build(),
    );
    let discovery = TypeDiscovery::with_default_config(program);
    let cancel = CancellationToken::none();

    let lower = discovery
        .find_types_with_annotation_name(&root, "über", &cancel)
        .unwrap();
    let upper = discovery
        .find_types_with_annotation_name(&root, "ÜBER", &cancel)
        .unwrap();

    assert_eq!(lower.qualified_names(), vec!["Intl.Greeter"]);
    assert!(lower.ptr_eq(&upper));
}

#[test]
fn test_unnamed_type_parameters_are_rejected() {
    let fixture = shapes_fixture();
    let discovery = TypeDiscovery::with_default_config(fixture.program);
    let unnamed = TypeDescriptor::builder(&UnitId::unversioned("X"), "", "").build();
    let cancel = CancellationToken::none();

    assert!(matches!(
        discovery.find_derived_types(&fixture.root, &unnamed, &cancel),
        Err(DiscoveryError::InvalidArgument { name: "base", .. })
    ));
    assert!(matches!(
        discovery.find_types_with_annotation(&fixture.root, &unnamed, &cancel),
        Err(DiscoveryError::InvalidArgument {
            name: "annotation_type",
            ..
        })
    ));
}

#[test]
fn test_annotated_results_keep_abstract_types() {
    let fixture = shapes_fixture();
    let root = fixture.root.clone();
    let marker = TypeDescriptor::builder(&root, "Geometry", "ExportAttribute").build();
    let program = fixture.program.with_unit(
        unitscan_core::Unit::builder(root.clone())
            .with_type(
                TypeDescriptor::builder(&root, "Geometry", "Polygon")
                    .abstract_()
                    .annotated(unitscan_core::Annotation::new("Geometry.ExportAttribute"))
                    .build(),
            )
            .build(),
    );
    let discovery = TypeDiscovery::with_default_config(program);

    let annotated = discovery
        .find_types_with_annotation(&root, &marker, &CancellationToken::none())
        .unwrap();

    assert_eq!(sorted_names(&annotated), vec!["Geometry.Polygon"]);
}

#[test]
fn test_disabled_override_limits_to_root() {
    let fixture = layered_fixture();
    let discovery = TypeDiscovery::new(fixture.program, &disabled());
    let cancel = CancellationToken::none();

    assert_eq!(
        discovery.is_cross_unit_discovery_enabled(&fixture.app),
        Ok(false)
    );

    let all = discovery.find_all_types(&fixture.app, &cancel).unwrap();
    assert_eq!(
        sorted_names(&all),
        vec!["App.Data.OrderRepository", "App.HomeController"]
    );

    let annotated = discovery
        .find_types_with_annotation(&fixture.app, &fixture.service_attribute, &cancel)
        .unwrap();
    assert_eq!(sorted_names(&annotated), vec!["App.HomeController"]);
}

#[test]
fn test_override_values_match_enabled_or_disabled() {
    let cancel = CancellationToken::none();
    let reference = |config: &DiscoveryConfig| {
        let fixture = layered_fixture();
        let discovery = TypeDiscovery::new(fixture.program, config);
        name_set(&discovery.find_all_types(&fixture.app, &cancel).unwrap())
    };

    let enabled = reference(&DiscoveryConfig::default());
    let off = reference(&disabled());
    assert_ne!(enabled, off);

    for value in ["false", "FALSE", "False", "0"] {
        let config = DiscoveryConfig::from_build_properties([("EnableCrossUnitDiscovery", value)]);
        assert_eq!(reference(&config), off, "{value:?} should disable");
    }
    for value in ["true", "1", "", "yes", "garbage", "-1"] {
        let config = DiscoveryConfig::from_build_properties([("EnableCrossUnitDiscovery", value)]);
        assert_eq!(reference(&config), enabled, "{value:?} should enable");
    }
}

#[test]
fn test_queries_are_idempotent_as_sets() {
    let fixture = layered_fixture();
    let app = fixture.app.clone();
    let cancel = CancellationToken::none();

    let first_session = TypeDiscovery::with_default_config(fixture.program.clone());
    let second_session = TypeDiscovery::with_default_config(fixture.program);

    let a = first_session
        .find_types_with_annotation_name(&app, "Service", &cancel)
        .unwrap();
    let b = second_session
        .find_types_with_annotation_name(&app, "Service", &cancel)
        .unwrap();
    assert_eq!(name_set(&a), name_set(&b));

    let again = first_session
        .find_types_with_annotation_name(&app, "Service", &cancel)
        .unwrap();
    assert_eq!(name_set(&a), name_set(&again));
}

#[test]
fn test_config_from_json_metadata() {
    let fixture = layered_fixture();
    let config: DiscoveryConfig =
        serde_json::from_str(r#"{ "EnableCrossUnitDiscovery": false }"#).unwrap();
    let discovery = TypeDiscovery::new(fixture.program, &config);

    assert_eq!(
        discovery.is_cross_unit_discovery_enabled(&fixture.app),
        Ok(false)
    );
}

#[test]
fn test_config_json_accepts_strings_and_missing_fields() {
    let text: DiscoveryConfig =
        serde_json::from_str(r#"{ "EnableCrossUnitDiscovery": "0" }"#).unwrap();
    assert_eq!(text.enable_cross_unit_discovery, CrossUnitSetting::Disabled);

    let empty: DiscoveryConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, DiscoveryConfig::default());

    let marker: DiscoveryConfig =
        serde_json::from_str(r#"{ "OptInMarker": "Acme.ScanAttribute" }"#).unwrap();
    assert_eq!(marker.opt_in_marker, "Acme.ScanAttribute");
}
