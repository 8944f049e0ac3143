use hashguard::config::{ENV_HASH_COLLISION_RESISTANT, ENV_MAX_OBJECT_GRAPH_DEPTH, ENV_POLICY};
use hashguard::{PolicyConfig, PolicyPreset, SecurityPolicy};
use std::sync::Arc;

#[test]
fn json_config_builds_untrusted_policy() {
    crate::common::init_test_logging();
    test_phase!("json_config_builds_untrusted_policy");
    let config: PolicyConfig =
        serde_json::from_str(r#"{ "preset": "untrusted", "max_object_graph_depth": 128 }"#)
            .expect("valid config");

    let policy = config.build();

    assert!(policy.hash_collision_resistant());
    assert_eq!(policy.max_object_graph_depth(), 128);
    test_complete!("json_config_builds_untrusted_policy");
}

#[test]
fn json_config_rejects_unknown_fields() {
    let result = serde_json::from_str::<PolicyConfig>(r#"{ "hash_collision_proof": true }"#);
    assert!(result.is_err());
}

#[test]
fn json_preset_names_are_lowercase() {
    assert_eq!(
        serde_json::to_string(&PolicyPreset::Untrusted).expect("serialize"),
        r#""untrusted""#
    );
    assert!(serde_json::from_str::<PolicyPreset>(r#""Untrusted""#).is_err());
}

#[test]
fn preset_without_overrides_is_shared_instance() {
    let config = PolicyConfig {
        preset: Some(PolicyPreset::Untrusted),
        ..PolicyConfig::default()
    };
    assert!(Arc::ptr_eq(&config.build(), &SecurityPolicy::untrusted()));
}

#[test]
fn flag_override_relaxes_untrusted_preset() {
    let config = PolicyConfig {
        preset: Some(PolicyPreset::Untrusted),
        hash_collision_resistant: Some(false),
        max_object_graph_depth: None,
    };

    let policy = config.build();

    assert!(!policy.hash_collision_resistant());
    assert_eq!(policy.max_object_graph_depth(), 500);
}

#[test]
fn lookup_maps_variables_to_config() {
    let config = PolicyConfig::from_lookup(|name| match name {
        n if n == ENV_POLICY => Some("UNTRUSTED".to_owned()),
        n if n == ENV_MAX_OBJECT_GRAPH_DEPTH => Some(" 42 ".to_owned()),
        _ => None,
    })
    .expect("valid environment");

    assert_eq!(config.preset, Some(PolicyPreset::Untrusted));
    assert_eq!(config.hash_collision_resistant, None);
    assert_eq!(config.max_object_graph_depth, Some(42));
}

#[test]
fn lookup_rejects_malformed_flag_naming_the_variable() {
    let err = PolicyConfig::from_lookup(|name| {
        (name == ENV_HASH_COLLISION_RESISTANT).then(|| "sometimes".to_owned())
    })
    .expect_err("malformed flag");

    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains(ENV_HASH_COLLISION_RESISTANT));
}
