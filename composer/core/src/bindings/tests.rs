use super::*;
use crate::{
    env::EnvValue,
    service::{Identity, KeyMapping, SecretBinding},
    Feature, SizingTier,
};

fn mk_spec(secret_bindings: Vec<SecretBinding>) -> ServiceSpec {
    ServiceSpec {
        identity: Identity::new("shop", "orders"),
        image: "registry.example.com/orders:1.0.0".to_string(),
        sizing_tier: SizingTier::Small,
        messaging: MessagingBinding {
            url: "nats://nats.nats.svc:4222".to_string(),
            topic: "ORDERS".to_string(),
            group: "orders-workers".to_string(),
        },
        secret_bindings,
        init_task: Feature::Absent,
        network_exposure: Feature::Absent,
        autoscaling: Feature::Absent,
    }
}

fn mk_binding(name: &str, mappings: &[(&str, &str)], bulk_import: bool) -> SecretBinding {
    SecretBinding {
        secret_name: name.to_string(),
        explicit_mappings: mappings
            .iter()
            .map(|(secret_field, env_name)| KeyMapping {
                secret_field: secret_field.to_string(),
                env_name: env_name.to_string(),
            })
            .collect(),
        bulk_import,
    }
}

fn secret_source(index: usize, name: &str) -> EnvSource {
    EnvSource::Secret {
        index,
        secret_name: name.to_string(),
    }
}

#[test]
fn messaging_only() {
    let bindings = synthesize(&mk_spec(vec![])).unwrap();
    assert_eq!(
        bindings.env.names().collect::<Vec<_>>(),
        vec![NATS_URL, NATS_STREAM_NAME, NATS_CONSUMER_GROUP]
    );
    assert_eq!(
        bindings.env.get(NATS_STREAM_NAME).map(|v| &v.value),
        Some(&EnvValue::Literal("ORDERS".to_string()))
    );
    assert!(bindings.bulk_imports.is_empty());
}

#[test]
fn explicit_mapping_is_appended_after_messaging() {
    let spec = mk_spec(vec![mk_binding("db-creds", &[("host", "DB_HOST")], false)]);
    let bindings = synthesize(&spec).unwrap();

    assert_eq!(bindings.env.len(), 4);
    let last = bindings.env.iter().last().unwrap();
    assert_eq!(
        *last,
        EnvVar::secret_key_ref("DB_HOST", "db-creds", "host", secret_source(0, "db-creds"))
    );
    assert!(bindings.bulk_imports.is_empty());
}

#[test]
fn bulk_import_leaves_environment_unchanged() {
    let spec = mk_spec(vec![mk_binding("llm-keys", &[], true)]);
    let bindings = synthesize(&spec).unwrap();

    assert_eq!(bindings.env, synthesize(&mk_spec(vec![])).unwrap().env);
    assert_eq!(bindings.bulk_imports.iter().collect::<Vec<_>>(), vec!["llm-keys"]);
}

#[test]
fn binding_with_mappings_and_bulk_import() {
    let spec = mk_spec(vec![mk_binding(
        "db-creds",
        &[("user", "DB_USER"), ("password", "DB_PASSWORD")],
        true,
    )]);
    let bindings = synthesize(&spec).unwrap();
    assert_eq!(
        bindings.env.names().skip(3).collect::<Vec<_>>(),
        vec!["DB_USER", "DB_PASSWORD"]
    );
    assert_eq!(bindings.bulk_imports.iter().collect::<Vec<_>>(), vec!["db-creds"]);
}

#[test]
fn degenerate_binding_contributes_nothing() {
    let spec = mk_spec(vec![mk_binding("unused", &[], false)]);
    assert_eq!(synthesize(&spec).unwrap(), synthesize(&mk_spec(vec![])).unwrap());
}

#[test]
fn claim_order_is_preserved() {
    let spec = mk_spec(vec![
        mk_binding("zz", &[("k", "ZZ_KEY")], true),
        mk_binding("aa", &[("k", "AA_KEY")], true),
        mk_binding("mm", &[("b", "MM_B"), ("a", "MM_A")], false),
    ]);
    let bindings = synthesize(&spec).unwrap();
    assert_eq!(
        bindings.env.names().skip(3).collect::<Vec<_>>(),
        vec!["ZZ_KEY", "AA_KEY", "MM_B", "MM_A"]
    );
    assert_eq!(bindings.bulk_imports.iter().collect::<Vec<_>>(), vec!["zz", "aa"]);
}

#[test]
fn conflicting_secret_mappings() {
    let spec = mk_spec(vec![
        mk_binding("db-primary", &[("host", "DB_HOST")], false),
        mk_binding("db-replica", &[("host", "DB_HOST")], false),
    ]);
    assert_eq!(
        synthesize(&spec).unwrap_err(),
        Error::ConflictingBinding {
            env_name: "DB_HOST".to_string(),
            first: secret_source(0, "db-primary"),
            second: secret_source(1, "db-replica"),
        }
    );
}

#[test]
fn mapping_may_not_shadow_messaging_variable() {
    let spec = mk_spec(vec![mk_binding("nats-creds", &[("url", NATS_URL)], false)]);
    assert_eq!(
        synthesize(&spec).unwrap_err(),
        Error::ConflictingBinding {
            env_name: NATS_URL.to_string(),
            first: EnvSource::Messaging,
            second: secret_source(0, "nats-creds"),
        }
    );
}

#[test]
fn repeated_mapping_within_one_binding() {
    let spec = mk_spec(vec![mk_binding(
        "db-creds",
        &[("host", "DB_HOST"), ("hostname", "DB_HOST")],
        false,
    )]);
    assert!(matches!(
        synthesize(&spec),
        Err(Error::ConflictingBinding { env_name, .. }) if env_name == "DB_HOST"
    ));
}

#[test]
fn bulk_import_of_identity_token_is_rejected() {
    let spec = mk_spec(vec![
        mk_binding("llm-keys", &[], true),
        mk_binding("orders-token", &[], true),
    ]);
    assert_eq!(
        synthesize(&spec).unwrap_err(),
        Error::SelfReferentialBulkImport {
            index: 1,
            secret_name: "orders-token".to_string(),
        }
    );
}

#[test]
fn explicit_mapping_of_identity_token_is_allowed() {
    // Only whole-secret imports can form a cycle with the workload's identity.
    let spec = mk_spec(vec![mk_binding("orders-token", &[("token", "SA_TOKEN")], false)]);
    assert!(synthesize(&spec).is_ok());
}

#[test]
fn duplicate_bulk_import_keeps_first_position() {
    let spec = mk_spec(vec![
        mk_binding("shared", &[], true),
        mk_binding("other", &[], true),
        mk_binding("shared", &[("k", "SHARED_K")], true),
    ]);
    let bindings = synthesize(&spec).unwrap();
    assert_eq!(bindings.bulk_imports.iter().collect::<Vec<_>>(), vec!["shared", "other"]);
    assert_eq!(bindings.env.len(), 4);
}

#[test]
fn synthesis_is_deterministic() {
    let spec = mk_spec(vec![
        mk_binding("db-creds", &[("host", "DB_HOST"), ("port", "DB_PORT")], false),
        mk_binding("llm-keys", &[], true),
    ]);
    let first = synthesize(&spec).unwrap();
    for _ in 0..8 {
        assert_eq!(synthesize(&spec).unwrap(), first);
    }
}
