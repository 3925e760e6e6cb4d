use service_composer_runtime::{
    batch::{self, RenderOptions},
    compose::{k8s::EventDrivenService, Error, ResourceKey},
    input::{self, Source},
    render::{self, Format, Mode},
    report::{self, FailureReport},
};
use std::time::Duration;

const ORDERS: &str = r#"
apiVersion: platform.composer.dev/v1alpha1
kind: EventDrivenService
metadata:
  name: orders
  namespace: shop
spec:
  image: registry.example.com/orders:1.0.0
  size: small
  nats:
    url: nats://nats.nats.svc:4222
    stream: ORDERS
    consumer: orders-workers
  networkExposure:
    enabled: true
    hostname: orders.example.com
"#;

const BILLING: &str = r#"
apiVersion: platform.composer.dev/v1alpha1
kind: EventDrivenService
metadata:
  name: billing
  namespace: shop
spec:
  image: registry.example.com/billing:2.0.0
  size: medium
  nats:
    url: nats://nats.nats.svc:4222
    stream: BILLING
    consumer: billing-workers
  secretRefs:
    - name: db-a
      env: [{ secretKey: host, envName: DB_HOST }]
    - name: db-b
      env: [{ secretKey: host, envName: DB_HOST }]
"#;

fn mk_source(name: &str, contents: impl Into<String>) -> Source {
    Source {
        name: name.to_string(),
        contents: contents.into(),
    }
}

fn mk_claims(docs: &[&str]) -> Vec<EventDrivenService> {
    let decoded = input::decode_sources(&[mk_source("claims.yaml", docs.join("---\n"))]);
    decoded
        .into_iter()
        .map(|d| d.claim.expect("claim must decode"))
        .collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn batch_preserves_input_order() {
    let claims = mk_claims(&[BILLING, ORDERS, ORDERS.replace("orders", "refunds").as_str()]);
    let names = claims.iter().map(report::claim_name).collect::<Vec<_>>();
    assert_eq!(names, vec!["shop/billing", "shop/orders", "shop/refunds"]);

    let results = batch::compose_all(claims, Some(Duration::from_secs(5)))
        .await
        .expect("tasks must complete");
    assert_eq!(results.len(), 3);
    assert!(
        matches!(&results[0], Err(Error::ConflictingBinding { env_name, .. }) if env_name == "DB_HOST")
    );
    assert_eq!(results[1].as_ref().unwrap().identity().name, "orders");
    assert_eq!(results[2].as_ref().unwrap().identity().name, "refunds");
}

#[tokio::test(flavor = "multi_thread")]
async fn batch_is_deterministic() {
    let first = batch::compose_all(mk_claims(&[ORDERS]), None).await.unwrap();
    let second = batch::compose_all(mk_claims(&[ORDERS]), None).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test(flavor = "multi_thread")]
async fn renders_manifests_as_yaml() {
    let refunds = ORDERS.replace("orders", "refunds");
    let sets = batch::compose_all(mk_claims(&[ORDERS, refunds.as_str()]), None)
        .await
        .unwrap()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let out = render::render(&sets, Mode::Manifests, Format::Yaml, None).unwrap();
    assert_eq!(out.matches("---\n").count(), 2);
    assert!(out.starts_with("---\nidentity:\n"), "{out}");
    assert!(out.contains("\nroute:\n"));
    assert!(out.contains("host: orders.example.com"));

    // Every document decodes back into a map keyed by resource.
    for doc in out.split("---\n").filter(|d| !d.is_empty()) {
        let value: serde_yaml::Value = serde_yaml::from_str(doc).unwrap();
        let keys = value
            .as_mapping()
            .unwrap()
            .keys()
            .map(|k| k.as_str().unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["identity", "workload", "service", "route"]);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn renders_objects_as_json() {
    let sets = batch::compose_all(mk_claims(&[ORDERS]), None)
        .await
        .unwrap()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let out = render::render(&sets, Mode::Objects, Format::Json, Some("in-cluster")).unwrap();
    let objects: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    let names = objects
        .iter()
        .map(|o| o["metadata"]["name"].as_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            "shop.orders-identity",
            "shop.orders-workload",
            "shop.orders-service",
            "shop.orders-route"
        ]
    );
    assert!(objects
        .iter()
        .all(|o| o["spec"]["providerConfigRef"]["name"] == "in-cluster"));
    assert_eq!(objects[3]["spec"]["forProvider"]["manifest"]["kind"], "Ingress");
}

#[test]
fn renders_nothing_for_empty_batch() {
    assert_eq!(render::render(&[], Mode::Manifests, Format::Yaml, None).unwrap(), "");
    assert_eq!(render::render(&[], Mode::Objects, Format::Json, None).unwrap(), "[]\n");
}

#[test]
fn validates_claims() {
    let claims = mk_claims(&[ORDERS, ORDERS.replace("size: small", "size: huge").as_str()]);
    let results = batch::validate_all(&claims);
    assert!(results[0].is_ok());
    assert!(
        matches!(&results[1], Err(Error::SchemaViolation { field, .. }) if field == "spec.size")
    );
}

#[test]
fn decode_failures_are_per_document() {
    let decoded = input::decode_sources(&[
        mk_source("good.yaml", ORDERS),
        mk_source(
            "mixed.yaml",
            [ORDERS, "apiVersion: v1\nkind: ConfigMap\n", BILLING].join("---\n"),
        ),
    ]);
    let origins = decoded.iter().map(|d| d.origin.as_str()).collect::<Vec<_>>();
    assert_eq!(
        origins,
        vec!["good.yaml[0]", "mixed.yaml[0]", "mixed.yaml[1]", "mixed.yaml[2]"]
    );
    assert!(decoded[0].claim.is_ok());
    assert!(decoded[1].claim.is_ok());
    assert!(matches!(
        &decoded[2].claim,
        Err(Error::SchemaViolation { field, .. }) if field == "apiVersion"
    ));
    assert!(decoded[3].claim.is_ok());
}

#[tokio::test(flavor = "multi_thread")]
async fn renders_claims_next_to_a_bad_document() {
    let sources = [mk_source(
        "claims.yaml",
        [ORDERS, "apiVersion: v1\nkind: ConfigMap\n"].join("---\n"),
    )];
    let options = RenderOptions {
        mode: Mode::Objects,
        format: Format::Json,
        ..Default::default()
    };

    let mut out = Vec::new();
    let mut reports = Vec::new();
    let failures = batch::render_sources(&sources, &options, &mut out, &mut reports)
        .await
        .unwrap();
    assert_eq!(failures, 1);

    let objects: Vec<serde_json::Value> = serde_json::from_slice(&out).unwrap();
    assert_eq!(objects.len(), 4);
    assert_eq!(objects[0]["metadata"]["name"], "shop.orders-identity");

    let reports = String::from_utf8(reports).unwrap();
    let report: serde_json::Value = serde_json::from_str(reports.trim_end()).unwrap();
    assert_eq!(report["claim"], "claims.yaml[1]");
    assert_eq!(report["reason"], "SchemaViolation");
}

#[test]
fn validates_sources() {
    let sources = [mk_source("claims.yaml", [ORDERS, BILLING].join("---\n"))];
    let mut out = Vec::new();
    let mut reports = Vec::new();
    let failures = batch::validate_sources(&sources, &mut out, &mut reports).unwrap();

    // Conflicting bindings are found by composition, not validation.
    assert_eq!(failures, 0);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "shop/orders: valid\nshop/billing: valid\n"
    );
    assert!(reports.is_empty());
}

#[test]
fn failure_report() {
    let error = Error::SelfReferentialBulkImport {
        index: 0,
        secret_name: "orders-token".to_string(),
    };
    let report = FailureReport::new("shop/orders", &error);
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["claim"], "shop/orders");
    assert_eq!(json["reason"], "SelfReferentialBulkImport");
    assert_eq!(json["message"], error.to_string());
}

#[test]
fn resource_keys_render_in_camel_case() {
    assert_eq!(
        serde_json::to_value(ResourceKey::Scaler).unwrap(),
        serde_json::json!("scaler")
    );
}
