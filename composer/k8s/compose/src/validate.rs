//! Converts a raw claim into a typed [`ServiceSpec`].
//!
//! Validation stops at the first structural defect and reports it as a `SchemaViolation` naming
//! the offending field. Fields of absent or disabled features are not inspected.

use crate::k8s::{claim, EventDrivenService, ObjectMeta};
use ahash::AHashMap as HashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use service_composer_core::{
    service::{
        Autoscaling, Identity, InitTask, KeyMapping, MessagingBinding, MetricBinding,
        NetworkExposure, SecretBinding, ServiceSpec,
    },
    Error, Feature, SizingTier,
};
use std::num::NonZeroU16;

const DNS_LABEL_REGEX: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$";
const DNS_1035_LABEL_REGEX: &str = r"^[a-z]([-a-z0-9]*[a-z0-9])?$";
const DNS_SUBDOMAIN_REGEX: &str =
    r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$";
const ENV_NAME_REGEX: &str = r"^[-._a-zA-Z][-._a-zA-Z0-9]*$";
const SECRET_KEY_REGEX: &str = r"^[-._a-zA-Z0-9]+$";

const MAX_LABEL_LEN: usize = 63;
const MAX_SUBDOMAIN_LEN: usize = 253;

pub const DEFAULT_PORT: i32 = 8080;
pub const DEFAULT_MIN_REPLICAS: i32 = 1;

static DNS_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(DNS_LABEL_REGEX).expect("DNS label regex must compile"));
static DNS_1035_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(DNS_1035_LABEL_REGEX).expect("DNS-1035 regex must compile"));
static DNS_SUBDOMAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(DNS_SUBDOMAIN_REGEX).expect("DNS subdomain regex must compile"));
static ENV_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(ENV_NAME_REGEX).expect("env name regex must compile"));
static SECRET_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(SECRET_KEY_REGEX).expect("secret key regex must compile"));

pub fn validate(claim: &EventDrivenService) -> Result<ServiceSpec, Error> {
    let identity = validate_identity(&claim.metadata)?;
    let spec = &claim.spec;

    let image = required(spec.image.as_deref(), "spec.image")?;
    if image.chars().any(char::is_whitespace) {
        return Err(Error::schema(
            "spec.image",
            format!("{image:?} must not contain whitespace"),
        ));
    }

    let sizing_tier = required(spec.size.as_deref(), "spec.size")?
        .parse::<SizingTier>()
        .map_err(|error| Error::schema("spec.size", error))?;

    let messaging = validate_messaging(spec.nats.as_ref())?;
    let secret_bindings = validate_secret_refs(spec.secret_refs.as_deref().unwrap_or_default())?;
    let init_task = validate_init_task(spec.init_container.as_ref())?;
    let network_exposure = validate_network_exposure(spec.network_exposure.as_ref())?;
    let autoscaling = validate_autoscaling(spec.autoscaling.as_ref())?;

    Ok(ServiceSpec {
        identity,
        image: image.to_string(),
        sizing_tier,
        messaging,
        secret_bindings,
        init_task,
        network_exposure,
        autoscaling,
    })
}

fn validate_identity(meta: &ObjectMeta) -> Result<Identity, Error> {
    let name = required(meta.name.as_deref(), "metadata.name")?;
    if !is_dns_1035_label(name) {
        return Err(Error::schema(
            "metadata.name",
            format!(
                "{name:?} must be at most {MAX_LABEL_LEN} lowercase alphanumeric characters or \
                 '-', starting with a letter and ending with an alphanumeric character"
            ),
        ));
    }

    let namespace = required(meta.namespace.as_deref(), "metadata.namespace")?;
    if !is_dns_label(namespace) {
        return Err(Error::schema(
            "metadata.namespace",
            format!("{namespace:?} must be a valid DNS label"),
        ));
    }

    Ok(Identity::new(namespace, name))
}

fn validate_messaging(nats: Option<&claim::NatsBinding>) -> Result<MessagingBinding, Error> {
    let nats = nats.ok_or_else(|| Error::schema("spec.nats", "is required"))?;
    Ok(MessagingBinding {
        url: required(nats.url.as_deref(), "spec.nats.url")?.to_string(),
        topic: required(nats.stream.as_deref(), "spec.nats.stream")?.to_string(),
        group: required(nats.consumer.as_deref(), "spec.nats.consumer")?.to_string(),
    })
}

fn validate_secret_refs(refs: &[claim::SecretRef]) -> Result<Vec<SecretBinding>, Error> {
    // Maps each secret name to the first reference that names it and its envFrom value.
    let mut first_refs = HashMap::<&str, (usize, bool)>::default();
    let mut bindings = Vec::with_capacity(refs.len());

    for (i, secret_ref) in refs.iter().enumerate() {
        let field = format!("spec.secretRefs[{i}]");

        let name = required(secret_ref.name.as_deref(), &format!("{field}.name"))?;
        if !is_dns_subdomain(name) {
            return Err(Error::schema(
                format!("{field}.name"),
                format!("{name:?} must be a valid DNS subdomain"),
            ));
        }

        let bulk_import = secret_ref.env_from.unwrap_or(false);
        match first_refs.get(name) {
            Some(&(first, first_bulk_import)) if first_bulk_import != bulk_import => {
                return Err(Error::schema(
                    format!("{field}.envFrom"),
                    format!(
                        "secret {name:?} is already referenced by spec.secretRefs[{first}] with \
                         envFrom: {first_bulk_import}"
                    ),
                ));
            }
            Some(_) => {}
            None => {
                first_refs.insert(name, (i, bulk_import));
            }
        }

        let mut explicit_mappings = Vec::new();
        for (j, mapping) in secret_ref.env.iter().flatten().enumerate() {
            let field = format!("{field}.env[{j}]");

            let secret_field = required(mapping.secret_key.as_deref(), &format!("{field}.secretKey"))?;
            if !SECRET_KEY.is_match(secret_field) {
                return Err(Error::schema(
                    format!("{field}.secretKey"),
                    format!("{secret_field:?} must consist of alphanumeric characters, '-', '_' or '.'"),
                ));
            }

            let env_name = required(mapping.env_name.as_deref(), &format!("{field}.envName"))?;
            if !ENV_NAME.is_match(env_name) {
                return Err(Error::schema(
                    format!("{field}.envName"),
                    format!("{env_name:?} is not a valid environment variable name"),
                ));
            }

            explicit_mappings.push(KeyMapping {
                secret_field: secret_field.to_string(),
                env_name: env_name.to_string(),
            });
        }

        bindings.push(SecretBinding {
            secret_name: name.to_string(),
            explicit_mappings,
            bulk_import,
        });
    }

    Ok(bindings)
}

fn validate_init_task(init: Option<&claim::InitContainer>) -> Result<Feature<InitTask>, Error> {
    let Some(init) = init else {
        return Ok(Feature::Absent);
    };

    let command = init.command.clone().unwrap_or_default();
    if command.is_empty() {
        return Err(Error::schema(
            "spec.initContainer.command",
            "must contain at least one element",
        ));
    }

    Ok(Feature::Included(InitTask {
        command,
        args: init.args.clone().unwrap_or_default(),
    }))
}

fn validate_network_exposure(
    exposure: Option<&claim::NetworkExposure>,
) -> Result<Feature<NetworkExposure>, Error> {
    let exposure = match exposure {
        Some(exposure) if exposure.enabled => exposure,
        _ => return Ok(Feature::Absent),
    };

    let hostname = required(exposure.hostname.as_deref(), "spec.networkExposure.hostname")?;
    if !is_dns_subdomain(hostname) {
        return Err(Error::schema(
            "spec.networkExposure.hostname",
            format!("{hostname:?} must be a lowercase, dot-separated sequence of DNS labels"),
        ));
    }

    let port = exposure.port.unwrap_or(DEFAULT_PORT);
    let port = u16::try_from(port)
        .ok()
        .and_then(NonZeroU16::new)
        .ok_or_else(|| {
            Error::schema(
                "spec.networkExposure.port",
                format!("{port} must be between 1 and 65535"),
            )
        })?;

    if let Some(class) = exposure.ingress_class_name.as_deref() {
        if !is_dns_subdomain(class) {
            return Err(Error::schema(
                "spec.networkExposure.ingressClassName",
                format!("{class:?} must be a valid DNS subdomain"),
            ));
        }
    }

    Ok(Feature::Included(NetworkExposure {
        hostname: hostname.to_string(),
        port,
        ingress_class_name: exposure.ingress_class_name.clone(),
    }))
}

fn validate_autoscaling(
    autoscaling: Option<&claim::Autoscaling>,
) -> Result<Feature<Autoscaling>, Error> {
    let autoscaling = match autoscaling {
        Some(autoscaling) if autoscaling.enabled => autoscaling,
        _ => return Ok(Feature::Absent),
    };

    let max = autoscaling
        .max_replicas
        .ok_or_else(|| Error::schema("spec.autoscaling.maxReplicas", "is required"))?;
    let max_replicas = u32::try_from(max)
        .ok()
        .filter(|max| *max >= 1)
        .ok_or_else(|| {
            Error::schema(
                "spec.autoscaling.maxReplicas",
                format!("{max} must be at least 1"),
            )
        })?;

    let min = autoscaling.min_replicas.unwrap_or(DEFAULT_MIN_REPLICAS);
    let min_replicas = u32::try_from(min).map_err(|_| {
        Error::schema(
            "spec.autoscaling.minReplicas",
            format!("{min} must not be negative"),
        )
    })?;
    if min_replicas > max_replicas {
        return Err(Error::schema(
            "spec.autoscaling.minReplicas",
            format!("{min_replicas} must not exceed maxReplicas ({max_replicas})"),
        ));
    }

    let metric = match autoscaling.metric_binding.as_ref() {
        None => {
            return Err(Error::schema(
                "spec.autoscaling.metricBinding",
                "is required",
            ))
        }
        Some(claim::MetricBinding::MessageLag {
            lag_threshold,
            monitoring_endpoint,
            account,
        }) => {
            let threshold = lag_threshold.unwrap_or(MetricBinding::DEFAULT_LAG_THRESHOLD as i32);
            let lag_threshold = u32::try_from(threshold)
                .ok()
                .filter(|t| *t >= 1)
                .ok_or_else(|| {
                    Error::schema(
                        "spec.autoscaling.metricBinding.lagThreshold",
                        format!("{threshold} must be at least 1"),
                    )
                })?;
            let monitoring_endpoint = required(
                monitoring_endpoint.as_deref(),
                "spec.autoscaling.metricBinding.monitoringEndpoint",
            )?;
            MetricBinding::MessageLag {
                lag_threshold,
                monitoring_endpoint: monitoring_endpoint.to_string(),
                account: account
                    .clone()
                    .unwrap_or_else(|| MetricBinding::DEFAULT_ACCOUNT.to_string()),
            }
        }
        Some(claim::MetricBinding::Cpu { utilization }) => {
            let value = utilization.unwrap_or(MetricBinding::DEFAULT_CPU_UTILIZATION.into());
            let utilization = u8::try_from(value)
                .ok()
                .filter(|u| (1..=100).contains(u))
                .ok_or_else(|| {
                    Error::schema(
                        "spec.autoscaling.metricBinding.utilization",
                        format!("{value} must be a percentage between 1 and 100"),
                    )
                })?;
            MetricBinding::Cpu { utilization }
        }
    };

    Ok(Feature::Included(Autoscaling {
        min_replicas,
        max_replicas,
        metric,
    }))
}

/// Returns the field's value if it is present and not blank.
fn required<'v>(value: Option<&'v str>, field: &str) -> Result<&'v str, Error> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(Error::schema(field, "must not be empty")),
        None => Err(Error::schema(field, "is required")),
    }
}

fn is_dns_label(s: &str) -> bool {
    s.len() <= MAX_LABEL_LEN && DNS_LABEL.is_match(s)
}

fn is_dns_1035_label(s: &str) -> bool {
    s.len() <= MAX_LABEL_LEN && DNS_1035_LABEL.is_match(s)
}

fn is_dns_subdomain(s: &str) -> bool {
    s.len() <= MAX_SUBDOMAIN_LEN
        && s.split('.').all(|label| label.len() <= MAX_LABEL_LEN)
        && DNS_SUBDOMAIN.is_match(s)
}
