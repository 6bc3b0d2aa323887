//! Detection of releases whose selectors reach each other's pods.
//!
//! The analysis works on plain label maps so the same rules apply to live
//! objects fetched from a cluster and to manifests rendered offline.

mod cluster;
mod error;

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::Serialize;
use stamp_base::consts::k8s::labels;
use stamp_identity::{LabelSelector, ResolvedIdentity, is_registry_qualified};

pub use self::{cluster::fetch, error::Error};
use crate::render::Manifest;

/// A Service as far as pod selection is concerned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceTarget {
    pub namespace: String,
    pub name: String,
    pub selector: BTreeMap<String, String>,
}

/// A pod, or the pod template of a workload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PodTarget {
    pub namespace: String,
    /// `kind/name` of the pod or of the workload owning the template.
    pub resource: String,
    pub labels: BTreeMap<String, String>,
    pub images: Vec<String>,
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FindingKind {
    /// A selector matches pods of more than one instance.
    SelectorCollision,
    /// A selector does not constrain `app.kubernetes.io/instance`.
    MissingInstanceSelector,
    NoMatchingPods,
    /// An image without a registry host.
    UnqualifiedImage,
    DuplicateFullName,
    DuplicateLabels,
}

impl FindingKind {
    pub const fn severity(self) -> Severity {
        match self {
            Self::SelectorCollision | Self::DuplicateFullName | Self::DuplicateLabels => {
                Severity::Error
            }
            Self::MissingInstanceSelector | Self::NoMatchingPods | Self::UnqualifiedImage => {
                Severity::Warning
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    pub namespace: String,
    pub resource: String,
    pub message: String,
}

impl Finding {
    fn new(
        kind: FindingKind,
        namespace: &str,
        resource: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            namespace: namespace.to_string(),
            resource: resource.into(),
            message: message.into(),
        }
    }
}

/// Whether any finding must fail the run.
pub fn has_errors(findings: &[Finding]) -> bool {
    findings.iter().any(|finding| finding.severity == Severity::Error)
}

const UNLABELED_INSTANCE: &str = "<unlabeled>";

/// Checks every Service selector against the pods of its namespace and every
/// image for a registry host.
pub fn analyze(services: &[ServiceTarget], pods: &[PodTarget]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for service in services {
        // Services without a selector manage their endpoints themselves.
        if service.selector.is_empty() {
            continue;
        }
        let ServiceTarget { namespace, name, selector } = service;
        let resource = format!("service/{name}");
        let selector = LabelSelector::from(selector.clone());

        if !selector.requires(labels::INSTANCE) {
            findings.push(Finding::new(
                FindingKind::MissingInstanceSelector,
                namespace,
                resource.clone(),
                format!("selector {selector} does not include {}", labels::INSTANCE),
            ));
        }

        let matched = pods
            .iter()
            .filter(|pod| pod.namespace == *namespace && selector.matches(&pod.labels))
            .collect::<Vec<_>>();
        if matched.is_empty() {
            findings.push(Finding::new(
                FindingKind::NoMatchingPods,
                namespace,
                resource,
                format!("selector {selector} matches no pods"),
            ));
            continue;
        }

        let instances = matched
            .iter()
            .map(|pod| pod.labels.get(labels::INSTANCE).map_or(UNLABELED_INSTANCE, String::as_str))
            .collect::<BTreeSet<_>>();
        if instances.len() > 1 {
            let instances = instances.into_iter().collect::<Vec<_>>().join(", ");
            findings.push(Finding::new(
                FindingKind::SelectorCollision,
                namespace,
                resource,
                format!("selector {selector} matches pods of instances {instances}"),
            ));
        }
    }

    for pod in pods {
        for image in pod.images.iter().filter(|image| !is_registry_qualified(image)) {
            findings.push(Finding::new(
                FindingKind::UnqualifiedImage,
                &pod.namespace,
                pod.resource.clone(),
                format!("image {image} has no registry host"),
            ));
        }
    }

    findings
}

/// Reports releases that would share a name or a label set.
pub fn analyze_identities(identities: &[ResolvedIdentity]) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut full_names = BTreeMap::new();
    let mut label_sets = BTreeMap::new();

    for identity in identities {
        let namespace = identity.namespace();
        let instance = identity.labels().instance();
        let resource = format!("release/{instance}");

        if let Some(other) = full_names.insert((namespace, identity.full_name()), instance) {
            findings.push(Finding::new(
                FindingKind::DuplicateFullName,
                namespace,
                resource.clone(),
                format!("full name {} is also used by release {other}", identity.full_name()),
            ));
        }
        if let Some(other) = label_sets.insert((namespace, identity.labels().to_map()), instance) {
            findings.push(Finding::new(
                FindingKind::DuplicateLabels,
                namespace,
                resource,
                format!("labels are identical to those of release {other}"),
            ));
        }
    }

    findings
}

/// Splits rendered manifests into the Services and pod templates they
/// declare.
pub fn targets(manifests: &[Manifest]) -> (Vec<ServiceTarget>, Vec<PodTarget>) {
    let mut services = Vec::new();
    let mut pods = Vec::new();

    for manifest in manifests {
        let metadata = manifest.metadata();
        let namespace = metadata.namespace.clone().unwrap_or_default();
        let name = metadata.name.clone().unwrap_or_default();
        let template = match manifest {
            Manifest::Service(service) => {
                services.push(ServiceTarget {
                    namespace,
                    name,
                    selector: service
                        .spec
                        .as_ref()
                        .and_then(|spec| spec.selector.clone())
                        .unwrap_or_default(),
                });
                continue;
            }
            Manifest::Deployment(deployment) => {
                deployment.spec.as_ref().map(|spec| &spec.template)
            }
            Manifest::DeploymentConfig(deployment_config) => Some(&deployment_config.spec.template),
            _ => None,
        };
        if let Some(template) = template {
            pods.push(PodTarget {
                namespace,
                resource: format!("{}/{name}", manifest.kind().to_lowercase()),
                labels: template
                    .metadata
                    .as_ref()
                    .and_then(|metadata| metadata.labels.clone())
                    .unwrap_or_default(),
                images: template
                    .spec
                    .iter()
                    .flat_map(|spec| &spec.containers)
                    .filter_map(|container| container.image.clone())
                    .collect(),
            });
        }
    }

    (services, pods)
}
