//! The OpenShift resource kinds `k8s-openapi` does not cover, reduced to the
//! fields a release sets.

use std::collections::BTreeMap;

use k8s_openapi::{
    api::core::v1::{ObjectReference, PodTemplateSpec},
    apimachinery::pkg::{apis::meta::v1::ObjectMeta, util::intstr::IntOrString},
};
use kube::core::TypeMeta;
use serde::{Deserialize, Serialize};

fn type_meta(api_version: &str, kind: &str) -> TypeMeta {
    TypeMeta { api_version: api_version.to_string(), kind: kind.to_string() }
}

/// `image.openshift.io/v1` `ImageStream`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ImageStream {
    #[serde(flatten)]
    pub types: TypeMeta,
    pub metadata: ObjectMeta,
    pub spec: ImageStreamSpec,
}

impl ImageStream {
    pub fn new(metadata: ObjectMeta, spec: ImageStreamSpec) -> Self {
        Self { types: type_meta("image.openshift.io/v1", "ImageStream"), metadata, spec }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStreamSpec {
    pub lookup_policy: ImageLookupPolicy,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ImageLookupPolicy {
    pub local: bool,
}

/// `build.openshift.io/v1` `BuildConfig`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BuildConfig {
    #[serde(flatten)]
    pub types: TypeMeta,
    pub metadata: ObjectMeta,
    pub spec: BuildConfigSpec,
}

impl BuildConfig {
    pub fn new(metadata: ObjectMeta, spec: BuildConfigSpec) -> Self {
        Self { types: type_meta("build.openshift.io/v1", "BuildConfig"), metadata, spec }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfigSpec {
    pub source: BuildSource,
    pub strategy: BuildStrategySpec,
    pub output: BuildOutput,
    pub triggers: Vec<TriggerPolicy>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSource {
    #[serde(rename = "type")]
    pub type_: String,
    pub git: GitBuildSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_dir: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GitBuildSource {
    pub uri: String,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub ref_: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStrategySpec {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_strategy: Option<StrategyFrom>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_strategy: Option<BTreeMap<String, String>>,
}

/// The `from` image of a source build.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StrategyFrom {
    pub from: ObjectReference,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BuildOutput {
    pub to: ObjectReference,
}

/// A `triggers` entry of a `BuildConfig` or a `DeploymentConfig`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPolicy {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_change_params: Option<ImageChangeParams>,
}

impl TriggerPolicy {
    pub fn config_change() -> Self {
        Self { type_: "ConfigChange".to_string(), image_change_params: None }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageChangeParams {
    pub automatic: bool,
    pub container_names: Vec<String>,
    pub from: ObjectReference,
}

/// `apps.openshift.io/v1` `DeploymentConfig`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DeploymentConfig {
    #[serde(flatten)]
    pub types: TypeMeta,
    pub metadata: ObjectMeta,
    pub spec: DeploymentConfigSpec,
}

impl DeploymentConfig {
    pub const API_VERSION: &'static str = "apps.openshift.io/v1";

    pub fn new(metadata: ObjectMeta, spec: DeploymentConfigSpec) -> Self {
        Self { types: type_meta(Self::API_VERSION, "DeploymentConfig"), metadata, spec }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    /// Unlike `apps/v1` this is a plain label map.
    pub selector: BTreeMap<String, String>,
    pub template: PodTemplateSpec,
    pub triggers: Vec<TriggerPolicy>,
}

/// `route.openshift.io/v1` `Route`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Route {
    #[serde(flatten)]
    pub types: TypeMeta,
    pub metadata: ObjectMeta,
    pub spec: RouteSpec,
}

impl Route {
    pub fn new(metadata: ObjectMeta, spec: RouteSpec) -> Self {
        Self { types: type_meta("route.openshift.io/v1", "Route"), metadata, spec }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub to: RouteTarget,
    pub port: RoutePort,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<RouteTls>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RouteTarget {
    pub kind: String,
    pub name: String,
    pub weight: i32,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePort {
    pub target_port: IntOrString,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTls {
    pub termination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure_edge_termination_policy: Option<String>,
}
