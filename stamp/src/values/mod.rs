//! Chart values: the operator-facing configuration of a release.
//!
//! Values are layered the way Helm layers them. The built-in defaults come
//! first, then every values file in order, then every `--set` expression.
//! Apart from the name overrides, which feed the identity resolver, every
//! option is passed through to the resource it configures.

mod error;
mod overrides;

use std::{collections::BTreeMap, path::PathBuf};

use k8s_openapi::{
    api::core::v1::{EnvVar, HTTPGetAction, Probe, ResourceRequirements},
    apimachinery::pkg::{api::resource::Quantity, util::intstr::IntOrString},
};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use snafu::{ResultExt, ensure};
use stamp_base::consts::{DEFAULT_SERVICE_PORT, HEALTH_CHECK_PATH, HTTP_PORT_NAME};
use stamp_identity::{ImageConfig, Registry};

pub use self::{error::Error, overrides::SetOverride};
use crate::config::ImagePullPolicy;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Values {
    #[serde(default)]
    pub name_override: String,

    #[serde(default)]
    pub fullname_override: String,

    #[serde(default = "Values::default_replica_count")]
    pub replica_count: i32,

    #[serde(default)]
    pub build: BuildValues,

    #[serde(default)]
    pub image: ImageValues,

    #[serde(default)]
    pub workload: WorkloadValues,

    #[serde(default)]
    pub service: ServiceValues,

    #[serde(default)]
    pub route: RouteValues,

    #[serde(default = "Values::default_resources")]
    pub resources: ResourceRequirements,

    #[serde(default = "Values::default_liveness_probe")]
    pub liveness_probe: Probe,

    #[serde(default = "Values::default_readiness_probe")]
    pub readiness_probe: Probe,

    #[serde(default)]
    pub autoscaling: AutoscalingValues,

    #[serde(default)]
    pub env: Vec<EnvVar>,
}

impl Default for Values {
    fn default() -> Self {
        Self {
            name_override: String::new(),
            fullname_override: String::new(),
            replica_count: Self::default_replica_count(),
            build: BuildValues::default(),
            image: ImageValues::default(),
            workload: WorkloadValues::default(),
            service: ServiceValues::default(),
            route: RouteValues::default(),
            resources: Self::default_resources(),
            liveness_probe: Self::default_liveness_probe(),
            readiness_probe: Self::default_readiness_probe(),
            autoscaling: AutoscalingValues::default(),
            env: Vec::new(),
        }
    }
}

impl Values {
    const fn default_replica_count() -> i32 { 1 }

    fn default_resources() -> ResourceRequirements {
        let quantities = |cpu: &str, memory: &str| {
            BTreeMap::from([
                ("cpu".to_string(), Quantity(cpu.to_string())),
                ("memory".to_string(), Quantity(memory.to_string())),
            ])
        };
        ResourceRequirements {
            limits: Some(quantities("500m", "512Mi")),
            requests: Some(quantities("100m", "256Mi")),
            ..ResourceRequirements::default()
        }
    }

    fn health_probe(initial_delay_seconds: i32, failure_threshold: i32) -> Probe {
        Probe {
            http_get: Some(HTTPGetAction {
                path: Some(HEALTH_CHECK_PATH.to_string()),
                port: IntOrString::String(HTTP_PORT_NAME.to_string()),
                ..HTTPGetAction::default()
            }),
            initial_delay_seconds: Some(initial_delay_seconds),
            period_seconds: Some(10),
            timeout_seconds: Some(3),
            failure_threshold: Some(failure_threshold),
            ..Probe::default()
        }
    }

    // Spring Boot needs time to start; liveness waits longer than readiness
    // so a slow start is not restarted in a loop.
    fn default_liveness_probe() -> Probe { Self::health_probe(60, 3) }

    fn default_readiness_probe() -> Probe { Self::health_probe(20, 6) }

    /// Builds the values of a release from the defaults, `files` and
    /// `overrides`.
    pub fn load(files: &[PathBuf], overrides: &[SetOverride]) -> Result<Self, Error> {
        let mut document = serde_yaml::to_value(Self::default()).context(error::ApplyValuesSnafu)?;
        for filename in files {
            let data = std::fs::read(filename)
                .context(error::OpenValuesSnafu { filename: filename.clone() })?;
            let overlay = serde_yaml::from_slice::<serde_yaml::Value>(&data)
                .context(error::ParseValuesSnafu { filename: filename.clone() })?;
            tracing::debug!("Merging values from {}", filename.display());
            overrides::merge(&mut document, overlay);
        }
        for set in overrides {
            set.apply(&mut document);
        }
        let values: Self = serde_yaml::from_value(document).context(error::ApplyValuesSnafu)?;
        values.validate()?;
        Ok(values)
    }

    /// Checks the constraints the resource schemas cannot express.
    pub fn validate(&self) -> Result<(), Error> {
        ensure!(
            self.replica_count >= 0,
            error::InvalidValueSnafu {
                path: "replicaCount",
                message: format!("must not be negative, got {}", self.replica_count)
            }
        );
        ensure!(
            self.service.port != 0,
            error::InvalidValueSnafu { path: "service.port", message: "must not be 0" }
        );
        ensure!(
            !self.build.enabled || !self.build.git.uri.trim().is_empty(),
            error::InvalidValueSnafu {
                path: "build.git.uri",
                message: "is required when build.enabled is true"
            }
        );
        ensure!(
            !self.output_image_stream().is_some_and(|stream| stream.contains(['/', ':'])),
            error::InvalidValueSnafu {
                path: "build.outputImageStream",
                message: "must be an image stream name without registry, namespace or tag"
            }
        );
        let AutoscalingValues { enabled, min_replicas, max_replicas, .. } = self.autoscaling;
        ensure!(
            !enabled || (1..=max_replicas).contains(&min_replicas),
            error::InvalidValueSnafu {
                path: "autoscaling.minReplicas",
                message: format!("must be between 1 and maxReplicas ({max_replicas})")
            }
        );
        Ok(())
    }

    /// The image stream the build pushes to when it is not the release's own.
    pub fn output_image_stream(&self) -> Option<&str> {
        self.build.output_image_stream.as_deref().map(str::trim).filter(|stream| !stream.is_empty())
    }

    /// Where the image of the release comes from, pushed to or pulled from
    /// `registry`. Without `image.repository` the workload pulls from the
    /// output image stream, so it runs what the build pushed.
    pub fn image_config(&self, registry: &Registry) -> ImageConfig {
        let repository = self
            .image
            .repository
            .as_deref()
            .map(str::trim)
            .filter(|repository| !repository.is_empty())
            .or_else(|| self.output_image_stream())
            .map(ToString::to_string);
        ImageConfig { registry: registry.clone(), repository, tag: self.image.tag.clone() }
    }

    /// The values document printed by `default-values`.
    pub fn template_basic() -> Vec<u8> {
        serde_yaml::to_string(&Self::default()).unwrap_or_default().into_bytes()
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildValues {
    #[serde(default = "BuildValues::default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub git: GitValues,

    #[serde(default)]
    pub strategy: BuildStrategy,

    /// Builder image of the `Source` strategy.
    #[serde(default = "BuildValues::default_builder_image")]
    pub builder_image: String,

    /// Image stream the build pushes to. Defaults to the release's own.
    #[serde(default)]
    pub output_image_stream: Option<String>,
}

impl Default for BuildValues {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            git: GitValues::default(),
            strategy: BuildStrategy::default(),
            builder_image: Self::default_builder_image(),
            output_image_stream: None,
        }
    }
}

impl BuildValues {
    const fn default_enabled() -> bool { true }

    fn default_builder_image() -> String {
        "registry.access.redhat.com/ubi8/openjdk-17:latest".to_string()
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitValues {
    #[serde(default = "GitValues::default_uri")]
    pub uri: String,

    #[serde(rename = "ref", default = "GitValues::default_ref")]
    pub reference: String,

    #[serde(default)]
    pub context_dir: Option<String>,
}

impl Default for GitValues {
    fn default() -> Self {
        Self { uri: Self::default_uri(), reference: Self::default_ref(), context_dir: None }
    }
}

impl GitValues {
    fn default_uri() -> String { "https://github.com/spring-guides/gs-spring-boot.git".to_string() }

    fn default_ref() -> String { "main".to_string() }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum BuildStrategy {
    #[default]
    Source,
    Docker,
}

impl BuildStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "Source",
            Self::Docker => "Docker",
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageValues {
    /// Pulled instead of the image the build produces.
    #[serde(default, deserialize_with = "scalar_string")]
    pub repository: Option<String>,

    /// `--set image.tag=20` reads a number; it is kept as the tag `20`.
    #[serde(default, deserialize_with = "scalar_string")]
    pub tag: Option<String>,

    #[serde(default)]
    pub pull_policy: ImagePullPolicy,
}

/// Reads a string option that may have been written as a bare number or
/// boolean.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(value)) => Ok(Some(value)),
        Some(serde_yaml::Value::Number(value)) => Ok(Some(value.to_string())),
        Some(serde_yaml::Value::Bool(value)) => Ok(Some(value.to_string())),
        Some(_) => Err(D::Error::custom("expected a string, found a mapping or a sequence")),
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadValues {
    #[serde(default)]
    pub kind: WorkloadKind,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum WorkloadKind {
    #[default]
    Deployment,
    DeploymentConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceValues {
    #[serde(rename = "type", default = "ServiceValues::default_type")]
    pub service_type: String,

    /// Both the Service port and the container port.
    #[serde(default = "ServiceValues::default_port")]
    pub port: u16,
}

impl Default for ServiceValues {
    fn default() -> Self { Self { service_type: Self::default_type(), port: Self::default_port() } }
}

impl ServiceValues {
    fn default_type() -> String { "ClusterIP".to_string() }

    const fn default_port() -> u16 { DEFAULT_SERVICE_PORT }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteValues {
    #[serde(default = "RouteValues::default_enabled")]
    pub enabled: bool,

    /// Left to the router when unset.
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub tls: RouteTlsValues,
}

impl Default for RouteValues {
    fn default() -> Self {
        Self { enabled: Self::default_enabled(), host: None, path: None, tls: RouteTlsValues::default() }
    }
}

impl RouteValues {
    const fn default_enabled() -> bool { true }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTlsValues {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub termination: TlsTermination,

    #[serde(default = "RouteTlsValues::default_insecure_policy")]
    pub insecure_edge_termination_policy: String,
}

impl Default for RouteTlsValues {
    fn default() -> Self {
        Self {
            enabled: false,
            termination: TlsTermination::default(),
            insecure_edge_termination_policy: Self::default_insecure_policy(),
        }
    }
}

impl RouteTlsValues {
    fn default_insecure_policy() -> String { "Redirect".to_string() }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsTermination {
    #[default]
    Edge,
    Passthrough,
    Reencrypt,
}

impl TlsTermination {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Edge => "edge",
            Self::Passthrough => "passthrough",
            Self::Reencrypt => "reencrypt",
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalingValues {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "AutoscalingValues::default_min_replicas")]
    pub min_replicas: i32,

    #[serde(default = "AutoscalingValues::default_max_replicas")]
    pub max_replicas: i32,

    #[serde(
        rename = "targetCPUUtilizationPercentage",
        default = "AutoscalingValues::default_target_cpu"
    )]
    pub target_cpu_utilization_percentage: Option<i32>,
}

impl Default for AutoscalingValues {
    fn default() -> Self {
        Self {
            enabled: false,
            min_replicas: Self::default_min_replicas(),
            max_replicas: Self::default_max_replicas(),
            target_cpu_utilization_percentage: Self::default_target_cpu(),
        }
    }
}

impl AutoscalingValues {
    const fn default_min_replicas() -> i32 { 1 }

    const fn default_max_replicas() -> i32 { 3 }

    const fn default_target_cpu() -> Option<i32> { Some(80) }
}

#[cfg(test)]
mod tests {
    use tempfile::{TempDir, tempdir};

    use super::*;

    fn write_values(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let values = Values::load(&[], &[]).unwrap();
        assert_eq!(values, Values::default());
        assert_eq!(values.service.port, 8080);
        assert_eq!(values.workload.kind, WorkloadKind::Deployment);
        assert_eq!(values.build.strategy, BuildStrategy::Source);
        assert!(values.route.enabled);
        assert!(!values.autoscaling.enabled);

        let http_get = values.liveness_probe.http_get.unwrap();
        assert_eq!(http_get.path.as_deref(), Some("/actuator/health"));
        assert_eq!(http_get.port, IntOrString::String("http".to_string()));
    }

    #[test]
    fn test_probe_overrides_merge_with_defaults() {
        let dir = tempdir().unwrap();
        let path = write_values(&dir, "values.yaml", "livenessProbe:\n  initialDelaySeconds: 120\n");
        let values = Values::load(&[path], &[]).unwrap();

        assert_eq!(values.liveness_probe.initial_delay_seconds, Some(120));
        assert_eq!(
            values.liveness_probe.http_get.and_then(|http_get| http_get.path).as_deref(),
            Some("/actuator/health")
        );
        assert_eq!(values.readiness_probe, Values::default_readiness_probe());
    }

    #[test]
    fn test_files_then_set_overrides() {
        let dir = tempdir().unwrap();
        let path = write_values(
            &dir,
            "values.yaml",
            "build:\n  git:\n    uri: https://git.example.com/app.git\n    ref: develop\n  \
             strategy: Docker\nworkload:\n  kind: DeploymentConfig\nservice:\n  port: 9090\n",
        );
        let overrides = [
            "service.port=8081".parse::<SetOverride>().unwrap(),
            "route.host=app.apps.example.com".parse::<SetOverride>().unwrap(),
            SetOverride::parse_string("image.tag=1.0").unwrap(),
        ];
        let values = Values::load(&[path], &overrides).unwrap();

        assert_eq!(values.build.git.uri, "https://git.example.com/app.git");
        assert_eq!(values.build.git.reference, "develop");
        assert_eq!(values.build.strategy, BuildStrategy::Docker);
        assert_eq!(values.workload.kind, WorkloadKind::DeploymentConfig);
        assert_eq!(values.service.port, 8081);
        assert_eq!(values.route.host.as_deref(), Some("app.apps.example.com"));
        assert_eq!(values.image.tag.as_deref(), Some("1.0"));
    }

    #[test]
    fn test_null_removes_default_limits() {
        let overrides = ["resources.limits.cpu=null".parse::<SetOverride>().unwrap()];
        let values = Values::load(&[], &overrides).unwrap();
        let limits = values.resources.limits.unwrap();
        assert!(!limits.contains_key("cpu"));
        assert!(limits.contains_key("memory"));
    }

    #[test]
    fn test_numeric_image_tag() {
        let overrides = ["image.tag=20".parse::<SetOverride>().unwrap()];
        let values = Values::load(&[], &overrides).unwrap();
        assert_eq!(values.image.tag.as_deref(), Some("20"));

        let dir = tempdir().unwrap();
        let path = write_values(&dir, "values.yaml", "image:\n  tag: 7\n  repository: ~\n");
        let values = Values::load(&[path], &[]).unwrap();
        assert_eq!(values.image.tag.as_deref(), Some("7"));
        assert_eq!(values.image.repository, None);

        let overrides = ["image.tag.major=1".parse::<SetOverride>().unwrap()];
        assert!(matches!(Values::load(&[], &overrides), Err(Error::ApplyValues { .. })));
    }

    #[test]
    fn test_later_files_win() {
        let dir = tempdir().unwrap();
        let base = write_values(&dir, "base.yaml", "service:\n  port: 9090\n");
        let prod = write_values(&dir, "prod.yaml", "service:\n  port: 9091\n");
        let values = Values::load(&[base.clone(), prod.clone()], &[]).unwrap();
        assert_eq!(values.service.port, 9091);

        let values = Values::load(&[prod, base], &[]).unwrap();
        assert_eq!(values.service.port, 9090);
    }

    #[test]
    fn test_missing_values_file() {
        let err = Values::load(&[PathBuf::from("/nonexistent/values.yaml")], &[]).unwrap_err();
        assert!(matches!(err, Error::OpenValues { .. }));
    }

    #[test]
    fn test_validation() {
        let overrides = ["replicaCount=-1".parse::<SetOverride>().unwrap()];
        assert!(matches!(
            Values::load(&[], &overrides),
            Err(Error::InvalidValue { path: "replicaCount", .. })
        ));

        let overrides = ["build.git.uri=".parse::<SetOverride>().unwrap()];
        assert!(matches!(
            Values::load(&[], &overrides),
            Err(Error::InvalidValue { path: "build.git.uri", .. })
        ));

        let overrides = [
            "build.enabled=false".parse::<SetOverride>().unwrap(),
            "build.git.uri=".parse::<SetOverride>().unwrap(),
        ];
        assert!(Values::load(&[], &overrides).is_ok());

        let overrides = [
            "autoscaling.enabled=true".parse::<SetOverride>().unwrap(),
            "autoscaling.minReplicas=5".parse::<SetOverride>().unwrap(),
        ];
        assert!(matches!(
            Values::load(&[], &overrides),
            Err(Error::InvalidValue { path: "autoscaling.minReplicas", .. })
        ));
    }

    #[test]
    fn test_image_config_follows_output_image_stream() {
        let registry = Registry::default();
        let overrides = ["build.outputImageStream=shared".parse::<SetOverride>().unwrap()];
        let values = Values::load(&[], &overrides).unwrap();
        assert_eq!(values.image_config(&registry).repository.as_deref(), Some("shared"));

        let overrides = [
            "build.outputImageStream=shared".parse::<SetOverride>().unwrap(),
            "image.repository=quay.io/acme/app".parse::<SetOverride>().unwrap(),
        ];
        let values = Values::load(&[], &overrides).unwrap();
        assert_eq!(values.image_config(&registry).repository.as_deref(), Some("quay.io/acme/app"));

        assert_eq!(Values::default().image_config(&registry).repository, None);

        let overrides = ["build.outputImageStream=ns2/shared".parse::<SetOverride>().unwrap()];
        assert!(matches!(
            Values::load(&[], &overrides),
            Err(Error::InvalidValue { path: "build.outputImageStream", .. })
        ));
    }

    #[test]
    fn test_template_parses_back() {
        let template = String::from_utf8(Values::template_basic()).unwrap();
        let values: Values = serde_yaml::from_str(&template).unwrap();
        assert_eq!(values, Values::default());
    }
}
