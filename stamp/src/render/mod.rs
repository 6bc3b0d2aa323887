//! Typed manifests for one release.
//!
//! Every builder reads names, labels, selectors and the image from the
//! [`ResolvedIdentity`]; none of them derives an identity of its own.

mod autoscaler;
mod error;
mod image_build;
mod network;
mod openshift;
mod workload;

use k8s_openapi::api::{
    apps::v1::Deployment, autoscaling::v2::HorizontalPodAutoscaler, core::v1::Service,
};
use kube::api::ObjectMeta;
use serde::Serialize;
use snafu::ResultExt;
use stamp_base::consts::DEFAULT_IMAGE_TAG;
use stamp_identity::ResolvedIdentity;

pub use self::error::Error;
use self::openshift::{BuildConfig, DeploymentConfig, ImageStream, Route};
use crate::values::{Values, WorkloadKind};

/// One rendered resource. Serializes as the resource itself.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Manifest {
    ImageStream(Box<ImageStream>),
    BuildConfig(Box<BuildConfig>),
    Deployment(Box<Deployment>),
    DeploymentConfig(Box<DeploymentConfig>),
    Service(Box<Service>),
    Route(Box<Route>),
    HorizontalPodAutoscaler(Box<HorizontalPodAutoscaler>),
}

impl Manifest {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ImageStream(_) => "ImageStream",
            Self::BuildConfig(_) => "BuildConfig",
            Self::Deployment(_) => "Deployment",
            Self::DeploymentConfig(_) => "DeploymentConfig",
            Self::Service(_) => "Service",
            Self::Route(_) => "Route",
            Self::HorizontalPodAutoscaler(_) => "HorizontalPodAutoscaler",
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::ImageStream(image_stream) => &image_stream.metadata,
            Self::BuildConfig(build_config) => &build_config.metadata,
            Self::Deployment(deployment) => &deployment.metadata,
            Self::DeploymentConfig(deployment_config) => &deployment_config.metadata,
            Self::Service(service) => &service.metadata,
            Self::Route(route) => &route.metadata,
            Self::HorizontalPodAutoscaler(autoscaler) => &autoscaler.metadata,
        }
    }
}

/// Output encodings of a render pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum Format {
    /// `---` separated YAML documents.
    #[default]
    Yaml,
    /// A `v1` `List` holding every manifest.
    Json,
}

pub(crate) fn object_meta(identity: &ResolvedIdentity) -> ObjectMeta {
    ObjectMeta {
        name: Some(identity.full_name().to_string()),
        namespace: Some(identity.namespace().to_string()),
        labels: Some(identity.labels().to_map()),
        ..ObjectMeta::default()
    }
}

/// Renders the resources of the release `identity` names, in apply order.
pub fn render(identity: &ResolvedIdentity, values: &Values) -> Vec<Manifest> {
    let stream = values.output_image_stream().unwrap_or_else(|| identity.full_name());
    let tag = identity.image_reference().tag().unwrap_or(DEFAULT_IMAGE_TAG);
    let image_stream_tag = format!("{stream}:{tag}");

    let mut manifests =
        vec![Manifest::ImageStream(Box::new(image_build::image_stream(identity, stream)))];
    if values.build.enabled {
        manifests.push(Manifest::BuildConfig(Box::new(image_build::build_config(
            identity,
            values,
            &image_stream_tag,
        ))));
    }
    manifests.push(match values.workload.kind {
        WorkloadKind::Deployment => {
            Manifest::Deployment(Box::new(workload::deployment(identity, values)))
        }
        WorkloadKind::DeploymentConfig => Manifest::DeploymentConfig(Box::new(
            workload::deployment_config(identity, values, &image_stream_tag),
        )),
    });
    manifests.push(Manifest::Service(Box::new(network::service(identity, values))));
    if values.route.enabled {
        manifests.push(Manifest::Route(Box::new(network::route(identity, values))));
    }
    if values.autoscaling.enabled {
        manifests.push(Manifest::HorizontalPodAutoscaler(Box::new(
            autoscaler::horizontal_pod_autoscaler(identity, values),
        )));
    }

    tracing::debug!("Rendered {} manifests for {}", manifests.len(), identity.full_name());
    manifests
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct List<'a> {
    api_version: &'static str,
    kind: &'static str,
    items: &'a [Manifest],
}

/// Encodes `manifests` for output.
pub fn serialize(manifests: &[Manifest], format: Format) -> Result<String, Error> {
    match format {
        Format::Yaml => manifests.iter().try_fold(String::new(), |mut output, manifest| {
            let document = serde_yaml::to_string(manifest)
                .context(error::SerializeYamlSnafu { kind: manifest.kind() })?;
            output.push_str("---\n");
            output.push_str(&document);
            Ok(output)
        }),
        Format::Json => {
            let list = List { api_version: "v1", kind: "List", items: manifests };
            serde_json::to_string_pretty(&list)
                .map(|mut output| {
                    output.push('\n');
                    output
                })
                .context(error::SerializeJsonSnafu)
        }
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
    use stamp_identity::{ChartIdentity, ImageConfig, ReleaseIdentity};

    use super::*;
    use crate::values::SetOverride;

    fn identity(release: &str) -> ResolvedIdentity {
        let chart = ChartIdentity::new("springboot-ocdemo").unwrap();
        let release = ReleaseIdentity::new(release, "ns1").unwrap();
        stamp_identity::resolve(&chart, &release, &ImageConfig::default()).unwrap()
    }

    fn values(overrides: &[&str]) -> Values {
        let overrides =
            overrides.iter().map(|set| set.parse::<SetOverride>().unwrap()).collect::<Vec<_>>();
        Values::load(&[], &overrides).unwrap()
    }

    fn kinds(manifests: &[Manifest]) -> Vec<&'static str> {
        manifests.iter().map(Manifest::kind).collect()
    }

    #[test]
    fn test_default_manifest_set() {
        let identity = identity("app1");
        let manifests = render(&identity, &values(&[]));
        assert_eq!(
            kinds(&manifests),
            ["ImageStream", "BuildConfig", "Deployment", "Service", "Route"]
        );
        for manifest in &manifests {
            let metadata = manifest.metadata();
            assert_eq!(metadata.name.as_deref(), Some("app1-springboot-ocdemo"));
            assert_eq!(metadata.namespace.as_deref(), Some("ns1"));
            assert_eq!(metadata.labels.as_ref(), Some(&identity.labels().to_map()));
        }
    }

    #[test]
    fn test_optional_manifests() {
        let manifests = render(
            &identity("app1"),
            &values(&[
                "build.enabled=false",
                "route.enabled=false",
                "autoscaling.enabled=true",
                "workload.kind=DeploymentConfig",
            ]),
        );
        assert_eq!(
            kinds(&manifests),
            ["ImageStream", "DeploymentConfig", "Service", "HorizontalPodAutoscaler"]
        );
    }

    #[test]
    fn test_selectors_and_image_agree() {
        let identity = identity("app1");
        let manifests = render(&identity, &values(&[]));

        let Some(Manifest::Deployment(deployment)) =
            manifests.iter().find(|manifest| matches!(manifest, Manifest::Deployment(_)))
        else {
            panic!("no deployment rendered");
        };
        let Some(Manifest::Service(service)) =
            manifests.iter().find(|manifest| matches!(manifest, Manifest::Service(_)))
        else {
            panic!("no service rendered");
        };

        let spec = deployment.spec.as_ref().unwrap();
        let match_labels = spec.selector.match_labels.as_ref().unwrap();
        let service_selector = service.spec.as_ref().unwrap().selector.as_ref().unwrap();
        let template_labels = spec.template.metadata.as_ref().unwrap().labels.as_ref().unwrap();

        assert_eq!(match_labels, identity.selector().as_map());
        assert_eq!(service_selector, match_labels);
        assert!(identity.selector().matches(template_labels));
        assert_eq!(template_labels.get("app.kubernetes.io/instance").map(String::as_str), Some("app1"));

        let container = &spec.template.spec.as_ref().unwrap().containers[0];
        assert_eq!(container.image.as_deref(), Some(identity.image_reference().to_string().as_str()));
        assert_eq!(spec.replicas, Some(1));
    }

    #[test]
    fn test_releases_do_not_select_each_other() {
        let app1 = identity("app1");
        let app2 = identity("app2");
        let pods = render(&app2, &values(&[]));
        let Some(Manifest::Deployment(deployment)) =
            pods.iter().find(|manifest| matches!(manifest, Manifest::Deployment(_)))
        else {
            panic!("no deployment rendered");
        };
        let labels = deployment
            .spec
            .as_ref()
            .and_then(|spec| spec.template.metadata.as_ref())
            .and_then(|metadata| metadata.labels.as_ref())
            .unwrap();
        assert!(!app1.selector().matches(labels));
        assert!(app2.selector().matches(labels));
    }

    #[test]
    fn test_deployment_config_triggers() {
        let identity = identity("app1");
        let manifests = render(&identity, &values(&["workload.kind=DeploymentConfig"]));
        let Some(Manifest::DeploymentConfig(deployment_config)) =
            manifests.iter().find(|manifest| matches!(manifest, Manifest::DeploymentConfig(_)))
        else {
            panic!("no deployment config rendered");
        };
        let spec = &deployment_config.spec;
        assert_eq!(&spec.selector, identity.selector().as_map());

        let triggers = spec.triggers.iter().map(|trigger| trigger.type_.as_str()).collect::<Vec<_>>();
        assert_eq!(triggers, ["ConfigChange", "ImageChange"]);
        let params = spec.triggers[1].image_change_params.as_ref().unwrap();
        assert_eq!(params.from.name.as_deref(), Some("app1-springboot-ocdemo:latest"));
        assert_eq!(params.container_names, ["springboot-ocdemo"]);
    }

    #[test]
    fn test_build_config_output() {
        let manifests = render(
            &identity("app1"),
            &values(&["build.strategy=Docker", "build.outputImageStream=shared"]),
        );
        let Some(Manifest::BuildConfig(build_config)) =
            manifests.iter().find(|manifest| matches!(manifest, Manifest::BuildConfig(_)))
        else {
            panic!("no build config rendered");
        };
        assert_eq!(build_config.spec.output.to.kind.as_deref(), Some("ImageStreamTag"));
        assert_eq!(build_config.spec.output.to.name.as_deref(), Some("shared:latest"));
        assert_eq!(build_config.spec.strategy.type_, "Docker");
        assert!(build_config.spec.strategy.source_strategy.is_none());
        assert_eq!(build_config.spec.source.git.ref_.as_deref(), Some("main"));
    }

    #[test]
    fn test_workload_pulls_what_the_build_pushes() {
        let values = values(&["build.outputImageStream=shared", "image.tag=v2"]);
        let chart = ChartIdentity::new("springboot-ocdemo").unwrap();
        let release = ReleaseIdentity::new("app1", "ns1").unwrap();
        let identity = stamp_identity::resolve(
            &chart,
            &release,
            &values.image_config(&stamp_identity::Registry::default()),
        )
        .unwrap();
        let manifests = render(&identity, &values);

        let Some(Manifest::ImageStream(image_stream)) = manifests.first() else {
            panic!("no image stream rendered");
        };
        assert_eq!(image_stream.metadata.name.as_deref(), Some("shared"));

        let Some(Manifest::BuildConfig(build_config)) =
            manifests.iter().find(|manifest| matches!(manifest, Manifest::BuildConfig(_)))
        else {
            panic!("no build config rendered");
        };
        assert_eq!(build_config.spec.output.to.name.as_deref(), Some("shared:v2"));

        let Some(Manifest::Deployment(deployment)) =
            manifests.iter().find(|manifest| matches!(manifest, Manifest::Deployment(_)))
        else {
            panic!("no deployment rendered");
        };
        let container = &deployment.spec.as_ref().unwrap().template.spec.as_ref().unwrap().containers[0];
        assert_eq!(
            container.image.as_deref(),
            Some("image-registry.openshift-image-registry.svc:5000/ns1/shared:v2")
        );
        // The Deployment and the rest of the release keep the release's name.
        assert_eq!(deployment.metadata.name.as_deref(), Some("app1-springboot-ocdemo"));
    }

    #[test]
    fn test_autoscaler_targets_workload() {
        let manifests = render(&identity("app1"), &values(&["autoscaling.enabled=true"]));
        let Some(Manifest::HorizontalPodAutoscaler(autoscaler)) = manifests.last() else {
            panic!("no autoscaler rendered");
        };
        let spec = autoscaler.spec.as_ref().unwrap();
        assert_eq!(spec.scale_target_ref.kind, "Deployment");
        assert_eq!(spec.scale_target_ref.name, "app1-springboot-ocdemo");
        assert_eq!(spec.max_replicas, 3);

        let Some(Manifest::Deployment(deployment)) = manifests.get(2) else {
            panic!("no deployment rendered");
        };
        assert_eq!(deployment.spec.as_ref().unwrap().replicas, None);
    }

    #[test]
    fn test_route() {
        let manifests = render(
            &identity("app1"),
            &values(&["route.host=app1.apps.example.com", "route.tls.enabled=true"]),
        );
        let Some(Manifest::Route(route)) =
            manifests.iter().find(|manifest| matches!(manifest, Manifest::Route(_)))
        else {
            panic!("no route rendered");
        };
        assert_eq!(route.spec.host.as_deref(), Some("app1.apps.example.com"));
        assert_eq!(route.spec.to.name, "app1-springboot-ocdemo");
        assert_eq!(route.spec.port.target_port, IntOrString::String("http".to_string()));
        let tls = route.spec.tls.as_ref().unwrap();
        assert_eq!(tls.termination, "edge");
        assert_eq!(tls.insecure_edge_termination_policy.as_deref(), Some("Redirect"));
    }

    #[test]
    fn test_serialize_yaml_documents() {
        let manifests = render(&identity("app1"), &values(&[]));
        let output = serialize(&manifests, Format::Yaml).unwrap();
        assert_eq!(output.matches("---\n").count(), manifests.len());
        assert!(output.contains("apiVersion: image.openshift.io/v1\n"));
        assert!(output.contains("kind: Deployment\n"));
        assert!(output.contains("app.kubernetes.io/instance: app1\n"));
    }

    #[test]
    fn test_serialize_json_list() {
        let manifests = render(&identity("app1"), &values(&[]));
        let output = serialize(&manifests, Format::Json).unwrap();
        let list: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(list["kind"], "List");
        assert_eq!(list["items"].as_array().unwrap().len(), manifests.len());
        assert_eq!(list["items"][0]["kind"], "ImageStream");
        assert_eq!(list["items"][2]["apiVersion"], "apps/v1");
        assert_eq!(
            list["items"][2]["spec"]["template"]["spec"]["containers"][0]["image"],
            "image-registry.openshift-image-registry.svc:5000/ns1/app1-springboot-ocdemo:latest"
        );
    }
}
