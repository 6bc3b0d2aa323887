use k8s_openapi::{
    api::{
        apps::v1::{Deployment, DeploymentSpec},
        core::v1::{Container, ContainerPort, ObjectReference, PodSpec, PodTemplateSpec},
    },
    apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta},
};
use stamp_base::consts::HTTP_PORT_NAME;
use stamp_identity::ResolvedIdentity;

use crate::{
    render::{
        object_meta,
        openshift::{DeploymentConfig, DeploymentConfigSpec, ImageChangeParams, TriggerPolicy},
    },
    values::Values,
};

/// Replicas are left to the autoscaler when one is rendered.
fn replicas(values: &Values) -> Option<i32> {
    (!values.autoscaling.enabled).then_some(values.replica_count)
}

pub fn pod_template(identity: &ResolvedIdentity, values: &Values) -> PodTemplateSpec {
    let container = Container {
        name: identity.labels().name().to_string(),
        image: Some(identity.image_reference().to_string()),
        image_pull_policy: Some(values.image.pull_policy.to_string()),
        ports: Some(vec![ContainerPort {
            name: Some(HTTP_PORT_NAME.to_string()),
            container_port: i32::from(values.service.port),
            protocol: Some("TCP".to_string()),
            ..ContainerPort::default()
        }]),
        env: (!values.env.is_empty()).then(|| values.env.clone()),
        resources: Some(values.resources.clone()),
        liveness_probe: Some(values.liveness_probe.clone()),
        readiness_probe: Some(values.readiness_probe.clone()),
        ..Container::default()
    };

    PodTemplateSpec {
        metadata: Some(ObjectMeta {
            labels: Some(identity.labels().to_map()),
            ..ObjectMeta::default()
        }),
        spec: Some(PodSpec { containers: vec![container], ..PodSpec::default() }),
    }
}

pub fn deployment(identity: &ResolvedIdentity, values: &Values) -> Deployment {
    Deployment {
        metadata: object_meta(identity),
        spec: Some(DeploymentSpec {
            replicas: replicas(values),
            selector: LabelSelector {
                match_labels: Some(identity.selector().as_map().clone()),
                ..LabelSelector::default()
            },
            template: pod_template(identity, values),
            ..DeploymentSpec::default()
        }),
        ..Deployment::default()
    }
}

/// A `DeploymentConfig` rolled out on configuration changes and whenever
/// the build pushes a new image to `image_stream_tag`.
pub fn deployment_config(
    identity: &ResolvedIdentity,
    values: &Values,
    image_stream_tag: &str,
) -> DeploymentConfig {
    let image_change = TriggerPolicy {
        type_: "ImageChange".to_string(),
        image_change_params: Some(ImageChangeParams {
            automatic: true,
            container_names: vec![identity.labels().name().to_string()],
            from: ObjectReference {
                kind: Some("ImageStreamTag".to_string()),
                name: Some(image_stream_tag.to_string()),
                ..ObjectReference::default()
            },
        }),
    };

    DeploymentConfig::new(
        object_meta(identity),
        DeploymentConfigSpec {
            replicas: replicas(values),
            selector: identity.selector().as_map().clone(),
            template: pod_template(identity, values),
            triggers: vec![TriggerPolicy::config_change(), image_change],
        },
    )
}
