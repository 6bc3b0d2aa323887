use k8s_openapi::api::autoscaling::v2::{
    CrossVersionObjectReference, HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec,
    MetricSpec, MetricTarget, ResourceMetricSource,
};
use stamp_identity::ResolvedIdentity;

use crate::{
    render::{object_meta, openshift::DeploymentConfig},
    values::{Values, WorkloadKind},
};

/// An `autoscaling/v2` autoscaler targeting the release's workload by name.
pub fn horizontal_pod_autoscaler(
    identity: &ResolvedIdentity,
    values: &Values,
) -> HorizontalPodAutoscaler {
    let autoscaling = &values.autoscaling;
    let (api_version, kind) = match values.workload.kind {
        WorkloadKind::Deployment => ("apps/v1", "Deployment"),
        WorkloadKind::DeploymentConfig => (DeploymentConfig::API_VERSION, "DeploymentConfig"),
    };
    let metrics = autoscaling.target_cpu_utilization_percentage.map(|utilization| {
        vec![MetricSpec {
            type_: "Resource".to_string(),
            resource: Some(ResourceMetricSource {
                name: "cpu".to_string(),
                target: MetricTarget {
                    type_: "Utilization".to_string(),
                    average_utilization: Some(utilization),
                    ..MetricTarget::default()
                },
            }),
            ..MetricSpec::default()
        }]
    });

    HorizontalPodAutoscaler {
        metadata: object_meta(identity),
        spec: Some(HorizontalPodAutoscalerSpec {
            scale_target_ref: CrossVersionObjectReference {
                api_version: Some(api_version.to_string()),
                kind: kind.to_string(),
                name: identity.full_name().to_string(),
            },
            min_replicas: Some(autoscaling.min_replicas),
            max_replicas: autoscaling.max_replicas,
            metrics,
            ..HorizontalPodAutoscalerSpec::default()
        }),
        ..HorizontalPodAutoscaler::default()
    }
}
