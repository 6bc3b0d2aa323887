use k8s_openapi::api::core::v1::{Pod, Service};
use kube::{Api, api::ListParams};
use snafu::ResultExt;

use crate::audit::{PodTarget, ServiceTarget, error, error::Error};

impl From<Service> for ServiceTarget {
    fn from(service: Service) -> Self {
        Self {
            namespace: service.metadata.namespace.unwrap_or_default(),
            name: service.metadata.name.unwrap_or_default(),
            selector: service.spec.and_then(|spec| spec.selector).unwrap_or_default(),
        }
    }
}

impl From<Pod> for PodTarget {
    fn from(pod: Pod) -> Self {
        let images = pod
            .spec
            .into_iter()
            .flat_map(|spec| spec.init_containers.into_iter().flatten().chain(spec.containers))
            .filter_map(|container| container.image)
            .collect();
        Self {
            namespace: pod.metadata.namespace.unwrap_or_default(),
            resource: format!("pod/{}", pod.metadata.name.unwrap_or_default()),
            labels: pod.metadata.labels.unwrap_or_default(),
            images,
        }
    }
}

/// Lists the Services and Pods of `namespace`, or of every namespace when
/// `None`. Both lists are requested concurrently.
pub async fn fetch(
    kube_client: kube::Client,
    namespace: Option<&str>,
) -> Result<(Vec<ServiceTarget>, Vec<PodTarget>), Error> {
    let (services, pods, scope) = match namespace {
        Some(namespace) => (
            Api::<Service>::namespaced(kube_client.clone(), namespace),
            Api::<Pod>::namespaced(kube_client, namespace),
            format!("namespace {namespace}"),
        ),
        None => (
            Api::<Service>::all(kube_client.clone()),
            Api::<Pod>::all(kube_client),
            "all namespaces".to_string(),
        ),
    };
    let list_params = ListParams::default();

    tracing::info!("Listing services and pods in {scope}");
    let (services, pods) = futures::try_join!(
        async {
            services
                .list(&list_params)
                .await
                .context(error::ListServicesSnafu { scope: scope.clone() })
        },
        async {
            pods.list(&list_params).await.context(error::ListPodsSnafu { scope: scope.clone() })
        },
    )?;
    tracing::debug!("Found {} services and {} pods", services.items.len(), pods.items.len());

    Ok((
        services.items.into_iter().map(ServiceTarget::from).collect(),
        pods.items.into_iter().map(PodTarget::from).collect(),
    ))
}
