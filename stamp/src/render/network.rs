use k8s_openapi::{
    api::core::v1::{Service, ServicePort, ServiceSpec},
    apimachinery::pkg::util::intstr::IntOrString,
};
use stamp_base::consts::HTTP_PORT_NAME;
use stamp_identity::ResolvedIdentity;

use crate::{
    render::{
        object_meta,
        openshift::{Route, RoutePort, RouteSpec, RouteTarget, RouteTls},
    },
    values::{TlsTermination, Values},
};

pub fn service(identity: &ResolvedIdentity, values: &Values) -> Service {
    Service {
        metadata: object_meta(identity),
        spec: Some(ServiceSpec {
            type_: Some(values.service.service_type.clone()),
            selector: Some(identity.selector().as_map().clone()),
            ports: Some(vec![ServicePort {
                name: Some(HTTP_PORT_NAME.to_string()),
                port: i32::from(values.service.port),
                target_port: Some(IntOrString::String(HTTP_PORT_NAME.to_string())),
                protocol: Some("TCP".to_string()),
                ..ServicePort::default()
            }]),
            ..ServiceSpec::default()
        }),
        ..Service::default()
    }
}

/// A `Route` to the release's Service. An empty host is left to the router.
pub fn route(identity: &ResolvedIdentity, values: &Values) -> Route {
    let non_empty = |value: &Option<String>| value.clone().filter(|value| !value.is_empty());
    let tls = &values.route.tls;

    Route::new(
        object_meta(identity),
        RouteSpec {
            host: non_empty(&values.route.host),
            path: non_empty(&values.route.path),
            to: RouteTarget {
                kind: "Service".to_string(),
                name: identity.full_name().to_string(),
                weight: 100,
            },
            port: RoutePort { target_port: IntOrString::String(HTTP_PORT_NAME.to_string()) },
            tls: tls.enabled.then(|| RouteTls {
                termination: tls.termination.as_str().to_string(),
                // Only edge termination serves plain HTTP at all.
                insecure_edge_termination_policy: (tls.termination == TlsTermination::Edge)
                    .then(|| tls.insecure_edge_termination_policy.clone()),
            }),
        },
    )
}
