pub mod k8s {
    pub mod labels {
        pub const NAME: &str = "app.kubernetes.io/name";
        pub const INSTANCE: &str = "app.kubernetes.io/instance";
        pub const VERSION: &str = "app.kubernetes.io/version";
        pub const HELM_CHART: &str = "helm.sh/chart";
    }

    /// Kubernetes object names and label values are DNS labels.
    pub const MAX_NAME_LENGTH: usize = 63;

    /// Helm refuses release names longer than this.
    pub const MAX_RELEASE_NAME_LENGTH: usize = 53;
}

pub mod openshift {
    /// In-cluster address of the OpenShift integrated image registry.
    pub const DEFAULT_REGISTRY_HOST: &str = "image-registry.openshift-image-registry.svc";
    pub const DEFAULT_REGISTRY_PORT: u16 = 5000;
}

pub const DEFAULT_IMAGE_TAG: &str = "latest";
pub const DEFAULT_NAMESPACE: &str = "default";

pub const DEFAULT_CHART_NAME: &str = "springboot-ocdemo";
pub const DEFAULT_CHART_VERSION: &str = "0.1.0";
pub const DEFAULT_APP_VERSION: &str = "1.0.0";

pub const HEALTH_CHECK_PATH: &str = "/actuator/health";
pub const HTTP_PORT_NAME: &str = "http";
pub const DEFAULT_SERVICE_PORT: u16 = 8080;
