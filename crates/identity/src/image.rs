use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use snafu::ensure;
use stamp_base::consts::{
    DEFAULT_IMAGE_TAG,
    openshift::{DEFAULT_REGISTRY_HOST, DEFAULT_REGISTRY_PORT},
};

use crate::{
    error::{Error, Field, InvalidIdentitySnafu, Reason},
    name::DnsLabel,
};

static REGISTRY_HOST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([-a-zA-Z0-9.]*[a-zA-Z0-9])?(:[0-9]+)?$")
        .expect("failed to compile registry host regex")
});

static PATH_COMPONENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+((\.|_|__|-+)[a-z0-9]+)*$")
        .expect("failed to compile path component regex")
});

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$").expect("failed to compile tag regex")
});

static DIGEST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+([+._-][a-z0-9]+)*:[a-fA-F0-9]{32,}$")
        .expect("failed to compile digest regex")
});

/// The registry images are pushed to and pulled from.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    #[serde(default = "Registry::default_host")]
    pub host: String,

    #[serde(default = "Registry::default_port")]
    pub port: Option<u16>,
}

impl Default for Registry {
    fn default() -> Self { Self { host: Self::default_host(), port: Self::default_port() } }
}

impl Registry {
    #[inline]
    #[must_use]
    pub fn default_host() -> String { DEFAULT_REGISTRY_HOST.to_string() }

    #[inline]
    #[must_use]
    pub const fn default_port() -> Option<u16> { Some(DEFAULT_REGISTRY_PORT) }

    /// `host:port`, or `host` alone when no port is configured.
    #[must_use]
    pub fn authority(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{port}", self.host),
            None => self.host.clone(),
        }
    }
}

/// Where the image of a release comes from.
///
/// With neither override the image is `{registry}/{namespace}/{fullName}`
/// tagged `latest`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ImageConfig {
    pub registry: Registry,

    /// A repository to pull instead of the one the build pushes. Without a
    /// registry host it is placed in `registry`, and a bare name is also
    /// placed in the release namespace.
    pub repository: Option<String>,

    /// A tag, or a digest such as `sha256:...`.
    pub tag: Option<String>,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum Reference {
    Tag(String),
    Digest(String),
}

/// A fully-qualified image pull string.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ImageReference {
    registry: String,
    repository: String,
    reference: Reference,
}

impl ImageReference {
    pub(crate) fn resolve(
        config: &ImageConfig,
        namespace: &DnsLabel,
        full_name: &DnsLabel,
    ) -> Result<Self, Error> {
        let authority = config.registry.authority();
        ensure!(
            REGISTRY_HOST_REGEX.is_match(&authority),
            InvalidIdentitySnafu {
                field: Field::RegistryHost,
                value: authority.as_str(),
                reason: Reason::InvalidFormat { expected: "a host name with an optional port" }
            }
        );

        let (registry, repository) =
            match config.repository.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
                None => (authority, format!("{namespace}/{full_name}")),
                Some(repository) => match repository.split_once('/') {
                    Some((host, path)) if is_registry_host(host) => {
                        (host.to_string(), path.to_string())
                    }
                    Some(_) => (authority, repository.to_string()),
                    None => (authority, format!("{namespace}/{repository}")),
                },
            };
        ensure!(
            repository.split('/').all(|component| PATH_COMPONENT_REGEX.is_match(component)),
            InvalidIdentitySnafu {
                field: Field::ImageRepository,
                value: repository.as_str(),
                reason: Reason::InvalidFormat {
                    expected: "'/'-separated lowercase path components"
                }
            }
        );

        let reference = match config.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            None => Reference::Tag(DEFAULT_IMAGE_TAG.to_string()),
            Some(digest) if digest.contains(':') => {
                ensure!(
                    DIGEST_REGEX.is_match(digest),
                    InvalidIdentitySnafu {
                        field: Field::ImageTag,
                        value: digest,
                        reason: Reason::InvalidFormat { expected: "a digest like 'sha256:<hex>'" }
                    }
                );
                Reference::Digest(digest.to_string())
            }
            Some(tag) => {
                ensure!(
                    TAG_REGEX.is_match(tag),
                    InvalidIdentitySnafu {
                        field: Field::ImageTag,
                        value: tag,
                        reason: Reason::InvalidFormat {
                            expected: "up to 128 word characters, '.' or '-'"
                        }
                    }
                );
                Reference::Tag(tag.to_string())
            }
        };

        Ok(Self { registry, repository, reference })
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &str { &self.registry }

    #[inline]
    #[must_use]
    pub fn repository(&self) -> &str { &self.repository }

    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match &self.reference {
            Reference::Tag(tag) => Some(tag),
            Reference::Digest(_) => None,
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { registry, repository, reference } = self;
        match reference {
            Reference::Tag(tag) => write!(f, "{registry}/{repository}:{tag}"),
            Reference::Digest(digest) => write!(f, "{registry}/{repository}@{digest}"),
        }
    }
}

impl Serialize for ImageReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Whether the first component of an image name is a registry host, using
/// the container runtime's rule: it contains `.` or `:`, or is `localhost`.
fn is_registry_host(component: &str) -> bool {
    component.contains(['.', ':']) || component == "localhost"
}

/// Whether an image pull string names its registry explicitly.
///
/// An unqualified name such as `app1-demo:latest` is resolved by the
/// container runtime against a public registry, never against the in-cluster
/// one.
#[must_use]
pub fn is_registry_qualified(image: &str) -> bool {
    image.split_once('/').is_some_and(|(host, _)| is_registry_host(host))
}
