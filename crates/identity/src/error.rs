use std::fmt;

use snafu::Snafu;

/// The error type of identity resolution.
///
/// Resolution is pure computation, so the only way it can fail is by being
/// handed a name that cannot be turned into a valid Kubernetes identifier.
#[derive(Debug, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Invalid {field} '{value}': {reason}"))]
    InvalidIdentity { field: Field, value: String, reason: Reason },
}

/// The input an [`Error::InvalidIdentity`] was raised for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    ChartName,
    NameOverride,
    AppVersion,
    ReleaseName,
    FullnameOverride,
    Namespace,
    RegistryHost,
    ImageRepository,
    ImageTag,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val = match self {
            Self::ChartName => "chart name",
            Self::NameOverride => "name override",
            Self::AppVersion => "app version",
            Self::ReleaseName => "release name",
            Self::FullnameOverride => "fullname override",
            Self::Namespace => "namespace",
            Self::RegistryHost => "registry host",
            Self::ImageRepository => "image repository",
            Self::ImageTag => "image tag",
        };
        f.write_str(val)
    }
}

/// Why an input was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reason {
    Empty,
    TooLong { length: usize, max_length: usize },
    InvalidFormat { expected: &'static str },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("value must not be empty"),
            Self::TooLong { length, max_length } => {
                write!(f, "value is {length} characters long but must be no more than {max_length}")
            }
            Self::InvalidFormat { expected } => write!(f, "expected {expected}"),
        }
    }
}
