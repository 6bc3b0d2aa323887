use std::{fmt, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use snafu::Snafu;

/// `imagePullPolicy` of the application container.
///
/// Parsed case-insensitively so `--set image.pullPolicy=always` works the
/// same as the canonical spelling.
#[derive(Clone, Copy, Debug, Default, DeserializeFromStr, Eq, PartialEq, SerializeDisplay)]
pub enum ImagePullPolicy {
    #[default]
    Always,
    IfNotPresent,
    Never,
}

impl fmt::Display for ImagePullPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val = match self {
            Self::Always => "Always",
            Self::IfNotPresent => "IfNotPresent",
            Self::Never => "Never",
        };
        f.write_str(val)
    }
}

impl FromStr for ImagePullPolicy {
    type Err = ParseImagePullPolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "ifnotpresent" => Ok(Self::IfNotPresent),
            "never" => Ok(Self::Never),
            _ => Err(ParseImagePullPolicyError::Invalid { value: value.to_string() }),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ParseImagePullPolicyError {
    #[snafu(display("'{value}' is not a valid ImagePullPolicy"))]
    Invalid { value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_always() {
        // The build pushes every revision under the same tag.
        assert_eq!(ImagePullPolicy::default(), ImagePullPolicy::Always);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("IfNotPresent".parse::<ImagePullPolicy>().unwrap(), ImagePullPolicy::IfNotPresent);
        assert_eq!("never".parse::<ImagePullPolicy>().unwrap(), ImagePullPolicy::Never);
        assert!("sometimes".parse::<ImagePullPolicy>().is_err());
    }

    #[test]
    fn test_serde_uses_canonical_spelling() {
        let policy: ImagePullPolicy = serde_yaml::from_str("ifnotpresent").unwrap();
        assert_eq!(policy, ImagePullPolicy::IfNotPresent);
        assert_eq!(serde_yaml::to_string(&policy).unwrap().trim(), "IfNotPresent");
    }
}
