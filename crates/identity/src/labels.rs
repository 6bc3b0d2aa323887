use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use stamp_base::consts::k8s::labels;

use crate::{LabelSelector, name::DnsLabel};

/// The labels every resource of a release carries.
///
/// `name` and `instance` are both mandatory: a label set naming only the
/// application cannot tell two releases of the same chart apart, and a
/// selector built from it binds the pods of both.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LabelSet {
    name: DnsLabel,
    instance: DnsLabel,
    metadata: MetadataLabels,
}

/// Informational labels, present only when the chart carries a version or an
/// app version. They never take part in selection: selectors are immutable
/// once created and these values change on upgrade.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
struct MetadataLabels {
    chart: Option<String>,
    version: Option<String>,
}

impl LabelSet {
    pub(crate) fn new(name: DnsLabel, instance: DnsLabel) -> Self {
        Self { name, instance, metadata: MetadataLabels::default() }
    }

    pub(crate) fn with_metadata(mut self, chart: Option<String>, version: Option<String>) -> Self {
        self.metadata = MetadataLabels { chart, version };
        self
    }

    /// The `app.kubernetes.io/name` value.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// The `app.kubernetes.io/instance` value.
    #[inline]
    #[must_use]
    pub fn instance(&self) -> &str { &self.instance }

    /// The selector binding Services and controllers to this release's pods.
    #[must_use]
    pub fn selector(&self) -> LabelSelector {
        LabelSelector::from_iter([
            (labels::NAME, self.name.as_str()),
            (labels::INSTANCE, self.instance.as_str()),
        ])
    }

    /// All labels, for `metadata.labels` of every resource. Without metadata
    /// this is exactly the selector.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let MetadataLabels { chart, version } = &self.metadata;
        let mut map = self.selector().into_map();
        map.extend(
            [
                chart.clone().map(|chart| (labels::HELM_CHART.to_string(), chart)),
                version.clone().map(|version| (labels::VERSION.to_string(), version)),
            ]
            .into_iter()
            .flatten(),
        );
        map
    }
}

impl Serialize for LabelSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}
