use serde::Serialize;
use stamp_base::consts::k8s::MAX_NAME_LENGTH;

use crate::{
    ChartIdentity, Error, ImageConfig, ImageReference, LabelSelector, LabelSet, ReleaseIdentity,
    error::Field,
    name::{self, DnsLabel},
};

/// Everything a render pass needs to name, label and select the resources
/// of one release.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIdentity {
    full_name: DnsLabel,
    namespace: DnsLabel,
    labels: LabelSet,
    selector: LabelSelector,
    image_reference: ImageReference,
}

impl ResolvedIdentity {
    /// The `metadata.name` of every resource of the release.
    #[inline]
    #[must_use]
    pub fn full_name(&self) -> &str { &self.full_name }

    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str { &self.namespace }

    #[inline]
    #[must_use]
    pub const fn labels(&self) -> &LabelSet { &self.labels }

    #[inline]
    #[must_use]
    pub const fn selector(&self) -> &LabelSelector { &self.selector }

    #[inline]
    #[must_use]
    pub const fn image_reference(&self) -> &ImageReference { &self.image_reference }
}

/// Derives the identity of `release` of `chart`.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentity`] if `image` carries an invalid registry
/// host, repository or tag. Chart and release names were validated when
/// their identities were built.
pub fn resolve(
    chart: &ChartIdentity,
    release: &ReleaseIdentity,
    image: &ImageConfig,
) -> Result<ResolvedIdentity, Error> {
    let full_name = full_name(chart, release)?;
    let labels = LabelSet::new(chart.app_name().clone(), release.release_name().clone())
        .with_metadata(chart.chart_label(), chart.app_version().map(ToString::to_string));
    let selector = labels.selector();
    let image_reference = ImageReference::resolve(image, release.namespace(), &full_name)?;

    Ok(ResolvedIdentity {
        full_name,
        namespace: release.namespace().clone(),
        labels,
        selector,
        image_reference,
    })
}

/// `{release}-{app}` bounded to 63 characters. Only the application part is
/// ever shortened; the release name is what keeps names of different releases
/// apart.
fn full_name(chart: &ChartIdentity, release: &ReleaseIdentity) -> Result<DnsLabel, Error> {
    if let Some(full_name) = release.full_name_override() {
        return Ok(full_name.clone());
    }
    let release_name = release.release_name();
    let budget = MAX_NAME_LENGTH.saturating_sub(release_name.len() + 1);
    let app_name = name::truncate(chart.app_name(), budget);
    DnsLabel::parse(Field::ReleaseName, &format!("{release_name}-{app_name}"), MAX_NAME_LENGTH)
}
