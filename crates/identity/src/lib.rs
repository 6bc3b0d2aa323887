//! Release-scoped identities for the resources of a chart.
//!
//! Every resource rendered for a release takes its name, its labels, its
//! selector and its image from one [`ResolvedIdentity`]. Consistency between
//! resources comes from all of them reading the same value, and isolation
//! between releases comes from the label set always carrying both
//! `app.kubernetes.io/name` and `app.kubernetes.io/instance`.
//!
//! ```
//! use stamp_identity::{ChartIdentity, ImageConfig, ReleaseIdentity};
//!
//! let chart = ChartIdentity::new("springboot-ocdemo")?;
//! let release = ReleaseIdentity::new("app1", "ns1")?;
//! let identity = stamp_identity::resolve(&chart, &release, &ImageConfig::default())?;
//!
//! assert_eq!(identity.full_name(), "app1-springboot-ocdemo");
//! assert_eq!(identity.labels().instance(), "app1");
//! assert_eq!(
//!     identity.image_reference().to_string(),
//!     "image-registry.openshift-image-registry.svc:5000/ns1/app1-springboot-ocdemo:latest"
//! );
//! # Ok::<(), stamp_identity::Error>(())
//! ```

mod chart;
mod error;
mod image;
mod labels;
mod name;
mod release;
mod resolver;
mod selector;

pub use self::{
    chart::ChartIdentity,
    error::{Error, Field, Reason},
    image::{ImageConfig, ImageReference, Registry, is_registry_qualified},
    labels::LabelSet,
    name::DnsLabel,
    release::ReleaseIdentity,
    resolver::{ResolvedIdentity, resolve},
    selector::LabelSelector,
};
