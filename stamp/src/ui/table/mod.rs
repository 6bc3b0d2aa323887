//! Table rendering for command output.

mod finding_ext;
mod identity_ext;

pub use self::{finding_ext::FindingExt, identity_ext::IdentityExt};
