//! Table rendering of resolved identities.

use comfy_table::{Cell, ContentArrangement};
use stamp_identity::ResolvedIdentity;

pub trait IdentityExt {
    /// One row per release: full name, namespace, selector and image.
    fn render_table(&self) -> String;
}

impl IdentityExt for [ResolvedIdentity] {
    fn render_table(&self) -> String {
        let rows = self
            .iter()
            .map(|identity| {
                [
                    Cell::new(identity.labels().instance()),
                    Cell::new(identity.full_name()),
                    Cell::new(identity.namespace()),
                    Cell::new(identity.selector()),
                    Cell::new(identity.image_reference()),
                ]
            })
            .collect::<Vec<_>>();

        comfy_table::Table::new()
            .load_preset(comfy_table::presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["RELEASE", "FULL NAME", "NAMESPACE", "SELECTOR", "IMAGE"])
            .add_rows(rows)
            .to_string()
    }
}
