use comfy_table::{Cell, Color, ContentArrangement};

use crate::audit::{Finding, Severity};

pub trait FindingExt {
    fn render_table(&self) -> String;
}

impl FindingExt for [Finding] {
    fn render_table(&self) -> String {
        let rows = self
            .iter()
            .map(|finding| {
                let color = match finding.severity {
                    Severity::Error => Color::Red,
                    Severity::Warning => Color::Yellow,
                };
                [
                    Cell::new(finding.severity).fg(color),
                    Cell::new(&finding.namespace),
                    Cell::new(&finding.resource),
                    Cell::new(&finding.message),
                ]
            })
            .collect::<Vec<_>>();

        comfy_table::Table::new()
            .load_preset(comfy_table::presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["SEVERITY", "NAMESPACE", "RESOURCE", "MESSAGE"])
            .add_rows(rows)
            .to_string()
    }
}
