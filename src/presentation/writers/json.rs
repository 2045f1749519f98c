use anyhow::Result;

use crate::domain::{ports::OutputWriter, report::Report};

/// Pretty-printed JSON of the rendered view.
///
/// Fragment `text` fields are already escaped for markup, exactly as the
/// HTML report shows them.
pub struct JsonWriter;

impl OutputWriter for JsonWriter {
    fn format(&self, report: &Report) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
