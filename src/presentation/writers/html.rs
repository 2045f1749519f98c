use anyhow::Result;
use sailfish::TemplateOnce;

use crate::domain::{
    fragment::DisplayFragment,
    ports::OutputWriter,
    report::Report,
};

#[derive(TemplateOnce)]
#[template(path = "html/report.stpl")] // base dir declared inside sailfish.toml
struct ReportTemplate<'a> {
    report: &'a Report,
}

pub struct HtmlWriter;

impl OutputWriter for HtmlWriter {
    fn format(&self, report: &Report) -> Result<String> {
        Ok(ReportTemplate { report }.render_once()?)
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}

/// Join pre-escaped fragments, wrapping highlighted ones in a classed span.
///
/// Output is emitted unescaped by the template: fragment text is escaped once,
/// when the fragment is built.
fn fragments_markup(fragments: &[DisplayFragment]) -> String {
    fragments
        .iter()
        .map(|f| {
            if f.is_highlighted {
                format!(
                    r#"<span class="{}">{}</span>"#,
                    f.highlight_kind.css_class(),
                    f.text
                )
            } else {
                f.text.clone()
            }
        })
        .collect()
}
