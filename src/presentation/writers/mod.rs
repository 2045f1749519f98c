use crate::domain::{ports::OutputWriter, report::Report};
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use self::{html::HtmlWriter, json::JsonWriter};

pub mod html;
pub mod json;

/// Register available writers - OCP: add new ones without touching main.rs
pub fn all_writers() -> Vec<Box<dyn OutputWriter>> {
    vec![Box::new(JsonWriter), Box::new(HtmlWriter)]
}

pub fn writer_for(format: &str) -> Option<Box<dyn OutputWriter>> {
    match format {
        "json" => Some(Box::new(JsonWriter)),
        "html" => Some(Box::new(HtmlWriter)),
        _ => None,
    }
}

/// Writes the report to `<dir>/<report_id>.<ext>` via the chosen writer
pub fn write_to_file(writer: &dyn OutputWriter, report: &Report, dir: &Path) -> Result<PathBuf> {
    // Ensure the output directory exists
    fs::create_dir_all(dir)?;

    let content = writer.format(report)?;
    let path = dir.join(format!("{}.{}", report.report_id, writer.extension()));
    fs::write(&path, &content)?;
    Ok(path)
}
