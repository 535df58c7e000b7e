//! HTML renderer for the report model.
//!
//! Produces a standalone, print-oriented document: one centered bold heading
//! per group, then per entry a source hyperlink with the entry title and a
//! justified body paragraph, separated by a blank line.

use std::{fs, path::Path};

use tgspider_core::{errors::Error, render::ReportRenderer, report::ReportModel, Result};

pub struct HtmlRenderer;

impl ReportRenderer for HtmlRenderer {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, model: &ReportModel, path: &Path) -> Result<()> {
        fs::write(path, render_document(model))
            .map_err(|e| Error::Render(format!("cannot write {}: {e}", path.display())))
    }
}

fn render_document(model: &ReportModel) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n");
    out.push_str("@page { margin: 10mm 15mm 10mm 25mm; }\n");
    out.push_str("body { font-family: \"Times New Roman\", serif; font-size: 14pt; }\n");
    out.push_str(".group { text-align: center; font-weight: bold; }\n");
    out.push_str(".entry-body { text-align: justify; }\n");
    out.push_str("a { color: #0000ff; text-decoration: underline; }\n");
    out.push_str("</style>\n</head>\n<body>\n");

    for section in &model.sections {
        // Headings are emitted for empty groups too; their presence in the
        // document mirrors the configured grouping, not the match count.
        out.push_str(&format!(
            "<p class=\"group\">{}</p>\n",
            escape_html(&section.name)
        ));
        for entry in &section.entries {
            let url = escape_html(&entry.source_url);
            out.push_str(&format!(
                "<p><a href=\"{url}\">{url}</a> {}</p>\n",
                escape_html(&entry.title)
            ));
            out.push_str(&format!(
                "<p class=\"entry-body\">{}</p>\n",
                escape_html(&entry.body).replace('\n', "<br>\n")
            ));
            out.push_str("<p></p>\n");
        }
    }

    out.push_str("</body>\n</html>\n");
    out
}

/// Escape HTML special characters.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
