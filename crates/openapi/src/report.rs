//! Human-readable route summary for CI job pages.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::endpoint::Endpoint;

pub const NO_VANITY_URL: &str = "no-vanity-url-registered";
pub const NO_DESCRIPTION: &str = "No description provided";

/// Markdown summary: title, description, URL and one table row per endpoint.
pub fn summary_markdown(
    title: &str,
    description: Option<&str>,
    vanity_domain: Option<&str>,
    endpoints: &[Endpoint],
) -> String {
    let mut lines = vec![
        format!("# {title}"),
        String::new(),
        description.unwrap_or(NO_DESCRIPTION).to_string(),
        String::new(),
        format!("Registered URL: https://{}", vanity_domain.unwrap_or(NO_VANITY_URL)),
        String::new(),
        "## Endpoints".to_string(),
        String::new(),
        "| Operation ID | HTTP Method | Path |".to_string(),
        "| --- | --- | --- |".to_string(),
    ];
    lines.extend(
        endpoints
            .iter()
            .map(|e| format!("| {} | {} | {} |", e.operation_id(), e.http_method, e.path)),
    );
    lines.push(String::new());
    lines.join("\n")
}

/// Append `markdown` to the job summary file, creating it if needed.
pub fn append_step_summary(path: &Path, markdown: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(markdown.as_bytes())
}
