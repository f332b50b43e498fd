use std::fs;
use std::path::Path;

use crate::core::error::GuardError;
use crate::pipeline::guardrail::SafePayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Text,
}

pub fn render(payload: &SafePayload, format: OutputFormat) -> Result<String, GuardError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(payload).map_err(|e| GuardError::Input(e.to_string()))
        }
        OutputFormat::Markdown => Ok(render_markdown(payload)),
        OutputFormat::Text => Ok(render_text(payload)),
    }
}

pub fn write_report(
    payload: &SafePayload,
    format: OutputFormat,
    path: &Path,
) -> Result<(), GuardError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let rendered = render(payload, format)?;
    fs::write(path, rendered)?;
    Ok(())
}

fn render_markdown(payload: &SafePayload) -> String {
    let p = payload.payload();
    let mut out = String::new();
    out.push_str("# Internship Risk Assessment\n\n");
    out.push_str("## Risk Summary\n");
    out.push_str(&format!("- Risk Category: {}\n", p.risk_category));
    out.push_str(&format!("- Risk Score: {} / 100\n\n", p.risk_score));
    out.push_str(&format!("{}\n\n", p.summary));

    out.push_str("## Key Observations\n");
    if p.explanations.is_empty() {
        out.push_str("- No observations available.\n");
    } else {
        for item in &p.explanations {
            out.push_str(&format!("- {}\n", item));
        }
    }
    out.push('\n');

    out.push_str("## Score Breakdown\n");
    for (source, points) in p.breakdown.iter() {
        out.push_str(&format!("- {}: {}\n", source, points));
    }
    out.push('\n');

    out.push_str("## Disclaimer\n");
    out.push_str(&format!("{}\n", p.disclaimer));
    out
}

fn render_text(payload: &SafePayload) -> String {
    let p = payload.payload();
    let mut out = String::new();
    out.push_str(&format!(
        "{} (score {} / 100)\n\n",
        p.risk_category, p.risk_score
    ));
    out.push_str(&format!("{}\n\n", p.summary));
    for item in &p.explanations {
        out.push_str(&format!("  - {}\n", item));
    }
    out.push('\n');
    for (source, points) in p.breakdown.iter() {
        out.push_str(&format!("  {:>4}  {}\n", points, source));
    }
    out.push_str(&format!("\n{}\n", p.disclaimer));
    out
}
