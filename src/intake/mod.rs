use std::path::Path;

use regex::Regex;

use crate::core::error::GuardError;

/// Upper bound on accepted input; anything larger is rejected outright.
pub const MAX_TEXT_LENGTH: usize = 50_000;
/// Inputs shorter than this carry too little signal to assess.
pub const MIN_TEXT_LENGTH: usize = 10;

const PAYMENT_KEYWORDS: &[&str] = &["fee", "payment", "deposit", "registration", "charges"];
const URGENCY_KEYWORDS: &[&str] = &["urgent", "immediately", "limited", "asap", "hurry"];

/// Structured view of one submitted message, ready for the agents.
#[derive(Debug, Clone)]
pub struct IntakeData {
    pub raw_text: String,
    pub clean_text: String,
    pub website: Option<String>,
    pub email: Option<String>,
    pub payment_mentions: bool,
    pub urgency_mentions: bool,
}

/// Pick the submitted input channel and return its raw text. Exactly one of
/// text, file, or url is expected; a url needs a client, which the caller
/// withholds when networking is disabled.
pub async fn route_input(
    text: Option<&str>,
    file: Option<&Path>,
    url: Option<&str>,
    client: Option<&reqwest::Client>,
) -> Result<String, GuardError> {
    if let Some(text) = text {
        if !text.trim().is_empty() {
            return Ok(text.to_string());
        }
    }
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(path)?);
    }
    if let Some(url) = url {
        let client = client.ok_or_else(|| {
            GuardError::Input("url input requires network access".to_string())
        })?;
        return fetch_text_from_url(client, url).await;
    }
    Err(GuardError::Input("no valid input provided".to_string()))
}

/// Minimal normalization: unify newlines, drop non-printing characters,
/// collapse runs of spaces and blank lines. Not NLP cleaning.
pub fn clean_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let mut printable = String::with_capacity(unified.len());
    for ch in unified.chars() {
        if ch == '\n' || !ch.is_control() {
            printable.push(ch);
        } else {
            printable.push(' ');
        }
    }

    let mut lines = Vec::new();
    let mut prev_blank = false;
    for line in printable.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        let blank = line.is_empty();
        if blank && prev_blank {
            continue;
        }
        prev_blank = blank;
        lines.push(line);
    }
    lines.join("\n").trim().to_string()
}

/// Structure raw text into the intake record: first email, first URL, and
/// coarse payment/urgency mention flags for the planner.
pub fn structure_text(raw: &str) -> Result<IntakeData, GuardError> {
    if raw.len() > MAX_TEXT_LENGTH {
        return Err(GuardError::Input(format!(
            "input too long ({} chars, limit {MAX_TEXT_LENGTH})",
            raw.len()
        )));
    }
    let clean = clean_text(raw);
    if clean.len() < MIN_TEXT_LENGTH {
        return Err(GuardError::Input("input text too short".to_string()));
    }

    let email_re = Regex::new(r"[A-Za-z0-9_.+-]+@[A-Za-z0-9-]+\.[A-Za-z0-9.-]+")?;
    let url_re = Regex::new(r"https?://\S+|www\.\S+")?;

    let lowered = clean.to_lowercase();
    Ok(IntakeData {
        raw_text: raw.to_string(),
        email: email_re.find(&clean).map(|m| m.as_str().to_string()),
        website: url_re.find(&clean).map(|m| m.as_str().to_string()),
        payment_mentions: PAYMENT_KEYWORDS.iter().any(|k| lowered.contains(k)),
        urgency_mentions: URGENCY_KEYWORDS.iter().any(|k| lowered.contains(k)),
        clean_text: clean,
    })
}

/// Fetch a page and reduce it to readable text: scripts, styles and markup
/// stripped, entities for whitespace and ampersands unescaped, empty lines
/// dropped.
pub async fn fetch_text_from_url(
    client: &reqwest::Client,
    url: &str,
) -> Result<String, GuardError> {
    let url = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    };

    let response = client.get(&url).send().await?;
    let body = response.error_for_status()?.text().await?;
    strip_html(&body)
}

fn strip_html(body: &str) -> Result<String, GuardError> {
    let blocks = Regex::new(r"(?is)<(script|style|noscript)\b.*?</(script|style|noscript)>")?;
    let tags = Regex::new(r"(?s)<[^>]*>")?;

    let without_blocks = blocks.replace_all(body, "\n");
    let without_tags = tags.replace_all(&without_blocks, "\n");
    let unescaped = without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">");

    let lines: Vec<&str> = unescaped
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    Ok(lines.join("\n"))
}
