use reqwest::Client;

use crate::config::AgentConfig;
use crate::core::record::CompanySignal;
use crate::intake::IntakeData;

/// Company legitimacy checks: domain extraction, trusted-domain and
/// lookalike comparison, suspicious TLDs, keyword-stuffed domains, scheme
/// and reachability, and email/website consistency. Network failures become
/// observations, never errors.
pub async fn run_company_agent(
    intake: &IntakeData,
    cfg: &AgentConfig,
    client: Option<&Client>,
) -> CompanySignal {
    let mut observations = Vec::new();
    let mut trust_adjustment = 0;

    let website = intake.website.as_deref();
    let email = intake.email.as_deref();
    let website_domain = website.and_then(extract_domain);
    let email_domain = email.and_then(extract_domain);

    if let Some(domain) = &website_domain {
        let base = base_domain(domain);
        if cfg.trusted_domains.iter().any(|t| t == &base) {
            observations.push("Recognized well-known company domain (trust signal)".to_string());
            trust_adjustment += cfg.trusted_domain_bonus;
        } else if is_lookalike(&base, cfg) {
            observations.push(
                "Website domain closely resembles a well-known company domain".to_string(),
            );
        }

        if cfg.suspicious_tlds.iter().any(|tld| domain.ends_with(tld)) {
            observations.push("Website uses a higher-risk domain extension (TLD)".to_string());
        }

        if cfg.domain_keywords.iter().any(|k| domain.contains(k)) {
            observations.push(
                "Domain name contains recruitment or payment keywords (can be misleading)"
                    .to_string(),
            );
        }
    }

    if let Some(site) = website {
        // Bare domains are assumed https for parsing; only an explicit
        // http:// scheme is flagged.
        if site.trim().to_lowercase().starts_with("http://") {
            observations.push("Website link uses HTTP (not HTTPS)".to_string());
        }

        if let Some(client) = client {
            match probe_site(client, site).await {
                ProbeOutcome::Ok => {}
                ProbeOutcome::ServerError => observations
                    .push("Website server error (could not verify reliably)".to_string()),
                ProbeOutcome::Unreachable => observations
                    .push("Website could not be reached (network/timeout)".to_string()),
            }
        }
    }

    if let Some(domain) = &email_domain {
        if cfg.free_email_domains.iter().any(|f| f == domain) {
            observations.push("Free email domain used for communication".to_string());
        }
        if let Some(site_domain) = &website_domain {
            if base_domain(site_domain) != base_domain(domain) {
                observations.push("Email domain does not match website domain".to_string());
            }
        }
    }

    if observations.is_empty() {
        observations.push("No major company legitimacy issues detected".to_string());
    }

    CompanySignal {
        observations,
        trust_adjustment,
    }
}

enum ProbeOutcome {
    Ok,
    ServerError,
    Unreachable,
}

async fn probe_site(client: &Client, website: &str) -> ProbeOutcome {
    let url = if website.starts_with("http://") || website.starts_with("https://") {
        website.to_string()
    } else {
        format!("https://{website}")
    };

    match client.get(&url).send().await {
        // Bot walls answer 401/403 for legitimate sites; only true server
        // failures are flagged.
        Ok(response) if response.status().is_server_error() => ProbeOutcome::ServerError,
        Ok(_) => ProbeOutcome::Ok,
        Err(_) => ProbeOutcome::Unreachable,
    }
}

fn extract_domain(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Some((_, domain)) = value.rsplit_once('@') {
        return Some(domain.to_lowercase());
    }

    let without_scheme = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .unwrap_or(value);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_scheme);
    let host = host.strip_prefix("www.").unwrap_or(host).to_lowercase();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Base domain comparison handles subdomains like careers.tcs.com vs
/// tcs.com.
fn base_domain(domain: &str) -> String {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() <= 2 {
        domain.to_string()
    } else {
        labels[labels.len() - 2..].join(".")
    }
}

fn is_lookalike(base: &str, cfg: &AgentConfig) -> bool {
    cfg.trusted_domains.iter().any(|trusted| {
        trusted != base && strsim::jaro_winkler(base, trusted) >= cfg.lookalike_threshold
    })
}
