use std::time::Duration;

use httpmock::prelude::*;

use offerguard::agents::company::run_company_agent;
use offerguard::config::AgentConfig;
use offerguard::intake::structure_text;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(2_000))
        .build()
        .unwrap()
}

#[tokio::test]
async fn reachable_site_is_not_flagged() {
    let server = MockServer::start();
    let _ok = server.mock(|when, then| {
        when.method(GET).path("/careers");
        then.status(200);
    });

    let text = format!(
        "Internship openings listed at {} for this summer.",
        server.url("/careers")
    );
    let intake = structure_text(&text).unwrap();
    let signal = run_company_agent(&intake, &AgentConfig::default(), Some(&client())).await;

    assert!(!signal
        .observations
        .iter()
        .any(|o| o.contains("could not be reached")));
    assert!(!signal.observations.iter().any(|o| o.contains("server error")));
}

#[tokio::test]
async fn server_failure_is_observed_but_not_fatal() {
    let server = MockServer::start();
    let _down = server.mock(|when, then| {
        when.method(GET).path("/careers");
        then.status(503);
    });

    let text = format!(
        "Internship openings listed at {} for this summer.",
        server.url("/careers")
    );
    let intake = structure_text(&text).unwrap();
    let signal = run_company_agent(&intake, &AgentConfig::default(), Some(&client())).await;

    assert!(signal
        .observations
        .iter()
        .any(|o| o.contains("server error")));
}

#[tokio::test]
async fn unreachable_host_becomes_an_observation() {
    // .invalid never resolves, so the probe fails without touching the
    // network beyond DNS.
    let intake = structure_text(
        "Apply today via https://careers.nonexistent.invalid/ to join the team.",
    )
    .unwrap();
    let signal = run_company_agent(&intake, &AgentConfig::default(), Some(&client())).await;

    assert!(signal
        .observations
        .iter()
        .any(|o| o.contains("could not be reached")));
}

#[tokio::test]
async fn offline_mode_skips_the_probe_entirely() {
    let intake = structure_text(
        "Apply today via https://careers.nonexistent.invalid/ to join the team.",
    )
    .unwrap();
    let signal = run_company_agent(&intake, &AgentConfig::default(), None).await;

    assert!(!signal
        .observations
        .iter()
        .any(|o| o.contains("could not be reached")));
}
