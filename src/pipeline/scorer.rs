use crate::config::RiskConfig;
use crate::core::record::{BehaviorSignal, CompanySignal, MlRiskLevel, MlSignal, PaymentSignal};

/// Marker reason for a source that was absent or unusable. The explainer
/// turns it into a neutral statement; it is never a negative finding.
pub const NOT_ANALYZED: &str = "not analyzed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceScore {
    pub subscore: i32,
    pub reasons: Vec<String>,
}

impl SourceScore {
    fn not_analyzed() -> Self {
        Self {
            subscore: 0,
            reasons: vec![NOT_ANALYZED.to_string()],
        }
    }
}

/// Company scoring keeps the capped rule total and the uncapped trust
/// adjustment separate so the breakdown stays transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyScore {
    pub rules: i32,
    pub trust: i32,
    pub reasons: Vec<String>,
}

pub fn score_company(signal: Option<&CompanySignal>, cfg: &RiskConfig) -> CompanyScore {
    let Some(signal) = signal else {
        return CompanyScore {
            rules: 0,
            trust: 0,
            reasons: vec![NOT_ANALYZED.to_string()],
        };
    };
    if signal.observations.is_empty() {
        return CompanyScore {
            rules: 0,
            trust: signal.trust_adjustment,
            reasons: vec![NOT_ANALYZED.to_string()],
        };
    }

    let lowered: Vec<String> = signal
        .observations
        .iter()
        .map(|o| o.to_lowercase())
        .collect();
    let mut total = 0;
    for rule in &cfg.company_rules {
        if lowered.iter().any(|o| o.contains(&rule.needle)) {
            total += rule.weight;
        }
    }

    CompanyScore {
        rules: total.min(cfg.caps.company),
        trust: signal.trust_adjustment,
        reasons: signal.observations.clone(),
    }
}

/// Payment scoring is negation-aware: an explicit no-fee phrase in the raw
/// message suppresses the generic keyword rules, while strong evidence
/// (upfront request, specific amount) still counts.
pub fn score_payment(
    signal: Option<&PaymentSignal>,
    raw_text: &str,
    cfg: &RiskConfig,
) -> SourceScore {
    let Some(signal) = signal else {
        return SourceScore::not_analyzed();
    };
    if signal.observations.is_empty() {
        return SourceScore::not_analyzed();
    }

    let text = raw_text.to_lowercase();
    let negated = cfg
        .payment
        .negation_phrases
        .iter()
        .any(|phrase| text.contains(phrase.as_str()));

    let lowered: Vec<String> = signal
        .observations
        .iter()
        .map(|o| o.to_lowercase())
        .collect();
    let mut total = 0;
    for rule in &cfg.payment.rules {
        if negated && !rule.strong {
            continue;
        }
        if lowered.iter().any(|o| o.contains(&rule.needle)) {
            total += rule.weight;
        }
    }

    SourceScore {
        subscore: total.min(cfg.caps.payment),
        reasons: signal.observations.clone(),
    }
}

/// Behavior weights are tiered, not uniform: manipulation phrasing carries
/// the most, hard urgency more than soft scarcity, and a missing selection
/// process adds a fixed amount on top.
pub fn score_behavior(signal: Option<&BehaviorSignal>, cfg: &RiskConfig) -> SourceScore {
    let Some(signal) = signal else {
        return SourceScore::not_analyzed();
    };
    if signal.hard_urgency_terms.is_empty()
        && signal.scarcity_terms.is_empty()
        && signal.manipulation_terms.is_empty()
        && signal.observations.is_empty()
    {
        return SourceScore::not_analyzed();
    }

    let mut total = 0;
    if !signal.hard_urgency_terms.is_empty() {
        total += cfg.behavior.hard_urgency;
    }
    if !signal.scarcity_terms.is_empty() {
        total += cfg.behavior.scarcity;
    }
    if !signal.manipulation_terms.is_empty() {
        total += cfg.behavior.manipulation;
    }
    if signal
        .observations
        .iter()
        .any(|o| o.to_lowercase().contains(&cfg.behavior.missing_process_needle))
    {
        total += cfg.behavior.missing_process;
    }

    SourceScore {
        subscore: total.min(cfg.caps.behavior),
        reasons: signal.observations.clone(),
    }
}

/// The classifier contribution is discounted by its distance from the 0.5
/// decision boundary, so an unsure model scores near zero even at a High
/// bucket, and is capped below every rule-based source.
pub fn score_ml(signal: Option<&MlSignal>, cfg: &RiskConfig) -> SourceScore {
    let Some(signal) = signal else {
        return SourceScore::not_analyzed();
    };
    if !signal.used {
        return SourceScore::not_analyzed();
    }

    let probability = signal.probability.clamp(0.0, 1.0);
    let confidence = (probability - 0.5).abs() * 2.0;
    let base = match signal.level {
        MlRiskLevel::Low => cfg.ml.base_low,
        MlRiskLevel::Medium => cfg.ml.base_medium,
        MlRiskLevel::High => cfg.ml.base_high,
    };
    let points = ((base as f64) * confidence).round() as i32;

    SourceScore {
        subscore: points.min(cfg.caps.ml),
        reasons: vec![format!(
            "Language risk level assessed as {} (probability {:.2})",
            signal.level.as_str(),
            probability
        )],
    }
}
