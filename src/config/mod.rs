use std::{fs, path::Path};

use serde::Deserialize;

use crate::core::error::GuardError;

/// Per-source caps on rule-based sub-scores. The ML cap must stay strictly
/// below every rule-based cap so the learned signal cannot dominate.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreCaps {
    #[serde(default = "default_company_cap")]
    pub company: i32,
    #[serde(default = "default_payment_cap")]
    pub payment: i32,
    #[serde(default = "default_behavior_cap")]
    pub behavior: i32,
    #[serde(default = "default_ml_cap")]
    pub ml: i32,
}

/// Ascending category bounds with strict less-than semantics: scores below
/// `low_below` are Low, below `caution_below` are Caution, the rest High.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryThresholds {
    #[serde(default = "default_low_below")]
    pub low_below: i32,
    #[serde(default = "default_caution_below")]
    pub caution_below: i32,
}

/// Substring rule: an observation containing `needle` (case-insensitive)
/// adds `weight` once.
#[derive(Debug, Clone, Deserialize)]
pub struct WeightedRule {
    pub needle: String,
    pub weight: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRule {
    pub needle: String,
    pub weight: i32,
    /// Strong rules survive an explicit no-fee negation in the message.
    #[serde(default)]
    pub strong: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRules {
    #[serde(default = "default_payment_rules")]
    pub rules: Vec<PaymentRule>,
    #[serde(default = "default_negation_phrases")]
    pub negation_phrases: Vec<String>,
}

/// Tiered behavior weights: manipulation > hard urgency > missing process >
/// scarcity. Scarcity framing alone is weak evidence.
#[derive(Debug, Clone, Deserialize)]
pub struct BehaviorWeights {
    #[serde(default = "default_hard_urgency_weight")]
    pub hard_urgency: i32,
    #[serde(default = "default_scarcity_weight")]
    pub scarcity: i32,
    #[serde(default = "default_manipulation_weight")]
    pub manipulation: i32,
    #[serde(default = "default_missing_process_weight")]
    pub missing_process: i32,
    #[serde(default = "default_missing_process_needle")]
    pub missing_process_needle: String,
}

/// Base contributions per bucketed risk level, discounted by classifier
/// confidence before capping.
#[derive(Debug, Clone, Deserialize)]
pub struct MlScoring {
    #[serde(default = "default_ml_base_low")]
    pub base_low: i32,
    #[serde(default = "default_ml_base_medium")]
    pub base_medium: i32,
    #[serde(default = "default_ml_base_high")]
    pub base_high: i32,
}

/// Subtractive legitimacy bonuses keyed on the raw message text. Independent
/// and summable, not mutually exclusive.
#[derive(Debug, Clone, Deserialize)]
pub struct StructureBonuses {
    #[serde(default = "default_interview_bonus")]
    pub interview: i32,
    #[serde(default = "default_interview_keywords")]
    pub interview_keywords: Vec<String>,
    #[serde(default = "default_mentorship_bonus")]
    pub mentorship: i32,
    #[serde(default = "default_mentorship_keywords")]
    pub mentorship_keywords: Vec<String>,
    #[serde(default = "default_stipend_bonus")]
    pub stipend: i32,
    #[serde(default = "default_stipend_keywords")]
    pub stipend_keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrustBonuses {
    #[serde(default = "default_no_fee_bonus")]
    pub no_fee: i32,
    #[serde(default = "default_no_fee_phrases")]
    pub no_fee_phrases: Vec<String>,
    #[serde(default = "default_careers_url_bonus")]
    pub careers_url: i32,
    #[serde(default = "default_corporate_email_bonus")]
    pub corporate_email: i32,
    #[serde(default = "default_free_email_markers")]
    pub free_email_markers: Vec<String>,
}

/// Advisory sentence template keyed by reason substring.
#[derive(Debug, Clone, Deserialize)]
pub struct PhraseRule {
    pub needle: String,
    pub sentence: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcePhrases {
    pub rules: Vec<PhraseRule>,
    pub none_matched: String,
    pub not_analyzed: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhraseLibrary {
    #[serde(default = "default_company_phrases")]
    pub company: SourcePhrases,
    #[serde(default = "default_payment_phrases")]
    pub payment: SourcePhrases,
    #[serde(default = "default_behavior_phrases")]
    pub behavior: SourcePhrases,
    #[serde(default = "default_ml_phrases")]
    pub ml: SourcePhrases,
    #[serde(default = "default_summary_low")]
    pub summary_low: String,
    #[serde(default = "default_summary_caution")]
    pub summary_caution: String,
    #[serde(default = "default_summary_high")]
    pub summary_high: String,
    #[serde(default = "default_fallback_summary")]
    pub fallback_summary: String,
    #[serde(default = "default_disclaimer")]
    pub disclaimer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VocabularyEntry {
    pub word: String,
    pub replacement: String,
}

/// Forbidden vocabulary and accusatory sentence patterns with their neutral
/// rewrites. Replacements must never re-match the forbidden set; the
/// guardrail compiles and checks this table at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct GuardrailLexicon {
    #[serde(default = "default_forbidden_vocabulary")]
    pub forbidden: Vec<VocabularyEntry>,
    #[serde(default = "default_accusatory_patterns")]
    pub accusatory_patterns: Vec<String>,
    #[serde(default = "default_neutral_clause")]
    pub neutral_clause: String,
}

/// Knobs for the upstream detector agents.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_trusted_domains")]
    pub trusted_domains: Vec<String>,
    #[serde(default = "default_free_email_domains")]
    pub free_email_domains: Vec<String>,
    #[serde(default = "default_suspicious_tlds")]
    pub suspicious_tlds: Vec<String>,
    #[serde(default = "default_domain_keywords")]
    pub domain_keywords: Vec<String>,
    #[serde(default = "default_lookalike_threshold")]
    pub lookalike_threshold: f64,
    #[serde(default = "default_trusted_domain_bonus")]
    pub trusted_domain_bonus: i32,
    #[serde(default = "default_model_path")]
    pub ml_model_path: String,
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    #[serde(default)]
    pub caps: ScoreCaps,
    #[serde(default)]
    pub thresholds: CategoryThresholds,
    #[serde(default = "default_company_rules")]
    pub company_rules: Vec<WeightedRule>,
    #[serde(default)]
    pub payment: PaymentRules,
    #[serde(default)]
    pub behavior: BehaviorWeights,
    #[serde(default)]
    pub ml: MlScoring,
    #[serde(default)]
    pub structure: StructureBonuses,
    #[serde(default)]
    pub trust: TrustBonuses,
    #[serde(default)]
    pub phrases: PhraseLibrary,
    #[serde(default)]
    pub guardrail: GuardrailLexicon,
    #[serde(default)]
    pub agents: AgentConfig,
}

pub fn load_config(path: Option<&str>) -> Result<RiskConfig, GuardError> {
    let default_path = Path::new("config/offerguard.toml");
    let path = path.map(Path::new).unwrap_or(default_path);

    if !path.exists() {
        return Ok(RiskConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| GuardError::Config(e.to_string()))?;
    let cfg: RiskConfig =
        toml::from_str(&content).map_err(|e| GuardError::Config(e.to_string()))?;
    cfg.validate()?;
    Ok(cfg)
}

impl RiskConfig {
    pub fn validate(&self) -> Result<(), GuardError> {
        if self.thresholds.low_below <= 0
            || self.thresholds.low_below >= self.thresholds.caution_below
            || self.thresholds.caution_below > 100
        {
            return Err(GuardError::Config(format!(
                "category thresholds must be strictly ascending within (0, 100]: low_below={}, caution_below={}",
                self.thresholds.low_below, self.thresholds.caution_below
            )));
        }
        for (name, cap) in [
            ("company", self.caps.company),
            ("payment", self.caps.payment),
            ("behavior", self.caps.behavior),
            ("ml", self.caps.ml),
        ] {
            if cap <= 0 {
                return Err(GuardError::Config(format!(
                    "cap for {name} must be positive"
                )));
            }
        }
        if self.caps.ml >= self.caps.company
            || self.caps.ml >= self.caps.payment
            || self.caps.ml >= self.caps.behavior
        {
            return Err(GuardError::Config(
                "ml cap must stay strictly below every rule-based cap".to_string(),
            ));
        }
        if self.guardrail.forbidden.is_empty() {
            return Err(GuardError::Config(
                "guardrail vocabulary must not be empty".to_string(),
            ));
        }
        if self.guardrail.neutral_clause.trim().is_empty() {
            return Err(GuardError::Config(
                "guardrail neutral clause must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            caps: ScoreCaps::default(),
            thresholds: CategoryThresholds::default(),
            company_rules: default_company_rules(),
            payment: PaymentRules::default(),
            behavior: BehaviorWeights::default(),
            ml: MlScoring::default(),
            structure: StructureBonuses::default(),
            trust: TrustBonuses::default(),
            phrases: PhraseLibrary::default(),
            guardrail: GuardrailLexicon::default(),
            agents: AgentConfig::default(),
        }
    }
}

impl Default for ScoreCaps {
    fn default() -> Self {
        Self {
            company: default_company_cap(),
            payment: default_payment_cap(),
            behavior: default_behavior_cap(),
            ml: default_ml_cap(),
        }
    }
}

impl Default for CategoryThresholds {
    fn default() -> Self {
        Self {
            low_below: default_low_below(),
            caution_below: default_caution_below(),
        }
    }
}

impl Default for PaymentRules {
    fn default() -> Self {
        Self {
            rules: default_payment_rules(),
            negation_phrases: default_negation_phrases(),
        }
    }
}

impl Default for BehaviorWeights {
    fn default() -> Self {
        Self {
            hard_urgency: default_hard_urgency_weight(),
            scarcity: default_scarcity_weight(),
            manipulation: default_manipulation_weight(),
            missing_process: default_missing_process_weight(),
            missing_process_needle: default_missing_process_needle(),
        }
    }
}

impl Default for MlScoring {
    fn default() -> Self {
        Self {
            base_low: default_ml_base_low(),
            base_medium: default_ml_base_medium(),
            base_high: default_ml_base_high(),
        }
    }
}

impl Default for StructureBonuses {
    fn default() -> Self {
        Self {
            interview: default_interview_bonus(),
            interview_keywords: default_interview_keywords(),
            mentorship: default_mentorship_bonus(),
            mentorship_keywords: default_mentorship_keywords(),
            stipend: default_stipend_bonus(),
            stipend_keywords: default_stipend_keywords(),
        }
    }
}

impl Default for TrustBonuses {
    fn default() -> Self {
        Self {
            no_fee: default_no_fee_bonus(),
            no_fee_phrases: default_no_fee_phrases(),
            careers_url: default_careers_url_bonus(),
            corporate_email: default_corporate_email_bonus(),
            free_email_markers: default_free_email_markers(),
        }
    }
}

impl Default for PhraseLibrary {
    fn default() -> Self {
        Self {
            company: default_company_phrases(),
            payment: default_payment_phrases(),
            behavior: default_behavior_phrases(),
            ml: default_ml_phrases(),
            summary_low: default_summary_low(),
            summary_caution: default_summary_caution(),
            summary_high: default_summary_high(),
            fallback_summary: default_fallback_summary(),
            disclaimer: default_disclaimer(),
        }
    }
}

impl Default for GuardrailLexicon {
    fn default() -> Self {
        Self {
            forbidden: default_forbidden_vocabulary(),
            accusatory_patterns: default_accusatory_patterns(),
            neutral_clause: default_neutral_clause(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            trusted_domains: default_trusted_domains(),
            free_email_domains: default_free_email_domains(),
            suspicious_tlds: default_suspicious_tlds(),
            domain_keywords: default_domain_keywords(),
            lookalike_threshold: default_lookalike_threshold(),
            trusted_domain_bonus: default_trusted_domain_bonus(),
            ml_model_path: default_model_path(),
            min_text_chars: default_min_text_chars(),
            request_timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_company_cap() -> i32 {
    35
}

fn default_payment_cap() -> i32 {
    40
}

fn default_behavior_cap() -> i32 {
    45
}

fn default_ml_cap() -> i32 {
    15
}

fn default_low_below() -> i32 {
    40
}

fn default_caution_below() -> i32 {
    70
}

fn default_company_rules() -> Vec<WeightedRule> {
    [
        ("could not be reached", 12),
        ("closely resembles", 12),
        ("free email domain", 10),
        ("does not match website domain", 10),
        ("http (not https)", 8),
        ("higher-risk domain extension", 8),
        ("recruitment or payment keywords", 8),
        ("server error", 6),
    ]
    .into_iter()
    .map(|(needle, weight)| WeightedRule {
        needle: needle.to_string(),
        weight,
    })
    .collect()
}

fn default_payment_rules() -> Vec<PaymentRule> {
    vec![
        PaymentRule {
            needle: "requested before".to_string(),
            weight: 20,
            strong: true,
        },
        PaymentRule {
            needle: "payment mentioned".to_string(),
            weight: 15,
            strong: false,
        },
        PaymentRule {
            needle: "specific payment amount".to_string(),
            weight: 10,
            strong: true,
        },
        PaymentRule {
            needle: "high-pressure".to_string(),
            weight: 10,
            strong: false,
        },
    ]
}

fn default_negation_phrases() -> Vec<String> {
    [
        "no fee",
        "no fees",
        "no payment",
        "no charges",
        "no registration fee",
        "free of charge",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_hard_urgency_weight() -> i32 {
    15
}

fn default_scarcity_weight() -> i32 {
    6
}

fn default_manipulation_weight() -> i32 {
    20
}

fn default_missing_process_weight() -> i32 {
    10
}

fn default_missing_process_needle() -> String {
    "no clear interview".to_string()
}

fn default_ml_base_low() -> i32 {
    4
}

fn default_ml_base_medium() -> i32 {
    10
}

fn default_ml_base_high() -> i32 {
    18
}

fn default_interview_bonus() -> i32 {
    20
}

fn default_interview_keywords() -> Vec<String> {
    [
        "interview",
        "hr discussion",
        "resume screening",
        "selection process",
        "screening",
        "assessment",
        "shortlisted",
        "call with founders",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_mentorship_bonus() -> i32 {
    8
}

fn default_mentorship_keywords() -> Vec<String> {
    ["mentor", "mentorship", "hands-on learning"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_stipend_bonus() -> i32 {
    5
}

fn default_stipend_keywords() -> Vec<String> {
    vec!["stipend".to_string()]
}

fn default_no_fee_bonus() -> i32 {
    30
}

fn default_no_fee_phrases() -> Vec<String> {
    [
        "no fees",
        "no fee",
        "no payment",
        "no charges",
        "no registration fee",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_careers_url_bonus() -> i32 {
    10
}

fn default_corporate_email_bonus() -> i32 {
    5
}

fn default_free_email_markers() -> Vec<String> {
    ["@gmail.com", "@yahoo.com", "@outlook.com", "@hotmail.com"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_company_phrases() -> SourcePhrases {
    SourcePhrases {
        rules: phrase_rules(&[
            (
                "could not be reached",
                "The company website could not be reached, which may make verification difficult.",
            ),
            (
                "server error",
                "The company website returned a server error, so it could not be verified reliably.",
            ),
            (
                "http (not https)",
                "The company website does not appear to use HTTPS, which is less common for established organizations.",
            ),
            (
                "free email domain",
                "Communication appears to use a free email domain rather than an official company domain.",
            ),
            (
                "does not match website domain",
                "The email domain does not match the website domain, which may require additional verification.",
            ),
            (
                "higher-risk domain extension",
                "The website uses a domain extension that appears more often in short-lived sites.",
            ),
            (
                "recruitment or payment keywords",
                "The website domain name emphasizes recruitment or payment wording, which is uncommon for established employers.",
            ),
            (
                "closely resembles",
                "The website domain appears similar to, but not the same as, a well-known company domain.",
            ),
        ]),
        none_matched:
            "No significant concerns were observed related to the company's online presence."
                .to_string(),
        not_analyzed: "The company's online presence was not analyzed for this message."
            .to_string(),
    }
}

fn default_payment_phrases() -> SourcePhrases {
    SourcePhrases {
        rules: phrase_rules(&[
            (
                "requested before",
                "Payment appears to be requested before the internship begins, which is uncommon and may require careful verification.",
            ),
            (
                "specific payment amount",
                "A specific payment amount is mentioned in the communication.",
            ),
            (
                "high-pressure",
                "Time-sensitive language is used around payment, which may increase pressure on the applicant.",
            ),
            (
                "payment mentioned",
                "Payment-related wording appears in the communication and may be worth clarifying.",
            ),
        ]),
        none_matched: "No unusual payment-related patterns were detected.".to_string(),
        not_analyzed: "Payment-related language was not analyzed for this message.".to_string(),
    }
}

fn default_behavior_phrases() -> SourcePhrases {
    SourcePhrases {
        rules: phrase_rules(&[
            (
                "urgency",
                "Urgency-focused language is used, which may encourage rushed decision-making.",
            ),
            (
                "scarcity",
                "Scarcity framing such as limited seats appears, which may add pressure even though it is weak evidence on its own.",
            ),
            (
                "manipulat",
                "Certain phrases suggest guaranteed outcomes or simplified processes, which may warrant caution.",
            ),
            (
                "no clear interview",
                "No interview or selection process appears to be described, which is uncommon for structured internships.",
            ),
        ]),
        none_matched:
            "The communication tone appears balanced without strong urgency or pressure."
                .to_string(),
        not_analyzed: "Behavioral language was not analyzed for this message.".to_string(),
    }
}

fn default_ml_phrases() -> SourcePhrases {
    SourcePhrases {
        rules: phrase_rules(&[
            (
                "low",
                "Language patterns are similar to lower-risk internship communications.",
            ),
            (
                "medium",
                "Some language patterns resemble those found in higher-risk communications.",
            ),
            (
                "high",
                "The language shows multiple patterns commonly associated with higher-risk internship messages.",
            ),
        ]),
        none_matched: "Language-model analysis did not identify strong risk-related patterns."
            .to_string(),
        not_analyzed: "Language-model analysis was not available for this message.".to_string(),
    }
}

fn phrase_rules(pairs: &[(&str, &str)]) -> Vec<PhraseRule> {
    pairs
        .iter()
        .map(|(needle, sentence)| PhraseRule {
            needle: needle.to_string(),
            sentence: sentence.to_string(),
        })
        .collect()
}

fn default_summary_low() -> String {
    "This internship communication shows relatively few concerning patterns (risk score: {score}/100). Independent verification is still recommended.".to_string()
}

fn default_summary_caution() -> String {
    "This internship communication shows some concerning patterns (risk score: {score}/100). Proceed with caution and verify details carefully.".to_string()
}

fn default_summary_high() -> String {
    "This internship communication shows multiple concerning patterns (risk score: {score}/100). Extra caution and thorough verification are strongly advised.".to_string()
}

fn default_fallback_summary() -> String {
    "A detailed explanation is not available for this assessment. Please verify the opportunity independently before proceeding.".to_string()
}

fn default_disclaimer() -> String {
    "This assessment is advisory and based on observable patterns only. It does not confirm wrongdoing and should be used as guidance alongside independent verification.".to_string()
}

fn default_forbidden_vocabulary() -> Vec<VocabularyEntry> {
    [
        ("scam", "potential risk indicator"),
        ("fraud", "potentially misleading pattern"),
        ("fake", "unverified"),
        ("cheat", "unethical behavior"),
        ("criminal", "serious concern"),
        ("illegal", "possibly non-compliant"),
        ("con", "misleading practice"),
        ("hoax", "unverified claim"),
        ("ponzi", "high-risk financial pattern"),
        ("extortion", "coercive behavior"),
    ]
    .into_iter()
    .map(|(word, replacement)| VocabularyEntry {
        word: word.to_string(),
        replacement: replacement.to_string(),
    })
    .collect()
}

fn default_accusatory_patterns() -> Vec<String> {
    [
        r"\bthis is (a )?(scam|fraud)\b",
        r"\bdefinitely (a )?(scam|fraud)\b",
        r"\bobviously (a )?(scam|fraud|fake)\b",
        r"\bguaranteed (to be )?(a )?(scam|fraud)\b",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_neutral_clause() -> String {
    "shows patterns that may require careful verification".to_string()
}

fn default_trusted_domains() -> Vec<String> {
    [
        "tcs.com",
        "microsoft.com",
        "google.com",
        "amazon.com",
        "ibm.com",
        "infosys.com",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_free_email_domains() -> Vec<String> {
    [
        "gmail.com",
        "yahoo.com",
        "outlook.com",
        "hotmail.com",
        "icloud.com",
        "aol.com",
        "protonmail.com",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_suspicious_tlds() -> Vec<String> {
    [
        ".xyz", ".click", ".top", ".live", ".site", ".online", ".work", ".loan",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_domain_keywords() -> Vec<String> {
    ["internship", "offer", "confirm", "registration", "payment"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_lookalike_threshold() -> f64 {
    0.92
}

fn default_trusted_domain_bonus() -> i32 {
    -25
}

fn default_model_path() -> String {
    "ml/model.json".to_string()
}

fn default_min_text_chars() -> usize {
    20
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_user_agent() -> String {
    "offerguard/0.3".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        RiskConfig::default().validate().unwrap();
    }

    #[test]
    fn ml_cap_below_rule_caps() {
        let cfg = RiskConfig::default();
        assert!(cfg.caps.ml < cfg.caps.company);
        assert!(cfg.caps.ml < cfg.caps.payment);
        assert!(cfg.caps.ml < cfg.caps.behavior);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let mut cfg = RiskConfig::default();
        cfg.thresholds.low_below = 80;
        cfg.thresholds.caution_below = 40;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn toml_overrides_merge_over_defaults() {
        let cfg: RiskConfig = toml::from_str(
            r#"
            [caps]
            payment = 50

            [thresholds]
            low_below = 35
            "#,
        )
        .unwrap();
        assert_eq!(cfg.caps.payment, 50);
        assert_eq!(cfg.caps.behavior, 45);
        assert_eq!(cfg.thresholds.low_below, 35);
        assert_eq!(cfg.thresholds.caution_below, 70);
        cfg.validate().unwrap();
    }
}
