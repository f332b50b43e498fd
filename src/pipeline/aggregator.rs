use crate::config::{CategoryThresholds, RiskConfig, StructureBonuses, TrustBonuses};
use crate::core::record::{RiskCategory, RiskResult, ScoreBreakdown, SignalRecord, SignalSource};
use crate::pipeline::scorer::{
    score_behavior, score_company, score_ml, score_payment, CompanyScore, SourceScore,
};

#[derive(Debug, Clone)]
pub struct PipelineScores {
    pub company: CompanyScore,
    pub payment: SourceScore,
    pub behavior: SourceScore,
    pub ml: SourceScore,
}

pub fn score_record(record: &SignalRecord, cfg: &RiskConfig) -> PipelineScores {
    PipelineScores {
        company: score_company(record.company.as_ref(), cfg),
        payment: score_payment(record.payment.as_ref(), &record.raw_text, cfg),
        behavior: score_behavior(record.behavior.as_ref(), cfg),
        ml: score_ml(record.ml.as_ref(), cfg),
    }
}

/// Combine capped sub-scores, subtract structure and trust bonuses found in
/// the raw message, clamp to [0, 100] and resolve the category.
///
/// Trust bonuses read the raw text rather than any single agent's output:
/// legitimacy evidence may be stated anywhere in the message even when no
/// agent flagged it.
pub fn aggregate(record: &SignalRecord, cfg: &RiskConfig) -> RiskResult {
    let scores = score_record(record, cfg);
    let text = record.raw_text.to_lowercase();

    let mut breakdown = ScoreBreakdown::new();
    let mut total = 0;

    breakdown.push(SignalSource::Company.name(), scores.company.rules);
    total += scores.company.rules;
    breakdown.push("company_trust", scores.company.trust);
    total += scores.company.trust;
    breakdown.push(SignalSource::Payment.name(), scores.payment.subscore);
    total += scores.payment.subscore;
    breakdown.push(SignalSource::Behavior.name(), scores.behavior.subscore);
    total += scores.behavior.subscore;
    breakdown.push(SignalSource::Ml.name(), scores.ml.subscore);
    total += scores.ml.subscore;

    let structure = structure_bonus(&text, &cfg.structure);
    breakdown.push("structure_bonus", -structure);
    total -= structure;

    let trust = trust_bonus(&text, &cfg.trust);
    breakdown.push("trust_bonus", -trust);
    total -= trust;

    let score = total.clamp(0, 100);
    let category = categorize(score, &cfg.thresholds);

    RiskResult {
        score,
        category,
        breakdown,
        reasons: vec![
            (SignalSource::Company, scores.company.reasons),
            (SignalSource::Payment, scores.payment.reasons),
            (SignalSource::Behavior, scores.behavior.reasons),
            (SignalSource::Ml, scores.ml.reasons),
        ],
    }
}

/// Ordered thresholds, first matching bound wins. Strict less-than keeps
/// boundary scores out of two categories at once.
pub fn categorize(score: i32, thresholds: &CategoryThresholds) -> RiskCategory {
    if score < thresholds.low_below {
        RiskCategory::Low
    } else if score < thresholds.caution_below {
        RiskCategory::Caution
    } else {
        RiskCategory::High
    }
}

fn structure_bonus(text: &str, cfg: &StructureBonuses) -> i32 {
    let mut bonus = 0;
    if contains_any(text, &cfg.interview_keywords) {
        bonus += cfg.interview;
    }
    if contains_any(text, &cfg.mentorship_keywords) {
        bonus += cfg.mentorship;
    }
    if contains_any(text, &cfg.stipend_keywords) {
        bonus += cfg.stipend;
    }
    bonus
}

fn trust_bonus(text: &str, cfg: &TrustBonuses) -> i32 {
    let mut bonus = 0;
    if contains_any(text, &cfg.no_fee_phrases) {
        bonus += cfg.no_fee;
    }
    if text.contains("https://") && text.contains("careers") {
        bonus += cfg.careers_url;
    }
    if text.contains('@') && !contains_any(text, &cfg.free_email_markers) {
        bonus += cfg.corporate_email;
    }
    bonus
}

fn contains_any(text: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| text.contains(needle.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{BehaviorSignal, CompanySignal, MlRiskLevel, MlSignal, PaymentSignal};
    use crate::pipeline::scorer::NOT_ANALYZED;

    fn cfg() -> RiskConfig {
        RiskConfig::default()
    }

    #[test]
    fn empty_record_scores_zero_and_low() {
        let cfg = cfg();
        let record = SignalRecord::default();
        let result = aggregate(&record, &cfg);

        assert_eq!(result.score, 0);
        assert_eq!(result.category, RiskCategory::Low);
        for (_, points) in result.breakdown.iter() {
            assert_eq!(points, 0);
        }
        for (_, reasons) in &result.reasons {
            assert_eq!(reasons, &vec![NOT_ANALYZED.to_string()]);
        }
    }

    #[test]
    fn stacked_negative_evidence_lands_high() {
        let cfg = cfg();
        let record = SignalRecord {
            payment: Some(PaymentSignal {
                observations: vec![
                    "Payment appears to be requested before the internship starts".into(),
                    "Specific payment amount mentioned".into(),
                    "Payment mentioned in the communication".into(),
                    "High-pressure language used around payment".into(),
                ],
            }),
            behavior: Some(BehaviorSignal {
                hard_urgency_terms: vec!["within 24 hours".into()],
                manipulation_terms: vec!["guaranteed placement".into()],
                observations: vec![
                    "Strong urgency or pressure language detected".into(),
                    "Manipulative or guaranteed outcome language detected".into(),
                    "No clear interview or selection process mentioned".into(),
                ],
                ..Default::default()
            }),
            ml: Some(MlSignal {
                used: true,
                probability: 0.92,
                level: MlRiskLevel::High,
            }),
            raw_text: "pay rs. 2000 registration fee within 24 hours, guaranteed placement".into(),
            ..Default::default()
        };

        let result = aggregate(&record, &cfg);
        assert_eq!(result.breakdown.get("payment"), Some(cfg.caps.payment));
        assert_eq!(result.breakdown.get("behavior"), Some(cfg.caps.behavior));
        assert!(result.breakdown.get("ml").unwrap() >= cfg.caps.ml - 2);
        assert!(result.score >= 70);
        assert_eq!(result.category, RiskCategory::High);
    }

    #[test]
    fn trust_and_structure_language_pull_score_down() {
        let cfg = cfg();
        let record = SignalRecord {
            company: Some(CompanySignal {
                observations: vec!["No major company legitimacy issues detected".into()],
                trust_adjustment: 0,
            }),
            behavior: Some(BehaviorSignal {
                scarcity_terms: vec!["limited intake".into()],
                observations: vec!["Scarcity language detected (limited slots)".into()],
                ..Default::default()
            }),
            raw_text: "We charge no fees. Interview scheduled next week. \
                       Apply at https://example.com/careers, contact hr@example.com"
                .into(),
            ..Default::default()
        };

        let result = aggregate(&record, &cfg);
        assert_eq!(result.score, 0);
        assert_eq!(result.category, RiskCategory::Low);
        assert!(result.breakdown.get("trust_bonus").unwrap() < 0);
        assert!(result.breakdown.get("structure_bonus").unwrap() < 0);
    }

    #[test]
    fn score_is_clamped_into_range_under_extremes() {
        let cfg = cfg();
        let mut record = SignalRecord {
            company: Some(CompanySignal {
                observations: vec!["Recognized well-known company domain (trust signal)".into()],
                trust_adjustment: -500,
            }),
            raw_text: "no fees, interview, mentorship, stipend, https://example.com/careers"
                .into(),
            ..Default::default()
        };
        let floor = aggregate(&record, &cfg);
        assert_eq!(floor.score, 0);

        record.company = Some(CompanySignal {
            observations: vec!["Website could not be reached (network/timeout)".into()],
            trust_adjustment: 500,
        });
        record.raw_text = "pay the registration fee now".into();
        let ceiling = aggregate(&record, &cfg);
        assert_eq!(ceiling.score, 100);
        assert_eq!(ceiling.category, RiskCategory::High);
    }

    #[test]
    fn every_score_maps_to_exactly_one_category() {
        let thresholds = CategoryThresholds::default();
        for score in 0..=100 {
            let category = categorize(score, &thresholds);
            let expected = if score < thresholds.low_below {
                RiskCategory::Low
            } else if score < thresholds.caution_below {
                RiskCategory::Caution
            } else {
                RiskCategory::High
            };
            assert_eq!(category, expected);
        }
        assert_eq!(
            categorize(thresholds.low_below - 1, &thresholds),
            RiskCategory::Low
        );
        assert_eq!(
            categorize(thresholds.low_below, &thresholds),
            RiskCategory::Caution
        );
        assert_eq!(
            categorize(thresholds.caution_below, &thresholds),
            RiskCategory::High
        );
    }

    #[test]
    fn breakdown_keeps_evaluation_order() {
        let cfg = cfg();
        let result = aggregate(&SignalRecord::default(), &cfg);
        let keys: Vec<&str> = result.breakdown.iter().map(|(name, _)| name).collect();
        assert_eq!(
            keys,
            vec![
                "company",
                "company_trust",
                "payment",
                "behavior",
                "ml",
                "structure_bonus",
                "trust_bonus"
            ]
        );
    }
}
