use crate::config::{RiskConfig, SourcePhrases};
use crate::core::record::{ExplanationPayload, RiskCategory, RiskResult, SignalSource};
use crate::pipeline::scorer::NOT_ANALYZED;

/// Map a risk result into advisory prose. Each source's reasons are matched
/// against the phrase library by substring; sources with nothing to say get
/// one neutral sentence so absence is visible, never hidden.
pub fn explain(result: &RiskResult, cfg: &RiskConfig) -> ExplanationPayload {
    let mut explanations = Vec::new();
    for (source, reasons) in &result.reasons {
        let phrases = phrases_for(*source, cfg);
        explanations.extend(explain_source(phrases, reasons));
    }

    ExplanationPayload {
        risk_category: result.category.label().to_string(),
        risk_score: result.score,
        summary: summary(result.category, result.score, cfg),
        explanations,
        breakdown: result.breakdown.clone(),
        disclaimer: cfg.phrases.disclaimer.clone(),
    }
}

fn phrases_for(source: SignalSource, cfg: &RiskConfig) -> &SourcePhrases {
    match source {
        SignalSource::Company => &cfg.phrases.company,
        SignalSource::Payment => &cfg.phrases.payment,
        SignalSource::Behavior => &cfg.phrases.behavior,
        SignalSource::Ml => &cfg.phrases.ml,
    }
}

fn explain_source(phrases: &SourcePhrases, reasons: &[String]) -> Vec<String> {
    if reasons.iter().any(|r| r == NOT_ANALYZED) {
        return vec![phrases.not_analyzed.clone()];
    }

    let lowered: Vec<String> = reasons.iter().map(|r| r.to_lowercase()).collect();
    let mut sentences = Vec::new();
    for rule in &phrases.rules {
        if lowered.iter().any(|r| r.contains(&rule.needle)) {
            sentences.push(rule.sentence.clone());
        }
    }
    if sentences.is_empty() {
        sentences.push(phrases.none_matched.clone());
    }
    sentences
}

/// Summary wording branches only on category; the score is interpolated
/// into a fixed template.
fn summary(category: RiskCategory, score: i32, cfg: &RiskConfig) -> String {
    let template = match category {
        RiskCategory::Low => &cfg.phrases.summary_low,
        RiskCategory::Caution => &cfg.phrases.summary_caution,
        RiskCategory::High => &cfg.phrases.summary_high,
    };
    template.replace("{score}", &score.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::ScoreBreakdown;
    use crate::pipeline::aggregator::aggregate;
    use crate::core::record::SignalRecord;

    fn cfg() -> RiskConfig {
        RiskConfig::default()
    }

    fn result_with_reasons(reasons: Vec<(SignalSource, Vec<String>)>) -> RiskResult {
        RiskResult {
            score: 10,
            category: RiskCategory::Low,
            breakdown: ScoreBreakdown::new(),
            reasons,
        }
    }

    #[test]
    fn absent_sources_get_neutral_not_analyzed_sentences() {
        let cfg = cfg();
        let result = aggregate(&SignalRecord::default(), &cfg);
        let payload = explain(&result, &cfg);

        assert_eq!(payload.explanations.len(), 4);
        assert!(payload
            .explanations
            .contains(&cfg.phrases.company.not_analyzed));
        assert!(payload
            .explanations
            .contains(&cfg.phrases.payment.not_analyzed));
        assert!(payload
            .explanations
            .contains(&cfg.phrases.behavior.not_analyzed));
        assert!(payload.explanations.contains(&cfg.phrases.ml.not_analyzed));
    }

    #[test]
    fn each_matched_pattern_yields_one_sentence() {
        let cfg = cfg();
        let result = result_with_reasons(vec![(
            SignalSource::Company,
            vec![
                "Free email domain used for communication".into(),
                "Email domain does not match website domain".into(),
            ],
        )]);
        let payload = explain(&result, &cfg);
        assert_eq!(payload.explanations.len(), 2);
        assert!(payload.explanations[0].contains("free email domain"));
        assert!(payload.explanations[1].contains("does not match the website domain"));
    }

    #[test]
    fn unmatched_reasons_fall_back_to_neutral_sentence() {
        let cfg = cfg();
        let result = result_with_reasons(vec![(
            SignalSource::Payment,
            vec!["No unusual payment patterns detected".into()],
        )]);
        let payload = explain(&result, &cfg);
        assert_eq!(
            payload.explanations,
            vec![cfg.phrases.payment.none_matched.clone()]
        );
    }

    #[test]
    fn summary_branches_on_category_and_interpolates_score() {
        let cfg = cfg();
        let mut result = result_with_reasons(vec![]);
        result.score = 82;
        result.category = RiskCategory::High;
        let payload = explain(&result, &cfg);
        assert!(payload.summary.contains("82/100"));
        assert!(payload.summary.contains("multiple concerning patterns"));
        assert_eq!(payload.risk_category, "High Risk Indicators");
    }

    #[test]
    fn templates_avoid_certainty_claims_and_forbidden_words() {
        let cfg = cfg();
        let mut texts = vec![
            cfg.phrases.summary_low.clone(),
            cfg.phrases.summary_caution.clone(),
            cfg.phrases.summary_high.clone(),
            cfg.phrases.fallback_summary.clone(),
            cfg.phrases.disclaimer.clone(),
        ];
        for phrases in [
            &cfg.phrases.company,
            &cfg.phrases.payment,
            &cfg.phrases.behavior,
            &cfg.phrases.ml,
        ] {
            texts.extend(phrases.rules.iter().map(|r| r.sentence.clone()));
            texts.push(phrases.none_matched.clone());
            texts.push(phrases.not_analyzed.clone());
        }

        for text in texts {
            let lowered = text.to_lowercase();
            for certainty in ["definitely", "certainly", "obviously", "proves"] {
                assert!(
                    !lowered.contains(certainty),
                    "certainty claim {certainty:?} in template: {text}"
                );
            }
            for entry in &cfg.guardrail.forbidden {
                let needle = format!(" {} ", entry.word);
                assert!(
                    !format!(" {lowered} ").contains(&needle),
                    "forbidden word {:?} in template: {text}",
                    entry.word
                );
            }
        }
    }
}
