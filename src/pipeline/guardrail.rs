use regex::{NoExpand, Regex, RegexBuilder};
use serde::Serialize;

use crate::config::GuardrailLexicon;
use crate::core::error::GuardError;
use crate::core::record::ExplanationPayload;

/// A payload that has passed the guardrail. The inner value is private and
/// there is no public constructor, so no code path can emit an unverified
/// payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct SafePayload {
    inner: ExplanationPayload,
}

impl SafePayload {
    pub fn payload(&self) -> &ExplanationPayload {
        &self.inner
    }

    pub fn into_inner(self) -> ExplanationPayload {
        self.inner
    }
}

/// A forbidden term or accusatory pattern that survived sanitization,
/// located by field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub detail: String,
}

/// Guardrail vocabulary compiled to regexes. Forbidden words match on word
/// boundaries (with plural forms), so a replacement like "serious concern"
/// can never re-trigger the entry for "con"; `compile` rejects any lexicon
/// whose replacements or neutral clause fail their own scan.
pub struct CompiledLexicon {
    forbidden: Vec<(Regex, String)>,
    accusatory: Vec<Regex>,
    neutral_clause: String,
}

impl CompiledLexicon {
    pub fn compile(lexicon: &GuardrailLexicon) -> Result<Self, GuardError> {
        let mut forbidden = Vec::new();
        for entry in &lexicon.forbidden {
            let pattern = format!(r"\b{}(?:es|s)?\b", regex::escape(&entry.word));
            let re = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| GuardError::Config(e.to_string()))?;
            forbidden.push((re, entry.replacement.clone()));
        }

        let mut accusatory = Vec::new();
        for pattern in &lexicon.accusatory_patterns {
            let re = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| GuardError::Config(e.to_string()))?;
            accusatory.push(re);
        }

        let compiled = Self {
            forbidden,
            accusatory,
            neutral_clause: lexicon.neutral_clause.clone(),
        };
        compiled.check_library_consistency()?;
        Ok(compiled)
    }

    /// Replacements and the neutral clause must scan clean against the whole
    /// table, otherwise sanitization could never converge.
    fn check_library_consistency(&self) -> Result<(), GuardError> {
        let mut candidates: Vec<&str> = self
            .forbidden
            .iter()
            .map(|(_, replacement)| replacement.as_str())
            .collect();
        candidates.push(self.neutral_clause.as_str());

        for candidate in candidates {
            let mut violations = Vec::new();
            self.scan_str(candidate, "lexicon", &mut violations);
            if !violations.is_empty() {
                return Err(GuardError::Config(format!(
                    "guardrail replacement {candidate:?} matches the forbidden table: {}",
                    violations[0].detail
                )));
            }
        }
        Ok(())
    }

    fn sanitize_str(&self, input: &str) -> String {
        let mut out = input.to_string();
        for (re, replacement) in &self.forbidden {
            out = re.replace_all(&out, NoExpand(replacement)).into_owned();
        }
        for re in &self.accusatory {
            out = re
                .replace_all(&out, NoExpand(&self.neutral_clause))
                .into_owned();
        }
        out
    }

    fn scan_str(&self, input: &str, path: &str, violations: &mut Vec<Violation>) {
        for (re, _) in &self.forbidden {
            if let Some(found) = re.find(input) {
                violations.push(Violation {
                    path: path.to_string(),
                    detail: format!("forbidden term {:?}", found.as_str()),
                });
            }
        }
        for re in &self.accusatory {
            if re.is_match(input) {
                violations.push(Violation {
                    path: path.to_string(),
                    detail: format!("accusatory pattern {:?}", re.as_str()),
                });
            }
        }
    }

    fn sanitize_pass(&self, payload: &ExplanationPayload) -> ExplanationPayload {
        ExplanationPayload {
            risk_category: self.sanitize_str(&payload.risk_category),
            risk_score: payload.risk_score,
            summary: self.sanitize_str(&payload.summary),
            explanations: payload
                .explanations
                .iter()
                .map(|s| self.sanitize_str(s))
                .collect(),
            breakdown: payload.breakdown.clone(),
            disclaimer: self.sanitize_str(&payload.disclaimer),
        }
    }

    /// Scan every string field of the payload, reporting the path of each
    /// remaining violation.
    pub fn verify(&self, payload: &ExplanationPayload) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.scan_str(&payload.risk_category, "risk_category", &mut violations);
        self.scan_str(&payload.summary, "summary", &mut violations);
        for (i, sentence) in payload.explanations.iter().enumerate() {
            self.scan_str(sentence, &format!("explanations[{i}]"), &mut violations);
        }
        self.scan_str(&payload.disclaimer, "disclaimer", &mut violations);
        violations
    }
}

/// Sanitize, verify, and re-sanitize once if the verification scan still
/// reports violations. Returns the sanitized payload together with whatever
/// survived the bounded retry (empty in any consistent configuration).
pub fn sanitize(
    payload: ExplanationPayload,
    lexicon: &CompiledLexicon,
) -> (SafePayload, Vec<Violation>) {
    let mut sanitized = lexicon.sanitize_pass(&payload);
    let mut violations = lexicon.verify(&sanitized);
    if !violations.is_empty() {
        sanitized = lexicon.sanitize_pass(&sanitized);
        violations = lexicon.verify(&sanitized);
    }
    (SafePayload { inner: sanitized }, violations)
}

/// Terminal guardrail stage: sanitize with the bounded retry, and fail
/// closed on a persistent violation by emitting a disclaimer-only payload
/// instead of leaking unsafe text.
pub fn enforce(
    payload: ExplanationPayload,
    lexicon: &CompiledLexicon,
    fallback_summary: &str,
) -> SafePayload {
    let (safe, violations) = sanitize(payload, lexicon);
    if violations.is_empty() {
        return safe;
    }

    for violation in &violations {
        tracing::error!(
            path = %violation.path,
            detail = %violation.detail,
            "guardrail violation survived bounded retry; returning fallback payload"
        );
    }

    let stripped = safe.into_inner();
    SafePayload {
        inner: ExplanationPayload {
            risk_category: stripped.risk_category,
            risk_score: stripped.risk_score,
            summary: lexicon.sanitize_str(fallback_summary),
            explanations: Vec::new(),
            breakdown: stripped.breakdown,
            disclaimer: stripped.disclaimer,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GuardrailLexicon, VocabularyEntry};
    use crate::core::record::ScoreBreakdown;

    fn lexicon() -> CompiledLexicon {
        CompiledLexicon::compile(&GuardrailLexicon::default()).unwrap()
    }

    fn payload_with(summary: &str, explanations: Vec<String>) -> ExplanationPayload {
        ExplanationPayload {
            risk_category: "Caution Advised".to_string(),
            risk_score: 55,
            summary: summary.to_string(),
            explanations,
            breakdown: ScoreBreakdown::new(),
            disclaimer: "Advisory guidance only.".to_string(),
        }
    }

    #[test]
    fn forbidden_words_are_replaced_case_insensitively() {
        let lexicon = lexicon();
        let payload = payload_with(
            "This looks like a SCAM and possibly Fraud.",
            vec!["The offer may be fake.".to_string()],
        );
        let (safe, violations) = sanitize(payload, &lexicon);
        assert!(violations.is_empty());
        assert_eq!(
            safe.payload().summary,
            "This looks like a potential risk indicator and possibly potentially misleading pattern."
        );
        assert_eq!(
            safe.payload().explanations,
            vec!["The offer may be unverified.".to_string()]
        );
    }

    #[test]
    fn plural_forms_are_caught() {
        let lexicon = lexicon();
        let payload = payload_with("Watch out for scams and hoaxes.", vec![]);
        let (safe, violations) = sanitize(payload, &lexicon);
        assert!(violations.is_empty());
        assert_eq!(
            safe.payload().summary,
            "Watch out for potential risk indicator and unverified claim."
        );
    }

    #[test]
    fn word_boundaries_leave_benign_words_alone() {
        let lexicon = lexicon();
        let payload = payload_with(
            "Concerning patterns in the contract may need confirmation.",
            vec![],
        );
        let (safe, violations) = sanitize(payload, &lexicon);
        assert!(violations.is_empty());
        assert_eq!(
            safe.payload().summary,
            "Concerning patterns in the contract may need confirmation."
        );
    }

    #[test]
    fn vocabulary_replacement_preempts_accusatory_rewrite() {
        // Vocabulary substitution runs first, so an accusatory sentence is
        // already neutralized word-by-word before the pattern pass sees it.
        let lexicon = lexicon();
        let payload = payload_with("Honestly, this is a scam.", vec![]);
        let (safe, violations) = sanitize(payload, &lexicon);
        assert!(violations.is_empty());
        assert_eq!(
            safe.payload().summary,
            "Honestly, this is a potential risk indicator."
        );
    }

    #[test]
    fn accusatory_sentences_missed_by_vocabulary_are_rewritten() {
        // A lexicon whose vocabulary does not cover "scam" leaves the
        // accusatory pattern pass as the only line of defense.
        let raw = GuardrailLexicon {
            forbidden: vec![VocabularyEntry {
                word: "ponzi".to_string(),
                replacement: "high-risk financial pattern".to_string(),
            }],
            ..GuardrailLexicon::default()
        };
        let lexicon = CompiledLexicon::compile(&raw).unwrap();
        let payload = payload_with("Honestly, this is a scam.", vec![]);
        let (safe, violations) = sanitize(payload, &lexicon);
        assert!(violations.is_empty());
        assert_eq!(
            safe.payload().summary,
            "Honestly, shows patterns that may require careful verification."
        );
    }

    #[test]
    fn verification_reports_zero_matches_after_sanitization() {
        let lexicon = lexicon();
        let payload = payload_with(
            "scam fraud fake cheat criminal illegal con hoax ponzi extortion",
            vec!["guaranteed to be a scam".to_string(), "obviously fake".to_string()],
        );
        let (safe, violations) = sanitize(payload, &lexicon);
        assert!(violations.is_empty());
        assert!(lexicon.verify(safe.payload()).is_empty());
    }

    #[test]
    fn sanitization_is_idempotent() {
        let lexicon = lexicon();
        let payload = payload_with(
            "This is a scam with fees, definitely a fraud.",
            vec!["Cheat alert: con artists run hoaxes.".to_string()],
        );
        let (once, _) = sanitize(payload, &lexicon);
        let (twice, violations) = sanitize(once.payload().clone(), &lexicon);
        assert!(violations.is_empty());
        assert_eq!(once, twice);
    }

    #[test]
    fn inconsistent_library_is_rejected_at_compile() {
        let mut raw = GuardrailLexicon::default();
        raw.forbidden.push(VocabularyEntry {
            word: "bogus".to_string(),
            replacement: "a fake signal".to_string(),
        });
        assert!(CompiledLexicon::compile(&raw).is_err());
    }

    #[test]
    fn cyclic_replacement_table_is_rejected_at_compile() {
        let raw = GuardrailLexicon {
            forbidden: vec![
                VocabularyEntry {
                    word: "alpha".to_string(),
                    replacement: "beta".to_string(),
                },
                VocabularyEntry {
                    word: "beta".to_string(),
                    replacement: "alpha".to_string(),
                },
            ],
            accusatory_patterns: vec![],
            neutral_clause: "needs review".to_string(),
        };
        assert!(CompiledLexicon::compile(&raw).is_err());
    }

    #[test]
    fn persistent_violation_fails_closed_with_fallback() {
        // Bypass compile() to simulate a lexicon that passed review but
        // still cycles at runtime; enforce() must fall back rather than
        // leak the dirty text.
        let word = |w: &str| {
            RegexBuilder::new(&format!(r"\b{w}\b"))
                .case_insensitive(true)
                .build()
                .unwrap()
        };
        let lexicon = CompiledLexicon {
            forbidden: vec![
                (word("alpha"), "beta".to_string()),
                (word("beta"), "alpha".to_string()),
            ],
            accusatory: vec![],
            neutral_clause: "needs review".to_string(),
        };

        let payload = payload_with("alpha all the way", vec!["ok".to_string()]);
        let safe = enforce(payload, &lexicon, "fallback summary");
        assert_eq!(safe.payload().summary, "fallback summary");
        assert!(safe.payload().explanations.is_empty());
        assert_eq!(safe.payload().risk_score, 55);
    }

    #[test]
    fn enforce_passes_clean_payloads_through() {
        let lexicon = lexicon();
        let payload = payload_with("all clear", vec!["nothing unusual".to_string()]);
        let safe = enforce(payload.clone(), &lexicon, "fallback summary");
        assert_eq!(safe.payload(), &payload);
    }
}
