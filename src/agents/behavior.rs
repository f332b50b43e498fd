use crate::core::record::BehaviorSignal;
use crate::intake::IntakeData;

const HARD_URGENCY_WORDS: &[&str] = &[
    "urgent",
    "immediately",
    "asap",
    "within 24 hours",
    "24 hours",
    "deadline",
    "last date",
    "final day",
    "hours left",
    "apply now",
    "pay now",
    "today only",
];

const SCARCITY_WORDS: &[&str] = &[
    "limited slots",
    "few seats",
    "mentor bandwidth",
    "we will onboard only",
    "limited intake",
];

const MANIPULATION_PHRASES: &[&str] = &[
    "guaranteed placement",
    "no interview required",
    "100% placement",
    "instant selection",
    "whatsapp confirmation",
    "confirm your seat",
    "seat confirmation",
    "selected for internship",
    "confirm seat now",
    "instant confirmation",
];

const PROCESS_KEYWORDS: &[&str] = &[
    "interview",
    "assessment",
    "screening",
    "selection",
    "resume screening",
    "technical interview",
    "hr discussion",
    "online interaction",
    "call with founders",
];

/// Behavioral-language detection: hard urgency, scarcity framing,
/// manipulation phrasing, and whether any selection process is described.
pub fn run_behavior_agent(intake: &IntakeData) -> BehaviorSignal {
    let text = intake.raw_text.to_lowercase();
    let mut observations = Vec::new();

    let hard_urgency_terms = matching_terms(&text, HARD_URGENCY_WORDS);
    let scarcity_terms = matching_terms(&text, SCARCITY_WORDS);
    let manipulation_terms = matching_terms(&text, MANIPULATION_PHRASES);

    if !hard_urgency_terms.is_empty() {
        observations.push("Strong urgency or pressure language detected".to_string());
    }
    if !scarcity_terms.is_empty() {
        observations.push("Scarcity language detected (limited slots)".to_string());
    }
    if !manipulation_terms.is_empty() {
        observations.push("Manipulative or guaranteed outcome language detected".to_string());
    }
    if !PROCESS_KEYWORDS.iter().any(|k| text.contains(k)) {
        observations.push("No clear interview or selection process mentioned".to_string());
    }

    if observations.is_empty() {
        observations.push("No concerning behavioral patterns detected".to_string());
    }

    BehaviorSignal {
        hard_urgency_terms,
        scarcity_terms,
        manipulation_terms,
        observations,
    }
}

fn matching_terms(text: &str, terms: &[&str]) -> Vec<String> {
    terms
        .iter()
        .filter(|term| text.contains(*term))
        .map(|term| term.to_string())
        .collect()
}
