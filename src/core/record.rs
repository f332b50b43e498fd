use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One upstream detector contributing independent observations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SignalSource {
    Company,
    Payment,
    Behavior,
    Ml,
}

impl SignalSource {
    pub fn name(&self) -> &'static str {
        match self {
            SignalSource::Company => "company",
            SignalSource::Payment => "payment",
            SignalSource::Behavior => "behavior",
            SignalSource::Ml => "ml",
        }
    }
}

/// Output of the company legitimacy agent.
///
/// `trust_adjustment` is a signed offset; recognized legitimate domains
/// push it negative so that trust can offset rule-based risk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanySignal {
    #[serde(default)]
    pub observations: Vec<String>,
    #[serde(default)]
    pub trust_adjustment: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentSignal {
    #[serde(default)]
    pub observations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BehaviorSignal {
    #[serde(default)]
    pub hard_urgency_terms: Vec<String>,
    #[serde(default)]
    pub scarcity_terms: Vec<String>,
    #[serde(default)]
    pub manipulation_terms: Vec<String>,
    #[serde(default)]
    pub observations: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MlRiskLevel {
    Low,
    Medium,
    High,
}

impl MlRiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MlRiskLevel::Low => "low",
            MlRiskLevel::Medium => "medium",
            MlRiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MlSignal {
    pub used: bool,
    pub probability: f64,
    pub level: MlRiskLevel,
}

/// Typed aggregate of all upstream agent outputs for one assessment.
///
/// An absent source means its detector failed or was not selected. Absence
/// is never a negative finding; it scores zero with a "not analyzed" marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalRecord {
    #[serde(default)]
    pub company: Option<CompanySignal>,
    #[serde(default)]
    pub payment: Option<PaymentSignal>,
    #[serde(default)]
    pub behavior: Option<BehaviorSignal>,
    #[serde(default)]
    pub ml: Option<MlSignal>,
    #[serde(default)]
    pub raw_text: String,
}

/// Source-name to sub-score map. Insertion order is evaluation order and is
/// preserved through serialization; bonus entries may be negative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    entries: Vec<(String, i32)>,
}

impl ScoreBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: impl Into<String>, points: i32) {
        self.entries.push((source.into(), points));
    }

    pub fn get(&self, source: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|(name, _)| name == source)
            .map(|(_, points)| *points)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.entries.iter().map(|(name, points)| (name.as_str(), *points))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ScoreBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, points) in &self.entries {
            map.serialize_entry(name, points)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScoreBreakdown {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BreakdownVisitor;

        impl<'de> Visitor<'de> for BreakdownVisitor {
            type Value = ScoreBreakdown;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of source name to integer sub-score")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut breakdown = ScoreBreakdown::new();
                while let Some((name, points)) = access.next_entry::<String, i32>()? {
                    breakdown.push(name, points);
                }
                Ok(breakdown)
            }
        }

        deserializer.deserialize_map(BreakdownVisitor)
    }
}

/// Discrete risk category, resolved from the clamped score by ordered
/// thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskCategory {
    Low,
    Caution,
    High,
}

impl RiskCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low Risk Indicators",
            RiskCategory::Caution => "Caution Advised",
            RiskCategory::High => "High Risk Indicators",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskResult {
    pub score: i32,
    pub category: RiskCategory,
    pub breakdown: ScoreBreakdown,
    /// Per-source reason lists, in evaluation order.
    pub reasons: Vec<(SignalSource, Vec<String>)>,
}

impl RiskResult {
    pub fn reasons_for(&self, source: SignalSource) -> Option<&[String]> {
        self.reasons
            .iter()
            .find(|(s, _)| *s == source)
            .map(|(_, list)| list.as_slice())
    }
}

/// User-facing assessment before guardrail sanitization. Must pass through
/// the guardrail stage before leaving the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplanationPayload {
    pub risk_category: String,
    pub risk_score: i32,
    pub summary: String,
    pub explanations: Vec<String>,
    pub breakdown: ScoreBreakdown,
    pub disclaimer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_preserves_insertion_order() {
        let mut breakdown = ScoreBreakdown::new();
        breakdown.push("payment", 40);
        breakdown.push("behavior", 45);
        breakdown.push("trust_bonus", -30);

        let keys: Vec<&str> = breakdown.iter().map(|(name, _)| name).collect();
        assert_eq!(keys, vec!["payment", "behavior", "trust_bonus"]);

        let json = serde_json::to_string(&breakdown).unwrap();
        assert_eq!(json, r#"{"payment":40,"behavior":45,"trust_bonus":-30}"#);
    }

    #[test]
    fn breakdown_roundtrips_through_json() {
        let mut breakdown = ScoreBreakdown::new();
        breakdown.push("company", 15);
        breakdown.push("company_trust", -25);

        let json = serde_json::to_string(&breakdown).unwrap();
        let back: ScoreBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(back, breakdown);
    }

    #[test]
    fn absent_sources_deserialize_as_none() {
        let record: SignalRecord =
            serde_json::from_str(r#"{"raw_text":"join our internship"}"#).unwrap();
        assert!(record.company.is_none());
        assert!(record.payment.is_none());
        assert!(record.behavior.is_none());
        assert!(record.ml.is_none());
    }
}
