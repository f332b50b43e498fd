use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::core::error::GuardError;
use crate::core::record::{MlRiskLevel, MlSignal};

/// Probability cut points for bucketing the classifier output.
const LEVEL_LOW_BELOW: f64 = 0.3;
const LEVEL_MEDIUM_BELOW: f64 = 0.6;

/// Sparse logistic model over term counts, loaded once from a JSON weights
/// file exported by the training side. A missing file means the ML source
/// is simply absent from assessments.
#[derive(Debug, Clone, Deserialize)]
pub struct MlModel {
    pub bias: f64,
    pub weights: HashMap<String, f64>,
}

impl MlModel {
    pub fn load(path: &Path) -> Result<Self, GuardError> {
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| GuardError::Config(e.to_string()))
    }

    /// Score the text, or return None when it is too short to judge.
    pub fn classify(&self, text: &str, min_chars: usize) -> Option<MlSignal> {
        if text.trim().len() < min_chars {
            return None;
        }

        let mut activation = self.bias;
        for token in tokenize(text) {
            if let Some(weight) = self.weights.get(&token) {
                activation += weight;
            }
        }
        let probability = sigmoid(activation);

        let level = if probability < LEVEL_LOW_BELOW {
            MlRiskLevel::Low
        } else if probability < LEVEL_MEDIUM_BELOW {
            MlRiskLevel::Medium
        } else {
            MlRiskLevel::High
        };

        Some(MlSignal {
            used: true,
            probability,
            level,
        })
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> MlModel {
        MlModel {
            bias: -2.0,
            weights: HashMap::from([
                ("fee".to_string(), 1.5),
                ("guaranteed".to_string(), 1.2),
                ("upfront".to_string(), 1.4),
                ("mentorship".to_string(), -1.0),
            ]),
        }
    }

    #[test]
    fn short_text_is_not_classified() {
        assert!(model().classify("pay fee", 20).is_none());
    }

    #[test]
    fn risky_terms_push_probability_and_level_up() {
        let model = model();
        let risky = model
            .classify("guaranteed internship, pay the fee upfront right away", 20)
            .unwrap();
        let calm = model
            .classify("structured mentorship program with weekly reviews", 20)
            .unwrap();
        assert!(risky.probability > calm.probability);
        assert_eq!(risky.level, MlRiskLevel::High);
        assert_eq!(calm.level, MlRiskLevel::Low);
        assert!(risky.used);
    }

    #[test]
    fn tokenization_ignores_punctuation_and_case() {
        let model = model();
        let with_punct = model.classify("FEE! Fee, fee... guaranteed?? upfront.", 10).unwrap();
        let plain = model.classify("fee fee fee guaranteed upfront", 10).unwrap();
        assert!((with_punct.probability - plain.probability).abs() < 1e-9);
    }
}
