pub mod aggregator;
pub mod explainer;
pub mod guardrail;
pub mod scorer;

use std::sync::Arc;

use crate::config::RiskConfig;
use crate::core::error::GuardError;
use crate::core::record::{RiskResult, SignalRecord};
use crate::pipeline::guardrail::{CompiledLexicon, SafePayload};

/// The assembled assessment pipeline: rule scoring, aggregation,
/// explanation and the guardrail, over configuration loaded once. Each
/// stage is a pure function, so an `Assessor` can serve concurrent
/// assessments with shared read-only access.
pub struct Assessor {
    config: Arc<RiskConfig>,
    lexicon: CompiledLexicon,
}

impl Assessor {
    pub fn new(config: Arc<RiskConfig>) -> Result<Self, GuardError> {
        config.validate()?;
        let lexicon = CompiledLexicon::compile(&config.guardrail)?;
        Ok(Self { config, lexicon })
    }

    /// Run the full pipeline. Total over every combination of present and
    /// absent signal sources; the output has passed the guardrail.
    pub fn assess(&self, record: &SignalRecord) -> SafePayload {
        let (_, payload) = self.assess_with_result(record);
        payload
    }

    /// Like [`assess`](Self::assess), also returning the intermediate risk
    /// result for callers that persist history.
    pub fn assess_with_result(&self, record: &SignalRecord) -> (RiskResult, SafePayload) {
        let result = aggregator::aggregate(record, &self.config);
        let explanation = explainer::explain(&result, &self.config);
        let safe = guardrail::enforce(
            explanation,
            &self.lexicon,
            &self.config.phrases.fallback_summary,
        );
        (result, safe)
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }
}
