pub mod behavior;
pub mod company;
pub mod ml;
pub mod payment;

use crate::config::RiskConfig;
use crate::core::record::SignalRecord;
use crate::intake::IntakeData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Company,
    Payment,
    Behavior,
    Ml,
}

/// Shared read-only dependencies for one agent run. A `None` client keeps
/// every agent offline; a `None` model leaves the ML source absent.
pub struct AgentContext<'a> {
    pub config: &'a RiskConfig,
    pub client: Option<&'a reqwest::Client>,
    pub model: Option<&'a ml::MlModel>,
}

/// Deterministic planner: company, behavior and ML always run; the payment
/// agent runs only when intake flagged payment mentions.
pub fn plan_agents(intake: &IntakeData) -> Vec<AgentKind> {
    let mut selected = vec![AgentKind::Company, AgentKind::Behavior, AgentKind::Ml];
    if intake.payment_mentions {
        selected.push(AgentKind::Payment);
    }
    selected
}

/// Run the planned agents and assemble the signal record. An agent that
/// fails or is not selected leaves its source absent; the pipeline scores
/// absence as zero with a "not analyzed" marker.
pub async fn run_agents(intake: &IntakeData, ctx: &AgentContext<'_>) -> SignalRecord {
    let mut record = SignalRecord {
        raw_text: intake.raw_text.clone(),
        ..Default::default()
    };

    for agent in plan_agents(intake) {
        match agent {
            AgentKind::Company => {
                record.company =
                    Some(company::run_company_agent(intake, &ctx.config.agents, ctx.client).await);
            }
            AgentKind::Payment => match payment::run_payment_agent(intake) {
                Ok(signal) => record.payment = Some(signal),
                Err(err) => {
                    tracing::warn!("payment agent failed, source omitted: {err}");
                }
            },
            AgentKind::Behavior => {
                record.behavior = Some(behavior::run_behavior_agent(intake));
            }
            AgentKind::Ml => {
                record.ml = ctx
                    .model
                    .and_then(|m| m.classify(&intake.clean_text, ctx.config.agents.min_text_chars));
            }
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::structure_text;

    #[test]
    fn payment_agent_runs_only_on_payment_mentions() {
        let with_payment =
            structure_text("pay the registration fee to secure your internship seat").unwrap();
        let without_payment =
            structure_text("join our engineering internship program this summer").unwrap();

        assert!(plan_agents(&with_payment).contains(&AgentKind::Payment));
        assert!(!plan_agents(&without_payment).contains(&AgentKind::Payment));
    }

    #[tokio::test]
    async fn unselected_and_unavailable_sources_stay_absent() {
        let cfg = RiskConfig::default();
        let intake =
            structure_text("join our engineering internship program this summer").unwrap();
        let ctx = AgentContext {
            config: &cfg,
            client: None,
            model: None,
        };
        let record = run_agents(&intake, &ctx).await;

        assert!(record.company.is_some());
        assert!(record.behavior.is_some());
        assert!(record.payment.is_none());
        assert!(record.ml.is_none());
        assert_eq!(record.raw_text, intake.raw_text);
    }
}
