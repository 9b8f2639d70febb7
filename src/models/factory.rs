use anyhow::Result;
use std::time::Duration;

use super::orchestrator::OrchestratorModel;
use super::traits::Model;
use crate::app::Config;
use crate::utils::CrabError;

/// Factory for creating model instances from configuration
pub struct ModelFactory;

impl ModelFactory {
    /// Create the backend this agent talks to, identified by `agent_id`
    pub fn create(config: &Config, agent_id: &str) -> Result<Box<dyn Model>> {
        if config.orchestrator.url.trim().is_empty() {
            return Err(CrabError::ConfigError(
                "Orchestrator URL is empty. Set ORCHESTRATOR_URL or [orchestrator] url".to_string(),
            )
            .into());
        }

        let model = OrchestratorModel::new(
            &config.orchestrator.url,
            agent_id,
            Duration::from_secs(config.orchestrator.request_timeout_secs),
        )?;
        Ok(Box::new(model))
    }
}
