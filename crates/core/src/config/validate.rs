use super::{types::Config, ConfigError, KnowledgeBackend};
use crate::agents::MAX_LOOKUP_TIMEOUT_MS;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - An http knowledge backend has a `[knowledge.http]` section with a URL
/// - The lookup timeout is within 1..=3000 ms
/// - The orchestrator timeout and decision-log buffer are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if let Some(knowledge) = &config.knowledge {
        match (&knowledge.backend, &knowledge.http) {
            (KnowledgeBackend::Http, None) => {
                return Err(ConfigError::ValidationError(
                    "knowledge.http section is required when backend = \"http\"".to_string(),
                ));
            }
            (KnowledgeBackend::Http, Some(http)) => {
                if http.url.trim().is_empty() {
                    return Err(ConfigError::ValidationError(
                        "knowledge.http.url cannot be empty".to_string(),
                    ));
                }
                if http.timeout_ms == 0 || http.timeout_ms > MAX_LOOKUP_TIMEOUT_MS {
                    return Err(ConfigError::ValidationError(format!(
                        "knowledge.http.timeout_ms must be between 1 and {}",
                        MAX_LOOKUP_TIMEOUT_MS
                    )));
                }
            }
            (KnowledgeBackend::Local, _) => {}
        }
    }

    if config.orchestrator.process_timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.process_timeout_ms cannot be 0".to_string(),
        ));
    }

    if config.orchestrator.decision_log_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.decision_log_buffer cannot be 0".to_string(),
        ));
    }

    Ok(())
}
