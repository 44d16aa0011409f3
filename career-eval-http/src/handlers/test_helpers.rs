use std::sync::Arc;

use career_eval_core::{
    EvaluationService, EvaluatorConfig, SessionRegistry, clock::ManualClock,
    provider::ModelProvider,
};
use chrono::{TimeZone, Utc};

use crate::server::AppState;

/// A fixed instant so session timestamps in tests are predictable.
pub fn test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default(),
    ))
}

/// Create a test AppState backed by the given provider and clock
pub fn create_test_state_with_clock(
    provider: Arc<dyn ModelProvider>,
    clock: Arc<ManualClock>,
) -> AppState {
    let registry = SessionRegistry::with_clock(clock);
    AppState::new(EvaluationService::new(
        registry,
        provider,
        EvaluatorConfig::default(),
    ))
}

/// Create a test AppState backed by the given provider
pub fn create_test_state(provider: Arc<dyn ModelProvider>) -> AppState {
    create_test_state_with_clock(provider, test_clock())
}
