//! Mock implementations for testing
//!
//! This module re-exports mock implementations from their respective modules
//! and wires them into ready-made executors.

// Re-export HTTP mocks
pub use crate::helix::http::mock::{MockTransport, RecordedRequest};

// Re-export token storage mocks
pub use crate::auth::store::mock::MemoryTokenStore;

// Re-export prompt mocks
pub use crate::auth::prompt::mock::{RefusingPrompt, ScriptedPrompt};

use std::sync::Arc;

use super::fixtures::{test_config, test_credentials};
use crate::auth::provider::TokenProvider;
use crate::helix::executor::RequestExecutor;

/// Builds an executor over a mock transport and a throwaway memory store
pub fn executor(transport: MockTransport) -> RequestExecutor<MockTransport> {
    executor_with_store(transport, Arc::new(MemoryTokenStore::new()))
}

/// Builds an executor over a mock transport and the given store
pub fn executor_with_store(
    transport: MockTransport,
    store: Arc<MemoryTokenStore>,
) -> RequestExecutor<MockTransport> {
    let config = test_config();
    let credentials = test_credentials();
    let client_id = credentials.client_id.clone();
    let http = Arc::new(transport);
    let provider = TokenProvider::new(http.clone(), credentials, &config);
    RequestExecutor::new(http, provider, store, client_id, config.api_base_url)
}
