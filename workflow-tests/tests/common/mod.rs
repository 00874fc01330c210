//! Common test utilities for workflow integration tests.

use std::time::Duration;
use workflow_tests::{wait_for_services, WorkflowTestContext};

/// Default timeout for waiting on services.
pub const SERVICE_TIMEOUT: Duration = Duration::from_secs(30);

/// Create a new workflow test context, ensuring services are healthy.
pub async fn setup() -> WorkflowTestContext {
    let ctx = WorkflowTestContext::new()
        .await
        .expect("Failed to create workflow test context");

    wait_for_services(&ctx.endpoints, SERVICE_TIMEOUT)
        .await
        .expect("Services not healthy");

    ctx
}
