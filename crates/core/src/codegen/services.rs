//! Python service-invocation files, one per agent.

use super::error::CodegenResult;
use super::templates::{render_template, BATCH_SERVICE, STANDARD_SERVICE};

/// Contents of `<agent_name>.py`: a batch runner for batch-enabled agents,
/// sync and async invokers otherwise.
pub fn create_services_file_content(
    domain: &str,
    agent_name: &str,
    batch_enabled: bool,
) -> CodegenResult<String> {
    let template = if batch_enabled {
        BATCH_SERVICE
    } else {
        STANDARD_SERVICE
    };
    render_template(template, &[("domain", domain), ("agent_name", agent_name)])
}
