//! Result envelope builder.
//!
//! Every tool call ends here, whatever happened: success, policy refusal or
//! any error raised during dispatch. The transport only ever sees a
//! [`CallToolResponse`].

use crate::error::McpError;
use crate::protocol::CallToolResponse;
use crate::tools::ToolOutcome;

/// Turn a dispatch result into exactly one envelope.
pub fn build(outcome: Result<ToolOutcome, McpError>) -> CallToolResponse {
    match outcome {
        Ok(ToolOutcome::Completed(value)) => match serde_json::to_string_pretty(&value) {
            Ok(text) => CallToolResponse::text(text),
            Err(e) => failure(McpError::from(e)),
        },
        Ok(ToolOutcome::Refused(violation)) => {
            tracing::warn!(operator = %violation.operator, "Refused write stage");
            CallToolResponse::error(violation)
        }
        Err(e) => failure(e),
    }
}

fn failure(error: McpError) -> CallToolResponse {
    tracing::warn!(error = %error, "Tool call failed");
    CallToolResponse::error(error)
}
