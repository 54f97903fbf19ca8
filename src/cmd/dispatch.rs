/*!
`dispatch.rs` - the synchronous CLI edge of an asynchronous session.

block_on is an explicit two-branch bridge, selected by probing for an active
scheduler on the calling thread:

  - none: start a runtime here and drive the future to completion
  - one already running: starting another runtime on this thread would panic,
    so delegate to an isolated worker thread with its own runtime and block
    the caller for the result

invoke opens exactly one session scope per tool call (sessions are never
pooled) and classifies the outcome: protocol-originated failures are
collected into a non-fatal `Failure`, everything else propagates unmodified.
*/

use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::Credentials;
use crate::error::FailureTree;
use crate::mcp;

/// Outcome of one tool invocation, after failure classification.
#[derive(Debug)]
pub enum InvocationResult {
    /// Remote execution completed; content blocks render in order.
    Success {
        content: Vec<rmcp::model::Content>,
    },
    /// The service reported tool-level failure(s). Non-fatal to the CLI,
    /// but the command exits non-zero.
    Failure { message: String },
}

/// Drive `future` to completion from a synchronous call site.
pub fn block_on<T, F>(future: F) -> Result<T>
where
    F: Future<Output = T> + Send,
    T: Send,
{
    match tokio::runtime::Handle::try_current() {
        Err(_) => {
            let runtime =
                tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            Ok(runtime.block_on(future))
        }
        Ok(_) => std::thread::scope(|scope| {
            scope
                .spawn(move || {
                    let runtime =
                        tokio::runtime::Runtime::new().context("failed to start async runtime")?;
                    Ok(runtime.block_on(future))
                })
                .join()
                .map_err(|_| anyhow!("async worker thread panicked"))?
        }),
    }
}

/// Execute one remote tool call.
///
/// Protocol-originated failures (the remote service rejecting or failing the
/// tool) are flattened out of whatever error aggregate comes back and
/// reported; anything else is re-raised untouched so diagnostic detail is
/// preserved.
pub fn invoke(
    credentials: &Credentials,
    tool: &str,
    arguments: Map<String, Value>,
) -> Result<InvocationResult> {
    debug!(tool, "invoking remote tool");
    match block_on(mcp::call_tool(credentials, tool, arguments))? {
        Ok(result) => Ok(InvocationResult::Success {
            content: result.content,
        }),
        Err(err) => {
            let messages = FailureTree::from_session_error(&err).protocol_messages();
            if messages.is_empty() {
                Err(err.into())
            } else {
                Ok(InvocationResult::Failure {
                    message: messages.join("\n"),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_runs_without_an_active_scheduler() {
        let value = block_on(async { 21 * 2 }).unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn bridge_delegates_when_a_scheduler_is_already_active() {
        // A plain Runtime::block_on here would panic; the bridge must take
        // the worker-thread branch instead.
        assert!(tokio::runtime::Handle::try_current().is_ok());
        let value = block_on(async { 7 }).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn bridge_supports_borrowed_futures() {
        let base = String::from("hello");
        let len = block_on(async { base.len() }).unwrap();
        assert_eq!(len, 5);
    }
}
