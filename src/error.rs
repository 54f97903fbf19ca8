//! Error taxonomy.
//!
//! Three layers fail independently: configuration (no usable token), the
//! session (connect/handshake, or a request on a live session), and the
//! remote tool itself. `FailureTree` turns whatever the session layer hands
//! back into plain data so the dispatcher can pull out the leaves that
//! originated from the remote protocol.

use rmcp::ServiceError;
use thiserror::Error;

/// Fatal configuration problems, detected before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no API token found: set MCP_SURFACE_API_KEY or MCP_SURFACE_TOKEN, or place a key in \
         .mcp-surface/key or .mcp-surface-key under the installation root"
    )]
    MissingToken,

    #[error("invalid service URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Failure of one gateway-scoped operation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Opening the transport or the initialize handshake failed.
    #[error("connection failed: {0}")]
    Connect(String),

    /// A request on the established session failed.
    #[error(transparent)]
    Call(#[from] ServiceError),
}

/// Where a leaf failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOrigin {
    /// The remote service reported a tool-level error.
    Protocol,
    /// Connection, handshake, or transport trouble.
    Transport,
    /// The request was cancelled before completion.
    Cancelled,
    /// Local bugs and anything else we refuse to classify.
    Internal,
}

/// A failure, possibly an aggregate of several concurrent ones.
///
/// Kept independent of the runtime's native error types: classification is
/// a depth-first walk over this tree, nothing more.
#[derive(Debug)]
pub enum FailureTree {
    Leaf {
        origin: FailureOrigin,
        message: String,
    },
    Group(Vec<FailureTree>),
}

impl FailureTree {
    pub fn leaf(origin: FailureOrigin, message: impl Into<String>) -> Self {
        FailureTree::Leaf {
            origin,
            message: message.into(),
        }
    }

    /// Collect every protocol-originated leaf message, depth-first.
    pub fn protocol_messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_protocol(&mut out);
        out
    }

    fn collect_protocol(&self, out: &mut Vec<String>) {
        match self {
            FailureTree::Leaf {
                origin: FailureOrigin::Protocol,
                message,
            } => out.push(message.clone()),
            FailureTree::Leaf { .. } => {}
            FailureTree::Group(children) => {
                for child in children {
                    child.collect_protocol(out);
                }
            }
        }
    }

    pub fn from_session_error(err: &SessionError) -> Self {
        match err {
            SessionError::Connect(message) => Self::leaf(FailureOrigin::Transport, message.clone()),
            SessionError::Call(service) => Self::from_service_error(service),
        }
    }

    fn from_service_error(err: &ServiceError) -> Self {
        match err {
            // The one origin that marks a failure as the remote tool's own.
            ServiceError::McpError(data) => {
                Self::leaf(FailureOrigin::Protocol, data.message.to_string())
            }
            ServiceError::Cancelled { reason } => Self::leaf(
                FailureOrigin::Cancelled,
                reason.clone().unwrap_or_else(|| "cancelled".to_string()),
            ),
            other => Self::leaf(FailureOrigin::Transport, other.to_string()),
        }
    }
}
