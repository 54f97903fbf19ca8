//! Session gateway for the remote tool service.
//!
//! with_session -> scoped acquisition: open transport, attach bearer header,
//! initialize handshake, run the body, close on every exit path.
//! Operations built on it: discover (one tools/list) and call_tool (one
//! tools/call). A session is never reused across operations.

use rmcp::{
    RoleClient, ServiceExt,
    model::{CallToolRequestParam, CallToolResult, ClientCapabilities, ClientInfo, Implementation},
    service::RunningService,
    transport::StreamableHttpClientTransport,
    transport::streamable_http_client::StreamableHttpClientTransportConfig,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::Credentials;
use crate::error::SessionError;

/// A live, authenticated session scoped to one logical operation.
pub type Session = RunningService<RoleClient, ClientInfo>;

/// One tool as advertised by the service.
///
/// Read-only once fetched. Property order inside `input_schema` is preserved
/// from the wire; downstream flag synthesis depends on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Map<String, Value>,
}

/// Run `body` against a freshly established session, then release it.
///
/// Connect and handshake failures surface as [`SessionError::Connect`]; the
/// session is closed whether `body` succeeds or fails.
pub async fn with_session<T, F>(credentials: &Credentials, body: F) -> Result<T, SessionError>
where
    F: AsyncFnOnce(&Session) -> Result<T, rmcp::ServiceError>,
{
    let transport = build_transport(credentials)?;

    let info = ClientInfo {
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Implementation::default()
        },
    };

    let session = info
        .serve(transport)
        .await
        .map_err(|e| SessionError::Connect(e.to_string()))?;
    debug!(url = %credentials.service_url, "session established");

    let result = body(&session).await;

    // Graceful shutdown attempt; the transport is torn down either way.
    let _ = session.cancel().await;

    result.map_err(SessionError::from)
}

/// Streamable HTTP transport with the bearer token attached to every request.
fn build_transport(
    credentials: &Credentials,
) -> Result<StreamableHttpClientTransport<reqwest::Client>, SessionError> {
    let mut headers = reqwest::header::HeaderMap::new();
    let bearer = format!("Bearer {}", credentials.token);
    let value = reqwest::header::HeaderValue::from_str(&bearer)
        .map_err(|_| SessionError::Connect("token is not a valid header value".to_string()))?;
    headers.insert(reqwest::header::AUTHORIZATION, value);

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| SessionError::Connect(e.to_string()))?;

    Ok(StreamableHttpClientTransport::with_client(
        client,
        StreamableHttpClientTransportConfig::with_uri(credentials.service_url.clone()),
    ))
}

/// One discovery round-trip: the tools the service currently exposes, in
/// the order the service lists them.
pub async fn discover(credentials: &Credentials) -> Result<Vec<ToolDescriptor>, SessionError> {
    with_session(credentials, async |session| {
        let response = session.list_tools(Default::default()).await?;
        debug!(count = response.tools.len(), "tools listed");
        Ok(response.tools.iter().map(describe).collect())
    })
    .await
}

/// Invoke one remote tool. An empty argument map is sent as absent.
pub async fn call_tool(
    credentials: &Credentials,
    name: &str,
    arguments: Map<String, Value>,
) -> Result<CallToolResult, SessionError> {
    let name = name.to_string();
    with_session(credentials, async move |session| {
        session
            .call_tool(CallToolRequestParam {
                name: name.into(),
                arguments: if arguments.is_empty() {
                    None
                } else {
                    Some(arguments)
                },
            })
            .await
    })
    .await
}

fn describe(tool: &rmcp::model::Tool) -> ToolDescriptor {
    ToolDescriptor {
        name: tool.name.to_string(),
        description: tool.description.as_deref().unwrap_or_default().to_string(),
        input_schema: tool.input_schema.as_ref().clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_preserves_property_order() {
        let descriptor: ToolDescriptor = serde_json::from_value(json!({
            "name": "echo",
            "description": "Echo a message back",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "zeta": {"type": "string"},
                    "alpha": {"type": "integer"},
                    "mid_point": {"type": "boolean"}
                },
                "required": ["zeta"]
            }
        }))
        .unwrap();

        let keys: Vec<&String> = descriptor.input_schema["properties"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, ["zeta", "alpha", "mid_point"]);
    }

    #[test]
    fn descriptor_tolerates_missing_fields() {
        let descriptor: ToolDescriptor = serde_json::from_value(json!({"name": "bare"})).unwrap();
        assert_eq!(descriptor.name, "bare");
        assert!(descriptor.description.is_empty());
        assert!(descriptor.input_schema.is_empty());
    }
}
