//! Process-lifetime tool catalog.
//!
//! Discovery runs at most once per process; the result is memoized inside
//! the catalog and immutable afterwards. On transport failure the catalog
//! degrades to an empty list while retaining the error for display, so an
//! empty catalog is distinguishable from "the service has no tools".

use std::sync::OnceLock;

use anyhow::Result;
use tracing::warn;

use crate::cmd::dispatch;
use crate::config::Credentials;
use crate::error::SessionError;
use crate::mcp::{self, ToolDescriptor};

/// Catalog contents after the single discovery attempt.
#[derive(Debug)]
pub struct CatalogState {
    tools: Vec<ToolDescriptor>,
    degraded: Option<String>,
}

impl CatalogState {
    /// Tools in service order.
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// The discovery error, when the tool list is an empty stand-in rather
    /// than the service's real answer.
    pub fn degraded(&self) -> Option<&str> {
        self.degraded.as_deref()
    }

    pub fn find(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }
}

/// Memoized catalog with a single-initialization contract: the first `load`
/// performs one discovery round-trip, every later call returns the cached
/// state without touching the network.
#[derive(Debug, Default)]
pub struct ToolCatalog {
    state: OnceLock<CatalogState>,
}

impl ToolCatalog {
    pub const fn new() -> Self {
        Self {
            state: OnceLock::new(),
        }
    }

    pub fn load(&self, credentials: &Credentials) -> Result<&CatalogState> {
        self.load_with(|| dispatch::block_on(mcp::discover(credentials)))
    }

    /// `fetch` runs only if nothing is cached yet. The outer result carries
    /// local failures (no runtime, worker panic) that must propagate; the
    /// inner one is the session outcome, which degrades instead.
    fn load_with<F>(&self, fetch: F) -> Result<&CatalogState>
    where
        F: FnOnce() -> Result<Result<Vec<ToolDescriptor>, SessionError>>,
    {
        if let Some(state) = self.state.get() {
            return Ok(state);
        }
        let state = match fetch()? {
            Ok(tools) => CatalogState {
                tools,
                degraded: None,
            },
            Err(err) => {
                warn!(error = %err, "tool discovery failed, continuing with empty catalog");
                CatalogState {
                    tools: Vec::new(),
                    degraded: Some(err.to_string()),
                }
            }
        };
        Ok(self.state.get_or_init(|| state))
    }
}
