//! Credential resolution (service URL + bearer token).
//!
//! Layered sources, resolved once per process and never re-read:
//!   URL:   MCP_SURFACE_URL, else the default endpoint
//!   token: MCP_SURFACE_API_KEY, else MCP_SURFACE_TOKEN, else key files under
//!          the installation root (.mcp-surface/key, then .mcp-surface-key)
//!
//! When both key files exist the secondary (.mcp-surface-key) wins; the chain
//! is last-checked-wins, not a merge. That ordering is load-bearing for
//! subagent execution contexts and must not be flipped.
//!
//! No network I/O happens here.

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_URL: &str = "https://api.mcpsurface.dev/mcp";

pub const URL_ENV: &str = "MCP_SURFACE_URL";
/// Token variables, first non-empty wins.
pub const TOKEN_ENVS: [&str; 2] = ["MCP_SURFACE_API_KEY", "MCP_SURFACE_TOKEN"];

/// Key file locations relative to the installation root, in check order.
const KEY_FILES: [&str; 2] = [".mcp-surface/key", ".mcp-surface-key"];

/// Resolved connection material. Immutable once built; the token is
/// guaranteed non-empty.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub service_url: String,
    pub token: String,
}

/// Resolve credentials from the process environment and the filesystem.
pub fn resolve() -> Result<Credentials, ConfigError> {
    resolve_from(|key| std::env::var(key).ok(), &install_root())
}

/// The layered lookup itself, with the environment and root injected so
/// tests do not touch process-global state.
fn resolve_from(
    env: impl Fn(&str) -> Option<String>,
    root: &Path,
) -> Result<Credentials, ConfigError> {
    let service_url = env(URL_ENV)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_URL.to_string());
    // A malformed override should fail as configuration, not as transport.
    Url::parse(&service_url).map_err(|e| ConfigError::InvalidUrl {
        url: service_url.clone(),
        reason: e.to_string(),
    })?;

    let mut token = TOKEN_ENVS
        .iter()
        .find_map(|key| env(key).filter(|v| !v.is_empty()));

    if token.is_none() {
        // Key file fallback for contexts without environment access. Both
        // locations are read; a later hit overwrites an earlier one.
        for file in KEY_FILES {
            if let Ok(contents) = std::fs::read_to_string(root.join(file)) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    token = Some(trimmed.to_string());
                }
            }
        }
    }

    match token {
        Some(token) => Ok(Credentials { service_url, token }),
        None => Err(ConfigError::MissingToken),
    }
}

/// Installation root: the parent of the directory holding the executable,
/// covering `<root>/bin/mcp-surface` layouts. Falls back to the current
/// directory when the executable path is unavailable.
fn install_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| {
            exe.parent()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn first_token_variable_wins() {
        let env = env_of(&[
            ("MCP_SURFACE_API_KEY", "from-api-key"),
            ("MCP_SURFACE_TOKEN", "from-token"),
        ]);
        let creds = resolve_from(env, Path::new("/nonexistent")).unwrap();
        assert_eq!(creds.token, "from-api-key");
        assert_eq!(creds.service_url, DEFAULT_URL);
    }

    #[test]
    fn second_token_variable_used_when_first_empty() {
        let env = env_of(&[
            ("MCP_SURFACE_API_KEY", ""),
            ("MCP_SURFACE_TOKEN", "from-token"),
        ]);
        let creds = resolve_from(env, Path::new("/nonexistent")).unwrap();
        assert_eq!(creds.token, "from-token");
    }

    #[test]
    fn url_override_respected() {
        let env = env_of(&[
            ("MCP_SURFACE_URL", "https://staging.example/mcp"),
            ("MCP_SURFACE_TOKEN", "t"),
        ]);
        let creds = resolve_from(env, Path::new("/nonexistent")).unwrap();
        assert_eq!(creds.service_url, "https://staging.example/mcp");
    }

    #[test]
    fn malformed_url_override_rejected() {
        let env = env_of(&[("MCP_SURFACE_URL", "not a url"), ("MCP_SURFACE_TOKEN", "t")]);
        let err = resolve_from(env, Path::new("/nonexistent")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn primary_key_file_used_and_trimmed() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join(".mcp-surface")).unwrap();
        std::fs::write(root.path().join(".mcp-surface/key"), "  primary-key\n").unwrap();
        let creds = resolve_from(env_of(&[]), root.path()).unwrap();
        assert_eq!(creds.token, "primary-key");
    }

    #[test]
    fn secondary_key_file_wins_over_primary() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join(".mcp-surface")).unwrap();
        std::fs::write(root.path().join(".mcp-surface/key"), "primary-key").unwrap();
        std::fs::write(root.path().join(".mcp-surface-key"), "secondary-key").unwrap();
        let creds = resolve_from(env_of(&[]), root.path()).unwrap();
        assert_eq!(creds.token, "secondary-key");
    }

    #[test]
    fn environment_beats_key_files() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(".mcp-surface-key"), "file-key").unwrap();
        let env = env_of(&[("MCP_SURFACE_TOKEN", "env-key")]);
        let creds = resolve_from(env, root.path()).unwrap();
        assert_eq!(creds.token, "env-key");
    }

    #[test]
    fn missing_token_is_fatal() {
        let err = resolve_from(env_of(&[]), Path::new("/nonexistent")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));
        assert!(err.to_string().contains("MCP_SURFACE_API_KEY"));
    }
}
