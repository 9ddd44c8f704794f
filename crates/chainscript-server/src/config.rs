use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use chainscript_types::StoryId;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

pub const DEFAULT_STORY_ID: &str = "default_story";

/// Server settings, loadable from TOML. Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory for story documents. Without one, stories live only in
    /// memory for the lifetime of the process.
    pub data_dir: Option<PathBuf>,
    /// Story used by requests that do not name one.
    pub default_story_id: String,
    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8000)),
            data_dir: None,
            default_story_id: DEFAULT_STORY_ID.to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(raw: &str) -> ServerResult<Self> {
        toml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// The configured default story, checked.
    pub fn default_story(&self) -> ServerResult<StoryId> {
        StoryId::new(self.default_story_id.as_str())
            .map_err(|e| ServerError::Config(format!("default_story_id: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8000".parse::<SocketAddr>().unwrap());
        assert!(c.data_dir.is_none());
        assert_eq!(c.default_story().unwrap().as_str(), "default_story");
        assert_eq!(c.allowed_origins.len(), 2);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:9000"
            data_dir = "/var/lib/chainscript"
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.data_dir, Some(PathBuf::from("/var/lib/chainscript")));
        assert_eq!(c.default_story_id, DEFAULT_STORY_ID);
        assert_eq!(c.allowed_origins, ServerConfig::default().allowed_origins);
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = ServerConfig::from_toml_str("bind_addr = 12").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn invalid_default_story_is_rejected() {
        let c = ServerConfig {
            default_story_id: "../escape".into(),
            ..ServerConfig::default()
        };
        assert!(matches!(c.default_story(), Err(ServerError::Config(_))));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(&path, "default_story_id = \"saga\"\n").unwrap();
        let c = ServerConfig::from_file(&path).unwrap();
        assert_eq!(c.default_story_id, "saga");
    }
}
