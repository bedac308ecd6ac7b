use crate::error::{Result, StackError};
use crate::paths;
use serde::de::{Deserializer, Error as _};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// RepoEntry
// ---------------------------------------------------------------------------

/// One repository declared under `repos:` in `repos.yaml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoEntry {
    pub key: String,
    pub url: Option<String>,
    /// Path relative to the workspace root. `None` means `../<key>`.
    pub path: Option<String>,
}

impl RepoEntry {
    pub fn relative_path(&self) -> String {
        self.path
            .clone()
            .unwrap_or_else(|| paths::default_repo_path(&self.key))
    }

    pub fn resolve(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.relative_path())
    }
}

/// Keys other than `url` and `path` are ignored.
#[derive(Debug, Default, Deserialize)]
struct RepoSpec {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

/// `repos:` is a YAML mapping whose declaration order drives report order,
/// so it is read through `serde_yaml::Mapping` rather than a hash map.
fn ordered_repos<'de, D>(deserializer: D) -> std::result::Result<Vec<RepoEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let mapping = Option::<serde_yaml::Mapping>::deserialize(deserializer)?.unwrap_or_default();
    mapping
        .into_iter()
        .map(|(key, value)| {
            let key = match key {
                serde_yaml::Value::String(s) => s,
                other => {
                    return Err(D::Error::custom(format!(
                        "repository key must be a string, got {other:?}"
                    )))
                }
            };
            let spec = if value.is_null() {
                RepoSpec::default()
            } else {
                serde_yaml::from_value::<RepoSpec>(value)
                    .map_err(|e| D::Error::custom(format!("repository '{key}': {e}")))?
            };
            Ok(RepoEntry {
                key,
                url: spec.url,
                path: spec.path,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SmokeConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SmokeConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_assistant_id")]
    pub assistant_id: String,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_assistant_id() -> String {
    "733750f6-66bb-4365-abcc-7ee1e989b339".to_string()
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            assistant_id: default_assistant_id(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default, deserialize_with = "ordered_repos")]
    pub repos: Vec<RepoEntry>,
    /// Short alias → docker compose service name in the stack repository.
    #[serde(default = "default_services")]
    pub services: BTreeMap<String, String>,
    #[serde(default)]
    pub smoke: SmokeConfig,
}

fn default_services() -> BTreeMap<String, String> {
    [
        ("pcp", "platform-api"),
        ("aisp", "ai-orchestrator"),
        ("uip", "web-app"),
    ]
    .into_iter()
    .map(|(alias, service)| (alias.to_string(), service.to_string()))
    .collect()
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(StackError::ConfigNotFound(path));
        }
        let data = std::fs::read_to_string(&path)?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self> {
        // An empty file is a valid, empty workspace.
        if data.trim().is_empty() {
            return Ok(serde_yaml::from_str("{}")?);
        }
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn repo(&self, key: &str) -> Result<&RepoEntry> {
        self.repos
            .iter()
            .find(|r| r.key == key)
            .ok_or_else(|| StackError::UnknownRepo(key.to_string()))
    }

    pub fn repo_path(&self, root: &Path, key: &str) -> Result<PathBuf> {
        Ok(self.repo(key)?.resolve(root))
    }

    /// Resolve a repository that must already be cloned.
    pub fn existing_repo_path(&self, root: &Path, key: &str) -> Result<PathBuf> {
        let path = self.repo_path(root, key)?;
        if !path.exists() {
            return Err(StackError::RepoNotCloned {
                key: key.to_string(),
                path,
            });
        }
        Ok(path)
    }

    pub fn stack_path(&self, root: &Path) -> Result<PathBuf> {
        self.existing_repo_path(root, paths::STACK_REPO)
    }

    pub fn keys(&self) -> Vec<String> {
        self.repos.iter().map(|r| r.key.clone()).collect()
    }

    pub fn service(&self, alias: &str) -> Result<&str> {
        self.services
            .get(alias)
            .map(|s| s.as_str())
            .ok_or_else(|| StackError::UnknownService {
                name: alias.to_string(),
                valid: self
                    .services
                    .keys()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
