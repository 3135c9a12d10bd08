use crate::curriculum::{self, BuiltinCurriculum, CurriculumSource, FileCurriculum};
use crate::error::Result;
use crate::paths;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// AssistantConfig
// ---------------------------------------------------------------------------

/// Where the chat client sends its requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_assistant_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_assistant_key_env")]
    pub api_key_env: String,
}

fn default_assistant_endpoint() -> String {
    "http://localhost:7878/api/assistant".to_string()
}

fn default_assistant_key_env() -> String {
    "STRIDE_API_KEY".to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: default_assistant_endpoint(),
            api_key_env: default_assistant_key_env(),
        }
    }
}

// ---------------------------------------------------------------------------
// GatewayConfig
// ---------------------------------------------------------------------------

/// Upstream chat-completions gateway used by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_url")]
    pub url: String,
    #[serde(default = "default_gateway_model")]
    pub model: String,
    #[serde(default = "default_gateway_key_env")]
    pub api_key_env: String,
}

fn default_gateway_url() -> String {
    "https://ai.gateway.lovable.dev/v1/chat/completions".to_string()
}

fn default_gateway_model() -> String {
    "google/gemini-2.5-flash".to_string()
}

fn default_gateway_key_env() -> String {
    "STRIDE_GATEWAY_KEY".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            model: default_gateway_model(),
            api_key_env: default_gateway_key_env(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// YAML week table replacing the built-in curriculum. Relative paths are
    /// resolved against the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curriculum: Option<PathBuf>,
    #[serde(default = "curriculum::default_start")]
    pub week_start: NaiveDate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assistant: AssistantConfig::default(),
            gateway: GatewayConfig::default(),
            curriculum: None,
            week_start: curriculum::default_start(),
        }
    }
}

impl Config {
    /// Load `stride.yaml` from `data_dir`; a missing file yields defaults.
    pub fn load(data_dir: &Path) -> Result<Self> {
        match crate::io::read_optional(&paths::config_path(data_dir))? {
            Some(data) if !data.trim().is_empty() => Ok(serde_yaml::from_str(&data)?),
            _ => Ok(Config::default()),
        }
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::config_path(data_dir), data.as_bytes())
    }

    pub fn curriculum_path(&self, data_dir: &Path) -> Option<PathBuf> {
        self.curriculum.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                data_dir.join(p)
            }
        })
    }

    /// Build the configured curriculum source.
    pub fn curriculum_source(&self, data_dir: &Path) -> Result<Arc<dyn CurriculumSource>> {
        match self.curriculum_path(data_dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading curriculum file");
                Ok(Arc::new(FileCurriculum::load(&path)?))
            }
            None => Ok(Arc::new(BuiltinCurriculum::new(self.week_start))),
        }
    }

    pub fn validate(&self, data_dir: &Path) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for (field, url) in [
            ("assistant.endpoint", &self.assistant.endpoint),
            ("gateway.url", &self.gateway.url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{field} is not an http(s) URL: {url}"),
                });
            }
        }

        if let Some(path) = self.curriculum_path(data_dir) {
            if !path.exists() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("curriculum file not found: {}", path.display()),
                });
            }
        }

        if std::env::var_os(&self.assistant.api_key_env).is_none() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "{} is not set; chat requests will be sent without a token",
                    self.assistant.api_key_env
                ),
            });
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.gateway.model, "google/gemini-2.5-flash");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("stride.yaml"),
            "gateway:\n  model: test-model\nweek_start: 2025-01-06\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.gateway.model, "test-model");
        assert_eq!(cfg.gateway.api_key_env, "STRIDE_GATEWAY_KEY");
        assert_eq!(cfg.week_start, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.assistant.endpoint = "http://127.0.0.1:9000/api/assistant".into();
        cfg.save(dir.path()).unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), cfg);
    }

    #[test]
    fn relative_curriculum_resolves_under_data_dir() {
        let cfg = Config {
            curriculum: Some("plan.yaml".into()),
            ..Config::default()
        };
        let root = Path::new("/data");
        assert_eq!(cfg.curriculum_path(root), Some(PathBuf::from("/data/plan.yaml")));
        let warnings = cfg.validate(root);
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("plan.yaml")));
    }

    #[test]
    fn builtin_source_uses_week_start() {
        let dir = TempDir::new().unwrap();
        let cfg = Config {
            week_start: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            ..Config::default()
        };
        let source = cfg.curriculum_source(dir.path()).unwrap();
        assert_eq!(source.week(1).unwrap().start_date, "2 June");
    }
}
