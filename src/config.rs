//! Configuration management for abap-assist

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::context::ContextBudget;
use crate::ai::documents::MAX_DOCUMENT_CHARS;
use crate::audit::AuditLog;
use crate::core::analysis::DEFAULT_EXTENSIONS;
use crate::markers::MarkerTemplates;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ai: AiConfig,
    pub context: ContextConfig,
    pub markers: MarkersConfig,
    pub audit: AuditConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub api_key_env: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub max_context_tokens: usize,
    pub chars_per_token: usize,
    pub max_document_chars: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkersConfig {
    /// User written into markers; the OS user when unset
    pub user: Option<String>,
    pub templates: MarkerTemplates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub extensions: Vec<String>,
    /// 0 keeps every analyzed file
    pub cache_max_entries: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 2000,
            temperature: 0.7,
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        let budget = ContextBudget::default();
        Self {
            max_context_tokens: budget.max_tokens,
            chars_per_token: budget.chars_per_token,
            max_document_chars: MAX_DOCUMENT_CHARS,
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file: PathBuf::from("abap_assistant_audit.log"),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            cache_max_entries: 0,
        }
    }
}

impl Config {
    /// True when the configured environment variable holds an OpenAI-style key
    pub fn has_valid_api_key(&self) -> bool {
        std::env::var(&self.ai.api_key_env)
            .map(|key| {
                let key = key.trim();
                key.starts_with("sk-") && key.len() > 3
            })
            .unwrap_or(false)
    }

    pub fn context_budget(&self) -> ContextBudget {
        ContextBudget {
            max_tokens: self.context.max_context_tokens,
            chars_per_token: self.context.chars_per_token.max(1),
        }
    }

    pub fn cache_limit(&self) -> Option<usize> {
        Some(self.analysis.cache_max_entries).filter(|&n| n > 0)
    }

    /// Audit log as configured: file-backed when enabled, else `None`
    pub fn audit_log(&self) -> Option<AuditLog> {
        self.audit
            .enabled
            .then(|| AuditLog::with_file(&self.audit.log_file))
    }
}

/// Get the configuration file path
fn config_path() -> Result<PathBuf> {
    let config_dir = directories::ProjectDirs::from("com", "abap-assist", "abap-assist")
        .context("Failed to determine config directory")?
        .config_dir()
        .to_path_buf();

    Ok(config_dir.join("config.toml"))
}

/// Load configuration from file or use defaults
pub fn load_config(custom_path: Option<&str>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        PathBuf::from(p)
    } else {
        config_path()?
    };

    if path.exists() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}

/// Initialize configuration file with defaults
pub fn init_config(custom_path: Option<&str>) -> Result<PathBuf> {
    let path = match custom_path {
        Some(p) => PathBuf::from(p),
        None => config_path()?,
    };

    if path.exists() {
        println!("Configuration file already exists at {:?}", path);
        return Ok(path);
    }

    // Create directory if needed
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }

    let content = toml::to_string_pretty(&Config::default())
        .context("Failed to serialize default config")?;

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config to {:?}", path))?;

    println!("Configuration initialized at {:?}", path);
    Ok(path)
}

/// Show current configuration
pub fn show_config(config: &Config) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .context("Failed to serialize config")?;
    println!("{}", content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.context_budget().max_chars(), 32_000);
        assert_eq!(config.context.max_document_chars, 10_000);
        assert_eq!(config.markers.templates.mod_begin, "*BEGIN MOD {TICKET} {USER} {DATE}");
        assert_eq!(config.analysis.extensions, vec!["abap", "txt", "inc"]);
        assert_eq!(config.cache_limit(), None);
        assert!(config.audit_log().is_some());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[context]\nmax_context_tokens = 1000\n\n[markers]\nuser = \"jdoe\"\n\n[markers.templates]\nmod_begin = \"*>>> {TICKET}\"\n\n[analysis]\ncache_max_entries = 5\n\n[audit]\nenabled = false\n",
        )
        .unwrap();

        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.context_budget().max_chars(), 4000);
        assert_eq!(config.markers.user.as_deref(), Some("jdoe"));
        assert_eq!(config.markers.templates.mod_begin, "*>>> {TICKET}");
        assert_eq!(config.markers.templates.mod_end, "*END MOD {TICKET} {USER} {DATE}");
        assert_eq!(config.cache_limit(), Some(5));
        assert!(config.audit_log().is_none());
        assert_eq!(config.ai.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.ai.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[context\n").unwrap();
        assert!(load_config(path.to_str()).is_err());
    }

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init_config(path.to_str()).unwrap();
        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.audit.log_file, PathBuf::from("abap_assistant_audit.log"));
    }

    #[test]
    fn test_api_key_check() {
        let mut config = Config::default();
        config.ai.api_key_env = "ABAP_ASSIST_TEST_KEY_UNSET".to_string();
        assert!(!config.has_valid_api_key());

        config.ai.api_key_env = "ABAP_ASSIST_TEST_KEY_SET".to_string();
        std::env::set_var("ABAP_ASSIST_TEST_KEY_SET", "sk-test123");
        assert!(config.has_valid_api_key());
        std::env::set_var("ABAP_ASSIST_TEST_KEY_SET", "not-a-key");
        assert!(!config.has_valid_api_key());
    }
}
