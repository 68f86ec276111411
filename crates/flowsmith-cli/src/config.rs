//! Runtime configuration.
//!
//! Values come from an optional TOML file (`config/default.toml`, or the
//! `--config` path) and are then overridden by environment variables, after
//! `.env` has been loaded.  Credentials have no built-in values: an unset key
//! stays unset.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use flowsmith_adapters::N8nCredentials;
use flowsmith_agent::llm::client::{DEFAULT_ANTHROPIC_MODEL, DEFAULT_OPENAI_MODEL};
use flowsmith_agent::{LlmClientConfig, LlmProvider};

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

const DEFAULT_N8N_BASE_URL: &str = "http://localhost:5678";
const DEFAULT_RESULTS_DIR: &str = "results";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FlowsmithConfig {
    pub n8n: N8nSection,
    pub llm: LlmSection,
    pub results: ResultsSection,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct N8nSection {
    pub base_url: String,
    pub api_key: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Request timeout; the HTTP client default when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for N8nSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_N8N_BASE_URL.to_owned(),
            api_key: None,
            email: None,
            password: None,
            timeout_secs: None,
        }
    }
}

impl std::fmt::Debug for N8nSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("N8nSection")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// `anthropic` (default) or `openai`.
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
}

impl std::fmt::Debug for LlmSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSection")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResultsSection {
    /// Write a report file for every successful `create`.
    pub enabled: bool,
    pub dir: PathBuf,
}

impl Default for ResultsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from(DEFAULT_RESULTS_DIR),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl FlowsmithConfig {
    /// Load the file (explicit path must exist; the default path may not),
    /// apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override fields from environment variables read through `lookup`.
    /// Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("N8N_BASE_URL") {
            self.n8n.base_url = v;
        }
        if let Some(v) = var("N8N_API_KEY") {
            self.n8n.api_key = Some(v);
        }
        if let Some(v) = var("N8N_EMAIL") {
            self.n8n.email = Some(v);
        }
        if let Some(v) = var("N8N_PASSWORD") {
            self.n8n.password = Some(v);
        }

        if let Some(v) = var("FLOWSMITH_LLM_PROVIDER") {
            self.llm.provider = Some(v);
        }
        if let Some(v) = var("FLOWSMITH_LLM_MODEL") {
            self.llm.model = Some(v);
        }
        if let Some(v) = var("FLOWSMITH_LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        // The provider-specific key only applies to its own provider.
        let provider_key = match self.provider() {
            Ok(LlmProvider::OpenAI) => var("OPENAI_API_KEY"),
            _ => var("ANTHROPIC_API_KEY").or_else(|| var("CLAUDE_API_KEY")),
        };
        if let Some(v) = provider_key {
            self.llm.api_key = Some(v);
        }

        if let Some(v) = var("FLOWSMITH_RESULTS_DIR") {
            self.results.dir = PathBuf::from(v);
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_http_url("n8n.base_url", &self.n8n.base_url)?;
        if let Some(base) = &self.llm.base_url {
            check_http_url("llm.base_url", base)?;
        }
        self.provider()?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Derived settings
    // -----------------------------------------------------------------------

    pub fn provider(&self) -> Result<LlmProvider> {
        match &self.llm.provider {
            Some(name) => Ok(name.parse()?),
            None => Ok(LlmProvider::Anthropic),
        }
    }

    /// The LLM client configuration, or `None` when no API key is set.
    pub fn llm_client_config(&self) -> Result<Option<LlmClientConfig>> {
        let Some(key) = self.llm.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            return Ok(None);
        };
        let provider = self.provider()?;
        let mut config = match provider {
            LlmProvider::Anthropic => LlmClientConfig::anthropic(
                key,
                self.llm.model.as_deref().unwrap_or(DEFAULT_ANTHROPIC_MODEL),
            ),
            LlmProvider::OpenAI => LlmClientConfig::openai(
                key,
                self.llm.model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL),
            ),
        };
        if let Some(base) = &self.llm.base_url {
            config = config.with_base_url(base.trim_end_matches('/'));
        }
        Ok(Some(config))
    }

    pub fn n8n_credentials(&self) -> N8nCredentials {
        N8nCredentials {
            api_key: self.n8n.api_key.clone(),
            email: self.n8n.email.clone(),
            password: self.n8n.password.clone(),
        }
    }

    pub fn n8n_timeout(&self) -> Option<Duration> {
        self.n8n.timeout_secs.map(Duration::from_secs)
    }
}

fn check_http_url(field: &str, value: &str) -> Result<()> {
    let url = url::Url::parse(value).with_context(|| format!("{field} is not a valid URL: {value}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("{field} must use http or https, got `{}`", url.scheme());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_have_no_credentials() {
        let config = FlowsmithConfig::default();
        assert_eq!(config.n8n.base_url, "http://localhost:5678");
        assert!(config.n8n.api_key.is_none());
        assert!(!config.n8n_credentials().is_usable());
        assert!(config.llm_client_config().unwrap().is_none());
        assert!(config.results.enabled);
        assert_eq!(config.results.dir, PathBuf::from("results"));
    }

    #[test]
    fn toml_sections_are_read() {
        let config = FlowsmithConfig::from_toml(
            r#"
            [n8n]
            base_url = "https://n8n.example.com"
            timeout_secs = 30

            [llm]
            provider = "openai"
            model = "gpt-test"

            [results]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.n8n.base_url, "https://n8n.example.com");
        assert_eq!(config.n8n_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.provider().unwrap(), LlmProvider::OpenAI);
        assert!(!config.results.enabled);
        assert_eq!(config.results.dir, PathBuf::from("results"));
    }

    #[test]
    fn env_overrides_file() {
        let mut config = FlowsmithConfig::from_toml("[n8n]\nbase_url = \"http://file:5678\"\n").unwrap();
        config.apply_env(env(&[
            ("N8N_BASE_URL", "http://env:5678"),
            ("N8N_API_KEY", "n8n-key"),
            ("CLAUDE_API_KEY", "claude-key"),
            ("FLOWSMITH_RESULTS_DIR", "/tmp/out"),
        ]));
        assert_eq!(config.n8n.base_url, "http://env:5678");
        assert!(config.n8n_credentials().is_usable());
        assert_eq!(config.llm.api_key.as_deref(), Some("claude-key"));
        assert_eq!(config.results.dir, PathBuf::from("/tmp/out"));

        let llm = config.llm_client_config().unwrap().unwrap();
        assert_eq!(llm.provider, LlmProvider::Anthropic);
        assert_eq!(llm.default_model, DEFAULT_ANTHROPIC_MODEL);
    }

    #[test]
    fn anthropic_key_wins_over_claude_key() {
        let mut config = FlowsmithConfig::default();
        config.apply_env(env(&[("ANTHROPIC_API_KEY", "a"), ("CLAUDE_API_KEY", "c")]));
        assert_eq!(config.llm.api_key.as_deref(), Some("a"));
    }

    #[test]
    fn openai_provider_reads_openai_key() {
        let mut config = FlowsmithConfig::default();
        config.apply_env(env(&[
            ("FLOWSMITH_LLM_PROVIDER", "openai"),
            ("ANTHROPIC_API_KEY", "a"),
            ("OPENAI_API_KEY", "o"),
            ("FLOWSMITH_LLM_BASE_URL", "http://localhost:8080/v1/"),
        ]));
        let llm = config.llm_client_config().unwrap().unwrap();
        assert_eq!(llm.provider, LlmProvider::OpenAI);
        assert_eq!(llm.default_model, DEFAULT_OPENAI_MODEL);
        assert_eq!(llm.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = FlowsmithConfig::default();
        config.apply_env(env(&[("N8N_BASE_URL", ""), ("ANTHROPIC_API_KEY", "  ")]));
        assert_eq!(config.n8n.base_url, "http://localhost:5678");
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn invalid_values_fail_validation() {
        let mut config = FlowsmithConfig::default();
        config.n8n.base_url = "ftp://n8n".into();
        assert!(config.validate().is_err());

        let mut config = FlowsmithConfig::default();
        config.llm.provider = Some("mistral".into());
        assert!(config.validate().is_err());

        assert!(FlowsmithConfig::default().validate().is_ok());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FlowsmithConfig::from_file(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let mut config = FlowsmithConfig::default();
        config.n8n.password = Some("hunter2".into());
        config.llm.api_key = Some("sk-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("sk-secret"));
    }
}
