//! AgenticDQ configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::llm::LlmError;

/// Main AgenticDQ configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Pipeline behavior
    pub pipeline: PipelineConfig,

    /// Prompt template overrides
    pub prompts: PromptsConfig,

    /// Log level (trace, debug, info, warn, error)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the API key environment variable is set and that numeric
    /// settings are usable. Call this before creating a client.
    pub fn validate(&self) -> Result<()> {
        debug!(provider = %self.llm.provider, "Config::validate: called");
        if std::env::var(self.llm.api_key_env()).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env()
            ));
        }
        if self.llm.max_tokens == 0 {
            return Err(eyre::eyre!("llm.max-tokens must be greater than zero"));
        }
        if self.llm.timeout_ms == 0 {
            return Err(eyre::eyre!("llm.timeout-ms must be greater than zero"));
        }
        if !matches!(self.llm.provider.as_str(), "openai" | "anthropic") {
            return Err(eyre::eyre!(
                "Unknown LLM provider: '{}'. Supported: openai, anthropic",
                self.llm.provider
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .agentic-dq.yml
        let local_config = PathBuf::from(".agentic-dq.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/agentic-dq/agentic-dq.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("agentic-dq").join("agentic-dq.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
///
/// `model`, `model-env` and `api-key-env` fall back to the provider's
/// defaults when unset, so switching `provider` alone is enough.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("openai" or "anthropic")
    pub provider: String,

    /// Model identifier
    pub model: Option<String>,

    /// Environment variable that, when set, overrides `model`
    #[serde(rename = "model-env")]
    pub model_env: Option<String>,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: Option<String>,

    /// API base URL (provider default when unset)
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Use schema-constrained generation when the provider has it
    #[serde(rename = "structured-outputs")]
    pub structured_outputs: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            model_env: None,
            api_key_env: None,
            base_url: None,
            max_tokens: 8192,
            timeout_ms: 300_000,
            structured_outputs: true,
        }
    }
}

/// Built-in settings for one provider
struct ProviderDefaults {
    model: &'static str,
    model_env: &'static str,
    api_key_env: &'static str,
    base_url: &'static str,
}

const OPENAI_DEFAULTS: ProviderDefaults = ProviderDefaults {
    model: "gpt-5-mini",
    model_env: "OPENAI_MODEL",
    api_key_env: "OPENAI_API_KEY",
    base_url: "https://api.openai.com",
};

const ANTHROPIC_DEFAULTS: ProviderDefaults = ProviderDefaults {
    model: "claude-sonnet-4-5",
    model_env: "ANTHROPIC_MODEL",
    api_key_env: "ANTHROPIC_API_KEY",
    base_url: "https://api.anthropic.com",
};

impl LlmConfig {
    fn defaults(&self) -> &'static ProviderDefaults {
        match self.provider.as_str() {
            "anthropic" => &ANTHROPIC_DEFAULTS,
            _ => &OPENAI_DEFAULTS,
        }
    }

    /// Configured model, or the provider's default
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(self.defaults().model)
    }

    /// Environment variable that overrides the model
    pub fn model_env(&self) -> &str {
        self.model_env.as_deref().unwrap_or(self.defaults().model_env)
    }

    /// Environment variable holding the API key
    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(self.defaults().api_key_env)
    }

    /// Model name after applying the `model-env` override
    pub fn resolved_model(&self) -> String {
        let env = self.model_env();
        match std::env::var(env) {
            Ok(model) if !model.trim().is_empty() => {
                debug!(%model, %env, "LlmConfig::resolved_model: env override");
                model.trim().to_string()
            }
            _ => self.model().to_string(),
        }
    }

    /// Base URL, falling back to the provider's public endpoint
    pub fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self.defaults().base_url.to_string(),
        }
    }

    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String, LlmError> {
        let env = self.api_key_env();
        match std::env::var(env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(LlmError::MissingApiKey(env.to_string())),
        }
    }
}

/// Pipeline behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Corrective retries per stage on the text path
    pub retries: u32,

    /// Run the Questioner before building the brief
    #[serde(rename = "use-questioner")]
    pub use_questioner: bool,

    /// Run the three candidate agents concurrently
    #[serde(rename = "parallel-candidates")]
    pub parallel_candidates: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retries: 2,
            use_questioner: false,
            parallel_candidates: false,
        }
    }
}

/// Prompt template configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory of `<name>.pmt` files that replace the embedded templates
    #[serde(rename = "override-dir")]
    pub override_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model(), "gpt-5-mini");
        assert_eq!(config.llm.api_key_env(), "OPENAI_API_KEY");
        assert_eq!(config.pipeline.retries, 2);
        assert!(!config.pipeline.use_questioner);
        assert!(config.llm.structured_outputs);
        assert!(config.prompts.override_dir.is_none());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: anthropic
  model: claude-sonnet-4
  api-key-env: MY_API_KEY
  base-url: https://api.example.com/
  max-tokens: 4096
  timeout-ms: 60000
  structured-outputs: false

pipeline:
  retries: 4
  use-questioner: true
  parallel-candidates: true

prompts:
  override-dir: /tmp/prompts

log-level: debug
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.api_key_env(), "MY_API_KEY");
        assert_eq!(config.llm.model(), "claude-sonnet-4");
        assert_eq!(config.llm.resolved_base_url(), "https://api.example.com");
        assert_eq!(config.llm.max_tokens, 4096);
        assert!(!config.llm.structured_outputs);
        assert_eq!(config.pipeline.retries, 4);
        assert!(config.pipeline.use_questioner);
        assert!(config.pipeline.parallel_candidates);
        assert_eq!(config.prompts.override_dir, Some(PathBuf::from("/tmp/prompts")));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
pipeline:
  retries: 0
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.pipeline.retries, 0);
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.api_key_env(), "OPENAI_API_KEY");
        assert_eq!(config.llm.resolved_base_url(), "https://api.openai.com");
    }

    #[test]
    fn test_provider_switch_changes_defaults() {
        let config: Config = serde_yaml::from_str("llm:\n  provider: anthropic\n").unwrap();
        assert_eq!(config.llm.model(), "claude-sonnet-4-5");
        assert_eq!(config.llm.model_env(), "ANTHROPIC_MODEL");
        assert_eq!(config.llm.api_key_env(), "ANTHROPIC_API_KEY");
        assert_eq!(config.llm.resolved_base_url(), "https://api.anthropic.com");
    }

    #[test]
    fn test_explicit_values_beat_provider_defaults() {
        let config = LlmConfig {
            provider: "anthropic".to_string(),
            model: Some("claude-opus-4".to_string()),
            api_key_env: Some("MY_CLAUDE_KEY".to_string()),
            ..Default::default()
        };
        assert_eq!(config.model(), "claude-opus-4");
        assert_eq!(config.api_key_env(), "MY_CLAUDE_KEY");
        assert_eq!(config.model_env(), "ANTHROPIC_MODEL");
    }

    #[test]
    #[serial]
    fn test_model_env_override() {
        let config = LlmConfig {
            model_env: Some("ADQ_TEST_MODEL_OVERRIDE".to_string()),
            ..Default::default()
        };
        unsafe { std::env::remove_var("ADQ_TEST_MODEL_OVERRIDE") };
        assert_eq!(config.resolved_model(), "gpt-5-mini");

        unsafe { std::env::set_var("ADQ_TEST_MODEL_OVERRIDE", "gpt-5") };
        assert_eq!(config.resolved_model(), "gpt-5");
        unsafe { std::env::remove_var("ADQ_TEST_MODEL_OVERRIDE") };
    }

    #[test]
    #[serial]
    fn test_validate_requires_api_key() {
        let mut config = Config::default();
        config.llm.api_key_env = Some("ADQ_TEST_MISSING_KEY".to_string());
        unsafe { std::env::remove_var("ADQ_TEST_MISSING_KEY") };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ADQ_TEST_MISSING_KEY"));
        assert!(matches!(
            config.llm.get_api_key(),
            Err(LlmError::MissingApiKey(ref env)) if env == "ADQ_TEST_MISSING_KEY"
        ));

        unsafe { std::env::set_var("ADQ_TEST_MISSING_KEY", "sk-test") };
        assert!(config.validate().is_ok());

        config.llm.max_tokens = 0;
        assert!(config.validate().is_err());
        unsafe { std::env::remove_var("ADQ_TEST_MISSING_KEY") };
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adq.yml");
        std::fs::write(&path, "llm:\n  model: gpt-5\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.llm.model(), "gpt-5");

        let missing = dir.path().join("missing.yml");
        assert!(Config::load(Some(&missing)).is_err());
    }
}
