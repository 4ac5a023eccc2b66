use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AdvisorError, Result};

/// Top-level configuration for the advisor service.
///
/// Loaded from `advisor.toml` in the working directory by default. Every
/// section is optional in the file and falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl AdvisorConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AdvisorConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AdvisorError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let c = &self.classifier;
        if !(0.0..=1.0).contains(&c.confidence_threshold) {
            return Err(AdvisorError::Config(format!(
                "classifier.confidence_threshold must be within [0, 1], got {}",
                c.confidence_threshold
            )));
        }
        if c.regularization <= 0.0 || !c.regularization.is_finite() {
            return Err(AdvisorError::Config(
                "classifier.regularization must be a positive number".to_string(),
            ));
        }
        if c.learning_rate <= 0.0 || !c.learning_rate.is_finite() {
            return Err(AdvisorError::Config(
                "classifier.learning_rate must be a positive number".to_string(),
            ));
        }
        if c.max_iter == 0 {
            return Err(AdvisorError::Config(
                "classifier.max_iter must be at least 1".to_string(),
            ));
        }
        if c.max_ngram == 0 {
            return Err(AdvisorError::Config(
                "classifier.max_ngram must be at least 1".to_string(),
            ));
        }
        if c.max_features == Some(0) {
            return Err(AdvisorError::Config(
                "classifier.max_features must be at least 1 when set".to_string(),
            ));
        }

        let s = &self.session;
        if s.history_limit == 0 {
            return Err(AdvisorError::Config(
                "session.history_limit must be at least 1".to_string(),
            ));
        }
        if s.context_window == 0 || s.context_window > s.history_limit {
            return Err(AdvisorError::Config(format!(
                "session.context_window must be within 1..={}, got {}",
                s.history_limit, s.context_window
            )));
        }

        if self.llm.model.trim().is_empty() {
            return Err(AdvisorError::Config("llm.model must not be empty".to_string()));
        }
        if self.chat.max_message_chars == 0 {
            return Err(AdvisorError::Config(
                "chat.max_message_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// General service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Address the HTTP server binds to.
    pub host: String,
    /// HTTP server port.
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            cors_origins: vec![
                "http://127.0.0.1:8000".to_string(),
                "http://localhost:8000".to_string(),
            ],
        }
    }
}

/// Intent classifier training and decision settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum top-class probability; anything lower routes to `general_query`.
    pub confidence_threshold: f64,
    /// Inverse L2 regularization strength (larger means weaker penalty).
    pub regularization: f64,
    /// Gradient descent step size.
    pub learning_rate: f64,
    /// Iteration cap for the solver.
    pub max_iter: usize,
    /// Stop once every gradient component is below this magnitude.
    pub tolerance: f64,
    /// Longest word n-gram in the vocabulary.
    pub max_ngram: usize,
    /// Optional vocabulary cap (most frequent n-grams are kept).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_features: Option<usize>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.30,
            regularization: 1.0,
            learning_rate: 1.0,
            max_iter: 1000,
            tolerance: 1e-4,
            max_ngram: 2,
            max_features: None,
        }
    }
}

/// Conversation memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Utterances retained per session.
    pub history_limit: usize,
    /// Trailing utterances shown to the model and scanned for a topic lock.
    pub context_window: usize,
    /// Minutes without activity before a session is dropped. 0 keeps
    /// sessions until reset or shutdown.
    pub idle_timeout_minutes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: 6,
            context_window: 4,
            idle_timeout_minutes: 30,
        }
    }
}

/// Completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Model name sent with every request.
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Completion token cap for advisor replies.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4.1-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 250,
            temperature: 0.6,
            timeout_secs: 30,
        }
    }
}

/// Input limits for the chat and auxiliary endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum characters accepted in a chat message.
    pub max_message_chars: usize,
    /// Maximum characters accepted for a resume.
    pub max_resume_chars: usize,
    /// Maximum size of a base64 image payload in bytes.
    pub max_image_bytes: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 2000,
            max_resume_chars: 20_000,
            max_image_bytes: 5 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = AdvisorConfig::default();
        assert_eq!(config.general.host, "127.0.0.1");
        assert_eq!(config.general.port, 8000);
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.classifier.confidence_threshold, 0.30);
        assert_eq!(config.classifier.max_ngram, 2);
        assert!(config.classifier.max_features.is_none());
        assert_eq!(config.session.history_limit, 6);
        assert_eq!(config.session.context_window, 4);
        assert_eq!(config.session.idle_timeout_minutes, 30);
        assert_eq!(config.llm.model, "gpt-4.1-mini");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.llm.max_tokens, 250);
        assert_eq!(config.chat.max_message_chars, 2000);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(AdvisorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
host = "0.0.0.0"
port = 9090
log_level = "debug"

[classifier]
confidence_threshold = 0.45
max_features = 500

[session]
history_limit = 5
context_window = 5

[llm]
model = "gpt-4o-mini"
temperature = 0.2
"#;
        let file = create_temp_config(content);
        let config = AdvisorConfig::load(file.path()).unwrap();
        assert_eq!(config.general.host, "0.0.0.0");
        assert_eq!(config.general.port, 9090);
        assert_eq!(config.classifier.confidence_threshold, 0.45);
        assert_eq!(config.classifier.max_features, Some(500));
        assert_eq!(config.session.history_limit, 5);
        assert_eq!(config.session.context_window, 5);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[general]
log_level = "warn"
"#;
        let file = create_temp_config(content);
        let config = AdvisorConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.port, 8000);
        assert_eq!(config.session.history_limit, 6);
        assert_eq!(config.classifier.max_iter, 1000);
    }

    #[test]
    fn test_load_session_idle_timeout() {
        let content = r#"
[session]
idle_timeout_minutes = 0
"#;
        let file = create_temp_config(content);
        let config = AdvisorConfig::load(file.path()).unwrap();
        assert_eq!(config.session.idle_timeout_minutes, 0);
        assert_eq!(config.session.history_limit, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = AdvisorConfig::load(file.path()).unwrap();
        assert_eq!(config.general.port, 8000);
        assert_eq!(config.session.context_window, 4);
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("[general\nport = ");
        let result = AdvisorConfig::load(file.path());
        assert!(matches!(result, Err(AdvisorError::Config(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AdvisorConfig::load_or_default(Path::new("/nonexistent/advisor.toml"));
        assert_eq!(config.general.port, 8000);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AdvisorConfig::default();
        config.classifier.confidence_threshold = 0.45;
        config.session.context_window = 6;
        config.save(&path).unwrap();

        let reloaded = AdvisorConfig::load(&path).unwrap();
        assert_eq!(reloaded.classifier.confidence_threshold, 0.45);
        assert_eq!(reloaded.session.context_window, 6);
        assert!(reloaded.classifier.max_features.is_none());
    }

    #[test]
    fn test_validate_rejects_window_larger_than_history() {
        let mut config = AdvisorConfig::default();
        config.session.context_window = 7;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("context_window"));
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = AdvisorConfig::default();
        config.session.context_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_history() {
        let mut config = AdvisorConfig::default();
        config.session.history_limit = 0;
        config.session.context_window = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("history_limit"));
    }

    #[test]
    fn test_validate_rejects_threshold_out_of_range() {
        let mut config = AdvisorConfig::default();
        config.classifier.confidence_threshold = 1.5;
        assert!(config.validate().is_err());
        config.classifier.confidence_threshold = -0.1;
        assert!(config.validate().is_err());
        config.classifier.confidence_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_threshold_bounds_inclusive() {
        let mut config = AdvisorConfig::default();
        config.classifier.confidence_threshold = 0.0;
        assert!(config.validate().is_ok());
        config.classifier.confidence_threshold = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_solver_params() {
        let mut config = AdvisorConfig::default();
        config.classifier.regularization = 0.0;
        assert!(config.validate().is_err());

        let mut config = AdvisorConfig::default();
        config.classifier.learning_rate = -1.0;
        assert!(config.validate().is_err());

        let mut config = AdvisorConfig::default();
        config.classifier.max_iter = 0;
        assert!(config.validate().is_err());

        let mut config = AdvisorConfig::default();
        config.classifier.max_ngram = 0;
        assert!(config.validate().is_err());

        let mut config = AdvisorConfig::default();
        config.classifier.max_features = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let mut config = AdvisorConfig::default();
        config.llm.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AdvisorConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let deserialized: AdvisorConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.general.log_level, config.general.log_level);
        assert_eq!(deserialized.llm.base_url, config.llm.base_url);
        assert_eq!(deserialized.general.cors_origins, config.general.cors_origins);
    }
}
