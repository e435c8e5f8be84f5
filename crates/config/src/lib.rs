//! Configuration loading, validation, and management for RustedRAG.
//!
//! Loads configuration from `~/.rustedrag/config.toml`, fills unset values
//! from environment variables, and validates everything before a solver
//! is built from it.

use rustedrag_core::error::ConfigurationError;
use rustedrag_core::template::PromptTemplate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Solver configuration.
///
/// Maps directly to `~/.rustedrag/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Base URL of the OpenAI-compatible server (e.g. `http://localhost:8337/v1`)
    #[serde(default)]
    pub api_url: String,

    /// Vector store to search for context
    #[serde(default)]
    pub vector_store_id: String,

    /// Max chunks requested from the vector store
    #[serde(default = "default_max_num_results")]
    pub max_num_results: usize,

    /// Word budget for retrieved context in the system prompt
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: usize,

    /// System prompt with `{context}` and `{question}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_template: Option<String>,

    /// Model name sent with every completion request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,

    /// Bearer credential for the remote server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default = "default_temperature")]
    pub llm_temperature: f32,

    #[serde(default = "default_top_p")]
    pub llm_top_p: f32,

    #[serde(default = "default_max_tokens")]
    pub llm_max_tokens: u32,

    /// Remember answered turns for follow-up questions
    #[serde(default = "default_true")]
    pub enable_memory: bool,

    /// Number of recent Q&A pairs replayed into each prompt
    #[serde(default = "default_memory_size")]
    pub memory_size: usize,

    /// Per-request HTTP timeout. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_max_num_results() -> usize {
    5
}
fn default_max_context_tokens() -> usize {
    2000
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    1.0
}
fn default_max_tokens() -> u32 {
    500
}
fn default_true() -> bool {
    true
}
fn default_memory_size() -> usize {
    3
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for SolverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverConfig")
            .field("api_url", &self.api_url)
            .field("vector_store_id", &self.vector_store_id)
            .field("max_num_results", &self.max_num_results)
            .field("max_context_tokens", &self.max_context_tokens)
            .field("system_prompt_template", &self.system_prompt_template)
            .field("llm_model", &self.llm_model)
            .field("key", &redact(&self.key))
            .field("llm_temperature", &self.llm_temperature)
            .field("llm_top_p", &self.llm_top_p)
            .field("llm_max_tokens", &self.llm_max_tokens)
            .field("enable_memory", &self.enable_memory)
            .field("memory_size", &self.memory_size)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl SolverConfig {
    /// Create a config for the given server and vector store, with defaults
    /// for everything else.
    pub fn new(api_url: impl Into<String>, vector_store_id: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            vector_store_id: vector_store_id.into(),
            ..Self::default()
        }
    }

    /// Load configuration from the default path (~/.rustedrag/config.toml).
    pub fn load() -> Result<Self, ConfigurationError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file path.
    ///
    /// A missing file is not an error: defaults are used and the
    /// environment may still supply the required values.
    ///
    /// Environment variables only fill values the file left unset:
    /// - `RUSTEDRAG_API_URL`
    /// - `RUSTEDRAG_VECTOR_STORE_ID`
    /// - `RUSTEDRAG_MODEL`
    /// - `RUSTEDRAG_API_KEY`, then `OPENAI_API_KEY`
    pub fn load_from(path: &Path) -> Result<Self, ConfigurationError> {
        let mut config = if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigurationError::ReadError {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            Self::parse(&content, path)?
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Self::default()
        };

        config.fill_from(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document without consulting the environment.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
        let config = Self::parse(content, Path::new("<inline>"))?;
        config.validate()?;
        Ok(config)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigurationError> {
        toml::from_str(content).map_err(|e| ConfigurationError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Fill unset values from a variable lookup (the process environment in
    /// production, a closure in tests).
    fn fill_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.api_url.trim().is_empty() {
            if let Some(url) = var("RUSTEDRAG_API_URL") {
                self.api_url = url;
            }
        }
        if self.vector_store_id.trim().is_empty() {
            if let Some(id) = var("RUSTEDRAG_VECTOR_STORE_ID") {
                self.vector_store_id = id;
            }
        }
        if self.llm_model.is_none() {
            self.llm_model = var("RUSTEDRAG_MODEL");
        }
        if self.key.is_none() {
            self.key = var("RUSTEDRAG_API_KEY").or_else(|| var("OPENAI_API_KEY"));
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".rustedrag")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    ///
    /// Sampling parameters are deliberately left unchecked; the remote
    /// server decides what ranges it accepts.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigurationError::MissingField("api_url"));
        }
        if self.vector_store_id.trim().is_empty() {
            return Err(ConfigurationError::MissingField("vector_store_id"));
        }
        self.prompt_template()?;
        Ok(())
    }

    /// The base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_url.trim().trim_end_matches('/')
    }

    /// Resolve the configured prompt template.
    ///
    /// An unset or blank template selects the built-in default; a template
    /// missing either placeholder is rejected.
    pub fn prompt_template(&self) -> Result<PromptTemplate, ConfigurationError> {
        match self.system_prompt_template.as_deref() {
            Some(t) if !t.trim().is_empty() => PromptTemplate::new(t),
            _ => {
                tracing::debug!("system_prompt_template not set, using the built-in default");
                Ok(PromptTemplate::default())
            }
        }
    }

    /// Check if a credential is available.
    pub fn has_api_key(&self) -> bool {
        self.key.is_some()
    }

    /// Generate an example config TOML string (for `config init`).
    pub fn default_toml() -> String {
        let config = Self {
            system_prompt_template: Some(PromptTemplate::default().into()),
            ..Self::new("http://localhost:8337/v1", "vs_your_vector_store_id")
        };
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            vector_store_id: String::new(),
            max_num_results: default_max_num_results(),
            max_context_tokens: default_max_context_tokens(),
            system_prompt_template: None,
            llm_model: None,
            key: None,
            llm_temperature: default_temperature(),
            llm_top_p: default_top_p(),
            llm_max_tokens: default_max_tokens(),
            enable_memory: true,
            memory_size: default_memory_size(),
            request_timeout_secs: None,
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}
