//! Model provider resolution
//!
//! Turns a model name (bare like `gpt-4o` or qualified like
//! `openai:gpt-4o`) and an optional API key into a [`ModelSelection`].
//! Every provider is reached through its OpenAI-compatible endpoint.

use secrecy::SecretString;
use std::fmt;
use tracing::info;

use crate::error::{Error, Result};

/// Supported model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Anthropic,
    GoogleGla,
    Groq,
    Mistral,
    Ollama,
}

impl Provider {
    const ALL: [Provider; 6] = [
        Provider::OpenAI,
        Provider::Anthropic,
        Provider::GoogleGla,
        Provider::Groq,
        Provider::Mistral,
        Provider::Ollama,
    ];

    /// Prefix used in qualified model names, without the colon
    pub fn prefix(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
            Provider::GoogleGla => "google-gla",
            Provider::Groq => "groq",
            Provider::Mistral => "mistral",
            Provider::Ollama => "ollama",
        }
    }

    /// Environment variable holding the provider's API key
    pub fn key_var(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAI => Some("OPENAI_API_KEY"),
            Provider::Anthropic => Some("ANTHROPIC_API_KEY"),
            Provider::GoogleGla => Some("GEMINI_API_KEY"),
            Provider::Groq => Some("GROQ_API_KEY"),
            Provider::Mistral => Some("MISTRAL_API_KEY"),
            Provider::Ollama => None,
        }
    }

    /// Base URL of the OpenAI-compatible API
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Anthropic => "https://api.anthropic.com/v1",
            Provider::GoogleGla => "https://generativelanguage.googleapis.com/v1beta/openai",
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::Mistral => "https://api.mistral.ai/v1",
            Provider::Ollama => "http://localhost:11434/v1",
        }
    }

    /// Whether `tool_choice: "required"` is accepted
    pub fn supports_required_tool_choice(&self) -> bool {
        !matches!(self, Provider::Ollama)
    }

    fn split(qualified: &str) -> Option<(Provider, &str)> {
        let (prefix, model) = qualified.split_once(':')?;
        Self::ALL
            .into_iter()
            .find(|p| p.prefix() == prefix)
            .map(|p| (p, model))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// Add the provider prefix to a bare model name
pub fn qualify_model_name(name: &str) -> String {
    let prefix = if name.starts_with("gpt-") || name.starts_with("text-") {
        Some(Provider::OpenAI)
    } else if name.starts_with("claude-") {
        Some(Provider::Anthropic)
    } else if name.starts_with("gemini-") {
        Some(Provider::GoogleGla)
    } else if name.starts_with("llama-") || name.starts_with("gemma") {
        Some(Provider::Groq)
    } else if name.starts_with("mistral-") {
        Some(Provider::Mistral)
    } else {
        None
    };

    match prefix {
        Some(provider) => format!("{}:{}", provider.prefix(), name),
        None => name.to_string(),
    }
}

/// A resolved model with its credentials
#[derive(Debug, Clone)]
pub struct ModelSelection {
    pub provider: Provider,
    /// Model name as the provider knows it
    pub model: String,
    pub api_key: SecretString,
}

impl ModelSelection {
    /// Resolve a model from the process environment
    pub fn from_env(model_name: Option<&str>, api_key: Option<SecretString>) -> Result<Self> {
        Self::resolve(model_name, api_key, |key| std::env::var(key).ok())
    }

    /// Resolve a model.
    ///
    /// Without a name, the first provider key found among OpenAI,
    /// Anthropic and Gemini picks a default model.
    pub fn resolve(
        model_name: Option<&str>,
        api_key: Option<SecretString>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let (qualified, api_key) = match model_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => (qualify_model_name(name), api_key),
            None => {
                let detected = [
                    ("OPENAI_API_KEY", "openai:gpt-4o"),
                    ("ANTHROPIC_API_KEY", "anthropic:claude-3-7-sonnet-latest"),
                    ("GEMINI_API_KEY", "google-gla:gemini-2.0-flash"),
                ]
                .into_iter()
                .find_map(|(var, model)| env(var).map(|key| (var, model, key)));

                let Some((var, model, key)) = detected else {
                    return Err(Error::Config(
                        "No model name provided and no API keys found in environment".to_string(),
                    ));
                };
                info!("Detected {}, using {}", var, model);
                (model.to_string(), Some(api_key.unwrap_or_else(|| SecretString::from(key))))
            }
        };

        let (provider, model) = Provider::split(&qualified)
            .filter(|(_, model)| !model.is_empty())
            .ok_or_else(|| Error::Config(format!("Unsupported model name: {}", qualified)))?;

        let api_key = match api_key {
            Some(key) => key,
            None => match provider.key_var() {
                Some(var) => SecretString::from(env(var).ok_or_else(|| {
                    Error::Config(format!(
                        "No API key for {}: set {} or pass --api-key",
                        provider, var
                    ))
                })?),
                None => SecretString::from("ollama".to_string()),
            },
        };

        Ok(ModelSelection {
            provider,
            model: model.to_string(),
            api_key,
        })
    }

    /// Provider-qualified model name, e.g. `openai:gpt-4o`
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.provider.prefix(), self.model)
    }
}
